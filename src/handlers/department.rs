//! Department handlers
//!
//! Implements department CRUD operations

use axum::{
    extract::{Path, Query},
    response::Json,
    Extension,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;

use crate::entity::{department, staff};
use crate::error::{AppError, AppResult, OptionExt};
use crate::handlers::{fetch_page, require_text, PageQuery};
use crate::middleware::{CurrentUser, DbConn};
use crate::routes::ApiResponse;
use crate::util::{self, prefix};

/// Create department request
#[derive(Debug, Deserialize)]
pub struct CreateDepartmentRequest {
    pub dep_name: String,
    #[serde(default)]
    pub dep_describe: String,
}

/// Edit department request
#[derive(Debug, Deserialize)]
pub struct EditDepartmentRequest {
    pub dep_id: String,
    pub dep_name: Option<String>,
    pub dep_describe: Option<String>,
}

async fn ensure_name_free(db: &DbConn, name: &str, except: Option<&str>) -> AppResult<()> {
    let mut query = department::Entity::find().filter(department::Column::DepName.eq(name));
    if let Some(dep_id) = except {
        query = query.filter(department::Column::DepId.ne(dep_id));
    }
    if query.one(&**db).await?.is_some() {
        return Err(AppError::Conflict(format!("department {} already exists", name)));
    }
    Ok(())
}

/// POST /depart/create
pub async fn create_department(
    Extension(db): Extension<DbConn>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateDepartmentRequest>,
) -> AppResult<Json<ApiResponse<department::Model>>> {
    user.require_manager()?;
    let name = require_text("dep_name", &req.dep_name, 64)?;
    ensure_name_free(&db, &name, None).await?;

    let dept = department::ActiveModel {
        dep_id: Set(util::new_id(prefix::DEPARTMENT)),
        dep_name: Set(name),
        dep_describe: Set(req.dep_describe),
        ..Default::default()
    }
    .insert(&*db)
    .await?;

    tracing::info!("{} created department {}", user.staff_id, dept.dep_id);
    Ok(Json(ApiResponse::success(dept)))
}

/// DELETE /depart/del/:dep_id
pub async fn delete_department(
    Extension(db): Extension<DbConn>,
    Extension(user): Extension<CurrentUser>,
    Path(dep_id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    user.require_manager()?;

    department::Entity::find()
        .filter(department::Column::DepId.eq(&dep_id))
        .one(&*db)
        .await?
        .ok_or_not_found(format!("department {}", dep_id))?;

    let member = staff::Entity::find()
        .filter(staff::Column::DepId.eq(&dep_id))
        .one(&*db)
        .await?;
    if member.is_some() {
        return Err(AppError::Conflict(format!(
            "department {} still has staff",
            dep_id
        )));
    }

    department::Entity::delete_many()
        .filter(department::Column::DepId.eq(&dep_id))
        .exec(&*db)
        .await?;

    tracing::info!("{} deleted department {}", user.staff_id, dep_id);
    Ok(Json(ApiResponse::success_msg("success")))
}

/// POST /depart/edit
pub async fn edit_department(
    Extension(db): Extension<DbConn>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<EditDepartmentRequest>,
) -> AppResult<Json<ApiResponse<department::Model>>> {
    user.require_manager()?;

    let existing = department::Entity::find()
        .filter(department::Column::DepId.eq(&req.dep_id))
        .one(&*db)
        .await?
        .ok_or_not_found(format!("department {}", req.dep_id))?;

    let mut model: department::ActiveModel = existing.into();
    if let Some(name) = req.dep_name {
        let name = require_text("dep_name", &name, 64)?;
        ensure_name_free(&db, &name, Some(&req.dep_id)).await?;
        model.dep_name = Set(name);
    }
    if let Some(describe) = req.dep_describe {
        model.dep_describe = Set(describe);
    }

    let dept = model.update(&*db).await?;
    Ok(Json(ApiResponse::success(dept)))
}

/// GET /depart/query/:dep_id
pub async fn query_department(
    Extension(db): Extension<DbConn>,
    Path(dep_id): Path<String>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<Vec<department::Model>>>> {
    if dep_id == util::ALL {
        let select = department::Entity::find().order_by_asc(department::Column::Id);
        let (rows, total) = fetch_page(&db, select, &page).await?;
        return Ok(Json(ApiResponse::list(rows, total)));
    }

    let dept = department::Entity::find()
        .filter(department::Column::DepId.eq(&dep_id))
        .one(&*db)
        .await?
        .ok_or_not_found(format!("department {}", dep_id))?;
    Ok(Json(ApiResponse::list(vec![dept], 1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::authority::UserType;
    use crate::handlers::fixtures;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn dept(dep_id: &str, name: &str) -> department::Model {
        department::Model {
            id: 1,
            dep_id: dep_id.to_string(),
            dep_name: name.to_string(),
            dep_describe: String::new(),
            created_at: 0,
            updated_at: 0,
        }
    }

    fn create_req() -> Json<CreateDepartmentRequest> {
        Json(CreateDepartmentRequest {
            dep_name: "研发部".to_string(),
            dep_describe: String::new(),
        })
    }

    #[tokio::test]
    async fn test_create_department() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([Vec::<department::Model>::new(), vec![dept("dep1", "研发部")]])
            .append_exec_results([MockExecResult {
                last_insert_id: 1,
                rows_affected: 1,
            }])
            .into_connection();

        let Json(resp) = create_department(Extension(DbConn::from(db)), Extension(fixtures::admin()), create_req())
            .await
            .unwrap();

        assert!(resp.code);
        assert_eq!(resp.data.unwrap().dep_name, "研发部");
    }

    #[tokio::test]
    async fn test_create_duplicate_department() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![dept("dep1", "研发部")]])
            .into_connection();

        let result = create_department(
            Extension(DbConn::from(db)),
            Extension(fixtures::user("root", UserType::Sys)),
            create_req(),
        )
        .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_normal_user_cannot_create() {
        let db = MockDatabase::new(DatabaseBackend::MySql).into_connection();
        let result = create_department(
            Extension(DbConn::from(db)),
            Extension(fixtures::user("staff1", UserType::Normal)),
            create_req(),
        )
        .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_delete_department_with_staff() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![dept("dep1", "研发部")]])
            .append_query_results([vec![fixtures::staff("staff1", "dep1")]])
            .into_connection();

        let result = delete_department(
            Extension(DbConn::from(db)),
            Extension(fixtures::admin()),
            Path("dep1".to_string()),
        )
        .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_delete_department() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![dept("dep1", "研发部")]])
            .append_query_results([Vec::<staff::Model>::new()])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let Json(resp) = delete_department(
            Extension(DbConn::from(db)),
            Extension(fixtures::admin()),
            Path("dep1".to_string()),
        )
        .await
        .unwrap();

        assert!(resp.code);
    }

    #[tokio::test]
    async fn test_query_missing_department() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([Vec::<department::Model>::new()])
            .into_connection();

        let result = query_department(
            Extension(DbConn::from(db)),
            Path("dep404".to_string()),
            Query(PageQuery::default()),
        )
        .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
