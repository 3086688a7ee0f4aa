//! Password handlers
//!
//! Hashes are never serialized; queries only reveal which staff have a
//! password record and when it last changed.

use axum::{
    extract::{Path, Query},
    response::Json,
    Extension,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;

use crate::entity::password;
use crate::error::{AppError, AppResult, OptionExt};
use crate::handlers::{fetch_page, PageQuery};
use crate::middleware::{CurrentUser, DbConn};
use crate::routes::ApiResponse;
use crate::util;

/// bcrypt only uses the first 72 bytes
const MAX_PASSWORD_BYTES: usize = 72;
const MIN_PASSWORD_CHARS: usize = 6;

#[derive(Debug, Deserialize)]
pub struct EditPasswordRequest {
    pub staff_id: String,
    pub password: String,
}

fn check_password(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AppError::BadRequest(format!(
            "password must have at least {} characters",
            MIN_PASSWORD_CHARS
        )));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AppError::BadRequest(format!(
            "password must not exceed {} bytes",
            MAX_PASSWORD_BYTES
        )));
    }
    Ok(())
}

/// GET /password/query/:staff_id
pub async fn query_password(
    Extension(db): Extension<DbConn>,
    Extension(user): Extension<CurrentUser>,
    Path(staff_id): Path<String>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<Vec<password::Model>>>> {
    if staff_id == util::ALL {
        user.require_manager()?;
        let select = password::Entity::find().order_by_asc(password::Column::Id);
        let (rows, total) = fetch_page(&db, select, &page).await?;
        return Ok(Json(ApiResponse::list(rows, total)));
    }

    user.require_staff_access(&staff_id)?;
    let found = password::Entity::find()
        .filter(password::Column::StaffId.eq(&staff_id))
        .one(&*db)
        .await?
        .ok_or_not_found(format!("password of staff {}", staff_id))?;
    Ok(Json(ApiResponse::list(vec![found], 1)))
}

/// POST /password/edit
pub async fn edit_password(
    Extension(db): Extension<DbConn>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<EditPasswordRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    user.require_staff_access(&req.staff_id)?;
    check_password(&req.password)?;

    let existing = password::Entity::find()
        .filter(password::Column::StaffId.eq(&req.staff_id))
        .one(&*db)
        .await?
        .ok_or_not_found(format!("password of staff {}", req.staff_id))?;

    let mut model: password::ActiveModel = existing.into();
    model.password = Set(bcrypt::hash(&req.password, bcrypt::DEFAULT_COST)?);
    model.update(&*db).await?;

    tracing::info!("{} changed the password of {}", user.staff_id, req.staff_id);
    Ok(Json(ApiResponse::success_msg("password updated")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::authority::UserType;
    use crate::handlers::fixtures;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[test]
    fn test_check_password() {
        assert!(check_password("12345").is_err());
        assert!(check_password("123456").is_ok());
        assert!(check_password(&"a".repeat(73)).is_err());
    }

    #[test]
    fn test_hash_not_serialized() {
        let row = password::Model {
            id: 1,
            staff_id: "staff1".to_string(),
            password: "$2b$12$secret".to_string(),
            created_at: 0,
            updated_at: 0,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["staff_id"], "staff1");
    }

    #[tokio::test]
    async fn test_normal_user_cannot_edit_others() {
        let db = MockDatabase::new(DatabaseBackend::MySql).into_connection();
        let result = edit_password(
            Extension(DbConn::from(db)),
            Extension(fixtures::user("staff1", UserType::Normal)),
            Json(EditPasswordRequest {
                staff_id: "staff2".to_string(),
                password: "newpass1".to_string(),
            }),
        )
        .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_edit_missing_record() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([Vec::<password::Model>::new()])
            .into_connection();
        let result = edit_password(
            Extension(DbConn::from(db)),
            Extension(fixtures::user("staff1", UserType::Normal)),
            Json(EditPasswordRequest {
                staff_id: "staff1".to_string(),
                password: "newpass1".to_string(),
            }),
        )
        .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
