//! Staff handlers
//!
//! Creating a staff member also creates their login password and a `normal`
//! authority row; deleting removes all three together.

use axum::{
    extract::{Path, Query},
    response::Json,
    Extension,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Deserialize;

use crate::entity::authority::UserType;
use crate::entity::staff::Sex;
use crate::entity::{authority, department, password, rank, staff};
use crate::error::{AppError, AppResult, DbResultExt, OptionExt};
use crate::handlers::{fetch_page, require_text, PageQuery};
use crate::middleware::{CurrentUser, DbConn};
use crate::routes::ApiResponse;
use crate::util::{self, prefix};

/// Create staff request
#[derive(Debug, Deserialize)]
pub struct CreateStaffRequest {
    /// Employee number; generated when omitted
    pub staff_id: Option<String>,
    pub staff_name: String,
    #[serde(default)]
    pub leader_staff_id: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub birthday: String,
    #[serde(default)]
    pub identity_num: String,
    #[serde(default)]
    pub sex: i32,
    #[serde(default)]
    pub nation: String,
    #[serde(default)]
    pub school: String,
    #[serde(default)]
    pub major: String,
    #[serde(default)]
    pub edu_level: String,
    #[serde(default)]
    pub base_salary: i64,
    #[serde(default)]
    pub card_num: String,
    pub rank_id: String,
    pub dep_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub entry_date: String,
}

/// Edit staff request, absent fields are left unchanged
#[derive(Debug, Deserialize)]
pub struct EditStaffRequest {
    pub staff_id: String,
    pub staff_name: Option<String>,
    pub leader_staff_id: Option<String>,
    pub phone: Option<String>,
    pub birthday: Option<String>,
    pub identity_num: Option<String>,
    pub sex: Option<i32>,
    pub nation: Option<String>,
    pub school: Option<String>,
    pub major: Option<String>,
    pub edu_level: Option<String>,
    pub base_salary: Option<i64>,
    pub card_num: Option<String>,
    pub rank_id: Option<String>,
    pub dep_id: Option<String>,
    pub email: Option<String>,
    pub entry_date: Option<String>,
}

fn check_date(field: &str, value: &str) -> AppResult<()> {
    if util::is_valid_date(value) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("{} must be YYYY-MM-DD", field)))
    }
}

fn check_salary(value: i64) -> AppResult<()> {
    if value < 0 {
        return Err(AppError::BadRequest("base_salary must not be negative".to_string()));
    }
    Ok(())
}

async fn ensure_rank_exists(db: &DatabaseConnection, rank_id: &str) -> AppResult<()> {
    rank::Entity::find()
        .filter(rank::Column::RankId.eq(rank_id))
        .one(db)
        .await?
        .ok_or_not_found(format!("rank {}", rank_id))?;
    Ok(())
}

async fn ensure_department_exists(db: &DatabaseConnection, dep_id: &str) -> AppResult<()> {
    department::Entity::find()
        .filter(department::Column::DepId.eq(dep_id))
        .one(db)
        .await?
        .ok_or_not_found(format!("department {}", dep_id))?;
    Ok(())
}

async fn find_staff(db: &DatabaseConnection, staff_id: &str) -> AppResult<staff::Model> {
    staff::Entity::find()
        .filter(staff::Column::StaffId.eq(staff_id))
        .one(db)
        .await?
        .ok_or_not_found(format!("staff {}", staff_id))
}

/// POST /staff/create
pub async fn create_staff(
    Extension(db): Extension<DbConn>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateStaffRequest>,
) -> AppResult<Json<ApiResponse<staff::Model>>> {
    user.require_manager()?;

    let staff_name = require_text("staff_name", &req.staff_name, 64)?;
    check_date("birthday", &req.birthday)?;
    check_date("entry_date", &req.entry_date)?;
    check_salary(req.base_salary)?;

    let staff_id = match req.staff_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => require_text("staff_id", id, 32)?,
        _ => util::new_id(prefix::STAFF),
    };
    let taken = staff::Entity::find()
        .filter(staff::Column::StaffId.eq(&staff_id))
        .one(&*db)
        .await?;
    if taken.is_some() {
        return Err(AppError::Conflict(format!("staff {} already exists", staff_id)));
    }

    ensure_rank_exists(&db, &req.rank_id).await?;
    ensure_department_exists(&db, &req.dep_id).await?;

    let txn = db.begin().await?;

    let created = staff::ActiveModel {
        staff_id: Set(staff_id.clone()),
        staff_name: Set(staff_name),
        leader_staff_id: Set(req.leader_staff_id),
        phone: Set(req.phone),
        birthday: Set(req.birthday),
        identity_num: Set(req.identity_num),
        sex: Set(Sex::from(req.sex) as i32),
        nation: Set(req.nation),
        school: Set(req.school),
        major: Set(req.major),
        edu_level: Set(req.edu_level),
        base_salary: Set(req.base_salary),
        card_num: Set(req.card_num),
        rank_id: Set(req.rank_id),
        dep_id: Set(req.dep_id),
        email: Set(req.email),
        entry_date: Set(req.entry_date),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .or_conflict(format!("staff {} already exists", staff_id))?;

    let hashed = bcrypt::hash(created.initial_password(), bcrypt::DEFAULT_COST)?;
    password::ActiveModel {
        staff_id: Set(staff_id.clone()),
        password: Set(hashed),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    authority::ActiveModel {
        authority_id: Set(util::new_id(prefix::AUTHORITY)),
        staff_id: Set(staff_id.clone()),
        user_type: Set(UserType::Normal.to_string()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    tracing::info!("{} created staff {}", user.staff_id, staff_id);
    Ok(Json(ApiResponse::success(created)))
}

/// DELETE /staff/del/:staff_id
pub async fn delete_staff(
    Extension(db): Extension<DbConn>,
    Extension(user): Extension<CurrentUser>,
    Path(staff_id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    user.require_manager()?;
    if staff_id == user.staff_id {
        return Err(AppError::BadRequest("cannot delete your own account".to_string()));
    }
    find_staff(&db, &staff_id).await?;

    let txn = db.begin().await?;
    staff::Entity::delete_many()
        .filter(staff::Column::StaffId.eq(&staff_id))
        .exec(&txn)
        .await?;
    password::Entity::delete_many()
        .filter(password::Column::StaffId.eq(&staff_id))
        .exec(&txn)
        .await?;
    authority::Entity::delete_many()
        .filter(authority::Column::StaffId.eq(&staff_id))
        .exec(&txn)
        .await?;
    txn.commit().await?;

    tracing::info!("{} deleted staff {}", user.staff_id, staff_id);
    Ok(Json(ApiResponse::success_msg("success")))
}

/// POST /staff/edit
pub async fn edit_staff(
    Extension(db): Extension<DbConn>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<EditStaffRequest>,
) -> AppResult<Json<ApiResponse<staff::Model>>> {
    user.require_manager()?;
    let existing = find_staff(&db, &req.staff_id).await?;
    let mut model: staff::ActiveModel = existing.into();

    if let Some(name) = req.staff_name {
        model.staff_name = Set(require_text("staff_name", &name, 64)?);
    }
    if let Some(v) = req.leader_staff_id {
        model.leader_staff_id = Set(v);
    }
    if let Some(v) = req.phone {
        model.phone = Set(v);
    }
    if let Some(v) = req.birthday {
        check_date("birthday", &v)?;
        model.birthday = Set(v);
    }
    if let Some(v) = req.identity_num {
        model.identity_num = Set(v);
    }
    if let Some(v) = req.sex {
        model.sex = Set(Sex::from(v) as i32);
    }
    if let Some(v) = req.nation {
        model.nation = Set(v);
    }
    if let Some(v) = req.school {
        model.school = Set(v);
    }
    if let Some(v) = req.major {
        model.major = Set(v);
    }
    if let Some(v) = req.edu_level {
        model.edu_level = Set(v);
    }
    if let Some(v) = req.base_salary {
        check_salary(v)?;
        model.base_salary = Set(v);
    }
    if let Some(v) = req.card_num {
        model.card_num = Set(v);
    }
    if let Some(v) = req.rank_id {
        ensure_rank_exists(&db, &v).await?;
        model.rank_id = Set(v);
    }
    if let Some(v) = req.dep_id {
        ensure_department_exists(&db, &v).await?;
        model.dep_id = Set(v);
    }
    if let Some(v) = req.email {
        model.email = Set(v);
    }
    if let Some(v) = req.entry_date {
        check_date("entry_date", &v)?;
        model.entry_date = Set(v);
    }

    let updated = model.update(&*db).await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// GET /staff/query/:staff_id
pub async fn query_staff(
    Extension(db): Extension<DbConn>,
    Extension(user): Extension<CurrentUser>,
    Path(staff_id): Path<String>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<Vec<staff::Model>>>> {
    if staff_id == util::ALL {
        user.require_manager()?;
        let select = staff::Entity::find().order_by_asc(staff::Column::Id);
        let (rows, total) = fetch_page(&db, select, &page).await?;
        return Ok(Json(ApiResponse::list(rows, total)));
    }

    user.require_staff_access(&staff_id)?;
    let found = find_staff(&db, &staff_id).await?;
    Ok(Json(ApiResponse::list(vec![found], 1)))
}

/// GET /staff/query_by_name/:staff_name
pub async fn query_staff_by_name(
    Extension(db): Extension<DbConn>,
    Extension(user): Extension<CurrentUser>,
    Path(staff_name): Path<String>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<Vec<staff::Model>>>> {
    user.require_manager()?;
    let select = staff::Entity::find()
        .filter(staff::Column::StaffName.like(util::like_pattern(&staff_name)))
        .order_by_asc(staff::Column::Id);
    let (rows, total) = fetch_page(&db, select, &page).await?;
    Ok(Json(ApiResponse::list(rows, total)))
}

/// GET /staff/query_by_dep/:dep_name
pub async fn query_staff_by_dep(
    Extension(db): Extension<DbConn>,
    Extension(user): Extension<CurrentUser>,
    Path(dep_name): Path<String>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<Vec<staff::Model>>>> {
    user.require_manager()?;
    let dept = department::Entity::find()
        .filter(department::Column::DepName.eq(&dep_name))
        .one(&*db)
        .await?
        .ok_or_not_found(format!("department {}", dep_name))?;

    let select = staff::Entity::find()
        .filter(staff::Column::DepId.eq(&dept.dep_id))
        .order_by_asc(staff::Column::Id);
    let (rows, total) = fetch_page(&db, select, &page).await?;
    Ok(Json(ApiResponse::list(rows, total)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::fixtures;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn inserted(id: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: id,
            rows_affected: 1,
        }
    }

    fn create_req() -> CreateStaffRequest {
        CreateStaffRequest {
            staff_id: Some("staff1".to_string()),
            staff_name: "张三".to_string(),
            leader_staff_id: String::new(),
            phone: String::new(),
            birthday: "1990-01-01".to_string(),
            identity_num: "110105199001011234".to_string(),
            sex: 1,
            nation: String::new(),
            school: String::new(),
            major: String::new(),
            edu_level: String::new(),
            base_salary: 8000,
            card_num: String::new(),
            rank_id: "rank1".to_string(),
            dep_id: "dep1".to_string(),
            email: String::new(),
            entry_date: "2020-07-01".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_bad_date() {
        let db = MockDatabase::new(DatabaseBackend::MySql).into_connection();
        let mut req = create_req();
        req.birthday = "1990/01/01".to_string();

        let result = create_staff(Extension(DbConn::from(db)), Extension(fixtures::admin()), Json(req)).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_create_duplicate_staff_id() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![fixtures::staff("staff1", "dep1")]])
            .into_connection();

        let result =
            create_staff(Extension(DbConn::from(db)), Extension(fixtures::admin()), Json(create_req())).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_create_with_unknown_rank() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([Vec::<staff::Model>::new()])
            .append_query_results([Vec::<rank::Model>::new()])
            .into_connection();

        let result =
            create_staff(Extension(DbConn::from(db)), Extension(fixtures::admin()), Json(create_req())).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_writes_staff_password_and_authority() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([Vec::<staff::Model>::new()])
            .append_query_results([vec![rank::Model {
                id: 1,
                rank_id: "rank1".to_string(),
                rank_name: "P5".to_string(),
                created_at: 0,
                updated_at: 0,
            }]])
            .append_query_results([vec![fixtures::department("dep1")]])
            .append_exec_results([inserted(1)])
            .append_query_results([vec![fixtures::staff("staff1", "dep1")]])
            .append_exec_results([inserted(1)])
            .append_query_results([vec![password::Model {
                id: 1,
                staff_id: "staff1".to_string(),
                password: "hashed".to_string(),
                created_at: 0,
                updated_at: 0,
            }]])
            .append_exec_results([inserted(1)])
            .append_query_results([vec![fixtures::authority("staff1", UserType::Normal)]])
            .into_connection();
        let conn = DbConn::from(db);

        let Json(resp) = create_staff(Extension(conn.clone()), Extension(fixtures::admin()), Json(create_req()))
            .await
            .unwrap();
        assert_eq!(resp.data.unwrap().staff_id, "staff1");

        let log = fixtures::statement_log(conn);
        assert!(log.contains("BEGIN"));
        assert!(log.contains("INSERT INTO `staff`"));
        assert!(log.contains("INSERT INTO `authority_password`"));
        assert!(log.contains("INSERT INTO `authority` "));
        assert!(log.contains("String(Some(\"normal\"))"));
        assert!(log.contains("COMMIT"));
    }

    #[tokio::test]
    async fn test_delete_removes_all_rows_of_staff() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![fixtures::staff("staff1", "dep1")]])
            .append_exec_results([inserted(0), inserted(0), inserted(0)])
            .into_connection();
        let conn = DbConn::from(db);

        let Json(resp) = delete_staff(
            Extension(conn.clone()),
            Extension(fixtures::admin()),
            Path("staff1".to_string()),
        )
        .await
        .unwrap();
        assert!(resp.code);

        let log = fixtures::statement_log(conn);
        assert!(log.contains("DELETE FROM `staff`"));
        assert!(log.contains("DELETE FROM `authority_password`"));
        assert!(log.contains("DELETE FROM `authority` "));
        assert!(log.contains("COMMIT"));
    }

    #[tokio::test]
    async fn test_normal_user_reads_only_self() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![fixtures::staff("staff1", "dep1")]])
            .into_connection();
        let conn = DbConn::from(db);
        let normal = fixtures::user("staff1", UserType::Normal);

        let Json(resp) = query_staff(
            Extension(conn.clone()),
            Extension(normal.clone()),
            Path("staff1".to_string()),
            Query(PageQuery::default()),
        )
        .await
        .unwrap();
        assert_eq!(resp.data.unwrap()[0].staff_id, "staff1");

        let other = query_staff(
            Extension(conn.clone()),
            Extension(normal.clone()),
            Path("staff2".to_string()),
            Query(PageQuery::default()),
        )
        .await;
        assert!(matches!(other, Err(AppError::Forbidden(_))));

        let all = query_staff(
            Extension(conn),
            Extension(normal),
            Path("all".to_string()),
            Query(PageQuery::default()),
        )
        .await;
        assert!(matches!(all, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_cannot_delete_self() {
        let db = MockDatabase::new(DatabaseBackend::MySql).into_connection();
        let result = delete_staff(
            Extension(DbConn::from(db)),
            Extension(fixtures::admin()),
            Path("admin".to_string()),
        )
        .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_query_by_unknown_department() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([Vec::<department::Model>::new()])
            .into_connection();
        let result = query_staff_by_dep(
            Extension(DbConn::from(db)),
            Extension(fixtures::admin()),
            Path("不存在".to_string()),
            Query(PageQuery::default()),
        )
        .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
