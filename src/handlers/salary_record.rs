//! Salary record handlers
//!
//! A record is the payslip of one staff member for one month. Amounts are
//! computed from the staff's salary configuration when the record is created
//! and recomputed on edit. Paid records are frozen.

use axum::{
    extract::{Path, Query},
    response::Json,
    Extension,
};
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;

use crate::entity::{salary, salary_record};
use crate::error::{AppError, AppResult, DbResultExt, OptionExt};
use crate::handlers::{fetch_page, PageQuery};
use crate::middleware::{CurrentUser, DbConn};
use crate::payroll::{self, Earnings, Payslip};
use crate::routes::ApiResponse;
use crate::util::{self, prefix};

#[derive(Debug, Deserialize)]
pub struct CreateSalaryRecordRequest {
    pub staff_id: String,
    pub salary_date: String,
}

#[derive(Debug, Deserialize)]
pub struct EditSalaryRecordRequest {
    pub salary_record_id: String,
    pub base: Option<f64>,
    pub subsidy: Option<f64>,
    pub bonus: Option<f64>,
    pub commission: Option<f64>,
    pub other: Option<f64>,
    /// Defaults to whether the record already withholds insurance
    pub fund: Option<bool>,
}

fn check_salary_date(value: &str) -> AppResult<()> {
    if !payroll::is_valid_salary_date(value) {
        return Err(AppError::BadRequest("salary_date must be YYYY-MM".to_string()));
    }
    Ok(())
}

fn earnings_of(record: &salary_record::Model) -> Earnings {
    Earnings {
        base: record.base,
        subsidy: record.subsidy,
        bonus: record.bonus,
        commission: record.commission,
        other: record.other,
        fund: record.pension_insurance > 0.0 || record.housing_fund > 0.0,
    }
}

fn apply_payslip(model: &mut salary_record::ActiveModel, earnings: &Earnings, slip: &Payslip) {
    model.base = Set(earnings.base);
    model.subsidy = Set(earnings.subsidy);
    model.bonus = Set(earnings.bonus);
    model.commission = Set(earnings.commission);
    model.other = Set(earnings.other);
    model.pension_insurance = Set(slip.pension_insurance);
    model.medical_insurance = Set(slip.medical_insurance);
    model.unemployment_insurance = Set(slip.unemployment_insurance);
    model.housing_fund = Set(slip.housing_fund);
    model.tax = Set(slip.tax);
    model.total = Set(slip.total);
}

async fn find_record(db: &DbConn, salary_record_id: &str) -> AppResult<salary_record::Model> {
    salary_record::Entity::find()
        .filter(salary_record::Column::SalaryRecordId.eq(salary_record_id))
        .one(&**db)
        .await?
        .ok_or_not_found(format!("salary record {}", salary_record_id))
}

/// POST /salary_record/create
pub async fn create_salary_record(
    Extension(db): Extension<DbConn>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateSalaryRecordRequest>,
) -> AppResult<Json<ApiResponse<salary_record::Model>>> {
    user.require_manager()?;
    check_salary_date(&req.salary_date)?;

    let config = salary::Entity::find()
        .filter(salary::Column::StaffId.eq(&req.staff_id))
        .one(&*db)
        .await?
        .ok_or_not_found(format!("salary of staff {}", req.staff_id))?;

    let existing = salary_record::Entity::find()
        .filter(salary_record::Column::StaffId.eq(&req.staff_id))
        .filter(salary_record::Column::SalaryDate.eq(&req.salary_date))
        .one(&*db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(format!(
            "staff {} already has a salary record for {}",
            req.staff_id, req.salary_date
        )));
    }

    let earnings = Earnings::from(&config);
    let slip = payroll::calculate(&earnings);

    let mut model = salary_record::ActiveModel {
        salary_record_id: Set(util::new_id(prefix::SALARY_RECORD)),
        staff_id: Set(config.staff_id),
        staff_name: Set(config.staff_name),
        is_pay: Set(false),
        salary_date: Set(req.salary_date.clone()),
        ..Default::default()
    };
    apply_payslip(&mut model, &earnings, &slip);
    let created = model.insert(&*db).await.or_conflict(format!(
        "staff {} already has a salary record for {}",
        req.staff_id, req.salary_date
    ))?;

    tracing::info!(
        "{} created salary record {} for {} ({})",
        user.staff_id,
        created.salary_record_id,
        created.staff_id,
        created.salary_date
    );
    Ok(Json(ApiResponse::success(created)))
}

/// DELETE /salary_record/delete/:salary_record_id
pub async fn delete_salary_record(
    Extension(db): Extension<DbConn>,
    Extension(user): Extension<CurrentUser>,
    Path(salary_record_id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    user.require_manager()?;
    find_record(&db, &salary_record_id).await?;
    salary_record::Entity::delete_many()
        .filter(salary_record::Column::SalaryRecordId.eq(&salary_record_id))
        .exec(&*db)
        .await?;
    Ok(Json(ApiResponse::success_msg("success")))
}

/// POST /salary_record/edit
pub async fn edit_salary_record(
    Extension(db): Extension<DbConn>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<EditSalaryRecordRequest>,
) -> AppResult<Json<ApiResponse<salary_record::Model>>> {
    user.require_manager()?;
    let existing = find_record(&db, &req.salary_record_id).await?;
    if existing.is_pay {
        return Err(AppError::Conflict(format!(
            "salary record {} is already paid",
            req.salary_record_id
        )));
    }

    let mut earnings = earnings_of(&existing);
    if let Some(v) = req.base {
        earnings.base = v;
    }
    if let Some(v) = req.subsidy {
        earnings.subsidy = v;
    }
    if let Some(v) = req.bonus {
        earnings.bonus = v;
    }
    if let Some(v) = req.commission {
        earnings.commission = v;
    }
    if let Some(v) = req.other {
        earnings.other = v;
    }
    if let Some(v) = req.fund {
        earnings.fund = v;
    }
    if earnings.has_invalid_amount() {
        return Err(AppError::BadRequest(
            "salary amounts must be non-negative numbers".to_string(),
        ));
    }

    let slip = payroll::calculate(&earnings);
    let mut model: salary_record::ActiveModel = existing.into();
    apply_payslip(&mut model, &earnings, &slip);
    let updated = model.update(&*db).await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// GET /salary_record/query/:staff_id
pub async fn query_salary_record(
    Extension(db): Extension<DbConn>,
    Extension(user): Extension<CurrentUser>,
    Path(staff_id): Path<String>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<Vec<salary_record::Model>>>> {
    let mut select = salary_record::Entity::find();
    if staff_id == util::ALL {
        user.require_manager()?;
    } else {
        user.require_staff_access(&staff_id)?;
        select = select.filter(salary_record::Column::StaffId.eq(&staff_id));
    }
    let select = select
        .order_by_desc(salary_record::Column::SalaryDate)
        .order_by_asc(salary_record::Column::Id);
    let (rows, total) = fetch_page(&db, select, &page).await?;
    Ok(Json(ApiResponse::list(rows, total)))
}

/// GET /salary_record/get_salary_record_is_pay_by_id/:id
pub async fn is_paid(
    Extension(db): Extension<DbConn>,
    Extension(user): Extension<CurrentUser>,
    Path(salary_record_id): Path<String>,
) -> AppResult<Json<ApiResponse<bool>>> {
    let record = find_record(&db, &salary_record_id).await?;
    user.require_staff_access(&record.staff_id)?;
    Ok(Json(ApiResponse::success(record.is_pay)))
}

/// GET /salary_record/pay_salary_record_by_id/:id
pub async fn pay_salary_record(
    Extension(db): Extension<DbConn>,
    Extension(user): Extension<CurrentUser>,
    Path(salary_record_id): Path<String>,
) -> AppResult<Json<ApiResponse<salary_record::Model>>> {
    user.require_manager()?;
    let record = find_record(&db, &salary_record_id).await?;
    if record.is_pay {
        return Err(AppError::Conflict(format!(
            "salary record {} is already paid",
            salary_record_id
        )));
    }

    // Only one concurrent payer sees the unpaid row
    let result = salary_record::Entity::update_many()
        .col_expr(salary_record::Column::IsPay, Expr::value(true))
        .col_expr(salary_record::Column::UpdatedAt, Expr::value(chrono::Utc::now().timestamp()))
        .filter(salary_record::Column::SalaryRecordId.eq(&record.salary_record_id))
        .filter(salary_record::Column::IsPay.eq(false))
        .exec(&*db)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::Conflict(format!(
            "salary record {} is already paid",
            salary_record_id
        )));
    }
    let updated = find_record(&db, &salary_record_id).await?;

    tracing::info!("{} paid salary record {}", user.staff_id, updated.salary_record_id);
    Ok(Json(ApiResponse::success(updated)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::authority::UserType;
    use crate::handlers::fixtures;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn record(is_pay: bool) -> salary_record::Model {
        salary_record::Model {
            id: 1,
            salary_record_id: "record1".to_string(),
            staff_id: "staff1".to_string(),
            staff_name: "张三".to_string(),
            base: 10000.0,
            subsidy: 0.0,
            bonus: 2000.0,
            commission: 0.0,
            other: 0.0,
            pension_insurance: 800.0,
            medical_insurance: 200.0,
            unemployment_insurance: 50.0,
            housing_fund: 1200.0,
            tax: 265.0,
            total: 9485.0,
            is_pay,
            salary_date: "2021-05".to_string(),
            created_at: 0,
            updated_at: 0,
        }
    }

    fn salary_config() -> salary::Model {
        salary::Model {
            id: 1,
            salary_id: "salary1".to_string(),
            staff_id: "staff1".to_string(),
            staff_name: "张三".to_string(),
            base: 10000.0,
            subsidy: 0.0,
            bonus: 2000.0,
            commission: 0.0,
            other: 0.0,
            fund: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_fund_inferred_from_record() {
        assert!(earnings_of(&record(false)).fund);

        let mut no_fund = record(false);
        no_fund.pension_insurance = 0.0;
        no_fund.housing_fund = 0.0;
        assert!(!earnings_of(&no_fund).fund);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_month() {
        let db = MockDatabase::new(DatabaseBackend::MySql).into_connection();
        let result = create_salary_record(
            Extension(DbConn::from(db)),
            Extension(fixtures::admin()),
            Json(CreateSalaryRecordRequest {
                staff_id: "staff1".to_string(),
                salary_date: "2021-13".to_string(),
            }),
        )
        .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_create_without_salary_config() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([Vec::<salary::Model>::new()])
            .into_connection();
        let result = create_salary_record(
            Extension(DbConn::from(db)),
            Extension(fixtures::admin()),
            Json(CreateSalaryRecordRequest {
                staff_id: "staff1".to_string(),
                salary_date: "2021-05".to_string(),
            }),
        )
        .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_one_record_per_month() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![salary_config()]])
            .append_query_results([vec![record(false)]])
            .into_connection();
        let result = create_salary_record(
            Extension(DbConn::from(db)),
            Extension(fixtures::admin()),
            Json(CreateSalaryRecordRequest {
                staff_id: "staff1".to_string(),
                salary_date: "2021-05".to_string(),
            }),
        )
        .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_create_stores_computed_payslip() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![salary_config()]])
            .append_query_results([Vec::<salary_record::Model>::new()])
            .append_exec_results([MockExecResult {
                last_insert_id: 1,
                rows_affected: 1,
            }])
            .append_query_results([vec![record(false)]])
            .into_connection();
        let conn = DbConn::from(db);
        let Json(resp) = create_salary_record(
            Extension(conn.clone()),
            Extension(fixtures::admin()),
            Json(CreateSalaryRecordRequest {
                staff_id: "staff1".to_string(),
                salary_date: "2021-05".to_string(),
            }),
        )
        .await
        .unwrap();
        assert!(!resp.data.unwrap().is_pay);

        let log = fixtures::statement_log(conn);
        assert!(log.contains("INSERT INTO `salary_record`"));
        assert!(log.contains("Double(Some(9485.0))"));
        assert!(log.contains("Double(Some(265.0))"));
        assert!(log.contains("Double(Some(1200.0))"));
        assert!(log.contains("String(Some(\"2021-05\"))"));
    }

    #[tokio::test]
    async fn test_is_paid() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![record(true)]])
            .into_connection();
        let Json(resp) = is_paid(
            Extension(DbConn::from(db)),
            Extension(fixtures::user("staff1", UserType::Normal)),
            Path("record1".to_string()),
        )
        .await
        .unwrap();
        assert_eq!(resp.data, Some(true));
    }

    #[tokio::test]
    async fn test_is_paid_hides_other_staff() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![record(true)]])
            .into_connection();
        let result = is_paid(
            Extension(DbConn::from(db)),
            Extension(fixtures::user("staff2", UserType::Normal)),
            Path("record1".to_string()),
        )
        .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_pay_twice_conflicts() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![record(true)]])
            .into_connection();
        let result = pay_salary_record(
            Extension(DbConn::from(db)),
            Extension(fixtures::admin()),
            Path("record1".to_string()),
        )
        .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_pay_marks_record_paid() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![record(false)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([vec![record(true)]])
            .into_connection();
        let Json(resp) = pay_salary_record(
            Extension(DbConn::from(db)),
            Extension(fixtures::admin()),
            Path("record1".to_string()),
        )
        .await
        .unwrap();
        assert!(resp.data.unwrap().is_pay);
    }

    #[tokio::test]
    async fn test_pay_lost_to_concurrent_payer() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![record(false)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let conn = DbConn::from(db);
        let result = pay_salary_record(
            Extension(conn.clone()),
            Extension(fixtures::admin()),
            Path("record1".to_string()),
        )
        .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));

        let log = fixtures::statement_log(conn);
        assert!(log.contains("UPDATE `salary_record` SET `is_pay`"));
        assert!(log.contains("AND `salary_record`.`is_pay` = ?"));
    }

    #[tokio::test]
    async fn test_paid_record_not_editable() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![record(true)]])
            .into_connection();
        let result = edit_salary_record(
            Extension(DbConn::from(db)),
            Extension(fixtures::admin()),
            Json(EditSalaryRecordRequest {
                salary_record_id: "record1".to_string(),
                base: Some(12000.0),
                subsidy: None,
                bonus: None,
                commission: None,
                other: None,
                fund: None,
            }),
        )
        .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
