//! Salary configuration handlers
//!
//! Each staff member has at most one salary configuration. Monthly salary
//! records are generated from it.

use axum::{
    extract::{Path, Query},
    response::Json,
    Extension,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;

use crate::entity::{salary, staff};
use crate::error::{AppError, AppResult, DbResultExt, OptionExt};
use crate::handlers::{fetch_page, PageQuery};
use crate::middleware::{CurrentUser, DbConn};
use crate::payroll::Earnings;
use crate::routes::ApiResponse;
use crate::util::{self, prefix};

#[derive(Debug, Deserialize)]
pub struct CreateSalaryRequest {
    pub staff_id: String,
    #[serde(default)]
    pub base: f64,
    #[serde(default)]
    pub subsidy: f64,
    #[serde(default)]
    pub bonus: f64,
    #[serde(default)]
    pub commission: f64,
    #[serde(default)]
    pub other: f64,
    #[serde(default)]
    pub fund: bool,
}

#[derive(Debug, Deserialize)]
pub struct EditSalaryRequest {
    pub salary_id: String,
    pub base: Option<f64>,
    pub subsidy: Option<f64>,
    pub bonus: Option<f64>,
    pub commission: Option<f64>,
    pub other: Option<f64>,
    pub fund: Option<bool>,
}

fn check_earnings(earnings: &Earnings) -> AppResult<()> {
    if earnings.has_invalid_amount() {
        return Err(AppError::BadRequest(
            "salary amounts must be non-negative numbers".to_string(),
        ));
    }
    Ok(())
}

async fn find_salary(db: &DbConn, salary_id: &str) -> AppResult<salary::Model> {
    salary::Entity::find()
        .filter(salary::Column::SalaryId.eq(salary_id))
        .one(&**db)
        .await?
        .ok_or_not_found(format!("salary {}", salary_id))
}

/// POST /salary/create
pub async fn create_salary(
    Extension(db): Extension<DbConn>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateSalaryRequest>,
) -> AppResult<Json<ApiResponse<salary::Model>>> {
    user.require_manager()?;
    let earnings = Earnings {
        base: req.base,
        subsidy: req.subsidy,
        bonus: req.bonus,
        commission: req.commission,
        other: req.other,
        fund: req.fund,
    };
    check_earnings(&earnings)?;

    let owner = staff::Entity::find()
        .filter(staff::Column::StaffId.eq(&req.staff_id))
        .one(&*db)
        .await?
        .ok_or_not_found(format!("staff {}", req.staff_id))?;

    let existing = salary::Entity::find()
        .filter(salary::Column::StaffId.eq(&req.staff_id))
        .one(&*db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(format!(
            "staff {} already has a salary configuration",
            req.staff_id
        )));
    }

    let created = salary::ActiveModel {
        salary_id: Set(util::new_id(prefix::SALARY)),
        staff_id: Set(owner.staff_id),
        staff_name: Set(owner.staff_name),
        base: Set(earnings.base),
        subsidy: Set(earnings.subsidy),
        bonus: Set(earnings.bonus),
        commission: Set(earnings.commission),
        other: Set(earnings.other),
        fund: Set(earnings.fund),
        ..Default::default()
    }
    .insert(&*db)
    .await
    .or_conflict(format!("staff {} already has a salary configuration", req.staff_id))?;

    tracing::info!("{} created salary {} for {}", user.staff_id, created.salary_id, created.staff_id);
    Ok(Json(ApiResponse::success(created)))
}

/// DELETE /salary/delete/:salary_id
pub async fn delete_salary(
    Extension(db): Extension<DbConn>,
    Extension(user): Extension<CurrentUser>,
    Path(salary_id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    user.require_manager()?;
    find_salary(&db, &salary_id).await?;
    salary::Entity::delete_many()
        .filter(salary::Column::SalaryId.eq(&salary_id))
        .exec(&*db)
        .await?;
    Ok(Json(ApiResponse::success_msg("success")))
}

/// POST /salary/edit
pub async fn edit_salary(
    Extension(db): Extension<DbConn>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<EditSalaryRequest>,
) -> AppResult<Json<ApiResponse<salary::Model>>> {
    user.require_manager()?;
    let existing = find_salary(&db, &req.salary_id).await?;

    let mut earnings = Earnings::from(&existing);
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
    check_earnings(&earnings)?;

    let mut model: salary::ActiveModel = existing.into();
    model.base = Set(earnings.base);
    model.subsidy = Set(earnings.subsidy);
    model.bonus = Set(earnings.bonus);
    model.commission = Set(earnings.commission);
    model.other = Set(earnings.other);
    model.fund = Set(earnings.fund);

    let updated = model.update(&*db).await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// GET /salary/query/:staff_id
pub async fn query_salary(
    Extension(db): Extension<DbConn>,
    Extension(user): Extension<CurrentUser>,
    Path(staff_id): Path<String>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<Vec<salary::Model>>>> {
    if staff_id == util::ALL {
        user.require_manager()?;
        let select = salary::Entity::find().order_by_asc(salary::Column::Id);
        let (rows, total) = fetch_page(&db, select, &page).await?;
        return Ok(Json(ApiResponse::list(rows, total)));
    }

    user.require_staff_access(&staff_id)?;
    let found = salary::Entity::find()
        .filter(salary::Column::StaffId.eq(&staff_id))
        .one(&*db)
        .await?
        .ok_or_not_found(format!("salary of staff {}", staff_id))?;
    Ok(Json(ApiResponse::list(vec![found], 1)))
}
