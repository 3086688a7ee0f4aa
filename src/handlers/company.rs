//! Branch company handlers
//!
//! The list is read from the default database so the login page can offer
//! a branch before anyone is logged in.

use axum::{extract::State, response::Json};
use sea_orm::{EntityTrait, QueryOrder};

use crate::entity::branch_company;
use crate::error::AppResult;
use crate::routes::ApiResponse;
use crate::state::AppState;

/// GET /company/query
pub async fn query_branch_companies(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<branch_company::Model>>>> {
    let companies = branch_company::Entity::find()
        .order_by_asc(branch_company::Column::Id)
        .all(state.default_db().as_ref())
        .await?;

    // Only branches with a live connection can be logged into
    let companies: Vec<_> = companies
        .into_iter()
        .filter(|c| state.dbs.contains(&c.branch_id))
        .collect();

    let total = companies.len() as u64;
    Ok(Json(ApiResponse::list(companies, total)))
}
