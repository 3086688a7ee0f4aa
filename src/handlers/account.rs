//! Account handlers
//!
//! Implements login and logout

use axum::{extract::State, response::Json, Extension};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::entity::authority::UserType;
use crate::entity::{authority, password, staff};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{SessionUser, SESSION_USER_KEY};
use crate::middleware::CurrentUser;
use crate::routes::ApiResponse;
use crate::state::AppState;

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub staff_id: String,
    pub password: String,
    /// Branch company (database name) to log into
    pub branch_id: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub staff_id: String,
    pub staff_name: String,
    pub user_type: UserType,
    pub branch_id: String,
}

const LOGIN_FAILED: &str = "staff id or password error";

/// POST /account/login
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    if req.staff_id.is_empty() || req.password.is_empty() || req.branch_id.is_empty() {
        return Err(AppError::BadRequest(
            "staff_id, password and branch_id are required".to_string(),
        ));
    }

    let db = state
        .branch_db(&req.branch_id)
        .ok_or_else(|| AppError::UnknownBranch(req.branch_id.clone()))?;

    let Some(record) = password::Entity::find()
        .filter(password::Column::StaffId.eq(&req.staff_id))
        .one(db.as_ref())
        .await?
    else {
        tracing::warn!("Login failed: unknown staff {} in {}", req.staff_id, req.branch_id);
        return Err(AppError::BadRequest(LOGIN_FAILED.to_string()));
    };

    if !bcrypt::verify(&req.password, &record.password).unwrap_or(false) {
        tracing::warn!("Login failed: wrong password - {}", req.staff_id);
        return Err(AppError::BadRequest(LOGIN_FAILED.to_string()));
    }

    let user_type = authority::Entity::find()
        .filter(authority::Column::StaffId.eq(&req.staff_id))
        .one(db.as_ref())
        .await?
        .and_then(|a| UserType::parse(&a.user_type))
        .unwrap_or(UserType::Normal);

    // The bootstrap account has no staff record
    let staff_name = staff::Entity::find()
        .filter(staff::Column::StaffId.eq(&req.staff_id))
        .one(db.as_ref())
        .await?
        .map(|s| s.staff_name)
        .unwrap_or_else(|| req.staff_id.clone());

    let user = SessionUser {
        staff_id: req.staff_id,
        branch_id: req.branch_id,
    };
    session.insert(SESSION_USER_KEY, &user).await?;

    tracing::info!(
        "Staff {} logged in to {} as {}",
        user.staff_id,
        user.branch_id,
        user_type
    );

    Ok(Json(ApiResponse::success(LoginResponse {
        staff_id: user.staff_id,
        staff_name,
        user_type,
        branch_id: user.branch_id,
    })))
}

/// POST /account/quit
pub async fn quit(
    session: Session,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<ApiResponse<()>>> {
    session.flush().await?;
    tracing::info!("Staff {} logged out", user.staff_id);
    Ok(Json(ApiResponse::success_msg("logout success")))
}
