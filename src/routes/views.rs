//! HTML views
//!
//! Pages are plain files under the configured views directory. Access to a
//! model page is decided by the authority rules of the caller's user type.

use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Extension,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use tower_sessions::Session;

use crate::entity::authority_detail;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::session_user;
use crate::middleware::{CurrentUser, DbConn};
use crate::state::AppState;

pub const LOGIN_PAGE: &str = "/views/login.html";

/// Response header carrying the authority content of a rendered model page
pub const AUTHORITY_HEADER: &str = "x-authority";

/// Model names map to file names, so only a safe character set is allowed
fn is_valid_model_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 64
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

async fn read_view(state: &AppState, file: &str) -> std::io::Result<String> {
    tokio::fs::read_to_string(state.config.views_dir.join(file)).await
}

/// GET /index
pub async fn index(State(state): State<AppState>, session: Session) -> AppResult<Response> {
    if session_user(&session).await?.is_none() {
        return Ok(Redirect::to(LOGIN_PAGE).into_response());
    }
    let page = read_view(&state, "index.html").await?;
    Ok(Html(page).into_response())
}

/// GET /authority_render/:model_name
pub async fn render_authority(
    State(state): State<AppState>,
    Extension(db): Extension<DbConn>,
    Extension(user): Extension<CurrentUser>,
    Path(model_name): Path<String>,
) -> AppResult<Response> {
    if !is_valid_model_name(&model_name) {
        return Err(AppError::BadRequest(format!("invalid model name: {}", model_name)));
    }

    let rule = authority_detail::Entity::find()
        .filter(authority_detail::Column::UserType.eq(user.user_type.as_str()))
        .filter(authority_detail::Column::Model.eq(&model_name))
        .one(&*db)
        .await?
        .ok_or_else(|| {
            AppError::Forbidden(format!(
                "user type {} has no access to {}",
                user.user_type, model_name
            ))
        })?;

    let page = match read_view(&state, &format!("{}.html", model_name)).await {
        Ok(page) => page,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound(format!("view {}", model_name)));
        }
        Err(e) => return Err(e.into()),
    };

    let mut response = Html(page).into_response();
    match HeaderValue::from_str(&rule.authority_content) {
        Ok(value) => {
            response.headers_mut().insert(AUTHORITY_HEADER, value);
        }
        Err(_) => tracing::warn!(
            "Authority content of {}/{} is not a valid header value",
            rule.user_type,
            rule.model
        ),
    }
    Ok(response)
}

/// Fallback for unmatched paths
pub async fn not_found(State(state): State<AppState>) -> Response {
    match read_view(&state, "404.html").await {
        Ok(page) => (StatusCode::NOT_FOUND, Html(page)).into_response(),
        Err(_) => AppError::NotFound("page".to_string()).into_response(),
    }
}
