//! Authority handlers
//!
//! Authority detail rules decide which model pages a user type may open.
//! The set_admin / set_normal endpoints change a staff member's user type.

use axum::{extract::Path, response::Json, Extension};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;

use crate::entity::authority::UserType;
use crate::entity::{authority, authority_detail};
use crate::error::{AppError, AppResult, OptionExt};
use crate::handlers::require_text;
use crate::middleware::{CurrentUser, DbConn};
use crate::routes::ApiResponse;

#[derive(Debug, Deserialize)]
pub struct CreateAuthorityDetailRequest {
    pub user_type: String,
    pub model: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub authority_content: String,
}

#[derive(Debug, Deserialize)]
pub struct EditAuthorityDetailRequest {
    pub id: i64,
    pub name: Option<String>,
    pub authority_content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserTypeAndModelRequest {
    pub user_type: String,
    pub model: String,
}

fn parse_user_type(value: &str) -> AppResult<UserType> {
    UserType::parse(value)
        .ok_or_else(|| AppError::BadRequest(format!("unknown user type: {}", value)))
}

/// Managers read every rule set, others only their own
fn require_rule_access(user: &CurrentUser, user_type: UserType) -> AppResult<()> {
    if user.is_manager() || user.user_type == user_type {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "cannot read authority of user type {}",
            user_type
        )))
    }
}

/// POST /authority/create
pub async fn create_authority_detail(
    Extension(db): Extension<DbConn>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateAuthorityDetailRequest>,
) -> AppResult<Json<ApiResponse<authority_detail::Model>>> {
    user.require_manager()?;
    let user_type = parse_user_type(&req.user_type)?;
    let model = require_text("model", &req.model, 64)?;

    let existing = authority_detail::Entity::find()
        .filter(authority_detail::Column::UserType.eq(user_type.as_str()))
        .filter(authority_detail::Column::Model.eq(&model))
        .one(&*db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(format!(
            "authority of {} on {} already exists",
            user_type, model
        )));
    }

    let created = authority_detail::ActiveModel {
        user_type: Set(user_type.to_string()),
        model: Set(model),
        name: Set(req.name),
        authority_content: Set(req.authority_content),
        ..Default::default()
    }
    .insert(&*db)
    .await?;

    Ok(Json(ApiResponse::success(created)))
}

/// POST /authority/edit
pub async fn edit_authority_detail(
    Extension(db): Extension<DbConn>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<EditAuthorityDetailRequest>,
) -> AppResult<Json<ApiResponse<authority_detail::Model>>> {
    user.require_manager()?;
    let existing = authority_detail::Entity::find_by_id(req.id)
        .one(&*db)
        .await?
        .ok_or_not_found(format!("authority detail {}", req.id))?;

    let mut model: authority_detail::ActiveModel = existing.into();
    if let Some(name) = req.name {
        model.name = Set(name);
    }
    if let Some(content) = req.authority_content {
        model.authority_content = Set(content);
    }
    let updated = model.update(&*db).await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// GET /authority/query_by_user_type/:user_type
pub async fn query_by_user_type(
    Extension(db): Extension<DbConn>,
    Extension(user): Extension<CurrentUser>,
    Path(user_type): Path<String>,
) -> AppResult<Json<ApiResponse<Vec<authority_detail::Model>>>> {
    let user_type = parse_user_type(&user_type)?;
    require_rule_access(&user, user_type)?;

    let rules = authority_detail::Entity::find()
        .filter(authority_detail::Column::UserType.eq(user_type.as_str()))
        .order_by_asc(authority_detail::Column::Id)
        .all(&*db)
        .await?;
    let total = rules.len() as u64;
    Ok(Json(ApiResponse::list(rules, total)))
}

/// POST /authority/query_by_user_type_and_model
pub async fn query_by_user_type_and_model(
    Extension(db): Extension<DbConn>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<UserTypeAndModelRequest>,
) -> AppResult<Json<ApiResponse<authority_detail::Model>>> {
    let user_type = parse_user_type(&req.user_type)?;
    require_rule_access(&user, user_type)?;

    let rule = authority_detail::Entity::find()
        .filter(authority_detail::Column::UserType.eq(user_type.as_str()))
        .filter(authority_detail::Column::Model.eq(&req.model))
        .one(&*db)
        .await?
        .ok_or_not_found(format!("authority of {} on {}", user_type, req.model))?;
    Ok(Json(ApiResponse::success(rule)))
}

async fn set_user_type(
    db: &DbConn,
    user: &CurrentUser,
    staff_id: &str,
    user_type: UserType,
) -> AppResult<authority::Model> {
    if user.user_type != UserType::Sys {
        return Err(AppError::Forbidden(
            "only system administrators can change user types".to_string(),
        ));
    }

    let existing = authority::Entity::find()
        .filter(authority::Column::StaffId.eq(staff_id))
        .one(&**db)
        .await?
        .ok_or_not_found(format!("authority of staff {}", staff_id))?;

    if existing.user_type == UserType::Sys.as_str() {
        return Err(AppError::Conflict(format!(
            "staff {} is a system administrator",
            staff_id
        )));
    }

    let mut model: authority::ActiveModel = existing.into();
    model.user_type = Set(user_type.to_string());
    let updated = model.update(&**db).await?;

    tracing::info!("{} set user type of {} to {}", user.staff_id, staff_id, user_type);
    Ok(updated)
}

/// POST /authority/set_admin/:staff_id
pub async fn set_admin(
    Extension(db): Extension<DbConn>,
    Extension(user): Extension<CurrentUser>,
    Path(staff_id): Path<String>,
) -> AppResult<Json<ApiResponse<authority::Model>>> {
    let updated = set_user_type(&db, &user, &staff_id, UserType::Admin).await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// POST /authority/set_normal/:staff_id
pub async fn set_normal(
    Extension(db): Extension<DbConn>,
    Extension(user): Extension<CurrentUser>,
    Path(staff_id): Path<String>,
) -> AppResult<Json<ApiResponse<authority::Model>>> {
    let updated = set_user_type(&db, &user, &staff_id, UserType::Normal).await?;
    Ok(Json(ApiResponse::success(updated)))
}
