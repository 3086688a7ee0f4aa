//! Notification handlers

use axum::{
    extract::{Path, Query},
    response::Json,
    Extension,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;

use crate::entity::notification;
use crate::error::{AppError, AppResult, OptionExt};
use crate::handlers::{fetch_page, require_text, PageQuery};
use crate::middleware::{CurrentUser, DbConn};
use crate::routes::ApiResponse;
use crate::util::{self, prefix};

#[derive(Debug, Deserialize)]
pub struct CreateNotificationRequest {
    pub notice_title: String,
    #[serde(default)]
    pub notice_content: String,
    #[serde(default)]
    pub notice_type: String,
    /// Defaults to today
    pub notice_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EditNotificationRequest {
    pub notice_id: String,
    pub notice_title: Option<String>,
    pub notice_content: Option<String>,
    pub notice_type: Option<String>,
    pub notice_date: Option<String>,
}

fn check_notice_date(value: &str) -> AppResult<()> {
    if value.is_empty() || !util::is_valid_date(value) {
        return Err(AppError::BadRequest("notice_date must be YYYY-MM-DD".to_string()));
    }
    Ok(())
}

async fn find_notice(db: &DbConn, notice_id: &str) -> AppResult<notification::Model> {
    notification::Entity::find()
        .filter(notification::Column::NoticeId.eq(notice_id))
        .one(&**db)
        .await?
        .ok_or_not_found(format!("notification {}", notice_id))
}

/// POST /notification/create
pub async fn create_notification(
    Extension(db): Extension<DbConn>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateNotificationRequest>,
) -> AppResult<Json<ApiResponse<notification::Model>>> {
    user.require_manager()?;
    let title = require_text("notice_title", &req.notice_title, 128)?;
    let date = req
        .notice_date
        .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string());
    check_notice_date(&date)?;

    let created = notification::ActiveModel {
        notice_id: Set(util::new_id(prefix::NOTICE)),
        notice_title: Set(title),
        notice_content: Set(req.notice_content),
        notice_type: Set(req.notice_type),
        notice_date: Set(date),
        ..Default::default()
    }
    .insert(&*db)
    .await?;

    tracing::info!("{} published notification {}", user.staff_id, created.notice_id);
    Ok(Json(ApiResponse::success(created)))
}

/// DELETE /notification/delete/:notice_id
pub async fn delete_notification(
    Extension(db): Extension<DbConn>,
    Extension(user): Extension<CurrentUser>,
    Path(notice_id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    user.require_manager()?;
    find_notice(&db, &notice_id).await?;
    notification::Entity::delete_many()
        .filter(notification::Column::NoticeId.eq(&notice_id))
        .exec(&*db)
        .await?;
    Ok(Json(ApiResponse::success_msg("success")))
}

/// POST /notification/edit
pub async fn edit_notification(
    Extension(db): Extension<DbConn>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<EditNotificationRequest>,
) -> AppResult<Json<ApiResponse<notification::Model>>> {
    user.require_manager()?;
    let mut model: notification::ActiveModel = find_notice(&db, &req.notice_id).await?.into();

    if let Some(title) = req.notice_title {
        model.notice_title = Set(require_text("notice_title", &title, 128)?);
    }
    if let Some(content) = req.notice_content {
        model.notice_content = Set(content);
    }
    if let Some(kind) = req.notice_type {
        model.notice_type = Set(kind);
    }
    if let Some(date) = req.notice_date {
        check_notice_date(&date)?;
        model.notice_date = Set(date);
    }

    let updated = model.update(&*db).await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// GET /notification/query/:notice_title
pub async fn query_notification(
    Extension(db): Extension<DbConn>,
    Path(notice_title): Path<String>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<Vec<notification::Model>>>> {
    let mut select = notification::Entity::find();
    if notice_title != util::ALL {
        select = select.filter(notification::Column::NoticeTitle.like(util::like_pattern(&notice_title)));
    }
    let select = select
        .order_by_desc(notification::Column::NoticeDate)
        .order_by_desc(notification::Column::Id);
    let (rows, total) = fetch_page(&db, select, &page).await?;
    Ok(Json(ApiResponse::list(rows, total)))
}
