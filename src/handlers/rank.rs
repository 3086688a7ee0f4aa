//! Rank handlers

use axum::{
    extract::{Path, Query},
    response::Json,
    Extension,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;

use crate::entity::{rank, staff};
use crate::error::{AppError, AppResult, OptionExt};
use crate::handlers::{fetch_page, require_text, PageQuery};
use crate::middleware::{CurrentUser, DbConn};
use crate::routes::ApiResponse;
use crate::util::{self, prefix};

#[derive(Debug, Deserialize)]
pub struct CreateRankRequest {
    pub rank_name: String,
}

#[derive(Debug, Deserialize)]
pub struct EditRankRequest {
    pub rank_id: String,
    pub rank_name: String,
}

async fn ensure_name_free(db: &DbConn, name: &str, except: Option<&str>) -> AppResult<()> {
    let mut query = rank::Entity::find().filter(rank::Column::RankName.eq(name));
    if let Some(rank_id) = except {
        query = query.filter(rank::Column::RankId.ne(rank_id));
    }
    if query.one(&**db).await?.is_some() {
        return Err(AppError::Conflict(format!("rank {} already exists", name)));
    }
    Ok(())
}

async fn find_rank(db: &DbConn, rank_id: &str) -> AppResult<rank::Model> {
    rank::Entity::find()
        .filter(rank::Column::RankId.eq(rank_id))
        .one(&**db)
        .await?
        .ok_or_not_found(format!("rank {}", rank_id))
}

/// POST /rank/create
pub async fn create_rank(
    Extension(db): Extension<DbConn>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateRankRequest>,
) -> AppResult<Json<ApiResponse<rank::Model>>> {
    user.require_manager()?;
    let name = require_text("rank_name", &req.rank_name, 64)?;
    ensure_name_free(&db, &name, None).await?;

    let created = rank::ActiveModel {
        rank_id: Set(util::new_id(prefix::RANK)),
        rank_name: Set(name),
        ..Default::default()
    }
    .insert(&*db)
    .await?;

    tracing::info!("{} created rank {}", user.staff_id, created.rank_id);
    Ok(Json(ApiResponse::success(created)))
}

/// DELETE /rank/del/:rank_id
pub async fn delete_rank(
    Extension(db): Extension<DbConn>,
    Extension(user): Extension<CurrentUser>,
    Path(rank_id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    user.require_manager()?;
    find_rank(&db, &rank_id).await?;

    let holder = staff::Entity::find()
        .filter(staff::Column::RankId.eq(&rank_id))
        .one(&*db)
        .await?;
    if holder.is_some() {
        return Err(AppError::Conflict(format!("rank {} is still assigned", rank_id)));
    }

    rank::Entity::delete_many()
        .filter(rank::Column::RankId.eq(&rank_id))
        .exec(&*db)
        .await?;

    tracing::info!("{} deleted rank {}", user.staff_id, rank_id);
    Ok(Json(ApiResponse::success_msg("success")))
}

/// POST /rank/edit
pub async fn edit_rank(
    Extension(db): Extension<DbConn>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<EditRankRequest>,
) -> AppResult<Json<ApiResponse<rank::Model>>> {
    user.require_manager()?;
    let existing = find_rank(&db, &req.rank_id).await?;
    let name = require_text("rank_name", &req.rank_name, 64)?;
    ensure_name_free(&db, &name, Some(&req.rank_id)).await?;

    let mut model: rank::ActiveModel = existing.into();
    model.rank_name = Set(name);
    let updated = model.update(&*db).await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// GET /rank/query/:rank_id
pub async fn query_rank(
    Extension(db): Extension<DbConn>,
    Path(rank_id): Path<String>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<Vec<rank::Model>>>> {
    if rank_id == util::ALL {
        let select = rank::Entity::find().order_by_asc(rank::Column::Id);
        let (rows, total) = fetch_page(&db, select, &page).await?;
        return Ok(Json(ApiResponse::list(rows, total)));
    }

    let found = find_rank(&db, &rank_id).await?;
    Ok(Json(ApiResponse::list(vec![found], 1)))
}
