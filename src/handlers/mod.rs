//! Request handlers module

use sea_orm::{DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QuerySelect, Select};
use serde::Deserialize;

pub mod account;
pub mod authority;
pub mod company;
pub mod department;
pub mod notification;
pub mod password;
pub mod rank;
pub mod salary;
pub mod salary_record;
pub mod staff;

const MAX_PAGE_SIZE: u64 = 100;

/// Query parameters for list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub start: Option<u64>,
    pub limit: Option<u64>,
}

impl PageQuery {
    pub fn offset(&self) -> u64 {
        self.start.unwrap_or(0)
    }

    pub fn limit(&self) -> u64 {
        self.limit.unwrap_or(MAX_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }
}

/// Run a select with paging, returning the page and the unpaged total
pub async fn fetch_page<E>(
    db: &DatabaseConnection,
    select: Select<E>,
    page: &PageQuery,
) -> Result<(Vec<E::Model>, u64), DbErr>
where
    E: EntityTrait,
    E::Model: Sync + 'static,
{
    let total = select.clone().count(db).await?;
    let rows = select
        .offset(page.offset())
        .limit(page.limit())
        .all(db)
        .await?;
    Ok((rows, total))
}

/// Trimmed, non-empty text no longer than `max` characters
pub(crate) fn require_text(field: &str, value: &str, max: usize) -> crate::error::AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(crate::error::AppError::BadRequest(format!("{} must not be empty", field)));
    }
    if value.chars().count() > max {
        return Err(crate::error::AppError::BadRequest(format!(
            "{} must not exceed {} characters",
            field, max
        )));
    }
    Ok(value.to_string())
}
