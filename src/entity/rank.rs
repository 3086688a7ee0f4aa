//! Rank entity - 职级表
//!
//! 表名: rank

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rank")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(skip_serializing)]
    pub id: i64,

    /// 职级编号
    #[sea_orm(column_type = "String(Some(32))", unique)]
    pub rank_id: String,

    /// 职级名称 (唯一)
    #[sea_orm(column_type = "String(Some(64))", unique)]
    pub rank_name: String,

    pub created_at: i64,

    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

timestamped_behavior!();
