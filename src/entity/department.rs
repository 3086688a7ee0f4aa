//! Department entity - 部门表
//!
//! 表名: department

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "department")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(skip_serializing)]
    pub id: i64,

    /// 部门编号
    #[sea_orm(column_type = "String(Some(32))", unique)]
    pub dep_id: String,

    /// 部门名称 (唯一)
    #[sea_orm(column_type = "String(Some(64))", unique)]
    pub dep_name: String,

    /// 部门描述
    #[sea_orm(column_type = "String(Some(255))")]
    pub dep_describe: String,

    pub created_at: i64,

    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

timestamped_behavior!();
