//! BranchCompany entity - 分公司表
//!
//! 只存放在默认数据库中，branch_id 即该分公司的数据库名
//! 表名: branch_company

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "branch_company")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(skip_serializing)]
    pub id: i64,

    /// 分公司编号 (数据库名)
    #[sea_orm(column_type = "String(Some(32))", unique)]
    pub branch_id: String,

    /// 分公司名称
    #[sea_orm(column_type = "String(Some(64))")]
    pub name: String,

    /// 分公司描述
    #[sea_orm(column_type = "String(Some(255))")]
    pub branch_desc: String,

    pub created_at: i64,

    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

timestamped_behavior!();
