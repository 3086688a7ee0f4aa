//! AuthorityDetail entity - 权限规则表
//!
//! 按用户类型和功能模块存储页面权限
//! 表名: authority_detail

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "authority_detail")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// 用户类型: sys / admin / normal
    #[sea_orm(column_type = "String(Some(16))")]
    pub user_type: String,

    /// 功能模块名，对应 views/<model>.html
    #[sea_orm(column_type = "String(Some(64))")]
    pub model: String,

    /// 模块显示名称
    #[sea_orm(column_type = "String(Some(64))")]
    pub name: String,

    /// 权限内容，如 "create,edit,delete,query"
    #[sea_orm(column_type = "String(Some(255))")]
    pub authority_content: String,

    pub created_at: i64,

    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

timestamped_behavior!();
