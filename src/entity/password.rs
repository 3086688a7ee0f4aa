//! Password entity - 登录密码表
//!
//! 表名: authority_password

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "authority_password")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// 员工编号 (唯一)
    #[sea_orm(column_type = "String(Some(32))", unique)]
    pub staff_id: String,

    /// 密码 (bcrypt 哈希)
    #[sea_orm(column_type = "String(Some(128))")]
    #[serde(skip_serializing)]
    pub password: String,

    pub created_at: i64,

    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

timestamped_behavior!();
