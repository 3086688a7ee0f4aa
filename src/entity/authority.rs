//! Authority entity - 员工用户类型表
//!
//! 表名: authority

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 用户类型
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    /// 系统管理员
    Sys,
    /// 管理员
    Admin,
    /// 普通员工
    Normal,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Sys => "sys",
            UserType::Admin => "admin",
            UserType::Normal => "normal",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "sys" => Some(UserType::Sys),
            "admin" => Some(UserType::Admin),
            "normal" => Some(UserType::Normal),
            _ => None,
        }
    }

    /// 是否具备管理权限
    pub fn is_manager(&self) -> bool {
        matches!(self, UserType::Sys | UserType::Admin)
    }
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "authority")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(skip_serializing)]
    pub id: i64,

    /// 授权编号
    #[sea_orm(column_type = "String(Some(32))", unique)]
    pub authority_id: String,

    /// 员工编号 (唯一)
    #[sea_orm(column_type = "String(Some(32))", unique)]
    pub staff_id: String,

    /// 用户类型: sys / admin / normal
    #[sea_orm(column_type = "String(Some(16))")]
    pub user_type: String,

    pub created_at: i64,

    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

timestamped_behavior!();
