//! Notification entity - 通知公告表
//!
//! 表名: notification

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notification")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(skip_serializing)]
    pub id: i64,

    /// 通知编号
    #[sea_orm(column_type = "String(Some(32))", unique)]
    pub notice_id: String,

    /// 通知标题
    #[sea_orm(column_type = "String(Some(128))")]
    pub notice_title: String,

    /// 通知内容
    #[sea_orm(column_type = "Text")]
    pub notice_content: String,

    /// 通知类型
    #[sea_orm(column_type = "String(Some(32))")]
    pub notice_type: String,

    /// 发布日期 (YYYY-MM-DD)
    #[sea_orm(column_type = "String(Some(10))")]
    pub notice_date: String,

    pub created_at: i64,

    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

timestamped_behavior!();
