//! Salary entity - 薪资配置表
//!
//! 每名员工一条，用于生成每月薪资发放记录
//! 表名: salary

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "salary")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(skip_serializing)]
    pub id: i64,

    /// 薪资编号
    #[sea_orm(column_type = "String(Some(32))", unique)]
    pub salary_id: String,

    /// 员工编号 (唯一)
    #[sea_orm(column_type = "String(Some(32))", unique)]
    pub staff_id: String,

    /// 员工姓名 (冗余字段)
    #[sea_orm(column_type = "String(Some(64))")]
    pub staff_name: String,

    /// 基本工资
    pub base: f64,

    /// 补贴
    pub subsidy: f64,

    /// 奖金
    pub bonus: f64,

    /// 提成
    pub commission: f64,

    /// 其他
    pub other: f64,

    /// 是否缴纳五险一金
    pub fund: bool,

    pub created_at: i64,

    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

timestamped_behavior!();
