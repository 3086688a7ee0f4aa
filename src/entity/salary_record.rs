//! SalaryRecord entity - 薪资发放记录表
//!
//! 表名: salary_record

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "salary_record")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(skip_serializing)]
    pub id: i64,

    /// 发放记录编号
    #[sea_orm(column_type = "String(Some(32))", unique)]
    pub salary_record_id: String,

    /// 员工编号
    #[sea_orm(column_type = "String(Some(32))")]
    pub staff_id: String,

    /// 员工姓名 (冗余字段)
    #[sea_orm(column_type = "String(Some(64))")]
    pub staff_name: String,

    pub base: f64,

    pub subsidy: f64,

    pub bonus: f64,

    pub commission: f64,

    pub other: f64,

    /// 养老保险
    pub pension_insurance: f64,

    /// 医疗保险
    pub medical_insurance: f64,

    /// 失业保险
    pub unemployment_insurance: f64,

    /// 住房公积金
    pub housing_fund: f64,

    /// 个人所得税
    pub tax: f64,

    /// 实发工资
    pub total: f64,

    /// 是否已发放
    pub is_pay: bool,

    /// 薪资月份 (YYYY-MM)
    #[sea_orm(column_type = "String(Some(7))")]
    pub salary_date: String,

    pub created_at: i64,

    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

timestamped_behavior!();
