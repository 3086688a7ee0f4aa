//! Staff entity - 员工信息表
//!
//! 表名: staff

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 性别
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    Unknown = 0,
    Male = 1,
    Female = 2,
}

impl From<i32> for Sex {
    fn from(value: i32) -> Self {
        match value {
            1 => Sex::Male,
            2 => Sex::Female,
            _ => Sex::Unknown,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "staff")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(skip_serializing)]
    pub id: i64,

    /// 员工编号 (唯一)
    #[sea_orm(column_type = "String(Some(32))", unique)]
    pub staff_id: String,

    /// 员工姓名
    #[sea_orm(column_type = "String(Some(64))")]
    pub staff_name: String,

    /// 直属上级员工编号
    #[sea_orm(column_type = "String(Some(32))")]
    pub leader_staff_id: String,

    /// 电话
    #[sea_orm(column_type = "String(Some(20))")]
    pub phone: String,

    /// 出生日期 (YYYY-MM-DD)
    #[sea_orm(column_type = "String(Some(10))")]
    pub birthday: String,

    /// 身份证号
    #[sea_orm(column_type = "String(Some(32))")]
    pub identity_num: String,

    /// 性别: 0=未知, 1=男, 2=女
    pub sex: i32,

    /// 民族
    #[sea_orm(column_type = "String(Some(32))")]
    pub nation: String,

    /// 毕业院校
    #[sea_orm(column_type = "String(Some(64))")]
    pub school: String,

    /// 专业
    #[sea_orm(column_type = "String(Some(64))")]
    pub major: String,

    /// 学历
    #[sea_orm(column_type = "String(Some(32))")]
    pub edu_level: String,

    /// 基本工资
    pub base_salary: i64,

    /// 银行卡号
    #[sea_orm(column_type = "String(Some(32))")]
    pub card_num: String,

    /// 职级编号
    #[sea_orm(column_type = "String(Some(32))")]
    pub rank_id: String,

    /// 部门编号
    #[sea_orm(column_type = "String(Some(32))")]
    pub dep_id: String,

    /// 邮箱
    #[sea_orm(column_type = "String(Some(64))")]
    pub email: String,

    /// 入职日期 (YYYY-MM-DD)
    #[sea_orm(column_type = "String(Some(10))")]
    pub entry_date: String,

    pub created_at: i64,

    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

// 与部门、职级的关联通过编号手动查询

timestamped_behavior!();

impl Model {
    /// 初始登录密码: 身份证号后六位，身份证号不足六位时为 123456
    pub fn initial_password(&self) -> String {
        let chars: Vec<char> = self.identity_num.trim().chars().collect();
        if chars.len() < 6 {
            return "123456".to_string();
        }
        chars[chars.len() - 6..].iter().collect()
    }
}
