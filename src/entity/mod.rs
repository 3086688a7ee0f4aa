//! Entity module - SeaORM 实体定义
//!
//! 包含所有数据库表对应的实体模型，每个分公司数据库拥有同样的表结构

/// 为实体生成 ActiveModelBehavior，在保存前写入 created_at / updated_at
macro_rules! timestamped_behavior {
    () => {
        #[async_trait::async_trait]
        impl ActiveModelBehavior for ActiveModel {
            async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
            where
                C: ConnectionTrait,
            {
                let now = chrono::Utc::now().timestamp();
                if insert {
                    self.created_at = sea_orm::ActiveValue::Set(now);
                }
                self.updated_at = sea_orm::ActiveValue::Set(now);
                Ok(self)
            }
        }
    };
}

pub mod authority;
pub mod authority_detail;
pub mod branch_company;
pub mod department;
pub mod notification;
pub mod password;
pub mod rank;
pub mod salary;
pub mod salary_record;
pub mod staff;
