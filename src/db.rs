use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection,
    DbBackend, DbErr, EntityTrait, PaginatorTrait, QueryFilter, Schema, Set, Statement,
};
use sea_orm::sea_query::{Index, TableCreateStatement};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::DatabaseConfig;
use crate::entity::authority::UserType;
use crate::entity::{
    authority, authority_detail, branch_company, department, notification, password, rank,
    salary, salary_record, staff,
};
use crate::util;

/// Login name of the bootstrap account created in an empty branch database
pub const BOOTSTRAP_STAFF_ID: &str = "admin";
const BOOTSTRAP_PASSWORD: &str = "admin";

const SALARY_RECORD_MONTH_KEY: &str = "uk_salary_record_staff_date";

/// Branch name -> connection pool, built once at startup
///
/// The first configured branch is the default database. It holds the
/// branch company table and is used before a branch has been chosen.
#[derive(Clone, Debug)]
pub struct DbRegistry {
    names: Vec<String>,
    branches: HashMap<String, Arc<DatabaseConnection>>,
}

impl DbRegistry {
    /// Build a registry from connections in configuration order
    pub fn from_connections(connections: Vec<(String, DatabaseConnection)>) -> Result<Self, DbErr> {
        if connections.is_empty() {
            return Err(DbErr::Custom("no branch database configured".to_string()));
        }
        let mut names = Vec::with_capacity(connections.len());
        let mut branches = HashMap::with_capacity(connections.len());
        for (name, conn) in connections {
            if branches.insert(name.clone(), Arc::new(conn)).is_none() {
                names.push(name);
            }
        }
        Ok(Self { names, branches })
    }

    /// Connection for a branch, if it was configured
    pub fn get(&self, name: &str) -> Option<&Arc<DatabaseConnection>> {
        self.branches.get(name)
    }

    /// Name of the default (first) branch database
    pub fn default_name(&self) -> &str {
        &self.names[0]
    }

    /// Connection to the default branch database
    pub fn default_db(&self) -> &Arc<DatabaseConnection> {
        &self.branches[self.default_name()]
    }

    /// Branch names in configuration order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.branches.contains_key(name)
    }
}

/// Connect to every configured branch database and auto-migrate its tables
pub async fn init_databases(config: &DatabaseConfig) -> Result<DbRegistry, DbErr> {
    let mut connections = Vec::new();
    for name in config.db_names() {
        let db = connect(config, &name).await?;
        auto_migrate(&db).await?;
        ensure_bootstrap_account(&db, &name).await?;
        ensure_default_authority_rules(&db).await?;
        info!("Branch database {} registered", name);
        connections.push((name, db));
    }

    let registry = DbRegistry::from_connections(connections)?;
    ensure_branch_companies(registry.default_db().as_ref(), registry.names()).await?;
    info!(
        "Database registry ready, default branch: {}",
        registry.default_name()
    );
    Ok(registry)
}

async fn connect(config: &DatabaseConfig, db_name: &str) -> Result<DatabaseConnection, DbErr> {
    info!("Connecting to database: {}:{}/{}", config.host, config.port, db_name);

    let mut opt = ConnectOptions::new(config.connection_url(db_name));
    opt.max_connections(100)
        .min_connections(5)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(60))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(true)
        .sqlx_logging_level(tracing::log::LevelFilter::Debug);

    let db = Database::connect(opt).await?;
    db.ping().await?;
    Ok(db)
}

/// Create every table if it does not exist yet (similar to GORM AutoMigrate)
async fn auto_migrate(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    info!("Running auto-migration for all entities...");

    // Referenced tables first
    create_table_if_not_exists(db, backend, schema.create_table_from_entity(department::Entity)).await?;
    create_table_if_not_exists(db, backend, schema.create_table_from_entity(rank::Entity)).await?;
    create_table_if_not_exists(db, backend, schema.create_table_from_entity(branch_company::Entity)).await?;
    create_table_if_not_exists(db, backend, schema.create_table_from_entity(notification::Entity)).await?;
    create_table_if_not_exists(db, backend, schema.create_table_from_entity(authority_detail::Entity)).await?;

    create_table_if_not_exists(db, backend, schema.create_table_from_entity(staff::Entity)).await?;
    create_table_if_not_exists(db, backend, schema.create_table_from_entity(password::Entity)).await?;
    create_table_if_not_exists(db, backend, schema.create_table_from_entity(authority::Entity)).await?;
    create_table_if_not_exists(db, backend, schema.create_table_from_entity(salary::Entity)).await?;
    create_table_if_not_exists(db, backend, salary_record_table(&schema)).await?;

    info!("Auto-migration completed successfully");
    Ok(())
}

/// `salary_record` holds at most one row per staff per month
fn salary_record_table(schema: &Schema) -> TableCreateStatement {
    let mut stmt = schema.create_table_from_entity(salary_record::Entity);
    stmt.index(
        Index::create()
            .name(SALARY_RECORD_MONTH_KEY)
            .unique()
            .col(salary_record::Column::StaffId)
            .col(salary_record::Column::SalaryDate),
    );
    stmt
}

async fn create_table_if_not_exists(
    db: &DatabaseConnection,
    backend: DbBackend,
    mut stmt: TableCreateStatement,
) -> Result<(), DbErr> {
    stmt.if_not_exists();

    let sql = backend.build(&stmt);

    db.execute(Statement::from_string(backend, sql.to_string())).await?;

    Ok(())
}

/// Create a `sys` account when a branch has no accounts at all
async fn ensure_bootstrap_account(db: &DatabaseConnection, branch: &str) -> Result<(), DbErr> {
    if authority::Entity::find().count(db).await? > 0 {
        return Ok(());
    }

    let hashed = bcrypt::hash(BOOTSTRAP_PASSWORD, bcrypt::DEFAULT_COST)
        .map_err(|e| DbErr::Custom(e.to_string()))?;

    password::ActiveModel {
        staff_id: Set(BOOTSTRAP_STAFF_ID.to_string()),
        password: Set(hashed),
        ..Default::default()
    }
    .insert(db)
    .await?;

    authority::ActiveModel {
        authority_id: Set(util::new_id(util::prefix::AUTHORITY)),
        staff_id: Set(BOOTSTRAP_STAFF_ID.to_string()),
        user_type: Set(UserType::Sys.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    warn!(
        "Branch {} had no accounts, created '{}' with the default password; change it after first login",
        branch, BOOTSTRAP_STAFF_ID
    );
    Ok(())
}

/// Model pages, their display names and the operations each user type gets
const DEFAULT_RULES: [(&str, &str, &str, &str); 7] = [
    ("staff", "员工管理", "create,edit,delete,query", "query"),
    ("department", "部门管理", "create,edit,delete,query", "query"),
    ("rank", "职级管理", "create,edit,delete,query", "query"),
    ("notification", "通知公告", "create,edit,delete,query", "query"),
    ("salary", "薪资配置", "create,edit,delete,query", "query"),
    ("salary_record", "薪资发放", "create,edit,delete,query,pay", "query"),
    ("authority", "权限管理", "create,edit,query,set_admin,set_normal", ""),
];

/// Seed authority detail rules when a branch has none
async fn ensure_default_authority_rules(db: &DatabaseConnection) -> Result<(), DbErr> {
    if authority_detail::Entity::find().count(db).await? > 0 {
        return Ok(());
    }

    for (model, name, manager_content, normal_content) in DEFAULT_RULES {
        for user_type in [UserType::Sys, UserType::Admin, UserType::Normal] {
            let content = if user_type.is_manager() { manager_content } else { normal_content };
            // Normal users get no page at all for manager-only models
            if content.is_empty() {
                continue;
            }
            authority_detail::ActiveModel {
                user_type: Set(user_type.to_string()),
                model: Set(model.to_string()),
                name: Set(name.to_string()),
                authority_content: Set(content.to_string()),
                ..Default::default()
            }
            .insert(db)
            .await?;
        }
    }

    info!("Seeded default authority rules");
    Ok(())
}

/// Make sure every configured branch is listed in the default database
async fn ensure_branch_companies(db: &DatabaseConnection, names: &[String]) -> Result<(), DbErr> {
    for name in names {
        let existing = branch_company::Entity::find()
            .filter(branch_company::Column::BranchId.eq(name.as_str()))
            .one(db)
            .await?;
        if existing.is_some() {
            continue;
        }

        branch_company::ActiveModel {
            branch_id: Set(name.clone()),
            name: Set(name.clone()),
            branch_desc: Set(String::new()),
            ..Default::default()
        }
        .insert(db)
        .await?;
        info!("Registered branch company {}", name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn mock() -> DatabaseConnection {
        MockDatabase::new(DatabaseBackend::MySql).into_connection()
    }

    #[test]
    fn test_registry_default_is_first() {
        let registry = DbRegistry::from_connections(vec![
            ("hrms_C001".to_string(), mock()),
            ("hrms_C002".to_string(), mock()),
        ])
        .unwrap();
        assert_eq!(registry.default_name(), "hrms_C001");
        assert_eq!(registry.names(), &["hrms_C001".to_string(), "hrms_C002".to_string()]);
        assert!(registry.contains("hrms_C002"));
        assert!(registry.get("hrms_C003").is_none());
    }

    #[test]
    fn test_registry_ignores_duplicates() {
        let registry = DbRegistry::from_connections(vec![
            ("a".to_string(), mock()),
            ("a".to_string(), mock()),
        ])
        .unwrap();
        assert_eq!(registry.names().len(), 1);
    }

    #[test]
    fn test_default_rules_cover_each_model_once() {
        let mut models: Vec<_> = DEFAULT_RULES.iter().map(|(model, ..)| *model).collect();
        models.sort();
        models.dedup();
        assert_eq!(models.len(), DEFAULT_RULES.len());
        assert!(DEFAULT_RULES.iter().all(|(_, _, manager, _)| !manager.is_empty()));
    }

    #[test]
    fn test_salary_record_month_is_unique() {
        let backend = DbBackend::MySql;
        let sql = backend
            .build(&salary_record_table(&Schema::new(backend)))
            .to_string();
        assert!(sql.contains(SALARY_RECORD_MONTH_KEY));
        assert!(sql.contains("UNIQUE"));
        assert!(sql.contains("`staff_id`, `salary_date`"));
    }

    #[test]
    fn test_registry_requires_a_branch() {
        assert!(DbRegistry::from_connections(Vec::new()).is_err());
    }
}
