use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::Config;
use crate::db::DbRegistry;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// One connection pool per branch company
    pub dbs: Arc<DbRegistry>,
    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state
    pub fn new(dbs: DbRegistry, config: Config) -> Self {
        Self {
            dbs: Arc::new(dbs),
            config: Arc::new(config),
        }
    }

    /// Database of one branch company
    pub fn branch_db(&self, branch_id: &str) -> Option<Arc<DatabaseConnection>> {
        self.dbs.get(branch_id).cloned()
    }

    /// Default database, holds the branch company list
    pub fn default_db(&self) -> Arc<DatabaseConnection> {
        Arc::clone(self.dbs.default_db())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[test]
    fn test_branch_lookup() {
        let registry = DbRegistry::from_connections(vec![(
            "hrms_C001".to_string(),
            MockDatabase::new(DatabaseBackend::MySql).into_connection(),
        )])
        .unwrap();
        let state = AppState::new(registry, Config::default());
        assert!(state.branch_db("hrms_C001").is_some());
        assert!(state.branch_db("hrms_C009").is_none());
    }
}
