use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable selecting which config file to load
pub const ENV_KEY: &str = "HRMS_ENV";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub gin: ServerConfig,
    /// Database configuration shared by every branch database
    #[serde(default)]
    pub db: DatabaseConfig,
    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
    /// Directory holding HTML views (404 page, index, model pages)
    #[serde(default = "default_views_dir")]
    pub views_dir: PathBuf,
    /// Directory served under /static
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Listening port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Database user
    #[serde(default = "default_db_user")]
    pub user: String,
    /// Database password
    #[serde(default)]
    pub password: String,
    /// Database host
    #[serde(default = "default_db_host")]
    pub host: String,
    /// Database port
    #[serde(default = "default_db_port")]
    pub port: u16,
    /// Comma-separated branch database names; the first one is the default
    #[serde(default = "default_db_name", rename = "dbName", alias = "db_name", alias = "dbname")]
    pub db_name: String,
}

fn default_port() -> u16 {
    8889
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_views_dir() -> PathBuf {
    PathBuf::from("./views")
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("./static")
}

fn default_db_user() -> String {
    "root".to_string()
}

fn default_db_host() -> String {
    "127.0.0.1".to_string()
}

fn default_db_port() -> u16 {
    3306
}

fn default_db_name() -> String {
    "hrms_C001".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gin: ServerConfig::default(),
            db: DatabaseConfig::default(),
            log: LogConfig::default(),
            views_dir: default_views_dir(),
            static_dir: default_static_dir(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            user: default_db_user(),
            password: String::new(),
            host: default_db_host(),
            port: default_db_port(),
            db_name: default_db_name(),
        }
    }
}

impl DatabaseConfig {
    /// Branch database names in declaration order, blanks skipped
    pub fn db_names(&self) -> Vec<String> {
        self.db_name
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Generate the connection URL for one branch database
    pub fn connection_url(&self, db_name: &str) -> String {
        format!(
            "mysql://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, db_name
        )
    }
}

/// Map the value of `HRMS_ENV` to a config file name
pub fn config_file_name(env: Option<&str>) -> anyhow::Result<&'static str> {
    match env {
        None | Some("") | Some("dev") => Ok("config-dev.yaml"),
        Some("prod") => Ok("config-prod.yaml"),
        Some(other) => anyhow::bail!("unknown {} value '{}', expected dev or prod", ENV_KEY, other),
    }
}

impl Config {
    /// Load the config file selected by `HRMS_ENV` from `config_dir`
    pub fn load_from_env(config_dir: &Path) -> anyhow::Result<(Self, PathBuf)> {
        let env = std::env::var(ENV_KEY).ok();
        let path = config_dir.join(config_file_name(env.as_deref())?);
        let config = Self::load(&path)?;
        Ok((config, path))
    }

    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse and validate YAML content
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: Config = serde_yaml::from_str(content)?;
        if config.db.db_names().is_empty() {
            anyhow::bail!("db.dbName must list at least one branch database");
        }
        Ok(config)
    }
}
