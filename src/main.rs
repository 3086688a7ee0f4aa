use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use hrms::config::{Config, ENV_KEY};
use hrms::{db, routes, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    if args.iter().any(|arg| arg == "-help" || arg == "--help") {
        println!("Usage: hrms [OPTIONS]");
        println!("Options:");
        println!("  -config <dir>   Directory holding config-dev.yaml / config-prod.yaml (default: ./config)");
        println!("  -help, --help   Print this help message");
        println!("Environment:");
        println!("  {}=dev|prod  Select the config file (default: dev)", ENV_KEY);
        return Ok(());
    }

    let config_dir = args
        .iter()
        .skip_while(|arg| arg.as_str() != "-config")
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("./config"));

    // Load configuration first (before logging init)
    let (config, config_path) = Config::load_from_env(&config_dir).map_err(|e| {
        eprintln!("Could not load config from {}: {}", config_dir.display(), e);
        e
    })?;

    // Initialize logging
    // Priority: RUST_LOG env var > config file > default "info"
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.level));

    fmt::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    info!("Starting HRMS server...");
    info!("Loaded config from {}", config_path.display());

    let dbs = db::init_databases(&config.db).await.map_err(|e| {
        tracing::error!("Database initialization failed: {}", e);
        anyhow::anyhow!("Database initialization failed: {}", e)
    })?;
    info!(
        "Branch databases ready: {} (default: {})",
        dbs.names().join(", "),
        dbs.default_name()
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.gin.port));

    // Create application state
    let state = AppState::new(dbs, config);

    // Create router
    let app = routes::create_router(state);

    info!("Server listening on {}", addr);

    // Start server
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
