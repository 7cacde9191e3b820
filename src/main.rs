//! Starts the payroll HTTP server.
//!
//! Environment:
//! - `PAYROLL_CONFIG_DIR`: statutory configuration directory (default `./config/vn_2024`)
//! - `PAYROLL_SEED_FILE`: optional JSON directory snapshot to preload employees and attendance
//! - `PORT`: listen port (default 8080)
//! - `RUST_LOG`: log filter (default `info`)

use std::sync::Arc;

use payroll_engine::api::{create_router, AppState};
use payroll_engine::config::ConfigLoader;
use payroll_engine::directory::InMemoryDirectory;
use payroll_engine::service::PayrollService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config_dir =
        std::env::var("PAYROLL_CONFIG_DIR").unwrap_or_else(|_| "./config/vn_2024".to_string());
    let loader = ConfigLoader::load(&config_dir).map_err(|e| {
        tracing::error!("Configuration load failed: {e}");
        e
    })?;
    tracing::info!(
        regime = %loader.metadata().code,
        version = %loader.metadata().version,
        "Loaded payroll configuration from {}",
        config_dir
    );

    let directory = match std::env::var("PAYROLL_SEED_FILE") {
        Ok(path) => {
            let directory = InMemoryDirectory::load(&path).map_err(|e| {
                tracing::error!("Seed file load failed: {e}");
                e
            })?;
            tracing::info!("Seeded employee directory from {}", path);
            directory
        }
        Err(_) => {
            tracing::warn!("PAYROLL_SEED_FILE not set; starting with an empty directory");
            InMemoryDirectory::new()
        }
    };
    let directory = Arc::new(directory);

    let service = PayrollService::new(loader.into_config(), directory.clone(), directory);
    let app = create_router(AppState::new(service));

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Payroll API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
