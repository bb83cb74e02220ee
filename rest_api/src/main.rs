// rest_api/src/main.rs

use anyhow::{Context, Result};
use log::info;
use rest_api::config::load_rest_api_config;
use rest_api::start_server;
use scheduler::Clinic;

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal.");
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_rest_api_config()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log.level.as_str())).init();

    let clinic = Clinic::open(&config.storage).context("Failed to open clinic storage")?;
    info!(
        "Clinic scheduler starting on http://{}:{} ({} storage)",
        config.app.host, config.app.port, config.storage.engine_type
    );
    start_server(&config.app, clinic, shutdown_signal()).await
}
