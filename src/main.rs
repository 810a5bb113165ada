use anyhow::Result;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

mod api;
mod config;
mod engine;
mod models;
mod probe;
mod registry;
mod status;
mod store;

use crate::config::MonitorConfig;
use crate::engine::Monitor;
use crate::store::Store;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_ansi(true)
        .init();

    let config = MonitorConfig::load("config.json")?;

    let store = Store::new(&config.save_file);
    let saved = match store.load() {
        Ok(targets) => targets,
        Err(e) => {
            // Recoverable: run with an empty list, durability resumes on
            // the next successful save.
            warn!("could not load saved targets, starting empty: {:#}", e);
            Vec::new()
        }
    };
    info!("loaded {} saved targets from {}", saved.len(), config.save_file);

    let monitor = Arc::new(Monitor::new(config.clone(), store, saved));

    let api_state = Arc::clone(&monitor);
    let api_port = config.api_port;
    tokio::spawn(async move {
        api::start_server(api_port, api_state).await;
    });

    let engine = Arc::clone(&monitor);
    tokio::spawn(async move {
        engine.run().await;
    });

    signal::ctrl_c().await?;
    info!("Shutdown signal received. Closing reachwatch...");

    Ok(())
}
