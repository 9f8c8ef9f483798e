//! # Appdock API Main Entry Point
//!
//! This is the main entry point for the Appdock API service.

use appdock::{
    config::ConfigLoader, db::init_pool, seeds::seed_plans, server::run_server, telemetry,
};
use migration::{Migrator, MigratorTrait};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from layered env files and variables
    let config = ConfigLoader::new().load()?;

    telemetry::init_tracing(&config)?;
    tracing::info!(profile = %config.profile, "Loaded configuration");
    if let Ok(redacted_json) = config.redacted_json() {
        tracing::debug!(config = %redacted_json, "Effective configuration");
    }

    let db = init_pool(&config).await?;
    Migrator::up(&db, None).await?;
    seed_plans(&db).await?;

    run_server(config, db).await
}
