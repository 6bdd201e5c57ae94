//! Funnel Server — application entry point.

use std::env;
use std::process::ExitCode;

use funnel_db::{DbConfig, DbManager};
use tracing_subscriber::EnvFilter;

/// Build the database configuration from `FUNNEL_DB_*` environment
/// variables, falling back to defaults for anything unset.
fn db_config_from_env() -> DbConfig {
    let defaults = DbConfig::default();
    DbConfig {
        url: env::var("FUNNEL_DB_URL").unwrap_or(defaults.url),
        namespace: env::var("FUNNEL_DB_NS").unwrap_or(defaults.namespace),
        database: env::var("FUNNEL_DB_NAME").unwrap_or(defaults.database),
        username: env::var("FUNNEL_DB_USER").unwrap_or(defaults.username),
        password: env::var("FUNNEL_DB_PASS").unwrap_or(defaults.password),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("funnel=info".parse().unwrap()),
        )
        .json()
        .init();

    tracing::info!("Starting Funnel server...");

    let config = db_config_from_env();
    let manager = match DbManager::connect(&config).await {
        Ok(manager) => manager,
        Err(err) => {
            tracing::error!(error = %err, "failed to connect to SurrealDB");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = funnel_db::run_migrations(manager.client()).await {
        tracing::error!(error = %err, "failed to apply migrations");
        return ExitCode::FAILURE;
    }

    tracing::info!("Storage ready, migrations applied");

    // TODO: mount the HTTP request layer once the routing surface lands

    tracing::info!("Funnel server stopped.");
    ExitCode::SUCCESS
}
