//! Warden Server: application entry point.

mod settings;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;
use warden_auth::{AuthService, spawn_sweeper};
use warden_db::DbManager;
use warden_db::repository::{SurrealAccountRepository, SurrealSessionRepository};

use crate::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warden=info".parse()?))
        .json()
        .init();

    info!("Starting Warden server...");

    let settings = Settings::load().context("failed to load configuration")?;

    let db = DbManager::connect_and_migrate(&settings.db_config())
        .await
        .context("failed to initialize SurrealDB")?;

    let accounts = SurrealAccountRepository::new(db.client().clone());
    let sessions = SurrealSessionRepository::new(db.client().clone());
    let auth = AuthService::new(accounts, sessions, settings.auth_config())
        .context("invalid authentication settings")?;

    let sweeper = spawn_sweeper(auth.session_manager(), settings.sweep_interval());
    info!(
        session_ttl_secs = settings.auth.session_ttl_secs,
        sweep_interval_secs = settings.sweep_interval().as_secs(),
        "Authentication service ready"
    );

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;

    sweeper.abort();
    info!("Warden server stopped.");

    Ok(())
}
