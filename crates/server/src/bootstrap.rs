use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use bookery_core::catalog::ServiceCatalog;
use bookery_core::config::{AppConfig, ConfigError, LoadOptions};
use bookery_db::{
    connect_with_settings, migrations, DbPool, ReservationLedger, SqlReservationLedger,
};
use bookery_tools::{booking_registry, ToolRegistry};

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub registry: Arc<ToolRegistry>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let ledger: Arc<dyn ReservationLedger> = Arc::new(SqlReservationLedger::new(db_pool.clone()));
    let registry = Arc::new(booking_registry(
        ledger,
        ServiceCatalog::default(),
        config.dispatch.argument_mode,
    ));
    info!(
        event_name = "system.bootstrap.registry_ready",
        correlation_id = "bootstrap",
        tool_count = registry.len(),
        "tool registry populated"
    );

    Ok(Application { config, db_pool, registry })
}
