use std::sync::Arc;

use smartbuy_core::auth::PasswordHasher;
use smartbuy_core::config::{AppConfig, ConfigError, LoadOptions};
use smartbuy_core::recommend::{CategoryRules, RecommendationEngine};
use smartbuy_db::repositories::{
    SqlFeedbackRepository, SqlProductRepository, SqlSessionRepository, SqlUserRepository,
};
use smartbuy_db::{connect_with_settings, migrations, DbPool};
use thiserror::Error;
use tracing::info;

use crate::api::AppState;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub state: AppState,
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

    let products = Arc::new(SqlProductRepository::new(db_pool.clone()));
    let state = AppState {
        products: products.clone(),
        users: Arc::new(SqlUserRepository::new(db_pool.clone())),
        sessions: Arc::new(SqlSessionRepository::new(db_pool.clone())),
        feedback: Arc::new(SqlFeedbackRepository::new(db_pool.clone())),
        engine: Arc::new(RecommendationEngine::new(products, CategoryRules::default())),
        hasher: Arc::new(PasswordHasher::new(&config.auth.token_secret)),
        session_ttl_secs: config.auth.session_ttl_secs,
    };

    Ok(Application { config, db_pool, state })
}
