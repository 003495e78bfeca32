use std::sync::Arc;
use std::time::Duration;

use innerspace_core::config::{AppConfig, ConfigError};
use innerspace_db::{
    connect_from_config, migrations, DbPool, SqlAssetCatalog, SqlBookingRepository,
};
use innerspace_whatsapp::templates::TemplateError;
use innerspace_whatsapp::{
    CloudApiGateway, DialogueController, GatewayError, InMemoryConversationStore,
    MessagingGateway,
};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub controller: Arc<DialogueController>,
    pub conversations: Arc<InMemoryConversationStore>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("whatsapp gateway setup failed: {0}")]
    Gateway(#[from] GatewayError),
    #[error("message templates failed to load: {0}")]
    Templates(#[from] TemplateError),
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );
    let gateway = CloudApiGateway::from_config(&config)?;
    info!(
        event_name = "system.bootstrap.gateway_ready",
        correlation_id = "bootstrap",
        endpoint = gateway.endpoint(),
        "whatsapp cloud api gateway configured"
    );
    bootstrap_with_gateway(config, Arc::new(gateway)).await
}

/// Wires the dialogue engine to an explicit outbound gateway.
pub async fn bootstrap_with_gateway(
    config: AppConfig,
    gateway: Arc<dyn MessagingGateway>,
) -> Result<Application, BootstrapError> {
    let db_pool =
        connect_from_config(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
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

    let conversations = Arc::new(InMemoryConversationStore::with_idle_timeout(
        Duration::from_secs(config.conversation.idle_timeout_secs),
    ));
    let controller = DialogueController::new(
        Arc::new(SqlAssetCatalog::new(db_pool.clone())),
        Arc::new(SqlBookingRepository::new(db_pool.clone())),
        conversations.clone(),
        gateway,
    )?;

    Ok(Application { config, db_pool, controller: Arc::new(controller), conversations })
}
