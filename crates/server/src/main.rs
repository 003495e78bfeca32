mod bootstrap;
mod health;
mod sweeper;
mod webhook;

use std::time::Duration;

use anyhow::Result;
use axum::Router;
use innerspace_core::config::{AppConfig, LoadOptions};
use tracing_subscriber::EnvFilter;

use crate::bootstrap::Application;
use crate::health::HealthState;
use crate::webhook::WebhookState;

fn init_logging(config: &AppConfig) {
    use innerspace_core::config::LogFormat::*;

    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_target(false).with_env_filter(filter);

    match config.logging.format {
        Compact => builder.compact().init(),
        Pretty => builder.pretty().init(),
        Json => builder.json().init(),
    }
}

fn app_router(app: &Application) -> Router {
    health::router(HealthState::new(app.db_pool.clone(), app.conversations.clone()))
        .merge(webhook::router(WebhookState::new(app.controller.clone(), &app.config.whatsapp)))
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;

    let sweeper = sweeper::spawn(
        app.conversations.clone(),
        Duration::from_secs(app.config.conversation.sweep_interval_secs),
    );

    let address = app.config.socket_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        bind_address = %address,
        webhook_path = webhook::WEBHOOK_PATH,
        "innerspace-server listening"
    );

    let router = app_router(&app);
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
    });

    wait_for_shutdown().await;
    let _ = shutdown_tx.send(());

    let grace = Duration::from_secs(app.config.server.graceful_shutdown_secs);
    match tokio::time::timeout(grace, server).await {
        Ok(joined) => joined??,
        Err(_) => tracing::warn!(
            event_name = "system.server.drain_timeout",
            correlation_id = "shutdown",
            grace_secs = grace.as_secs(),
            "in-flight requests did not finish before the grace period"
        ),
    }

    sweeper.abort();
    app.db_pool.close().await;
    tracing::info!(
        event_name = "system.server.stopped",
        correlation_id = "shutdown",
        "innerspace-server stopped"
    );

    Ok(())
}

async fn wait_for_shutdown() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(
            event_name = "system.server.signal_error",
            correlation_id = "shutdown",
            error = %error,
            "failed to listen for shutdown signal"
        );
    }
    tracing::info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        "shutdown signal received; draining requests"
    );
}
