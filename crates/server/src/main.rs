mod api;
mod bootstrap;
mod health;
mod messaging;
mod slack_events;

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use axum::Router;
use faqbot_core::config::{AppConfig, LoadOptions};
use tokio::sync::watch;
use tracing::{error, info, warn};

fn init_logging(config: &AppConfig) {
    use faqbot_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;
    let bind_address = app.config.server.bind_address.clone();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let http = serve(
        "http",
        format!("{bind_address}:{}", app.config.server.http_port),
        api::router(app.api.clone(), app.records.clone()),
        wait_for(shutdown_rx.clone()),
    )
    .await?;
    let slack = serve(
        "slack_events",
        format!("{bind_address}:{}", app.config.server.slack_events_port),
        slack_events::router(app.slack.clone()),
        wait_for(shutdown_rx),
    )
    .await?;

    info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        http_port = app.config.server.http_port,
        slack_events_port = app.config.server.slack_events_port,
        "faqbot-server started"
    );

    tokio::signal::ctrl_c().await?;
    info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        "faqbot-server stopping"
    );
    let _ = shutdown_tx.send(true);

    let grace = Duration::from_secs(app.config.server.graceful_shutdown_secs);
    let drained = tokio::time::timeout(grace, async {
        let _ = http.await;
        let _ = slack.await;
    })
    .await;
    if drained.is_err() {
        warn!(
            event_name = "system.server.shutdown_timeout",
            correlation_id = "shutdown",
            grace_secs = grace.as_secs(),
            "listeners did not drain before the shutdown deadline"
        );
    }

    app.db_pool.close().await;
    Ok(())
}

async fn serve(
    name: &'static str,
    address: String,
    router: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<tokio::task::JoinHandle<()>> {
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!(
        event_name = "system.listener.start",
        correlation_id = "bootstrap",
        listener = name,
        bind_address = %address,
        "listener started"
    );

    Ok(tokio::spawn(async move {
        if let Err(error) = axum::serve(listener, router).with_graceful_shutdown(shutdown).await {
            error!(
                event_name = "system.listener.error",
                correlation_id = "bootstrap",
                listener = name,
                error = %error,
                "listener terminated unexpectedly"
            );
        }
    }))
}

async fn wait_for(mut shutdown: watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stopping| *stopping).await;
}
