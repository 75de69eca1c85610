use anyhow::{Context, Result};
use feeder::api::{create_health_router, create_webhook_router, HealthAppState, WebhookAppState};
use feeder::line::LineClient;
use feeder::store::FirebaseClient;
use feeder::{ChangeMonitor, CommandDispatcher};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "feeder=info,tower_http=info".into()),
        )
        .init();

    if let Err(e) = dotenvy::dotenv() {
        warn!(error = %e, ".env file not loaded, using process environment");
    }

    info!("Feeder starting...");

    let config = feeder::config::from_env().context("Invalid configuration")?;

    info!(
        port = config.server.port,
        webhook_path = %config.server.webhook_path,
        database_url = %config.store.database_url,
        poll_interval_secs = config.monitor.poll_interval_seconds,
        "Configuration loaded"
    );

    let store = Arc::new(FirebaseClient::new(&config.store)?);
    let transport = Arc::new(LineClient::new(&config.line)?);

    // Start change monitor
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let monitor = ChangeMonitor::new(
        store.clone(),
        transport.clone(),
        Duration::from_secs(config.monitor.poll_interval_seconds),
    );
    let monitor_status = monitor.status();
    let monitor_handle = monitor.start(shutdown_rx);

    // HTTP server
    let dispatcher = CommandDispatcher::new(store, transport)
        .with_feed_threshold(config.dispatcher.feed_threshold);

    let app = create_webhook_router(
        WebhookAppState {
            dispatcher,
            channel_secret: config.line.channel_secret.clone(),
        },
        &config.server.webhook_path,
    )
    .merge(create_health_router(HealthAppState { monitor_status }))
    .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.server.bind_address, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(address = %addr, "Webhook server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for ctrl_c signal");
            }
            info!("Shutdown signal received");
        })
        .await
        .context("Webhook server error")?;

    // Stop the monitor once the server has drained
    let _ = shutdown_tx.send(true);
    if let Err(e) = monitor_handle.await {
        warn!(error = %e, "Change monitor task ended abnormally");
    }

    info!("Feeder stopped");
    Ok(())
}
