//! Locale gateway: locale negotiation and static serving for a multilingual site.

use tokio::signal;
use tracing::info;

use locale_gateway::config::Config;
use locale_gateway::startup::build_app;
use locale_gateway::telemetry::{init_metrics, setup_telemetry};

/// Build version (injected at compile time).
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::init()?;
    setup_telemetry(&config);
    let metrics_handle = init_metrics();

    info!(
        version = VERSION,
        address = %config.http_address,
        locales = %config.supported_locales,
        default_locale = %config.default_locale,
        pid = std::process::id(),
        "Starting locale-gateway"
    );

    let (app, addr) = build_app(&config, metrics_handle)?;

    info!(address = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
