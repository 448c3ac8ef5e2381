use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use ecoquest_core::{Clock, SystemClock};
use ecoquest_gateway::GatewayBuilder;
use ecoquest_server::api::AppState;
use ecoquest_server::config::EcoQuestConfig;

/// EcoQuest HTTP server.
#[derive(Parser, Debug)]
#[command(
    name = "ecoquest-server",
    about = "Air quality, forecast, and carbon API with daily limits and points"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "ecoquest.toml")]
    config: String,

    /// Override the bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Load configuration from TOML file, or use defaults if the file does not exist.
    let config = EcoQuestConfig::load(&cli.config)?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = ecoquest_server::state_factory::create_store(&config.state).await?;
    let providers =
        ecoquest_server::provider_factory::create_providers(&config.providers, Arc::clone(&clock))?;

    let gateway = GatewayBuilder::new()
        .store(store)
        .clock(clock)
        .limits(config.quotas)
        .rewards(config.rewards)
        .air_quality(providers.air_quality)
        .forecast(providers.forecast)
        .carbon(providers.carbon)
        .provider_timeout(Duration::from_secs(config.providers.timeout_seconds))
        .build()?;
    let gateway = Arc::new(gateway);

    info!(
        aqi_checks = config.quotas.aqi_checks,
        forecast_checks = config.quotas.forecast_checks,
        carbon_calculations = config.quotas.carbon_calculations,
        "daily limits configured"
    );

    let state = AppState {
        gateway: Arc::clone(&gateway),
    };
    let app = ecoquest_server::api::router(state);

    // Resolve the bind address (CLI overrides take precedence).
    let host = cli.host.unwrap_or(config.server.host);
    let port = cli.port.unwrap_or(config.server.port);
    let addr = format!("{host}:{port}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "ecoquest-server listening");

    // Serve with graceful shutdown on SIGINT / SIGTERM.
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Close the counter store (with configurable timeout).
    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_seconds);
    info!(
        timeout_secs = config.server.shutdown_timeout_seconds,
        "closing counter store"
    );
    if tokio::time::timeout(shutdown_timeout, gateway.shutdown())
        .await
        .is_err()
    {
        warn!(
            timeout_secs = config.server.shutdown_timeout_seconds,
            "counter store did not close before the shutdown timeout"
        );
    }

    info!("ecoquest-server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("received SIGINT"); }
        () = terminate => { info!("received SIGTERM"); }
    }
}
