use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::signal;
use tracing::{info, Level};
use tracing_subscriber;

use gatekeeper::config::GatekeeperConfig;
use gatekeeper::http::HttpServer;
use gatekeeper::ratelimit::RateLimiter;

#[derive(Parser, Debug)]
#[command(name = "gatekeeper")]
#[command(about = "Per-key fixed-window rate limiting service")]
struct Args {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Override the listen address
    #[arg(long)]
    listen: Option<std::net::SocketAddr>,

    /// Override the default requests-per-window limit
    #[arg(long)]
    limit: Option<u32>,

    /// Override the window length in seconds
    #[arg(long)]
    window_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .init();

    info!("Starting Gatekeeper Rate Limiting Service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    // Load configuration, then apply CLI overrides
    let mut config = match &args.config {
        Some(path) => GatekeeperConfig::from_file(path)?,
        None => GatekeeperConfig::default(),
    };
    if let Some(listen) = args.listen {
        config.server.listen_addr = listen;
    }
    if let Some(limit) = args.limit {
        config.rate_limiting.default_limit = limit;
    }
    if let Some(window_secs) = args.window_secs {
        config.rate_limiting.window_secs = window_secs;
    }
    config.validate()?;
    info!(
        listen_addr = %config.server.listen_addr,
        default_limit = config.rate_limiting.default_limit,
        window_secs = config.rate_limiting.window_secs,
        "Configuration loaded"
    );

    // Initialize the rate limiter
    let limiter = Arc::new(
        RateLimiter::new(config.rate_limiting.rules())
            .with_eviction_grace(config.rate_limiting.eviction_grace_secs),
    );
    info!("Rate limiter initialized");

    // Periodic sweep keeps the key store from growing without bound
    let sweeper = Arc::clone(&limiter);
    let sweep_interval = Duration::from_secs(config.rate_limiting.sweep_interval_secs);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_interval);
        interval.tick().await;
        loop {
            interval.tick().await;
            sweeper.evict_stale();
        }
    });

    // Run the server with graceful shutdown on Ctrl+C
    let server = HttpServer::new(config.server.listen_addr, limiter);
    server.serve_with_shutdown(shutdown_signal()).await?;

    info!("Gatekeeper Rate Limiting Service stopped");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM).
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
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
