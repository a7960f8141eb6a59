//! Content gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request        ┌──────────────────────────────────────────────────────┐
//!     ──────────────────────┼─▶ http (axum) ─▶ content service                      │
//!                           │                     │                                 │
//!                           │                     ▼                                 │
//!                           │              read-through cache ── hit ──┐            │
//!                           │                     │ miss               │            │
//!                           │                     ▼                    │            │
//!                           │              concurrency gate            │            │
//!                           │                     │                    │            │
//!                           │                     ▼                    │            │
//!                           │              timeout race ───────────────┼────────────┼──▶ Content
//!                           │                     │                    │            │    Delivery API
//!     Client Response       │                     ▼                    ▼            │
//!     ◀─────────────────────┼──────────── outcome reporter (logs, metrics)          │
//!                           └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use content_gateway::config::{loader, load_config};
use content_gateway::http::HttpServer;
use content_gateway::lifecycle::{signals, startup, Shutdown};
use content_gateway::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "content-gateway")]
#[command(about = "Cached, rate-bounded gateway to a content delivery API", long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Without it, defaults and the
    /// environment are used.
    #[arg(short, long, env = "CONTENT_GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => loader::config_from_env()?,
    };

    logging::init_logging(&config.observability)?;

    tracing::info!("content-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        environment = %config.contentstack.environment,
        locale = %config.contentstack.locale,
        region = ?config.contentstack.region,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<std::net::SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let service = startup::build_service(&config)?;
    let shutdown = Shutdown::new();

    startup::spawn_cache_sweeper(&config, service.clone(), shutdown.subscribe());

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(&config, service.clone());
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    signals::wait_for_signal().await;
    shutdown.trigger();
    service.close();

    server_task.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}
