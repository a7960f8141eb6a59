//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the content source client and the content service from config
//! - Start background tasks (cache sweeper)
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The service is built once and shared by `Arc`

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::broadcast;

use crate::cache::sweeper::run_sweeper;
use crate::config::GatewayConfig;
use crate::content::{
    ContentError, ContentService, ContentstackClient, FetchError, RemoteFetch, ServiceSettings,
};

/// Errors that stop the gateway from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Content source client: {0}")]
    Client(#[from] FetchError),

    #[error("Content service: {0}")]
    Service(#[from] ContentError),
}

/// Build the production content service.
pub fn build_service(
    config: &GatewayConfig,
) -> Result<Arc<ContentService<ContentstackClient>>, StartupError> {
    let client = ContentstackClient::new(&config.contentstack)?;
    let settings = ServiceSettings::from_config(config);

    tracing::info!(
        concurrency_limit = settings.concurrency_limit,
        entry_timeout_secs = settings.entry_timeout.as_secs(),
        collection_timeout_secs = settings.collection_timeout.as_secs(),
        admission_timeout_secs = settings.admission_timeout.as_secs(),
        cache_ttl_secs = settings.cache_ttl.as_secs(),
        single_flight = settings.single_flight,
        "Content service configured"
    );

    Ok(Arc::new(ContentService::new(client, settings)?))
}

/// Spawn the periodic stale-entry sweep if enabled.
pub fn spawn_cache_sweeper<C: RemoteFetch>(
    config: &GatewayConfig,
    service: Arc<ContentService<C>>,
    shutdown: broadcast::Receiver<()>,
) {
    if !config.cache.sweep_enabled {
        tracing::info!("Cache sweeper disabled");
        return;
    }

    let interval = config.cache.ttl();
    tokio::spawn(async move {
        run_sweeper(interval, shutdown, move || service.purge_expired()).await;
    });
}
