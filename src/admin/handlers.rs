use axum::{
    extract::State,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::content::RemoteFetch;
use crate::http::server::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct SystemStatus {
    pub version: String,
    pub status: String,
    /// Gate slots held by in-flight source calls.
    pub queued: usize,
    /// Callers waiting for a slot.
    pub waiting: usize,
    pub concurrency_limit: usize,
    pub cached_entries: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PurgeResult {
    pub removed: usize,
    pub remaining: usize,
}

pub async fn get_status<C: RemoteFetch>(
    State(state): State<AppState<C>>,
) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "operational".to_string(),
        queued: state.service.queued_count(),
        waiting: state.service.waiting_count(),
        concurrency_limit: state.service.concurrency_limit(),
        cached_entries: state.service.cached_entries(),
    })
}

pub async fn purge_cache<C: RemoteFetch>(
    State(state): State<AppState<C>>,
) -> Json<PurgeResult> {
    let removed = state.service.purge_expired();
    tracing::info!(removed, "Stale cache entries purged on request");

    Json(PurgeResult {
        removed,
        remaining: state.service.cached_entries(),
    })
}
