//! Operational endpoints.
//!
//! Read-only views of the gate and cache, plus a manual stale-entry purge.

pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};

use crate::content::RemoteFetch;
use crate::http::server::AppState;
use self::handlers::*;

pub fn admin_router<C: RemoteFetch>() -> Router<AppState<C>> {
    Router::new()
        .route("/admin/status", get(get_status::<C>))
        .route("/admin/cache/purge", post(purge_cache::<C>))
}
