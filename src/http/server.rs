//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, request timeout)
//! - Bind server to listener and shut down gracefully
//! - Dispatch content requests to the content service

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin;
use crate::config::GatewayConfig;
use crate::content::{ContentService, EntryParams, PageParams, RemoteFetch};
use crate::http::request::{request_span, UuidRequestId, X_REQUEST_ID};
use crate::http::response::ApiResponse;
use crate::observability::metrics;

/// Application state injected into handlers.
pub struct AppState<C> {
    pub service: Arc<ContentService<C>>,
}

impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
        }
    }
}

/// HTTP server for the content API.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server around a shared content service.
    pub fn new<C: RemoteFetch>(config: &GatewayConfig, service: Arc<ContentService<C>>) -> Self {
        Self {
            router: build_router(config, service),
        }
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router<C: RemoteFetch>(config: &GatewayConfig, service: Arc<ContentService<C>>) -> Router {
    let state = AppState { service };

    Router::new()
        .route("/content/entry/{content_type}/{entry_id}", get(get_entry::<C>))
        .route("/content/entries/{content_type}", get(get_entries::<C>))
        .merge(admin::admin_router::<C>())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
                .layer(TraceLayer::new_for_http().make_span_with(request_span))
                .layer(TimeoutLayer::new(Duration::from_secs(
                    config.listener.request_timeout_secs,
                )))
                .layer(PropagateRequestIdLayer::new(X_REQUEST_ID)),
        )
}

/// `GET /content/entry/{content_type}/{entry_id}`
async fn get_entry<C: RemoteFetch>(
    State(state): State<AppState<C>>,
    Path((content_type, entry_id)): Path<(String, String)>,
    Query(params): Query<EntryParams>,
) -> Response {
    let response = ApiResponse::from(state.service.entry(&content_type, &entry_id, &params).await);
    metrics::record_request("entry", response.status().as_u16());
    response.into_response()
}

/// `GET /content/entries/{content_type}`
async fn get_entries<C: RemoteFetch>(
    State(state): State<AppState<C>>,
    Path(content_type): Path<String>,
    Query(params): Query<PageParams>,
) -> Response {
    let response = ApiResponse::from(state.service.entries(&content_type, &params).await);
    metrics::record_request("entries", response.status().as_u16());
    response.into_response()
}
