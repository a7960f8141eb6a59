//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use content_gateway::config::GatewayConfig;
use content_gateway::content::{
    ContentService, FetchError, FetchQuery, RemoteFetch, ServiceSettings,
};

/// How the fake source answers.
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Answer immediately with this payload.
    Respond(Value),
    /// Answer with this payload after a delay.
    Delay(Duration, Value),
    /// Never answer.
    Hang,
    /// Answer "nothing there".
    Missing,
    /// Fail with a status error.
    Fail(String),
    /// Fail with a status error after a delay.
    FailAfter(Duration, String),
}

#[derive(Debug)]
struct FakeState {
    behavior: Mutex<Behavior>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    queries: Mutex<Vec<FetchQuery>>,
}

/// Scriptable in-memory content source that counts calls and concurrency.
#[derive(Debug, Clone)]
pub struct FakeSource {
    state: Arc<FakeState>,
}

impl FakeSource {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            state: Arc::new(FakeState {
                behavior: Mutex::new(behavior),
                calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                queries: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn set_behavior(&self, behavior: Behavior) {
        *self.state.behavior.lock().unwrap() = behavior;
    }

    /// Number of calls that reached the source.
    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    pub fn in_flight(&self) -> usize {
        self.state.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneous calls observed.
    pub fn peak(&self) -> usize {
        self.state.peak.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<FetchQuery> {
        self.state.queries.lock().unwrap().clone()
    }

    async fn answer(&self, query: &FetchQuery) -> Result<Option<Value>, FetchError> {
        self.state.calls.fetch_add(1, Ordering::SeqCst);
        self.state.queries.lock().unwrap().push(query.clone());
        let behavior = self.state.behavior.lock().unwrap().clone();

        let _guard = InFlightGuard::enter(&self.state);

        match behavior {
            Behavior::Respond(value) => Ok(Some(value)),
            Behavior::Delay(delay, value) => {
                tokio::time::sleep(delay).await;
                Ok(Some(value))
            }
            Behavior::Hang => {
                std::future::pending::<()>().await;
                Ok(None)
            }
            Behavior::Missing => Ok(None),
            Behavior::Fail(message) => Err(FetchError::Status {
                status: 500,
                message,
            }),
            Behavior::FailAfter(delay, message) => {
                tokio::time::sleep(delay).await;
                Err(FetchError::Status {
                    status: 500,
                    message,
                })
            }
        }
    }
}

/// Tracks one in-flight call; released even when the call is cancelled.
struct InFlightGuard<'a> {
    state: &'a FakeState,
}

impl<'a> InFlightGuard<'a> {
    fn enter(state: &'a FakeState) -> Self {
        let now = state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        state.peak.fetch_max(now, Ordering::SeqCst);
        Self { state }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.state.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl RemoteFetch for FakeSource {
    async fn fetch_entry(&self, query: &FetchQuery) -> Result<Option<Value>, FetchError> {
        self.answer(query).await
    }

    async fn fetch_collection(&self, query: &FetchQuery) -> Result<Option<Value>, FetchError> {
        self.answer(query).await
    }
}

/// Settings with the given gate size and defaults for everything else.
pub fn settings(concurrency_limit: usize) -> ServiceSettings {
    ServiceSettings {
        concurrency_limit,
        ..ServiceSettings::default()
    }
}

/// Build a shared service over a fake source, returning both.
pub fn service(
    behavior: Behavior,
    settings: ServiceSettings,
) -> (Arc<ContentService<FakeSource>>, FakeSource) {
    let source = FakeSource::new(behavior);
    let service = Arc::new(ContentService::new(source.clone(), settings).unwrap());
    (service, source)
}

/// Serve the gateway router for `service` on an ephemeral port.
pub async fn start_gateway(service: Arc<ContentService<FakeSource>>) -> SocketAddr {
    let router = content_gateway::http::build_router(&GatewayConfig::default(), service);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    addr
}

/// Requests received by the mock delivery API.
#[derive(Debug, Clone, Default)]
pub struct Recorded {
    pub requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub api_key: Option<String>,
    pub access_token: Option<String>,
    pub params: HashMap<String, String>,
}

impl Recorded {
    pub fn last(&self) -> RecordedRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

fn record(
    recorded: &Recorded,
    path: String,
    headers: &HeaderMap,
    params: HashMap<String, String>,
) {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    recorded.requests.lock().unwrap().push(RecordedRequest {
        path,
        api_key: header("api_key"),
        access_token: header("access_token"),
        params,
    });
}

/// Start a mock delivery API.
///
/// Entry ids select the answer: `missing` → 404, `gone` → 422 with error
/// code 141, `broken` → 500, `null` → `{"entry": null}`, anything else → 200.
pub async fn start_mock_delivery_api() -> (SocketAddr, Recorded) {
    let recorded = Recorded::default();

    let app = Router::new()
        .route(
            "/v3/content_types/{content_type}/entries/{entry_id}",
            get(mock_entry),
        )
        .route("/v3/content_types/{content_type}/entries", get(mock_entries))
        .with_state(recorded.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, recorded)
}

async fn mock_entry(
    State(recorded): State<Recorded>,
    Path((content_type, entry_id)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    record(
        &recorded,
        format!("/v3/content_types/{}/entries/{}", content_type, entry_id),
        &headers,
        params,
    );

    match entry_id.as_str() {
        "missing" => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error_message": "Entry was not found.", "error_code": 141 })),
        ),
        "gone" => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error_message": "The requested object doesn't exist.", "error_code": 141 })),
        ),
        "broken" => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error_message": "Something went wrong.", "error_code": 0 })),
        ),
        "null" => (StatusCode::OK, Json(json!({ "entry": null }))),
        _ => (
            StatusCode::OK,
            Json(json!({ "entry": { "uid": entry_id, "title": "Hello", "content_type": content_type } })),
        ),
    }
}

async fn mock_entries(
    State(recorded): State<Recorded>,
    Path(content_type): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    record(
        &recorded,
        format!("/v3/content_types/{}/entries", content_type),
        &headers,
        params,
    );

    match content_type.as_str() {
        "unknown" => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error_message": "The Content Type was not found.", "error_code": 118 })),
        ),
        "odd" => (StatusCode::OK, Json(json!({ "unexpected": true }))),
        _ => (
            StatusCode::OK,
            Json(json!({ "entries": [{ "uid": "blt1" }, { "uid": "blt2" }], "count": 2 })),
        ),
    }
}
