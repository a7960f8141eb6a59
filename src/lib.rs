//! Content gateway library.
//!
//! Cached, concurrency-bounded, deadline-enforced reads from a headless CMS
//! content delivery API.

pub mod admin;
pub mod cache;
pub mod config;
pub mod content;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::GatewayConfig;
pub use content::{ContentService, FetchOutcome, FetchQuery, RemoteFetch};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
