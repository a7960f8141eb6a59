//! Remote fetch client seam.
//!
//! # Responsibilities
//! - Define the operations the core needs from a content source
//! - Classify source failures into [`FetchError`]
//!
//! # Design Decisions
//! - `Ok(None)` means the source answered with nothing; it is not an error
//! - Implementations never apply their own deadline; the racer owns timing

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::content::query::FetchQuery;

/// Errors produced while talking to the content source.
///
/// Cloneable so one failed fetch can be handed to every caller sharing it.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Connection, TLS or protocol failure.
    #[error("Transport error: {0}")]
    Transport(Arc<reqwest::Error>),

    /// The source answered with a non-success status.
    #[error("Content source returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body could not be interpreted.
    #[error("Malformed response: {0}")]
    Decode(String),

    /// The concurrency gate was closed before admission (shutdown).
    #[error("Fetch rejected: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Transport(Arc::new(e))
    }
}

/// A content source the service can read entries from.
pub trait RemoteFetch: Send + Sync + 'static {
    /// Fetch a single entry described by `query`.
    fn fetch_entry(
        &self,
        query: &FetchQuery,
    ) -> impl Future<Output = Result<Option<Value>, FetchError>> + Send;

    /// Fetch one page of entries described by a collection `query`.
    fn fetch_collection(
        &self,
        query: &FetchQuery,
    ) -> impl Future<Output = Result<Option<Value>, FetchError>> + Send;
}
