//! Timeout enforcement.
//!
//! # Responsibilities
//! - Race one content source call against a fixed deadline
//! - Classify the result into a [`FetchOutcome`]
//!
//! # Design Decisions
//! - Uses Tokio's timer; completion is awaited, never polled
//! - A call that loses the race is dropped, cancelling its request
//! - Timeout errors are distinct from source failures

use std::future::Future;
use std::time::Duration;

use tokio::time::timeout;

use crate::content::types::FetchOutcome;

/// Run `fetch` until it completes or `deadline` elapses, whichever is first.
pub async fn race_fetch<V, E, F>(fetch: F, deadline: Duration) -> FetchOutcome<V, E>
where
    F: Future<Output = Result<Option<V>, E>>,
{
    match timeout(deadline, fetch).await {
        Ok(Ok(Some(value))) => FetchOutcome::Success(value),
        Ok(Ok(None)) => FetchOutcome::NotFound,
        Ok(Err(e)) => FetchOutcome::Faulted(e),
        Err(_) => FetchOutcome::TimedOut(deadline),
    }
}
