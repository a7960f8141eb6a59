//! Content fetching types and error definitions.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::content::client::FetchError;

/// Result of one fetch attempt, as seen by the cache and the reporter.
#[derive(Debug, Clone)]
pub enum FetchOutcome<V, E = FetchError> {
    /// The source (or the cache) produced a payload.
    Success(V),
    /// The source answered but had nothing for the query.
    NotFound,
    /// The deadline fired before the source answered.
    TimedOut(Duration),
    /// The source call failed.
    Faulted(E),
}

impl<V, E> FetchOutcome<V, E> {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }

    /// Short label used for metrics and logs.
    pub fn label(&self) -> &'static str {
        match self {
            FetchOutcome::Success(_) => "found",
            FetchOutcome::NotFound => "not_found",
            FetchOutcome::TimedOut(_) => "timed_out",
            FetchOutcome::Faulted(_) => "faulted",
        }
    }

    /// Drop the failure detail, keeping only the payload.
    pub fn into_value(self) -> Option<V> {
        match self {
            FetchOutcome::Success(value) => Some(value),
            _ => None,
        }
    }
}

/// Where a successful payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Served {
    Cache,
    Source,
}

impl fmt::Display for Served {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Served::Cache => f.write_str("cache"),
            Served::Source => f.write_str("source"),
        }
    }
}

/// Errors surfaced synchronously to callers of the content service.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContentError {
    /// A required identifier was missing; no request was sent.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type for content service operations.
pub type ContentResult<T> = Result<T, ContentError>;
