//! Fetch outcome reporting.
//!
//! One record per fetch: a structured log event plus a counter increment.
//! Reporting never returns an error, so it cannot change what a caller gets.

use std::fmt::Display;

use crate::content::key::CacheKey;
use crate::content::types::{FetchOutcome, Served};
use crate::observability::metrics;

/// Label used in logs for the upstream content source.
pub const DEFAULT_SOURCE_LABEL: &str = "Stack";

/// Reports hit / found / not-found / exception outcomes.
#[derive(Debug, Clone)]
pub struct OutcomeReporter {
    source: &'static str,
}

impl OutcomeReporter {
    pub fn new(source: &'static str) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &'static str {
        self.source
    }

    /// Record the outcome of resolving `key`.
    pub fn report<V, E: Display>(&self, key: &CacheKey, outcome: &FetchOutcome<V, E>, served: Served) {
        match (outcome, served) {
            (FetchOutcome::Success(_), Served::Cache) => {
                tracing::info!(key = %key, "From cache");
                metrics::record_fetch_outcome("hit");
            }
            (FetchOutcome::Success(_), Served::Source) => {
                tracing::info!(key = %key, source = self.source, "From {}", self.source);
                metrics::record_fetch_outcome("found");
            }
            (FetchOutcome::NotFound, _) => {
                tracing::warn!(key = %key, source = self.source, "Not found");
                metrics::record_fetch_outcome("not_found");
            }
            (FetchOutcome::TimedOut(deadline), _) => {
                tracing::error!(
                    key = %key,
                    source = self.source,
                    deadline_ms = deadline.as_millis() as u64,
                    "Exception: fetch timed out"
                );
                metrics::record_fetch_outcome("timed_out");
            }
            (FetchOutcome::Faulted(e), _) => {
                tracing::error!(key = %key, source = self.source, error = %e, "Exception");
                metrics::record_fetch_outcome("faulted");
            }
        }
    }
}

impl Default for OutcomeReporter {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE_LABEL)
    }
}
