//! Content service: the caller-facing read path.
//!
//! # Responsibilities
//! - Build and validate queries from caller parameters
//! - Resolve them through the read-through cache
//! - Admit misses through the concurrency gate and race them against a deadline
//! - Report every outcome, including misses that never got admitted
//!
//! # Design Decisions
//! - One instance per process, shared by handle; tests build fresh ones
//! - `fetch_*` operations return the full [`FetchOutcome`]
//! - `entry`/`entries` are fail-open: timeouts and faults become `None`
//! - Waiting for admission is bounded, so a miss answers within
//!   `admission_timeout` plus the fetch deadline

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;
use serde_json::Value;
use tokio::time::timeout;

use crate::cache::ReadThroughCache;
use crate::config::GatewayConfig;
use crate::content::client::{FetchError, RemoteFetch};
use crate::content::key::CacheKey;
use crate::content::query::FetchQuery;
use crate::content::types::{ContentError, ContentResult, FetchOutcome, Served};
use crate::observability::{metrics, OutcomeReporter};
use crate::resilience::{race_fetch, ConcurrencyGate};

/// Optional parameters for a single-entry request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryParams {
    /// Reference field to expand.
    pub reference: Option<String>,
    /// Locale override.
    pub locale: Option<String>,
}

/// Optional parameters for a collection request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub skip: Option<u32>,
    pub take: Option<u32>,
    /// Locale override.
    pub locale: Option<String>,
}

/// Tunables for the read path.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub locale: String,
    pub entry_timeout: Duration,
    pub collection_timeout: Duration,
    /// Longest wait for a gate slot before the miss is reported as timed out.
    pub admission_timeout: Duration,
    pub cache_ttl: Duration,
    pub concurrency_limit: usize,
    pub single_flight: bool,
}

impl ServiceSettings {
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self {
            locale: config.contentstack.locale.clone(),
            entry_timeout: config.fetch.entry_timeout(),
            collection_timeout: config.fetch.collection_timeout(),
            admission_timeout: config.fetch.admission_timeout(),
            cache_ttl: config.cache.ttl(),
            concurrency_limit: config.fetch.concurrency_limit,
            single_flight: config.fetch.single_flight,
        }
    }
}

impl ServiceSettings {
    /// Reject settings the read path cannot run with.
    pub fn validate(&self) -> ContentResult<()> {
        if self.concurrency_limit == 0 {
            return Err(ContentError::InvalidArgument(
                "concurrency limit must be greater than 0".to_string(),
            ));
        }
        if self.locale.trim().is_empty() {
            return Err(ContentError::InvalidArgument(
                "default locale must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self::from_config(&GatewayConfig::default())
    }
}

#[derive(Debug, Clone, Copy)]
enum QueryKind {
    Entry,
    Collection,
}

impl QueryKind {
    fn label(self) -> &'static str {
        match self {
            QueryKind::Entry => "entry",
            QueryKind::Collection => "collection",
        }
    }
}

/// Cached, bounded, deadline-enforced access to a content source.
pub struct ContentService<C> {
    client: Arc<C>,
    cache: ReadThroughCache<Value>,
    gate: ConcurrencyGate,
    reporter: OutcomeReporter,
    settings: ServiceSettings,
}

impl<C: RemoteFetch> ContentService<C> {
    pub fn new(client: C, settings: ServiceSettings) -> ContentResult<Self> {
        Self::with_reporter(client, settings, OutcomeReporter::default())
    }

    pub fn with_reporter(
        client: C,
        settings: ServiceSettings,
        reporter: OutcomeReporter,
    ) -> ContentResult<Self> {
        settings.validate()?;

        let cache = if settings.single_flight {
            ReadThroughCache::with_single_flight()
        } else {
            ReadThroughCache::new()
        };

        Ok(Self {
            client: Arc::new(client),
            cache,
            gate: ConcurrencyGate::new(settings.concurrency_limit),
            reporter,
            settings,
        })
    }

    /// Fetch one entry, surfacing timeouts and faults to the caller.
    pub async fn fetch_entry(
        &self,
        content_type_id: &str,
        entry_id: &str,
        params: &EntryParams,
    ) -> ContentResult<FetchOutcome<Value>> {
        let query = FetchQuery::entry(content_type_id, entry_id)
            .locale(self.locale_or_default(params.locale.as_deref()))
            .reference(params.reference.as_deref())
            .build()?;

        Ok(self.resolve(&query, QueryKind::Entry).await)
    }

    /// Fetch one entry; `None` when there is no data for any reason.
    pub async fn entry(
        &self,
        content_type_id: &str,
        entry_id: &str,
        params: &EntryParams,
    ) -> ContentResult<Option<Value>> {
        Ok(self.fetch_entry(content_type_id, entry_id, params).await?.into_value())
    }

    /// Fetch a page of entries, surfacing timeouts and faults to the caller.
    pub async fn fetch_entries(
        &self,
        content_type_id: &str,
        params: &PageParams,
    ) -> ContentResult<FetchOutcome<Value>> {
        let query = FetchQuery::collection(content_type_id)
            .locale(self.locale_or_default(params.locale.as_deref()))
            .skip(params.skip)
            .take(params.take)
            .build()?;

        Ok(self.resolve(&query, QueryKind::Collection).await)
    }

    /// Fetch a page of entries; `None` when there is no data for any reason.
    pub async fn entries(
        &self,
        content_type_id: &str,
        params: &PageParams,
    ) -> ContentResult<Option<Value>> {
        Ok(self.fetch_entries(content_type_id, params).await?.into_value())
    }

    /// Admission slots currently held by in-flight fetches.
    pub fn queued_count(&self) -> usize {
        self.gate.queued_count()
    }

    /// Callers waiting for an admission slot.
    pub fn waiting_count(&self) -> usize {
        self.gate.waiting_count()
    }

    pub fn concurrency_limit(&self) -> usize {
        self.gate.limit()
    }

    /// Stored cache entries, stale ones included.
    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    /// Drop stale cache entries. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let removed = self.cache.purge_expired();
        metrics::record_cache_size(self.cache.len());
        removed
    }

    /// Refuse further source calls; cached reads keep working.
    pub fn close(&self) {
        self.gate.close();
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    fn locale_or_default<'a>(&'a self, locale: Option<&'a str>) -> &'a str {
        locale
            .filter(|l| !l.is_empty())
            .unwrap_or(self.settings.locale.as_str())
    }

    async fn resolve(&self, query: &FetchQuery, kind: QueryKind) -> FetchOutcome<Value> {
        let key = CacheKey::from(query);
        let deadline = match kind {
            QueryKind::Entry => self.settings.entry_timeout,
            QueryKind::Collection => self.settings.collection_timeout,
        };

        let (outcome, served) = self
            .cache
            .get_or_fetch(&key, self.settings.cache_ttl, || self.fetch_from_source(query, kind, deadline))
            .await;

        if served == Served::Source && outcome.is_success() {
            metrics::record_cache_size(self.cache.len());
        }
        self.reporter.report(&key, &outcome, served);
        outcome
    }

    async fn fetch_from_source(
        &self,
        query: &FetchQuery,
        kind: QueryKind,
        deadline: Duration,
    ) -> FetchOutcome<Value> {
        let ticket = match timeout(self.settings.admission_timeout, self.gate.acquire()).await {
            Ok(Ok(ticket)) => ticket,
            Ok(Err(e)) => return FetchOutcome::Faulted(FetchError::Unavailable(e.to_string())),
            Err(_) => {
                tracing::warn!(
                    waiting = self.gate.waiting_count(),
                    limit = self.gate.limit(),
                    "No fetch slot freed up in time"
                );
                return FetchOutcome::TimedOut(self.settings.admission_timeout);
            }
        };
        metrics::record_gate_depth(self.gate.queued_count());

        let start = Instant::now();
        let outcome = match kind {
            QueryKind::Entry => race_fetch(self.client.fetch_entry(query), deadline).await,
            QueryKind::Collection => race_fetch(self.client.fetch_collection(query), deadline).await,
        };
        metrics::record_fetch_duration(kind.label(), start);

        drop(ticket);
        metrics::record_gate_depth(self.gate.queued_count());

        match outcome {
            FetchOutcome::Success(Value::Null) => FetchOutcome::NotFound,
            other => other,
        }
    }
}
