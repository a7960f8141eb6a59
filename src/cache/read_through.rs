//! Read-through cache with fixed time-to-live.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::content::client::FetchError;
use crate::content::key::CacheKey;
use crate::content::types::{FetchOutcome, Served};

/// Default time-to-live for cached payloads.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// A cached payload and the instant it goes stale.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// Outcome of a shared fetch, `None` until the leading caller settles it.
type Flight<V, E> = watch::Receiver<Option<FetchOutcome<V, E>>>;

enum Role<V, E> {
    Lead(watch::Sender<Option<FetchOutcome<V, E>>>),
    Follow(Flight<V, E>),
}

/// A concurrent cache that fetches and stores on miss.
///
/// Only successful fetches are stored. Entries expire lazily: a stale entry
/// is evicted by the lookup that finds it, or by [`purge_expired`].
///
/// In single-flight mode concurrent misses on one key join the first
/// caller's fetch and all receive its outcome, whatever it is.
///
/// [`purge_expired`]: ReadThroughCache::purge_expired
#[derive(Debug, Clone)]
pub struct ReadThroughCache<V, E = FetchError> {
    entries: Arc<DashMap<CacheKey, CacheEntry<V>>>,
    /// Fetches in progress, present only in single-flight mode.
    in_flight: Option<Arc<DashMap<CacheKey, Flight<V, E>>>>,
}

impl<V: Clone, E: Clone> ReadThroughCache<V, E> {
    /// Create a cache where concurrent misses fetch independently.
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            in_flight: None,
        }
    }

    /// Create a cache where concurrent misses on one key share a single fetch.
    pub fn with_single_flight() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            in_flight: Some(Arc::new(DashMap::new())),
        }
    }

    /// Return the cached value if present and fresh.
    pub fn get(&self, key: &CacheKey) -> Option<V> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if entry.is_fresh(now) {
                return Some(entry.value.clone());
            }
        }
        self.entries.remove_if(key, |_, entry| !entry.is_fresh(now));
        None
    }

    /// Store `value`, replacing any previous entry for `key`.
    pub fn insert(&self, key: CacheKey, value: V, ttl: Duration) {
        self.entries.insert(
            key,
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    /// Serve `key` from the cache, or run `fetch` and store a successful result.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        key: &CacheKey,
        ttl: Duration,
        fetch: F,
    ) -> (FetchOutcome<V, E>, Served)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = FetchOutcome<V, E>>,
    {
        if let Some(value) = self.get(key) {
            return (FetchOutcome::Success(value), Served::Cache);
        }

        let Some(in_flight) = self.in_flight.as_deref() else {
            return (self.fetch_and_store(key, ttl, fetch).await, Served::Source);
        };

        let leader = loop {
            match join_flight(in_flight, key) {
                Role::Lead(tx) => break tx,
                Role::Follow(mut flight) => {
                    let settled = match flight.wait_for(Option::is_some).await {
                        Ok(outcome) => (*outcome).clone(),
                        Err(_) => None,
                    };
                    if let Some(outcome) = settled {
                        return (outcome, Served::Source);
                    }
                    // The leader was dropped before settling; take over.
                    if let Some(value) = self.get(key) {
                        return (FetchOutcome::Success(value), Served::Cache);
                    }
                }
            }
        };

        let _release = FlightRelease { in_flight, key };
        let outcome = self.fetch_and_store(key, ttl, fetch).await;
        leader.send_replace(Some(outcome.clone()));
        (outcome, Served::Source)
    }

    /// Drop every stale entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_fresh(now));
        before.saturating_sub(self.entries.len())
    }

    /// Number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of keys with a shared fetch in progress.
    pub fn flights(&self) -> usize {
        self.in_flight.as_ref().map_or(0, |in_flight| in_flight.len())
    }

    async fn fetch_and_store<F, Fut>(&self, key: &CacheKey, ttl: Duration, fetch: F) -> FetchOutcome<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = FetchOutcome<V, E>>,
    {
        let outcome = fetch().await;
        if let FetchOutcome::Success(value) = &outcome {
            self.insert(key.clone(), value.clone(), ttl);
        }
        outcome
    }
}

/// Join the fetch in progress for `key`, or register a new one and lead it.
fn join_flight<V, E>(in_flight: &DashMap<CacheKey, Flight<V, E>>, key: &CacheKey) -> Role<V, E> {
    match in_flight.entry(key.clone()) {
        Entry::Occupied(flight) => Role::Follow(flight.get().clone()),
        Entry::Vacant(slot) => {
            let (tx, rx) = watch::channel(None);
            slot.insert(rx);
            Role::Lead(tx)
        }
    }
}

/// Unregisters a flight when its leader finishes or is dropped.
///
/// Only the leader removes its key, so the entry found here is always its own.
struct FlightRelease<'a, V, E> {
    in_flight: &'a DashMap<CacheKey, Flight<V, E>>,
    key: &'a CacheKey,
}

impl<V, E> Drop for FlightRelease<'_, V, E> {
    fn drop(&mut self) {
        self.in_flight.remove(self.key);
    }
}

impl<V: Clone, E: Clone> Default for ReadThroughCache<V, E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::query::FetchQuery;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn key(id: &str) -> CacheKey {
        let query = FetchQuery::entry("article", id).locale("en").build().unwrap();
        CacheKey::from(&query)
    }

    fn found(value: &'static str) -> FetchOutcome<&'static str, String> {
        FetchOutcome::Success(value)
    }

    #[tokio::test]
    async fn test_hit_skips_fetch() {
        let cache: ReadThroughCache<&'static str, String> = ReadThroughCache::new();
        let calls = AtomicUsize::new(0);

        for expected in [Served::Source, Served::Cache] {
            let (outcome, served) = cache
                .get_or_fetch(&key("a"), DEFAULT_TTL, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    found("payload")
                })
                .await;
            assert_eq!(served, expected);
            assert_eq!(outcome.into_value(), Some("payload"));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_is_refetched() {
        let cache: ReadThroughCache<&'static str, String> = ReadThroughCache::new();
        cache.insert(key("a"), "old", Duration::from_secs(60));

        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(cache.get(&key("a")), Some("old"));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.get(&key("a")), None);
        assert!(cache.is_empty());

        let (outcome, served) = cache
            .get_or_fetch(&key("a"), Duration::from_secs(60), || async { found("new") })
            .await;
        assert_eq!(served, Served::Source);
        assert_eq!(outcome.into_value(), Some("new"));
    }

    #[tokio::test]
    async fn test_failures_are_not_stored() {
        let cache: ReadThroughCache<&'static str, String> = ReadThroughCache::new();

        let (outcome, _) = cache
            .get_or_fetch(&key("a"), DEFAULT_TTL, || async {
                FetchOutcome::<&'static str, String>::NotFound
            })
            .await;
        assert!(matches!(outcome, FetchOutcome::NotFound));

        let (outcome, _) = cache
            .get_or_fetch(&key("a"), DEFAULT_TTL, || async {
                FetchOutcome::<&'static str, String>::TimedOut(Duration::from_secs(1))
            })
            .await;
        assert!(matches!(outcome, FetchOutcome::TimedOut(_)));

        let (outcome, _) = cache
            .get_or_fetch(&key("a"), DEFAULT_TTL, || async {
                FetchOutcome::<&'static str, String>::Faulted("boom".into())
            })
            .await;
        assert!(matches!(outcome, FetchOutcome::Faulted(_)));

        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired() {
        let cache: ReadThroughCache<i32, String> = ReadThroughCache::new();
        cache.insert(key("short"), 1, Duration::from_secs(1));
        cache.insert(key("long"), 2, Duration::from_secs(100));

        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&key("long")), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_flight_shares_fetch() {
        let cache: ReadThroughCache<&'static str, String> = ReadThroughCache::with_single_flight();
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let cache = cache.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                let (outcome, _) = cache
                    .get_or_fetch(&key("a"), DEFAULT_TTL, || async {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        found("shared")
                    })
                    .await;
                outcome.into_value()
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), Some("shared"));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.flights(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_flight_shares_failure() {
        let cache: ReadThroughCache<&'static str, String> = ReadThroughCache::with_single_flight();
        let calls = Arc::new(AtomicUsize::new(0));
        let start = Instant::now();

        let mut handles = Vec::new();
        for _ in 0..4 {
            let cache = cache.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_fetch(&key("a"), DEFAULT_TTL, || async {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_secs(1)).await;
                        FetchOutcome::<&'static str, String>::TimedOut(Duration::from_secs(1))
                    })
                    .await
                    .0
            }));
        }

        for handle in handles {
            assert!(matches!(handle.await.unwrap(), FetchOutcome::TimedOut(_)));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(start.elapsed() < Duration::from_secs(2));
        assert_eq!(cache.flights(), 0);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_leader_hands_over() {
        let cache: ReadThroughCache<&'static str, String> = ReadThroughCache::with_single_flight();

        let leader = {
            let cache = cache.clone();
            tokio::spawn(async move {
                cache
                    .get_or_fetch(&key("a"), DEFAULT_TTL, || std::future::pending())
                    .await
            })
        };
        tokio::task::yield_now().await;
        assert_eq!(cache.flights(), 1);

        let follower = {
            let cache = cache.clone();
            tokio::spawn(async move {
                cache
                    .get_or_fetch(&key("a"), DEFAULT_TTL, || async { found("second") })
                    .await
                    .0
                    .into_value()
            })
        };
        tokio::task::yield_now().await;

        leader.abort();
        assert_eq!(follower.await.unwrap(), Some("second"));
        assert_eq!(cache.flights(), 0);
        assert_eq!(cache.get(&key("a")), Some("second"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_without_single_flight_misses_fetch_independently() {
        let cache: ReadThroughCache<&'static str, String> = ReadThroughCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..3 {
            let cache = cache.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_fetch(&key("a"), DEFAULT_TTL, || async {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        found("dup")
                    })
                    .await
                    .0
                    .into_value()
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), Some("dup"));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(cache.len(), 1);
    }
}
