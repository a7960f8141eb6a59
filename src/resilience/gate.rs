//! Outbound concurrency gate.
//!
//! # Responsibilities
//! - Bound the number of simultaneous content source calls
//! - Report how many admission slots are taken and how many callers wait
//!
//! # Design Decisions
//! - Backed by a Tokio semaphore, which admits waiters in FIFO order
//! - Capacity is returned when the ticket is dropped, on every exit path
//! - Closing the gate fails pending and future acquisitions (shutdown)

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Default number of concurrent source calls.
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 5;

/// The gate was closed and no longer admits work.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("concurrency gate closed")]
pub struct GateClosed;

/// Counting admission control for outbound fetches.
#[derive(Debug, Clone)]
pub struct ConcurrencyGate {
    permits: Arc<Semaphore>,
    waiting: Arc<AtomicUsize>,
    limit: usize,
}

impl ConcurrencyGate {
    /// Create a gate admitting at most `limit` holders at a time.
    pub fn new(limit: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(limit)),
            waiting: Arc::new(AtomicUsize::new(0)),
            limit,
        }
    }

    /// Wait for a free slot.
    pub async fn acquire(&self) -> Result<GateTicket, GateClosed> {
        let waiter = Waiter::enter(&self.waiting);
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| GateClosed)?;
        drop(waiter);

        tracing::trace!(
            available_permits = self.permits.available_permits(),
            "Gate ticket issued"
        );

        Ok(GateTicket { _permit: permit })
    }

    /// Number of tickets currently held.
    pub fn queued_count(&self) -> usize {
        self.limit.saturating_sub(self.permits.available_permits())
    }

    /// Number of callers suspended in [`acquire`](Self::acquire).
    pub fn waiting_count(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Stop admitting work. Waiters are woken with [`GateClosed`].
    pub fn close(&self) {
        self.permits.close();
    }

    pub fn is_closed(&self) -> bool {
        self.permits.is_closed()
    }
}

impl Default for ConcurrencyGate {
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENCY_LIMIT)
    }
}

/// An admission slot. Dropping it releases the slot.
#[derive(Debug)]
pub struct GateTicket {
    _permit: OwnedSemaphorePermit,
}

/// Counts one caller between entering `acquire` and leaving it, including
/// when the acquiring future is dropped.
struct Waiter<'a> {
    count: &'a AtomicUsize,
}

impl<'a> Waiter<'a> {
    fn enter(count: &'a AtomicUsize) -> Self {
        count.fetch_add(1, Ordering::SeqCst);
        Self { count }
    }
}

impl Drop for Waiter<'_> {
    fn drop(&mut self) {
        self.count.fetch_sub(1, Ordering::SeqCst);
    }
}
