//! Payload caching subsystem.
//!
//! # Data Flow
//! ```text
//! lookup(key)
//!     → fresh entry: served from cache
//!     → absent/stale: fetch function runs (gate + timeout race)
//!         → Success: stored with expiry = now + ttl
//!         → anything else: nothing stored
//!
//! sweeper.rs: every ttl, drop entries nobody read after they went stale
//! ```
//!
//! # Design Decisions
//! - In-process only; nothing survives a restart
//! - Last successful writer for a key wins
//! - Absence is never cached, so not-found keys are re-checked every call

pub mod read_through;
pub mod sweeper;

pub use read_through::{CacheEntry, ReadThroughCache, DEFAULT_TTL};
