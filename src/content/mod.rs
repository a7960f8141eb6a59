//! Content fetching subsystem.
//!
//! # Data Flow
//! ```text
//! caller parameters
//!     → query.rs (validate, build FetchQuery)
//!     → key.rs (derive CacheKey)
//!     → service.rs (cache lookup; on miss gate + timeout race)
//!     → client.rs / contentstack.rs (delivery API round trip)
//!     → outcome reported, payload returned
//! ```
//!
//! # Design Decisions
//! - Payloads are untyped JSON documents; no schema at this layer
//! - Invalid arguments fail before any network call
//! - Not-found is an outcome, not an error

pub mod client;
pub mod contentstack;
pub mod key;
pub mod query;
pub mod service;
pub mod types;

pub use client::{FetchError, RemoteFetch};
pub use contentstack::ContentstackClient;
pub use key::CacheKey;
pub use query::{FetchQuery, FetchQueryBuilder};
pub use service::{ContentService, EntryParams, PageParams, ServiceSettings};
pub use types::{ContentError, ContentResult, FetchOutcome, Served};
