//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Cache miss:
//!     → gate.rs (wait for an admission slot)
//!     → timeouts.rs (race the source call against its deadline)
//!     → slot released when the race settles
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every source call has a deadline
//! - No retries: a failed or timed-out fetch is reported, not repeated
//! - The gate is the only bound on outbound concurrency

pub mod gate;
pub mod timeouts;

pub use gate::{ConcurrencyGate, GateClosed, GateTicket};
pub use timeouts::race_fetch;
