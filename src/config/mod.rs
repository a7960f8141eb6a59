//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize, env overrides for secrets)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → read once at startup to build the content service
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the gate and cache are sized at startup
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    CacheConfig, ContentstackConfig, FetchConfig, GatewayConfig, ListenerConfig, LogFormat,
    ObservabilityConfig, Region,
};
