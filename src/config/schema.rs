//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the content gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// HTTP listener settings.
    pub listener: ListenerConfig,

    /// Content source credentials and location.
    pub contentstack: ContentstackConfig,

    /// Outbound fetch limits.
    pub fetch: FetchConfig,

    /// Cache settings.
    pub cache: CacheConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Upper bound on a whole API request in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 90,
        }
    }
}

/// Content delivery region. Each maps to a CDN host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Region {
    Us,
    #[default]
    Eu,
    AzureNa,
    AzureEu,
    GcpNa,
}

impl Region {
    /// Content Delivery API host for this region.
    pub fn host(&self) -> &'static str {
        match self {
            Region::Us => "cdn.contentstack.io",
            Region::Eu => "eu-cdn.contentstack.com",
            Region::AzureNa => "azure-na-cdn.contentstack.com",
            Region::AzureEu => "azure-eu-cdn.contentstack.com",
            Region::GcpNa => "gcp-na-cdn.contentstack.com",
        }
    }
}

/// Content source configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContentstackConfig {
    /// Stack API key.
    pub api_key: String,

    /// Delivery token for the environment.
    pub delivery_token: String,

    /// Publishing environment (e.g., "production").
    pub environment: String,

    /// Default locale for every query.
    pub locale: String,

    /// Delivery region.
    pub region: Region,

    /// Override for the delivery API base URL (mock servers, proxies).
    pub base_url: Option<String>,

    /// TCP connect timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for ContentstackConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            delivery_token: String::new(),
            environment: String::new(),
            locale: "en-us".to_string(),
            region: Region::default(),
            base_url: None,
            connect_timeout_secs: 5,
        }
    }
}

impl ContentstackConfig {
    /// Base URL for delivery API calls.
    pub fn base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.clone(),
            None => format!("https://{}/", self.region.host()),
        }
    }
}

/// Outbound fetch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Maximum simultaneous calls to the content source.
    pub concurrency_limit: usize,

    /// Deadline for a single-entry fetch in seconds.
    pub entry_timeout_secs: u64,

    /// Deadline for a collection fetch in seconds.
    pub collection_timeout_secs: u64,

    /// Longest wait for a concurrency slot in seconds.
    pub admission_timeout_secs: u64,

    /// Share one fetch between concurrent misses on the same key.
    pub single_flight: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: 5,
            entry_timeout_secs: 60,
            collection_timeout_secs: 10,
            admission_timeout_secs: 20,
            single_flight: false,
        }
    }
}

impl FetchConfig {
    pub fn entry_timeout(&self) -> Duration {
        Duration::from_secs(self.entry_timeout_secs)
    }

    pub fn collection_timeout(&self) -> Duration {
        Duration::from_secs(self.collection_timeout_secs)
    }

    pub fn admission_timeout(&self) -> Duration {
        Duration::from_secs(self.admission_timeout_secs)
    }

    /// Longest time a miss can spend between admission and answer.
    pub fn worst_case_secs(&self) -> u64 {
        self.admission_timeout_secs
            .saturating_add(self.entry_timeout_secs.max(self.collection_timeout_secs))
    }
}

/// Cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Time-to-live for cached payloads in seconds.
    pub ttl_secs: u64,

    /// Periodically drop stale entries in the background.
    pub sweep_enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 60,
            sweep_enabled: true,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Expose Prometheus metrics.
    pub metrics_enabled: bool,

    /// Metrics listener address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "content_gateway=info,tower_http=info".to_string(),
            log_format: LogFormat::default(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.fetch.concurrency_limit, 5);
        assert_eq!(config.fetch.entry_timeout(), Duration::from_secs(60));
        assert_eq!(config.fetch.collection_timeout(), Duration::from_secs(10));
        assert_eq!(config.fetch.admission_timeout(), Duration::from_secs(20));
        assert!(config.fetch.worst_case_secs() < config.listener.request_timeout_secs);
        assert_eq!(config.cache.ttl(), Duration::from_secs(60));
        assert_eq!(config.contentstack.region, Region::Eu);
        assert!(!config.fetch.single_flight);
    }

    #[test]
    fn test_region_hosts() {
        assert_eq!(Region::Eu.host(), "eu-cdn.contentstack.com");
        assert_eq!(Region::Us.host(), "cdn.contentstack.io");

        let config = ContentstackConfig::default();
        assert_eq!(config.base_url(), "https://eu-cdn.contentstack.com/");
    }

    #[test]
    fn test_minimal_toml() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [contentstack]
            environment = "preview"
            region = "azure-eu"

            [fetch]
            concurrency_limit = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.contentstack.environment, "preview");
        assert_eq!(config.contentstack.region, Region::AzureEu);
        assert_eq!(config.contentstack.locale, "en-us");
        assert_eq!(config.fetch.concurrency_limit, 2);
        assert_eq!(config.fetch.entry_timeout_secs, 60);
    }
}
