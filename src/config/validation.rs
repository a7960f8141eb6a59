//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (limits and timeouts > 0, addresses parse)
//! - Require the credentials the content source needs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new("listener.bind_address", "not a socket address"));
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::new("listener.request_timeout_secs", "must be greater than 0"));
    }

    let cs = &config.contentstack;
    if cs.api_key.is_empty() {
        errors.push(ValidationError::new("contentstack.api_key", "is required"));
    }
    if cs.delivery_token.is_empty() {
        errors.push(ValidationError::new("contentstack.delivery_token", "is required"));
    }
    if cs.environment.is_empty() {
        errors.push(ValidationError::new("contentstack.environment", "is required"));
    }
    if cs.locale.is_empty() {
        errors.push(ValidationError::new("contentstack.locale", "is required"));
    }
    if let Some(base_url) = &cs.base_url {
        if let Err(e) = Url::parse(base_url) {
            errors.push(ValidationError::new("contentstack.base_url", e.to_string()));
        }
    }

    if config.fetch.concurrency_limit == 0 {
        errors.push(ValidationError::new("fetch.concurrency_limit", "must be greater than 0"));
    }
    if config.fetch.entry_timeout_secs == 0 {
        errors.push(ValidationError::new("fetch.entry_timeout_secs", "must be greater than 0"));
    }
    if config.fetch.collection_timeout_secs == 0 {
        errors.push(ValidationError::new("fetch.collection_timeout_secs", "must be greater than 0"));
    }
    if config.fetch.admission_timeout_secs == 0 {
        errors.push(ValidationError::new("fetch.admission_timeout_secs", "must be greater than 0"));
    }
    // The request timeout must never fire before the service has answered.
    if config.listener.request_timeout_secs <= config.fetch.worst_case_secs() {
        errors.push(ValidationError::new(
            "listener.request_timeout_secs",
            format!(
                "must exceed admission plus fetch timeout ({}s)",
                config.fetch.worst_case_secs()
            ),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new("observability.metrics_address", "not a socket address"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
