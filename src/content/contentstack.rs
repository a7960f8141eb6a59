//! Contentstack Content Delivery API client.
//!
//! # Responsibilities
//! - Translate a [`FetchQuery`] into a delivery API request
//! - Authenticate with the stack API key and delivery token
//! - Map "does not exist" answers to an empty result
//!
//! # Design Decisions
//! - No client-side request timeout; the racer owns the deadline
//! - Dropping an in-flight call aborts the underlying HTTP request

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;
use url::Url;

use crate::config::ContentstackConfig;
use crate::content::client::{FetchError, RemoteFetch};
use crate::content::query::FetchQuery;

/// Contentstack error code for a missing entry or content type.
const ERROR_CODE_NOT_FOUND: i64 = 141;

/// HTTP client for one stack and environment.
#[derive(Debug, Clone)]
pub struct ContentstackClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
    delivery_token: String,
    environment: String,
}

impl ContentstackClient {
    /// Create a client from validated configuration.
    pub fn new(config: &ContentstackConfig) -> Result<Self, FetchError> {
        let base_url = Url::parse(&config.base_url())
            .map_err(|e| FetchError::Decode(format!("invalid base url: {}", e)))?;

        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(concat!("content-gateway/", env!("CARGO_PKG_VERSION")))
            .build()?;

        tracing::info!(
            base_url = %base_url,
            environment = %config.environment,
            "Contentstack client initialized"
        );

        Ok(Self {
            http,
            base_url,
            api_key: config.api_key.clone(),
            delivery_token: config.delivery_token.clone(),
            environment: config.environment.clone(),
        })
    }

    fn entries_url(&self, query: &FetchQuery) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| FetchError::Decode("base url cannot hold a path".to_string()))?;
            segments
                .pop_if_empty()
                .extend(["v3", "content_types", query.content_type_id(), "entries"]);
            if let Some(entry_id) = query.entry_id() {
                segments.push(entry_id);
            }
        }
        Ok(url)
    }

    fn query_params(&self, query: &FetchQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("environment", self.environment.clone()),
            ("locale", query.locale().to_string()),
        ];
        if query.include_embedded() {
            params.push(("include_embedded_items[]", "BASE".to_string()));
        }
        if let Some(reference) = query.reference_name() {
            params.push(("include[]", reference.to_string()));
        }
        if let Some(field) = query.sort_field() {
            let direction = if query.sort_descending() { "desc" } else { "asc" };
            params.push((direction, field.to_string()));
        }
        if query.include_count() {
            params.push(("include_count", "true".to_string()));
        }
        if let Some(skip) = query.skip() {
            params.push(("skip", skip.to_string()));
        }
        if let Some(take) = query.take() {
            params.push(("limit", take.to_string()));
        }
        params
    }

    /// Send the request and return the decoded body, or `None` when the
    /// source reports that the object does not exist.
    async fn send(&self, query: &FetchQuery) -> Result<Option<Value>, FetchError> {
        let url = self.entries_url(query)?;

        tracing::debug!(url = %url, "Fetching from content source");

        let response = self
            .http
            .get(url)
            .header("api_key", &self.api_key)
            .header("access_token", &self.delivery_token)
            .query(&self.query_params(query))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let body: Value = response.json().await?;
            return Ok(Some(body));
        }

        let body: Value = response.json().await.unwrap_or(Value::Null);
        if status == StatusCode::NOT_FOUND
            || body.get("error_code").and_then(Value::as_i64) == Some(ERROR_CODE_NOT_FOUND)
        {
            return Ok(None);
        }

        let message = body
            .get("error_message")
            .and_then(Value::as_str)
            .unwrap_or("no error message")
            .to_string();
        Err(FetchError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

impl RemoteFetch for ContentstackClient {
    async fn fetch_entry(&self, query: &FetchQuery) -> Result<Option<Value>, FetchError> {
        match self.send(query).await? {
            Some(mut body) => match body.get_mut("entry").map(Value::take) {
                Some(Value::Null) | None => Ok(None),
                Some(entry) => Ok(Some(entry)),
            },
            None => Ok(None),
        }
    }

    async fn fetch_collection(&self, query: &FetchQuery) -> Result<Option<Value>, FetchError> {
        match self.send(query).await? {
            Some(body) if body.get("entries").is_some() => Ok(Some(body)),
            Some(_) => Err(FetchError::Decode("response has no entries field".to_string())),
            None => Ok(None),
        }
    }
}
