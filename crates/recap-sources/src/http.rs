//! Shared HTTP plumbing: pooled client, rate limiting and JSON decoding.

use governor::{DefaultDirectRateLimiter, Quota};
use recap_common::{RecapError, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::{num::NonZeroU32, sync::Arc, time::Duration};
use tracing::{debug, instrument};
use url::Url;

/// Requests per second for services whose settings carry no rate limit.
pub const DEFAULT_RATE_LIMIT_PER_SEC: u32 = 10;

/// Idle connections kept per host.
const MAX_IDLE_PER_HOST: usize = 10;

/// Connection settings for one upstream service.
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Service name used in errors and logs.
    pub service: &'static str,
    /// Base URL of the service.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Requests per second.
    pub rate_limit_per_sec: u32,
    /// Headers sent with every request, e.g. auth tokens.
    pub headers: Vec<(&'static str, String)>,
}

impl ApiClientConfig {
    /// Config with the default rate limit and no extra headers.
    pub fn new(service: &'static str, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            service,
            base_url: base_url.into(),
            timeout,
            rate_limit_per_sec: DEFAULT_RATE_LIMIT_PER_SEC,
            headers: Vec::new(),
        }
    }

    /// Set the rate limit.
    #[must_use]
    pub const fn with_rate_limit(mut self, rate_limit_per_sec: u32) -> Self {
        self.rate_limit_per_sec = rate_limit_per_sec;
        self
    }

    /// Add a header sent with every request.
    #[must_use]
    pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }
}

/// JSON-over-HTTP client for one service. Every call is a single attempt.
#[derive(Debug, Clone)]
pub struct ApiClient {
    service: &'static str,
    base_url: Url,
    client: Client,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
}

impl ApiClient {
    /// Build a client from its config.
    pub fn new(config: ApiClientConfig) -> Result<Self> {
        let mut base_url = Url::parse(&config.base_url).map_err(|e| {
            RecapError::config_with_source(
                format!("Invalid {} URL '{}'", config.service, config.base_url),
                e,
            )
        })?;
        // Url::join replaces the last segment unless the path ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        for (name, value) in &config.headers {
            let value = HeaderValue::from_str(value).map_err(|e| {
                RecapError::config_with_source(
                    format!("Invalid value for {} header {name}", config.service),
                    e,
                )
            })?;
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                RecapError::config_with_source(format!("Invalid header name {name}"), e)
            })?;
            headers.insert(name, value);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(MAX_IDLE_PER_HOST)
            .default_headers(headers)
            .build()
            .map_err(|e| RecapError::network_with_source("Failed to create HTTP client", e))?;

        let quota = Quota::per_second(
            NonZeroU32::new(config.rate_limit_per_sec)
                .ok_or_else(|| RecapError::config("Rate limit must be greater than 0"))?,
        );

        Ok(Self {
            service: config.service,
            base_url,
            client,
            rate_limiter: Arc::new(DefaultDirectRateLimiter::direct(quota)),
        })
    }

    /// Service name.
    pub const fn service(&self) -> &'static str {
        self.service
    }

    /// Absolute URL for a path relative to the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| RecapError::config_with_source(format!("Invalid endpoint '{path}'"), e))
    }

    /// GET `path` with `query` and decode the JSON body.
    ///
    /// Non-2xx statuses become [`RecapError::Upstream`] with the status code.
    #[instrument(skip(self, query), fields(service = self.service))]
    pub async fn get_json<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.rate_limiter.until_ready().await;

        let url = self.endpoint(path)?;
        debug!(%url, params = query.len(), "Sending request");

        let response = self.client.get(url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RecapError::upstream_with_status(
                self.service,
                format!("{path} returned {status}"),
                status.as_u16(),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| RecapError::network_with_source("Failed to read response body", e))?;
        debug!(bytes = body.len(), "Response received");

        serde_json::from_str(&body).map_err(|e| {
            RecapError::network_with_source(
                format!("Malformed {} response for {path}", self.service),
                e,
            )
        })
    }
}
