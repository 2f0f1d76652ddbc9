//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the harvester, including:
//! - Building HTTP clients with a fixed browser-like header set
//! - GET requests with bounded timeouts
//! - Retry with growing backoff for transient failures
//! - A politeness pause after every successful fetch
//! - Error classification

use crate::config::HttpConfig;
use crate::FetchError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use std::time::Duration;

/// A fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPage {
    /// The URL that was requested
    pub url: String,

    /// HTTP status code of the successful response
    pub status: u16,

    /// Page body; absent when the server returned an empty body
    pub body: Option<String>,
}

impl RawPage {
    /// The body text, or an empty string when absent
    pub fn markup(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }
}

/// Builds an HTTP client with the fixed identity headers
///
/// # Arguments
///
/// * `config` - The HTTP configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages with retry and rate limiting
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | 2xx | Success, then pause `request_delay` |
/// | Other status | Retry until `max_attempts` |
/// | Timeout / connection / body read error | Retry until `max_attempts` |
///
/// The wait before retry *k* is `retry_base_delay * 2^(k-1)`.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    max_attempts: u32,
    retry_base_delay: Duration,
    request_delay: Duration,
}

impl Fetcher {
    /// Creates a fetcher from the HTTP configuration
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
            max_attempts: config.max_attempts.max(1),
            retry_base_delay: Duration::from_millis(config.retry_base_delay_ms),
            request_delay: Duration::from_millis(config.request_delay_ms),
        })
    }

    /// Delay before the given retry (1-based)
    pub fn retry_delay(&self, retry: u32) -> Duration {
        let factor = 1u32 << retry.saturating_sub(1).min(16);
        self.retry_base_delay.saturating_mul(factor)
    }

    /// Fetches a URL, retrying failed attempts
    ///
    /// # Returns
    ///
    /// * `Ok(RawPage)` - A 2xx response with its body
    /// * `Err(FetchError)` - The last failure after `max_attempts` attempts
    pub async fn fetch(&self, url: &str) -> Result<RawPage, FetchError> {
        let mut last_error = None;

        for attempt in 1..=self.max_attempts {
            if attempt > 1 {
                let delay = self.retry_delay(attempt - 1);
                tracing::debug!(
                    "Retrying {} in {:?} (attempt {}/{})",
                    url,
                    delay,
                    attempt,
                    self.max_attempts
                );
                tokio::time::sleep(delay).await;
            }

            match self.attempt(url, attempt).await {
                Ok(page) => {
                    if !self.request_delay.is_zero() {
                        tokio::time::sleep(self.request_delay).await;
                    }
                    return Ok(page);
                }
                Err(e) => {
                    tracing::debug!("Attempt {} for {} failed: {}", attempt, url, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| FetchError::Transport {
            url: url.to_string(),
            message: "no attempt was made".to_string(),
            attempts: 0,
        }))
    }

    /// Performs a single GET
    async fn attempt(&self, url: &str, attempt: u32) -> Result<RawPage, FetchError> {
        let transport = |message: String| FetchError::Transport {
            url: url.to_string(),
            message,
            attempts: attempt,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport(describe_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                attempts: attempt,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport(describe_error(&e)))?;

        Ok(RawPage {
            url: url.to_string(),
            status: status.as_u16(),
            body: (!body.is_empty()).then_some(body),
        })
    }
}

/// Classifies a reqwest error into a short message
fn describe_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        "Connection refused".to_string()
    } else {
        e.to_string()
    }
}
