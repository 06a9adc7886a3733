//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with a fixed user agent string
//! - GET requests that follow redirects and report the final URL
//! - Error classification for logging

use crate::config::UserAgentConfig;
use crate::ArchiveError;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

/// Maximum redirect hops followed for one request
const MAX_REDIRECTS: usize = 10;

/// A completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// HTTP status code
    pub status: u16,

    /// URL after redirects
    pub final_url: String,

    /// Response body
    pub body: Vec<u8>,
}

impl FetchResponse {
    /// Returns true for 2xx responses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport used by workers to fetch pages
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetches `url`, following redirects
    ///
    /// Non-2xx responses are returned as `Ok`; `Err` means no response was
    /// received at all.
    async fn get(&self, url: &str) -> Result<FetchResponse, ArchiveError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use forum_mirror::config::UserAgentConfig;
/// use forum_mirror::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// `Transport` backed by a reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Wraps a client made by [`build_http_client`]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<FetchResponse, ArchiveError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| ArchiveError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let body = response
            .bytes()
            .await
            .map_err(|source| ArchiveError::Http {
                url: url.to_string(),
                source,
            })?;

        Ok(FetchResponse {
            status,
            final_url,
            body: body.to_vec(),
        })
    }
}

/// Short description of a fetch error for log lines
pub fn describe_error(error: &ArchiveError) -> String {
    match error {
        ArchiveError::Http { source, .. } if source.is_timeout() => "request timeout".to_string(),
        ArchiveError::Http { source, .. } if source.is_connect() => {
            "connection refused".to_string()
        }
        ArchiveError::Http { source, .. } if source.is_redirect() => {
            "too many redirects".to_string()
        }
        other => other.to_string(),
    }
}
