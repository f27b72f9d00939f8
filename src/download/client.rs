//! HTTP client wrapper for archive requests.
//!
//! One [`HttpClient`] is built per run and reused for listings, size checks and
//! transfers so the connection pool and static headers are shared.

use std::time::Duration;

use reqwest::header::{CONTENT_LENGTH, CONTENT_RANGE, HeaderMap, RANGE};
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, instrument};
use url::Url;

use super::constants::CONNECT_TIMEOUT_SECS;
use super::error::DownloadError;
use crate::user_agent;

/// HTTP client for archive listings and streaming downloads.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a client with the default connect timeout and no read timeout.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::ClientBuild`] if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self, DownloadError> {
        Self::with_timeouts(Duration::from_secs(CONNECT_TIMEOUT_SECS), None)
    }

    /// Creates a client with explicit timeouts. `None` keeps the library default.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::ClientBuild`] if the client cannot be built.
    #[instrument(level = "debug")]
    pub fn with_timeouts(
        connect_timeout: Duration,
        read_timeout: Option<Duration>,
    ) -> Result<Self, DownloadError> {
        let mut builder = Client::builder()
            .connect_timeout(connect_timeout)
            .default_headers(user_agent::default_headers());
        if let Some(read_timeout) = read_timeout {
            builder = builder.read_timeout(read_timeout);
        }
        let client = builder.build().map_err(DownloadError::ClientBuild)?;
        Ok(Self { client })
    }

    /// Sends a GET, optionally ranged from `range_start`, and checks the status.
    ///
    /// Plain requests must answer 200. Ranged requests may answer 206 or 200
    /// (server ignored the range); the caller inspects which one it got.
    ///
    /// # Errors
    ///
    /// Returns `InvalidUrl`, `Network`/`Timeout` or `HttpStatus` errors.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn get(&self, url: &str, range_start: Option<u64>) -> Result<Response, DownloadError> {
        Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;

        let mut request = self.client.get(url);
        if let Some(start) = range_start {
            request = request.header(RANGE, format!("bytes={start}-"));
        }

        let response = request
            .send()
            .await
            .map_err(|e| DownloadError::network(url, e))?;

        let status = response.status();
        let accepted = match range_start {
            Some(_) => status == StatusCode::OK || status == StatusCode::PARTIAL_CONTENT,
            None => status == StatusCode::OK,
        };
        if !accepted {
            return Err(DownloadError::http_status(url, status.as_u16()));
        }

        debug!(status = status.as_u16(), "response received");
        Ok(response)
    }

    /// Fetches a page as text (directory listings).
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`get`](Self::get), plus `Network` when the
    /// body cannot be read.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch_text(&self, url: &str) -> Result<String, DownloadError> {
        let response = self.get(url, None).await?;
        response
            .text()
            .await
            .map_err(|e| DownloadError::network(url, e))
    }

    /// Returns a reference to the underlying reqwest client.
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

/// Parses the Content-Length header.
#[must_use]
pub fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
}

/// First byte offset of a `Content-Range: bytes START-END/TOTAL` header.
#[must_use]
pub fn content_range_start(headers: &HeaderMap) -> Option<u64> {
    let value = headers.get(CONTENT_RANGE)?.to_str().ok()?;
    let (start, _) = value.trim().strip_prefix("bytes ")?.split_once('-')?;
    start.trim().parse().ok()
}
