//! The network seam: a single GET per call, no retry.
//!
//! [`Transport`] performs exactly one attempt and reports the raw status so
//! the retry executor can classify it. [`Sleeper`] is the only way the crate
//! waits, which lets tests record backoff without real sleeps.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use casfetch_types::FetchConfig;
use futures_util::StreamExt;
use reqwest::{Client, StatusCode, header};
use thiserror::Error;
use tracing::debug;

/// Description of one outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Path relative to the API base, e.g. `compound/cid/712/JSON`.
    pub path: String,
    /// Read the body incrementally; used for large full-record documents.
    pub streamed: bool,
}

impl FetchRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            streamed: false,
        }
    }

    pub fn streamed(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            streamed: true,
        }
    }
}

/// Status and body of a single attempt.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

/// The request never produced a status: timeout, refused connection, or a
/// body that could not be read.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &FetchRequest) -> Result<TransportResponse, TransportError>;
}

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// [`Transport`] backed by a configured `reqwest::Client`.
///
/// Every request carries the configured User-Agent and a JSON Accept header
/// and is bounded by the per-attempt timeout.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    base_url: String,
    http: Client,
}

impl ReqwestTransport {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        default_headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_str(&config.user_agent).context("user agent is not a valid header value")?,
        );

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(config.timeout())
            .build()
            .context("build http client")?;

        Ok(Self {
            base_url: config.api_base.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &FetchRequest) -> Result<TransportResponse, TransportError> {
        let url = self.url_for(&request.path);
        debug!(%url, streamed = request.streamed, "sending request");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|error| TransportError(format!("network error: {error}")))?;
        let status = response.status();
        if !status.is_success() {
            return Ok(TransportResponse { status, body: Vec::new() });
        }

        let body = if request.streamed {
            let mut body = Vec::new();
            let mut stream = response.bytes_stream();
            while let Some(chunk) = stream.next().await {
                let bytes = chunk.map_err(|error| TransportError(format!("body stream error: {error}")))?;
                body.extend_from_slice(&bytes);
            }
            body
        } else {
            response
                .bytes()
                .await
                .map_err(|error| TransportError(format!("body read error: {error}")))?
                .to_vec()
        };

        Ok(TransportResponse { status, body })
    }
}
