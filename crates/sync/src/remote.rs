// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote API abstraction.
//!
//! Provides a trait-based write target that enables:
//! - Real HTTP requests for production
//! - Mock remotes for unit testing

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::Url;
use serde_json::Value;

use crate::config::RemoteConfig;

/// Error type for remote writes.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// Base URL could not be parsed.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// HTTP client could not be built.
    #[error("http client error: {0}")]
    Client(String),

    /// Request never produced a response (DNS, connect, timeout, reset).
    #[error("request to {endpoint} failed: {reason}")]
    Request { endpoint: String, reason: String },

    /// Server answered with a non-2xx status.
    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },
}

/// Result type for remote writes.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Boxed future returned by [`RemoteApi::post`].
pub type RemoteFuture<'a> = Pin<Box<dyn Future<Output = RemoteResult<Value>> + Send + 'a>>;

/// Asynchronous, fallible write target.
///
/// Success means the server confirmed the write; the response body is
/// returned as JSON (`Value::Null` when there is none).
pub trait RemoteApi: Send + Sync {
    /// POST `body` as JSON to `endpoint`.
    fn post<'a>(&'a self, endpoint: &'a str, body: &'a Value) -> RemoteFuture<'a>;
}

/// HTTP implementation of [`RemoteApi`] using reqwest.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpRemote {
    /// Create a remote rooted at `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> RemoteResult<Self> {
        let parsed =
            Url::parse(base_url).map_err(|e| RemoteError::InvalidUrl(format!("{base_url}: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(RemoteError::InvalidUrl(base_url.to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Client(e.to_string()))?;

        Ok(HttpRemote {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: None,
        })
    }

    /// Create a remote from the `[remote]` config section.
    pub fn from_config(config: &RemoteConfig) -> RemoteResult<Self> {
        let remote = Self::new(&config.base_url, config.request_timeout())?;
        Ok(match &config.auth_token {
            Some(token) => remote.with_auth_token(token.clone()),
            None => remote,
        })
    }

    /// Send `Authorization: Bearer <token>` with every request.
    pub fn with_auth_token(mut self, token: String) -> Self {
        self.auth_token = Some(token);
        self
    }

    /// Full URL for an endpoint path such as `/api/mood`.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }
}

impl RemoteApi for HttpRemote {
    fn post<'a>(&'a self, endpoint: &'a str, body: &'a Value) -> RemoteFuture<'a> {
        Box::pin(async move {
            let url = self.endpoint_url(endpoint);
            let mut request = self.client.post(&url).json(body);
            if let Some(token) = &self.auth_token {
                request = request.bearer_auth(token);
            }

            let response = request.send().await.map_err(|e| RemoteError::Request {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;

            let status = response.status();
            if !status.is_success() {
                return Err(RemoteError::Status {
                    endpoint: endpoint.to_string(),
                    status: status.as_u16(),
                });
            }

            // The write is confirmed by the status; an unreadable body does not undo it.
            let bytes = match response.bytes().await {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(
                        endpoint,
                        error = %e,
                        "write confirmed but response body unreadable"
                    );
                    return Ok(Value::Null);
                }
            };
            if bytes.is_empty() {
                return Ok(Value::Null);
            }
            Ok(serde_json::from_slice(&bytes).unwrap_or(Value::Null))
        })
    }
}

#[cfg(test)]
#[path = "remote_tests.rs"]
mod tests;
