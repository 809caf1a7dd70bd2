//! Remote ticket query abstraction.
//!
//! This module provides the `QueryClient` trait the runner calls once per
//! attempt, and `HttpQueryClient`, the reqwest-backed implementation used
//! against the real endpoint.

mod http;

pub use http::HttpQueryClient;


use async_trait::async_trait;
use thiserror::Error;

use crate::task::Task;

/// Transport-level failures of a single query.
///
/// Every variant is retryable once by the runner.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Request timeout")]
    Timeout,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("HTTP request failed: {0}")]
    Http(String),
}

/// The HTTP client could not be built from its configuration.
///
/// Raised once at construction, before any task is queried.
#[derive(Debug, Error)]
#[error("Failed to build HTTP client: {0}")]
pub struct ClientBuildError(#[from] reqwest::Error);

impl From<reqwest::Error> for QueryError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            QueryError::Timeout
        } else if e.is_connect() {
            QueryError::ConnectionFailed(e.to_string())
        } else {
            QueryError::Http(e.to_string())
        }
    }
}

/// Longest response body excerpt carried in errors and logs.
pub(crate) const MAX_BODY_EXCERPT: usize = 200;

/// First [`MAX_BODY_EXCERPT`] characters of a response body, lossily decoded.
pub(crate) fn body_excerpt(body: &[u8]) -> String {
    String::from_utf8_lossy(body)
        .chars()
        .take(MAX_BODY_EXCERPT)
        .collect()
}

/// Performs one ticket lookup for a task.
///
/// Implementations must be safe to call concurrently.
#[async_trait]
pub trait QueryClient: Send + Sync {
    /// Returns the raw response body.
    async fn query(&self, task: &Task) -> Result<Vec<u8>, QueryError>;
}
