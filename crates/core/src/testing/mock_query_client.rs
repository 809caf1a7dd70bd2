//! Mock query client for testing.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

use crate::query::{QueryClient, QueryError};
use crate::task::Task;

/// Scripted outcome of one query.
pub type MockResponse = Result<Vec<u8>, QueryError>;

/// Mock implementation of the QueryClient trait.
///
/// Provides controllable behavior for testing:
/// - Scripted responses per credential, consumed in order
/// - A default response once a script runs dry
/// - Simulated latency
/// - Call recording and peak concurrency tracking
///
/// # Example
///
/// ```rust,ignore
/// use ticket_checker_core::testing::{MockQueryClient, fixtures};
///
/// let client = MockQueryClient::new();
/// client.push_response("ID123", Err(QueryError::Timeout)).await;
/// client.push_response("ID123", Ok(fixtures::alice_body())).await;
///
/// // First call times out, second succeeds
/// assert!(client.query(&fixtures::task("Alice", "ID123")).await.is_err());
/// assert!(client.query(&fixtures::task("Alice", "ID123")).await.is_ok());
/// assert_eq!(client.call_count_for("ID123").await, 2);
/// ```
#[derive(Debug)]
pub struct MockQueryClient {
    /// Pending scripted responses by credential.
    scripts: RwLock<HashMap<String, VecDeque<MockResponse>>>,
    /// Returned when no scripted response is left.
    default_response: RwLock<MockResponse>,
    /// Delay applied to every call.
    latency: RwLock<Option<Duration>>,
    /// Recorded calls in arrival order.
    calls: RwLock<Vec<Task>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl Default for MockQueryClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockQueryClient {
    /// Create a mock that fails every call with a connection error.
    pub fn new() -> Self {
        Self {
            scripts: RwLock::new(HashMap::new()),
            default_response: RwLock::new(Err(QueryError::ConnectionFailed(
                "no response configured".to_string(),
            ))),
            latency: RwLock::new(None),
            calls: RwLock::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// Queue a response for the next call with `credential`.
    pub async fn push_response(&self, credential: &str, response: MockResponse) {
        self.scripts
            .write()
            .await
            .entry(credential.to_string())
            .or_default()
            .push_back(response);
    }

    /// Set the response used when no scripted one is queued.
    pub async fn set_default(&self, response: MockResponse) {
        *self.default_response.write().await = response;
    }

    /// Delay every call by `latency`.
    pub async fn set_latency(&self, latency: Duration) {
        *self.latency.write().await = Some(latency);
    }

    /// Get recorded calls.
    pub async fn calls(&self) -> Vec<Task> {
        self.calls.read().await.clone()
    }

    /// Number of calls made for `credential`.
    pub async fn call_count_for(&self, credential: &str) -> usize {
        self.calls
            .read()
            .await
            .iter()
            .filter(|t| t.credential == credential)
            .count()
    }

    /// Highest number of calls that were in flight at the same time.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    async fn next_response(&self, credential: &str) -> MockResponse {
        let scripted = self
            .scripts
            .write()
            .await
            .get_mut(credential)
            .and_then(VecDeque::pop_front);

        match scripted {
            Some(response) => response,
            None => self.default_response.read().await.clone(),
        }
    }
}

#[async_trait]
impl QueryClient for MockQueryClient {
    async fn query(&self, task: &Task) -> Result<Vec<u8>, QueryError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        self.calls.write().await.push(task.clone());

        let latency = *self.latency.read().await;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let response = self.next_response(&task.credential).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_scripted_responses_then_default() {
        let client = MockQueryClient::new();
        client
            .push_response("ID1", Err(QueryError::Timeout))
            .await;
        client.push_response("ID1", Ok(b"first".to_vec())).await;
        client.set_default(Ok(b"fallback".to_vec())).await;

        let task = fixtures::task("A", "ID1");
        assert_err!(client.query(&task).await);
        assert_eq!(assert_ok!(client.query(&task).await), b"first".to_vec());
        assert_eq!(assert_ok!(client.query(&task).await), b"fallback".to_vec());
        assert_eq!(client.call_count_for("ID1").await, 3);
    }

    #[tokio::test]
    async fn test_default_is_connection_error() {
        let client = MockQueryClient::new();
        let err = client.query(&fixtures::task("A", "ID1")).await.unwrap_err();
        assert!(matches!(err, QueryError::ConnectionFailed(_)));
    }

    #[tokio::test]
    async fn test_scripts_are_per_credential() {
        let client = MockQueryClient::new();
        client.push_response("ID1", Ok(b"one".to_vec())).await;

        assert_err!(client.query(&fixtures::task("B", "ID2")).await);
        assert_ok!(client.query(&fixtures::task("A", "ID1")).await);
        assert_eq!(client.calls().await.len(), 2);
    }
}
