//! Execution of a single task: query, retry once, decode, classify.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::decoder::decode;
use crate::query::{body_excerpt, QueryClient, QueryError};
use crate::task::{CheckResult, Task};

use super::types::Classification;

/// Run one task to its terminal classification.
pub(crate) async fn check_task(
    client: &dyn QueryClient,
    task: &Task,
    retry_delay: Duration,
) -> Classification {
    info!(name = %task.name, credential = %task.credential, "Checking tickets");

    let body = match query_with_retry(client, task, retry_delay).await {
        Ok(body) => body,
        Err(e) => {
            warn!(
                name = %task.name,
                credential = %task.credential,
                error = %e,
                "Query failed after retry"
            );
            return Classification::Failure(CheckResult::identity(task));
        }
    };

    match decode(task, &body) {
        Ok(result) => {
            info!(
                name = %task.name,
                ticket_number = %result.ticket_number,
                tickets = result.tickets.len(),
                "Tickets resolved"
            );
            Classification::Success(result)
        }
        Err(e) => {
            warn!(
                name = %task.name,
                credential = %task.credential,
                error = %e,
                body = %body_excerpt(&body),
                "Failed to decode response"
            );
            Classification::Failure(CheckResult::identity(task))
        }
    }
}

/// Query once, and on any transport error wait `retry_delay` and query exactly once more.
async fn query_with_retry(
    client: &dyn QueryClient,
    task: &Task,
    retry_delay: Duration,
) -> Result<Vec<u8>, QueryError> {
    match client.query(task).await {
        Ok(body) => Ok(body),
        Err(e) => {
            warn!(
                name = %task.name,
                error = %e,
                retry_in_ms = retry_delay.as_millis() as u64,
                "Query failed, retrying once"
            );
            sleep(retry_delay).await;
            client.query(task).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockQueryClient};

    const NO_DELAY: Duration = Duration::from_millis(0);

    #[tokio::test]
    async fn test_success_uses_single_attempt() {
        let client = MockQueryClient::new();
        client
            .push_response("ID123", Ok(fixtures::alice_body()))
            .await;

        let task = fixtures::task("Alice", "ID123");
        let classification = check_task(&client, &task, NO_DELAY).await;

        assert!(classification.is_success());
        assert_eq!(client.call_count_for("ID123").await, 1);
    }

    #[tokio::test]
    async fn test_transient_error_then_success() {
        let client = MockQueryClient::new();
        client
            .push_response("ID123", Err(QueryError::Timeout))
            .await;
        client
            .push_response("ID123", Ok(fixtures::alice_body()))
            .await;

        let task = fixtures::task("Alice", "ID123");
        let classification = check_task(&client, &task, NO_DELAY).await;

        assert!(classification.is_success());
        assert_eq!(client.call_count_for("ID123").await, 2);
    }

    #[tokio::test]
    async fn test_two_failures_stop_after_second_attempt() {
        let client = MockQueryClient::new();
        client.set_default(Err(QueryError::Timeout)).await;

        let task = fixtures::task("Bob", "ID999");
        let classification = check_task(&client, &task, NO_DELAY).await;

        assert_eq!(
            classification,
            Classification::Failure(CheckResult::identity(&task))
        );
        assert_eq!(client.call_count_for("ID999").await, 2);
    }

    #[tokio::test]
    async fn test_retry_waits_for_delay() {
        let client = MockQueryClient::new();
        client
            .push_response("ID999", Err(QueryError::ConnectionFailed("reset".into())))
            .await;
        client.set_default(Err(QueryError::Timeout)).await;

        let task = fixtures::task("Bob", "ID999");
        let start = std::time::Instant::now();
        check_task(&client, &task, Duration::from_millis(50)).await;

        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_decode_failure_is_not_retried() {
        let client = MockQueryClient::new();
        client
            .push_response("ID1", Ok(b"not json at all".to_vec()))
            .await;

        let task = fixtures::task("Carol", "ID1");
        let classification = check_task(&client, &task, NO_DELAY).await;

        assert!(!classification.is_success());
        assert_eq!(client.call_count_for("ID1").await, 1);
    }

    #[tokio::test]
    async fn test_oversized_garbage_body_fails_once() {
        let client = MockQueryClient::new();
        client
            .push_response("ID3", Ok(vec![b'<'; 1 << 20]))
            .await;

        let task = fixtures::task("Eve", "ID3");
        let classification = check_task(&client, &task, NO_DELAY).await;

        assert_eq!(
            classification,
            Classification::Failure(CheckResult::identity(&task))
        );
        assert_eq!(client.call_count_for("ID3").await, 1);
    }

    #[tokio::test]
    async fn test_decode_failure_discards_partial_fields() {
        let client = MockQueryClient::new();
        let body = serde_json::to_vec(&serde_json::json!({"data": {
            "ticketNumber": "T9",
            "crowdTypeName": "Child",
            "startDate": "2024-10-10",
            "electronicCodeProductProviderOutBOS": [{"skuName": "Park"}]
        }}))
        .unwrap();
        client.push_response("ID2", Ok(body)).await;

        let task = fixtures::task("Dan", "ID2");
        let classification = check_task(&client, &task, NO_DELAY).await;

        assert_eq!(
            classification,
            Classification::Failure(CheckResult::identity(&task))
        );
    }
}
