//! Testing utilities and mock implementations.
//!
//! This module provides a mock of the query client trait, allowing runner
//! tests without a real endpoint.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ticket_checker_core::testing::{fixtures, MockQueryClient};
//!
//! let client = Arc::new(MockQueryClient::new());
//! client.push_response("ID123", Ok(fixtures::alice_body())).await;
//!
//! let runner = TaskRunner::new(RunnerConfig::default(), client.clone())?;
//! let report = runner.run_all(vec![fixtures::task("Alice", "ID123")]).await;
//! ```

mod mock_query_client;

pub use mock_query_client::{MockQueryClient, MockResponse};

/// Test fixtures and helper functions.
pub mod fixtures {
    use serde_json::{json, Value};

    use crate::task::Task;

    /// Date used by fixture tasks.
    pub const DATE: &str = "2024-10-10";

    /// Create a task for [`DATE`].
    pub fn task(name: &str, credential: &str) -> Task {
        Task::new(name, credential, DATE)
    }

    /// A ticket line item as the endpoint returns it.
    pub fn ticket_json(sku_name: &str, child_status_name: &str) -> Value {
        json!({
            "skuName": sku_name,
            "childStatusName": child_status_name,
            "orderNo": format!("O-{}", sku_name),
            "orderSourceName": "Web"
        })
    }

    /// A successful response body with the given (sku, status) ticket items.
    pub fn success_body(
        ticket_number: &str,
        crowd_type_name: &str,
        tickets: &[(&str, &str)],
    ) -> Vec<u8> {
        let items: Vec<Value> = tickets
            .iter()
            .map(|(sku, status)| ticket_json(sku, status))
            .collect();

        json!({
            "data": {
                "ticketNumber": ticket_number,
                "crowdTypeName": crowd_type_name,
                "startDate": DATE,
                "endDate": "2024-10-11",
                "electronicCodeProductProviderOutBOS": items
            }
        })
        .to_string()
        .into_bytes()
    }

    /// The response for Alice: ticket T1, one unused park ticket ordered on the web.
    pub fn alice_body() -> Vec<u8> {
        br#"{"data":{"ticketNumber":"T1","crowdTypeName":"Adult","startDate":"2024-10-10","endDate":"2024-10-11","electronicCodeProductProviderOutBOS":[{"skuName":"Park","childStatusName":"Unused","orderNo":"O1","orderSourceName":"Web"}]}}"#.to_vec()
    }
}
