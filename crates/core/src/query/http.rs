//! HTTP implementation of the ticket query client.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::config::QueryConfig;
use crate::task::Task;

use super::{body_excerpt, ClientBuildError, QueryClient, QueryError};

/// Queries the ticket endpoint over HTTP(S).
pub struct HttpQueryClient {
    client: Client,
    config: QueryConfig,
}

impl HttpQueryClient {
    /// Create a new client with the configured timeout and TLS options.
    pub fn new(config: QueryConfig) -> Result<Self, ClientBuildError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Ok(Self { client, config })
    }

    /// Build the query URL for a task.
    fn build_query_url(&self, task: &Task) -> String {
        format!(
            "{}?m_code={}&visitorName={}&credential={}&tourDate={}",
            self.config.url.trim_end_matches('/'),
            urlencoding::encode(&self.config.merchant_code),
            urlencoding::encode(&task.name),
            urlencoding::encode(&task.credential),
            urlencoding::encode(&task.date)
        )
    }
}

#[async_trait]
impl QueryClient for HttpQueryClient {
    async fn query(&self, task: &Task) -> Result<Vec<u8>, QueryError> {
        let url = self.build_query_url(task);
        debug!(name = %task.name, credential = %task.credential, "Querying tickets");

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(QueryError::Status {
                status: status.as_u16(),
                body: body_excerpt(&body),
            });
        }

        let bytes = response.bytes().await?;
        debug!(name = %task.name, bytes = bytes.len(), "Query complete");
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> QueryConfig {
        QueryConfig {
            url: format!("{}/ticket-query", server.uri()),
            merchant_code: "test-code".to_string(),
            timeout_secs: 1,
            accept_invalid_certs: false,
        }
    }

    #[test]
    fn test_build_query_url_encodes_parameters() {
        let client = HttpQueryClient::new(QueryConfig {
            url: "http://localhost/ticket-query/".to_string(),
            merchant_code: "code".to_string(),
            timeout_secs: 10,
            accept_invalid_certs: false,
        })
        .unwrap();

        let url = client.build_query_url(&Task::new("Ann Lee", "ID1", "2024-10-10"));
        assert_eq!(
            url,
            "http://localhost/ticket-query?m_code=code&visitorName=Ann%20Lee&credential=ID1&tourDate=2024-10-10"
        );
    }

    #[tokio::test]
    async fn test_query_sends_expected_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ticket-query"))
            .and(query_param("m_code", "test-code"))
            .and(query_param("visitorName", "黄达"))
            .and(query_param("credential", "ID123"))
            .and(query_param("tourDate", "2024-10-10"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"data":{}}"#))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpQueryClient::new(config_for(&server)).unwrap();
        let body = client
            .query(&Task::new("黄达", "ID123", "2024-10-10"))
            .await
            .unwrap();

        assert_eq!(body, br#"{"data":{}}"#.to_vec());
    }

    #[tokio::test]
    async fn test_query_non_success_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .mount(&server)
            .await;

        let client = HttpQueryClient::new(config_for(&server)).unwrap();
        let err = client
            .query(&Task::new("Bob", "ID999", "2024-10-10"))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            QueryError::Status {
                status: 503,
                body: "busy".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_query_error_body_is_capped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("e".repeat(4096)))
            .mount(&server)
            .await;

        let client = HttpQueryClient::new(config_for(&server)).unwrap();
        let err = client
            .query(&Task::new("Bob", "ID999", "2024-10-10"))
            .await
            .unwrap_err();

        match err {
            QueryError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body.len(), 200);
            }
            other => panic!("Expected Status error, got {:?}", other),
        }
    }

    #[test]
    fn test_client_builds_with_invalid_certs_accepted() {
        let client = HttpQueryClient::new(QueryConfig {
            accept_invalid_certs: true,
            ..Default::default()
        });
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_query_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("{}")
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let client = HttpQueryClient::new(config_for(&server)).unwrap();
        let err = client
            .query(&Task::new("Bob", "ID999", "2024-10-10"))
            .await
            .unwrap_err();

        assert_eq!(err, QueryError::Timeout);
    }

    #[tokio::test]
    async fn test_query_connection_refused() {
        let client = HttpQueryClient::new(QueryConfig {
            url: "http://127.0.0.1:1/ticket-query".to_string(),
            ..Default::default()
        })
        .unwrap();

        let err = client
            .query(&Task::new("Bob", "ID999", "2024-10-10"))
            .await
            .unwrap_err();

        assert!(matches!(err, QueryError::ConnectionFailed(_)));
    }
}
