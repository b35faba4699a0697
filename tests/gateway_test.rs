//! Integration tests for the Datadog HTTP request gateway.
//!
//! Uses a mock HTTP server to verify authentication headers, query
//! parameters, empty-response handling, and error classification.

use std::time::Duration;

use httpmock::prelude::*;
use serde_json::json;

use mcp_server_datadog::{handle_error, ApiVersion, DatadogClient, DatadogError, Settings};

fn test_settings() -> Settings {
    Settings {
        api_key: "test-api-key".to_string(),
        app_key: "test-app-key".to_string(),
        site: "datadoghq.com".to_string(),
    }
}

#[tokio::test]
async fn request_sends_credential_and_content_headers() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v1/validate")
                .header("DD-API-KEY", "test-api-key")
                .header("DD-APPLICATION-KEY", "test-app-key")
                .header("Accept", "application/json");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"valid": true}));
        })
        .await;

    let client = DatadogClient::with_base_url(test_settings(), server.url(""));
    let data = client.get(ApiVersion::V1, "validate", None).await.unwrap();

    mock.assert_async().await;
    assert_eq!(data.unwrap()["valid"], true);
}

#[tokio::test]
async fn request_passes_query_parameters() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v1/monitor")
                .query_param("page_size", "20")
                .query_param("page", "0")
                .query_param("name", "cpu");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!([]));
        })
        .await;

    let client = DatadogClient::with_base_url(test_settings(), server.url(""));
    let query = vec![
        ("page_size", "20".to_string()),
        ("page", "0".to_string()),
        ("name", "cpu".to_string()),
    ];
    let data = client
        .get(ApiVersion::V1, "monitor", Some(&query))
        .await
        .unwrap();

    mock.assert_async().await;
    assert!(data.unwrap().as_array().unwrap().is_empty());
}

#[tokio::test]
async fn v2_paths_use_v2_namespace() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v2/roles");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"data": []}));
        })
        .await;

    let client = DatadogClient::with_base_url(test_settings(), server.url(""));
    client.get(ApiVersion::V2, "roles", None).await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn no_content_response_returns_none() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(DELETE).path("/api/v2/downtime/abc-123");
            then.status(204);
        })
        .await;

    let client = DatadogClient::with_base_url(test_settings(), server.url(""));
    let data = client.delete(ApiVersion::V2, "downtime/abc-123").await.unwrap();
    assert!(data.is_none());
}

#[tokio::test]
async fn error_status_carries_code_and_body() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/monitor/99999");
            then.status(404)
                .header("content-type", "application/json")
                .json_body(json!({"errors": ["Monitor not found"]}));
        })
        .await;

    let client = DatadogClient::with_base_url(test_settings(), server.url(""));
    let err = client
        .get(ApiVersion::V1, "monitor/99999", None)
        .await
        .unwrap_err();

    match &err {
        DatadogError::Api { status, body } => {
            assert_eq!(*status, 404);
            assert!(body.contains("Monitor not found"));
        }
        other => panic!("expected Api error, got {:?}", other),
    }
    let msg = handle_error(&err);
    assert!(msg.contains("Resource not found"));
    assert!(msg.contains("Monitor not found"));
}

#[tokio::test]
async fn post_body_reaches_the_wire() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v2/logs/events/search")
                .json_body_partial(r#"{"filter": {"query": "service:api"}}"#);
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"data": []}));
        })
        .await;

    let client = DatadogClient::with_base_url(test_settings(), server.url(""));
    let body = json!({"filter": {"query": "service:api", "from": "0", "to": "1"}});
    client
        .post(ApiVersion::V2, "logs/events/search", &body)
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn timeout_classifies_as_timed_out() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/slow");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({}))
                .delay(Duration::from_millis(500));
        })
        .await;

    // A short-fuse client stands in for the gateway's fixed 30s timeout.
    let http = reqwest::Client::builder()
        .timeout(Duration::from_millis(50))
        .build()
        .unwrap();
    let err = http.get(server.url("/slow")).send().await.unwrap_err();
    assert!(err.is_timeout());

    let msg = handle_error(&DatadogError::Request(err));
    assert_eq!(msg, "Error: Request timed out. Try again.");
}

#[tokio::test]
async fn connection_failure_classifies_as_unreachable() {
    // Nothing listens on the discard port.
    let err = reqwest::Client::new()
        .get("http://127.0.0.1:9/api/v1/monitor")
        .send()
        .await
        .unwrap_err();
    assert!(err.is_connect());

    let msg = handle_error(&DatadogError::Request(err));
    assert_eq!(msg, "Error: Could not reach Datadog API. Check DD_SITE and network.");
}
