//! End-to-end tool tests against a mock Datadog API.
//!
//! Each test builds the server with a client pointed at a mock HTTP server
//! and calls tool methods directly, asserting on the returned string and
//! the error flag. Tools must never panic or propagate errors.

use httpmock::prelude::*;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use serde_json::json;

use mcp_server_datadog::format::ResponseFormat;
use mcp_server_datadog::tools::downtimes::DowntimeCancelParams;
use mcp_server_datadog::tools::metrics::MetricSubmitParams;
use mcp_server_datadog::tools::monitors::{
    MonitorDeleteParams, MonitorGetParams, MonitorsListParams, MonitorsSearchParams,
};
use mcp_server_datadog::tools::slos::SloGetParams;
use mcp_server_datadog::tools::tags::TagsModifyParams;
use mcp_server_datadog::{DatadogClient, DatadogToolsServer, Settings};

fn test_settings() -> Settings {
    Settings {
        api_key: "test-api-key".to_string(),
        app_key: "test-app-key".to_string(),
        site: "datadoghq.com".to_string(),
    }
}

fn server_for(mock: &MockServer) -> DatadogToolsServer {
    DatadogToolsServer::with_client(DatadogClient::with_base_url(
        test_settings(),
        mock.url(""),
    ))
}

fn result_text(result: &CallToolResult) -> &str {
    result
        .content
        .first()
        .and_then(|c| c.raw.as_text())
        .map(|t| t.text.as_str())
        .expect("expected text content")
}

#[tokio::test]
async fn get_with_nonexistent_id_reports_not_found() {
    let mock = MockServer::start_async().await;
    mock.mock_async(|when, then| {
        when.method(GET).path("/api/v1/monitor/99999");
        then.status(404)
            .header("content-type", "application/json")
            .json_body(json!({"errors": ["Monitor not found"]}));
    })
    .await;

    let server = server_for(&mock);
    let result = server
        .monitors_get(Parameters(MonitorGetParams {
            monitor_id: 99999,
            response_format: ResponseFormat::Json,
        }))
        .await
        .unwrap();

    assert_eq!(result.is_error, Some(true));
    let text = result_text(&result);
    assert!(text.contains("not found"));
}

#[tokio::test]
async fn empty_list_renders_placeholder_markdown() {
    let mock = MockServer::start_async().await;
    mock.mock_async(|when, then| {
        when.method(GET).path("/api/v1/monitor");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!([]));
    })
    .await;

    let server = server_for(&mock);
    let result = server
        .monitors_list(Parameters(MonitorsListParams {
            limit: 20,
            offset: 0,
            name: None,
            tags: None,
            response_format: ResponseFormat::Markdown,
        }))
        .await
        .unwrap();

    assert_ne!(result.is_error, Some(true));
    assert_eq!(result_text(&result), "No monitors found.");
}

#[tokio::test]
async fn list_renders_markdown_entries() {
    let mock = MockServer::start_async().await;
    mock.mock_async(|when, then| {
        when.method(GET)
            .path("/api/v1/monitor")
            .query_param("page_size", "20")
            .query_param("page", "0");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!([
                {"id": 1, "name": "cpu high", "type": "metric alert",
                 "overall_state": "OK", "tags": ["env:prod"]}
            ]));
    })
    .await;

    let server = server_for(&mock);
    let result = server
        .monitors_list(Parameters(MonitorsListParams {
            limit: 20,
            offset: 0,
            name: None,
            tags: None,
            response_format: ResponseFormat::Markdown,
        }))
        .await
        .unwrap();

    let text = result_text(&result);
    assert!(text.contains("# Monitors (1 results)"));
    assert!(text.contains("## cpu high (ID: 1)"));
}

#[tokio::test]
async fn delete_confirmation_embeds_id_and_verb() {
    let mock = MockServer::start_async().await;
    mock.mock_async(|when, then| {
        when.method(DELETE).path("/api/v1/monitor/123");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({"deleted_monitor_id": 123}));
    })
    .await;

    let server = server_for(&mock);
    let result = server
        .monitors_delete(Parameters(MonitorDeleteParams { monitor_id: 123 }))
        .await
        .unwrap();

    assert_ne!(result.is_error, Some(true));
    let text = result_text(&result);
    assert!(text.contains("123"));
    assert!(text.contains("deleted"));
}

#[tokio::test]
async fn downtime_cancel_confirmation_says_cancelled() {
    let mock = MockServer::start_async().await;
    mock.mock_async(|when, then| {
        when.method(DELETE).path("/api/v2/downtime/abc-123");
        then.status(204);
    })
    .await;

    let server = server_for(&mock);
    let result = server
        .downtimes_cancel(Parameters(DowntimeCancelParams {
            downtime_id: "abc-123".to_string(),
        }))
        .await
        .unwrap();

    let text = result_text(&result);
    assert!(text.contains("abc-123"));
    assert!(text.contains("cancelled"));
}

#[tokio::test]
async fn metric_submit_without_optionals_posts_one_bare_series_entry() {
    let mock = MockServer::start_async().await;
    let series_mock = mock
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v1/series")
                .body_contains("custom.deploys");
            then.status(202)
                .header("content-type", "application/json")
                .json_body(json!({"status": "ok"}));
        })
        .await;

    let server = server_for(&mock);
    let result = server
        .metrics_submit(Parameters(MetricSubmitParams {
            metric: "custom.deploys".to_string(),
            value: 1.0,
            metric_type: "gauge".to_string(),
            tags: None,
            host: None,
        }))
        .await
        .unwrap();

    series_mock.assert_async().await;
    assert_ne!(result.is_error, Some(true));
    let text = result_text(&result);
    assert!(text.contains("custom.deploys"));
    assert!(text.contains("submitted successfully"));
}

#[tokio::test]
async fn validation_failure_rejects_before_any_network_call() {
    // No routes configured: a network call would surface as an API error,
    // not the validation message asserted here.
    let mock = MockServer::start_async().await;
    let server = server_for(&mock);

    let result = server
        .monitors_search(Parameters(MonitorsSearchParams {
            query: "   ".to_string(),
            page: 0,
            per_page: 30,
            sort: None,
            response_format: ResponseFormat::Json,
        }))
        .await
        .unwrap();

    assert_eq!(result.is_error, Some(true));
    assert!(result_text(&result).contains("query must not be empty"));

    let result = server
        .monitors_get(Parameters(MonitorGetParams {
            monitor_id: 0,
            response_format: ResponseFormat::Json,
        }))
        .await
        .unwrap();

    assert_eq!(result.is_error, Some(true));
    assert!(result_text(&result).contains("monitor_id"));
}

#[tokio::test]
async fn tags_add_returns_resulting_tag_set() {
    let mock = MockServer::start_async().await;
    mock.mock_async(|when, then| {
        when.method(POST)
            .path("/api/v1/tags/hosts/web-01")
            .json_body_partial(r#"{"tags": ["env:prod"]}"#);
        then.status(201)
            .header("content-type", "application/json")
            .json_body(json!({"host": "web-01", "tags": ["env:prod"]}));
    })
    .await;

    let server = server_for(&mock);
    let result = server
        .tags_add(Parameters(TagsModifyParams {
            host: "web-01".to_string(),
            tags: vec!["env:prod".to_string()],
        }))
        .await
        .unwrap();

    assert_ne!(result.is_error, Some(true));
    let text = result_text(&result);
    // The payload is the artifact for tag mutation, not a confirmation line.
    assert!(text.contains("\"env:prod\""));
}

#[tokio::test]
async fn rate_limited_call_reports_rate_limit() {
    let mock = MockServer::start_async().await;
    mock.mock_async(|when, then| {
        when.method(GET).path("/api/v1/slo/slo-1");
        then.status(429)
            .header("content-type", "application/json")
            .json_body(json!({"errors": ["too many requests"]}));
    })
    .await;

    let server = server_for(&mock);
    let result = server
        .slos_get(Parameters(SloGetParams {
            slo_id: "slo-1".to_string(),
            response_format: ResponseFormat::Json,
        }))
        .await
        .unwrap();

    assert_eq!(result.is_error, Some(true));
    assert!(result_text(&result).contains("Rate limit"));
}
