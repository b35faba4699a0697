//! Datadog metrics tools: query, search, list, and submit.

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use rmcp::{tool, tool_router};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{check_not_empty, tool_reply};
use crate::datadog::client::ApiVersion;
use crate::datadog::error::DatadogError;
use crate::format::{format_output, ResponseFormat};
use crate::server::DatadogToolsServer;
use crate::time_parser::{now_unix, parse_time_range};

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct MetricsQueryParams {
    #[schemars(description = "Metrics query (e.g. 'avg:system.cpu.user{*}')")]
    pub query: String,
    #[schemars(description = "Start time: relative (1h, 30m, 7d), Unix timestamp, or RFC 3339")]
    #[serde(rename = "from", default = "default_from_1h")]
    pub from_time: String,
    #[schemars(description = "End time (default: now)")]
    #[serde(rename = "to")]
    pub to_time: Option<String>,
    #[schemars(description = "Output format: 'json' or 'markdown'")]
    #[serde(default)]
    pub response_format: ResponseFormat,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct MetricsSearchParams {
    #[schemars(description = "Metric name search string")]
    pub query: String,
    #[schemars(description = "Output format: 'json' or 'markdown'")]
    #[serde(default)]
    pub response_format: ResponseFormat,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct MetricsListParams {
    #[schemars(description = "Filter metrics by tag (e.g. 'env:prod')")]
    #[serde(rename = "filter")]
    pub filter_string: Option<String>,
    #[schemars(description = "Output format: 'json' or 'markdown'")]
    #[serde(default)]
    pub response_format: ResponseFormat,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct MetricSubmitParams {
    #[schemars(description = "Metric name")]
    pub metric: String,
    #[schemars(description = "Metric value")]
    pub value: f64,
    #[schemars(description = "Type: gauge, count, or rate")]
    #[serde(default = "default_metric_type")]
    pub metric_type: String,
    #[schemars(description = "Tags list (e.g. ['env:prod'])")]
    pub tags: Option<Vec<String>>,
    #[schemars(description = "Host name to attach the point to")]
    pub host: Option<String>,
}

fn default_from_1h() -> String {
    "1h".to_string()
}

fn default_metric_type() -> String {
    "gauge".to_string()
}

#[tool_router(router = metrics_router)]
impl DatadogToolsServer {
    #[tool(
        name = "datadog_metrics_query",
        description = "Query Datadog time-series metrics with aggregation syntax over a time range.",
        annotations(
            title = "Query Metrics",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn metrics_query(
        &self,
        Parameters(params): Parameters<MetricsQueryParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!(query = %params.query, "Querying Datadog metrics");
        Ok(tool_reply(self.query_metrics(&params).await))
    }

    #[tool(
        name = "datadog_metrics_search",
        description = "Search for metric names matching a query string.",
        annotations(
            title = "Search Metrics",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn metrics_search(
        &self,
        Parameters(params): Parameters<MetricsSearchParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!(query = %params.query, "Searching Datadog metrics");
        Ok(tool_reply(self.search_metrics(&params).await))
    }

    #[tool(
        name = "datadog_metrics_list",
        description = "List metrics actively reporting in the last hour, optionally filtered by tag.",
        annotations(
            title = "List Metrics",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn metrics_list(
        &self,
        Parameters(params): Parameters<MetricsListParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!("Listing Datadog metrics");
        Ok(tool_reply(self.list_metrics(&params).await))
    }

    #[tool(
        name = "datadog_metrics_submit",
        description = "Submit a custom metric data point to Datadog.",
        annotations(
            title = "Submit Metric",
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = false,
            open_world_hint = true
        )
    )]
    pub async fn metrics_submit(
        &self,
        Parameters(params): Parameters<MetricSubmitParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!(metric = %params.metric, "Submitting Datadog metric");
        Ok(tool_reply(self.submit_metric(&params).await))
    }
}

impl DatadogToolsServer {
    pub(crate) fn metrics_tools() -> ToolRouter<Self> {
        Self::metrics_router()
    }

    async fn query_metrics(&self, params: &MetricsQueryParams) -> Result<String, DatadogError> {
        check_not_empty("query", &params.query)?;
        let (from_ts, to_ts) = parse_time_range(&params.from_time, params.to_time.as_deref())?;
        let query = vec![
            ("query", params.query.clone()),
            ("from", from_ts.to_string()),
            ("to", to_ts.to_string()),
        ];
        let data = self.client().get(ApiVersion::V1, "query", Some(&query)).await?;
        Ok(format_output(&data.unwrap_or(Value::Null), params.response_format, None))
    }

    async fn search_metrics(&self, params: &MetricsSearchParams) -> Result<String, DatadogError> {
        check_not_empty("query", &params.query)?;
        let query = vec![("q", format!("metrics:{}", params.query))];
        let data = self.client().get(ApiVersion::V1, "search", Some(&query)).await?;
        Ok(format_output(&data.unwrap_or(Value::Null), params.response_format, None))
    }

    async fn list_metrics(&self, params: &MetricsListParams) -> Result<String, DatadogError> {
        let mut query = vec![("from", (now_unix() - 3600).to_string())];
        if let Some(filter) = &params.filter_string {
            query.push(("filter[tags]", filter.clone()));
        }
        let data = self.client().get(ApiVersion::V1, "metrics", Some(&query)).await?;
        Ok(format_output(&data.unwrap_or(Value::Null), params.response_format, None))
    }

    async fn submit_metric(&self, params: &MetricSubmitParams) -> Result<String, DatadogError> {
        check_not_empty("metric", &params.metric)?;
        let body = series_body(params, now_unix());
        self.client().post(ApiVersion::V1, "series", &body).await?;
        Ok(format!(
            "Metric '{}' submitted successfully (value={}).",
            params.metric, params.value
        ))
    }
}

/// Submission body: one series entry per call. Tags and host are included
/// only when present.
fn series_body(params: &MetricSubmitParams, now: i64) -> Value {
    let mut point = json!({
        "metric": params.metric,
        "type": params.metric_type,
        "points": [[now, params.value]],
    });
    if let Some(tags) = &params.tags {
        point["tags"] = json!(tags);
    }
    if let Some(host) = &params.host {
        point["host"] = json!(host);
    }
    json!({ "series": [point] })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submit_params(tags: Option<Vec<String>>, host: Option<String>) -> MetricSubmitParams {
        MetricSubmitParams {
            metric: "custom.deploys".to_string(),
            value: 1.0,
            metric_type: "gauge".to_string(),
            tags,
            host,
        }
    }

    #[test]
    fn series_body_without_optionals_has_one_bare_entry() {
        let body = series_body(&submit_params(None, None), 1_700_000_000);
        let series = body["series"].as_array().unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0]["metric"], "custom.deploys");
        assert_eq!(series[0]["type"], "gauge");
        assert_eq!(series[0]["points"][0][0], 1_700_000_000);
        assert!(series[0].get("tags").is_none());
        assert!(series[0].get("host").is_none());
    }

    #[test]
    fn series_body_includes_optionals_when_present() {
        let body = series_body(
            &submit_params(Some(vec!["env:prod".to_string()]), Some("web-01".to_string())),
            1_700_000_000,
        );
        let entry = &body["series"][0];
        assert_eq!(entry["tags"][0], "env:prod");
        assert_eq!(entry["host"], "web-01");
    }
}
