//! Datadog log search tools.

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use rmcp::{tool, tool_router};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{check_range, default_limit, tool_reply};
use crate::datadog::client::ApiVersion;
use crate::datadog::error::DatadogError;
use crate::format::{field_str, format_output, ResponseFormat};
use crate::server::DatadogToolsServer;
use crate::time_parser::{now_unix, parse_time};

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct LogsSearchParams {
    #[schemars(description = "Log search query (e.g. 'service:api status:error')")]
    #[serde(default = "default_query_all")]
    pub query: String,
    #[schemars(description = "Start time: relative (1h, 30m, 7d), Unix timestamp, or RFC 3339")]
    #[serde(rename = "from", default = "default_from_1h")]
    pub from_time: String,
    #[schemars(description = "End time (default: now)")]
    #[serde(rename = "to")]
    pub to_time: Option<String>,
    #[schemars(description = "Maximum log entries to return (1-1000, default 20)")]
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[schemars(description = "Sort order: 'asc' or 'desc' by timestamp")]
    #[serde(default = "default_sort_desc")]
    pub sort: String,
    #[schemars(description = "Output format: 'json' or 'markdown'")]
    #[serde(default)]
    pub response_format: ResponseFormat,
}

fn default_query_all() -> String {
    "*".to_string()
}

fn default_from_1h() -> String {
    "1h".to_string()
}

fn default_sort_desc() -> String {
    "desc".to_string()
}

fn logs_md(data: &Value) -> String {
    let empty = Vec::new();
    let entries = data.get("data").and_then(Value::as_array).unwrap_or(&empty);
    if entries.is_empty() {
        return "No log entries found.".to_string();
    }
    let mut lines = vec![format!("# Logs ({} entries)", entries.len()), String::new()];
    for entry in entries {
        let attrs = entry.get("attributes").cloned().unwrap_or_else(|| json!({}));
        lines.push(format!(
            "**[{}]** `{}` {}",
            field_str(&attrs, "timestamp", "?"),
            field_str(&attrs, "status", "?"),
            field_str(&attrs, "service", "?"),
        ));
        lines.push(format!("  {}", field_str(&attrs, "message", "(no message)")));
        lines.push(String::new());
    }
    lines.join("\n")
}

#[tool_router(router = logs_router)]
impl DatadogToolsServer {
    #[tool(
        name = "datadog_logs_search",
        description = "Search Datadog logs using query syntax with a time range and pagination.",
        annotations(
            title = "Search Logs",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn logs_search(
        &self,
        Parameters(params): Parameters<LogsSearchParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!(query = %params.query, limit = params.limit, "Searching Datadog logs");
        Ok(tool_reply(self.search_logs(&params).await))
    }
}

impl DatadogToolsServer {
    pub(crate) fn logs_tools() -> ToolRouter<Self> {
        Self::logs_router()
    }

    async fn search_logs(&self, params: &LogsSearchParams) -> Result<String, DatadogError> {
        check_range("limit", params.limit, 1, 1000)?;
        let from_ts = parse_time(&params.from_time)?;
        let to_ts = match &params.to_time {
            Some(t) => parse_time(t)?,
            None => now_unix(),
        };
        // The v2 log search API takes millisecond timestamps as strings.
        let body = json!({
            "filter": {
                "query": params.query,
                "from": (from_ts * 1000).to_string(),
                "to": (to_ts * 1000).to_string(),
            },
            "sort": if params.sort == "asc" { "timestamp" } else { "-timestamp" },
            "page": { "limit": params.limit },
        });
        let data = self
            .client()
            .post(ApiVersion::V2, "logs/events/search", &body)
            .await?;
        Ok(format_output(
            &data.unwrap_or(Value::Null),
            params.response_format,
            Some(logs_md),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renderer_handles_empty() {
        assert_eq!(logs_md(&json!({"data": []})), "No log entries found.");
    }

    #[test]
    fn renderer_formats_entries() {
        let data = json!({"data": [
            {"attributes": {"timestamp": "2024-01-15T10:30:00Z", "status": "error",
                            "service": "api", "message": "boom"}},
            {"attributes": {"timestamp": "2024-01-15T10:31:00Z", "status": "info",
                            "service": "api"}}
        ]});
        let md = logs_md(&data);
        assert!(md.starts_with("# Logs (2 entries)"));
        assert!(md.contains("**[2024-01-15T10:30:00Z]** `error` api"));
        assert!(md.contains("  boom"));
        assert!(md.contains("  (no message)"));
    }
}
