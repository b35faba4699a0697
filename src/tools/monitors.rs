//! Datadog monitor tools: list, get, search, delete.

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use rmcp::{tool, tool_router};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use super::{check_not_empty, check_positive, check_range, default_limit, tool_reply, MAX_LIMIT};
use crate::datadog::client::ApiVersion;
use crate::datadog::error::DatadogError;
use crate::format::{field_display, field_or, field_str, format_output, ResponseFormat};
use crate::server::DatadogToolsServer;

// -- Inputs -----------------------------------------------------------------

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct MonitorsListParams {
    #[schemars(description = "Maximum results to return (1-100, default 20)")]
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[schemars(description = "Number of results to skip for pagination")]
    #[serde(default)]
    pub offset: u32,
    #[schemars(description = "Filter by monitor name substring")]
    pub name: Option<String>,
    #[schemars(description = "Comma-separated tags (e.g. 'env:prod,team:backend')")]
    pub tags: Option<String>,
    #[schemars(description = "Output format: 'json' or 'markdown'")]
    #[serde(default)]
    pub response_format: ResponseFormat,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct MonitorGetParams {
    #[schemars(description = "Numeric monitor ID")]
    pub monitor_id: i64,
    #[schemars(description = "Output format: 'json' or 'markdown'")]
    #[serde(default)]
    pub response_format: ResponseFormat,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct MonitorsSearchParams {
    #[schemars(description = "Search query (e.g. 'type:metric status:alert')")]
    pub query: String,
    #[schemars(description = "Page number")]
    #[serde(default)]
    pub page: u32,
    #[schemars(description = "Results per page (1-100, default 30)")]
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    #[schemars(description = "Sort specification (e.g. 'name,asc')")]
    pub sort: Option<String>,
    #[schemars(description = "Output format: 'json' or 'markdown'")]
    #[serde(default)]
    pub response_format: ResponseFormat,
}

fn default_per_page() -> u32 {
    30
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct MonitorDeleteParams {
    #[schemars(description = "Numeric monitor ID to delete")]
    pub monitor_id: i64,
}

// -- Markdown renderers -----------------------------------------------------

fn monitors_list_md(data: &Value) -> String {
    let empty = Vec::new();
    let monitors = data.as_array().unwrap_or(&empty);
    if monitors.is_empty() {
        return "No monitors found.".to_string();
    }
    let mut lines = vec![format!("# Monitors ({} results)", monitors.len()), String::new()];
    for m in monitors {
        lines.push(format!(
            "## {} (ID: {})",
            field_str(m, "name", "?"),
            field_display(m, "id")
        ));
        lines.push(format!("- **Type**: {}", field_display(m, "type")));
        lines.push(format!("- **Status**: {}", field_display(m, "overall_state")));
        if let Some(tags) = join_tags(m) {
            lines.push(format!("- **Tags**: {}", tags));
        }
        lines.push(String::new());
    }
    lines.join("\n")
}

fn monitor_detail_md(data: &Value) -> String {
    let mut lines = vec![
        format!("# Monitor: {}", field_display(data, "name")),
        String::new(),
        format!("- **ID**: {}", field_display(data, "id")),
        format!("- **Type**: {}", field_display(data, "type")),
        format!("- **Status**: {}", field_display(data, "overall_state")),
        format!("- **Query**: `{}`", field_display(data, "query")),
        format!("- **Message**: {}", field_or(data, "message", "(none)")),
        format!("- **Created**: {}", field_display(data, "created")),
        format!("- **Modified**: {}", field_display(data, "modified")),
    ];
    if let Some(tags) = join_tags(data) {
        lines.push(format!("- **Tags**: {}", tags));
    }
    lines.join("\n")
}

fn join_tags(value: &Value) -> Option<String> {
    let tags = value.get("tags")?.as_array()?;
    if tags.is_empty() {
        return None;
    }
    Some(
        tags.iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", "),
    )
}

// -- Tools ------------------------------------------------------------------

#[tool_router(router = monitors_router)]
impl DatadogToolsServer {
    #[tool(
        name = "datadog_monitors_list",
        description = "List Datadog monitors with optional name and tag filtering.",
        annotations(
            title = "List Monitors",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn monitors_list(
        &self,
        Parameters(params): Parameters<MonitorsListParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!(limit = params.limit, offset = params.offset, "Listing Datadog monitors");
        Ok(tool_reply(self.list_monitors(&params).await))
    }

    #[tool(
        name = "datadog_monitors_get",
        description = "Get the full configuration and status of a Datadog monitor.",
        annotations(
            title = "Get Monitor",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn monitors_get(
        &self,
        Parameters(params): Parameters<MonitorGetParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!(monitor_id = params.monitor_id, "Retrieving Datadog monitor");
        Ok(tool_reply(self.get_monitor(&params).await))
    }

    #[tool(
        name = "datadog_monitors_search",
        description = "Search monitors using Datadog monitor search query syntax.",
        annotations(
            title = "Search Monitors",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn monitors_search(
        &self,
        Parameters(params): Parameters<MonitorsSearchParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!(query = %params.query, "Searching Datadog monitors");
        Ok(tool_reply(self.search_monitors(&params).await))
    }

    #[tool(
        name = "datadog_monitors_delete",
        description = "Permanently delete a Datadog monitor.",
        annotations(
            title = "Delete Monitor",
            read_only_hint = false,
            destructive_hint = true,
            idempotent_hint = false,
            open_world_hint = true
        )
    )]
    pub async fn monitors_delete(
        &self,
        Parameters(params): Parameters<MonitorDeleteParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!(monitor_id = params.monitor_id, "Deleting Datadog monitor");
        Ok(tool_reply(self.delete_monitor(&params).await))
    }
}

impl DatadogToolsServer {
    pub(crate) fn monitors_tools() -> ToolRouter<Self> {
        Self::monitors_router()
    }

    async fn list_monitors(&self, params: &MonitorsListParams) -> Result<String, DatadogError> {
        let limit = check_range("limit", params.limit, 1, MAX_LIMIT)?;
        let mut query = vec![
            ("page_size", limit.to_string()),
            ("page", (params.offset / limit).to_string()),
        ];
        if let Some(name) = &params.name {
            query.push(("name", name.clone()));
        }
        if let Some(tags) = &params.tags {
            query.push(("monitor_tags", tags.clone()));
        }
        let data = self.client().get(ApiVersion::V1, "monitor", Some(&query)).await?;
        Ok(format_output(
            &data.unwrap_or(Value::Null),
            params.response_format,
            Some(monitors_list_md),
        ))
    }

    async fn get_monitor(&self, params: &MonitorGetParams) -> Result<String, DatadogError> {
        check_positive("monitor_id", params.monitor_id)?;
        let path = format!("monitor/{}", params.monitor_id);
        let data = self.client().get(ApiVersion::V1, &path, None).await?;
        Ok(format_output(
            &data.unwrap_or(Value::Null),
            params.response_format,
            Some(monitor_detail_md),
        ))
    }

    async fn search_monitors(&self, params: &MonitorsSearchParams) -> Result<String, DatadogError> {
        check_not_empty("query", &params.query)?;
        check_range("per_page", params.per_page, 1, MAX_LIMIT)?;
        let mut query = vec![
            ("query", params.query.clone()),
            ("page", params.page.to_string()),
            ("per_page", params.per_page.to_string()),
        ];
        if let Some(sort) = &params.sort {
            query.push(("sort", sort.clone()));
        }
        let data = self
            .client()
            .get(ApiVersion::V1, "monitor/search", Some(&query))
            .await?;
        Ok(format_output(&data.unwrap_or(Value::Null), params.response_format, None))
    }

    async fn delete_monitor(&self, params: &MonitorDeleteParams) -> Result<String, DatadogError> {
        check_positive("monitor_id", params.monitor_id)?;
        let path = format!("monitor/{}", params.monitor_id);
        self.client().delete(ApiVersion::V1, &path).await?;
        Ok(format!("Monitor {} deleted successfully.", params.monitor_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_renderer_handles_empty() {
        assert_eq!(monitors_list_md(&json!([])), "No monitors found.");
        assert_eq!(monitors_list_md(&json!({"not": "a list"})), "No monitors found.");
    }

    #[test]
    fn list_renderer_formats_entries() {
        let data = json!([
            {"id": 1, "name": "cpu high", "type": "metric alert", "overall_state": "OK",
             "tags": ["env:prod", "team:sre"]},
            {"id": 2, "name": "disk", "type": "metric alert", "overall_state": "Alert", "tags": []}
        ]);
        let md = monitors_list_md(&data);
        assert!(md.starts_with("# Monitors (2 results)"));
        assert!(md.contains("## cpu high (ID: 1)"));
        assert!(md.contains("- **Tags**: env:prod, team:sre"));
        // Empty tag lists render no tag line.
        assert_eq!(md.matches("- **Tags**").count(), 1);
    }

    #[test]
    fn detail_renderer_degrades_missing_fields() {
        let md = monitor_detail_md(&json!({"name": "m", "id": 5, "query": "avg:x{*}"}));
        assert!(md.contains("# Monitor: m"));
        assert!(md.contains("- **Status**: ?"));
        assert!(md.contains("- **Message**: (none)"));
    }
}
