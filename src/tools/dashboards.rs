//! Datadog dashboard tools: list, get, delete.

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use rmcp::{tool, tool_router};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use super::{check_not_empty, check_range, tool_reply, PaginatedParams, MAX_LIMIT};
use crate::datadog::client::ApiVersion;
use crate::datadog::error::DatadogError;
use crate::format::{field_display, field_or, field_str, format_output, ResponseFormat};
use crate::server::DatadogToolsServer;

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DashboardGetParams {
    #[schemars(description = "Dashboard ID (e.g. 'abc-def-ghi')")]
    pub dashboard_id: String,
    #[schemars(description = "Output format: 'json' or 'markdown'")]
    #[serde(default)]
    pub response_format: ResponseFormat,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DashboardDeleteParams {
    #[schemars(description = "Dashboard ID to delete")]
    pub dashboard_id: String,
}

fn dashboards_list_md(data: &Value) -> String {
    let empty = Vec::new();
    let dashboards = data
        .get("dashboards")
        .and_then(Value::as_array)
        .unwrap_or(&empty);
    if dashboards.is_empty() {
        return "No dashboards found.".to_string();
    }
    let mut lines = vec![format!("# Dashboards ({})", dashboards.len()), String::new()];
    for db in dashboards {
        lines.push(format!(
            "## {} ({})",
            field_str(db, "title", "?"),
            field_display(db, "id")
        ));
        if let Some(description) = db.get("description").and_then(Value::as_str) {
            if !description.is_empty() {
                lines.push(format!("  {}", description));
            }
        }
        if let Some(author) = db.get("author_handle").and_then(Value::as_str) {
            if !author.is_empty() {
                lines.push(format!("  - **Author**: {}", author));
            }
        }
        lines.push(String::new());
    }
    lines.join("\n")
}

fn dashboard_detail_md(data: &Value) -> String {
    let widgets = data
        .get("widgets")
        .and_then(Value::as_array)
        .map(Vec::len)
        .unwrap_or(0);
    [
        format!("# Dashboard: {}", field_display(data, "title")),
        String::new(),
        format!("- **ID**: {}", field_display(data, "id")),
        format!("- **Layout**: {}", field_display(data, "layout_type")),
        format!("- **Widgets**: {}", widgets),
        format!("- **Description**: {}", field_or(data, "description", "(none)")),
        format!("- **Author**: {}", field_str(data, "author_handle", "unknown")),
        format!("- **Created**: {}", field_display(data, "created_at")),
        format!("- **Modified**: {}", field_display(data, "modified_at")),
    ]
    .join("\n")
}

#[tool_router(router = dashboards_router)]
impl DatadogToolsServer {
    #[tool(
        name = "datadog_dashboards_list",
        description = "List all dashboards in the Datadog account.",
        annotations(
            title = "List Dashboards",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn dashboards_list(
        &self,
        Parameters(params): Parameters<PaginatedParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!("Listing Datadog dashboards");
        Ok(tool_reply(self.list_dashboards(&params).await))
    }

    #[tool(
        name = "datadog_dashboards_get",
        description = "Get the full configuration of a Datadog dashboard.",
        annotations(
            title = "Get Dashboard",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn dashboards_get(
        &self,
        Parameters(params): Parameters<DashboardGetParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!(dashboard_id = %params.dashboard_id, "Retrieving Datadog dashboard");
        Ok(tool_reply(self.get_dashboard(&params).await))
    }

    #[tool(
        name = "datadog_dashboards_delete",
        description = "Permanently delete a Datadog dashboard.",
        annotations(
            title = "Delete Dashboard",
            read_only_hint = false,
            destructive_hint = true,
            idempotent_hint = false,
            open_world_hint = true
        )
    )]
    pub async fn dashboards_delete(
        &self,
        Parameters(params): Parameters<DashboardDeleteParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!(dashboard_id = %params.dashboard_id, "Deleting Datadog dashboard");
        Ok(tool_reply(self.delete_dashboard(&params).await))
    }
}

impl DatadogToolsServer {
    pub(crate) fn dashboards_tools() -> ToolRouter<Self> {
        Self::dashboards_router()
    }

    async fn list_dashboards(&self, params: &PaginatedParams) -> Result<String, DatadogError> {
        check_range("limit", params.limit, 1, MAX_LIMIT)?;
        let data = self.client().get(ApiVersion::V1, "dashboard", None).await?;
        Ok(format_output(
            &data.unwrap_or(Value::Null),
            params.response_format,
            Some(dashboards_list_md),
        ))
    }

    async fn get_dashboard(&self, params: &DashboardGetParams) -> Result<String, DatadogError> {
        check_not_empty("dashboard_id", &params.dashboard_id)?;
        let path = format!("dashboard/{}", params.dashboard_id);
        let data = self.client().get(ApiVersion::V1, &path, None).await?;
        Ok(format_output(
            &data.unwrap_or(Value::Null),
            params.response_format,
            Some(dashboard_detail_md),
        ))
    }

    async fn delete_dashboard(&self, params: &DashboardDeleteParams) -> Result<String, DatadogError> {
        check_not_empty("dashboard_id", &params.dashboard_id)?;
        let path = format!("dashboard/{}", params.dashboard_id);
        self.client().delete(ApiVersion::V1, &path).await?;
        Ok(format!("Dashboard {} deleted successfully.", params.dashboard_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_renderer_reads_dashboards_key() {
        let data = json!({"dashboards": [
            {"id": "abc-123", "title": "Service Overview", "description": "Core KPIs",
             "author_handle": "sre@example.com"}
        ]});
        let md = dashboards_list_md(&data);
        assert!(md.contains("# Dashboards (1)"));
        assert!(md.contains("## Service Overview (abc-123)"));
        assert!(md.contains("- **Author**: sre@example.com"));
    }

    #[test]
    fn list_renderer_handles_empty() {
        assert_eq!(dashboards_list_md(&json!({"dashboards": []})), "No dashboards found.");
        assert_eq!(dashboards_list_md(&json!([])), "No dashboards found.");
    }

    #[test]
    fn detail_renderer_counts_widgets() {
        let data = json!({"title": "T", "id": "x", "layout_type": "ordered",
                          "widgets": [{}, {}, {}]});
        let md = dashboard_detail_md(&data);
        assert!(md.contains("- **Widgets**: 3"));
        assert!(md.contains("- **Author**: unknown"));
    }
}
