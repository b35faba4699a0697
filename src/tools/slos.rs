//! Datadog SLO tools: list, get, delete.

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
pub struct SloGetParams {
    #[schemars(description = "SLO ID")]
    pub slo_id: String,
    #[schemars(description = "Output format: 'json' or 'markdown'")]
    #[serde(default)]
    pub response_format: ResponseFormat,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SloDeleteParams {
    #[schemars(description = "SLO ID to delete")]
    pub slo_id: String,
}

fn slos_md(data: &Value) -> String {
    let empty = Vec::new();
    let slos = data.get("data").and_then(Value::as_array).unwrap_or(&empty);
    if slos.is_empty() {
        return "No SLOs found.".to_string();
    }
    let mut lines = vec![format!("# SLOs ({})", slos.len()), String::new()];
    for slo in slos {
        lines.push(format!(
            "## {} ({})",
            field_str(slo, "name", "?"),
            field_display(slo, "id")
        ));
        lines.push(format!("- **Type**: {}", field_display(slo, "type")));
        lines.push(format!(
            "- **Description**: {}",
            field_or(slo, "description", "(none)")
        ));
        if let Some(thresholds) = slo.get("thresholds").and_then(Value::as_array) {
            for t in thresholds {
                lines.push(format!(
                    "- **Target**: {}% ({})",
                    field_display(t, "target"),
                    field_display(t, "timeframe")
                ));
            }
        }
        lines.push(String::new());
    }
    lines.join("\n")
}

#[tool_router(router = slos_router)]
impl DatadogToolsServer {
    #[tool(
        name = "datadog_slos_list",
        description = "List Datadog SLOs with their targets and timeframes.",
        annotations(
            title = "List SLOs",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn slos_list(
        &self,
        Parameters(params): Parameters<PaginatedParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!("Listing Datadog SLOs");
        Ok(tool_reply(self.list_slos(&params).await))
    }

    #[tool(
        name = "datadog_slos_get",
        description = "Get detailed configuration for a specific SLO.",
        annotations(
            title = "Get SLO",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn slos_get(&self, Parameters(params): Parameters<SloGetParams>) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!(slo_id = %params.slo_id, "Retrieving Datadog SLO");
        Ok(tool_reply(self.get_slo(&params).await))
    }

    #[tool(
        name = "datadog_slos_delete",
        description = "Permanently delete a Datadog SLO.",
        annotations(
            title = "Delete SLO",
            read_only_hint = false,
            destructive_hint = true,
            idempotent_hint = false,
            open_world_hint = true
        )
    )]
    pub async fn slos_delete(
        &self,
        Parameters(params): Parameters<SloDeleteParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!(slo_id = %params.slo_id, "Deleting Datadog SLO");
        Ok(tool_reply(self.delete_slo(&params).await))
    }
}

impl DatadogToolsServer {
    pub(crate) fn slos_tools() -> ToolRouter<Self> {
        Self::slos_router()
    }

    async fn list_slos(&self, params: &PaginatedParams) -> Result<String, DatadogError> {
        check_range("limit", params.limit, 1, MAX_LIMIT)?;
        let data = self.client().get(ApiVersion::V1, "slo", None).await?;
        Ok(format_output(
            &data.unwrap_or(Value::Null),
            params.response_format,
            Some(slos_md),
        ))
    }

    async fn get_slo(&self, params: &SloGetParams) -> Result<String, DatadogError> {
        check_not_empty("slo_id", &params.slo_id)?;
        let path = format!("slo/{}", params.slo_id);
        let data = self.client().get(ApiVersion::V1, &path, None).await?;
        Ok(format_output(&data.unwrap_or(Value::Null), params.response_format, None))
    }

    async fn delete_slo(&self, params: &SloDeleteParams) -> Result<String, DatadogError> {
        check_not_empty("slo_id", &params.slo_id)?;
        let path = format!("slo/{}", params.slo_id);
        self.client().delete(ApiVersion::V1, &path).await?;
        Ok(format!("SLO {} deleted successfully.", params.slo_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renderer_handles_empty() {
        assert_eq!(slos_md(&json!({"data": []})), "No SLOs found.");
    }

    #[test]
    fn renderer_lists_thresholds() {
        let data = json!({"data": [
            {"id": "slo-1", "name": "API availability", "type": "monitor",
             "thresholds": [{"target": 99.9, "timeframe": "30d"},
                            {"target": 99.5, "timeframe": "90d"}]}
        ]});
        let md = slos_md(&data);
        assert!(md.contains("## API availability (slo-1)"));
        assert!(md.contains("- **Target**: 99.9% (30d)"));
        assert!(md.contains("- **Target**: 99.5% (90d)"));
    }
}
