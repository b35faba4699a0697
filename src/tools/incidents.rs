//! Datadog incident tools: list, get.

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
use crate::format::{field_display, format_output, ResponseFormat};
use crate::server::DatadogToolsServer;

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct IncidentGetParams {
    #[schemars(description = "Incident ID")]
    pub incident_id: String,
    #[schemars(description = "Output format: 'json' or 'markdown'")]
    #[serde(default)]
    pub response_format: ResponseFormat,
}

fn incidents_md(data: &Value) -> String {
    let empty = Vec::new();
    let incidents = data.get("data").and_then(Value::as_array).unwrap_or(&empty);
    if incidents.is_empty() {
        return "No incidents found.".to_string();
    }
    let mut lines = vec![format!("# Incidents ({})", incidents.len()), String::new()];
    for inc in incidents {
        let attrs = inc.get("attributes").cloned().unwrap_or(Value::Null);
        lines.push(format!(
            "## {} ({})",
            field_display(&attrs, "title"),
            field_display(inc, "id")
        ));
        lines.push(format!("- **Status**: {}", field_display(&attrs, "state")));
        lines.push(format!(
            "- **Severity**: {}",
            attrs
                .get("severity")
                .and_then(Value::as_str)
                .unwrap_or("N/A")
        ));
        lines.push(format!("- **Created**: {}", field_display(&attrs, "created")));
        lines.push(String::new());
    }
    lines.join("\n")
}

#[tool_router(router = incidents_router)]
impl DatadogToolsServer {
    #[tool(
        name = "datadog_incidents_list",
        description = "List Datadog incidents with pagination.",
        annotations(
            title = "List Incidents",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn incidents_list(
        &self,
        Parameters(params): Parameters<PaginatedParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!(limit = params.limit, offset = params.offset, "Listing Datadog incidents");
        Ok(tool_reply(self.list_incidents(&params).await))
    }

    #[tool(
        name = "datadog_incidents_get",
        description = "Get detailed information for a specific Datadog incident.",
        annotations(
            title = "Get Incident",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn incidents_get(
        &self,
        Parameters(params): Parameters<IncidentGetParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!(incident_id = %params.incident_id, "Retrieving Datadog incident");
        Ok(tool_reply(self.get_incident(&params).await))
    }
}

impl DatadogToolsServer {
    pub(crate) fn incidents_tools() -> ToolRouter<Self> {
        Self::incidents_router()
    }

    async fn list_incidents(&self, params: &PaginatedParams) -> Result<String, DatadogError> {
        check_range("limit", params.limit, 1, MAX_LIMIT)?;
        let query = vec![
            ("page[size]", params.limit.to_string()),
            ("page[offset]", params.offset.to_string()),
        ];
        let data = self.client().get(ApiVersion::V2, "incidents", Some(&query)).await?;
        Ok(format_output(
            &data.unwrap_or(Value::Null),
            params.response_format,
            Some(incidents_md),
        ))
    }

    async fn get_incident(&self, params: &IncidentGetParams) -> Result<String, DatadogError> {
        check_not_empty("incident_id", &params.incident_id)?;
        let path = format!("incidents/{}", params.incident_id);
        let data = self.client().get(ApiVersion::V2, &path, None).await?;
        Ok(format_output(&data.unwrap_or(Value::Null), params.response_format, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renderer_handles_empty() {
        assert_eq!(incidents_md(&json!({"data": []})), "No incidents found.");
    }

    #[test]
    fn renderer_reads_jsonapi_attributes() {
        let data = json!({"data": [
            {"id": "inc-1", "attributes": {"title": "API outage", "state": "active",
                                           "severity": "SEV-1", "created": "2024-01-15"}}
        ]});
        let md = incidents_md(&data);
        assert!(md.contains("## API outage (inc-1)"));
        assert!(md.contains("- **Severity**: SEV-1"));
    }

    #[test]
    fn renderer_defaults_missing_severity() {
        let data = json!({"data": [{"id": "inc-2", "attributes": {"title": "t", "state": "stable"}}]});
        assert!(incidents_md(&data).contains("- **Severity**: N/A"));
    }
}
