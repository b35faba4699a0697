//! Datadog downtime tools: list, get, cancel.

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
use crate::format::{format_output, ResponseFormat};
use crate::server::DatadogToolsServer;

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DowntimeGetParams {
    #[schemars(description = "Downtime ID")]
    pub downtime_id: String,
    #[schemars(description = "Output format: 'json' or 'markdown'")]
    #[serde(default)]
    pub response_format: ResponseFormat,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DowntimeCancelParams {
    #[schemars(description = "Downtime ID to cancel")]
    pub downtime_id: String,
}

#[tool_router(router = downtimes_router)]
impl DatadogToolsServer {
    #[tool(
        name = "datadog_downtimes_list",
        description = "List all scheduled downtimes.",
        annotations(
            title = "List Downtimes",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn downtimes_list(
        &self,
        Parameters(params): Parameters<PaginatedParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!("Listing Datadog downtimes");
        Ok(tool_reply(self.list_downtimes(&params).await))
    }

    #[tool(
        name = "datadog_downtimes_get",
        description = "Get details for a specific downtime.",
        annotations(
            title = "Get Downtime",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn downtimes_get(
        &self,
        Parameters(params): Parameters<DowntimeGetParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!(downtime_id = %params.downtime_id, "Retrieving Datadog downtime");
        Ok(tool_reply(self.get_downtime(&params).await))
    }

    #[tool(
        name = "datadog_downtimes_cancel",
        description = "Cancel a scheduled downtime.",
        annotations(
            title = "Cancel Downtime",
            read_only_hint = false,
            destructive_hint = true,
            idempotent_hint = false,
            open_world_hint = true
        )
    )]
    pub async fn downtimes_cancel(
        &self,
        Parameters(params): Parameters<DowntimeCancelParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!(downtime_id = %params.downtime_id, "Cancelling Datadog downtime");
        Ok(tool_reply(self.cancel_downtime(&params).await))
    }
}

impl DatadogToolsServer {
    pub(crate) fn downtimes_tools() -> ToolRouter<Self> {
        Self::downtimes_router()
    }

    async fn list_downtimes(&self, params: &PaginatedParams) -> Result<String, DatadogError> {
        check_range("limit", params.limit, 1, MAX_LIMIT)?;
        let data = self.client().get(ApiVersion::V2, "downtime", None).await?;
        Ok(format_output(&data.unwrap_or(Value::Null), params.response_format, None))
    }

    async fn get_downtime(&self, params: &DowntimeGetParams) -> Result<String, DatadogError> {
        check_not_empty("downtime_id", &params.downtime_id)?;
        let path = format!("downtime/{}", params.downtime_id);
        let data = self.client().get(ApiVersion::V2, &path, None).await?;
        Ok(format_output(&data.unwrap_or(Value::Null), params.response_format, None))
    }

    async fn cancel_downtime(&self, params: &DowntimeCancelParams) -> Result<String, DatadogError> {
        check_not_empty("downtime_id", &params.downtime_id)?;
        let path = format!("downtime/{}", params.downtime_id);
        self.client().delete(ApiVersion::V2, &path).await?;
        Ok(format!("Downtime {} cancelled successfully.", params.downtime_id))
    }
}
