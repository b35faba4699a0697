//! Datadog host tag tools: list, get, add, update, delete.

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use rmcp::{tool, tool_router};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{check_not_empty, check_range, tool_reply, PaginatedParams, MAX_LIMIT};
use crate::datadog::client::ApiVersion;
use crate::datadog::error::DatadogError;
use crate::format::{format_output, ResponseFormat};
use crate::server::DatadogToolsServer;

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TagsGetParams {
    #[schemars(description = "Hostname")]
    pub host: String,
    #[schemars(description = "Output format: 'json' or 'markdown'")]
    #[serde(default)]
    pub response_format: ResponseFormat,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TagsModifyParams {
    #[schemars(description = "Hostname")]
    pub host: String,
    #[schemars(description = "Tags list (e.g. ['env:prod', 'role:db'])")]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TagsDeleteParams {
    #[schemars(description = "Hostname")]
    pub host: String,
}

#[tool_router(router = tags_router)]
impl DatadogToolsServer {
    #[tool(
        name = "datadog_tags_list",
        description = "List all host tags across the infrastructure.",
        annotations(
            title = "List Host Tags",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn tags_list(
        &self,
        Parameters(params): Parameters<PaginatedParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!("Listing Datadog host tags");
        Ok(tool_reply(self.list_tags(&params).await))
    }

    #[tool(
        name = "datadog_tags_get",
        description = "Get all tags attached to a specific host.",
        annotations(
            title = "Get Host Tags",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn tags_get(&self, Parameters(params): Parameters<TagsGetParams>) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!(host = %params.host, "Retrieving Datadog host tags");
        Ok(tool_reply(self.get_tags(&params).await))
    }

    #[tool(
        name = "datadog_tags_add",
        description = "Add tags to a host.",
        annotations(
            title = "Add Host Tags",
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = false,
            open_world_hint = true
        )
    )]
    pub async fn tags_add(&self, Parameters(params): Parameters<TagsModifyParams>) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!(host = %params.host, "Adding Datadog host tags");
        Ok(tool_reply(self.add_tags(&params).await))
    }

    #[tool(
        name = "datadog_tags_update",
        description = "Replace all tags on a host.",
        annotations(
            title = "Update Host Tags",
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn tags_update(
        &self,
        Parameters(params): Parameters<TagsModifyParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!(host = %params.host, "Updating Datadog host tags");
        Ok(tool_reply(self.update_tags(&params).await))
    }

    #[tool(
        name = "datadog_tags_delete",
        description = "Delete all tags from a host.",
        annotations(
            title = "Delete Host Tags",
            read_only_hint = false,
            destructive_hint = true,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn tags_delete(
        &self,
        Parameters(params): Parameters<TagsDeleteParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!(host = %params.host, "Deleting Datadog host tags");
        Ok(tool_reply(self.delete_tags(&params).await))
    }
}

impl DatadogToolsServer {
    pub(crate) fn tags_tools() -> ToolRouter<Self> {
        Self::tags_router()
    }

    async fn list_tags(&self, params: &PaginatedParams) -> Result<String, DatadogError> {
        check_range("limit", params.limit, 1, MAX_LIMIT)?;
        let data = self.client().get(ApiVersion::V1, "tags/hosts", None).await?;
        Ok(format_output(&data.unwrap_or(Value::Null), params.response_format, None))
    }

    async fn get_tags(&self, params: &TagsGetParams) -> Result<String, DatadogError> {
        check_not_empty("host", &params.host)?;
        let path = format!("tags/hosts/{}", params.host);
        let data = self.client().get(ApiVersion::V1, &path, None).await?;
        Ok(format_output(&data.unwrap_or(Value::Null), params.response_format, None))
    }

    async fn add_tags(&self, params: &TagsModifyParams) -> Result<String, DatadogError> {
        self.modify_tags(params, false).await
    }

    async fn update_tags(&self, params: &TagsModifyParams) -> Result<String, DatadogError> {
        self.modify_tags(params, true).await
    }

    // POST adds to the host's tags; PUT replaces them. Both return the
    // resulting tag set, which is the useful artifact here.
    async fn modify_tags(&self, params: &TagsModifyParams, replace: bool) -> Result<String, DatadogError> {
        check_not_empty("host", &params.host)?;
        if params.tags.is_empty() {
            return Err(DatadogError::Validation(
                "tags must contain at least one entry".to_string(),
            ));
        }
        let path = format!("tags/hosts/{}", params.host);
        let body = json!({ "tags": params.tags });
        let data = if replace {
            self.client().put(ApiVersion::V1, &path, &body).await?
        } else {
            self.client().post(ApiVersion::V1, &path, &body).await?
        };
        Ok(format_output(&data.unwrap_or(Value::Null), ResponseFormat::Json, None))
    }

    async fn delete_tags(&self, params: &TagsDeleteParams) -> Result<String, DatadogError> {
        check_not_empty("host", &params.host)?;
        let path = format!("tags/hosts/{}", params.host);
        self.client().delete(ApiVersion::V1, &path).await?;
        Ok(format!("All tags deleted from host '{}'.", params.host))
    }
}
