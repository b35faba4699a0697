//! Datadog event tools: list, search, get.

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use rmcp::{tool, tool_router};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{check_not_empty, check_range, default_limit, tool_reply, MAX_LIMIT};
use crate::datadog::client::ApiVersion;
use crate::datadog::error::DatadogError;
use crate::format::{format_output, ResponseFormat};
use crate::server::DatadogToolsServer;
use crate::time_parser::parse_time_range;

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct EventsListParams {
    #[schemars(description = "Start time: relative (1h, 30m, 7d), Unix timestamp, or RFC 3339")]
    #[serde(rename = "from", default = "default_from_1h")]
    pub from_time: String,
    #[schemars(description = "End time (default: now)")]
    #[serde(rename = "to")]
    pub to_time: Option<String>,
    #[schemars(description = "Comma-separated tags to filter by")]
    pub tags: Option<String>,
    #[schemars(description = "Output format: 'json' or 'markdown'")]
    #[serde(default)]
    pub response_format: ResponseFormat,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct EventsSearchParams {
    #[schemars(description = "Event search query")]
    #[serde(default = "default_query_all")]
    pub query: String,
    #[schemars(description = "Start time: relative (1h, 30m, 7d), Unix timestamp, or RFC 3339")]
    #[serde(rename = "from", default = "default_from_1h")]
    pub from_time: String,
    #[schemars(description = "End time (default: now)")]
    #[serde(rename = "to")]
    pub to_time: Option<String>,
    #[schemars(description = "Maximum results to return (1-100, default 20)")]
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[schemars(description = "Output format: 'json' or 'markdown'")]
    #[serde(default)]
    pub response_format: ResponseFormat,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct EventGetParams {
    #[schemars(description = "Event ID")]
    pub event_id: String,
    #[schemars(description = "Output format: 'json' or 'markdown'")]
    #[serde(default)]
    pub response_format: ResponseFormat,
}

fn default_from_1h() -> String {
    "1h".to_string()
}

fn default_query_all() -> String {
    "*".to_string()
}

#[tool_router(router = events_router)]
impl DatadogToolsServer {
    #[tool(
        name = "datadog_events_list",
        description = "List recent Datadog events within a time range.",
        annotations(
            title = "List Events",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn events_list(
        &self,
        Parameters(params): Parameters<EventsListParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!("Listing Datadog events");
        Ok(tool_reply(self.list_events(&params).await))
    }

    #[tool(
        name = "datadog_events_search",
        description = "Search Datadog events using query syntax.",
        annotations(
            title = "Search Events",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn events_search(
        &self,
        Parameters(params): Parameters<EventsSearchParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!(query = %params.query, "Searching Datadog events");
        Ok(tool_reply(self.search_events(&params).await))
    }

    #[tool(
        name = "datadog_events_get",
        description = "Get details for a specific Datadog event by ID.",
        annotations(
            title = "Get Event",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn events_get(
        &self,
        Parameters(params): Parameters<EventGetParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!(event_id = %params.event_id, "Retrieving Datadog event");
        Ok(tool_reply(self.get_event(&params).await))
    }
}

impl DatadogToolsServer {
    pub(crate) fn events_tools() -> ToolRouter<Self> {
        Self::events_router()
    }

    async fn list_events(&self, params: &EventsListParams) -> Result<String, DatadogError> {
        let (from_ts, to_ts) = parse_time_range(&params.from_time, params.to_time.as_deref())?;
        let mut query = vec![("start", from_ts.to_string()), ("end", to_ts.to_string())];
        if let Some(tags) = &params.tags {
            query.push(("tags", tags.clone()));
        }
        let data = self.client().get(ApiVersion::V1, "events", Some(&query)).await?;
        Ok(format_output(&data.unwrap_or(Value::Null), params.response_format, None))
    }

    async fn search_events(&self, params: &EventsSearchParams) -> Result<String, DatadogError> {
        check_range("limit", params.limit, 1, MAX_LIMIT)?;
        let (from_ts, to_ts) = parse_time_range(&params.from_time, params.to_time.as_deref())?;
        let body = json!({
            "filter": {
                "query": params.query,
                "from": from_ts.to_string(),
                "to": to_ts.to_string(),
            },
            "page": { "limit": params.limit },
        });
        let data = self.client().post(ApiVersion::V2, "events/search", &body).await?;
        Ok(format_output(&data.unwrap_or(Value::Null), params.response_format, None))
    }

    async fn get_event(&self, params: &EventGetParams) -> Result<String, DatadogError> {
        check_not_empty("event_id", &params.event_id)?;
        let path = format!("events/{}", params.event_id);
        let data = self.client().get(ApiVersion::V1, &path, None).await?;
        Ok(format_output(&data.unwrap_or(Value::Null), params.response_format, None))
    }
}
