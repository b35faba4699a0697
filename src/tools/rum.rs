//! Datadog RUM (Real User Monitoring) tools.
//!
//! Covers applications, RUM-based metrics, retention filters, sessions,
//! playlists, and heatmaps via the Datadog v2 API.

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use rmcp::{tool, tool_router};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{check_not_empty, check_range, tool_reply};
use crate::datadog::client::ApiVersion;
use crate::datadog::error::DatadogError;
use crate::format::{field_display, field_str, format_output, ResponseFormat};
use crate::server::DatadogToolsServer;
use crate::time_parser::{now_unix, parse_time};

// -- Inputs: applications ---------------------------------------------------

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RumAppsListParams {
    #[schemars(description = "Output format: 'json' or 'markdown'")]
    #[serde(default)]
    pub response_format: ResponseFormat,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RumAppGetParams {
    #[schemars(description = "RUM application ID")]
    pub app_id: String,
    #[schemars(description = "Output format: 'json' or 'markdown'")]
    #[serde(default)]
    pub response_format: ResponseFormat,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RumAppCreateParams {
    #[schemars(description = "Application name")]
    pub name: String,
    #[schemars(description = "Application type: browser, ios, android, react-native, or flutter")]
    #[serde(rename = "type")]
    pub app_type: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RumAppUpdateParams {
    #[schemars(description = "RUM application ID")]
    pub app_id: String,
    #[schemars(description = "New application name")]
    pub name: Option<String>,
    #[schemars(description = "New application type")]
    #[serde(rename = "type")]
    pub app_type: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RumAppDeleteParams {
    #[schemars(description = "RUM application ID")]
    pub app_id: String,
}

// -- Inputs: RUM-based metrics ----------------------------------------------

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RumMetricsListParams {
    #[schemars(description = "Output format: 'json' or 'markdown'")]
    #[serde(default)]
    pub response_format: ResponseFormat,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RumMetricGetParams {
    #[schemars(description = "RUM metric ID")]
    pub metric_id: String,
    #[schemars(description = "Output format: 'json' or 'markdown'")]
    #[serde(default)]
    pub response_format: ResponseFormat,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RumMetricCreateParams {
    #[schemars(description = "Metric name")]
    pub name: String,
    #[schemars(description = "RUM event type: views, actions, errors, resources, or longTasks")]
    pub event_type: String,
    #[schemars(description = "Aggregation type: count or distribution")]
    #[serde(default = "default_compute_count")]
    pub compute_type: String,
    #[schemars(description = "Filter query")]
    #[serde(rename = "filter")]
    pub filter_query: Option<String>,
    #[schemars(description = "Group-by paths")]
    pub group_by: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RumMetricUpdateParams {
    #[schemars(description = "RUM metric ID")]
    pub metric_id: String,
    #[schemars(description = "Aggregation type: count or distribution")]
    pub compute_type: Option<String>,
    #[schemars(description = "Filter query")]
    #[serde(rename = "filter")]
    pub filter_query: Option<String>,
    #[schemars(description = "Group-by paths")]
    pub group_by: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RumMetricDeleteParams {
    #[schemars(description = "RUM metric ID")]
    pub metric_id: String,
}

// -- Inputs: retention filters ----------------------------------------------

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RumRetentionFiltersListParams {
    #[schemars(description = "RUM application ID")]
    pub app_id: String,
    #[schemars(description = "Output format: 'json' or 'markdown'")]
    #[serde(default)]
    pub response_format: ResponseFormat,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RumRetentionFilterGetParams {
    #[schemars(description = "RUM application ID")]
    pub app_id: String,
    #[schemars(description = "Retention filter ID")]
    pub filter_id: String,
    #[schemars(description = "Output format: 'json' or 'markdown'")]
    #[serde(default)]
    pub response_format: ResponseFormat,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RumRetentionFilterCreateParams {
    #[schemars(description = "RUM application ID")]
    pub app_id: String,
    #[schemars(description = "Filter name")]
    pub name: String,
    #[schemars(description = "Filter query")]
    #[serde(default = "default_query_all")]
    pub query: String,
    #[schemars(description = "Sample rate (0-100)")]
    #[serde(default = "default_rate_full")]
    pub rate: u32,
    #[schemars(description = "Filter event type (default 'session-replay')")]
    #[serde(rename = "type", default = "default_filter_type")]
    pub filter_type: String,
    #[schemars(description = "Whether the filter is enabled")]
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RumRetentionFilterUpdateParams {
    #[schemars(description = "RUM application ID")]
    pub app_id: String,
    #[schemars(description = "Retention filter ID")]
    pub filter_id: String,
    #[schemars(description = "New filter name")]
    pub name: Option<String>,
    #[schemars(description = "New filter query")]
    pub query: Option<String>,
    #[schemars(description = "New sample rate (0-100)")]
    pub rate: Option<u32>,
    #[schemars(description = "Enable or disable the filter")]
    pub enabled: Option<bool>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RumRetentionFilterDeleteParams {
    #[schemars(description = "RUM application ID")]
    pub app_id: String,
    #[schemars(description = "Retention filter ID")]
    pub filter_id: String,
}

// -- Inputs: sessions, playlists, heatmaps ----------------------------------

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RumSessionsListParams {
    #[schemars(description = "Start time: relative (1h, 30m, 7d), Unix timestamp, or RFC 3339")]
    #[serde(rename = "from", default = "default_from_1h")]
    pub from_time: String,
    #[schemars(description = "End time (default: now)")]
    #[serde(rename = "to")]
    pub to_time: Option<String>,
    #[schemars(description = "Maximum results (1-1000, default 100)")]
    #[serde(default = "default_limit_100")]
    pub limit: u32,
    #[schemars(description = "Output format: 'json' or 'markdown'")]
    #[serde(default)]
    pub response_format: ResponseFormat,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RumSessionsSearchParams {
    #[schemars(description = "RUM search query (e.g. '@type:view')")]
    pub query: String,
    #[schemars(description = "Start time: relative (1h, 30m, 7d), Unix timestamp, or RFC 3339")]
    #[serde(rename = "from", default = "default_from_1h")]
    pub from_time: String,
    #[schemars(description = "End time (default: now)")]
    #[serde(rename = "to")]
    pub to_time: Option<String>,
    #[schemars(description = "Maximum results (1-1000, default 100)")]
    #[serde(default = "default_limit_100")]
    pub limit: u32,
    #[schemars(description = "Output format: 'json' or 'markdown'")]
    #[serde(default)]
    pub response_format: ResponseFormat,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RumPlaylistsListParams {
    #[schemars(description = "Output format: 'json' or 'markdown'")]
    #[serde(default)]
    pub response_format: ResponseFormat,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RumPlaylistGetParams {
    #[schemars(description = "Playlist ID")]
    pub playlist_id: String,
    #[schemars(description = "Output format: 'json' or 'markdown'")]
    #[serde(default)]
    pub response_format: ResponseFormat,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RumHeatmapQueryParams {
    #[schemars(description = "View/page name to query")]
    pub view: String,
    #[schemars(description = "Start time (default: 24h)")]
    #[serde(rename = "from", default = "default_from_24h")]
    pub from_time: String,
    #[schemars(description = "End time (default: now)")]
    #[serde(rename = "to")]
    pub to_time: Option<String>,
    #[schemars(description = "Output format: 'json' or 'markdown'")]
    #[serde(default)]
    pub response_format: ResponseFormat,
}

fn default_compute_count() -> String {
    "count".to_string()
}

fn default_query_all() -> String {
    "*".to_string()
}

fn default_rate_full() -> u32 {
    100
}

fn default_filter_type() -> String {
    "session-replay".to_string()
}

fn default_true() -> bool {
    true
}

fn default_from_1h() -> String {
    "1h".to_string()
}

fn default_from_24h() -> String {
    "24h".to_string()
}

fn default_limit_100() -> u32 {
    100
}

// -- Markdown renderers -----------------------------------------------------

fn apps_md(data: &Value) -> String {
    let empty = Vec::new();
    let apps = data.get("data").and_then(Value::as_array).unwrap_or(&empty);
    if apps.is_empty() {
        return "No RUM applications found.".to_string();
    }
    let mut lines = vec![format!("# RUM Applications ({})", apps.len()), String::new()];
    for app in apps {
        let attrs = app.get("attributes").cloned().unwrap_or(Value::Null);
        lines.push(format!(
            "## {} ({})",
            field_str(&attrs, "name", "?"),
            field_display(app, "id")
        ));
        lines.push(format!("- **Type**: {}", field_display(&attrs, "type")));
        lines.push(format!("- **Created**: {}", field_display(&attrs, "created_at")));
        lines.push(String::new());
    }
    lines.join("\n")
}

fn rum_metrics_md(data: &Value) -> String {
    let empty = Vec::new();
    let metrics = data.get("data").and_then(Value::as_array).unwrap_or(&empty);
    if metrics.is_empty() {
        return "No RUM metrics found.".to_string();
    }
    let mut lines = vec![format!("# RUM Metrics ({})", metrics.len()), String::new()];
    for m in metrics {
        let attrs = m.get("attributes").cloned().unwrap_or(Value::Null);
        let heading = attrs
            .get("path")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| field_display(m, "id"));
        lines.push(format!("## {}", heading));
        lines.push(format!("- **Event Type**: {}", field_display(&attrs, "event_type")));
        let aggregation = attrs
            .get("compute")
            .map(|c| field_display(c, "aggregation_type"))
            .unwrap_or_else(|| "?".to_string());
        lines.push(format!("- **Compute**: {}", aggregation));
        lines.push(String::new());
    }
    lines.join("\n")
}

fn sessions_md(data: &Value) -> String {
    let empty = Vec::new();
    let events = data.get("data").and_then(Value::as_array).unwrap_or(&empty);
    if events.is_empty() {
        return "No RUM sessions found.".to_string();
    }
    let mut lines = vec![format!("# RUM Sessions ({})", events.len()), String::new()];
    for ev in events {
        let attrs = ev.get("attributes").cloned().unwrap_or(Value::Null);
        lines.push(format!(
            "**[{}]** {}",
            field_str(&attrs, "timestamp", "?"),
            field_str(&attrs, "service", "?")
        ));
        let session_id = attrs
            .get("session")
            .map(|s| field_display(s, "id"))
            .unwrap_or_else(|| "?".to_string());
        lines.push(format!(
            "  Session: {} | Type: {}",
            session_id,
            field_display(&attrs, "type")
        ));
        lines.push(String::new());
    }
    lines.join("\n")
}

/// Request body for the RUM events search endpoint. Timestamps are
/// millisecond strings; `query` is included only when present.
fn sessions_body(
    from_time: &str,
    to_time: Option<&str>,
    limit: u32,
    query: Option<&str>,
) -> Result<Value, DatadogError> {
    let from_ts = parse_time(from_time)?;
    let to_ts = match to_time {
        Some(t) => parse_time(t)?,
        None => now_unix(),
    };
    let mut filter = Map::new();
    filter.insert("from".into(), json!((from_ts * 1000).to_string()));
    filter.insert("to".into(), json!((to_ts * 1000).to_string()));
    if let Some(query) = query {
        filter.insert("query".into(), json!(query));
    }
    Ok(json!({ "filter": filter, "page": { "limit": limit } }))
}

// -- Tools: applications ----------------------------------------------------

#[tool_router(router = rum_router)]
impl DatadogToolsServer {
    #[tool(
        name = "datadog_rum_apps_list",
        description = "List all RUM applications.",
        annotations(
            title = "List RUM Apps",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn rum_apps_list(
        &self,
        Parameters(params): Parameters<RumAppsListParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!("Listing RUM applications");
        Ok(tool_reply(self.list_rum_apps(&params).await))
    }

    #[tool(
        name = "datadog_rum_apps_get",
        description = "Get details for a specific RUM application.",
        annotations(
            title = "Get RUM App",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn rum_apps_get(
        &self,
        Parameters(params): Parameters<RumAppGetParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!(app_id = %params.app_id, "Retrieving RUM application");
        Ok(tool_reply(self.get_rum_app(&params).await))
    }

    #[tool(
        name = "datadog_rum_apps_create",
        description = "Create a new RUM application.",
        annotations(
            title = "Create RUM App",
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = false,
            open_world_hint = true
        )
    )]
    pub async fn rum_apps_create(
        &self,
        Parameters(params): Parameters<RumAppCreateParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!(name = %params.name, "Creating RUM application");
        Ok(tool_reply(self.create_rum_app(&params).await))
    }

    #[tool(
        name = "datadog_rum_apps_update",
        description = "Update an existing RUM application.",
        annotations(
            title = "Update RUM App",
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn rum_apps_update(
        &self,
        Parameters(params): Parameters<RumAppUpdateParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!(app_id = %params.app_id, "Updating RUM application");
        Ok(tool_reply(self.update_rum_app(&params).await))
    }

    #[tool(
        name = "datadog_rum_apps_delete",
        description = "Delete a RUM application.",
        annotations(
            title = "Delete RUM App",
            read_only_hint = false,
            destructive_hint = true,
            idempotent_hint = false,
            open_world_hint = true
        )
    )]
    pub async fn rum_apps_delete(
        &self,
        Parameters(params): Parameters<RumAppDeleteParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!(app_id = %params.app_id, "Deleting RUM application");
        Ok(tool_reply(self.delete_rum_app(&params).await))
    }

    // -- Tools: RUM-based metrics --

    #[tool(
        name = "datadog_rum_metrics_list",
        description = "List all RUM-based metrics.",
        annotations(
            title = "List RUM Metrics",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn rum_metrics_list(
        &self,
        Parameters(params): Parameters<RumMetricsListParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!("Listing RUM metrics");
        Ok(tool_reply(self.list_rum_metrics(&params).await))
    }

    #[tool(
        name = "datadog_rum_metrics_get",
        description = "Get details for a specific RUM metric.",
        annotations(
            title = "Get RUM Metric",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn rum_metrics_get(
        &self,
        Parameters(params): Parameters<RumMetricGetParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!(metric_id = %params.metric_id, "Retrieving RUM metric");
        Ok(tool_reply(self.get_rum_metric(&params).await))
    }

    #[tool(
        name = "datadog_rum_metrics_create",
        description = "Create a new RUM-based metric.",
        annotations(
            title = "Create RUM Metric",
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = false,
            open_world_hint = true
        )
    )]
    pub async fn rum_metrics_create(
        &self,
        Parameters(params): Parameters<RumMetricCreateParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!(name = %params.name, "Creating RUM metric");
        Ok(tool_reply(self.create_rum_metric(&params).await))
    }

    #[tool(
        name = "datadog_rum_metrics_update",
        description = "Update an existing RUM metric.",
        annotations(
            title = "Update RUM Metric",
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn rum_metrics_update(
        &self,
        Parameters(params): Parameters<RumMetricUpdateParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!(metric_id = %params.metric_id, "Updating RUM metric");
        Ok(tool_reply(self.update_rum_metric(&params).await))
    }

    #[tool(
        name = "datadog_rum_metrics_delete",
        description = "Delete a RUM metric.",
        annotations(
            title = "Delete RUM Metric",
            read_only_hint = false,
            destructive_hint = true,
            idempotent_hint = false,
            open_world_hint = true
        )
    )]
    pub async fn rum_metrics_delete(
        &self,
        Parameters(params): Parameters<RumMetricDeleteParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!(metric_id = %params.metric_id, "Deleting RUM metric");
        Ok(tool_reply(self.delete_rum_metric(&params).await))
    }

    // -- Tools: retention filters --

    #[tool(
        name = "datadog_rum_retention_filters_list",
        description = "List retention filters for a RUM application.",
        annotations(
            title = "List RUM Retention Filters",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn rum_retention_filters_list(
        &self,
        Parameters(params): Parameters<RumRetentionFiltersListParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!(app_id = %params.app_id, "Listing RUM retention filters");
        Ok(tool_reply(self.list_rum_retention_filters(&params).await))
    }

    #[tool(
        name = "datadog_rum_retention_filters_get",
        description = "Get a specific retention filter for a RUM application.",
        annotations(
            title = "Get RUM Retention Filter",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn rum_retention_filters_get(
        &self,
        Parameters(params): Parameters<RumRetentionFilterGetParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!(filter_id = %params.filter_id, "Retrieving RUM retention filter");
        Ok(tool_reply(self.get_rum_retention_filter(&params).await))
    }

    #[tool(
        name = "datadog_rum_retention_filters_create",
        description = "Create a retention filter for a RUM application.",
        annotations(
            title = "Create RUM Retention Filter",
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = false,
            open_world_hint = true
        )
    )]
    pub async fn rum_retention_filters_create(
        &self,
        Parameters(params): Parameters<RumRetentionFilterCreateParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!(app_id = %params.app_id, name = %params.name, "Creating RUM retention filter");
        Ok(tool_reply(self.create_rum_retention_filter(&params).await))
    }

    #[tool(
        name = "datadog_rum_retention_filters_update",
        description = "Update a retention filter for a RUM application.",
        annotations(
            title = "Update RUM Retention Filter",
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn rum_retention_filters_update(
        &self,
        Parameters(params): Parameters<RumRetentionFilterUpdateParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!(filter_id = %params.filter_id, "Updating RUM retention filter");
        Ok(tool_reply(self.update_rum_retention_filter(&params).await))
    }

    #[tool(
        name = "datadog_rum_retention_filters_delete",
        description = "Delete a retention filter from a RUM application.",
        annotations(
            title = "Delete RUM Retention Filter",
            read_only_hint = false,
            destructive_hint = true,
            idempotent_hint = false,
            open_world_hint = true
        )
    )]
    pub async fn rum_retention_filters_delete(
        &self,
        Parameters(params): Parameters<RumRetentionFilterDeleteParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!(filter_id = %params.filter_id, "Deleting RUM retention filter");
        Ok(tool_reply(self.delete_rum_retention_filter(&params).await))
    }

    // -- Tools: sessions, playlists, heatmaps --

    #[tool(
        name = "datadog_rum_sessions_list",
        description = "List recent RUM sessions/events within a time range.",
        annotations(
            title = "List RUM Sessions",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn rum_sessions_list(
        &self,
        Parameters(params): Parameters<RumSessionsListParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!(limit = params.limit, "Listing RUM sessions");
        Ok(tool_reply(self.list_rum_sessions(&params).await))
    }

    #[tool(
        name = "datadog_rum_sessions_search",
        description = "Search RUM sessions/events using query syntax.",
        annotations(
            title = "Search RUM Sessions",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn rum_sessions_search(
        &self,
        Parameters(params): Parameters<RumSessionsSearchParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!(query = %params.query, "Searching RUM sessions");
        Ok(tool_reply(self.search_rum_sessions(&params).await))
    }

    #[tool(
        name = "datadog_rum_playlists_list",
        description = "List session replay playlists.",
        annotations(
            title = "List RUM Playlists",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn rum_playlists_list(
        &self,
        Parameters(params): Parameters<RumPlaylistsListParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!("Listing RUM playlists");
        Ok(tool_reply(self.list_rum_playlists(&params).await))
    }

    #[tool(
        name = "datadog_rum_playlists_get",
        description = "Get a specific session replay playlist.",
        annotations(
            title = "Get RUM Playlist",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn rum_playlists_get(
        &self,
        Parameters(params): Parameters<RumPlaylistGetParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!(playlist_id = %params.playlist_id, "Retrieving RUM playlist");
        Ok(tool_reply(self.get_rum_playlist(&params).await))
    }

    #[tool(
        name = "datadog_rum_heatmaps_query",
        description = "Query heatmap data for a specific view/page.",
        annotations(
            title = "Query RUM Heatmap",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn rum_heatmaps_query(
        &self,
        Parameters(params): Parameters<RumHeatmapQueryParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!(view = %params.view, "Querying RUM heatmap");
        Ok(tool_reply(self.query_rum_heatmap(&params).await))
    }
}

// -- Implementations --------------------------------------------------------

impl DatadogToolsServer {
    pub(crate) fn rum_tools() -> ToolRouter<Self> {
        Self::rum_router()
    }

    async fn list_rum_apps(&self, params: &RumAppsListParams) -> Result<String, DatadogError> {
        let data = self.client().get(ApiVersion::V2, "rum/applications", None).await?;
        Ok(format_output(
            &data.unwrap_or(Value::Null),
            params.response_format,
            Some(apps_md),
        ))
    }

    async fn get_rum_app(&self, params: &RumAppGetParams) -> Result<String, DatadogError> {
        check_not_empty("app_id", &params.app_id)?;
        let path = format!("rum/applications/{}", params.app_id);
        let data = self.client().get(ApiVersion::V2, &path, None).await?;
        Ok(format_output(&data.unwrap_or(Value::Null), params.response_format, None))
    }

    async fn create_rum_app(&self, params: &RumAppCreateParams) -> Result<String, DatadogError> {
        check_not_empty("name", &params.name)?;
        check_not_empty("type", &params.app_type)?;
        let body = json!({
            "data": {
                "attributes": { "name": params.name, "type": params.app_type },
                "type": "rum_application_create",
            }
        });
        let data = self.client().post(ApiVersion::V2, "rum/applications", &body).await?;
        let app_id = data
            .as_ref()
            .and_then(|d| d.get("data"))
            .and_then(|d| d.get("id"))
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        Ok(format!(
            "RUM application '{}' created successfully (id={}).",
            params.name, app_id
        ))
    }

    async fn update_rum_app(&self, params: &RumAppUpdateParams) -> Result<String, DatadogError> {
        check_not_empty("app_id", &params.app_id)?;
        let mut attrs = Map::new();
        if let Some(name) = &params.name {
            attrs.insert("name".into(), json!(name));
        }
        if let Some(app_type) = &params.app_type {
            attrs.insert("type".into(), json!(app_type));
        }
        let body = json!({
            "data": {
                "attributes": attrs,
                "id": params.app_id,
                "type": "rum_application_update",
            }
        });
        let path = format!("rum/applications/{}", params.app_id);
        let data = self.client().patch(ApiVersion::V2, &path, &body).await?;
        Ok(format_output(&data.unwrap_or(Value::Null), ResponseFormat::Json, None))
    }

    async fn delete_rum_app(&self, params: &RumAppDeleteParams) -> Result<String, DatadogError> {
        check_not_empty("app_id", &params.app_id)?;
        let path = format!("rum/applications/{}", params.app_id);
        self.client().delete(ApiVersion::V2, &path).await?;
        Ok(format!("RUM application {} deleted successfully.", params.app_id))
    }

    async fn list_rum_metrics(&self, params: &RumMetricsListParams) -> Result<String, DatadogError> {
        let data = self.client().get(ApiVersion::V2, "rum/metrics", None).await?;
        Ok(format_output(
            &data.unwrap_or(Value::Null),
            params.response_format,
            Some(rum_metrics_md),
        ))
    }

    async fn get_rum_metric(&self, params: &RumMetricGetParams) -> Result<String, DatadogError> {
        check_not_empty("metric_id", &params.metric_id)?;
        let path = format!("rum/metrics/{}", params.metric_id);
        let data = self.client().get(ApiVersion::V2, &path, None).await?;
        Ok(format_output(&data.unwrap_or(Value::Null), params.response_format, None))
    }

    async fn create_rum_metric(&self, params: &RumMetricCreateParams) -> Result<String, DatadogError> {
        check_not_empty("name", &params.name)?;
        check_not_empty("event_type", &params.event_type)?;
        let mut attrs = Map::new();
        attrs.insert("event_type".into(), json!(params.event_type));
        attrs.insert(
            "compute".into(),
            json!({ "aggregation_type": params.compute_type }),
        );
        if let Some(filter) = &params.filter_query {
            attrs.insert("filter".into(), json!({ "query": filter }));
        }
        if let Some(group_by) = &params.group_by {
            let paths: Vec<Value> = group_by.iter().map(|p| json!({ "path": p })).collect();
            attrs.insert("group_by".into(), json!(paths));
        }
        let body = json!({
            "data": { "attributes": attrs, "id": params.name, "type": "rum_metrics" }
        });
        self.client().post(ApiVersion::V2, "rum/metrics", &body).await?;
        Ok(format!("RUM metric '{}' created successfully.", params.name))
    }

    async fn update_rum_metric(&self, params: &RumMetricUpdateParams) -> Result<String, DatadogError> {
        check_not_empty("metric_id", &params.metric_id)?;
        let mut attrs = Map::new();
        if let Some(compute_type) = &params.compute_type {
            attrs.insert("compute".into(), json!({ "aggregation_type": compute_type }));
        }
        if let Some(filter) = &params.filter_query {
            attrs.insert("filter".into(), json!({ "query": filter }));
        }
        if let Some(group_by) = &params.group_by {
            let paths: Vec<Value> = group_by.iter().map(|p| json!({ "path": p })).collect();
            attrs.insert("group_by".into(), json!(paths));
        }
        let body = json!({
            "data": { "attributes": attrs, "id": params.metric_id, "type": "rum_metrics" }
        });
        let path = format!("rum/metrics/{}", params.metric_id);
        self.client().patch(ApiVersion::V2, &path, &body).await?;
        Ok(format!("RUM metric '{}' updated successfully.", params.metric_id))
    }

    async fn delete_rum_metric(&self, params: &RumMetricDeleteParams) -> Result<String, DatadogError> {
        check_not_empty("metric_id", &params.metric_id)?;
        let path = format!("rum/metrics/{}", params.metric_id);
        self.client().delete(ApiVersion::V2, &path).await?;
        Ok(format!("RUM metric '{}' deleted successfully.", params.metric_id))
    }

    async fn list_rum_retention_filters(
        &self,
        params: &RumRetentionFiltersListParams,
    ) -> Result<String, DatadogError> {
        check_not_empty("app_id", &params.app_id)?;
        let path = format!("rum/applications/{}/retention_filters", params.app_id);
        let data = self.client().get(ApiVersion::V2, &path, None).await?;
        Ok(format_output(&data.unwrap_or(Value::Null), params.response_format, None))
    }

    async fn get_rum_retention_filter(
        &self,
        params: &RumRetentionFilterGetParams,
    ) -> Result<String, DatadogError> {
        check_not_empty("app_id", &params.app_id)?;
        check_not_empty("filter_id", &params.filter_id)?;
        let path = format!(
            "rum/applications/{}/retention_filters/{}",
            params.app_id, params.filter_id
        );
        let data = self.client().get(ApiVersion::V2, &path, None).await?;
        Ok(format_output(&data.unwrap_or(Value::Null), params.response_format, None))
    }

    async fn create_rum_retention_filter(
        &self,
        params: &RumRetentionFilterCreateParams,
    ) -> Result<String, DatadogError> {
        check_not_empty("app_id", &params.app_id)?;
        check_not_empty("name", &params.name)?;
        check_range("rate", params.rate, 0, 100)?;
        let body = json!({
            "data": {
                "attributes": {
                    "name": params.name,
                    "event_type": params.filter_type,
                    "query": params.query,
                    "sample_rate": params.rate,
                    "enabled": params.enabled,
                },
                "type": "retention_filters",
            }
        });
        let path = format!("rum/applications/{}/retention_filters", params.app_id);
        self.client().post(ApiVersion::V2, &path, &body).await?;
        Ok(format!("Retention filter '{}' created successfully.", params.name))
    }

    async fn update_rum_retention_filter(
        &self,
        params: &RumRetentionFilterUpdateParams,
    ) -> Result<String, DatadogError> {
        check_not_empty("app_id", &params.app_id)?;
        check_not_empty("filter_id", &params.filter_id)?;
        if let Some(rate) = params.rate {
            check_range("rate", rate, 0, 100)?;
        }
        let mut attrs = Map::new();
        if let Some(name) = &params.name {
            attrs.insert("name".into(), json!(name));
        }
        if let Some(query) = &params.query {
            attrs.insert("query".into(), json!(query));
        }
        if let Some(rate) = params.rate {
            attrs.insert("sample_rate".into(), json!(rate));
        }
        if let Some(enabled) = params.enabled {
            attrs.insert("enabled".into(), json!(enabled));
        }
        let body = json!({
            "data": { "attributes": attrs, "id": params.filter_id, "type": "retention_filters" }
        });
        let path = format!(
            "rum/applications/{}/retention_filters/{}",
            params.app_id, params.filter_id
        );
        self.client().patch(ApiVersion::V2, &path, &body).await?;
        Ok(format!(
            "Retention filter '{}' updated successfully.",
            params.filter_id
        ))
    }

    async fn delete_rum_retention_filter(
        &self,
        params: &RumRetentionFilterDeleteParams,
    ) -> Result<String, DatadogError> {
        check_not_empty("app_id", &params.app_id)?;
        check_not_empty("filter_id", &params.filter_id)?;
        let path = format!(
            "rum/applications/{}/retention_filters/{}",
            params.app_id, params.filter_id
        );
        self.client().delete(ApiVersion::V2, &path).await?;
        Ok(format!(
            "Retention filter '{}' deleted successfully.",
            params.filter_id
        ))
    }

    async fn list_rum_sessions(&self, params: &RumSessionsListParams) -> Result<String, DatadogError> {
        check_range("limit", params.limit, 1, 1000)?;
        let body = sessions_body(&params.from_time, params.to_time.as_deref(), params.limit, None)?;
        let data = self.client().post(ApiVersion::V2, "rum/events/search", &body).await?;
        Ok(format_output(
            &data.unwrap_or(Value::Null),
            params.response_format,
            Some(sessions_md),
        ))
    }

    async fn search_rum_sessions(
        &self,
        params: &RumSessionsSearchParams,
    ) -> Result<String, DatadogError> {
        check_not_empty("query", &params.query)?;
        check_range("limit", params.limit, 1, 1000)?;
        let body = sessions_body(
            &params.from_time,
            params.to_time.as_deref(),
            params.limit,
            Some(&params.query),
        )?;
        let data = self.client().post(ApiVersion::V2, "rum/events/search", &body).await?;
        Ok(format_output(
            &data.unwrap_or(Value::Null),
            params.response_format,
            Some(sessions_md),
        ))
    }

    async fn list_rum_playlists(&self, params: &RumPlaylistsListParams) -> Result<String, DatadogError> {
        let data = self.client().get(ApiVersion::V2, "rum/playlists", None).await?;
        Ok(format_output(&data.unwrap_or(Value::Null), params.response_format, None))
    }

    async fn get_rum_playlist(&self, params: &RumPlaylistGetParams) -> Result<String, DatadogError> {
        check_not_empty("playlist_id", &params.playlist_id)?;
        let path = format!("rum/playlists/{}", params.playlist_id);
        let data = self.client().get(ApiVersion::V2, &path, None).await?;
        Ok(format_output(&data.unwrap_or(Value::Null), params.response_format, None))
    }

    async fn query_rum_heatmap(&self, params: &RumHeatmapQueryParams) -> Result<String, DatadogError> {
        check_not_empty("view", &params.view)?;
        let from_ts = parse_time(&params.from_time)?;
        let to_ts = match &params.to_time {
            Some(t) => parse_time(t)?,
            None => now_unix(),
        };
        let query = vec![
            ("view", params.view.clone()),
            ("from", from_ts.to_string()),
            ("to", to_ts.to_string()),
        ];
        let data = self
            .client()
            .get(ApiVersion::V2, "rum/analytics/heatmap", Some(&query))
            .await?;
        Ok(format_output(&data.unwrap_or(Value::Null), params.response_format, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apps_renderer_handles_empty() {
        assert_eq!(apps_md(&json!({"data": []})), "No RUM applications found.");
    }

    #[test]
    fn apps_renderer_reads_attributes() {
        let data = json!({"data": [
            {"id": "app-1", "attributes": {"name": "storefront", "type": "browser",
                                           "created_at": "2024-01-01"}}
        ]});
        let md = apps_md(&data);
        assert!(md.contains("## storefront (app-1)"));
        assert!(md.contains("- **Type**: browser"));
    }

    #[test]
    fn metrics_renderer_prefers_path_over_id() {
        let data = json!({"data": [
            {"id": "m-1", "attributes": {"path": "rum.views.count", "event_type": "views",
                                         "compute": {"aggregation_type": "count"}}},
            {"id": "m-2", "attributes": {"event_type": "errors"}}
        ]});
        let md = rum_metrics_md(&data);
        assert!(md.contains("## rum.views.count"));
        assert!(md.contains("## m-2"));
        assert!(md.contains("- **Compute**: count"));
        assert!(md.contains("- **Compute**: ?"));
    }

    #[test]
    fn sessions_renderer_formats_entries() {
        let data = json!({"data": [
            {"attributes": {"timestamp": "2024-01-15T10:30:00Z", "service": "web",
                            "type": "session", "session": {"id": "s-1"}}}
        ]});
        let md = sessions_md(&data);
        assert!(md.contains("**[2024-01-15T10:30:00Z]** web"));
        assert!(md.contains("  Session: s-1 | Type: session"));
    }

    #[test]
    fn sessions_body_omits_query_when_absent() {
        let body = sessions_body("1700000000", Some("1700003600"), 50, None).unwrap();
        assert_eq!(body["filter"]["from"], "1700000000000");
        assert_eq!(body["filter"]["to"], "1700003600000");
        assert!(body["filter"].get("query").is_none());
        assert_eq!(body["page"]["limit"], 50);
    }

    #[test]
    fn sessions_body_includes_query_when_present() {
        let body = sessions_body("1700000000", Some("1700003600"), 10, Some("@type:view")).unwrap();
        assert_eq!(body["filter"]["query"], "@type:view");
    }
}
