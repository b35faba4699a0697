//! MCP ServerHandler implementation for the Datadog tool catalog.

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo};
use rmcp::{tool_handler, ServerHandler};

use crate::datadog::client::DatadogClient;

/// The core server: holds the combined tool router and the shared Datadog
/// API client. Tool methods live in `crate::tools`, one module per
/// resource category.
#[derive(Clone)]
pub struct DatadogToolsServer {
    tool_router: ToolRouter<Self>,
    client: Arc<DatadogClient>,
}

impl DatadogToolsServer {
    /// Server backed by the process-wide environment configuration.
    pub fn new() -> Self {
        Self::with_client(DatadogClient::new())
    }

    /// Server backed by an explicit client (tests point this at a mock API).
    pub fn with_client(client: DatadogClient) -> Self {
        Self {
            tool_router: Self::monitors_tools()
                + Self::dashboards_tools()
                + Self::metrics_tools()
                + Self::logs_tools()
                + Self::events_tools()
                + Self::incidents_tools()
                + Self::slos_tools()
                + Self::synthetics_tools()
                + Self::downtimes_tools()
                + Self::tags_tools()
                + Self::users_tools()
                + Self::rum_tools(),
            client: Arc::new(client),
        }
    }

    pub(crate) fn client(&self) -> &DatadogClient {
        &self.client
    }
}

impl Default for DatadogToolsServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for DatadogToolsServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "mcp-server-datadog".to_string(),
                title: Some("Datadog MCP Server".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                description: Some(
                    "MCP server exposing the Datadog API: monitors, dashboards, metrics, \
                     logs, events, incidents, SLOs, synthetics, downtimes, host tags, \
                     users, and RUM"
                        .to_string(),
                ),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "This server provides tools to interact with a Datadog account.\n\
                 Read tools cover monitors, dashboards, metrics, logs, events, incidents, \
                 SLOs, synthetic tests, downtimes, host tags, users/roles, and RUM \
                 (applications, metrics, retention filters, sessions, playlists, heatmaps).\n\
                 Write tools create, update, and delete monitors, dashboards, SLOs, \
                 synthetic tests, downtimes, host tags, and RUM resources; each returns a \
                 short confirmation naming the affected resource.\n\
                 Every tool returns a single string, either pretty-printed JSON or a \
                 Markdown summary (response_format: 'json' | 'markdown'), truncated at \
                 25,000 characters. Time parameters accept relative offsets (1h, 30m, 7d), \
                 Unix timestamps, or RFC 3339.\n\
                 Configure credentials via DD_API_KEY, DD_APP_KEY, and optionally DD_SITE."
                    .to_string(),
            ),
        }
    }
}
