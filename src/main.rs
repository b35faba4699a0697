//
// Purpose:
//
// This application implements an MCP (Model Context Protocol) server that
// acts as a bridge to the Datadog API. It exposes Datadog resources
// (monitors, dashboards, metrics, logs, events, incidents, SLOs, synthetic
// tests, downtimes, host tags, users, RUM) as tools that can be invoked by
// MCP clients.
//
// Workflow:
// 1. The server starts and listens for MCP requests on stdio.
// 2. An MCP client sends a `call_tool` request.
// 3. `DatadogToolsServer` dispatches to the tool method by name.
// 4. The tool validates its parameters, performs one authenticated HTTPS
//    request against the Datadog API, and formats the response as JSON or
//    Markdown.
// 5. Success and failure are both returned as a string in the tool result;
//    failures carry a classified, actionable message.
//
// Configuration:
// DD_API_KEY, DD_APP_KEY, and optionally DD_SITE (default datadoghq.com),
// from the environment or a .env file. Logging goes to stderr and is
// controlled by RUST_LOG.

use clap::Parser;
use dotenv::dotenv;
use rmcp::{transport::stdio, ServiceExt};

use mcp_server_datadog::DatadogToolsServer;

#[derive(Parser, Debug)]
#[command(name = "mcp-server-datadog")]
#[command(about = "Datadog MCP Server")]
struct Args {
    // Currently only stdio transport is supported
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let _args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting Datadog MCP server...");

    let server = DatadogToolsServer::new();

    tracing::info!("Using stdio transport");
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("serving error: {:?}", e);
    })?;

    service.waiting().await?;
    Ok(())
}
