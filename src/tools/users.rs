//! Datadog user and role tools.

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
use crate::format::{field_str, format_output, ResponseFormat};
use crate::server::DatadogToolsServer;

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct UserGetParams {
    #[schemars(description = "User ID or handle")]
    pub user_id: String,
    #[schemars(description = "Output format: 'json' or 'markdown'")]
    #[serde(default)]
    pub response_format: ResponseFormat,
}

fn users_md(data: &Value) -> String {
    let empty = Vec::new();
    let users = data.get("users").and_then(Value::as_array).unwrap_or(&empty);
    if users.is_empty() {
        return "No users found.".to_string();
    }
    let mut lines = vec![format!("# Users ({})", users.len()), String::new()];
    for u in users {
        lines.push(format!(
            "## {} ({})",
            field_str(u, "name", "?"),
            field_str(u, "handle", "?")
        ));
        lines.push(format!("- **Email**: {}", field_str(u, "email", "?")));
        lines.push(format!("- **Role**: {}", field_str(u, "role", "?")));
        lines.push(format!(
            "- **Disabled**: {}",
            u.get("disabled").and_then(Value::as_bool).unwrap_or(false)
        ));
        lines.push(String::new());
    }
    lines.join("\n")
}

#[tool_router(router = users_router)]
impl DatadogToolsServer {
    #[tool(
        name = "datadog_users_list",
        description = "List users in the Datadog organization.",
        annotations(
            title = "List Users",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn users_list(
        &self,
        Parameters(params): Parameters<PaginatedParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!("Listing Datadog users");
        Ok(tool_reply(self.list_users(&params).await))
    }

    #[tool(
        name = "datadog_users_get",
        description = "Get details for a specific Datadog user.",
        annotations(
            title = "Get User",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn users_get(&self, Parameters(params): Parameters<UserGetParams>) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!(user_id = %params.user_id, "Retrieving Datadog user");
        Ok(tool_reply(self.get_user(&params).await))
    }

    #[tool(
        name = "datadog_roles_list",
        description = "List available roles in the Datadog organization.",
        annotations(
            title = "List Roles",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn roles_list(&self) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!("Listing Datadog roles");
        Ok(tool_reply(self.list_roles().await))
    }
}

impl DatadogToolsServer {
    pub(crate) fn users_tools() -> ToolRouter<Self> {
        Self::users_router()
    }

    async fn list_users(&self, params: &PaginatedParams) -> Result<String, DatadogError> {
        check_range("limit", params.limit, 1, MAX_LIMIT)?;
        let data = self.client().get(ApiVersion::V1, "user", None).await?;
        Ok(format_output(
            &data.unwrap_or(Value::Null),
            params.response_format,
            Some(users_md),
        ))
    }

    async fn get_user(&self, params: &UserGetParams) -> Result<String, DatadogError> {
        check_not_empty("user_id", &params.user_id)?;
        let path = format!("user/{}", params.user_id);
        let data = self.client().get(ApiVersion::V1, &path, None).await?;
        Ok(format_output(&data.unwrap_or(Value::Null), params.response_format, None))
    }

    async fn list_roles(&self) -> Result<String, DatadogError> {
        let data = self.client().get(ApiVersion::V2, "roles", None).await?;
        Ok(format_output(&data.unwrap_or(Value::Null), ResponseFormat::Json, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renderer_handles_empty() {
        assert_eq!(users_md(&json!({"users": []})), "No users found.");
    }

    #[test]
    fn renderer_formats_users() {
        let data = json!({"users": [
            {"name": "Ada", "handle": "ada@example.com", "email": "ada@example.com",
             "role": "Admin", "disabled": false}
        ]});
        let md = users_md(&data);
        assert!(md.contains("## Ada (ada@example.com)"));
        assert!(md.contains("- **Disabled**: false"));
    }
}
