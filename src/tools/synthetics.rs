//! Datadog synthetic monitoring tools.

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use rmcp::{tool, tool_router};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{check_not_empty, check_range, tool_reply, PaginatedParams, MAX_LIMIT};
use crate::datadog::client::ApiVersion;
use crate::datadog::error::DatadogError;
use crate::format::{field_display, field_str, format_output, ResponseFormat};
use crate::server::DatadogToolsServer;

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SyntheticsTestGetParams {
    #[schemars(description = "Synthetic test public ID")]
    pub test_id: String,
    #[schemars(description = "Output format: 'json' or 'markdown'")]
    #[serde(default)]
    pub response_format: ResponseFormat,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SyntheticsSearchParams {
    #[schemars(description = "Search text")]
    pub text: Option<String>,
    #[schemars(description = "Number of results (1-100, default 50)")]
    #[serde(default = "default_count")]
    pub count: u32,
    #[schemars(description = "Pagination offset")]
    #[serde(default)]
    pub start: u32,
    #[schemars(description = "Output format: 'json' or 'markdown'")]
    #[serde(default)]
    pub response_format: ResponseFormat,
}

fn default_count() -> u32 {
    50
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SyntheticsCreateApiTestParams {
    #[schemars(description = "Test name")]
    pub name: String,
    #[schemars(description = "API test subtype: http, ssl, dns, websocket, tcp, udp, icmp, or grpc")]
    #[serde(default = "default_subtype")]
    pub subtype: String,
    #[schemars(
        description = "Test config with 'assertions' list and 'request' object. Assertions have operator, target, and type. Request has method, url, headers, body, etc."
    )]
    pub config: Value,
    #[schemars(description = "Locations to run from, e.g. ['aws:us-east-1']")]
    pub locations: Vec<String>,
    #[schemars(description = "Test options: tick_every, retry, follow_redirects, http_version, etc.")]
    pub options: Option<Value>,
    #[schemars(description = "Notification message")]
    pub message: Option<String>,
    #[schemars(description = "Tags list")]
    pub tags: Option<Vec<String>>,
    #[schemars(description = "Test status: 'live' or 'paused'")]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SyntheticsUpdateApiTestParams {
    #[schemars(description = "Synthetic test public ID to update")]
    pub test_id: String,
    #[schemars(description = "Test name")]
    pub name: String,
    #[schemars(description = "API test subtype: http, ssl, dns, websocket, tcp, udp, icmp, or grpc")]
    #[serde(default = "default_subtype")]
    pub subtype: String,
    #[schemars(
        description = "Test config with 'assertions' list and 'request' object. Assertions have operator, target, and type. Request has method, url, headers, body, etc."
    )]
    pub config: Value,
    #[schemars(description = "Locations to run from, e.g. ['aws:us-east-1']")]
    pub locations: Vec<String>,
    #[schemars(description = "Test options: tick_every, retry, follow_redirects, http_version, etc.")]
    pub options: Option<Value>,
    #[schemars(description = "Notification message")]
    pub message: Option<String>,
    #[schemars(description = "Tags list")]
    pub tags: Option<Vec<String>>,
    #[schemars(description = "Test status: 'live' or 'paused'")]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SyntheticsDeleteTestsParams {
    #[schemars(description = "List of synthetic test public IDs to delete")]
    pub public_ids: Vec<String>,
}

fn default_subtype() -> String {
    "http".to_string()
}

fn tests_md(data: &Value) -> String {
    let empty = Vec::new();
    let tests = data.get("tests").and_then(Value::as_array).unwrap_or(&empty);
    if tests.is_empty() {
        return "No synthetic tests found.".to_string();
    }
    let mut lines = vec![format!("# Synthetic Tests ({})", tests.len()), String::new()];
    for t in tests {
        lines.push(format!(
            "## {} ({})",
            field_str(t, "name", "?"),
            field_display(t, "public_id")
        ));
        lines.push(format!("- **Type**: {}", field_display(t, "type")));
        lines.push(format!("- **Status**: {}", field_display(t, "status")));
        lines.push(String::new());
    }
    lines.join("\n")
}

/// JSON body shared by the create and update API-test operations. Optional
/// fields are added only when present.
fn api_test_body(
    name: &str,
    subtype: &str,
    config: &Value,
    locations: &[String],
    options: Option<&Value>,
    message: Option<&String>,
    tags: Option<&Vec<String>>,
    status: Option<&String>,
) -> Value {
    let mut body = Map::new();
    body.insert("name".into(), json!(name));
    body.insert("type".into(), json!("api"));
    body.insert("subtype".into(), json!(subtype));
    body.insert("config".into(), config.clone());
    body.insert("locations".into(), json!(locations));
    if let Some(options) = options {
        body.insert("options".into(), options.clone());
    }
    if let Some(message) = message {
        body.insert("message".into(), json!(message));
    }
    if let Some(tags) = tags {
        body.insert("tags".into(), json!(tags));
    }
    if let Some(status) = status {
        body.insert("status".into(), json!(status));
    }
    Value::Object(body)
}

#[tool_router(router = synthetics_router)]
impl DatadogToolsServer {
    #[tool(
        name = "datadog_synthetics_tests_list",
        description = "List all Datadog synthetic monitoring tests.",
        annotations(
            title = "List Synthetic Tests",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn synthetics_tests_list(
        &self,
        Parameters(params): Parameters<PaginatedParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!("Listing Datadog synthetic tests");
        Ok(tool_reply(self.list_synthetic_tests(&params).await))
    }

    #[tool(
        name = "datadog_synthetics_tests_get",
        description = "Get configuration for a specific synthetic test.",
        annotations(
            title = "Get Synthetic Test",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn synthetics_tests_get(
        &self,
        Parameters(params): Parameters<SyntheticsTestGetParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!(test_id = %params.test_id, "Retrieving Datadog synthetic test");
        Ok(tool_reply(self.get_synthetic_test(&params).await))
    }

    #[tool(
        name = "datadog_synthetics_tests_search",
        description = "Search synthetic tests with an optional text filter.",
        annotations(
            title = "Search Synthetic Tests",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn synthetics_tests_search(
        &self,
        Parameters(params): Parameters<SyntheticsSearchParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!("Searching Datadog synthetic tests");
        Ok(tool_reply(self.search_synthetic_tests(&params).await))
    }

    #[tool(
        name = "datadog_synthetics_locations_list",
        description = "List available synthetic monitoring locations.",
        annotations(
            title = "List Synthetic Locations",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn synthetics_locations_list(&self) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!("Listing Datadog synthetic locations");
        Ok(tool_reply(self.list_synthetic_locations().await))
    }

    #[tool(
        name = "datadog_synthetics_tests_create_api",
        description = "Create a new Datadog Synthetics API test.",
        annotations(
            title = "Create Synthetic API Test",
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = false,
            open_world_hint = true
        )
    )]
    pub async fn synthetics_tests_create_api(
        &self,
        Parameters(params): Parameters<SyntheticsCreateApiTestParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!(name = %params.name, "Creating Datadog synthetic API test");
        Ok(tool_reply(self.create_synthetic_api_test(&params).await))
    }

    #[tool(
        name = "datadog_synthetics_tests_update_api",
        description = "Update an existing Datadog Synthetics API test.",
        annotations(
            title = "Update Synthetic API Test",
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn synthetics_tests_update_api(
        &self,
        Parameters(params): Parameters<SyntheticsUpdateApiTestParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!(test_id = %params.test_id, "Updating Datadog synthetic API test");
        Ok(tool_reply(self.update_synthetic_api_test(&params).await))
    }

    #[tool(
        name = "datadog_synthetics_tests_delete",
        description = "Delete one or more Datadog Synthetics tests by public ID.",
        annotations(
            title = "Delete Synthetic Tests",
            read_only_hint = false,
            destructive_hint = true,
            idempotent_hint = false,
            open_world_hint = true
        )
    )]
    pub async fn synthetics_tests_delete(
        &self,
        Parameters(params): Parameters<SyntheticsDeleteTestsParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!(count = params.public_ids.len(), "Deleting Datadog synthetic tests");
        Ok(tool_reply(self.delete_synthetic_tests(&params).await))
    }
}

impl DatadogToolsServer {
    pub(crate) fn synthetics_tools() -> ToolRouter<Self> {
        Self::synthetics_router()
    }

    async fn list_synthetic_tests(&self, params: &PaginatedParams) -> Result<String, DatadogError> {
        check_range("limit", params.limit, 1, MAX_LIMIT)?;
        let data = self.client().get(ApiVersion::V1, "synthetics/tests", None).await?;
        Ok(format_output(
            &data.unwrap_or(Value::Null),
            params.response_format,
            Some(tests_md),
        ))
    }

    async fn get_synthetic_test(
        &self,
        params: &SyntheticsTestGetParams,
    ) -> Result<String, DatadogError> {
        check_not_empty("test_id", &params.test_id)?;
        let path = format!("synthetics/tests/{}", params.test_id);
        let data = self.client().get(ApiVersion::V1, &path, None).await?;
        Ok(format_output(&data.unwrap_or(Value::Null), params.response_format, None))
    }

    async fn search_synthetic_tests(
        &self,
        params: &SyntheticsSearchParams,
    ) -> Result<String, DatadogError> {
        check_range("count", params.count, 1, MAX_LIMIT)?;
        let mut query = vec![
            ("count", params.count.to_string()),
            ("start", params.start.to_string()),
        ];
        if let Some(text) = &params.text {
            query.push(("text", text.clone()));
        }
        let data = self
            .client()
            .get(ApiVersion::V1, "synthetics/tests/search", Some(&query))
            .await?;
        Ok(format_output(&data.unwrap_or(Value::Null), params.response_format, None))
    }

    async fn list_synthetic_locations(&self) -> Result<String, DatadogError> {
        let data = self.client().get(ApiVersion::V1, "synthetics/locations", None).await?;
        Ok(format_output(&data.unwrap_or(Value::Null), ResponseFormat::Json, None))
    }

    async fn create_synthetic_api_test(
        &self,
        params: &SyntheticsCreateApiTestParams,
    ) -> Result<String, DatadogError> {
        check_not_empty("name", &params.name)?;
        if params.locations.is_empty() {
            return Err(DatadogError::Validation(
                "locations must contain at least one entry".to_string(),
            ));
        }
        let body = api_test_body(
            &params.name,
            &params.subtype,
            &params.config,
            &params.locations,
            params.options.as_ref(),
            params.message.as_ref(),
            params.tags.as_ref(),
            params.status.as_ref(),
        );
        let data = self
            .client()
            .post(ApiVersion::V1, "synthetics/tests/api", &body)
            .await?;
        let public_id = data
            .as_ref()
            .and_then(|d| d.get("public_id"))
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        Ok(format!(
            "Synthetic API test '{}' created successfully (id={}).",
            params.name, public_id
        ))
    }

    async fn update_synthetic_api_test(
        &self,
        params: &SyntheticsUpdateApiTestParams,
    ) -> Result<String, DatadogError> {
        check_not_empty("test_id", &params.test_id)?;
        check_not_empty("name", &params.name)?;
        if params.locations.is_empty() {
            return Err(DatadogError::Validation(
                "locations must contain at least one entry".to_string(),
            ));
        }
        let body = api_test_body(
            &params.name,
            &params.subtype,
            &params.config,
            &params.locations,
            params.options.as_ref(),
            params.message.as_ref(),
            params.tags.as_ref(),
            params.status.as_ref(),
        );
        let path = format!("synthetics/tests/api/{}", params.test_id);
        self.client().put(ApiVersion::V1, &path, &body).await?;
        Ok(format!(
            "Synthetic API test {} updated successfully.",
            params.test_id
        ))
    }

    async fn delete_synthetic_tests(
        &self,
        params: &SyntheticsDeleteTestsParams,
    ) -> Result<String, DatadogError> {
        if params.public_ids.is_empty() {
            return Err(DatadogError::Validation(
                "public_ids must contain at least one entry".to_string(),
            ));
        }
        let body = json!({ "public_ids": params.public_ids });
        self.client()
            .post(ApiVersion::V1, "synthetics/tests/delete", &body)
            .await?;
        let count = params.public_ids.len();
        let label = if count == 1 { "test" } else { "tests" };
        Ok(format!("{} synthetic {} deleted successfully.", count, label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renderer_handles_empty() {
        assert_eq!(tests_md(&json!({"tests": []})), "No synthetic tests found.");
    }

    #[test]
    fn api_test_body_omits_absent_optionals() {
        let body = api_test_body("t", "http", &json!({"assertions": []}), &["aws:us-east-1".into()], None, None, None, None);
        assert_eq!(body["type"], "api");
        assert!(body.get("options").is_none());
        assert!(body.get("message").is_none());
        assert!(body.get("tags").is_none());
        assert!(body.get("status").is_none());
    }

    #[test]
    fn api_test_body_includes_present_optionals() {
        let tags = vec!["team:sre".to_string()];
        let message = "notify".to_string();
        let body = api_test_body(
            "t",
            "ssl",
            &json!({}),
            &["aws:eu-west-1".into()],
            Some(&json!({"tick_every": 60})),
            Some(&message),
            Some(&tags),
            None,
        );
        assert_eq!(body["subtype"], "ssl");
        assert_eq!(body["options"]["tick_every"], 60);
        assert_eq!(body["tags"][0], "team:sre");
        assert!(body.get("status").is_none());
    }
}
