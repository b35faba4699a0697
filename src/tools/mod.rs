//! Tool implementations, one submodule per Datadog resource category.

pub mod dashboards;
pub mod downtimes;
pub mod events;
pub mod incidents;
pub mod logs;
pub mod metrics;
pub mod monitors;
pub mod rum;
pub mod slos;
pub mod synthetics;
pub mod tags;
pub mod users;

use rmcp::model::{CallToolResult, Content};
use schemars::JsonSchema;
use serde::Deserialize;

use crate::datadog::error::{handle_error, DatadogError};
use crate::format::ResponseFormat;

pub const DEFAULT_LIMIT: u32 = 20;
pub const MAX_LIMIT: u32 = 100;

/// Base input for paginated list tools.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct PaginatedParams {
    #[schemars(description = "Maximum results to return (1-100, default 20)")]
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[schemars(description = "Number of results to skip for pagination")]
    #[serde(default)]
    pub offset: u32,
    #[schemars(description = "Output format: 'json' or 'markdown'")]
    #[serde(default)]
    pub response_format: ResponseFormat,
}

pub(crate) fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

/// Package a tool outcome as an MCP result. Errors become classified
/// message strings with the error flag set; nothing propagates further.
pub(crate) fn tool_reply(result: Result<String, DatadogError>) -> CallToolResult {
    match result {
        Ok(text) => CallToolResult::success(vec![Content::text(text)]),
        Err(e) => {
            let msg = handle_error(&e);
            tracing::error!("{}", msg);
            CallToolResult::error(vec![Content::text(msg)])
        }
    }
}

pub(crate) fn check_range(field: &str, value: u32, min: u32, max: u32) -> Result<u32, DatadogError> {
    if value < min || value > max {
        return Err(DatadogError::Validation(format!(
            "{} must be between {} and {} (got {})",
            field, min, max, value
        )));
    }
    Ok(value)
}

pub(crate) fn check_not_empty(field: &str, value: &str) -> Result<(), DatadogError> {
    if value.trim().is_empty() {
        return Err(DatadogError::Validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

pub(crate) fn check_positive(field: &str, value: i64) -> Result<(), DatadogError> {
    if value <= 0 {
        return Err(DatadogError::Validation(format!(
            "{} must be a positive integer (got {})",
            field, value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_range_accepts_bounds() {
        assert!(check_range("limit", 1, 1, 100).is_ok());
        assert!(check_range("limit", 100, 1, 100).is_ok());
    }

    #[test]
    fn check_range_rejects_and_names_field() {
        let err = check_range("per_page", 0, 1, 100).unwrap_err();
        assert!(err.to_string().contains("per_page"));
    }

    #[test]
    fn check_not_empty_rejects_whitespace() {
        assert!(check_not_empty("query", "   ").is_err());
        assert!(check_not_empty("query", "ok").is_ok());
    }

    #[test]
    fn check_positive_rejects_zero() {
        assert!(check_positive("monitor_id", 0).is_err());
        assert!(check_positive("monitor_id", 7).is_ok());
    }

    #[test]
    fn tool_reply_flags_errors() {
        let result = tool_reply(Err(DatadogError::Validation("bad".into())));
        assert_eq!(result.is_error, Some(true));
    }
}
