use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatadogError {
    #[error("{0}")]
    Config(String),

    #[error("Datadog API returned {status}")]
    Api { status: u16, body: String },

    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid time: '{0}'. Use relative (1h, 30m, 7d), Unix timestamp, or RFC 3339.")]
    TimeParse(String),

    #[error("{0}")]
    Validation(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convert an error into an actionable message string suitable for returning
/// from a tool. Pure mapping: no retries, no logging, no state.
pub fn handle_error(err: &DatadogError) -> String {
    match err {
        DatadogError::Api { status, body } => {
            let msg = match status {
                400 => "Bad request. Check your parameters.".to_string(),
                401 => "Unauthorized. Check that DD_API_KEY and DD_APP_KEY are valid.".to_string(),
                403 => "Forbidden. Your API key lacks permission for this operation.".to_string(),
                404 => "Resource not found. Check the ID is correct.".to_string(),
                429 => "Rate limit exceeded. Wait before retrying.".to_string(),
                other => format!("Datadog API returned status {}.", other),
            };
            format!("Error: {}{}", msg, format_body(body))
        }
        DatadogError::Request(e) if e.is_timeout() => "Error: Request timed out. Try again.".to_string(),
        DatadogError::Request(e) if e.is_connect() => {
            "Error: Could not reach Datadog API. Check DD_SITE and network.".to_string()
        }
        other => format!("Error: {}", other),
    }
}

fn format_body(body: &str) -> String {
    if body.is_empty() {
        return String::new();
    }
    match serde_json::from_str::<Value>(body) {
        Ok(parsed) => format!(
            "\n{}",
            serde_json::to_string_pretty(&parsed).unwrap_or_else(|_| body.to_string())
        ),
        Err(_) => format!("\n{}", body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16, body: &str) -> DatadogError {
        DatadogError::Api {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn api_400_names_parameters() {
        assert!(handle_error(&api(400, "")).contains("Bad request"));
    }

    #[test]
    fn api_401_names_credentials() {
        assert!(handle_error(&api(401, "")).contains("Unauthorized"));
    }

    #[test]
    fn api_403_names_permission() {
        assert!(handle_error(&api(403, "")).contains("Forbidden"));
    }

    #[test]
    fn api_404_names_resource() {
        assert!(handle_error(&api(404, "")).contains("Resource not found"));
    }

    #[test]
    fn api_429_names_rate_limit() {
        assert!(handle_error(&api(429, "")).contains("Rate limit"));
    }

    #[test]
    fn api_other_status_with_json_body() {
        let msg = handle_error(&api(500, r#"{"errors": ["boom"]}"#));
        assert!(msg.contains("500"));
        assert!(msg.contains("boom"));
    }

    #[test]
    fn api_other_status_with_text_body() {
        let msg = handle_error(&api(500, "Internal Server Error"));
        assert!(msg.contains("Internal Server Error"));
    }

    #[test]
    fn config_message_is_verbatim() {
        let msg = handle_error(&DatadogError::Config("missing keys".to_string()));
        assert_eq!(msg, "Error: missing keys");
    }

    #[test]
    fn validation_message_is_verbatim() {
        let msg = handle_error(&DatadogError::Validation("limit must be between 1 and 100".into()));
        assert!(msg.contains("limit must be between 1 and 100"));
    }

    #[test]
    fn time_parse_echoes_input() {
        let msg = handle_error(&DatadogError::TimeParse("not-a-time".to_string()));
        assert!(msg.contains("Invalid time: 'not-a-time'"));
        assert!(msg.contains("RFC 3339"));
    }
}
