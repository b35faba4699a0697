//! Response formatting and truncation.

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

/// Ceiling on formatted output length, in characters.
pub const CHARACTER_LIMIT: usize = 25_000;

pub const TRUNCATION_NOTICE: &str = "\n\n[Truncated. Use pagination or filters to narrow results.]";

/// Output format for tool responses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    #[default]
    Json,
    Markdown,
}

pub type MarkdownRenderer = fn(&Value) -> String;

/// Format API response data as JSON or Markdown.
///
/// Markdown output uses `renderer` when one is supplied; operations without
/// a resource-specific renderer fall back to the JSON serialization. Either
/// way the result is truncated at `CHARACTER_LIMIT`.
pub fn format_output(data: &Value, format: ResponseFormat, renderer: Option<MarkdownRenderer>) -> String {
    let text = match (format, renderer) {
        (ResponseFormat::Markdown, Some(render)) => render(data),
        _ => to_pretty_json(data),
    };
    truncate(text)
}

pub fn to_pretty_json(data: &Value) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string())
}

fn truncate(text: String) -> String {
    match text.char_indices().nth(CHARACTER_LIMIT) {
        Some((cut, _)) => {
            let mut out = text;
            out.truncate(cut);
            out.push_str(TRUNCATION_NOTICE);
            out
        }
        None => text,
    }
}

/// String field lookup with a placeholder default, for Markdown renderers.
pub(crate) fn field_str<'a>(value: &'a Value, key: &str, default: &'a str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or(default)
}

/// Field rendered for display: strings verbatim, other values as JSON,
/// missing or null as `?`.
pub(crate) fn field_display(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "?".to_string(),
        Some(other) => other.to_string(),
    }
}

/// String field that falls back when missing *or* empty.
pub(crate) fn field_or(value: &Value, key: &str, fallback: &str) -> String {
    match value.get(key).and_then(Value::as_str) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => fallback.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_format_round_trips() {
        let data = json!({"key": "value", "count": 42});
        let result = format_output(&data, ResponseFormat::Json, None);
        let parsed: Value = serde_json::from_str(&result).unwrap();
        assert_eq!(parsed["key"], "value");
        assert_eq!(parsed["count"], 42);
    }

    #[test]
    fn markdown_with_renderer_uses_renderer() {
        let data = json!([{"name": "test"}]);
        fn render(d: &Value) -> String {
            format!("# Items ({})", d.as_array().map(Vec::len).unwrap_or(0))
        }
        let result = format_output(&data, ResponseFormat::Markdown, Some(render));
        assert_eq!(result, "# Items (1)");
    }

    #[test]
    fn markdown_without_renderer_falls_back_to_json() {
        let data = json!({"key": "value"});
        let md = format_output(&data, ResponseFormat::Markdown, None);
        let js = format_output(&data, ResponseFormat::Json, None);
        assert_eq!(md, js);
    }

    #[test]
    fn formatting_is_idempotent() {
        let data = json!({"a": [1, 2, 3], "b": {"c": null}});
        let first = format_output(&data, ResponseFormat::Json, None);
        let second = format_output(&data, ResponseFormat::Json, None);
        assert_eq!(first, second);
    }

    #[test]
    fn truncation_cuts_at_exact_ceiling() {
        let data = Value::String("x".repeat(CHARACTER_LIMIT + 1000));
        let result = format_output(&data, ResponseFormat::Json, None);
        assert!(result.ends_with(TRUNCATION_NOTICE));
        assert_eq!(
            result.chars().count(),
            CHARACTER_LIMIT + TRUNCATION_NOTICE.chars().count()
        );
    }

    #[test]
    fn no_truncation_under_limit() {
        let data = json!({"short": "data"});
        let result = format_output(&data, ResponseFormat::Json, None);
        assert!(!result.contains("[Truncated"));
    }

    #[test]
    fn response_format_deserializes_lowercase() {
        let fmt: ResponseFormat = serde_json::from_str("\"markdown\"").unwrap();
        assert_eq!(fmt, ResponseFormat::Markdown);
        let fmt: ResponseFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(fmt, ResponseFormat::Json);
    }

    #[test]
    fn field_helpers_degrade_to_placeholders() {
        let data = json!({"name": "web", "id": 7, "empty": ""});
        assert_eq!(field_str(&data, "name", "?"), "web");
        assert_eq!(field_str(&data, "missing", "?"), "?");
        assert_eq!(field_display(&data, "id"), "7");
        assert_eq!(field_display(&data, "missing"), "?");
        assert_eq!(field_or(&data, "empty", "(none)"), "(none)");
    }
}
