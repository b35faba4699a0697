use std::env;
use std::sync::OnceLock;

use crate::datadog::error::DatadogError;

pub const DEFAULT_SITE: &str = "datadoghq.com";

const MISSING_CREDENTIALS: &str =
    "DD_API_KEY and DD_APP_KEY must be set in the environment or .env file.";

/// Datadog connection settings.
///
/// Reads DD_API_KEY, DD_APP_KEY, and DD_SITE from the environment (dotenv
/// loads a `.env` file into the environment before the first read).
#[derive(Clone, Debug)]
pub struct Settings {
    pub api_key: String,
    pub app_key: String,
    pub site: String,
}

impl Settings {
    pub fn from_env() -> Result<Self, DatadogError> {
        let api_key = non_empty_var("DD_API_KEY");
        let app_key = non_empty_var("DD_APP_KEY");
        match (api_key, app_key) {
            (Some(api_key), Some(app_key)) => Ok(Self {
                api_key,
                app_key,
                site: non_empty_var("DD_SITE").unwrap_or_else(|| DEFAULT_SITE.to_string()),
            }),
            _ => Err(DatadogError::Config(MISSING_CREDENTIALS.to_string())),
        }
    }

    /// Process-wide settings, resolved from the environment once and cached
    /// for the process lifetime.
    pub fn global() -> Result<Settings, DatadogError> {
        static SETTINGS: OnceLock<Result<Settings, String>> = OnceLock::new();
        SETTINGS
            .get_or_init(|| Settings::from_env().map_err(|e| e.to_string()))
            .clone()
            .map_err(DatadogError::Config)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_site_is_commercial_domain() {
        assert_eq!(DEFAULT_SITE, "datadoghq.com");
    }

    #[test]
    fn missing_credentials_name_both_variables() {
        assert!(MISSING_CREDENTIALS.contains("DD_API_KEY"));
        assert!(MISSING_CREDENTIALS.contains("DD_APP_KEY"));
    }
}
