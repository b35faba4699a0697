use reqwest::{header, Client, Method, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::error::DatadogError;
use crate::config::Settings;

/// Fixed per-request timeout. No layer retries a timed-out call.
pub const API_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApiVersion {
    V1,
    V2,
}

impl ApiVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            ApiVersion::V1 => "v1",
            ApiVersion::V2 => "v2",
        }
    }
}

/// Authenticated HTTP client for the Datadog API. The sole point of
/// external I/O: every tool goes through `request` (or a verb wrapper).
pub struct DatadogClient {
    http: Client,
    settings: Option<Settings>,
    base_override: Option<String>,
}

impl DatadogClient {
    /// Client resolving credentials from the process-wide settings on each
    /// call. Missing credentials surface as a `Config` error per request,
    /// not a startup panic.
    pub fn new() -> Self {
        Self::build(None, None)
    }

    /// Client with injected settings instead of the process environment.
    pub fn with_settings(settings: Settings) -> Self {
        Self::build(Some(settings), None)
    }

    /// Client pointed at an alternate base URL (e.g. a mock server).
    /// `base_url` replaces the `https://api.<site>` prefix.
    pub fn with_base_url(settings: Settings, base_url: impl Into<String>) -> Self {
        Self::build(Some(settings), Some(base_url.into()))
    }

    fn build(settings: Option<Settings>, base_override: Option<String>) -> Self {
        let http = Client::builder()
            .timeout(API_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");
        Self {
            http,
            settings,
            base_override,
        }
    }

    fn resolve_settings(&self) -> Result<Settings, DatadogError> {
        match &self.settings {
            Some(settings) => Ok(settings.clone()),
            None => Settings::global(),
        }
    }

    fn endpoint_url(&self, settings: &Settings, version: ApiVersion, path: &str) -> String {
        match &self.base_override {
            Some(base) => format!("{}/api/{}/{}", base.trim_end_matches('/'), version.as_str(), path),
            None => format!("https://api.{}/api/{}/{}", settings.site, version.as_str(), path),
        }
    }

    /// Make one authenticated request to the Datadog API.
    ///
    /// Returns the decoded JSON body, or `None` for a 204 response. Any
    /// status >= 400 becomes `DatadogError::Api` carrying the status code
    /// and raw response body.
    pub async fn request(
        &self,
        method: Method,
        version: ApiVersion,
        path: &str,
        query: Option<&[(&str, String)]>,
        body: Option<&Value>,
    ) -> Result<Option<Value>, DatadogError> {
        let settings = self.resolve_settings()?;
        let url = self.endpoint_url(&settings, version, path);
        debug!(%method, %url, "Datadog API request");

        let mut builder = self
            .http
            .request(method, &url)
            .header("DD-API-KEY", &settings.api_key)
            .header("DD-APPLICATION-KEY", &settings.app_key)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json");

        if let Some(query) = query {
            builder = builder.query(query);
        }
        if let Some(json_body) = body {
            builder = builder.json(json_body);
        }

        let response = builder.send().await?;
        let status = response.status();

        if status.as_u16() >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(DatadogError::Api {
                status: status.as_u16(),
                body,
            });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        Ok(Some(response.json().await?))
    }

    pub async fn get(
        &self,
        version: ApiVersion,
        path: &str,
        query: Option<&[(&str, String)]>,
    ) -> Result<Option<Value>, DatadogError> {
        self.request(Method::GET, version, path, query, None).await
    }

    pub async fn post(
        &self,
        version: ApiVersion,
        path: &str,
        body: &Value,
    ) -> Result<Option<Value>, DatadogError> {
        self.request(Method::POST, version, path, None, Some(body)).await
    }

    pub async fn put(
        &self,
        version: ApiVersion,
        path: &str,
        body: &Value,
    ) -> Result<Option<Value>, DatadogError> {
        self.request(Method::PUT, version, path, None, Some(body)).await
    }

    pub async fn patch(
        &self,
        version: ApiVersion,
        path: &str,
        body: &Value,
    ) -> Result<Option<Value>, DatadogError> {
        self.request(Method::PATCH, version, path, None, Some(body)).await
    }

    pub async fn delete(
        &self,
        version: ApiVersion,
        path: &str,
    ) -> Result<Option<Value>, DatadogError> {
        self.request(Method::DELETE, version, path, None, None).await
    }
}

impl Default for DatadogClient {
    fn default() -> Self {
        Self::new()
    }
}
