pub mod config;
pub mod datadog;
pub mod format;
pub mod server;
pub mod time_parser;
pub mod tools;

pub use config::Settings;
pub use datadog::client::{ApiVersion, DatadogClient};
pub use datadog::error::{handle_error, DatadogError};
pub use server::DatadogToolsServer;
