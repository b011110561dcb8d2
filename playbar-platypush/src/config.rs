//! Platypush backend configuration.

use const_format::concatcp;
use playbar_core::{CoreError, ProvidersConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Provider name used in config file
pub const PROVIDER_NAME: &str = "platypush";

/// Default HTTP endpoint of the Platypush web server
pub const DEFAULT_HTTP_URL: &str = "http://localhost:8008";

/// Default WebSocket endpoint Platypush pushes events on
pub const DEFAULT_WEBSOCKET_URL: &str = "ws://localhost:8009";

/// Platypush-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatypushConfig {
    /// Base URL of the HTTP server (the `/execute` endpoint lives under it)
    #[serde(default = "default_http_url")]
    pub http_url: String,
    /// URL of the event WebSocket
    #[serde(default = "default_websocket_url")]
    pub websocket_url: String,
    /// Optional: access token sent as `X-Token`
    #[serde(default)]
    pub token: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Retry attempts for transient HTTP failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Upper bound for the WebSocket reconnect backoff, in milliseconds
    #[serde(default = "default_max_reconnect_delay")]
    pub max_reconnect_delay_ms: u64,
}

fn default_http_url() -> String {
    DEFAULT_HTTP_URL.into()
}

fn default_websocket_url() -> String {
    DEFAULT_WEBSOCKET_URL.into()
}

const fn default_request_timeout() -> u64 {
    10
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_max_reconnect_delay() -> u64 {
    30_000
}

impl Default for PlatypushConfig {
    fn default() -> Self {
        Self {
            http_url: default_http_url(),
            websocket_url: default_websocket_url(),
            token: None,
            request_timeout_secs: default_request_timeout(),
            max_retries: default_max_retries(),
            max_reconnect_delay_ms: default_max_reconnect_delay(),
        }
    }
}

impl PlatypushConfig {
    /// Extract Platypush config from the dynamic providers config.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be parsed.
    pub fn from_providers(providers: &ProvidersConfig) -> Result<Option<Self>, CoreError> {
        providers.get(PROVIDER_NAME)
    }

    /// Validate that the URLs parse and use the expected schemes.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid field.
    pub fn validate(&self) -> Result<(), CoreError> {
        check_url("providers.platypush.http_url", &self.http_url, &["http", "https"])?;
        check_url(
            "providers.platypush.websocket_url",
            &self.websocket_url,
            &["ws", "wss"],
        )?;
        if self.request_timeout_secs == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "providers.platypush.request_timeout_secs must be greater than zero"
                    .into(),
            });
        }
        Ok(())
    }

    /// Token to send, ignoring empty strings
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub const fn max_reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.max_reconnect_delay_ms)
    }
}

fn check_url(field: &str, raw: &str, schemes: &[&str]) -> Result<(), CoreError> {
    let url = Url::parse(raw).map_err(|e| CoreError::ConfigInvalid {
        message: format!("{field}: {e}"),
    })?;
    if !schemes.contains(&url.scheme()) {
        return Err(CoreError::ConfigInvalid {
            message: format!("{field}: expected one of {schemes:?}, got {}", url.scheme()),
        });
    }
    Ok(())
}

/// Config template for the Platypush backend.
/// This is appended to the base config template when creating a new config file.
pub const CONFIG_TEMPLATE: &str = concatcp!(
    r#"[providers.platypush]
# Platypush web server and event socket
http_url = ""#,
    DEFAULT_HTTP_URL,
    r#""
websocket_url = ""#,
    DEFAULT_WEBSOCKET_URL,
    r#""
# Optional: access token (sent as X-Token)
# token = ""
request_timeout_secs = 10
max_retries = 3
max_reconnect_delay_ms = 30000
"#
);
