use playbar_core::CoreError;
use thiserror::Error;

/// Unified error type for all Platypush-related operations.
#[derive(Debug, Error)]
pub enum PlatypushError {
    /// HTTP transport failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Failure inside the retry middleware.
    #[error("HTTP middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    /// The server answered with a non-success status.
    #[error("Platypush returned status {status} for {action}")]
    Status {
        action: String,
        status: reqwest::StatusCode,
    },

    /// The action ran but reported errors.
    #[error("Platypush action {action} failed: {}", errors.join("; "))]
    Action { action: String, errors: Vec<String> },

    /// The response had no output to decode.
    #[error("Platypush action {action} returned no output")]
    EmptyOutput { action: String },

    /// Failed to parse or serialize JSON data.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket connection failure.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// A configured URL could not be parsed.
    #[error("Invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

impl From<PlatypushError> for CoreError {
    fn from(error: PlatypushError) -> Self {
        Self::Backend {
            backend: crate::config::PROVIDER_NAME.to_string(),
            reason: error.to_string(),
        }
    }
}

/// Convenience type alias for Results with `PlatypushError`.
pub type Result<T> = std::result::Result<T, PlatypushError>;
