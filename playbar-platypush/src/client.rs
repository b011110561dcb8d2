//! Request client for Platypush's `/execute` endpoint.

use crate::config::PlatypushConfig;
use crate::error::{PlatypushError, Result};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

const LOG_TARGET: &str = "playbar::platypush::client";

/// Action returning the track MPD is currently playing
pub const ACTION_CURRENT_SONG: &str = "music.mpd.currentsong";
/// Action returning MPD's playback status
pub const ACTION_STATUS: &str = "music.mpd.status";

/// Header carrying the access token
const TOKEN_HEADER: &str = "X-Token";

/// Request message sent to `/execute`
#[derive(Debug, Serialize)]
struct ExecuteRequest<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    action: &'a str,
    args: serde_json::Map<String, serde_json::Value>,
}

/// Response message from `/execute`.
/// Note: the envelope carries routing fields (id, target, origin) that we
/// don't use; serde ignores unknown fields by default.
#[derive(Debug, Deserialize)]
struct ExecuteResponse {
    response: ResponseBody,
}

#[derive(Debug, Deserialize)]
struct ResponseBody {
    #[serde(default)]
    output: Option<serde_json::Value>,
    #[serde(default)]
    errors: Vec<serde_json::Value>,
}

impl ResponseBody {
    fn into_output<T: DeserializeOwned>(self, action: &str) -> Result<T> {
        if !self.errors.is_empty() {
            return Err(PlatypushError::Action {
                action: action.to_string(),
                errors: self.errors.iter().map(error_text).collect(),
            });
        }

        let output = self.output.ok_or_else(|| PlatypushError::EmptyOutput {
            action: action.to_string(),
        })?;
        Ok(serde_json::from_value(output)?)
    }
}

fn error_text(error: &serde_json::Value) -> String {
    error
        .as_str()
        .map_or_else(|| error.to_string(), ToString::to_string)
}

/// HTTP client for running Platypush actions
pub struct PlatypushClient {
    client: ClientWithMiddleware,
    execute_url: Url,
    token: Option<HeaderValue>,
}

impl PlatypushClient {
    /// Create a client with timeouts and retries taken from the config.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client cannot be created.
    pub fn new(config: &PlatypushConfig) -> Result<Self> {
        let execute_url = execute_url(&config.http_url)?;

        let base_client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(Duration::from_secs(5))
            .user_agent(concat!("Playbar/", env!("CARGO_PKG_VERSION")))
            .build()?;

        // Wrap with retry middleware (exponential backoff)
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(base_client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        let token = config.token().and_then(|token| match HeaderValue::from_str(token) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(target: LOG_TARGET, "Ignoring token that is not a valid header value: {}", e);
                None
            }
        });

        Ok(Self {
            client,
            execute_url,
            token,
        })
    }

    /// URL requests are posted to
    #[must_use]
    pub const fn execute_url(&self) -> &Url {
        &self.execute_url
    }

    /// Run an action without arguments and decode its output.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, errors
    /// reported by the action, or an output that does not decode as `T`.
    pub async fn execute<T: DeserializeOwned>(&self, action: &str) -> Result<T> {
        let body = serde_json::to_vec(&ExecuteRequest {
            kind: "request",
            action,
            args: serde_json::Map::new(),
        })?;

        debug!(target: LOG_TARGET, "POST {} ({})", self.execute_url, action);

        let mut request = self
            .client
            .post(self.execute_url.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(body);
        if let Some(token) = &self.token {
            request = request.header(TOKEN_HEADER, token.clone());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(target: LOG_TARGET, "Platypush returned status {} for {}", status, action);
            return Err(PlatypushError::Status {
                action: action.to_string(),
                status,
            });
        }

        let envelope: ExecuteResponse = response.json().await?;
        envelope.response.into_output(action)
    }
}

/// `<http_url>/execute`, keeping any path prefix the server is mounted under
fn execute_url(http_url: &str) -> Result<Url> {
    let invalid = |source: url::ParseError| PlatypushError::InvalidUrl {
        url: http_url.to_string(),
        source,
    };

    let mut base = Url::parse(http_url).map_err(invalid)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("execute").map_err(invalid)
}
