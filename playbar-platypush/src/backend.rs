//! [`PlayerBackend`] implementation over Platypush.

use crate::client::{PlatypushClient, ACTION_CURRENT_SONG, ACTION_STATUS};
use crate::config::{PlatypushConfig, PROVIDER_NAME};
use crate::error::PlatypushError;
use crate::events::EventListener;
use async_trait::async_trait;
use playbar_core::{CoreError, EventSubscription, PlaybackStatus, PlayerBackend, Track};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const LOG_TARGET: &str = "playbar::platypush";

/// Platypush backend: MPD actions over HTTP, events over WebSocket
pub struct PlatypushBackend {
    client: PlatypushClient,
    listener: EventListener,
    cancel_token: CancellationToken,
}

impl PlatypushBackend {
    /// Create a backend from its config.
    ///
    /// # Arguments
    /// * `config` - Platypush provider config
    /// * `cancel_token` - Optional parent token; cancelling it stops every listener
    ///
    /// # Errors
    ///
    /// Returns an error if a URL is invalid or the HTTP client cannot be built.
    pub fn new(
        config: &PlatypushConfig,
        cancel_token: Option<CancellationToken>,
    ) -> Result<Self, PlatypushError> {
        let client = PlatypushClient::new(config)?;
        let listener = EventListener::new(config)?;
        info!(
            target: LOG_TARGET,
            "Platypush backend using {}", client.execute_url()
        );

        Ok(Self {
            client,
            listener,
            cancel_token: cancel_token.unwrap_or_default(),
        })
    }
}

#[async_trait]
impl PlayerBackend for PlatypushBackend {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn current_track(&self) -> Result<Track, CoreError> {
        let track: Track = self.client.execute(ACTION_CURRENT_SONG).await?;
        debug!(
            target: LOG_TARGET,
            "Current track: {} - {}",
            track.artist_or_empty(),
            track.title_or_placeholder()
        );
        Ok(track)
    }

    async fn current_status(&self) -> Result<PlaybackStatus, CoreError> {
        let status: PlaybackStatus = self.client.execute(ACTION_STATUS).await?;
        debug!(target: LOG_TARGET, "Current status: {}", status.state);
        Ok(status)
    }

    async fn subscribe(&self) -> Result<EventSubscription, CoreError> {
        let (tx, subscription) = EventSubscription::channel(self.cancel_token.child_token());
        let listener = self.listener.clone();
        let token = subscription.cancel_token();
        tokio::spawn(async move {
            listener.run(tx, token).await;
        });
        Ok(subscription)
    }
}
