//! Player backend trait and event subscription handle.

use crate::error::Result;
use crate::event::PlayerEvent;
use crate::playback::{PlaybackStatus, Track};
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Default buffer size for event subscriptions
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Trait for backends that report what a music player is doing.
///
/// Backends answer two on-demand requests (current track, current status)
/// and push authoritative events through an [`EventSubscription`].
/// Implementations should:
///
/// - Return fetch failures as errors instead of swallowing them
/// - Keep their event listener running until the subscription is released
/// - Handle transient connection errors with retries/backoff
///
/// # Example
///
/// ```ignore
/// let backend = Arc::new(PlatypushBackend::new(&config, None)?);
/// let dispatcher = EventDispatcher::new(backend, cancel_token);
/// dispatcher.run(&mut widget).await?;
/// ```
#[async_trait]
pub trait PlayerBackend: Send + Sync {
    /// Returns a human-readable name for this backend.
    fn name(&self) -> &'static str;

    /// Fetch the track currently loaded in the player.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    async fn current_track(&self) -> Result<Track>;

    /// Fetch the current playback status.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    async fn current_status(&self) -> Result<PlaybackStatus>;

    /// Start listening for pushed events.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be started.
    async fn subscribe(&self) -> Result<EventSubscription>;
}

/// Handle to a live stream of backend events.
///
/// Releasing or dropping the handle cancels the producer side through the
/// shared cancellation token.
#[derive(Debug)]
pub struct EventSubscription {
    events: mpsc::Receiver<PlayerEvent>,
    cancel_token: CancellationToken,
}

impl EventSubscription {
    /// Wrap an existing receiver and the token its producer listens on
    #[must_use]
    pub const fn new(events: mpsc::Receiver<PlayerEvent>, cancel_token: CancellationToken) -> Self {
        Self {
            events,
            cancel_token,
        }
    }

    /// Create a subscription together with the sender its producer should use
    #[must_use]
    pub fn channel(cancel_token: CancellationToken) -> (mpsc::Sender<PlayerEvent>, Self) {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        (tx, Self::new(rx, cancel_token))
    }

    /// Receive the next event. `None` once the producer is gone.
    pub async fn recv(&mut self) -> Option<PlayerEvent> {
        self.events.recv().await
    }

    /// Token the producer should watch for shutdown
    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Whether the subscription has been released
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    /// Stop the producer and close the stream
    pub fn release(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.cancel_token.cancel();
        self.events.close();
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.shutdown();
    }
}
