//! Event loop that drives a [`Widget`] from a [`PlayerBackend`].

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::backend::PlayerBackend;
use crate::error::Result;
use crate::event::PlayerEvent;
use crate::view::WidgetView;
use crate::widget::Widget;

const LOG_TARGET: &str = "playbar::dispatcher";

/// What woke the loop up
enum Step {
    Shutdown,
    Event(Option<PlayerEvent>),
    Ticked,
}

/// Routes backend events into the widget and keeps its clock ticking
pub struct EventDispatcher<B: ?Sized> {
    backend: Arc<B>,
    cancel_token: CancellationToken,
}

impl<B> EventDispatcher<B>
where
    B: PlayerBackend + ?Sized,
{
    /// Create a new dispatcher
    ///
    /// # Arguments
    /// * `backend` - Backend to subscribe to and fetch the initial state from
    /// * `cancel_token` - Token that ends [`run`](Self::run) when cancelled
    pub const fn new(backend: Arc<B>, cancel_token: CancellationToken) -> Self {
        Self {
            backend,
            cancel_token,
        }
    }

    /// Get a clone of the cancellation token
    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Run until cancelled or until the backend closes its event stream.
    ///
    /// The subscription is opened before the initial fetch so that events
    /// raised in the meantime are buffered and applied afterwards, in order.
    /// A failed initial fetch is logged and the loop keeps serving events.
    /// Each event is applied completely before the next one is read.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the subscription.
    pub async fn run<V: WidgetView>(&self, widget: &mut Widget<V>) -> Result<()> {
        info!(
            target: LOG_TARGET,
            "Subscribing to {} events",
            self.backend.name()
        );
        let mut subscription = self.backend.subscribe().await?;

        let loaded = tokio::select! {
            biased;
            () = self.cancel_token.cancelled() => None,
            loaded = widget.initial_load(self.backend.as_ref()) => Some(loaded),
        };

        match loaded {
            None => {
                info!(target: LOG_TARGET, "Cancelled during initial load");
                widget.teardown();
                subscription.release();
                return Ok(());
            }
            Some(Err(e)) => {
                warn!(target: LOG_TARGET, "Initial load failed, waiting for events: {}", e);
            }
            Some(Ok(())) => {}
        }

        loop {
            let step = tokio::select! {
                biased;
                () = self.cancel_token.cancelled() => Step::Shutdown,
                event = subscription.recv() => Step::Event(event),
                () = widget.tick() => Step::Ticked,
            };

            match step {
                Step::Shutdown => {
                    info!(target: LOG_TARGET, "Dispatcher shutting down gracefully");
                    break;
                }
                Step::Event(Some(event)) => widget.handle_event(&event),
                Step::Event(None) => {
                    info!(target: LOG_TARGET, "Event stream closed");
                    break;
                }
                Step::Ticked => {}
            }
        }

        widget.teardown();
        subscription.release();
        Ok(())
    }
}
