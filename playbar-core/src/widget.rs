use crate::backend::PlayerBackend;
use crate::clock::{ClockEstimator, ClockReading};
use crate::error::Result;
use crate::event::PlayerEvent;
use crate::panels::PanelVisibility;
use crate::playback::{PlaybackStatus, PlayerState, Track};
use crate::time::format_time;
use crate::view::{Notification, WidgetView};
use std::time::Duration;
use tracing::{debug, info};

const LOG_TARGET: &str = "playbar::widget";

/// Widget behaviour switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetOptions {
    /// Period of the local elapsed-time tick
    pub tick_period: Duration,
    /// Whether new tracks raise a notification
    pub notifications: bool,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self {
            tick_period: crate::clock::TICK_PERIOD,
            notifications: true,
        }
    }
}

/// Now-playing widget state.
///
/// Owns the clock and the last applied track/state, and pushes every change
/// into its view. Both the eager startup fetch and pushed events go through
/// [`refresh_track`](Self::refresh_track) and
/// [`refresh_status`](Self::refresh_status), so the same logical input always
/// produces the same display.
pub struct Widget<V> {
    view: V,
    clock: ClockEstimator,
    state: Option<PlayerState>,
    track: Option<Track>,
    notifications: bool,
}

impl<V: WidgetView> Widget<V> {
    /// Create a widget with default options
    #[must_use]
    pub fn new(view: V) -> Self {
        Self::with_options(view, WidgetOptions::default())
    }

    /// Create a widget and show the initial (stopped) layout
    #[must_use]
    pub fn with_options(mut view: V, options: WidgetOptions) -> Self {
        view.set_panels(PanelVisibility::initial());
        Self {
            view,
            clock: ClockEstimator::with_period(options.tick_period),
            state: None,
            track: None,
            notifications: options.notifications,
        }
    }

    /// Fetch track and status together, then apply both.
    ///
    /// Nothing is applied unless both requests succeed.
    ///
    /// # Errors
    ///
    /// Returns the first backend error; the widget is left untouched.
    pub async fn initial_load<B>(&mut self, backend: &B) -> Result<()>
    where
        B: PlayerBackend + ?Sized,
    {
        let (track, status) =
            tokio::try_join!(backend.current_track(), backend.current_status())?;

        info!(
            target: LOG_TARGET,
            "Initial state from {}: {} - {} ({})",
            backend.name(),
            track.artist_or_empty(),
            track.title_or_empty(),
            status.state
        );

        self.refresh_track(&track);
        self.refresh_status(&status);
        Ok(())
    }

    /// Apply an authoritative event.
    ///
    /// Handling cascades: a new track is announced, then treated like a
    /// play/pause update; a play/pause update refreshes the track, then the
    /// status; stop and seek only refresh the status. Missing payloads skip
    /// their step.
    pub fn handle_event(&mut self, event: &PlayerEvent) {
        debug!(target: LOG_TARGET, "Handling {} event", event.kind);

        if event.kind.announces_track() && self.notifications {
            let announced = event.track.clone().unwrap_or_default();
            self.view.notify(&Notification::new_track(&announced));
        }

        if event.kind.refreshes_track() {
            if let Some(track) = &event.track {
                self.refresh_track(track);
            } else {
                debug!(target: LOG_TARGET, "{} event carried no track", event.kind);
            }
        }

        if let Some(status) = event.effective_status() {
            self.refresh_status(&status);
        } else {
            debug!(target: LOG_TARGET, "{} event carried no status", event.kind);
        }
    }

    /// Replace the displayed track
    pub fn refresh_track(&mut self, track: &Track) {
        self.clock.set_total(track.duration);
        self.view.set_total_time(&format_time(track.duration));
        self.view
            .set_track_text(track.artist_or_empty(), track.title_or_empty());
        self.track = Some(track.clone());
    }

    /// Apply a status snapshot, resyncing the clock when it has a position
    pub fn refresh_status(&mut self, status: &PlaybackStatus) {
        self.apply_state(status.state);

        if let Some(elapsed) = status.elapsed {
            let reading = self.clock.set_elapsed(elapsed);
            self.publish(&reading);
        }
    }

    /// Wait for the next local tick and show it.
    ///
    /// Never completes while the clock is idle. Cancel-safe.
    pub async fn tick(&mut self) {
        let reading = self.clock.tick().await;
        self.publish(&reading);
    }

    /// Stop the local tick. Safe to call more than once.
    pub fn teardown(&mut self) {
        if self.clock.cancel() {
            debug!(target: LOG_TARGET, "Cancelled elapsed tick");
        }
    }

    /// Last applied player state, `None` before the first status
    #[must_use]
    pub const fn state(&self) -> Option<PlayerState> {
        self.state
    }

    /// Last applied track
    #[must_use]
    pub const fn track(&self) -> Option<&Track> {
        self.track.as_ref()
    }

    /// Clock estimate
    #[must_use]
    pub const fn clock(&self) -> &ClockEstimator {
        &self.clock
    }

    /// Current panel layout
    #[must_use]
    pub fn panels(&self) -> PanelVisibility {
        self.state
            .map_or_else(PanelVisibility::initial, PanelVisibility::for_state)
    }

    fn apply_state(&mut self, state: PlayerState) {
        if self.state != Some(state) {
            debug!(target: LOG_TARGET, "Player state -> {}", state);
        }
        self.state = Some(state);
        self.view.set_panels(PanelVisibility::for_state(state));
    }

    fn publish(&mut self, reading: &ClockReading) {
        self.view.set_elapsed_time(&reading.elapsed_label());
        self.view.set_progress(reading.percent);
    }
}

impl<V> Drop for Widget<V> {
    fn drop(&mut self) {
        self.clock.cancel();
    }
}
