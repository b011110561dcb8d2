//! Test doubles shared by the widget and dispatcher tests.

use crate::backend::{EventSubscription, PlayerBackend};
use crate::error::{CoreError, Result};
use crate::panels::PanelVisibility;
use crate::playback::{PlaybackStatus, Track};
use crate::view::{Notification, WidgetView};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Everything a view has been told, latest values plus history
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewLog {
    pub panels: Option<PanelVisibility>,
    pub artist: Option<String>,
    pub title: Option<String>,
    pub total: Option<String>,
    pub elapsed: Option<String>,
    pub progress: Option<f64>,
    pub elapsed_history: Vec<String>,
    pub notifications: Vec<Notification>,
}

/// View that records every update; clones share the same log
#[derive(Debug, Clone, Default)]
pub struct RecordingView {
    log: Arc<Mutex<ViewLog>>,
}

impl RecordingView {
    pub fn snapshot(&self) -> ViewLog {
        self.log.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn update(&self, f: impl FnOnce(&mut ViewLog)) {
        f(&mut self.log.lock().unwrap_or_else(PoisonError::into_inner));
    }
}

impl WidgetView for RecordingView {
    fn set_panels(&mut self, panels: PanelVisibility) {
        self.update(|log| log.panels = Some(panels));
    }

    fn set_track_text(&mut self, artist: &str, title: &str) {
        self.update(|log| {
            log.artist = Some(artist.to_string());
            log.title = Some(title.to_string());
        });
    }

    fn set_total_time(&mut self, label: &str) {
        self.update(|log| log.total = Some(label.to_string()));
    }

    fn set_elapsed_time(&mut self, label: &str) {
        self.update(|log| {
            log.elapsed = Some(label.to_string());
            log.elapsed_history.push(label.to_string());
        });
    }

    fn set_progress(&mut self, percent: f64) {
        self.update(|log| log.progress = Some(percent));
    }

    fn notify(&mut self, notification: &Notification) {
        self.update(|log| log.notifications.push(notification.clone()));
    }
}

/// Backend answering fetches from fixed values and forwarding pushed events
pub struct ScriptedBackend {
    track: Option<Track>,
    status: Option<PlaybackStatus>,
    events: Mutex<Option<EventSubscription>>,
}

impl ScriptedBackend {
    /// Returns the backend and the sender tests use to push events
    pub fn new(
        track: Option<Track>,
        status: Option<PlaybackStatus>,
    ) -> (Self, mpsc::Sender<crate::event::PlayerEvent>, CancellationToken) {
        let token = CancellationToken::new();
        let (tx, subscription) = EventSubscription::channel(token.clone());
        let backend = Self {
            track,
            status,
            events: Mutex::new(Some(subscription)),
        };
        (backend, tx, token)
    }

    fn unavailable(what: &str) -> CoreError {
        CoreError::Backend {
            backend: "scripted".into(),
            reason: format!("{what} unavailable"),
        }
    }
}

#[async_trait]
impl PlayerBackend for ScriptedBackend {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn current_track(&self) -> Result<Track> {
        self.track.clone().ok_or_else(|| Self::unavailable("track"))
    }

    async fn current_status(&self) -> Result<PlaybackStatus> {
        self.status.ok_or_else(|| Self::unavailable("status"))
    }

    async fn subscribe(&self) -> Result<EventSubscription> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or_else(|| Self::unavailable("second subscription"))
    }
}
