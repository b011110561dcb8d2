use crate::playback::{PlaybackStatus, PlayerState, Track};
use std::fmt;

/// Kind of an authoritative event pushed by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A new track started playing
    NewTrackStarted,
    /// Playback started or resumed
    PlayStarted,
    /// Playback was paused
    PlayPaused,
    /// Playback stopped
    PlayStopped,
    /// The position jumped within the current track
    SeekChanged,
}

impl EventKind {
    /// State implied by the event when it carries no status payload
    #[must_use]
    pub const fn implied_state(&self) -> Option<PlayerState> {
        match self {
            Self::NewTrackStarted | Self::PlayStarted => Some(PlayerState::Playing),
            Self::PlayPaused => Some(PlayerState::Paused),
            Self::PlayStopped => Some(PlayerState::Stopped),
            Self::SeekChanged => None,
        }
    }

    /// Whether the event announces a new track
    #[must_use]
    pub const fn announces_track(&self) -> bool {
        matches!(self, Self::NewTrackStarted)
    }

    /// Whether the event's track payload should refresh the track display
    #[must_use]
    pub const fn refreshes_track(&self) -> bool {
        matches!(
            self,
            Self::NewTrackStarted | Self::PlayStarted | Self::PlayPaused
        )
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NewTrackStarted => "new_track_started",
            Self::PlayStarted => "play_started",
            Self::PlayPaused => "play_paused",
            Self::PlayStopped => "play_stopped",
            Self::SeekChanged => "seek_changed",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authoritative event with its optional payloads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerEvent {
    pub kind: EventKind,
    pub track: Option<Track>,
    pub status: Option<PlaybackStatus>,
}

impl PlayerEvent {
    /// Create an event without payloads
    #[must_use]
    pub const fn new(kind: EventKind) -> Self {
        Self {
            kind,
            track: None,
            status: None,
        }
    }

    /// Attach a track payload
    #[must_use]
    pub fn with_track(mut self, track: Track) -> Self {
        self.track = Some(track);
        self
    }

    /// Attach a status payload
    #[must_use]
    pub fn with_status(mut self, status: PlaybackStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Status to apply: the payload if present, otherwise the state the kind
    /// implies (without an elapsed position)
    #[must_use]
    pub fn effective_status(&self) -> Option<PlaybackStatus> {
        self.status
            .or_else(|| self.kind.implied_state().map(PlaybackStatus::state_only))
    }
}
