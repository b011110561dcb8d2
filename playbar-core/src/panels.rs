use crate::playback::PlayerState;

/// Which parts of the widget are shown.
///
/// This is a pure function of the player state; there is no transition table
/// and any state may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PanelVisibility {
    /// Artist and title
    pub track_info: bool,
    /// "No track" placeholder
    pub no_track: bool,
    /// Elapsed/total time and progress bar
    pub time: bool,
}

impl PanelVisibility {
    /// Layout for a given player state
    #[must_use]
    pub const fn for_state(state: PlayerState) -> Self {
        match state {
            PlayerState::Playing => Self {
                track_info: true,
                no_track: false,
                time: true,
            },
            PlayerState::Paused => Self {
                track_info: true,
                no_track: false,
                time: false,
            },
            PlayerState::Stopped => Self {
                track_info: false,
                no_track: true,
                time: false,
            },
        }
    }

    /// Layout before the first status resolves (same as stopped)
    #[must_use]
    pub const fn initial() -> Self {
        Self::for_state(PlayerState::Stopped)
    }
}

impl Default for PanelVisibility {
    fn default() -> Self {
        Self::initial()
    }
}

impl From<PlayerState> for PanelVisibility {
    fn from(state: PlayerState) -> Self {
        Self::for_state(state)
    }
}
