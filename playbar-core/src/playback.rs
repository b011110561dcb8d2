use crate::time::deserialize_seconds;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Placeholder title used when a track carries no title at all.
pub const UNTITLED: &str = "[No name]";

/// Authoritative player state reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerState {
    #[serde(rename = "play", alias = "playing")]
    Playing,
    #[serde(rename = "pause", alias = "paused")]
    Paused,
    #[serde(rename = "stop", alias = "stopped")]
    Stopped,
}

impl PlayerState {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for PlayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Information about the currently playing track.
///
/// Every field is optional; MPD omits tags it does not know about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawTrack")]
pub struct Track {
    /// Artist name
    pub artist: Option<String>,
    /// Track title
    pub title: Option<String>,
    /// Track duration in whole seconds
    #[serde(rename = "time")]
    pub duration: Option<u32>,
}

/// Track as it arrives on the wire.
///
/// MPD 0.20+ reports the length twice: `time` in whole seconds and
/// `duration` with a fractional part. Repeated tags arrive as lists.
#[derive(Deserialize)]
struct RawTrack {
    #[serde(default, deserialize_with = "deserialize_tag")]
    artist: Option<String>,
    #[serde(default, deserialize_with = "deserialize_tag")]
    title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_seconds")]
    time: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_seconds")]
    duration: Option<u32>,
}

impl From<RawTrack> for Track {
    fn from(raw: RawTrack) -> Self {
        Self {
            artist: raw.artist,
            title: raw.title,
            duration: raw.time.filter(|&t| t > 0).or(raw.duration),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTag {
    One(String),
    Many(Vec<String>),
}

/// A tag sent either as a string or as a list of values, joined with ", "
fn deserialize_tag<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RawTag>::deserialize(deserializer)? {
        Some(RawTag::One(value)) => Some(value),
        Some(RawTag::Many(values)) if !values.is_empty() => Some(values.join(", ")),
        Some(RawTag::Many(_)) | None => None,
    })
}

impl Track {
    /// Create a new track
    #[must_use]
    pub fn new(
        artist: Option<impl Into<String>>,
        title: Option<impl Into<String>>,
        duration: Option<u32>,
    ) -> Self {
        Self {
            artist: artist.map(Into::into),
            title: title.map(Into::into),
            duration,
        }
    }

    /// Artist text for display, empty when unknown
    #[must_use]
    pub fn artist_or_empty(&self) -> &str {
        self.artist.as_deref().unwrap_or_default()
    }

    /// Title text for display, empty when unknown
    #[must_use]
    pub fn title_or_empty(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    /// Title text for notifications, falling back to [`UNTITLED`]
    #[must_use]
    pub fn title_or_placeholder(&self) -> &str {
        self.title.as_deref().unwrap_or(UNTITLED)
    }
}

/// Authoritative playback snapshot, either fetched or pushed with an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackStatus {
    /// Player state
    pub state: PlayerState,
    /// Elapsed position in whole seconds, if the player reported one
    #[serde(default, deserialize_with = "deserialize_seconds")]
    pub elapsed: Option<u32>,
}

impl PlaybackStatus {
    #[must_use]
    pub const fn new(state: PlayerState, elapsed: Option<u32>) -> Self {
        Self { state, elapsed }
    }

    /// A status carrying only a state
    #[must_use]
    pub const fn state_only(state: PlayerState) -> Self {
        Self {
            state,
            elapsed: None,
        }
    }
}
