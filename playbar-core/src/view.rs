//! Display collaborator for the widget.

use crate::panels::PanelVisibility;
use crate::playback::Track;
use html_escape::encode_text;

/// Icon shown next to a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationIcon {
    Play,
}

impl NotificationIcon {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Play => "play",
        }
    }
}

/// Transient notification announcing a new track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub icon: NotificationIcon,
    /// Artist, empty when unknown
    pub artist: String,
    /// Title, `[No name]` when unknown
    pub title: String,
}

impl Notification {
    /// Build the "now playing" notification for a track
    #[must_use]
    pub fn new_track(track: &Track) -> Self {
        Self {
            icon: NotificationIcon::Play,
            artist: track.artist_or_empty().to_string(),
            title: track.title_or_placeholder().to_string(),
        }
    }

    /// HTML body: bold artist, line break, title
    #[must_use]
    pub fn html(&self) -> String {
        format!(
            "<b>{}</b><br/>{}",
            encode_text(&self.artist),
            encode_text(&self.title)
        )
    }
}

/// Sink for everything the widget shows.
///
/// Implementations render however they like (terminal, GUI, web); the widget
/// only ever pushes finished values into them.
pub trait WidgetView {
    /// Show or hide the track, placeholder and time panels
    fn set_panels(&mut self, panels: PanelVisibility);

    /// Update the artist and title text
    fn set_track_text(&mut self, artist: &str, title: &str);

    /// Update the total time label
    fn set_total_time(&mut self, label: &str);

    /// Update the elapsed time label
    fn set_elapsed_time(&mut self, label: &str);

    /// Update the progress bar fill, in percent
    fn set_progress(&mut self, percent: f64);

    /// Show a transient notification
    fn notify(&mut self, notification: &Notification);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_without_artist() {
        let track = Track::new(None::<String>, Some("X"), Some(10));
        let notification = Notification::new_track(&track);

        assert_eq!(notification.icon, NotificationIcon::Play);
        assert_eq!(notification.artist, "");
        assert_eq!(notification.title, "X");
        assert_eq!(notification.html(), "<b></b><br/>X");
    }

    #[test]
    fn test_notification_without_title() {
        let track = Track::new(Some("A"), None::<String>, None);
        let notification = Notification::new_track(&track);

        assert_eq!(notification.artist, "A");
        assert_eq!(notification.title, "[No name]");
    }

    #[test]
    fn test_notification_html_is_escaped() {
        let track = Track::new(Some("Simon & Garfunkel"), Some("<untitled>"), None);
        assert_eq!(
            Notification::new_track(&track).html(),
            "<b>Simon &amp; Garfunkel</b><br/>&lt;untitled&gt;"
        );
    }
}
