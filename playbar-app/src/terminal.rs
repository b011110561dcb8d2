//! Single-line terminal rendering of the widget.

use playbar_core::{Notification, NotificationIcon, PanelVisibility, WidgetView, UNKNOWN_TIME};
use std::io::{self, Write};
use tracing::{info, warn};

/// Width of the progress bar in cells
const BAR_WIDTH: usize = 20;

/// Moves the cursor to column 0 and clears the line
const CLEAR_LINE: &str = "\r\x1b[2K";

const NO_TRACK_TEXT: &str = "No media playing";

/// [`WidgetView`] that redraws one status line on every update
pub struct TerminalView<W: Write> {
    out: W,
    panels: PanelVisibility,
    artist: String,
    title: String,
    total: String,
    elapsed: String,
    percent: f64,
}

impl TerminalView<io::Stdout> {
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalView<W> {
    #[must_use]
    pub fn new(out: W) -> Self {
        Self {
            out,
            panels: PanelVisibility::initial(),
            artist: String::new(),
            title: String::new(),
            total: UNKNOWN_TIME.to_string(),
            elapsed: UNKNOWN_TIME.to_string(),
            percent: 0.0,
        }
    }

    /// Text of the status line for the current panels
    #[must_use]
    pub fn line(&self) -> String {
        let mut parts = Vec::new();
        if self.panels.no_track {
            parts.push(NO_TRACK_TEXT.to_string());
        }
        if self.panels.track_info {
            parts.push(track_text(&self.artist, &self.title));
        }
        if self.panels.time {
            parts.push(format!(
                "{} {} {}",
                self.elapsed,
                progress_bar(self.percent),
                self.total
            ));
        }
        parts.join("  ")
    }

    fn redraw(&mut self) {
        let line = self.line();
        if let Err(e) = write!(self.out, "{CLEAR_LINE}{line}").and_then(|()| self.out.flush()) {
            warn!("Failed to draw status line: {}", e);
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> WidgetView for TerminalView<W> {
    fn set_panels(&mut self, panels: PanelVisibility) {
        self.panels = panels;
        self.redraw();
    }

    fn set_track_text(&mut self, artist: &str, title: &str) {
        artist.clone_into(&mut self.artist);
        title.clone_into(&mut self.title);
        self.redraw();
    }

    fn set_total_time(&mut self, label: &str) {
        label.clone_into(&mut self.total);
        self.redraw();
    }

    fn set_elapsed_time(&mut self, label: &str) {
        label.clone_into(&mut self.elapsed);
        self.redraw();
    }

    fn set_progress(&mut self, percent: f64) {
        self.percent = percent;
        self.redraw();
    }

    fn notify(&mut self, notification: &Notification) {
        info!(
            icon = notification.icon.as_str(),
            body = %notification.html(),
            "Notification"
        );
        let result = writeln!(
            self.out,
            "{CLEAR_LINE}{} {}",
            icon_glyph(notification.icon),
            track_text(&notification.artist, &notification.title)
        );
        if let Err(e) = result {
            warn!("Failed to print notification: {}", e);
        }
        self.redraw();
    }
}

const fn icon_glyph(icon: NotificationIcon) -> char {
    match icon {
        NotificationIcon::Play => '\u{25b6}',
    }
}

/// `artist - title`, or just the title when the artist is unknown
fn track_text(artist: &str, title: &str) -> String {
    if artist.is_empty() {
        title.to_string()
    } else {
        format!("{artist} - {title}")
    }
}

/// `[#####...............]` filled in proportion to `percent`
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn progress_bar(percent: f64) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!(
        "[{}{}]",
        "#".repeat(filled),
        ".".repeat(BAR_WIDTH - filled.min(BAR_WIDTH))
    )
}
