//! Platypush event stream over WebSocket.

use crate::config::PlatypushConfig;
use crate::error::{PlatypushError, Result};
use futures::StreamExt;
use playbar_core::{DurationExt, EventKind, PlaybackStatus, PlayerEvent, Track};
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use url::Url;

const LOG_TARGET: &str = "playbar::platypush::events";

/// Namespace of the music events we care about
pub const MUSIC_EVENT_PREFIX: &str = "platypush.message.event.music.";

/// Map a fully qualified Platypush event type to an [`EventKind`]
#[must_use]
pub fn event_kind(event_type: &str) -> Option<EventKind> {
    match event_type.strip_prefix(MUSIC_EVENT_PREFIX)? {
        "NewPlayingTrackEvent" => Some(EventKind::NewTrackStarted),
        "MusicPlayEvent" => Some(EventKind::PlayStarted),
        "MusicPauseEvent" => Some(EventKind::PlayPaused),
        "MusicStopEvent" => Some(EventKind::PlayStopped),
        "SeekChangeEvent" => Some(EventKind::SeekChanged),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    args: Option<EventArgs>,
}

#[derive(Debug, Deserialize)]
struct EventArgs {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    track: Option<serde_json::Value>,
    #[serde(default)]
    status: Option<serde_json::Value>,
}

/// Decode one WebSocket text frame.
///
/// Returns `Ok(None)` for frames that are not music events. Malformed track
/// or status payloads are dropped from the event rather than failing it.
///
/// # Errors
///
/// Returns an error if the frame is not a JSON message envelope.
pub fn parse_event(text: &str) -> Result<Option<PlayerEvent>> {
    let envelope: Envelope = serde_json::from_str(text)?;
    if envelope.kind != "event" {
        return Ok(None);
    }
    let Some(args) = envelope.args else {
        return Ok(None);
    };
    let Some(kind) = event_kind(&args.event_type) else {
        debug!(target: LOG_TARGET, "Ignoring event {}", args.event_type);
        return Ok(None);
    };

    let mut event = PlayerEvent::new(kind);
    if let Some(track) = args.track.filter(|v| !v.is_null()) {
        match serde_json::from_value::<Track>(track) {
            Ok(track) => event = event.with_track(track),
            Err(e) => warn!(target: LOG_TARGET, "Dropping malformed track in {}: {}", kind, e),
        }
    }
    if let Some(status) = args.status.filter(|v| !v.is_null()) {
        match serde_json::from_value::<PlaybackStatus>(status) {
            Ok(status) => event = event.with_status(status),
            Err(e) => warn!(target: LOG_TARGET, "Dropping malformed status in {}: {}", kind, e),
        }
    }

    Ok(Some(event))
}

/// How a connection ended
enum Disconnect {
    /// Cancelled or nobody is listening any more
    Stop,
    /// The server went away; try again
    Reconnect,
}

/// Connects to the event socket and forwards music events, reconnecting
/// with exponential backoff until cancelled
#[derive(Debug, Clone)]
pub struct EventListener {
    url: Url,
    max_backoff: Duration,
}

impl EventListener {
    /// Create a listener from the backend config.
    ///
    /// # Errors
    ///
    /// Returns an error if the WebSocket URL is invalid.
    pub fn new(config: &PlatypushConfig) -> Result<Self> {
        let mut url = Url::parse(&config.websocket_url).map_err(|source| {
            PlatypushError::InvalidUrl {
                url: config.websocket_url.clone(),
                source,
            }
        })?;
        if let Some(token) = config.token() {
            url.query_pairs_mut().append_pair("token", token);
        }

        Ok(Self {
            url,
            max_backoff: config.max_reconnect_delay(),
        })
    }

    /// Run until `cancel_token` fires or the receiving side is dropped
    pub async fn run(self, tx: mpsc::Sender<PlayerEvent>, cancel_token: CancellationToken) {
        info!(target: LOG_TARGET, "Starting Platypush event listener");

        let mut consecutive_errors: u32 = 0;

        loop {
            let outcome = tokio::select! {
                () = cancel_token.cancelled() => Ok(Disconnect::Stop),
                outcome = self.connect_and_forward(&tx, &cancel_token, &mut consecutive_errors) => outcome,
            };

            match outcome {
                Ok(Disconnect::Stop) => break,
                Ok(Disconnect::Reconnect) => {
                    info!(target: LOG_TARGET, "Event socket closed by server");
                }
                Err(e) => {
                    consecutive_errors = consecutive_errors.saturating_add(1);
                    warn!(target: LOG_TARGET, "Event socket error (attempt {}): {}", consecutive_errors, e);
                }
            }

            let backoff = reconnect_backoff(consecutive_errors, self.max_backoff);
            if consecutive_errors >= 5 {
                error!(
                    target: LOG_TARGET,
                    "Too many consecutive errors, waiting {} seconds",
                    backoff.as_secs()
                );
            }

            tokio::select! {
                () = cancel_token.cancelled() => break,
                () = tokio::time::sleep(backoff) => {}
            }
        }

        info!(target: LOG_TARGET, "Event listener shutting down gracefully");
    }

    async fn connect_and_forward(
        &self,
        tx: &mpsc::Sender<PlayerEvent>,
        cancel_token: &CancellationToken,
        consecutive_errors: &mut u32,
    ) -> Result<Disconnect> {
        debug!(target: LOG_TARGET, "Connecting to {}", self.url);
        let (mut ws, _) = connect_async(self.url.as_str()).await?;
        *consecutive_errors = 0;
        info!(target: LOG_TARGET, "Connected to Platypush event socket");

        loop {
            let next = tokio::select! {
                () = cancel_token.cancelled() => None,
                message = ws.next() => Some(message),
            };

            let Some(message) = next else {
                let _ = ws.close(None).await;
                return Ok(Disconnect::Stop);
            };

            match message {
                Some(Ok(Message::Text(text))) => match parse_event(text.as_str()) {
                    Ok(Some(event)) => {
                        debug!(target: LOG_TARGET, "Received {} event", event.kind);
                        if tx.send(event).await.is_err() {
                            let _ = ws.close(None).await;
                            return Ok(Disconnect::Stop);
                        }
                    }
                    Ok(None) => {}
                    Err(e) => warn!(target: LOG_TARGET, "Ignoring unreadable frame: {}", e),
                },
                Some(Ok(Message::Close(frame))) => {
                    debug!(target: LOG_TARGET, "Close frame: {:?}", frame);
                    return Ok(Disconnect::Reconnect);
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(Disconnect::Reconnect),
            }
        }
    }
}

/// Exponential backoff: 100ms * 2^errors, capped at `max_backoff`.
/// A clean disconnect (zero errors) still waits the base delay.
fn reconnect_backoff(consecutive_errors: u32, max_backoff: Duration) -> Duration {
    let backoff_ms = 100_u64.saturating_mul(2_u64.saturating_pow(consecutive_errors.min(10)));
    Duration::from_millis(backoff_ms.min(max_backoff.as_millis_u64()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use playbar_core::PlayerState;

    #[test]
    fn test_event_kind_mapping() {
        assert_eq!(
            event_kind("platypush.message.event.music.NewPlayingTrackEvent"),
            Some(EventKind::NewTrackStarted)
        );
        assert_eq!(
            event_kind("platypush.message.event.music.MusicPlayEvent"),
            Some(EventKind::PlayStarted)
        );
        assert_eq!(
            event_kind("platypush.message.event.music.MusicPauseEvent"),
            Some(EventKind::PlayPaused)
        );
        assert_eq!(
            event_kind("platypush.message.event.music.MusicStopEvent"),
            Some(EventKind::PlayStopped)
        );
        assert_eq!(
            event_kind("platypush.message.event.music.SeekChangeEvent"),
            Some(EventKind::SeekChanged)
        );
        assert_eq!(event_kind("platypush.message.event.music.VolumeChangeEvent"), None);
        assert_eq!(event_kind("platypush.message.event.sensor.SensorDataChangeEvent"), None);
    }

    #[test]
    fn test_parse_new_track_event() {
        let frame = r#"{
            "type": "event",
            "target": "host",
            "origin": "host",
            "args": {
                "type": "platypush.message.event.music.NewPlayingTrackEvent",
                "plugin_name": "music.mpd",
                "track": {"artist": "A", "title": "T", "time": "200"},
                "status": {"state": "play", "elapsed": "0.000"}
            }
        }"#;

        let event = parse_event(frame).expect("valid frame");
        assert_eq!(
            event,
            Some(
                PlayerEvent::new(EventKind::NewTrackStarted)
                    .with_track(Track::new(Some("A"), Some("T"), Some(200)))
                    .with_status(PlaybackStatus::new(PlayerState::Playing, Some(0)))
            )
        );
    }

    #[test]
    fn test_parse_track_with_time_and_duration() {
        let frame = r#"{"type": "event", "args": {
            "type": "platypush.message.event.music.NewPlayingTrackEvent",
            "track": {"artist": "A", "title": "T", "time": "200", "duration": "200.123"},
            "status": {"state": "play", "elapsed": "3.2", "duration": "200.123"}
        }}"#;

        let event = parse_event(frame)
            .expect("valid frame")
            .expect("music event");
        assert_eq!(event.kind, EventKind::NewTrackStarted);
        assert_eq!(event.track, Some(Track::new(Some("A"), Some("T"), Some(200))));
        assert_eq!(
            event.status,
            Some(PlaybackStatus::new(PlayerState::Playing, Some(3)))
        );
    }

    #[test]
    fn test_parse_stop_event_with_empty_track() {
        let frame = r#"{"type": "event", "args": {
            "type": "platypush.message.event.music.MusicStopEvent",
            "track": {},
            "status": {"state": "stop"}
        }}"#;

        let event = parse_event(frame).ok().flatten();
        assert!(matches!(
            event,
            Some(ref e) if e.kind == EventKind::PlayStopped
                && e.track == Some(Track::default())
                && e.status == Some(PlaybackStatus::state_only(PlayerState::Stopped))
        ));
    }

    #[test]
    fn test_parse_drops_malformed_status() {
        let frame = r#"{"type": "event", "args": {
            "type": "platypush.message.event.music.MusicPauseEvent",
            "track": {"title": "T"},
            "status": {"state": "buffering"}
        }}"#;

        let event = parse_event(frame).ok().flatten();
        assert!(matches!(
            event,
            Some(ref e) if e.kind == EventKind::PlayPaused && e.status.is_none() && e.track.is_some()
        ));
    }

    #[test]
    fn test_parse_ignores_other_messages() {
        assert!(matches!(
            parse_event(r#"{"type": "response", "response": {"output": null}}"#),
            Ok(None)
        ));
        assert!(matches!(
            parse_event(r#"{"type": "event", "args": {"type": "platypush.message.event.ping.PingEvent"}}"#),
            Ok(None)
        ));
        assert!(matches!(parse_event("not json"), Err(PlatypushError::Json(_))));
    }

    #[test]
    fn test_listener_appends_token() {
        let config = PlatypushConfig {
            token: Some("secret".into()),
            ..PlatypushConfig::default()
        };
        let listener = EventListener::new(&config);
        assert!(matches!(
            listener,
            Ok(ref l) if l.url.as_str() == "ws://localhost:8009/?token=secret"
        ));
    }

    #[test]
    fn test_reconnect_backoff() {
        let cap = Duration::from_secs(30);
        assert_eq!(reconnect_backoff(0, cap), Duration::from_millis(100));
        assert_eq!(reconnect_backoff(3, cap), Duration::from_millis(800));
        assert_eq!(reconnect_backoff(20, cap), cap);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_when_cancelled() {
        let config = PlatypushConfig {
            websocket_url: "ws://127.0.0.1:9".into(),
            ..PlatypushConfig::default()
        };
        let listener = EventListener::new(&config).expect("valid listener config");

        let (tx, _rx) = mpsc::channel(1);
        let token = CancellationToken::new();
        token.cancel();

        listener.run(tx, token).await;
    }
}
