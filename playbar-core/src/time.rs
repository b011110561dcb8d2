//! Time display and conversion utilities.
//!
//! Players report seconds in loose shapes (MPD sends `"200"` or `"50.123"`
//! as strings, other backends send plain numbers). Everything here funnels
//! those into whole seconds and renders them as `m:ss`.

use serde::{Deserialize, Deserializer};
use std::time::Duration;

/// Label shown when a time is unknown or zero.
pub const UNKNOWN_TIME: &str = "-:--";

/// Render a seconds count as `"<minutes>:<ss>"`.
///
/// Absent and zero values both render as [`UNKNOWN_TIME`].
///
/// ```
/// use playbar_core::time::format_time;
/// assert_eq!(format_time(Some(65)), "1:05");
/// assert_eq!(format_time(Some(0)), "-:--");
/// ```
#[must_use]
pub fn format_time(seconds: Option<u32>) -> String {
    match seconds {
        Some(secs) if secs > 0 => format!("{}:{:02}", secs / 60, secs % 60),
        _ => UNKNOWN_TIME.to_string(),
    }
}

/// Parse the leading integer of a string, ignoring any fractional part or
/// trailing garbage (`"50.9"` -> 50, `"12abc"` -> 12).
///
/// Returns `None` when there are no leading digits or the value is negative.
/// Values beyond `u32::MAX` saturate.
#[must_use]
pub fn parse_seconds(raw: &str) -> Option<u32> {
    let trimmed = raw.trim_start();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits_end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    let digits = &unsigned[..digits_end];

    if digits.is_empty() {
        return None;
    }

    Some(
        digits
            .parse::<u64>()
            .map_or(u32::MAX, |secs| u32::try_from(secs).unwrap_or(u32::MAX)),
    )
}

/// Truncate a floating point seconds value to whole seconds.
///
/// Non-finite and negative values are treated as unknown.
#[must_use]
pub fn seconds_from_f64(secs: f64) -> Option<u32> {
    if !secs.is_finite() || secs < 0.0 {
        return None;
    }
    if secs >= f64::from(u32::MAX) {
        return Some(u32::MAX);
    }
    // Range checked above
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Some(secs.trunc() as u32)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSeconds {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Text(String),
}

impl RawSeconds {
    fn into_seconds(self) -> Option<u32> {
        match self {
            Self::Unsigned(secs) => Some(u32::try_from(secs).unwrap_or(u32::MAX)),
            Self::Signed(_) => None,
            Self::Float(secs) => seconds_from_f64(secs),
            Self::Text(text) => parse_seconds(&text),
        }
    }
}

/// Serde helper for optional seconds fields sent as numbers, numeric strings
/// or `null`. Anything unparseable becomes `None` rather than an error.
///
/// # Errors
///
/// Only fails if the underlying deserializer itself fails.
pub fn deserialize_seconds<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .and_then(|value| RawSeconds::deserialize(value).ok())
        .and_then(RawSeconds::into_seconds))
}

/// Extension trait for safe Duration conversions.
pub trait DurationExt {
    /// Convert duration to milliseconds as u64, saturating at `u64::MAX`.
    fn as_millis_u64(&self) -> u64;
}

impl DurationExt for Duration {
    fn as_millis_u64(&self) -> u64 {
        u64::try_from(self.as_millis()).unwrap_or(u64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct SecondsField {
        #[serde(default, deserialize_with = "deserialize_seconds")]
        secs: Option<u32>,
    }

    fn seconds_of(json: &str) -> Option<u32> {
        serde_json::from_str::<SecondsField>(json)
            .expect("deserialize_seconds never rejects a value")
            .secs
    }

    #[test]
    fn test_format_time_unknown() {
        assert_eq!(format_time(None), "-:--");
        assert_eq!(format_time(Some(0)), "-:--");
    }

    #[test]
    fn test_format_time_pads_seconds() {
        assert_eq!(format_time(Some(65)), "1:05");
        assert_eq!(format_time(Some(9)), "0:09");
        assert_eq!(format_time(Some(50)), "0:50");
    }

    #[test]
    fn test_format_time_whole_minutes() {
        assert_eq!(format_time(Some(600)), "10:00");
        assert_eq!(format_time(Some(200)), "3:20");
    }

    #[test]
    fn test_format_time_long_tracks_keep_minutes() {
        assert_eq!(format_time(Some(3725)), "62:05");
    }

    #[test]
    fn test_parse_seconds_integer_prefix() {
        assert_eq!(parse_seconds("200"), Some(200));
        assert_eq!(parse_seconds("50.913"), Some(50));
        assert_eq!(parse_seconds("  12abc"), Some(12));
        assert_eq!(parse_seconds("+7"), Some(7));
    }

    #[test]
    fn test_parse_seconds_rejects_garbage() {
        assert_eq!(parse_seconds(""), None);
        assert_eq!(parse_seconds("abc"), None);
        assert_eq!(parse_seconds("-5"), None);
        assert_eq!(parse_seconds(".5"), None);
    }

    #[test]
    fn test_parse_seconds_saturates() {
        assert_eq!(parse_seconds("99999999999"), Some(u32::MAX));
    }

    #[test]
    fn test_seconds_from_f64() {
        assert_eq!(seconds_from_f64(50.9), Some(50));
        assert_eq!(seconds_from_f64(-1.0), None);
        assert_eq!(seconds_from_f64(f64::NAN), None);
    }

    #[test]
    fn test_deserialize_seconds_shapes() {
        assert_eq!(seconds_of(r#"{"secs": 200}"#), Some(200));
        assert_eq!(seconds_of(r#"{"secs": "200"}"#), Some(200));
        assert_eq!(seconds_of(r#"{"secs": 12.7}"#), Some(12));
        assert_eq!(seconds_of(r#"{"secs": "n/a"}"#), None);
        assert_eq!(seconds_of(r#"{"secs": -3}"#), None);
        assert_eq!(seconds_of(r#"{"secs": null}"#), None);
        assert_eq!(seconds_of("{}"), None);
    }

    #[test]
    fn test_as_millis_u64() {
        assert_eq!(Duration::from_millis(1234).as_millis_u64(), 1234);
    }
}
