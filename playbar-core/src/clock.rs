//! Locally advancing elapsed-time estimate.
//!
//! The backend only reports the elapsed position when something happens
//! (play, pause, seek, new track). Between those reports the
//! [`ClockEstimator`] advances its own counter once per tick so the display
//! keeps moving.
//!
//! # Invariants
//!
//! - At most one tick is live: the ticker lives in an `Option` that every
//!   resync replaces.
//! - When the total is known, the elapsed value never exceeds it and the
//!   ratio never exceeds 100%.
//! - An unknown or zero total yields a 0% ratio.

use crate::time::format_time;
use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Default period between local ticks
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Snapshot of the clock to publish to a view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockReading {
    /// Elapsed seconds, clamped to the total when known
    pub elapsed: u32,
    /// Total seconds, `None` when unknown
    pub total: Option<u32>,
    /// Progress bar fill in percent (`0.0..=100.0`)
    pub percent: f64,
}

impl ClockReading {
    /// Formatted elapsed time
    #[must_use]
    pub fn elapsed_label(&self) -> String {
        format_time(Some(self.elapsed))
    }

    /// Formatted total time
    #[must_use]
    pub fn total_label(&self) -> String {
        format_time(self.total)
    }
}

/// Progress ratio as a percentage, `min(elapsed / total, 1) * 100`.
///
/// Returns `0.0` when the total is unknown or zero.
#[must_use]
pub fn progress_percent(elapsed: u32, total: Option<u32>) -> f64 {
    match total {
        Some(total) if total > 0 => 100.0 * (f64::from(elapsed) / f64::from(total)).min(1.0),
        _ => 0.0,
    }
}

/// Elapsed-time estimator with a single cancellable tick
#[derive(Debug)]
pub struct ClockEstimator {
    elapsed: u32,
    total: Option<u32>,
    ticker: Option<Interval>,
    period: Duration,
}

impl ClockEstimator {
    /// Create an estimator ticking once per second
    #[must_use]
    pub const fn new() -> Self {
        Self::with_period(TICK_PERIOD)
    }

    /// Create an estimator with a custom tick period.
    ///
    /// A zero period is replaced with [`TICK_PERIOD`].
    #[must_use]
    pub const fn with_period(period: Duration) -> Self {
        let period = if period.is_zero() { TICK_PERIOD } else { period };
        Self {
            elapsed: 0,
            total: None,
            ticker: None,
            period,
        }
    }

    /// Record the track duration used as the clamp ceiling.
    ///
    /// Zero is treated as unknown. The running tick is left alone.
    pub fn set_total(&mut self, total: Option<u32>) {
        self.total = total.filter(|&t| t > 0);
    }

    /// Resync to an authoritative elapsed value.
    ///
    /// Cancels the running tick, sets the counter, and starts a fresh tick
    /// whose first firing is one period from now. The returned reading is
    /// meant to be published immediately.
    pub fn set_elapsed(&mut self, elapsed: u32) -> ClockReading {
        self.cancel();
        self.elapsed = self.clamp(elapsed);

        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
        self.ticker = Some(ticker);

        self.reading()
    }

    /// Wait for the next tick and advance the counter by one second.
    ///
    /// Never completes while no tick is running. Cancel-safe: the counter
    /// only moves after the tick has fired.
    pub async fn tick(&mut self) -> ClockReading {
        if let Some(ticker) = self.ticker.as_mut() {
            ticker.tick().await;
        } else {
            std::future::pending::<()>().await;
        }

        self.elapsed = self.clamp(self.elapsed.saturating_add(1));
        self.reading()
    }

    /// Stop the running tick. Returns whether one was live.
    pub fn cancel(&mut self) -> bool {
        self.ticker.take().is_some()
    }

    /// Whether a tick is currently scheduled
    #[must_use]
    pub const fn is_ticking(&self) -> bool {
        self.ticker.is_some()
    }

    /// Current reading without advancing
    #[must_use]
    pub fn reading(&self) -> ClockReading {
        let elapsed = self.clamp(self.elapsed);
        ClockReading {
            elapsed,
            total: self.total,
            percent: progress_percent(elapsed, self.total),
        }
    }

    /// Tick period
    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }

    fn clamp(&self, elapsed: u32) -> u32 {
        self.total.map_or(elapsed, |total| elapsed.min(total))
    }
}

impl Default for ClockEstimator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{advance, timeout};

    fn assert_percent(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}%, got {actual}%"
        );
    }

    #[test]
    fn test_progress_percent() {
        assert_percent(progress_percent(50, Some(200)), 25.0);
        assert_percent(progress_percent(51, Some(200)), 25.5);
        assert_percent(progress_percent(300, Some(200)), 100.0);
    }

    #[test]
    fn test_progress_percent_unknown_total() {
        assert_percent(progress_percent(50, None), 0.0);
        assert_percent(progress_percent(50, Some(0)), 0.0);
    }

    #[test]
    fn test_set_total_zero_is_unknown() {
        let mut clock = ClockEstimator::new();
        clock.set_total(Some(0));
        assert_eq!(clock.reading().total, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_elapsed_publishes_immediately() {
        let mut clock = ClockEstimator::new();
        clock.set_total(Some(200));

        let reading = clock.set_elapsed(50);

        assert_eq!(reading.elapsed, 50);
        assert_percent(reading.percent, 25.0);
        assert_eq!(reading.elapsed_label(), "0:50");
        assert_eq!(reading.total_label(), "3:20");
        assert!(clock.is_ticking());
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_advances_one_second() {
        let mut clock = ClockEstimator::new();
        clock.set_total(Some(200));
        clock.set_elapsed(50);

        advance(Duration::from_secs(1)).await;
        let reading = clock.tick().await;

        assert_eq!(reading.elapsed, 51);
        assert_percent(reading.percent, 25.5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_waits_a_full_period() {
        let mut clock = ClockEstimator::new();
        clock.set_elapsed(10);

        let early = timeout(Duration::from_millis(900), clock.tick()).await;
        assert!(early.is_err());
        assert_eq!(clock.reading().elapsed, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resync_leaves_single_tick() {
        let mut clock = ClockEstimator::new();
        clock.set_total(Some(200));
        clock.set_elapsed(50);
        advance(Duration::from_millis(500)).await;
        clock.set_elapsed(70);

        // The first resync's tick would have fired at +1s; only the second
        // one (due at +1.5s) may fire.
        let stale = timeout(Duration::from_millis(900), clock.tick()).await;
        assert!(stale.is_err());

        let reading = clock.tick().await;
        assert_eq!(reading.elapsed, 71);

        let next = timeout(Duration::from_millis(500), clock.tick()).await;
        assert!(next.is_err());
        assert_eq!(clock.reading().elapsed, 71);
    }

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_clamps_at_total() {
        let mut clock = ClockEstimator::new();
        clock.set_total(Some(60));
        clock.set_elapsed(59);

        advance(Duration::from_secs(1)).await;
        assert_eq!(clock.tick().await.elapsed, 60);
        advance(Duration::from_secs(1)).await;
        let reading = clock.tick().await;

        assert_eq!(reading.elapsed, 60);
        assert_percent(reading.percent, 100.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_elapsed_beyond_total_is_clamped() {
        let mut clock = ClockEstimator::new();
        clock.set_total(Some(100));
        let reading = clock.set_elapsed(250);
        assert_eq!(reading.elapsed, 100);
        assert_percent(reading.percent, 100.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_total_keeps_counting() {
        let mut clock = ClockEstimator::new();
        clock.set_elapsed(5);

        advance(Duration::from_secs(1)).await;
        let reading = clock.tick().await;

        assert_eq!(reading.elapsed, 6);
        assert_percent(reading.percent, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_ticking() {
        let mut clock = ClockEstimator::new();
        clock.set_elapsed(5);

        assert!(clock.cancel());
        assert!(!clock.cancel());
        assert!(!clock.is_ticking());

        let waited = timeout(Duration::from_secs(5), clock.tick()).await;
        assert!(waited.is_err());
        assert_eq!(clock.reading().elapsed, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_period() {
        let mut clock = ClockEstimator::with_period(Duration::from_millis(250));
        clock.set_elapsed(0);

        advance(Duration::from_millis(250)).await;
        assert_eq!(clock.tick().await.elapsed, 1);
        assert_eq!(clock.period(), Duration::from_millis(250));
    }

    #[test]
    fn test_zero_period_falls_back() {
        let clock = ClockEstimator::with_period(Duration::ZERO);
        assert_eq!(clock.period(), TICK_PERIOD);
    }
}
