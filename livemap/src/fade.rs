//! Opacity fading of stale unit markers.
//!
//! A unit marker loses `step` opacity for every full `interval` elapsed since
//! its last live position, down to `min_opacity`. The marker owns a
//! [`FadeTimer`] while it is attached to a surface; the owning layer polls it
//! and re-renders the marker whenever it fires.

#[cfg(test)]
#[path = "fade_test.rs"]
mod fade_test;

use time::{Duration, OffsetDateTime};

/// Parameters of the fade step function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeOptions {
    /// Length of one fade step, and the timer period.
    pub interval: Duration,
    /// Opacity lost per full interval.
    pub step: f64,
    /// Opacity of a fresh marker.
    pub default_opacity: f64,
    /// Floor below which opacity never drops.
    pub min_opacity: f64,
}

impl Default for FadeOptions {
    fn default() -> Self {
        Self { interval: Duration::seconds(15), step: 0.1, default_opacity: 1.0, min_opacity: 0.3 }
    }
}

/// Fill opacity after `elapsed` time. Negative elapsed time counts as zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn opacity(options: &FadeOptions, elapsed: Duration) -> f64 {
    let interval_ms = options.interval.whole_milliseconds();
    let elapsed_ms = elapsed.whole_milliseconds().max(0);
    let steps = if interval_ms > 0 { elapsed_ms / interval_ms } else { 0 };
    (options.default_opacity - options.step * steps as f64).max(options.min_opacity)
}

/// A periodic schedule owned by one mounted marker.
///
/// Created on attach, dropped on detach. It holds no external resources, so
/// dropping it is the complete cancellation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeTimer {
    interval: Duration,
    next_due: OffsetDateTime,
}

impl FadeTimer {
    #[must_use]
    pub fn start(now: OffsetDateTime, interval: Duration) -> Self {
        Self { interval, next_due: now + interval }
    }

    /// Returns true if the timer is due at `now`, and schedules the next tick.
    ///
    /// Missed ticks are coalesced into one.
    pub fn fire(&mut self, now: OffsetDateTime) -> bool {
        if now < self.next_due {
            return false;
        }
        self.next_due = now + self.interval;
        true
    }

    #[must_use]
    pub fn next_due(&self) -> OffsetDateTime {
        self.next_due
    }
}
