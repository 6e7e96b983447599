//! # Subscription layer configuration.
//!
//! Provides [`MonitorConfig`] centralized settings for the event-distribution
//! layer, passed to [`Monitor::new`](crate::Monitor::new).
//!
//! ## Sentinel values
//! - `reap_interval = 0s` → no periodic sweep; the idle reaper wakes only when
//!   a listener release signals it.

use std::time::Duration;

/// Configuration for the event-distribution layer.
///
/// ## Field semantics
/// - `reap_interval`: how often each scope's idle reaper re-checks its
///   listener list without being signalled (`0s` = signal-only, no timer).
///   Releases always wake the reaper directly, so the periodic sweep is a
///   safety net rather than the primary cleanup path.
#[derive(Clone, Debug)]
pub struct MonitorConfig {
    /// Periodic wake interval for each scope's idle reaper.
    ///
    /// - `Duration::ZERO` = signal-only (wake on release, never on a timer)
    /// - `> 0` = additionally re-check every `reap_interval`
    pub reap_interval: Duration,
}

impl MonitorConfig {
    /// Returns the periodic reap tick as an `Option`.
    ///
    /// - `None` → signal-only reaping
    /// - `Some(d)` → re-check every `d`
    #[inline]
    pub fn reap_tick(&self) -> Option<Duration> {
        if self.reap_interval == Duration::ZERO {
            None
        } else {
            Some(self.reap_interval)
        }
    }
}

impl Default for MonitorConfig {
    /// Default configuration:
    ///
    /// - `reap_interval = 60s`
    fn default() -> Self {
        Self {
            reap_interval: Duration::from_secs(60),
        }
    }
}
