//! Progress reporting and cancellation for long scans.
//!
//! Paging through a long run of identical rows and searching a large device both run on
//! the UI thread. They report their position through a [`ScanMonitor`] at most once per
//! [`PROGRESS_INTERVAL`] and stop when the monitor says the user cancelled.

use std::time::{Duration, Instant};

/// Minimum time between progress reports.
pub const PROGRESS_INTERVAL: Duration = Duration::from_millis(50);

/// Observer for a long-running scan.
pub trait ScanMonitor {
    /// The scan has reached `offset`.
    fn progress(&mut self, _offset: u64) {}

    /// True if the user asked to stop.
    fn cancelled(&mut self) -> bool {
        false
    }
}

/// A monitor that never reports and never cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unmonitored;

impl ScanMonitor for Unmonitored {}

/// Rate limiter for progress reports.
#[derive(Debug, Clone, Copy)]
pub struct Throttle {
    last: Instant,
    interval: Duration,
}

impl Throttle {
    /// A throttle whose first tick fires one `interval` from now.
    pub fn new(interval: Duration) -> Self {
        Self {
            last: Instant::now(),
            interval,
        }
    }

    /// True at most once per interval.
    pub fn ready(&mut self) -> bool {
        let now = Instant::now();
        if now.duration_since(self.last) >= self.interval {
            self.last = now;
            true
        } else {
            false
        }
    }
}
