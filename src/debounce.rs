//! Activity debounce state machine.
//!
//! Bursts of activity inside one window count as a single rearm of the
//! inactivity timer:
//! - Rearm on the first signal, or once the window since the last rearm has passed
//! - Coalesce everything else into the current window

use std::time::Duration;

use tokio::time::Instant;
use tracing::trace;

/// Decision from the debounce check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceDecision {
    /// Rearm the inactivity timer.
    Rearm,
    /// Merge into the current window; the timer stays as is.
    Coalesce,
}

/// Debounce state for one monitor.
#[derive(Debug)]
pub struct ActivityDebounce {
    /// When the timer was last rearmed.
    last_rearm: Option<Instant>,

    /// Length of the coalescing window.
    window: Duration,

    /// Number of rearms decided so far.
    rearms: u64,
}

impl ActivityDebounce {
    /// Create a debounce with the given window. A zero window rearms on every signal.
    pub fn new(window: Duration) -> Self {
        Self {
            last_rearm: None,
            window,
            rearms: 0,
        }
    }

    /// Decide what an activity signal observed at `at` should do.
    ///
    /// A `Rearm` decision is recorded immediately.
    pub fn observe(&mut self, at: Instant) -> DebounceDecision {
        let Some(last) = self.last_rearm else {
            trace!("First activity, rearming");
            self.record_rearm(at);
            return DebounceDecision::Rearm;
        };

        let elapsed = at.saturating_duration_since(last);
        if elapsed >= self.window {
            trace!(
                "Elapsed {:?} >= window {:?}, rearming",
                elapsed, self.window
            );
            self.record_rearm(at);
            DebounceDecision::Rearm
        } else {
            trace!(
                "Coalesced: elapsed {:?} < window {:?}",
                elapsed, self.window
            );
            DebounceDecision::Coalesce
        }
    }

    /// Record a rearm that happened outside of `observe` (an explicit reset).
    pub fn record_rearm(&mut self, at: Instant) {
        self.last_rearm = Some(at);
        self.rearms += 1;
    }

    /// Total number of rearms.
    pub fn rearms(&self) -> u64 {
        self.rearms
    }
}
