//! Idle detection module.
//!
//! Provides the [`IdleTimer`] abstraction and its tokio-backed implementation,
//! [`IdleMonitor`], which watches an activity source and fires a one-shot
//! notification after a configurable quiet period.

mod monitor;

use std::time::Duration;

use tokio::time::Instant;

use crate::config::ConfigError;

pub use monitor::IdleMonitor;

/// Upper bound on the idle time; keeps deadline arithmetic far from overflow.
pub const MAX_IDLE_TIME: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Something that tracks user inactivity.
///
/// Starting happens at construction and the timeout notification is the
/// callback handed over at that point, so the trait only covers what a
/// consumer needs afterwards.
pub trait IdleTimer: Send + Sync {
    /// Whether the user is currently considered idle.
    fn is_idle(&self) -> bool;

    /// Return to the active state and rearm the timeout window.
    fn reset(&self);

    /// Time of the last observed activity (or reset).
    fn last_active_time(&self) -> Instant;

    /// Time left before the user is considered idle. Zero while idle.
    fn remaining_time(&self) -> Duration;
}

/// Validated idle monitor settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    idle_time: Duration,
    debounce: Duration,
}

impl MonitorConfig {
    /// Default quiet period before the user is idle.
    pub const DEFAULT_IDLE_TIME: Duration = Duration::from_secs(1);

    /// Default activity debounce window.
    pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

    /// Create a config, rejecting a zero or oversized idle time.
    pub fn new(idle_time: Duration, debounce: Duration) -> Result<Self, ConfigError> {
        if idle_time.is_zero() {
            return Err(ConfigError::NonPositiveIdleTime(0.0));
        }
        if idle_time > MAX_IDLE_TIME {
            return Err(ConfigError::IdleTimeTooLarge(idle_time.as_secs_f64()));
        }
        Ok(Self {
            idle_time,
            debounce,
        })
    }

    /// Create a config from the numeric form used in config files.
    pub fn from_secs_f64(idle_time_seconds: f64, debounce_ms: u64) -> Result<Self, ConfigError> {
        if !idle_time_seconds.is_finite() {
            return Err(ConfigError::NonFiniteIdleTime);
        }
        if idle_time_seconds <= 0.0 {
            return Err(ConfigError::NonPositiveIdleTime(idle_time_seconds));
        }
        let idle_time = Duration::try_from_secs_f64(idle_time_seconds)
            .map_err(|_| ConfigError::IdleTimeTooLarge(idle_time_seconds))?;

        Self::new(idle_time, Duration::from_millis(debounce_ms))
    }

    /// Quiet period before the user is idle.
    pub fn idle_time(&self) -> Duration {
        self.idle_time
    }

    /// Activity debounce window.
    pub fn debounce(&self) -> Duration {
        self.debounce
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            idle_time: Self::DEFAULT_IDLE_TIME,
            debounce: Self::DEFAULT_DEBOUNCE,
        }
    }
}
