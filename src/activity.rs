//! User activity sources.
//!
//! This module provides a generic abstraction for the stream of interaction
//! signals (pointer movement, key presses, clicks, scrolling) that keeps an
//! idle monitor from firing.

mod channel;
pub mod terminal;

use async_trait::async_trait;
pub use channel::{ActivitySender, ChannelSource};
use thiserror::Error;
use tokio::time::Instant;

/// Kind of user interaction that was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityKind {
    PointerMove,
    KeyPress,
    Click,
    Scroll,
}

impl ActivityKind {
    /// Short lowercase name, used in logs and `--print-events` output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PointerMove => "pointer-move",
            Self::KeyPress => "key-press",
            Self::Click => "click",
            Self::Scroll => "scroll",
        }
    }
}

/// A single activity signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityEvent {
    /// What kind of interaction happened.
    pub kind: ActivityKind,

    /// When it happened (monotonic, follows tokio's clock).
    pub at: Instant,
}

impl ActivityEvent {
    /// Create an event stamped with the current time.
    pub fn new(kind: ActivityKind) -> Self {
        Self {
            kind,
            at: Instant::now(),
        }
    }

    /// Create an event with an explicit timestamp.
    pub fn at(kind: ActivityKind, at: Instant) -> Self {
        Self { kind, at }
    }
}

/// Trait for activity sources.
#[async_trait]
pub trait ActivitySource: Send {
    /// Wait for the next activity signal.
    ///
    /// The idle monitor polls this inside `tokio::select!`, so implementations
    /// must be cancel safe: dropping the future must not lose a signal.
    async fn next_event(&mut self) -> Result<ActivityEvent, ActivityError>;
}

/// Errors that can occur while reading activity.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ActivityError {
    #[error("Activity source closed")]
    Closed,

    #[error("Activity source unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(ActivityKind::PointerMove.as_str(), "pointer-move");
        assert_eq!(ActivityKind::KeyPress.as_str(), "key-press");
        assert_eq!(ActivityKind::Click.as_str(), "click");
        assert_eq!(ActivityKind::Scroll.as_str(), "scroll");
    }

    #[tokio::test(start_paused = true)]
    async fn test_event_timestamps() {
        let before = Instant::now();
        tokio::time::advance(std::time::Duration::from_secs(3)).await;
        let event = ActivityEvent::new(ActivityKind::Click);
        assert!(event.at >= before + std::time::Duration::from_secs(3));

        let explicit = ActivityEvent::at(ActivityKind::Scroll, before);
        assert_eq!(explicit.at, before);
        assert_eq!(explicit.kind, ActivityKind::Scroll);
    }
}
