//! In-process activity source backed by a tokio mpsc channel.
//!
//! Embedders (and the terminal binary) push signals through an
//! [`ActivitySender`]; the monitor reads them from the [`ChannelSource`].

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::trace;

use super::{ActivityError, ActivityEvent, ActivityKind, ActivitySource};

/// Sending half: reports activity to a monitor.
#[derive(Debug, Clone)]
pub struct ActivitySender {
    tx: mpsc::Sender<ActivityEvent>,
}

impl ActivitySender {
    /// Report an activity of the given kind, stamped now.
    pub async fn signal(&self, kind: ActivityKind) -> Result<(), ActivityError> {
        self.send(ActivityEvent::new(kind)).await
    }

    /// Report a pre-built activity event.
    pub async fn send(&self, event: ActivityEvent) -> Result<(), ActivityError> {
        trace!("Activity: {} at {:?}", event.kind.as_str(), event.at);
        self.tx.send(event).await.map_err(|_| ActivityError::Closed)
    }
}

/// Receiving half, handed to the idle monitor.
#[derive(Debug)]
pub struct ChannelSource {
    rx: mpsc::Receiver<ActivityEvent>,
}

impl ChannelSource {
    /// Create a connected sender/source pair with the given buffer size.
    pub fn new(capacity: usize) -> (ActivitySender, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (ActivitySender { tx }, Self { rx })
    }
}

#[async_trait]
impl ActivitySource for ChannelSource {
    async fn next_event(&mut self) -> Result<ActivityEvent, ActivityError> {
        // mpsc::Receiver::recv is cancel safe
        self.rx.recv().await.ok_or(ActivityError::Closed)
    }
}
