//! Tokio broadcast implementation of the case event bus.

use tokio::sync::broadcast;

use crate::domain::CaseEvent;
use crate::domain::ports::CaseEventBus;

const DEFAULT_CAPACITY: usize = 256;

/// Fan-out bus backed by a tokio broadcast channel.
///
/// Slow subscribers that fall more than the channel capacity behind lose the
/// oldest events; receivers observe the gap as a `Lagged` error and are
/// expected to resynchronise by re-reading the case list.
#[derive(Debug, Clone)]
pub struct BroadcastCaseEventBus {
    sender: broadcast::Sender<CaseEvent>,
}

impl BroadcastCaseEventBus {
    /// Create a bus with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a bus retaining up to `capacity` undelivered events per
    /// subscriber.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }
}

impl Default for BroadcastCaseEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl CaseEventBus for BroadcastCaseEventBus {
    fn publish(&self, event: CaseEvent) {
        // Send only fails when no subscriber exists, which is not an error
        // for a live-update channel.
        let _ = self.sender.send(event);
    }

    fn subscribe(&self) -> broadcast::Receiver<CaseEvent> {
        self.sender.subscribe()
    }
}
