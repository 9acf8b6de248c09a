//! Port for fan-out of case lifecycle events to live subscribers.

use tokio::sync::broadcast;

use crate::domain::CaseEvent;

/// Port for publishing case events and subscribing to the live stream.
///
/// Publishing is fire-and-forget: events exist to keep connected clients
/// fresh, and a stream with no subscribers simply drops them.
#[cfg_attr(test, mockall::automock)]
pub trait CaseEventBus: Send + Sync {
    /// Publish an event to every current subscriber.
    fn publish(&self, event: CaseEvent);

    /// Subscribe to events published after this call.
    fn subscribe(&self) -> broadcast::Receiver<CaseEvent>;
}

/// Fixture implementation that fans out over an in-process channel.
#[derive(Debug, Clone)]
pub struct FixtureCaseEventBus {
    sender: broadcast::Sender<CaseEvent>,
}

impl Default for FixtureCaseEventBus {
    fn default() -> Self {
        let (sender, _receiver) = broadcast::channel(16);
        Self { sender }
    }
}

impl CaseEventBus for FixtureCaseEventBus {
    fn publish(&self, event: CaseEvent) {
        let _ = self.sender.send(event);
    }

    fn subscribe(&self) -> broadcast::Receiver<CaseEvent> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use chrono::Utc;

    use super::*;
    use crate::domain::{CaseEventKind, CaseId};

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let bus = FixtureCaseEventBus::default();
        let mut receiver = bus.subscribe();
        let event = CaseEvent::new(CaseId::random(), CaseEventKind::AdminUpdated, Utc::now());
        bus.publish(event.clone());
        let received = receiver.recv().await.expect("event delivered");
        assert_eq!(received, event);
    }

    #[test]
    fn publishing_without_subscribers_is_harmless() {
        let bus = FixtureCaseEventBus::default();
        bus.publish(CaseEvent::new(
            CaseId::random(),
            CaseEventKind::AdminUpdated,
            Utc::now(),
        ));
    }
}
