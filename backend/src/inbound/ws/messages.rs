//! Wire-level message definitions for the WebSocket feed.
//!
//! Domain events are wrapped in these payloads before being serialised to
//! JSON and sent to connected dashboards.

use serde::Serialize;

use crate::domain::CaseEvent;

/// Outbound frame sent to feed subscribers.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedMessage {
    /// A case changed; the payload carries the event detail.
    CaseEvent {
        #[serde(flatten)]
        event: CaseEvent,
    },
    /// The subscriber fell behind the broadcast channel and `missed` events
    /// were dropped. Clients should re-read the case list to resynchronise.
    Lagged { missed: u64 },
}

impl From<CaseEvent> for FeedMessage {
    fn from(event: CaseEvent) -> Self {
        Self::CaseEvent { event }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use uuid::Uuid;

    use super::*;
    use crate::domain::{CaseEventKind, CaseId, WorkflowStatus};

    #[test]
    fn serialises_a_status_change() {
        let occurred_at = Utc
            .with_ymd_and_hms(2026, 3, 14, 9, 26, 53)
            .single()
            .expect("valid timestamp");
        let event = CaseEvent::new(
            CaseId::from_uuid(Uuid::nil()),
            CaseEventKind::StatusChanged {
                from: WorkflowStatus::CheckedIn,
                to: WorkflowStatus::InvoiceSubmitted,
            },
            occurred_at,
        );

        let message = FeedMessage::from(event);
        let serialised = serde_json::to_value(&message).expect("serialises");
        assert_eq!(serialised["type"], "case_event");
        assert_eq!(serialised["kind"], "status_changed");
        assert_eq!(serialised["from"], "checked_in");
        assert_eq!(serialised["to"], "invoice_submitted");
        assert_eq!(
            serialised["caseId"],
            json!("00000000-0000-0000-0000-000000000000")
        );
    }

    #[test]
    fn serialises_a_lag_marker() {
        let serialised =
            serde_json::to_value(FeedMessage::Lagged { missed: 7 }).expect("serialises");
        assert_eq!(serialised["type"], "lagged");
        assert_eq!(serialised["missed"], 7);
    }
}
