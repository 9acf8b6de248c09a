//! Case lifecycle events broadcast to connected clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{CaseId, CheckInStatus, ScanResult, UserId, WorkflowStatus};

/// What happened to a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CaseEventKind {
    /// A case was created and assigned to a rep.
    Created { assigned_rep_id: UserId },
    /// A scan was submitted against the case.
    ScanRecorded {
        result: ScanResult,
        check_in_status: CheckInStatus,
    },
    /// The workflow moved to a new stage.
    StatusChanged {
        from: WorkflowStatus,
        to: WorkflowStatus,
    },
    /// Administrative edits touched the case outside the workflow.
    AdminUpdated,
}

/// One observable change to a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseEvent {
    /// Case the event concerns.
    pub case_id: CaseId,
    /// What changed.
    #[serde(flatten)]
    pub kind: CaseEventKind,
    /// When the change was observed.
    pub occurred_at: DateTime<Utc>,
}

impl CaseEvent {
    pub fn new(case_id: CaseId, kind: CaseEventKind, occurred_at: DateTime<Utc>) -> Self {
        Self {
            case_id,
            kind,
            occurred_at,
        }
    }
}
