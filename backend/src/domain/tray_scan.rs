//! Tray scan audit records.
//!
//! Every verification attempt is recorded, matched or not, so the scan trail
//! for a case reconstructs exactly what the rep scanned and when. Records are
//! append-only: they are created once and never mutated or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{CaseId, ScanResult, UserId};

/// Immutable audit record of one verification attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrayScan {
    /// Record identifier.
    pub id: Uuid,
    /// Case the scan was performed against.
    pub case_id: CaseId,
    /// Rep who performed the scan.
    pub scanned_by: UserId,
    /// Raw serial string produced by the scanner, trimmed.
    pub scanned_serial: String,
    /// Verdict of the verification attempt.
    pub result: ScanResult,
    /// When the scan happened.
    pub scanned_at: DateTime<Utc>,
}

/// Scan record awaiting persistence.
///
/// Built by the workflow service after verification; the repository assigns
/// no fields of its own, so the record round-trips unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTrayScan {
    pub id: Uuid,
    pub case_id: CaseId,
    pub scanned_by: UserId,
    pub scanned_serial: String,
    pub result: ScanResult,
    pub scanned_at: DateTime<Utc>,
}

impl NewTrayScan {
    /// Build a scan record for the given attempt.
    pub fn record(
        case_id: CaseId,
        scanned_by: UserId,
        scanned_serial: impl Into<String>,
        result: ScanResult,
        scanned_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            case_id,
            scanned_by,
            scanned_serial: scanned_serial.into().trim().to_owned(),
            result,
            scanned_at,
        }
    }
}

impl From<NewTrayScan> for TrayScan {
    fn from(value: NewTrayScan) -> Self {
        Self {
            id: value.id,
            case_id: value.case_id,
            scanned_by: value.scanned_by,
            scanned_serial: value.scanned_serial,
            result: value.result,
            scanned_at: value.scanned_at,
        }
    }
}
