//! Case aggregate: one scheduled tray delivery between a rep, hospital, and
//! doctor.
//!
//! The workflow status is a strictly ordered projection of the case's
//! lifecycle. It only moves forward through the state machine services; the
//! sole sanctioned way to regress it is an admin override, which still flows
//! through the same repository contract so the audit timestamps stay honest.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::UserId;

/// Validation errors raised by case constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaseValidationError {
    /// A required free-text field was empty once trimmed.
    #[error("{field} must not be empty")]
    EmptyField {
        /// Name of the offending field.
        field: &'static str,
    },
    /// Tray serial was empty or padded with whitespace.
    #[error("tray serial must be non-empty without surrounding whitespace")]
    InvalidTraySerial,
    /// Workflow/check-in status combination violates the mismatch invariant.
    #[error("a mismatched check-in can only coexist with pending_checkin")]
    MismatchOutsidePendingCheckin,
    /// Status string did not name a known workflow status.
    #[error("unknown workflow status")]
    UnknownWorkflowStatus,
    /// Status string did not name a known check-in status.
    #[error("unknown check-in status")]
    UnknownCheckInStatus,
}

/// Stable case identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseId(Uuid);

impl CaseId {
    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CaseId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Canonical identifier of a physical equipment tray.
///
/// Comparison against scanned input is exact and case-sensitive; the scanned
/// side is trimmed before the comparison, the assigned side is validated to
/// carry no padding at all.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TraySerial(String);

impl TraySerial {
    /// Validate and construct a serial.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::TraySerial;
    ///
    /// let serial = TraySerial::new("TR-2024-001").expect("valid serial");
    /// assert_eq!(serial.as_str(), "TR-2024-001");
    /// ```
    pub fn new(value: impl Into<String>) -> Result<Self, CaseValidationError> {
        let raw = value.into();
        if raw.trim().is_empty() || raw.trim() != raw {
            return Err(CaseValidationError::InvalidTraySerial);
        }
        Ok(Self(raw))
    }

    /// Borrow the underlying serial string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for TraySerial {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TraySerial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<TraySerial> for String {
    fn from(value: TraySerial) -> Self {
        value.0
    }
}

impl TryFrom<String> for TraySerial {
    type Error = CaseValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Primary lifecycle stage of a case.
///
/// Ordered: `PendingCheckin < CheckedIn < InvoiceSubmitted < CaseCompleted`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    /// Awaiting the rep's serial scan.
    PendingCheckin,
    /// Scan matched; tray is on site.
    CheckedIn,
    /// Invoice handed in after the procedure.
    InvoiceSubmitted,
    /// Terminal state; no further transitions accepted.
    CaseCompleted,
}

impl WorkflowStatus {
    /// Stable string form used in persistence and wire payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PendingCheckin => "pending_checkin",
            Self::CheckedIn => "checked_in",
            Self::InvoiceSubmitted => "invoice_submitted",
            Self::CaseCompleted => "case_completed",
        }
    }

    /// Whether the status accepts no further normal-flow transitions.
    pub fn is_terminal(self) -> bool {
        self == Self::CaseCompleted
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowStatus {
    type Err = CaseValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_checkin" => Ok(Self::PendingCheckin),
            "checked_in" => Ok(Self::CheckedIn),
            "invoice_submitted" => Ok(Self::InvoiceSubmitted),
            "case_completed" => Ok(Self::CaseCompleted),
            _ => Err(CaseValidationError::UnknownWorkflowStatus),
        }
    }
}

/// Outcome of the most recent verification attempt, orthogonal to the primary
/// workflow axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CheckInStatus {
    /// No scan has been attempted yet.
    NotCheckedIn,
    /// Last scan matched the assigned serial.
    Matched,
    /// Last scan did not match; the workflow did not advance.
    Mismatched,
}

impl CheckInStatus {
    /// Stable string form used in persistence and wire payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotCheckedIn => "not_checked_in",
            Self::Matched => "matched",
            Self::Mismatched => "mismatched",
        }
    }
}

impl fmt::Display for CheckInStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckInStatus {
    type Err = CaseValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_checked_in" => Ok(Self::NotCheckedIn),
            "matched" => Ok(Self::Matched),
            "mismatched" => Ok(Self::Mismatched),
            _ => Err(CaseValidationError::UnknownCheckInStatus),
        }
    }
}

/// All fields needed to build a [`Case`], prior to validation.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseDraft {
    pub id: CaseId,
    pub doctor_name: String,
    pub hospital_name: String,
    pub city: String,
    pub state_code: String,
    pub assigned_rep_id: UserId,
    pub assigned_tray_serial: TraySerial,
    pub scheduled_for: DateTime<Utc>,
    pub workflow_status: WorkflowStatus,
    pub check_in_status: CheckInStatus,
    pub check_in_time: Option<DateTime<Utc>>,
    pub invoice_submitted: bool,
    pub invoice_submitted_time: Option<DateTime<Utc>>,
    pub case_completed: bool,
    pub case_completed_time: Option<DateTime<Utc>>,
    pub completion_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated case aggregate.
///
/// ## Invariants
/// - Free-text identity fields (doctor, hospital, city, state) are non-empty
///   once trimmed.
/// - `check_in_status == Mismatched` coexists only with
///   `workflow_status == PendingCheckin`; a mismatch never advances the
///   workflow.
///
/// Flag/timestamp coherence beyond the mismatch invariant is deliberately not
/// enforced here: admin overrides are unrestricted field-level updates and
/// may produce intermediate combinations while correcting a case.
#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    id: CaseId,
    doctor_name: String,
    hospital_name: String,
    city: String,
    state_code: String,
    assigned_rep_id: UserId,
    assigned_tray_serial: TraySerial,
    scheduled_for: DateTime<Utc>,
    workflow_status: WorkflowStatus,
    check_in_status: CheckInStatus,
    check_in_time: Option<DateTime<Utc>>,
    invoice_submitted: bool,
    invoice_submitted_time: Option<DateTime<Utc>>,
    case_completed: bool,
    case_completed_time: Option<DateTime<Utc>>,
    completion_notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn require_non_empty(
    value: String,
    field: &'static str,
) -> Result<String, CaseValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CaseValidationError::EmptyField { field });
    }
    Ok(trimmed.to_owned())
}

impl Case {
    /// Validate a draft into a case aggregate.
    pub fn new(draft: CaseDraft) -> Result<Self, CaseValidationError> {
        if draft.check_in_status == CheckInStatus::Mismatched
            && draft.workflow_status != WorkflowStatus::PendingCheckin
        {
            return Err(CaseValidationError::MismatchOutsidePendingCheckin);
        }

        Ok(Self {
            id: draft.id,
            doctor_name: require_non_empty(draft.doctor_name, "doctor_name")?,
            hospital_name: require_non_empty(draft.hospital_name, "hospital_name")?,
            city: require_non_empty(draft.city, "city")?,
            state_code: require_non_empty(draft.state_code, "state_code")?,
            assigned_rep_id: draft.assigned_rep_id,
            assigned_tray_serial: draft.assigned_tray_serial,
            scheduled_for: draft.scheduled_for,
            workflow_status: draft.workflow_status,
            check_in_status: draft.check_in_status,
            check_in_time: draft.check_in_time,
            invoice_submitted: draft.invoice_submitted,
            invoice_submitted_time: draft.invoice_submitted_time,
            case_completed: draft.case_completed,
            case_completed_time: draft.case_completed_time,
            completion_notes: draft.completion_notes,
            created_at: draft.created_at,
            updated_at: draft.updated_at,
        })
    }

    /// Stable identifier.
    pub fn id(&self) -> CaseId {
        self.id
    }

    /// Operating doctor's name.
    pub fn doctor_name(&self) -> &str {
        &self.doctor_name
    }

    /// Destination hospital.
    pub fn hospital_name(&self) -> &str {
        &self.hospital_name
    }

    /// Destination city.
    pub fn city(&self) -> &str {
        &self.city
    }

    /// Destination state, free text.
    pub fn state_code(&self) -> &str {
        &self.state_code
    }

    /// Rep responsible for executing the case.
    pub fn assigned_rep_id(&self) -> &UserId {
        &self.assigned_rep_id
    }

    /// Serial of the tray assigned to this case.
    pub fn assigned_tray_serial(&self) -> &TraySerial {
        &self.assigned_tray_serial
    }

    /// Scheduled procedure timestamp.
    pub fn scheduled_for(&self) -> DateTime<Utc> {
        self.scheduled_for
    }

    /// Primary lifecycle stage.
    pub fn workflow_status(&self) -> WorkflowStatus {
        self.workflow_status
    }

    /// Outcome of the most recent verification attempt.
    pub fn check_in_status(&self) -> CheckInStatus {
        self.check_in_status
    }

    /// Timestamp of the most recent scan attempt, if any.
    pub fn check_in_time(&self) -> Option<DateTime<Utc>> {
        self.check_in_time
    }

    /// Whether the invoice has been handed in.
    pub fn invoice_submitted(&self) -> bool {
        self.invoice_submitted
    }

    /// When the invoice was handed in, if it was.
    pub fn invoice_submitted_time(&self) -> Option<DateTime<Utc>> {
        self.invoice_submitted_time
    }

    /// Whether the case has been completed.
    pub fn case_completed(&self) -> bool {
        self.case_completed
    }

    /// When the case was completed, if it was.
    pub fn case_completed_time(&self) -> Option<DateTime<Utc>> {
        self.case_completed_time
    }

    /// Free-text notes recorded at completion.
    pub fn completion_notes(&self) -> Option<&str> {
        self.completion_notes.as_deref()
    }

    /// Record creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last mutation timestamp.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
