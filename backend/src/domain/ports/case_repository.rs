//! Port for case persistence, including the guarded workflow writes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Case, CaseId, CheckInStatus, NewTrayScan, TraySerial, TrayScan, UserId, WorkflowStatus,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by case repository adapters.
    pub enum CaseRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "case repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "case repository query failed: {message}",
    }
}

/// Filter applied when listing cases.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaseFilter {
    /// Restrict to cases assigned to this rep.
    pub assigned_rep_id: Option<UserId>,
    /// Restrict to cases in this workflow stage.
    pub workflow_status: Option<WorkflowStatus>,
}

impl CaseFilter {
    /// Filter that matches every case.
    pub fn all() -> Self {
        Self::default()
    }

    /// Filter restricted to one rep's cases.
    pub fn assigned_to(rep_id: UserId) -> Self {
        Self {
            assigned_rep_id: Some(rep_id),
            workflow_status: None,
        }
    }
}

/// Check-in outcome applied to a case alongside its scan record.
///
/// `advance` is true only for a matched scan; a mismatch records the scan and
/// the mismatched check-in axis while the workflow stays at pending check-in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckInWrite {
    /// New value for the check-in axis.
    pub check_in_status: CheckInStatus,
    /// Timestamp recorded as both check-in time and row update time.
    pub at: DateTime<Utc>,
    /// Whether the workflow moves to checked-in.
    pub advance: bool,
}

/// Forward workflow transition applied under a compare-and-set guard.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowAdvance {
    /// Checked-in case had its invoice submitted.
    InvoiceSubmitted { at: DateTime<Utc> },
    /// Invoiced case reached its terminal state.
    CaseCompleted {
        at: DateTime<Utc>,
        notes: Option<String>,
    },
}

impl WorkflowAdvance {
    /// Workflow stage the case must currently be in for the write to apply.
    pub fn guard(&self) -> WorkflowStatus {
        match self {
            Self::InvoiceSubmitted { .. } => WorkflowStatus::CheckedIn,
            Self::CaseCompleted { .. } => WorkflowStatus::InvoiceSubmitted,
        }
    }

    /// Workflow stage the case moves to when the guard holds.
    pub fn target(&self) -> WorkflowStatus {
        match self {
            Self::InvoiceSubmitted { .. } => WorkflowStatus::InvoiceSubmitted,
            Self::CaseCompleted { .. } => WorkflowStatus::CaseCompleted,
        }
    }

    /// Timestamp of the transition.
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Self::InvoiceSubmitted { at } | Self::CaseCompleted { at, .. } => *at,
        }
    }
}

/// Unrestricted field edits applied by an administrator.
///
/// Outer `None` leaves the column untouched; for nullable columns the inner
/// option distinguishes "set to null" from "leave alone".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminCaseUpdate {
    pub doctor_name: Option<String>,
    pub hospital_name: Option<String>,
    pub city: Option<String>,
    pub state_code: Option<String>,
    pub assigned_rep_id: Option<UserId>,
    pub assigned_tray_serial: Option<TraySerial>,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub workflow_status: Option<WorkflowStatus>,
    pub check_in_status: Option<CheckInStatus>,
    pub check_in_time: Option<Option<DateTime<Utc>>>,
    pub invoice_submitted: Option<bool>,
    pub invoice_submitted_time: Option<Option<DateTime<Utc>>>,
    pub case_completed: Option<bool>,
    pub case_completed_time: Option<Option<DateTime<Utc>>>,
    pub completion_notes: Option<Option<String>>,
}

impl AdminCaseUpdate {
    /// Whether the update names any column at all.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Port for reading and mutating cases and their scan trail.
///
/// The guarded mutations (`record_check_in`, `advance`) apply atomically and
/// only when the case currently sits in the expected workflow stage. They
/// return `Ok(None)` when no row matched the id plus expected stage; nothing
/// is written in that outcome, scan record included. Callers re-read the case
/// to distinguish "gone" from "moved on".
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CaseRepository: Send + Sync {
    /// Persist a newly created case.
    async fn create(&self, case: &Case) -> Result<(), CaseRepositoryError>;

    /// Find a case by id.
    async fn find_by_id(&self, case_id: &CaseId) -> Result<Option<Case>, CaseRepositoryError>;

    /// List cases matching the filter, scheduled date ascending.
    async fn list(&self, filter: &CaseFilter) -> Result<Vec<Case>, CaseRepositoryError>;

    /// Append a scan record and apply its check-in outcome in one transaction,
    /// guarded on the case still being in pending check-in.
    async fn record_check_in(
        &self,
        scan: &NewTrayScan,
        write: &CheckInWrite,
    ) -> Result<Option<Case>, CaseRepositoryError>;

    /// Apply a forward workflow transition guarded on the expected stage.
    async fn advance(
        &self,
        case_id: &CaseId,
        advance: &WorkflowAdvance,
    ) -> Result<Option<Case>, CaseRepositoryError>;

    /// Apply unrestricted admin edits. Returns `Ok(None)` when the case does
    /// not exist. Always refreshes the row update time.
    async fn admin_update(
        &self,
        case_id: &CaseId,
        update: &AdminCaseUpdate,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Case>, CaseRepositoryError>;

    /// Read the scan trail for a case, oldest first.
    async fn list_scans_for_case(
        &self,
        case_id: &CaseId,
    ) -> Result<Vec<TrayScan>, CaseRepositoryError>;
}

/// Fixture implementation for tests that do not exercise case persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCaseRepository;

#[async_trait]
impl CaseRepository for FixtureCaseRepository {
    async fn create(&self, _case: &Case) -> Result<(), CaseRepositoryError> {
        Ok(())
    }

    async fn find_by_id(&self, _case_id: &CaseId) -> Result<Option<Case>, CaseRepositoryError> {
        Ok(None)
    }

    async fn list(&self, _filter: &CaseFilter) -> Result<Vec<Case>, CaseRepositoryError> {
        Ok(Vec::new())
    }

    async fn record_check_in(
        &self,
        _scan: &NewTrayScan,
        _write: &CheckInWrite,
    ) -> Result<Option<Case>, CaseRepositoryError> {
        Ok(None)
    }

    async fn advance(
        &self,
        _case_id: &CaseId,
        _advance: &WorkflowAdvance,
    ) -> Result<Option<Case>, CaseRepositoryError> {
        Ok(None)
    }

    async fn admin_update(
        &self,
        _case_id: &CaseId,
        _update: &AdminCaseUpdate,
        _updated_at: DateTime<Utc>,
    ) -> Result<Option<Case>, CaseRepositoryError> {
        Ok(None)
    }

    async fn list_scans_for_case(
        &self,
        _case_id: &CaseId,
    ) -> Result<Vec<TrayScan>, CaseRepositoryError> {
        Ok(Vec::new())
    }
}
