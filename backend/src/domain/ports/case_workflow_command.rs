//! Driving port for case workflow mutations.
//!
//! Covers case creation, the scan-driven check-in protocol, the forward
//! invoice and completion transitions, and unrestricted admin edits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    Caller, Case, CaseId, CheckInStatus, Error, ScanResult, TraySerial, TrayScan, UserId,
    WorkflowStatus,
};

/// Serializable case projection for driving ports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CasePayload {
    #[schema(value_type = Uuid)]
    pub id: CaseId,
    pub doctor_name: String,
    pub hospital_name: String,
    pub city: String,
    pub state: String,
    #[schema(value_type = String)]
    pub assigned_rep_id: UserId,
    #[schema(value_type = String)]
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

impl From<Case> for CasePayload {
    fn from(value: Case) -> Self {
        Self {
            id: value.id(),
            doctor_name: value.doctor_name().to_owned(),
            hospital_name: value.hospital_name().to_owned(),
            city: value.city().to_owned(),
            state: value.state_code().to_owned(),
            assigned_rep_id: value.assigned_rep_id().clone(),
            assigned_tray_serial: value.assigned_tray_serial().clone(),
            scheduled_for: value.scheduled_for(),
            workflow_status: value.workflow_status(),
            check_in_status: value.check_in_status(),
            check_in_time: value.check_in_time(),
            invoice_submitted: value.invoice_submitted(),
            invoice_submitted_time: value.invoice_submitted_time(),
            case_completed: value.case_completed(),
            case_completed_time: value.case_completed_time(),
            completion_notes: value.completion_notes().map(str::to_owned),
            created_at: value.created_at(),
            updated_at: value.updated_at(),
        }
    }
}

/// Serializable scan record for driving ports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrayScanPayload {
    pub id: Uuid,
    #[schema(value_type = Uuid)]
    pub case_id: CaseId,
    #[schema(value_type = String)]
    pub scanned_by: UserId,
    pub scanned_serial: String,
    pub result: ScanResult,
    pub scanned_at: DateTime<Utc>,
}

impl From<TrayScan> for TrayScanPayload {
    fn from(value: TrayScan) -> Self {
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

/// Fields accepted when creating a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewCasePayload {
    pub doctor_name: String,
    pub hospital_name: String,
    pub city: String,
    pub state: String,
    #[schema(value_type = String)]
    pub assigned_rep_id: UserId,
    pub assigned_tray_serial: String,
    pub scheduled_for: DateTime<Utc>,
}

/// Request to create a case.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateCaseRequest {
    pub caller: Caller,
    pub case: NewCasePayload,
}

/// Response from creating a case.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateCaseResponse {
    pub case: CasePayload,
}

/// Request to submit a tray scan for check-in verification.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitScanRequest {
    pub caller: Caller,
    pub case_id: CaseId,
    pub scanned_serial: String,
}

/// Response from submitting a scan: the scan verdict plus the case as it
/// stands after the attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitScanResponse {
    pub case: CasePayload,
    pub scan: TrayScanPayload,
}

/// Request to mark a checked-in case's invoice as submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitInvoiceRequest {
    pub caller: Caller,
    pub case_id: CaseId,
}

/// Response from submitting an invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitInvoiceResponse {
    pub case: CasePayload,
}

/// Request to move an invoiced case to its terminal state.
#[derive(Debug, Clone, PartialEq)]
pub struct CompleteCaseRequest {
    pub caller: Caller,
    pub case_id: CaseId,
    pub completion_notes: Option<String>,
}

/// Response from completing a case.
#[derive(Debug, Clone, PartialEq)]
pub struct CompleteCaseResponse {
    pub case: CasePayload,
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Field edits accepted from an administrator.
///
/// Absent fields stay untouched; for nullable columns an explicit JSON null
/// clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AdminCaseUpdatePayload {
    #[serde(default)]
    pub doctor_name: Option<String>,
    #[serde(default)]
    pub hospital_name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub assigned_rep_id: Option<UserId>,
    #[serde(default)]
    pub assigned_tray_serial: Option<String>,
    #[serde(default)]
    pub scheduled_for: Option<DateTime<Utc>>,
    #[serde(default)]
    pub workflow_status: Option<WorkflowStatus>,
    #[serde(default)]
    pub check_in_status: Option<CheckInStatus>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<DateTime<Utc>>)]
    pub check_in_time: Option<Option<DateTime<Utc>>>,
    #[serde(default)]
    pub invoice_submitted: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<DateTime<Utc>>)]
    pub invoice_submitted_time: Option<Option<DateTime<Utc>>>,
    #[serde(default)]
    pub case_completed: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<DateTime<Utc>>)]
    pub case_completed_time: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub completion_notes: Option<Option<String>>,
}

/// Request to apply unrestricted admin edits to a case.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminUpdateCaseRequest {
    pub caller: Caller,
    pub case_id: CaseId,
    pub update: AdminCaseUpdatePayload,
}

/// Response from an admin edit.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminUpdateCaseResponse {
    pub case: CasePayload,
}

/// Driving port for case workflow write operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CaseWorkflowCommand: Send + Sync {
    /// Create a case in its initial workflow stage. Admin only.
    async fn create_case(&self, request: CreateCaseRequest) -> Result<CreateCaseResponse, Error>;

    /// Verify a scanned tray serial against the case's assignment, recording
    /// the attempt and advancing the workflow on a match.
    async fn submit_scan(&self, request: SubmitScanRequest) -> Result<SubmitScanResponse, Error>;

    /// Mark a checked-in case's invoice as submitted.
    async fn submit_invoice(
        &self,
        request: SubmitInvoiceRequest,
    ) -> Result<SubmitInvoiceResponse, Error>;

    /// Move an invoiced case to its terminal completed state.
    async fn complete_case(
        &self,
        request: CompleteCaseRequest,
    ) -> Result<CompleteCaseResponse, Error>;

    /// Apply unrestricted field edits outside the workflow. Admin only.
    async fn admin_update(
        &self,
        request: AdminUpdateCaseRequest,
    ) -> Result<AdminUpdateCaseResponse, Error>;
}

/// Fixture command implementation for tests that do not exercise the
/// workflow. Mutations against unknown cases report not found.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCaseWorkflowCommand;

#[async_trait]
impl CaseWorkflowCommand for FixtureCaseWorkflowCommand {
    async fn create_case(&self, request: CreateCaseRequest) -> Result<CreateCaseResponse, Error> {
        let now = Utc::now();
        let serial = TraySerial::new(&request.case.assigned_tray_serial)
            .map_err(|err| Error::invalid_request(format!("invalid case payload: {err}")))?;
        let case = Case::new(crate::domain::CaseDraft {
            id: CaseId::random(),
            doctor_name: request.case.doctor_name,
            hospital_name: request.case.hospital_name,
            city: request.case.city,
            state_code: request.case.state,
            assigned_rep_id: request.case.assigned_rep_id,
            assigned_tray_serial: serial,
            scheduled_for: request.case.scheduled_for,
            workflow_status: WorkflowStatus::PendingCheckin,
            check_in_status: CheckInStatus::NotCheckedIn,
            check_in_time: None,
            invoice_submitted: false,
            invoice_submitted_time: None,
            case_completed: false,
            case_completed_time: None,
            completion_notes: None,
            created_at: now,
            updated_at: now,
        })
        .map_err(|err| Error::invalid_request(format!("invalid case payload: {err}")))?;
        Ok(CreateCaseResponse { case: case.into() })
    }

    async fn submit_scan(&self, request: SubmitScanRequest) -> Result<SubmitScanResponse, Error> {
        Err(Error::not_found(format!(
            "case {} not found",
            request.case_id
        )))
    }

    async fn submit_invoice(
        &self,
        request: SubmitInvoiceRequest,
    ) -> Result<SubmitInvoiceResponse, Error> {
        Err(Error::not_found(format!(
            "case {} not found",
            request.case_id
        )))
    }

    async fn complete_case(
        &self,
        request: CompleteCaseRequest,
    ) -> Result<CompleteCaseResponse, Error> {
        Err(Error::not_found(format!(
            "case {} not found",
            request.case_id
        )))
    }

    async fn admin_update(
        &self,
        request: AdminUpdateCaseRequest,
    ) -> Result<AdminUpdateCaseResponse, Error> {
        Err(Error::not_found(format!(
            "case {} not found",
            request.case_id
        )))
    }
}
