//! Case HTTP handlers.
//!
//! ```text
//! POST  /api/v1/cases
//! GET   /api/v1/cases
//! GET   /api/v1/cases/{id}
//! GET   /api/v1/cases/{id}/scans
//! POST  /api/v1/cases/{id}/scan
//! POST  /api/v1/cases/{id}/invoice
//! POST  /api/v1/cases/{id}/complete
//! PATCH /api/v1/cases/{id}
//! ```

use actix_web::{get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{
    AdminCaseUpdatePayload, AdminUpdateCaseRequest, CasePayload, CompleteCaseRequest,
    CreateCaseRequest, GetCaseRequest, ListCaseScansRequest, ListCasesRequest, NewCasePayload,
    SubmitInvoiceRequest, SubmitScanRequest, TrayScanPayload,
};
use crate::domain::{CaseId, Error, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_rfc3339_timestamp, parse_uuid, parse_workflow_status, require_non_blank,
};

/// Request payload for creating a case.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCaseRequestBody {
    pub doctor_name: String,
    pub hospital_name: String,
    pub city: String,
    pub state: String,
    #[schema(format = "uuid")]
    pub assigned_rep_id: String,
    pub assigned_tray_serial: String,
    #[schema(format = "date-time")]
    pub scheduled_for: String,
}

/// Response payload carrying one case.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaseResponseBody {
    pub case: CasePayload,
}

/// Response payload carrying the visible cases, scheduled date ascending.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaseListResponseBody {
    pub cases: Vec<CasePayload>,
}

/// Request payload for a tray scan attempt.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitScanRequestBody {
    pub scanned_serial: String,
}

/// Response payload carrying the scan verdict and the case as it stands
/// after the attempt.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitScanResponseBody {
    pub case: CasePayload,
    pub scan: TrayScanPayload,
}

/// Request payload for completing a case.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteCaseRequestBody {
    pub completion_notes: Option<String>,
}

/// Response payload carrying a case's scan trail, oldest first.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScanListResponseBody {
    pub scans: Vec<TrayScanPayload>,
}

/// Query parameters accepted when listing cases.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCasesQuery {
    pub workflow_status: Option<String>,
}

fn parse_case_id(raw: &str) -> Result<CaseId, Error> {
    parse_uuid(raw, FieldName::new("id")).map(CaseId::from_uuid)
}

fn parse_new_case(body: CreateCaseRequestBody) -> Result<NewCasePayload, Error> {
    require_non_blank(&body.doctor_name, FieldName::new("doctorName"))?;
    require_non_blank(&body.hospital_name, FieldName::new("hospitalName"))?;
    require_non_blank(&body.city, FieldName::new("city"))?;
    require_non_blank(&body.state, FieldName::new("state"))?;
    require_non_blank(&body.assigned_tray_serial, FieldName::new("assignedTraySerial"))?;
    let assigned_rep_id =
        parse_uuid(&body.assigned_rep_id, FieldName::new("assignedRepId")).map(UserId::from_uuid)?;
    let scheduled_for =
        parse_rfc3339_timestamp(&body.scheduled_for, FieldName::new("scheduledFor"))?;

    Ok(NewCasePayload {
        doctor_name: body.doctor_name,
        hospital_name: body.hospital_name,
        city: body.city,
        state: body.state,
        assigned_rep_id,
        assigned_tray_serial: body.assigned_tray_serial,
        scheduled_for,
    })
}

/// Create a case in its initial workflow stage. Admin only.
#[utoipa::path(
    post,
    path = "/api/v1/cases",
    request_body = CreateCaseRequestBody,
    responses(
        (status = 200, description = "Case created", body = CaseResponseBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["cases"],
    operation_id = "createCase",
    security(("SessionCookie" = []))
)]
#[post("/cases")]
pub async fn create_case(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateCaseRequestBody>,
) -> ApiResult<web::Json<CaseResponseBody>> {
    let caller = session.require_caller()?;
    let case = parse_new_case(payload.into_inner())?;
    let response = state
        .workflow
        .create_case(CreateCaseRequest { caller, case })
        .await?;
    Ok(web::Json(CaseResponseBody {
        case: response.case,
    }))
}

/// List the cases visible to the caller, optionally filtered by workflow
/// stage.
#[utoipa::path(
    get,
    path = "/api/v1/cases",
    params(
        ("workflowStatus" = Option<String>, Query, description = "Workflow stage filter")
    ),
    responses(
        (status = 200, description = "Visible cases", body = CaseListResponseBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["cases"],
    operation_id = "listCases",
    security(("SessionCookie" = []))
)]
#[get("/cases")]
pub async fn list_cases(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ListCasesQuery>,
) -> ApiResult<web::Json<CaseListResponseBody>> {
    let caller = session.require_caller()?;
    let workflow_status = parse_workflow_status(
        query.into_inner().workflow_status,
        FieldName::new("workflowStatus"),
    )?;
    let response = state
        .cases
        .list_cases(ListCasesRequest {
            caller,
            workflow_status,
        })
        .await?;
    Ok(web::Json(CaseListResponseBody {
        cases: response.cases,
    }))
}

/// Fetch one case the caller may see.
#[utoipa::path(
    get,
    path = "/api/v1/cases/{id}",
    params(("id" = uuid::Uuid, Path, description = "Case identifier")),
    responses(
        (status = 200, description = "The case", body = CaseResponseBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["cases"],
    operation_id = "getCase",
    security(("SessionCookie" = []))
)]
#[get("/cases/{id}")]
pub async fn get_case(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<CaseResponseBody>> {
    let caller = session.require_caller()?;
    let case_id = parse_case_id(&path.into_inner())?;
    let response = state.cases.get_case(GetCaseRequest { caller, case_id }).await?;
    Ok(web::Json(CaseResponseBody {
        case: response.case,
    }))
}

/// Read the scan trail for a case the caller may see, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/cases/{id}/scans",
    params(("id" = uuid::Uuid, Path, description = "Case identifier")),
    responses(
        (status = 200, description = "Scan trail", body = ScanListResponseBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["cases"],
    operation_id = "listCaseScans",
    security(("SessionCookie" = []))
)]
#[get("/cases/{id}/scans")]
pub async fn list_case_scans(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<ScanListResponseBody>> {
    let caller = session.require_caller()?;
    let case_id = parse_case_id(&path.into_inner())?;
    let response = state
        .cases
        .list_case_scans(ListCaseScansRequest { caller, case_id })
        .await?;
    Ok(web::Json(ScanListResponseBody {
        scans: response.scans,
    }))
}

/// Submit a tray scan for check-in verification.
///
/// A matching serial checks the case in; a mismatch records the attempt and
/// leaves the case awaiting another scan.
#[utoipa::path(
    post,
    path = "/api/v1/cases/{id}/scan",
    params(("id" = uuid::Uuid, Path, description = "Case identifier")),
    request_body = SubmitScanRequestBody,
    responses(
        (status = 200, description = "Scan recorded", body = SubmitScanResponseBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Case is not awaiting check-in", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["cases"],
    operation_id = "submitScan",
    security(("SessionCookie" = []))
)]
#[post("/cases/{id}/scan")]
pub async fn submit_scan(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<SubmitScanRequestBody>,
) -> ApiResult<web::Json<SubmitScanResponseBody>> {
    let caller = session.require_caller()?;
    let case_id = parse_case_id(&path.into_inner())?;
    let body = payload.into_inner();
    require_non_blank(&body.scanned_serial, FieldName::new("scannedSerial"))?;
    let response = state
        .workflow
        .submit_scan(SubmitScanRequest {
            caller,
            case_id,
            scanned_serial: body.scanned_serial,
        })
        .await?;
    Ok(web::Json(SubmitScanResponseBody {
        case: response.case,
        scan: response.scan,
    }))
}

/// Mark a checked-in case's invoice as submitted.
#[utoipa::path(
    post,
    path = "/api/v1/cases/{id}/invoice",
    params(("id" = uuid::Uuid, Path, description = "Case identifier")),
    responses(
        (status = 200, description = "Invoice submitted", body = CaseResponseBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Case is not checked in", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["cases"],
    operation_id = "submitInvoice",
    security(("SessionCookie" = []))
)]
#[post("/cases/{id}/invoice")]
pub async fn submit_invoice(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<CaseResponseBody>> {
    let caller = session.require_caller()?;
    let case_id = parse_case_id(&path.into_inner())?;
    let response = state
        .workflow
        .submit_invoice(SubmitInvoiceRequest { caller, case_id })
        .await?;
    Ok(web::Json(CaseResponseBody {
        case: response.case,
    }))
}

/// Move an invoiced case to its terminal completed state.
#[utoipa::path(
    post,
    path = "/api/v1/cases/{id}/complete",
    params(("id" = uuid::Uuid, Path, description = "Case identifier")),
    request_body = CompleteCaseRequestBody,
    responses(
        (status = 200, description = "Case completed", body = CaseResponseBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Invoice has not been submitted", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["cases"],
    operation_id = "completeCase",
    security(("SessionCookie" = []))
)]
#[post("/cases/{id}/complete")]
pub async fn complete_case(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<CompleteCaseRequestBody>,
) -> ApiResult<web::Json<CaseResponseBody>> {
    let caller = session.require_caller()?;
    let case_id = parse_case_id(&path.into_inner())?;
    let response = state
        .workflow
        .complete_case(CompleteCaseRequest {
            caller,
            case_id,
            completion_notes: payload.into_inner().completion_notes,
        })
        .await?;
    Ok(web::Json(CaseResponseBody {
        case: response.case,
    }))
}

/// Apply unrestricted field edits outside the workflow. Admin only.
///
/// Absent fields stay untouched; an explicit JSON null clears a nullable
/// field.
#[utoipa::path(
    patch,
    path = "/api/v1/cases/{id}",
    params(("id" = uuid::Uuid, Path, description = "Case identifier")),
    request_body = AdminCaseUpdatePayload,
    responses(
        (status = 200, description = "Case updated", body = CaseResponseBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["cases"],
    operation_id = "adminUpdateCase",
    security(("SessionCookie" = []))
)]
#[patch("/cases/{id}")]
pub async fn admin_update_case(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<AdminCaseUpdatePayload>,
) -> ApiResult<web::Json<CaseResponseBody>> {
    let caller = session.require_caller()?;
    let case_id = parse_case_id(&path.into_inner())?;
    let response = state
        .workflow
        .admin_update(AdminUpdateCaseRequest {
            caller,
            case_id,
            update: payload.into_inner(),
        })
        .await?;
    Ok(web::Json(CaseResponseBody {
        case: response.case,
    }))
}

#[cfg(test)]
#[path = "cases_tests.rs"]
mod tests;
