//! Driving port for case reads.

use async_trait::async_trait;

use crate::domain::{Caller, CaseId, Error, WorkflowStatus};

use super::{CasePayload, TrayScanPayload};

/// Request to fetch one case.
#[derive(Debug, Clone, PartialEq)]
pub struct GetCaseRequest {
    pub caller: Caller,
    pub case_id: CaseId,
}

/// Response carrying one case.
#[derive(Debug, Clone, PartialEq)]
pub struct GetCaseResponse {
    pub case: CasePayload,
}

/// Request to list cases visible to the caller.
///
/// Admins see every case; reps see only their own assignments regardless of
/// the filter.
#[derive(Debug, Clone, PartialEq)]
pub struct ListCasesRequest {
    pub caller: Caller,
    pub workflow_status: Option<WorkflowStatus>,
}

/// Response carrying the visible cases, scheduled date ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct ListCasesResponse {
    pub cases: Vec<CasePayload>,
}

/// Request to read a case's scan trail.
#[derive(Debug, Clone, PartialEq)]
pub struct ListCaseScansRequest {
    pub caller: Caller,
    pub case_id: CaseId,
}

/// Response carrying the scan trail, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct ListCaseScansResponse {
    pub scans: Vec<TrayScanPayload>,
}

/// Driving port for case read operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CaseQuery: Send + Sync {
    /// Fetch one case the caller may see.
    async fn get_case(&self, request: GetCaseRequest) -> Result<GetCaseResponse, Error>;

    /// List the cases visible to the caller.
    async fn list_cases(&self, request: ListCasesRequest) -> Result<ListCasesResponse, Error>;

    /// Read the scan trail for a case the caller may see.
    async fn list_case_scans(
        &self,
        request: ListCaseScansRequest,
    ) -> Result<ListCaseScansResponse, Error>;
}

/// Fixture query implementation for tests that do not exercise reads.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCaseQuery;

#[async_trait]
impl CaseQuery for FixtureCaseQuery {
    async fn get_case(&self, request: GetCaseRequest) -> Result<GetCaseResponse, Error> {
        Err(Error::not_found(format!(
            "case {} not found",
            request.case_id
        )))
    }

    async fn list_cases(&self, _request: ListCasesRequest) -> Result<ListCasesResponse, Error> {
        Ok(ListCasesResponse { cases: Vec::new() })
    }

    async fn list_case_scans(
        &self,
        request: ListCaseScansRequest,
    ) -> Result<ListCaseScansResponse, Error> {
        Err(Error::not_found(format!(
            "case {} not found",
            request.case_id
        )))
    }
}
