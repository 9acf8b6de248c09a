//! Case read services.
//!
//! Visibility follows role: admins see every case, reps only their own
//! assignments. Queries never mutate workflow state.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::case_workflow_service::map_repository_error;
use crate::domain::ports::{
    CaseFilter, CaseQuery, CaseRepository, GetCaseRequest, GetCaseResponse, ListCaseScansRequest,
    ListCaseScansResponse, ListCasesRequest, ListCasesResponse,
};
use crate::domain::{Caller, Case, CaseId, Error};

/// Case service implementing the query driving port.
#[derive(Clone)]
pub struct CaseQueryService<R> {
    case_repo: Arc<R>,
}

impl<R> CaseQueryService<R> {
    /// Create a new query service with the case repository.
    pub fn new(case_repo: Arc<R>) -> Self {
        Self { case_repo }
    }
}

impl<R> CaseQueryService<R>
where
    R: CaseRepository,
{
    async fn load_visible_case(&self, caller: &Caller, case_id: &CaseId) -> Result<Case, Error> {
        let case = self
            .case_repo
            .find_by_id(case_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("case {case_id} not found")))?;
        if !caller.may_act_on(case.assigned_rep_id()) {
            return Err(Error::forbidden("case belongs to another rep"));
        }
        Ok(case)
    }
}

#[async_trait]
impl<R> CaseQuery for CaseQueryService<R>
where
    R: CaseRepository,
{
    async fn get_case(&self, request: GetCaseRequest) -> Result<GetCaseResponse, Error> {
        let case = self
            .load_visible_case(&request.caller, &request.case_id)
            .await?;
        Ok(GetCaseResponse { case: case.into() })
    }

    async fn list_cases(&self, request: ListCasesRequest) -> Result<ListCasesResponse, Error> {
        let filter = CaseFilter {
            assigned_rep_id: (!request.caller.is_admin())
                .then(|| request.caller.user_id().clone()),
            workflow_status: request.workflow_status,
        };
        let cases = self
            .case_repo
            .list(&filter)
            .await
            .map_err(map_repository_error)?;
        Ok(ListCasesResponse {
            cases: cases.into_iter().map(Into::into).collect(),
        })
    }

    async fn list_case_scans(
        &self,
        request: ListCaseScansRequest,
    ) -> Result<ListCaseScansResponse, Error> {
        self.load_visible_case(&request.caller, &request.case_id)
            .await?;
        let scans = self
            .case_repo
            .list_scans_for_case(&request.case_id)
            .await
            .map_err(map_repository_error)?;
        Ok(ListCaseScansResponse {
            scans: scans.into_iter().map(Into::into).collect(),
        })
    }
}

#[cfg(test)]
#[path = "case_query_service_tests.rs"]
mod tests;
