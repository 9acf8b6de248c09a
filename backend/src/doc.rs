//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: All HTTP endpoints from the inbound layer (cases,
//!   notifications, health)
//! - **Schemas**: Request and response payloads for the case workflow and
//!   notification feed
//! - **Security**: Session cookie authentication scheme

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::ports::{
    AdminCaseUpdatePayload, CasePayload, NotificationPayload, TrayScanPayload,
};
use crate::domain::{
    CheckInStatus, Error, ErrorCode, NotificationKind, ScanResult, WorkflowStatus,
};
use crate::inbound::http::cases::{
    CaseListResponseBody, CaseResponseBody, CompleteCaseRequestBody, CreateCaseRequestBody,
    ScanListResponseBody, SubmitScanRequestBody, SubmitScanResponseBody,
};
use crate::inbound::http::notifications::{
    MarkAllReadResponseBody, NotificationListResponseBody, UnreadCountResponseBody,
};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by the upstream identity layer.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Tray logistics backend API",
        description = "HTTP interface for the surgical case workflow, scan-based \
                       tray check-in, and the notification feed."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::cases::create_case,
        crate::inbound::http::cases::list_cases,
        crate::inbound::http::cases::get_case,
        crate::inbound::http::cases::list_case_scans,
        crate::inbound::http::cases::submit_scan,
        crate::inbound::http::cases::submit_invoice,
        crate::inbound::http::cases::complete_case,
        crate::inbound::http::cases::admin_update_case,
        crate::inbound::http::notifications::list_notifications,
        crate::inbound::http::notifications::unread_count,
        crate::inbound::http::notifications::mark_read,
        crate::inbound::http::notifications::mark_all_read,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        WorkflowStatus,
        CheckInStatus,
        ScanResult,
        NotificationKind,
        CasePayload,
        TrayScanPayload,
        NotificationPayload,
        AdminCaseUpdatePayload,
        CreateCaseRequestBody,
        CaseResponseBody,
        CaseListResponseBody,
        SubmitScanRequestBody,
        SubmitScanResponseBody,
        CompleteCaseRequestBody,
        ScanListResponseBody,
        NotificationListResponseBody,
        UnreadCountResponseBody,
        MarkAllReadResponseBody,
    )),
    tags(
        (name = "cases", description = "Case workflow and scan verification"),
        (name = "notifications", description = "Per-user notification feed"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying OpenAPI document structure.

    use utoipa::OpenApi;

    use super::*;

    #[test]
    fn openapi_document_lists_every_case_endpoint() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        for path in [
            "/api/v1/cases",
            "/api/v1/cases/{id}",
            "/api/v1/cases/{id}/scans",
            "/api/v1/cases/{id}/scan",
            "/api/v1/cases/{id}/invoice",
            "/api/v1/cases/{id}/complete",
            "/api/v1/notifications",
            "/api/v1/notifications/unread-count",
            "/api/v1/notifications/{id}/read",
            "/api/v1/notifications/read-all",
            "/healthz/ready",
            "/healthz/live",
        ] {
            assert!(paths.contains_key(path), "missing path {path}");
        }
    }

    #[test]
    fn openapi_error_schema_is_registered() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        assert!(schemas.contains_key("Error"), "Error schema registered");
        assert!(
            schemas.contains_key("CasePayload"),
            "CasePayload schema registered"
        );
    }
}
