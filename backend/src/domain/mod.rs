//! Domain layer: case workflow entities, services, and ports.

mod case;
mod case_events;
mod case_query_service;
mod case_workflow_service;
mod error;
mod identity;
mod notification;
mod notification_service;
pub mod ports;
mod trace_id;
mod tray_scan;
mod verification;

pub use case::{
    Case, CaseDraft, CaseId, CaseValidationError, CheckInStatus, TraySerial, WorkflowStatus,
};
pub use case_events::{CaseEvent, CaseEventKind};
pub use case_query_service::CaseQueryService;
pub use case_workflow_service::CaseWorkflowService;
pub use error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use identity::{Caller, IdentityValidationError, Role, UserId};
pub use notification::{NewNotification, Notification, NotificationKind, UnknownNotificationKind};
pub use notification_service::NotificationService;
pub use trace_id::TraceId;
pub use tray_scan::{NewTrayScan, TrayScan};
pub use verification::{ScanResult, UnknownScanResult, verify};
