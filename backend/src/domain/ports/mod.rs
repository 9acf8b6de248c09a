//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod case_event_bus;
mod case_query;
mod case_repository;
mod case_workflow_command;
mod notification_repository;
mod notifications;
mod push_gateway;

#[cfg(test)]
pub use case_event_bus::MockCaseEventBus;
pub use case_event_bus::{CaseEventBus, FixtureCaseEventBus};
#[cfg(test)]
pub use case_query::MockCaseQuery;
pub use case_query::{
    CaseQuery, FixtureCaseQuery, GetCaseRequest, GetCaseResponse, ListCaseScansRequest,
    ListCaseScansResponse, ListCasesRequest, ListCasesResponse,
};
#[cfg(test)]
pub use case_repository::MockCaseRepository;
pub use case_repository::{
    AdminCaseUpdate, CaseFilter, CaseRepository, CaseRepositoryError, CheckInWrite,
    FixtureCaseRepository, WorkflowAdvance,
};
#[cfg(test)]
pub use case_workflow_command::MockCaseWorkflowCommand;
pub use case_workflow_command::{
    AdminCaseUpdatePayload, AdminUpdateCaseRequest, AdminUpdateCaseResponse, CasePayload,
    CaseWorkflowCommand, CompleteCaseRequest, CompleteCaseResponse, CreateCaseRequest,
    CreateCaseResponse, FixtureCaseWorkflowCommand, NewCasePayload, SubmitInvoiceRequest,
    SubmitInvoiceResponse, SubmitScanRequest, SubmitScanResponse, TrayScanPayload,
};
#[cfg(test)]
pub use notification_repository::MockNotificationRepository;
pub use notification_repository::{
    FixtureNotificationRepository, NotificationRepository, NotificationRepositoryError,
};
#[cfg(test)]
pub use notifications::MockNotifications;
pub use notifications::{
    FixtureNotifications, ListNotificationsRequest, ListNotificationsResponse,
    MarkAllNotificationsReadRequest, MarkAllNotificationsReadResponse, MarkNotificationReadRequest,
    MarkNotificationReadResponse, NotificationPayload, Notifications, UnreadCountRequest,
    UnreadCountResponse,
};
#[cfg(test)]
pub use push_gateway::MockPushGateway;
pub use push_gateway::{FixturePushGateway, PushGateway, PushGatewayError};
