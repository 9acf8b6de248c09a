//! Driving port for the caller's notification feed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Caller, CaseId, Error, Notification, NotificationKind, UserId};

/// Serializable notification for driving ports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub id: Uuid,
    #[schema(value_type = String)]
    pub user_id: UserId,
    #[schema(value_type = Uuid)]
    pub case_id: CaseId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationPayload {
    fn from(value: Notification) -> Self {
        Self {
            id: value.id,
            user_id: value.user_id,
            case_id: value.case_id,
            kind: value.kind,
            title: value.title,
            message: value.message,
            read: value.read,
            created_at: value.created_at,
        }
    }
}

/// Request to list the caller's notifications.
#[derive(Debug, Clone, PartialEq)]
pub struct ListNotificationsRequest {
    pub caller: Caller,
}

/// Response carrying the caller's notifications, newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct ListNotificationsResponse {
    pub notifications: Vec<NotificationPayload>,
}

/// Request for the caller's unread count.
#[derive(Debug, Clone, PartialEq)]
pub struct UnreadCountRequest {
    pub caller: Caller,
}

/// Response carrying the unread count.
#[derive(Debug, Clone, PartialEq)]
pub struct UnreadCountResponse {
    pub unread: u64,
}

/// Request to mark one of the caller's notifications as read.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkNotificationReadRequest {
    pub caller: Caller,
    pub notification_id: Uuid,
}

/// Response from marking a notification read.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkNotificationReadResponse;

/// Request to mark every unread notification of the caller as read.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkAllNotificationsReadRequest {
    pub caller: Caller,
}

/// Response carrying how many notifications were newly marked read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkAllNotificationsReadResponse {
    pub marked: u64,
}

/// Driving port for the notification feed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifications: Send + Sync {
    /// List the caller's notifications, newest first.
    async fn list_notifications(
        &self,
        request: ListNotificationsRequest,
    ) -> Result<ListNotificationsResponse, Error>;

    /// Count the caller's unread notifications.
    async fn unread_count(&self, request: UnreadCountRequest)
    -> Result<UnreadCountResponse, Error>;

    /// Mark one of the caller's notifications as read. Marking an already
    /// read notification is a no-op success.
    async fn mark_read(
        &self,
        request: MarkNotificationReadRequest,
    ) -> Result<MarkNotificationReadResponse, Error>;

    /// Mark every unread notification of the caller as read. An empty feed
    /// is a no-op success.
    async fn mark_all_read(
        &self,
        request: MarkAllNotificationsReadRequest,
    ) -> Result<MarkAllNotificationsReadResponse, Error>;
}

/// Fixture implementation for tests that do not exercise notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureNotifications;

#[async_trait]
impl Notifications for FixtureNotifications {
    async fn list_notifications(
        &self,
        _request: ListNotificationsRequest,
    ) -> Result<ListNotificationsResponse, Error> {
        Ok(ListNotificationsResponse {
            notifications: Vec::new(),
        })
    }

    async fn unread_count(
        &self,
        _request: UnreadCountRequest,
    ) -> Result<UnreadCountResponse, Error> {
        Ok(UnreadCountResponse { unread: 0 })
    }

    async fn mark_read(
        &self,
        request: MarkNotificationReadRequest,
    ) -> Result<MarkNotificationReadResponse, Error> {
        Err(Error::not_found(format!(
            "notification {} not found",
            request.notification_id
        )))
    }

    async fn mark_all_read(
        &self,
        _request: MarkAllNotificationsReadRequest,
    ) -> Result<MarkAllNotificationsReadResponse, Error> {
        Ok(MarkAllNotificationsReadResponse { marked: 0 })
    }
}
