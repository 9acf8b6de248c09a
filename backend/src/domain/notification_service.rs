//! Notification feed service.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::Error;
use crate::domain::ports::{
    ListNotificationsRequest, ListNotificationsResponse, MarkAllNotificationsReadRequest,
    MarkAllNotificationsReadResponse, MarkNotificationReadRequest, MarkNotificationReadResponse,
    NotificationRepository, NotificationRepositoryError, Notifications, UnreadCountRequest,
    UnreadCountResponse,
};

fn map_repository_error(error: NotificationRepositoryError) -> Error {
    match error {
        NotificationRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("notification store unavailable: {message}"))
        }
        NotificationRepositoryError::Query { message } => {
            Error::internal(format!("notification store error: {message}"))
        }
    }
}

/// Service implementing the notification feed driving port.
#[derive(Clone)]
pub struct NotificationService<N> {
    notification_repo: Arc<N>,
}

impl<N> NotificationService<N> {
    /// Create a new notification service with the notification repository.
    pub fn new(notification_repo: Arc<N>) -> Self {
        Self { notification_repo }
    }
}

#[async_trait]
impl<N> Notifications for NotificationService<N>
where
    N: NotificationRepository,
{
    async fn list_notifications(
        &self,
        request: ListNotificationsRequest,
    ) -> Result<ListNotificationsResponse, Error> {
        let notifications = self
            .notification_repo
            .list_for_user(request.caller.user_id())
            .await
            .map_err(map_repository_error)?;
        Ok(ListNotificationsResponse {
            notifications: notifications.into_iter().map(Into::into).collect(),
        })
    }

    async fn unread_count(
        &self,
        request: UnreadCountRequest,
    ) -> Result<UnreadCountResponse, Error> {
        let unread = self
            .notification_repo
            .unread_count_for_user(request.caller.user_id())
            .await
            .map_err(map_repository_error)?;
        Ok(UnreadCountResponse { unread })
    }

    async fn mark_read(
        &self,
        request: MarkNotificationReadRequest,
    ) -> Result<MarkNotificationReadResponse, Error> {
        let marked = self
            .notification_repo
            .mark_read(&request.notification_id, request.caller.user_id())
            .await
            .map_err(map_repository_error)?;
        if !marked {
            return Err(Error::not_found(format!(
                "notification {} not found",
                request.notification_id
            )));
        }
        Ok(MarkNotificationReadResponse)
    }

    async fn mark_all_read(
        &self,
        request: MarkAllNotificationsReadRequest,
    ) -> Result<MarkAllNotificationsReadResponse, Error> {
        let marked = self
            .notification_repo
            .mark_all_read(request.caller.user_id())
            .await
            .map_err(map_repository_error)?;
        Ok(MarkAllNotificationsReadResponse { marked })
    }
}

#[cfg(test)]
#[path = "notification_service_tests.rs"]
mod tests;
