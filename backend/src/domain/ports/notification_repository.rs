//! Port for notification persistence and read-state updates.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{NewNotification, Notification, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by notification repository adapters.
    pub enum NotificationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "notification repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "notification repository query failed: {message}",
    }
}

/// Port for storing notifications and tracking read state.
///
/// `mark_read` is scoped to the recipient: a notification id belonging to a
/// different user behaves as if it did not exist.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Persist a notification.
    async fn save(&self, notification: &NewNotification)
    -> Result<(), NotificationRepositoryError>;

    /// List a user's notifications, newest first.
    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Notification>, NotificationRepositoryError>;

    /// Count a user's unread notifications.
    async fn unread_count_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<u64, NotificationRepositoryError>;

    /// Mark one of the user's notifications as read. Returns false when no
    /// notification with that id belongs to the user.
    async fn mark_read(
        &self,
        notification_id: &Uuid,
        user_id: &UserId,
    ) -> Result<bool, NotificationRepositoryError>;

    /// Mark every unread notification belonging to the user as read,
    /// returning how many were updated.
    async fn mark_all_read(&self, user_id: &UserId) -> Result<u64, NotificationRepositoryError>;
}

/// Fixture implementation for tests that do not exercise notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureNotificationRepository;

#[async_trait]
impl NotificationRepository for FixtureNotificationRepository {
    async fn save(
        &self,
        _notification: &NewNotification,
    ) -> Result<(), NotificationRepositoryError> {
        Ok(())
    }

    async fn list_for_user(
        &self,
        _user_id: &UserId,
    ) -> Result<Vec<Notification>, NotificationRepositoryError> {
        Ok(Vec::new())
    }

    async fn unread_count_for_user(
        &self,
        _user_id: &UserId,
    ) -> Result<u64, NotificationRepositoryError> {
        Ok(0)
    }

    async fn mark_read(
        &self,
        _notification_id: &Uuid,
        _user_id: &UserId,
    ) -> Result<bool, NotificationRepositoryError> {
        Ok(false)
    }

    async fn mark_all_read(&self, _user_id: &UserId) -> Result<u64, NotificationRepositoryError> {
        Ok(0)
    }
}
