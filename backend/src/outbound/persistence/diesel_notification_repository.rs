//! PostgreSQL-backed `NotificationRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{NotificationRepository, NotificationRepositoryError};
use crate::domain::{CaseId, NewNotification, Notification, UserId};

use super::diesel_error_mapping::{map_diesel_error_with, map_pool_error_with};
use super::models::{NewNotificationRow, NotificationRow};
use super::pool::{DbPool, PoolError};
use super::schema::notifications;

/// Diesel-backed implementation of the notification repository port.
#[derive(Clone)]
pub struct DieselNotificationRepository {
    pool: DbPool,
}

impl DieselNotificationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> NotificationRepositoryError {
    map_pool_error_with(error, NotificationRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> NotificationRepositoryError {
    map_diesel_error_with(
        error,
        NotificationRepositoryError::query,
        NotificationRepositoryError::connection,
    )
}

/// Convert a database row into a domain notification.
fn row_to_notification(row: NotificationRow) -> Result<Notification, NotificationRepositoryError> {
    let kind = row
        .kind
        .parse()
        .map_err(|err| NotificationRepositoryError::query(format!("decode kind: {err}")))?;
    Ok(Notification {
        id: row.id,
        user_id: UserId::from_uuid(row.user_id),
        case_id: CaseId::from_uuid(row.case_id),
        kind,
        title: row.title,
        message: row.message,
        read: row.read,
        created_at: row.created_at,
    })
}

#[async_trait]
impl NotificationRepository for DieselNotificationRepository {
    async fn save(
        &self,
        notification: &NewNotification,
    ) -> Result<(), NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewNotificationRow {
            id: notification.id,
            user_id: *notification.user_id.as_uuid(),
            case_id: *notification.case_id.as_uuid(),
            kind: notification.kind.as_str(),
            title: &notification.title,
            message: &notification.message,
            read: false,
            created_at: notification.created_at,
        };

        diesel::insert_into(notifications::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Notification>, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<NotificationRow> = notifications::table
            .filter(notifications::user_id.eq(user_id.as_uuid()))
            .order((notifications::created_at.desc(), notifications::id.desc()))
            .select(NotificationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_notification).collect()
    }

    async fn unread_count_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<u64, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let count: i64 = notifications::table
            .filter(
                notifications::user_id
                    .eq(user_id.as_uuid())
                    .and(notifications::read.eq(false)),
            )
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(count.try_into().unwrap_or_default())
    }

    async fn mark_read(
        &self,
        notification_id: &Uuid,
        user_id: &UserId,
    ) -> Result<bool, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Scoping the update to the recipient makes a foreign id
        // indistinguishable from a missing one.
        let affected = diesel::update(
            notifications::table.filter(
                notifications::id
                    .eq(notification_id)
                    .and(notifications::user_id.eq(user_id.as_uuid())),
            ),
        )
        .set(notifications::read.eq(true))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(affected > 0)
    }

    async fn mark_all_read(&self, user_id: &UserId) -> Result<u64, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let affected = diesel::update(
            notifications::table.filter(
                notifications::user_id
                    .eq(user_id.as_uuid())
                    .and(notifications::read.eq(false)),
            ),
        )
        .set(notifications::read.eq(true))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(affected.try_into().unwrap_or_default())
    }
}
