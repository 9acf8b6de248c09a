//! Behavioural tests for the notification feed over the in-memory store.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use rstest::{fixture, rstest};
use uuid::Uuid;

use backend::domain::ports::{
    ListNotificationsRequest, MarkAllNotificationsReadRequest, MarkNotificationReadRequest,
    NotificationRepository, Notifications, UnreadCountRequest,
};
use backend::domain::{
    Caller, CaseId, ErrorCode, NewNotification, NotificationKind, NotificationService, Role,
    UserId,
};
use backend::test_support::InMemoryNotificationRepository;

struct Harness {
    service: NotificationService<InMemoryNotificationRepository>,
    store: Arc<InMemoryNotificationRepository>,
    caller: Caller,
    other: Caller,
}

impl Harness {
    fn new() -> Self {
        let store = Arc::new(InMemoryNotificationRepository::new());
        Self {
            service: NotificationService::new(store.clone()),
            store,
            caller: Caller::new(UserId::random(), Role::Rep),
            other: Caller::new(UserId::random(), Role::Rep),
        }
    }

    /// Seed one stored notification for `recipient`, returning its id.
    async fn seed(&self, recipient: &UserId, minutes_ago: i64) -> Uuid {
        let created_at = Utc
            .with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp")
            - Duration::minutes(minutes_ago);
        let notification = NewNotification {
            id: Uuid::new_v4(),
            user_id: recipient.clone(),
            case_id: CaseId::random(),
            kind: NotificationKind::StatusChanged,
            title: "Case status updated".to_owned(),
            message: "Case at Riverside General is now checked_in".to_owned(),
            created_at,
        };
        self.store.save(&notification).await.expect("seed stored");
        notification.id
    }
}

#[fixture]
fn harness() -> Harness {
    Harness::new()
}

#[rstest]
#[tokio::test]
async fn the_feed_lists_only_the_callers_notifications_newest_first(harness: Harness) {
    let older = harness.seed(harness.caller.user_id(), 30).await;
    let newer = harness.seed(harness.caller.user_id(), 5).await;
    harness.seed(harness.other.user_id(), 1).await;

    let listed = harness
        .service
        .list_notifications(ListNotificationsRequest {
            caller: harness.caller.clone(),
        })
        .await
        .expect("feed listed")
        .notifications;

    let ids: Vec<Uuid> = listed.iter().map(|notification| notification.id).collect();
    assert_eq!(ids, vec![newer, older]);
}

#[rstest]
#[tokio::test]
async fn marking_read_decrements_the_unread_count(harness: Harness) {
    let id = harness.seed(harness.caller.user_id(), 10).await;
    harness.seed(harness.caller.user_id(), 5).await;

    let before = harness
        .service
        .unread_count(UnreadCountRequest {
            caller: harness.caller.clone(),
        })
        .await
        .expect("counted");
    assert_eq!(before.unread, 2);

    harness
        .service
        .mark_read(MarkNotificationReadRequest {
            caller: harness.caller.clone(),
            notification_id: id,
        })
        .await
        .expect("marked read");

    let after = harness
        .service
        .unread_count(UnreadCountRequest {
            caller: harness.caller.clone(),
        })
        .await
        .expect("counted");
    assert_eq!(after.unread, 1);
}

#[rstest]
#[tokio::test]
async fn marking_read_twice_stays_a_success(harness: Harness) {
    let id = harness.seed(harness.caller.user_id(), 10).await;

    for _ in 0..2 {
        harness
            .service
            .mark_read(MarkNotificationReadRequest {
                caller: harness.caller.clone(),
                notification_id: id,
            })
            .await
            .expect("idempotent mark");
    }
}

#[rstest]
#[tokio::test]
async fn marking_all_read_clears_only_the_callers_unread(harness: Harness) {
    harness.seed(harness.caller.user_id(), 30).await;
    harness.seed(harness.caller.user_id(), 5).await;
    harness.seed(harness.other.user_id(), 1).await;

    let response = harness
        .service
        .mark_all_read(MarkAllNotificationsReadRequest {
            caller: harness.caller.clone(),
        })
        .await
        .expect("bulk mark succeeds");
    assert_eq!(response.marked, 2);

    let caller_unread = harness
        .service
        .unread_count(UnreadCountRequest {
            caller: harness.caller.clone(),
        })
        .await
        .expect("counted");
    assert_eq!(caller_unread.unread, 0);

    let other_unread = harness
        .service
        .unread_count(UnreadCountRequest {
            caller: harness.other.clone(),
        })
        .await
        .expect("counted");
    assert_eq!(other_unread.unread, 1);
}

#[rstest]
#[tokio::test]
async fn marking_all_read_on_an_empty_feed_marks_nothing(harness: Harness) {
    let response = harness
        .service
        .mark_all_read(MarkAllNotificationsReadRequest {
            caller: harness.caller.clone(),
        })
        .await
        .expect("empty feed is a no-op");
    assert_eq!(response.marked, 0);
}

#[rstest]
#[tokio::test]
async fn a_foreign_notification_reads_as_missing(harness: Harness) {
    let foreign = harness.seed(harness.other.user_id(), 10).await;

    let err = harness
        .service
        .mark_read(MarkNotificationReadRequest {
            caller: harness.caller.clone(),
            notification_id: foreign,
        })
        .await
        .expect_err("foreign id must not leak");
    assert_eq!(err.code(), ErrorCode::NotFound);
}
