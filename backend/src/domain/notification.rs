//! User-facing notification records emitted on workflow transitions.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Case, CaseId, UserId};

/// Category of a notification event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A new case was assigned to the recipient.
    CaseAssigned,
    /// A case the recipient is involved in changed workflow state.
    StatusChanged,
    /// A case reached its terminal state.
    CaseCompleted,
}

impl NotificationKind {
    /// Stable string form used in persistence and wire payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CaseAssigned => "case_assigned",
            Self::StatusChanged => "status_changed",
            Self::CaseCompleted => "case_completed",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when parsing an unknown notification kind string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("notification kind must be case_assigned, status_changed, or case_completed")]
pub struct UnknownNotificationKind;

impl FromStr for NotificationKind {
    type Err = UnknownNotificationKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "case_assigned" => Ok(Self::CaseAssigned),
            "status_changed" => Ok(Self::StatusChanged),
            "case_completed" => Ok(Self::CaseCompleted),
            _ => Err(UnknownNotificationKind),
        }
    }
}

/// Persisted notification addressed to one user.
///
/// The only legal mutation is marking it read, a one-way `false -> true`
/// transition owned by the recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Record identifier.
    pub id: Uuid,
    /// Recipient of the notification.
    pub user_id: UserId,
    /// Case the event originated from.
    pub case_id: CaseId,
    /// Event category.
    pub kind: NotificationKind,
    /// Short headline shown in notification lists.
    pub title: String,
    /// Longer human-readable description.
    pub message: String,
    /// Whether the recipient has read the notification.
    pub read: bool,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
}

/// Notification awaiting persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub id: Uuid,
    pub user_id: UserId,
    pub case_id: CaseId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl NewNotification {
    fn build(
        recipient: UserId,
        case: &Case,
        kind: NotificationKind,
        title: impl Into<String>,
        message: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: recipient,
            case_id: case.id(),
            kind,
            title: title.into(),
            message,
            created_at,
        }
    }

    /// Notification emitted when a case is created and assigned.
    pub fn case_assigned(recipient: UserId, case: &Case, created_at: DateTime<Utc>) -> Self {
        Self::build(
            recipient,
            case,
            NotificationKind::CaseAssigned,
            "New case assigned",
            format!(
                "You have been assigned a case with {} at {} on {}",
                case.doctor_name(),
                case.hospital_name(),
                case.scheduled_for().format("%Y-%m-%d"),
            ),
            created_at,
        )
    }

    /// Notification emitted on a non-terminal workflow transition.
    pub fn status_changed(recipient: UserId, case: &Case, created_at: DateTime<Utc>) -> Self {
        Self::build(
            recipient,
            case,
            NotificationKind::StatusChanged,
            "Case status updated",
            format!(
                "Case at {} with {} is now {}",
                case.hospital_name(),
                case.doctor_name(),
                case.workflow_status(),
            ),
            created_at,
        )
    }

    /// Notification emitted when a case reaches its terminal state.
    pub fn case_completed(recipient: UserId, case: &Case, created_at: DateTime<Utc>) -> Self {
        Self::build(
            recipient,
            case,
            NotificationKind::CaseCompleted,
            "Case completed",
            format!(
                "Case at {} with {} has been completed",
                case.hospital_name(),
                case.doctor_name(),
            ),
            created_at,
        )
    }
}

impl From<NewNotification> for Notification {
    fn from(value: NewNotification) -> Self {
        Self {
            id: value.id,
            user_id: value.user_id,
            case_id: value.case_id,
            kind: value.kind,
            title: value.title,
            message: value.message,
            read: false,
            created_at: value.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rstest::rstest;

    use super::*;
    use crate::domain::{CaseDraft, CheckInStatus, TraySerial, WorkflowStatus};

    fn sample_case() -> Case {
        let now = Utc::now();
        Case::new(CaseDraft {
            id: CaseId::random(),
            doctor_name: "Dr. Osei".to_owned(),
            hospital_name: "Riverside General".to_owned(),
            city: "Dayton".to_owned(),
            state_code: "OH".to_owned(),
            assigned_rep_id: UserId::random(),
            assigned_tray_serial: TraySerial::new("TR-9").expect("valid serial"),
            scheduled_for: now,
            workflow_status: WorkflowStatus::CheckedIn,
            check_in_status: CheckInStatus::Matched,
            check_in_time: Some(now),
            invoice_submitted: false,
            invoice_submitted_time: None,
            case_completed: false,
            case_completed_time: None,
            completion_notes: None,
            created_at: now,
            updated_at: now,
        })
        .expect("valid case")
    }

    #[test]
    fn status_changed_mentions_current_status() {
        let case = sample_case();
        let notification =
            NewNotification::status_changed(case.assigned_rep_id().clone(), &case, Utc::now());
        assert_eq!(notification.kind, NotificationKind::StatusChanged);
        assert!(notification.message.contains("checked_in"));
        assert_eq!(notification.case_id, case.id());
    }

    #[test]
    fn conversion_starts_unread() {
        let case = sample_case();
        let stored: Notification =
            NewNotification::case_assigned(case.assigned_rep_id().clone(), &case, Utc::now())
                .into();
        assert!(!stored.read);
        assert_eq!(stored.kind, NotificationKind::CaseAssigned);
    }

    #[rstest]
    #[case(NotificationKind::CaseAssigned, "case_assigned")]
    #[case(NotificationKind::StatusChanged, "status_changed")]
    #[case(NotificationKind::CaseCompleted, "case_completed")]
    fn kind_round_trips_through_strings(#[case] kind: NotificationKind, #[case] raw: &str) {
        assert_eq!(kind.as_str(), raw);
        assert_eq!(raw.parse::<NotificationKind>().expect("known kind"), kind);
    }
}
