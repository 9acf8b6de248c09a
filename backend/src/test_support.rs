//! Test utilities for the backend crate.
//!
//! Shared helpers for unit tests (in `src/`) and integration tests (in
//! `tests/`): in-memory repository adapters honouring the guarded-write
//! contracts, a capturing push gateway, and a fixed clock. Only compiled
//! with the `test-support` feature.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use mockable::Clock;
use uuid::Uuid;

use crate::domain::ports::{
    AdminCaseUpdate, CaseFilter, CaseRepository, CaseRepositoryError, CheckInWrite,
    NotificationRepository, NotificationRepositoryError, PushGateway, PushGatewayError,
    WorkflowAdvance,
};
use crate::domain::{
    Case, CaseDraft, CaseId, NewNotification, NewTrayScan, Notification, TrayScan, UserId,
    WorkflowStatus,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Editable field bundle mirroring one case row.
fn draft_of(case: &Case) -> CaseDraft {
    CaseDraft {
        id: case.id(),
        doctor_name: case.doctor_name().to_owned(),
        hospital_name: case.hospital_name().to_owned(),
        city: case.city().to_owned(),
        state_code: case.state_code().to_owned(),
        assigned_rep_id: case.assigned_rep_id().clone(),
        assigned_tray_serial: case.assigned_tray_serial().clone(),
        scheduled_for: case.scheduled_for(),
        workflow_status: case.workflow_status(),
        check_in_status: case.check_in_status(),
        check_in_time: case.check_in_time(),
        invoice_submitted: case.invoice_submitted(),
        invoice_submitted_time: case.invoice_submitted_time(),
        case_completed: case.case_completed(),
        case_completed_time: case.case_completed_time(),
        completion_notes: case.completion_notes().map(str::to_owned),
        created_at: case.created_at(),
        updated_at: case.updated_at(),
    }
}

fn rebuild(draft: CaseDraft) -> Result<Case, CaseRepositoryError> {
    Case::new(draft).map_err(|err| CaseRepositoryError::query(err.to_string()))
}

/// In-memory case store honouring the guarded-write contract.
///
/// Guarded mutations take the store lock for their whole read-check-write
/// cycle, so concurrent transition attempts resolve exactly as they would
/// against the database: one writer wins, the rest see `Ok(None)`.
#[derive(Debug, Default)]
pub struct InMemoryCaseRepository {
    cases: Mutex<HashMap<CaseId, Case>>,
    scans: Mutex<Vec<TrayScan>>,
}

impl InMemoryCaseRepository {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with the given cases.
    #[must_use]
    pub fn with_cases(seed: impl IntoIterator<Item = Case>) -> Self {
        let repo = Self::new();
        {
            let mut cases = lock(&repo.cases);
            for case in seed {
                cases.insert(case.id(), case);
            }
        }
        repo
    }

    /// Number of scan records across all cases.
    #[must_use]
    pub fn scan_count(&self) -> usize {
        lock(&self.scans).len()
    }
}

#[async_trait]
impl CaseRepository for InMemoryCaseRepository {
    async fn create(&self, case: &Case) -> Result<(), CaseRepositoryError> {
        lock(&self.cases).insert(case.id(), case.clone());
        Ok(())
    }

    async fn find_by_id(&self, case_id: &CaseId) -> Result<Option<Case>, CaseRepositoryError> {
        Ok(lock(&self.cases).get(case_id).cloned())
    }

    async fn list(&self, filter: &CaseFilter) -> Result<Vec<Case>, CaseRepositoryError> {
        let mut cases: Vec<Case> = lock(&self.cases)
            .values()
            .filter(|case| {
                filter
                    .assigned_rep_id
                    .as_ref()
                    .is_none_or(|rep| case.assigned_rep_id() == rep)
                    && filter
                        .workflow_status
                        .is_none_or(|status| case.workflow_status() == status)
            })
            .cloned()
            .collect();
        cases.sort_by_key(Case::scheduled_for);
        Ok(cases)
    }

    async fn record_check_in(
        &self,
        scan: &NewTrayScan,
        write: &CheckInWrite,
    ) -> Result<Option<Case>, CaseRepositoryError> {
        let mut cases = lock(&self.cases);
        let Some(case) = cases.get(&scan.case_id) else {
            return Ok(None);
        };
        if case.workflow_status() != WorkflowStatus::PendingCheckin {
            return Ok(None);
        }

        let mut draft = draft_of(case);
        draft.check_in_status = write.check_in_status;
        draft.check_in_time = Some(write.at);
        draft.updated_at = write.at;
        if write.advance {
            draft.workflow_status = WorkflowStatus::CheckedIn;
        }
        let updated = rebuild(draft)?;
        cases.insert(updated.id(), updated.clone());
        lock(&self.scans).push(TrayScan::from(scan.clone()));
        Ok(Some(updated))
    }

    async fn advance(
        &self,
        case_id: &CaseId,
        advance: &WorkflowAdvance,
    ) -> Result<Option<Case>, CaseRepositoryError> {
        let mut cases = lock(&self.cases);
        let Some(case) = cases.get(case_id) else {
            return Ok(None);
        };
        if case.workflow_status() != advance.guard() {
            return Ok(None);
        }

        let mut draft = draft_of(case);
        draft.workflow_status = advance.target();
        draft.updated_at = advance.at();
        match advance {
            WorkflowAdvance::InvoiceSubmitted { at } => {
                draft.invoice_submitted = true;
                draft.invoice_submitted_time = Some(*at);
            }
            WorkflowAdvance::CaseCompleted { at, notes } => {
                draft.case_completed = true;
                draft.case_completed_time = Some(*at);
                draft.completion_notes = notes.clone();
            }
        }
        let updated = rebuild(draft)?;
        cases.insert(updated.id(), updated.clone());
        Ok(Some(updated))
    }

    async fn admin_update(
        &self,
        case_id: &CaseId,
        update: &AdminCaseUpdate,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Case>, CaseRepositoryError> {
        let mut cases = lock(&self.cases);
        let Some(case) = cases.get(case_id) else {
            return Ok(None);
        };

        let mut draft = draft_of(case);
        if let Some(value) = &update.doctor_name {
            draft.doctor_name = value.clone();
        }
        if let Some(value) = &update.hospital_name {
            draft.hospital_name = value.clone();
        }
        if let Some(value) = &update.city {
            draft.city = value.clone();
        }
        if let Some(value) = &update.state_code {
            draft.state_code = value.clone();
        }
        if let Some(value) = &update.assigned_rep_id {
            draft.assigned_rep_id = value.clone();
        }
        if let Some(value) = &update.assigned_tray_serial {
            draft.assigned_tray_serial = value.clone();
        }
        if let Some(value) = update.scheduled_for {
            draft.scheduled_for = value;
        }
        if let Some(value) = update.workflow_status {
            draft.workflow_status = value;
        }
        if let Some(value) = update.check_in_status {
            draft.check_in_status = value;
        }
        if let Some(value) = update.check_in_time {
            draft.check_in_time = value;
        }
        if let Some(value) = update.invoice_submitted {
            draft.invoice_submitted = value;
        }
        if let Some(value) = update.invoice_submitted_time {
            draft.invoice_submitted_time = value;
        }
        if let Some(value) = update.case_completed {
            draft.case_completed = value;
        }
        if let Some(value) = update.case_completed_time {
            draft.case_completed_time = value;
        }
        if let Some(value) = &update.completion_notes {
            draft.completion_notes = value.clone();
        }
        draft.updated_at = updated_at;

        let updated = rebuild(draft)?;
        cases.insert(updated.id(), updated.clone());
        Ok(Some(updated))
    }

    async fn list_scans_for_case(
        &self,
        case_id: &CaseId,
    ) -> Result<Vec<TrayScan>, CaseRepositoryError> {
        Ok(lock(&self.scans)
            .iter()
            .filter(|scan| &scan.case_id == case_id)
            .cloned()
            .collect())
    }
}

/// In-memory notification store.
#[derive(Debug, Default)]
pub struct InMemoryNotificationRepository {
    notifications: Mutex<Vec<Notification>>,
}

impl InMemoryNotificationRepository {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored notification, oldest first.
    #[must_use]
    pub fn stored(&self) -> Vec<Notification> {
        lock(&self.notifications).clone()
    }
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn save(
        &self,
        notification: &NewNotification,
    ) -> Result<(), NotificationRepositoryError> {
        lock(&self.notifications).push(Notification::from(notification.clone()));
        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Notification>, NotificationRepositoryError> {
        let mut listed: Vec<Notification> = lock(&self.notifications)
            .iter()
            .filter(|notification| &notification.user_id == user_id)
            .cloned()
            .collect();
        listed.sort_by_key(|notification| std::cmp::Reverse(notification.created_at));
        Ok(listed)
    }

    async fn unread_count_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<u64, NotificationRepositoryError> {
        let count = lock(&self.notifications)
            .iter()
            .filter(|notification| &notification.user_id == user_id && !notification.read)
            .count();
        Ok(count.try_into().unwrap_or_default())
    }

    async fn mark_read(
        &self,
        notification_id: &Uuid,
        user_id: &UserId,
    ) -> Result<bool, NotificationRepositoryError> {
        let mut notifications = lock(&self.notifications);
        match notifications
            .iter_mut()
            .find(|notification| &notification.id == notification_id && &notification.user_id == user_id)
        {
            Some(notification) => {
                notification.read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_all_read(&self, user_id: &UserId) -> Result<u64, NotificationRepositoryError> {
        let mut marked: u64 = 0;
        for notification in lock(&self.notifications)
            .iter_mut()
            .filter(|notification| &notification.user_id == user_id && !notification.read)
        {
            notification.read = true;
            marked += 1;
        }
        Ok(marked)
    }
}

/// Push gateway that records every relayed notification.
#[derive(Debug, Default)]
pub struct CapturingPushGateway {
    pushed: Mutex<Vec<Notification>>,
}

impl CapturingPushGateway {
    /// Create an empty gateway.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of relayed notifications in delivery order.
    #[must_use]
    pub fn pushed(&self) -> Vec<Notification> {
        lock(&self.pushed).clone()
    }
}

#[async_trait]
impl PushGateway for CapturingPushGateway {
    async fn push(&self, notification: &Notification) -> Result<(), PushGatewayError> {
        lock(&self.pushed).push(notification.clone());
        Ok(())
    }
}

/// Clock pinned to one instant so transition timestamps are assertable.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}
