//! Case workflow domain services.
//!
//! Implements the workflow driving ports on top of the case repository: the
//! scan-driven check-in protocol, the forward invoice and completion
//! transitions, and unrestricted admin edits. Concurrent transition attempts
//! are resolved by the repository's guarded writes; this service translates a
//! rejected guard into the precise client-facing error by re-reading the case.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::ports::{
    AdminCaseUpdate, AdminCaseUpdatePayload, AdminUpdateCaseRequest, AdminUpdateCaseResponse,
    CaseEventBus, CaseRepository, CaseRepositoryError, CaseWorkflowCommand, CheckInWrite,
    CompleteCaseRequest, CompleteCaseResponse, CreateCaseRequest, CreateCaseResponse,
    NotificationRepository, PushGateway, SubmitInvoiceRequest, SubmitInvoiceResponse,
    SubmitScanRequest, SubmitScanResponse, WorkflowAdvance,
};
use crate::domain::{
    Caller, Case, CaseDraft, CaseEvent, CaseEventKind, CaseId, CheckInStatus, Error,
    NewNotification, NewTrayScan, Notification, TraySerial, UserId, WorkflowStatus, verify,
};

pub(crate) fn map_repository_error(error: CaseRepositoryError) -> Error {
    match error {
        CaseRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("case store unavailable: {message}"))
        }
        CaseRepositoryError::Query { message } => {
            Error::internal(format!("case store error: {message}"))
        }
    }
}

fn require_admin(caller: &Caller) -> Result<(), Error> {
    if caller.is_admin() {
        Ok(())
    } else {
        Err(Error::forbidden("administrator role required"))
    }
}

fn require_participant(caller: &Caller, case: &Case) -> Result<(), Error> {
    if caller.may_act_on(case.assigned_rep_id()) {
        Ok(())
    } else {
        Err(Error::forbidden("case belongs to another rep"))
    }
}

/// Case workflow service implementing the command driving port.
pub struct CaseWorkflowService<R, N, P, B> {
    case_repo: Arc<R>,
    notification_repo: Arc<N>,
    push_gateway: Arc<P>,
    event_bus: Arc<B>,
    clock: Arc<dyn Clock>,
    admin_recipients: Vec<UserId>,
}

impl<R, N, P, B> CaseWorkflowService<R, N, P, B> {
    /// Create a new workflow service.
    ///
    /// `admin_recipients` lists administrators who receive status-change
    /// notifications alongside the assigned rep; leave it empty to notify
    /// reps only.
    pub fn new(
        case_repo: Arc<R>,
        notification_repo: Arc<N>,
        push_gateway: Arc<P>,
        event_bus: Arc<B>,
        clock: Arc<dyn Clock>,
        admin_recipients: Vec<UserId>,
    ) -> Self {
        Self {
            case_repo,
            notification_repo,
            push_gateway,
            event_bus,
            clock,
            admin_recipients,
        }
    }
}

impl<R, N, P, B> CaseWorkflowService<R, N, P, B>
where
    R: CaseRepository,
    N: NotificationRepository,
    P: PushGateway,
    B: CaseEventBus,
{
    /// Everyone who should hear about a change to this case, except whoever
    /// caused it.
    fn recipients_for(&self, case: &Case, caller: &Caller) -> Vec<UserId> {
        let mut recipients = Vec::new();
        if case.assigned_rep_id() != caller.user_id() {
            recipients.push(case.assigned_rep_id().clone());
        }
        for admin in &self.admin_recipients {
            if admin != caller.user_id() && !recipients.contains(admin) {
                recipients.push(admin.clone());
            }
        }
        recipients
    }

    /// Store and relay notifications. Failures are logged and swallowed: the
    /// workflow write has already committed and must not be reported as
    /// failed because a side channel is down.
    async fn notify(&self, notifications: Vec<NewNotification>) {
        for notification in notifications {
            if let Err(err) = self.notification_repo.save(&notification).await {
                tracing::warn!(
                    case_id = %notification.case_id,
                    error = %err,
                    "failed to store notification",
                );
                continue;
            }
            let stored = Notification::from(notification);
            if let Err(err) = self.push_gateway.push(&stored).await {
                tracing::warn!(
                    case_id = %stored.case_id,
                    error = %err,
                    "failed to relay notification to push channel",
                );
            }
        }
    }

    async fn load_case(&self, case_id: &CaseId) -> Result<Case, Error> {
        self.case_repo
            .find_by_id(case_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("case {case_id} not found")))
    }

    /// A guarded write matched no row: either the case vanished or another
    /// writer moved it on first. Re-read to report which.
    async fn resolve_rejected_guard(&self, case_id: &CaseId, attempted: &str) -> Error {
        match self.case_repo.find_by_id(case_id).await {
            Ok(Some(case)) => Error::invalid_transition(case.workflow_status().as_str(), attempted),
            Ok(None) => Error::not_found(format!("case {case_id} not found")),
            Err(err) => map_repository_error(err),
        }
    }

    async fn apply_advance(
        &self,
        caller: &Caller,
        case_id: &CaseId,
        advance: WorkflowAdvance,
        attempted: &str,
    ) -> Result<Case, Error> {
        let before = self.load_case(case_id).await?;
        require_participant(caller, &before)?;
        if before.workflow_status() != advance.guard() {
            return Err(Error::invalid_transition(
                before.workflow_status().as_str(),
                attempted,
            ));
        }

        let updated = self
            .case_repo
            .advance(case_id, &advance)
            .await
            .map_err(map_repository_error)?;
        let Some(case) = updated else {
            return Err(self.resolve_rejected_guard(case_id, attempted).await);
        };

        self.event_bus.publish(CaseEvent::new(
            case.id(),
            CaseEventKind::StatusChanged {
                from: advance.guard(),
                to: advance.target(),
            },
            advance.at(),
        ));
        Ok(case)
    }

    fn admin_update_from_payload(
        &self,
        payload: AdminCaseUpdatePayload,
    ) -> Result<AdminCaseUpdate, Error> {
        let assigned_tray_serial = payload
            .assigned_tray_serial
            .map(TraySerial::new)
            .transpose()
            .map_err(|err| Error::invalid_request(format!("invalid case update: {err}")))?;
        let update = AdminCaseUpdate {
            doctor_name: payload.doctor_name,
            hospital_name: payload.hospital_name,
            city: payload.city,
            state_code: payload.state,
            assigned_rep_id: payload.assigned_rep_id,
            assigned_tray_serial,
            scheduled_for: payload.scheduled_for,
            workflow_status: payload.workflow_status,
            check_in_status: payload.check_in_status,
            check_in_time: payload.check_in_time,
            invoice_submitted: payload.invoice_submitted,
            invoice_submitted_time: payload.invoice_submitted_time,
            case_completed: payload.case_completed,
            case_completed_time: payload.case_completed_time,
            completion_notes: payload.completion_notes,
        };
        for field in [
            ("doctorName", &update.doctor_name),
            ("hospitalName", &update.hospital_name),
            ("city", &update.city),
            ("state", &update.state_code),
        ] {
            if let (name, Some(value)) = field {
                if value.trim().is_empty() {
                    return Err(Error::invalid_request(format!(
                        "invalid case update: {name} must not be blank"
                    )));
                }
            }
        }
        Ok(update)
    }
}

#[async_trait]
impl<R, N, P, B> CaseWorkflowCommand for CaseWorkflowService<R, N, P, B>
where
    R: CaseRepository,
    N: NotificationRepository,
    P: PushGateway,
    B: CaseEventBus,
{
    async fn create_case(&self, request: CreateCaseRequest) -> Result<CreateCaseResponse, Error> {
        require_admin(&request.caller)?;

        let now = self.clock.utc();
        let serial = TraySerial::new(&request.case.assigned_tray_serial)
            .map_err(|err| Error::invalid_request(format!("invalid case payload: {err}")))?;
        let case = Case::new(CaseDraft {
            id: CaseId::random(),
            doctor_name: request.case.doctor_name,
            hospital_name: request.case.hospital_name,
            city: request.case.city,
            state_code: request.case.state,
            assigned_rep_id: request.case.assigned_rep_id,
            assigned_tray_serial: serial,
            scheduled_for: request.case.scheduled_for,
            workflow_status: WorkflowStatus::PendingCheckin,
            check_in_status: CheckInStatus::NotCheckedIn,
            check_in_time: None,
            invoice_submitted: false,
            invoice_submitted_time: None,
            case_completed: false,
            case_completed_time: None,
            completion_notes: None,
            created_at: now,
            updated_at: now,
        })
        .map_err(|err| Error::invalid_request(format!("invalid case payload: {err}")))?;

        self.case_repo
            .create(&case)
            .await
            .map_err(map_repository_error)?;

        self.event_bus.publish(CaseEvent::new(
            case.id(),
            CaseEventKind::Created {
                assigned_rep_id: case.assigned_rep_id().clone(),
            },
            now,
        ));
        self.notify(vec![NewNotification::case_assigned(
            case.assigned_rep_id().clone(),
            &case,
            now,
        )])
        .await;

        Ok(CreateCaseResponse { case: case.into() })
    }

    async fn submit_scan(&self, request: SubmitScanRequest) -> Result<SubmitScanResponse, Error> {
        if request.scanned_serial.trim().is_empty() {
            return Err(Error::invalid_request("scanned serial must not be blank"));
        }

        let before = self.load_case(&request.case_id).await?;
        require_participant(&request.caller, &before)?;
        if before.workflow_status() != WorkflowStatus::PendingCheckin {
            return Err(Error::invalid_transition(
                before.workflow_status().as_str(),
                "check_in",
            ));
        }

        let now = self.clock.utc();
        let result = verify(before.assigned_tray_serial(), &request.scanned_serial);
        let scan = NewTrayScan::record(
            request.case_id,
            request.caller.user_id().clone(),
            request.scanned_serial,
            result,
            now,
        );
        let write = CheckInWrite {
            check_in_status: if result.is_match() {
                CheckInStatus::Matched
            } else {
                CheckInStatus::Mismatched
            },
            at: now,
            advance: result.is_match(),
        };

        let updated = self
            .case_repo
            .record_check_in(&scan, &write)
            .await
            .map_err(map_repository_error)?;
        let Some(case) = updated else {
            return Err(self.resolve_rejected_guard(&request.case_id, "check_in").await);
        };

        self.event_bus.publish(CaseEvent::new(
            case.id(),
            CaseEventKind::ScanRecorded {
                result,
                check_in_status: case.check_in_status(),
            },
            now,
        ));
        if result.is_match() {
            self.event_bus.publish(CaseEvent::new(
                case.id(),
                CaseEventKind::StatusChanged {
                    from: WorkflowStatus::PendingCheckin,
                    to: WorkflowStatus::CheckedIn,
                },
                now,
            ));
            let recipients = self.recipients_for(&case, &request.caller);
            self.notify(
                recipients
                    .into_iter()
                    .map(|recipient| NewNotification::status_changed(recipient, &case, now))
                    .collect(),
            )
            .await;
        }

        Ok(SubmitScanResponse {
            case: case.into(),
            scan: scan_payload(scan),
        })
    }

    async fn submit_invoice(
        &self,
        request: SubmitInvoiceRequest,
    ) -> Result<SubmitInvoiceResponse, Error> {
        let now = self.clock.utc();
        let case = self
            .apply_advance(
                &request.caller,
                &request.case_id,
                WorkflowAdvance::InvoiceSubmitted { at: now },
                "submit_invoice",
            )
            .await?;

        let recipients = self.recipients_for(&case, &request.caller);
        self.notify(
            recipients
                .into_iter()
                .map(|recipient| NewNotification::status_changed(recipient, &case, now))
                .collect(),
        )
        .await;

        Ok(SubmitInvoiceResponse { case: case.into() })
    }

    async fn complete_case(
        &self,
        request: CompleteCaseRequest,
    ) -> Result<CompleteCaseResponse, Error> {
        let now = self.clock.utc();
        let notes = request
            .completion_notes
            .map(|notes| notes.trim().to_owned())
            .filter(|notes| !notes.is_empty());
        let case = self
            .apply_advance(
                &request.caller,
                &request.case_id,
                WorkflowAdvance::CaseCompleted { at: now, notes },
                "complete_case",
            )
            .await?;

        let recipients = self.recipients_for(&case, &request.caller);
        self.notify(
            recipients
                .into_iter()
                .map(|recipient| NewNotification::case_completed(recipient, &case, now))
                .collect(),
        )
        .await;

        Ok(CompleteCaseResponse { case: case.into() })
    }

    async fn admin_update(
        &self,
        request: AdminUpdateCaseRequest,
    ) -> Result<AdminUpdateCaseResponse, Error> {
        require_admin(&request.caller)?;
        let update = self.admin_update_from_payload(request.update)?;

        let before = self.load_case(&request.case_id).await?;
        let workflow_after = update
            .workflow_status
            .unwrap_or_else(|| before.workflow_status());
        let check_in_after = update
            .check_in_status
            .unwrap_or_else(|| before.check_in_status());
        if check_in_after == CheckInStatus::Mismatched
            && workflow_after != WorkflowStatus::PendingCheckin
        {
            return Err(Error::invalid_request(
                "invalid case update: a mismatched check-in can only exist while the case is \
                 pending check-in",
            ));
        }

        let now = self.clock.utc();
        let rep_changed = update
            .assigned_rep_id
            .as_ref()
            .is_some_and(|rep| rep != before.assigned_rep_id());
        let updated = self
            .case_repo
            .admin_update(&request.case_id, &update, now)
            .await
            .map_err(map_repository_error)?;
        let Some(case) = updated else {
            return Err(Error::not_found(format!(
                "case {} not found",
                request.case_id
            )));
        };

        self.event_bus
            .publish(CaseEvent::new(case.id(), CaseEventKind::AdminUpdated, now));
        if rep_changed {
            self.notify(vec![NewNotification::case_assigned(
                case.assigned_rep_id().clone(),
                &case,
                now,
            )])
            .await;
        }

        Ok(AdminUpdateCaseResponse { case: case.into() })
    }
}

fn scan_payload(scan: NewTrayScan) -> crate::domain::ports::TrayScanPayload {
    crate::domain::ports::TrayScanPayload::from(crate::domain::TrayScan::from(scan))
}

#[cfg(test)]
#[path = "case_workflow_service_tests.rs"]
mod tests;
