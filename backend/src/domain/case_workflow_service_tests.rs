//! Behavioural coverage for the case workflow service.

use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use mockable::Clock;
use rstest::rstest;

use super::*;
use crate::domain::ports::{
    MockCaseEventBus, MockCaseRepository, MockNotificationRepository, MockPushGateway,
    NewCasePayload, NotificationRepositoryError,
};
use crate::domain::{ErrorCode, NotificationKind, Role, ScanResult};

const SERIAL: &str = "TR-2024-001";
const WRONG_SERIAL: &str = "TR-2024-999";

#[derive(Debug, Clone, Copy)]
struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

fn fixed_now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-03-14T09:26:53Z")
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

fn rep() -> Caller {
    Caller::new(UserId::random(), Role::Rep)
}

fn admin() -> Caller {
    Caller::new(UserId::random(), Role::Admin)
}

fn case_with(
    assigned_rep: &UserId,
    workflow_status: WorkflowStatus,
    check_in_status: CheckInStatus,
) -> Case {
    let now = fixed_now();
    Case::new(CaseDraft {
        id: CaseId::random(),
        doctor_name: "Dr. Vance".to_owned(),
        hospital_name: "Lakeview Surgical".to_owned(),
        city: "Madison".to_owned(),
        state_code: "WI".to_owned(),
        assigned_rep_id: assigned_rep.clone(),
        assigned_tray_serial: TraySerial::new(SERIAL).expect("valid serial"),
        scheduled_for: now,
        workflow_status,
        check_in_status,
        check_in_time: (check_in_status != CheckInStatus::NotCheckedIn).then(|| now),
        invoice_submitted: workflow_status >= WorkflowStatus::InvoiceSubmitted,
        invoice_submitted_time: (workflow_status >= WorkflowStatus::InvoiceSubmitted)
            .then(|| now),
        case_completed: workflow_status == WorkflowStatus::CaseCompleted,
        case_completed_time: (workflow_status == WorkflowStatus::CaseCompleted).then(|| now),
        completion_notes: None,
        created_at: now,
        updated_at: now,
    })
    .expect("valid case")
}

struct Harness {
    case_repo: MockCaseRepository,
    notification_repo: MockNotificationRepository,
    push_gateway: MockPushGateway,
    event_bus: MockCaseEventBus,
    admin_recipients: Vec<UserId>,
}

impl Harness {
    fn new() -> Self {
        Self {
            case_repo: MockCaseRepository::new(),
            notification_repo: MockNotificationRepository::new(),
            push_gateway: MockPushGateway::new(),
            event_bus: MockCaseEventBus::new(),
            admin_recipients: Vec::new(),
        }
    }

    fn quiet(mut self) -> Self {
        self.notification_repo.expect_save().returning(|_| Ok(()));
        self.push_gateway.expect_push().returning(|_| Ok(()));
        self.event_bus.expect_publish().return_const(());
        self
    }

    fn service(
        self,
    ) -> CaseWorkflowService<
        MockCaseRepository,
        MockNotificationRepository,
        MockPushGateway,
        MockCaseEventBus,
    > {
        CaseWorkflowService::new(
            Arc::new(self.case_repo),
            Arc::new(self.notification_repo),
            Arc::new(self.push_gateway),
            Arc::new(self.event_bus),
            Arc::new(FixedClock(fixed_now())),
            self.admin_recipients,
        )
    }
}

fn new_case_payload(assigned_rep: &UserId) -> NewCasePayload {
    NewCasePayload {
        doctor_name: "Dr. Vance".to_owned(),
        hospital_name: "Lakeview Surgical".to_owned(),
        city: "Madison".to_owned(),
        state: "WI".to_owned(),
        assigned_rep_id: assigned_rep.clone(),
        assigned_tray_serial: SERIAL.to_owned(),
        scheduled_for: fixed_now(),
    }
}

#[tokio::test]
async fn create_case_requires_admin() {
    let service = Harness::new().service();
    let caller = rep();
    let err = service
        .create_case(CreateCaseRequest {
            case: new_case_payload(caller.user_id()),
            caller,
        })
        .await
        .expect_err("rep cannot create cases");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn create_case_persists_and_notifies_the_assigned_rep() {
    let assigned = UserId::random();
    let mut harness = Harness::new();
    harness
        .case_repo
        .expect_create()
        .times(1)
        .returning(|_| Ok(()));
    let expected_rep = assigned.clone();
    harness
        .notification_repo
        .expect_save()
        .times(1)
        .withf(move |notification| {
            notification.user_id == expected_rep
                && notification.kind == NotificationKind::CaseAssigned
        })
        .returning(|_| Ok(()));
    harness.push_gateway.expect_push().times(1).returning(|_| Ok(()));
    harness
        .event_bus
        .expect_publish()
        .times(1)
        .withf(|event| matches!(event.kind, CaseEventKind::Created { .. }))
        .return_const(());

    let service = harness.service();
    let response = service
        .create_case(CreateCaseRequest {
            caller: admin(),
            case: new_case_payload(&assigned),
        })
        .await
        .expect("create succeeds");

    assert_eq!(
        response.case.workflow_status,
        WorkflowStatus::PendingCheckin
    );
    assert_eq!(response.case.check_in_status, CheckInStatus::NotCheckedIn);
    assert_eq!(response.case.created_at, fixed_now());
}

#[rstest]
#[case("")]
#[case("   ")]
#[tokio::test]
async fn blank_scan_is_rejected_before_touching_the_store(#[case] scanned: &str) {
    let service = Harness::new().service();
    let err = service
        .submit_scan(SubmitScanRequest {
            caller: rep(),
            case_id: CaseId::random(),
            scanned_serial: scanned.to_owned(),
        })
        .await
        .expect_err("blank scan rejected");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn scan_against_unknown_case_is_not_found() {
    let mut harness = Harness::new();
    harness
        .case_repo
        .expect_find_by_id()
        .returning(|_| Ok(None));
    let service = harness.service();
    let err = service
        .submit_scan(SubmitScanRequest {
            caller: rep(),
            case_id: CaseId::random(),
            scanned_serial: SERIAL.to_owned(),
        })
        .await
        .expect_err("unknown case");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn scan_by_another_rep_is_forbidden() {
    let assigned = UserId::random();
    let case = case_with(
        &assigned,
        WorkflowStatus::PendingCheckin,
        CheckInStatus::NotCheckedIn,
    );
    let mut harness = Harness::new();
    let stored = case.clone();
    harness
        .case_repo
        .expect_find_by_id()
        .returning(move |_| Ok(Some(stored.clone())));
    let service = harness.service();
    let err = service
        .submit_scan(SubmitScanRequest {
            caller: rep(),
            case_id: case.id(),
            scanned_serial: SERIAL.to_owned(),
        })
        .await
        .expect_err("foreign case");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn matched_scan_checks_the_case_in() {
    let caller = rep();
    let case = case_with(
        caller.user_id(),
        WorkflowStatus::PendingCheckin,
        CheckInStatus::NotCheckedIn,
    );
    let checked_in = case_with(caller.user_id(), WorkflowStatus::CheckedIn, CheckInStatus::Matched);

    let mut harness = Harness::new().quiet();
    let stored = case.clone();
    harness
        .case_repo
        .expect_find_by_id()
        .returning(move |_| Ok(Some(stored.clone())));
    let updated = checked_in.clone();
    harness
        .case_repo
        .expect_record_check_in()
        .times(1)
        .withf(|scan, write| {
            scan.result == ScanResult::Matched
                && scan.scanned_serial == SERIAL
                && write.check_in_status == CheckInStatus::Matched
                && write.advance
        })
        .returning(move |_, _| Ok(Some(updated.clone())));

    let service = harness.service();
    let response = service
        .submit_scan(SubmitScanRequest {
            caller,
            case_id: case.id(),
            scanned_serial: format!("  {SERIAL} "),
        })
        .await
        .expect("matched scan succeeds");

    assert_eq!(response.case.workflow_status, WorkflowStatus::CheckedIn);
    assert_eq!(response.scan.result, ScanResult::Matched);
    assert_eq!(response.scan.scanned_serial, SERIAL);
}

#[tokio::test]
async fn mismatched_scan_records_but_does_not_advance() {
    let caller = rep();
    let case = case_with(
        caller.user_id(),
        WorkflowStatus::PendingCheckin,
        CheckInStatus::NotCheckedIn,
    );
    let mismatched = case_with(
        caller.user_id(),
        WorkflowStatus::PendingCheckin,
        CheckInStatus::Mismatched,
    );

    let mut harness = Harness::new();
    let stored = case.clone();
    harness
        .case_repo
        .expect_find_by_id()
        .returning(move |_| Ok(Some(stored.clone())));
    let updated = mismatched.clone();
    harness
        .case_repo
        .expect_record_check_in()
        .times(1)
        .withf(|scan, write| {
            scan.result == ScanResult::Mismatched
                && write.check_in_status == CheckInStatus::Mismatched
                && !write.advance
        })
        .returning(move |_, _| Ok(Some(updated.clone())));
    // Only the scan event fires; no status change, no notifications.
    harness
        .event_bus
        .expect_publish()
        .times(1)
        .withf(|event| {
            matches!(
                event.kind,
                CaseEventKind::ScanRecorded {
                    result: ScanResult::Mismatched,
                    ..
                }
            )
        })
        .return_const(());

    let service = harness.service();
    let response = service
        .submit_scan(SubmitScanRequest {
            caller,
            case_id: case.id(),
            scanned_serial: WRONG_SERIAL.to_owned(),
        })
        .await
        .expect("mismatched scan still succeeds");

    assert_eq!(
        response.case.workflow_status,
        WorkflowStatus::PendingCheckin
    );
    assert_eq!(response.case.check_in_status, CheckInStatus::Mismatched);
    assert_eq!(response.scan.result, ScanResult::Mismatched);
}

#[tokio::test]
async fn scan_after_check_in_is_an_invalid_transition() {
    let caller = rep();
    let case = case_with(caller.user_id(), WorkflowStatus::CheckedIn, CheckInStatus::Matched);
    let mut harness = Harness::new();
    let stored = case.clone();
    harness
        .case_repo
        .expect_find_by_id()
        .returning(move |_| Ok(Some(stored.clone())));
    let service = harness.service();
    let err = service
        .submit_scan(SubmitScanRequest {
            caller,
            case_id: case.id(),
            scanned_serial: SERIAL.to_owned(),
        })
        .await
        .expect_err("already checked in");
    assert_eq!(err.code(), ErrorCode::InvalidTransition);
    assert!(err.message().contains("checked_in"));
}

#[tokio::test]
async fn losing_a_check_in_race_reports_invalid_transition() {
    let caller = rep();
    let pending = case_with(
        caller.user_id(),
        WorkflowStatus::PendingCheckin,
        CheckInStatus::NotCheckedIn,
    );
    let raced = case_with(caller.user_id(), WorkflowStatus::CheckedIn, CheckInStatus::Matched);

    let mut harness = Harness::new();
    let mut seq = mockall::Sequence::new();
    let first = pending.clone();
    harness
        .case_repo
        .expect_find_by_id()
        .times(1)
        .in_sequence(&mut seq)
        .returning(move |_| Ok(Some(first.clone())));
    // The guarded write loses: another writer checked the case in between the
    // read and the write. Nothing is persisted for the loser.
    harness
        .case_repo
        .expect_record_check_in()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(None));
    let second = raced.clone();
    harness
        .case_repo
        .expect_find_by_id()
        .times(1)
        .in_sequence(&mut seq)
        .returning(move |_| Ok(Some(second.clone())));

    let service = harness.service();
    let err = service
        .submit_scan(SubmitScanRequest {
            caller,
            case_id: pending.id(),
            scanned_serial: SERIAL.to_owned(),
        })
        .await
        .expect_err("race loser gets a transition error");
    assert_eq!(err.code(), ErrorCode::InvalidTransition);
}

#[tokio::test]
async fn submit_invoice_advances_a_checked_in_case() {
    let caller = rep();
    let case = case_with(caller.user_id(), WorkflowStatus::CheckedIn, CheckInStatus::Matched);
    let invoiced = case_with(
        caller.user_id(),
        WorkflowStatus::InvoiceSubmitted,
        CheckInStatus::Matched,
    );

    let mut harness = Harness::new().quiet();
    let stored = case.clone();
    harness
        .case_repo
        .expect_find_by_id()
        .returning(move |_| Ok(Some(stored.clone())));
    let updated = invoiced.clone();
    harness
        .case_repo
        .expect_advance()
        .times(1)
        .withf(|_, advance| {
            matches!(advance, WorkflowAdvance::InvoiceSubmitted { .. })
                && advance.guard() == WorkflowStatus::CheckedIn
        })
        .returning(move |_, _| Ok(Some(updated.clone())));

    let service = harness.service();
    let response = service
        .submit_invoice(SubmitInvoiceRequest {
            caller,
            case_id: case.id(),
        })
        .await
        .expect("invoice succeeds");
    assert_eq!(
        response.case.workflow_status,
        WorkflowStatus::InvoiceSubmitted
    );
}

#[rstest]
#[case(WorkflowStatus::PendingCheckin, CheckInStatus::NotCheckedIn)]
#[case(WorkflowStatus::InvoiceSubmitted, CheckInStatus::Matched)]
#[case(WorkflowStatus::CaseCompleted, CheckInStatus::Matched)]
#[tokio::test]
async fn submit_invoice_outside_checked_in_is_rejected(
    #[case] status: WorkflowStatus,
    #[case] check_in: CheckInStatus,
) {
    let caller = rep();
    let case = case_with(caller.user_id(), status, check_in);
    let mut harness = Harness::new();
    let stored = case.clone();
    harness
        .case_repo
        .expect_find_by_id()
        .returning(move |_| Ok(Some(stored.clone())));
    let service = harness.service();
    let err = service
        .submit_invoice(SubmitInvoiceRequest {
            caller,
            case_id: case.id(),
        })
        .await
        .expect_err("wrong stage");
    assert_eq!(err.code(), ErrorCode::InvalidTransition);
}

#[tokio::test]
async fn complete_case_trims_notes_and_notifies() {
    let caller = rep();
    let admin_id = UserId::random();
    let case = case_with(
        caller.user_id(),
        WorkflowStatus::InvoiceSubmitted,
        CheckInStatus::Matched,
    );
    let completed = case_with(
        caller.user_id(),
        WorkflowStatus::CaseCompleted,
        CheckInStatus::Matched,
    );

    let mut harness = Harness::new();
    harness.admin_recipients = vec![admin_id.clone()];
    let stored = case.clone();
    harness
        .case_repo
        .expect_find_by_id()
        .returning(move |_| Ok(Some(stored.clone())));
    let updated = completed.clone();
    harness
        .case_repo
        .expect_advance()
        .times(1)
        .withf(|_, advance| {
            matches!(
                advance,
                WorkflowAdvance::CaseCompleted { notes: Some(notes), .. }
                    if notes == "tray returned to depot"
            )
        })
        .returning(move |_, _| Ok(Some(updated.clone())));
    harness
        .notification_repo
        .expect_save()
        .times(1)
        .withf(move |notification| {
            notification.user_id == admin_id
                && notification.kind == NotificationKind::CaseCompleted
        })
        .returning(|_| Ok(()));
    harness.push_gateway.expect_push().times(1).returning(|_| Ok(()));
    harness.event_bus.expect_publish().return_const(());

    let service = harness.service();
    let response = service
        .complete_case(CompleteCaseRequest {
            caller,
            case_id: case.id(),
            completion_notes: Some("  tray returned to depot \n".to_owned()),
        })
        .await
        .expect("completion succeeds");
    assert_eq!(response.case.workflow_status, WorkflowStatus::CaseCompleted);
}

#[tokio::test]
async fn completed_case_accepts_no_further_transitions() {
    let caller = rep();
    let case = case_with(
        caller.user_id(),
        WorkflowStatus::CaseCompleted,
        CheckInStatus::Matched,
    );
    let mut harness = Harness::new();
    let stored = case.clone();
    harness
        .case_repo
        .expect_find_by_id()
        .returning(move |_| Ok(Some(stored.clone())));
    let service = harness.service();
    let err = service
        .complete_case(CompleteCaseRequest {
            caller,
            case_id: case.id(),
            completion_notes: None,
        })
        .await
        .expect_err("terminal state");
    assert_eq!(err.code(), ErrorCode::InvalidTransition);
    assert!(err.message().contains("case_completed"));
}

#[tokio::test]
async fn notification_failures_do_not_fail_the_workflow_write() {
    let caller = rep();
    let admin_id = UserId::random();
    let case = case_with(caller.user_id(), WorkflowStatus::CheckedIn, CheckInStatus::Matched);
    let invoiced = case_with(
        caller.user_id(),
        WorkflowStatus::InvoiceSubmitted,
        CheckInStatus::Matched,
    );

    let mut harness = Harness::new();
    harness.admin_recipients = vec![admin_id];
    let stored = case.clone();
    harness
        .case_repo
        .expect_find_by_id()
        .returning(move |_| Ok(Some(stored.clone())));
    let updated = invoiced.clone();
    harness
        .case_repo
        .expect_advance()
        .returning(move |_, _| Ok(Some(updated.clone())));
    harness
        .notification_repo
        .expect_save()
        .returning(|_| Err(NotificationRepositoryError::connection("pool exhausted")));
    // Storage failed, so nothing reaches the push channel either.
    harness.push_gateway.expect_push().times(0);
    harness.event_bus.expect_publish().return_const(());

    let service = harness.service();
    service
        .submit_invoice(SubmitInvoiceRequest {
            caller,
            case_id: case.id(),
        })
        .await
        .expect("write committed despite notification failure");
}

#[tokio::test]
async fn admin_update_requires_admin() {
    let service = Harness::new().service();
    let err = service
        .admin_update(AdminUpdateCaseRequest {
            caller: rep(),
            case_id: CaseId::random(),
            update: AdminCaseUpdatePayload::default(),
        })
        .await
        .expect_err("rep cannot bypass the workflow");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn admin_update_rejects_a_mismatch_outside_pending_checkin() {
    let assigned = UserId::random();
    let case = case_with(&assigned, WorkflowStatus::CheckedIn, CheckInStatus::Matched);
    let mut harness = Harness::new();
    let stored = case.clone();
    harness
        .case_repo
        .expect_find_by_id()
        .returning(move |_| Ok(Some(stored.clone())));
    let service = harness.service();
    let err = service
        .admin_update(AdminUpdateCaseRequest {
            caller: admin(),
            case_id: case.id(),
            update: AdminCaseUpdatePayload {
                check_in_status: Some(CheckInStatus::Mismatched),
                ..AdminCaseUpdatePayload::default()
            },
        })
        .await
        .expect_err("invariant enforced");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn empty_admin_update_still_refreshes_the_row() {
    let assigned = UserId::random();
    let case = case_with(&assigned, WorkflowStatus::CheckedIn, CheckInStatus::Matched);
    let mut harness = Harness::new();
    let stored = case.clone();
    harness
        .case_repo
        .expect_find_by_id()
        .returning(move |_| Ok(Some(stored.clone())));
    let updated = case.clone();
    harness
        .case_repo
        .expect_admin_update()
        .times(1)
        .withf(move |_, update, updated_at| update.is_empty() && *updated_at == fixed_now())
        .returning(move |_, _, _| Ok(Some(updated.clone())));
    harness
        .event_bus
        .expect_publish()
        .times(1)
        .withf(|event| matches!(event.kind, CaseEventKind::AdminUpdated))
        .return_const(());

    let service = harness.service();
    service
        .admin_update(AdminUpdateCaseRequest {
            caller: admin(),
            case_id: case.id(),
            update: AdminCaseUpdatePayload::default(),
        })
        .await
        .expect("empty update succeeds");
}

#[tokio::test]
async fn reassigning_the_rep_notifies_the_new_rep() {
    let old_rep = UserId::random();
    let new_rep = UserId::random();
    let case = case_with(&old_rep, WorkflowStatus::PendingCheckin, CheckInStatus::NotCheckedIn);
    let reassigned = case_with(
        &new_rep,
        WorkflowStatus::PendingCheckin,
        CheckInStatus::NotCheckedIn,
    );

    let mut harness = Harness::new();
    let stored = case.clone();
    harness
        .case_repo
        .expect_find_by_id()
        .returning(move |_| Ok(Some(stored.clone())));
    let updated = reassigned.clone();
    harness
        .case_repo
        .expect_admin_update()
        .returning(move |_, _, _| Ok(Some(updated.clone())));
    let expected_rep = new_rep.clone();
    harness
        .notification_repo
        .expect_save()
        .times(1)
        .withf(move |notification| {
            notification.user_id == expected_rep
                && notification.kind == NotificationKind::CaseAssigned
        })
        .returning(|_| Ok(()));
    harness.push_gateway.expect_push().returning(|_| Ok(()));
    harness.event_bus.expect_publish().return_const(());

    let service = harness.service();
    service
        .admin_update(AdminUpdateCaseRequest {
            caller: admin(),
            case_id: case.id(),
            update: AdminCaseUpdatePayload {
                assigned_rep_id: Some(new_rep),
                ..AdminCaseUpdatePayload::default()
            },
        })
        .await
        .expect("reassignment succeeds");
}
