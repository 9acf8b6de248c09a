//! Behavioural tests for the case workflow over in-memory adapters.
//!
//! These exercise the full service stack (verification, guarded writes,
//! notification fan-out) without a database, relying on the in-memory
//! repository honouring the same guarded-write contract as the Diesel
//! adapter.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use rstest::{fixture, rstest};

use backend::domain::ports::{
    CasePayload, CaseWorkflowCommand, CompleteCaseRequest, CreateCaseRequest, FixtureCaseEventBus,
    NewCasePayload, SubmitInvoiceRequest, SubmitScanRequest, SubmitScanResponse,
};
use backend::domain::{
    Caller, CaseId, CaseWorkflowService, CheckInStatus, Error, ErrorCode, NotificationKind, Role,
    ScanResult, UserId, WorkflowStatus,
};
use backend::test_support::{
    CapturingPushGateway, FixedClock, InMemoryCaseRepository, InMemoryNotificationRepository,
};

const ASSIGNED_SERIAL: &str = "TR-2024-001";
const FOREIGN_SERIAL: &str = "TR-2024-999";

type Service = CaseWorkflowService<
    InMemoryCaseRepository,
    InMemoryNotificationRepository,
    CapturingPushGateway,
    FixtureCaseEventBus,
>;

struct Harness {
    service: Service,
    cases: Arc<InMemoryCaseRepository>,
    notifications: Arc<InMemoryNotificationRepository>,
    push: Arc<CapturingPushGateway>,
    admin: Caller,
    rep: Caller,
}

impl Harness {
    fn new(notify_admins: bool) -> Self {
        let admin = Caller::new(UserId::random(), Role::Admin);
        let rep = Caller::new(UserId::random(), Role::Rep);
        let admin_recipients = if notify_admins {
            vec![admin.user_id().clone()]
        } else {
            Vec::new()
        };

        let cases = Arc::new(InMemoryCaseRepository::new());
        let notifications = Arc::new(InMemoryNotificationRepository::new());
        let push = Arc::new(CapturingPushGateway::new());
        let clock = Arc::new(FixedClock(
            Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0)
                .single()
                .expect("valid timestamp"),
        ));
        let service = CaseWorkflowService::new(
            cases.clone(),
            notifications.clone(),
            push.clone(),
            Arc::new(FixtureCaseEventBus::default()),
            clock,
            admin_recipients,
        );
        Self {
            service,
            cases,
            notifications,
            push,
            admin,
            rep,
        }
    }

    async fn create_case(&self) -> CasePayload {
        self.service
            .create_case(CreateCaseRequest {
                caller: self.admin.clone(),
                case: NewCasePayload {
                    doctor_name: "Dr. Whitfield".to_owned(),
                    hospital_name: "St. Anne Medical Center".to_owned(),
                    city: "Columbus".to_owned(),
                    state: "OH".to_owned(),
                    assigned_rep_id: self.rep.user_id().clone(),
                    assigned_tray_serial: ASSIGNED_SERIAL.to_owned(),
                    scheduled_for: Utc
                        .with_ymd_and_hms(2024, 6, 3, 8, 0, 0)
                        .single()
                        .expect("valid timestamp"),
                },
            })
            .await
            .expect("case created")
            .case
    }

    async fn scan(&self, case_id: CaseId, serial: &str) -> Result<SubmitScanResponse, Error> {
        self.service
            .submit_scan(SubmitScanRequest {
                caller: self.rep.clone(),
                case_id,
                scanned_serial: serial.to_owned(),
            })
            .await
    }
}

#[fixture]
fn harness() -> Harness {
    Harness::new(false)
}

#[rstest]
#[tokio::test]
async fn a_case_walks_the_full_lifecycle_in_order(harness: Harness) {
    let created = harness.create_case().await;
    assert_eq!(created.workflow_status, WorkflowStatus::PendingCheckin);
    assert_eq!(created.check_in_status, CheckInStatus::NotCheckedIn);

    let scanned = harness
        .scan(created.id, ASSIGNED_SERIAL)
        .await
        .expect("scan accepted");
    assert_eq!(scanned.scan.result, ScanResult::Matched);
    assert_eq!(scanned.case.workflow_status, WorkflowStatus::CheckedIn);
    assert!(scanned.case.check_in_time.is_some());

    let invoiced = harness
        .service
        .submit_invoice(SubmitInvoiceRequest {
            caller: harness.rep.clone(),
            case_id: created.id,
        })
        .await
        .expect("invoice accepted");
    assert_eq!(
        invoiced.case.workflow_status,
        WorkflowStatus::InvoiceSubmitted
    );
    assert!(invoiced.case.invoice_submitted);

    let completed = harness
        .service
        .complete_case(CompleteCaseRequest {
            caller: harness.rep.clone(),
            case_id: created.id,
            completion_notes: Some("  all instruments accounted for  ".to_owned()),
        })
        .await
        .expect("completion accepted");
    assert_eq!(completed.case.workflow_status, WorkflowStatus::CaseCompleted);
    assert_eq!(
        completed.case.completion_notes.as_deref(),
        Some("all instruments accounted for")
    );
}

#[rstest]
#[tokio::test]
async fn a_mismatched_scan_leaves_the_case_pending_and_allows_a_retry(harness: Harness) {
    let created = harness.create_case().await;

    let mismatch = harness
        .scan(created.id, FOREIGN_SERIAL)
        .await
        .expect("scan recorded");
    assert_eq!(mismatch.scan.result, ScanResult::Mismatched);
    assert_eq!(mismatch.case.workflow_status, WorkflowStatus::PendingCheckin);
    assert_eq!(mismatch.case.check_in_status, CheckInStatus::Mismatched);

    let retry = harness
        .scan(created.id, ASSIGNED_SERIAL)
        .await
        .expect("retry accepted");
    assert_eq!(retry.scan.result, ScanResult::Matched);
    assert_eq!(retry.case.workflow_status, WorkflowStatus::CheckedIn);

    // Both attempts stay on the audit trail.
    assert_eq!(harness.cases.scan_count(), 2);
}

#[rstest]
#[tokio::test]
async fn concurrent_matching_scans_admit_exactly_one_winner(harness: Harness) {
    let created = harness.create_case().await;

    let (first, second) = tokio::join!(
        harness.scan(created.id, ASSIGNED_SERIAL),
        harness.scan(created.id, ASSIGNED_SERIAL)
    );
    let outcomes = [first, second];
    let winners = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    assert_eq!(winners, 1, "exactly one scan may advance the case");

    let loser = outcomes
        .iter()
        .find_map(|outcome| outcome.as_ref().err())
        .expect("one scan rejected");
    assert_eq!(loser.code(), ErrorCode::InvalidTransition);

    // The losing attempt wrote nothing, scan record included.
    assert_eq!(harness.cases.scan_count(), 1);
}

#[rstest]
#[tokio::test]
async fn skipping_the_check_in_stage_is_rejected(harness: Harness) {
    let created = harness.create_case().await;

    let err = harness
        .service
        .submit_invoice(SubmitInvoiceRequest {
            caller: harness.rep.clone(),
            case_id: created.id,
        })
        .await
        .expect_err("invoice before check-in must fail");
    assert_eq!(err.code(), ErrorCode::InvalidTransition);
}

#[rstest]
#[tokio::test]
async fn a_completed_case_accepts_no_further_transitions(harness: Harness) {
    let created = harness.create_case().await;
    harness
        .scan(created.id, ASSIGNED_SERIAL)
        .await
        .expect("checked in");
    harness
        .service
        .submit_invoice(SubmitInvoiceRequest {
            caller: harness.rep.clone(),
            case_id: created.id,
        })
        .await
        .expect("invoiced");
    harness
        .service
        .complete_case(CompleteCaseRequest {
            caller: harness.rep.clone(),
            case_id: created.id,
            completion_notes: None,
        })
        .await
        .expect("completed");

    let err = harness
        .service
        .complete_case(CompleteCaseRequest {
            caller: harness.rep.clone(),
            case_id: created.id,
            completion_notes: None,
        })
        .await
        .expect_err("terminal state admits nothing");
    assert_eq!(err.code(), ErrorCode::InvalidTransition);

    let rescanned = harness.scan(created.id, ASSIGNED_SERIAL).await;
    assert_eq!(
        rescanned.expect_err("terminal state admits nothing").code(),
        ErrorCode::InvalidTransition
    );
}

#[rstest]
#[tokio::test]
async fn only_the_assigned_rep_or_an_admin_may_drive_the_workflow(harness: Harness) {
    let created = harness.create_case().await;

    let stranger = Caller::new(UserId::random(), Role::Rep);
    let err = harness
        .service
        .submit_scan(SubmitScanRequest {
            caller: stranger,
            case_id: created.id,
            scanned_serial: ASSIGNED_SERIAL.to_owned(),
        })
        .await
        .expect_err("foreign rep rejected");
    assert_eq!(err.code(), ErrorCode::Forbidden);

    let as_admin = harness
        .service
        .submit_scan(SubmitScanRequest {
            caller: harness.admin.clone(),
            case_id: created.id,
            scanned_serial: ASSIGNED_SERIAL.to_owned(),
        })
        .await
        .expect("admin may act on any case");
    assert_eq!(as_admin.case.workflow_status, WorkflowStatus::CheckedIn);
}

#[rstest]
#[tokio::test]
async fn case_creation_is_admin_only(harness: Harness) {
    let err = harness
        .service
        .create_case(CreateCaseRequest {
            caller: harness.rep.clone(),
            case: NewCasePayload {
                doctor_name: "Dr. Whitfield".to_owned(),
                hospital_name: "St. Anne Medical Center".to_owned(),
                city: "Columbus".to_owned(),
                state: "OH".to_owned(),
                assigned_rep_id: harness.rep.user_id().clone(),
                assigned_tray_serial: ASSIGNED_SERIAL.to_owned(),
                scheduled_for: Utc::now(),
            },
        })
        .await
        .expect_err("rep may not create cases");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn transitions_notify_the_rep_and_configured_admins() {
    let harness = Harness::new(true);

    let created = harness.create_case().await;
    harness
        .scan(created.id, ASSIGNED_SERIAL)
        .await
        .expect("checked in");

    let stored = harness.notifications.stored();
    let assigned: Vec<_> = stored
        .iter()
        .filter(|notification| notification.kind == NotificationKind::CaseAssigned)
        .collect();
    assert_eq!(assigned.len(), 1);
    let assignment = assigned.first().expect("one assignment notice");
    assert_eq!(&assignment.user_id, harness.rep.user_id());
    assert_eq!(assignment.case_id, created.id);

    // The rep drove the check-in, so only the admin hears about it.
    let changed: Vec<_> = stored
        .iter()
        .filter(|notification| notification.kind == NotificationKind::StatusChanged)
        .collect();
    assert_eq!(changed.len(), 1);
    assert_eq!(
        &changed.first().expect("one status notice").user_id,
        harness.admin.user_id()
    );

    // Everything stored was also relayed to the push channel.
    assert_eq!(harness.push.pushed().len(), stored.len());
}
