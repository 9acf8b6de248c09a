//! PostgreSQL-backed `CaseRepository` implementation using Diesel ORM.
//!
//! The guarded writes express the workflow's compare-and-set semantics as
//! conditional UPDATEs: the WHERE clause names both the case id and the
//! expected workflow stage, so a concurrent writer that moved the case on
//! first makes the statement match zero rows. Check-in couples the case
//! update and the scan insert in one transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{
    AdminCaseUpdate, CaseFilter, CaseRepository, CaseRepositoryError, CheckInWrite,
    WorkflowAdvance,
};
use crate::domain::{
    Case, CaseDraft, CaseId, NewTrayScan, TraySerial, TrayScan, UserId, WorkflowStatus,
};

use super::diesel_error_mapping::{map_diesel_error_with, map_pool_error_with};
use super::models::{
    AdminCaseChangeset, AdvanceChangeset, CaseRow, CheckInChangeset, NewCaseRow, NewTrayScanRow,
    TrayScanRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{cases, tray_scans};

/// Diesel-backed implementation of the case repository port.
#[derive(Clone)]
pub struct DieselCaseRepository {
    pool: DbPool,
}

impl DieselCaseRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CaseRepositoryError {
    map_pool_error_with(error, CaseRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> CaseRepositoryError {
    map_diesel_error_with(
        error,
        CaseRepositoryError::query,
        CaseRepositoryError::connection,
    )
}

/// Convert a database row into a validated domain case.
fn row_to_case(row: CaseRow) -> Result<Case, CaseRepositoryError> {
    let CaseRow {
        id,
        doctor_name,
        hospital_name,
        city,
        state,
        assigned_rep_id,
        assigned_tray_serial,
        scheduled_for,
        workflow_status,
        check_in_status,
        check_in_time,
        invoice_submitted,
        invoice_submitted_time,
        case_completed,
        case_completed_time,
        completion_notes,
        created_at,
        updated_at,
    } = row;

    let workflow_status = workflow_status
        .parse()
        .map_err(|err| CaseRepositoryError::query(format!("decode workflow_status: {err}")))?;
    let check_in_status = check_in_status
        .parse()
        .map_err(|err| CaseRepositoryError::query(format!("decode check_in_status: {err}")))?;
    let assigned_tray_serial = TraySerial::new(assigned_tray_serial)
        .map_err(|err| CaseRepositoryError::query(format!("decode assigned_tray_serial: {err}")))?;

    Case::new(CaseDraft {
        id: CaseId::from_uuid(id),
        doctor_name,
        hospital_name,
        city,
        state_code: state,
        assigned_rep_id: UserId::from_uuid(assigned_rep_id),
        assigned_tray_serial,
        scheduled_for,
        workflow_status,
        check_in_status,
        check_in_time,
        invoice_submitted,
        invoice_submitted_time,
        case_completed,
        case_completed_time,
        completion_notes,
        created_at,
        updated_at,
    })
    .map_err(|err| CaseRepositoryError::query(err.to_string()))
}

/// Convert a database row into a domain scan record.
fn row_to_scan(row: TrayScanRow) -> Result<TrayScan, CaseRepositoryError> {
    let result = row
        .result
        .parse()
        .map_err(|err| CaseRepositoryError::query(format!("decode scan result: {err}")))?;
    Ok(TrayScan {
        id: row.id,
        case_id: CaseId::from_uuid(row.case_id),
        scanned_by: UserId::from_uuid(row.scanned_by),
        scanned_serial: row.scanned_serial,
        result,
        scanned_at: row.scanned_at,
    })
}

fn advance_changeset(advance: &WorkflowAdvance) -> AdvanceChangeset<'_> {
    match advance {
        WorkflowAdvance::InvoiceSubmitted { at } => AdvanceChangeset {
            workflow_status: WorkflowStatus::InvoiceSubmitted.as_str(),
            invoice_submitted: Some(true),
            invoice_submitted_time: Some(*at),
            case_completed: None,
            case_completed_time: None,
            completion_notes: None,
            updated_at: *at,
        },
        WorkflowAdvance::CaseCompleted { at, notes } => AdvanceChangeset {
            workflow_status: WorkflowStatus::CaseCompleted.as_str(),
            invoice_submitted: None,
            invoice_submitted_time: None,
            case_completed: Some(true),
            case_completed_time: Some(*at),
            completion_notes: notes.as_deref(),
            updated_at: *at,
        },
    }
}

fn admin_changeset<'a>(
    update: &'a AdminCaseUpdate,
    updated_at: DateTime<Utc>,
) -> AdminCaseChangeset<'a> {
    AdminCaseChangeset {
        doctor_name: update.doctor_name.as_deref(),
        hospital_name: update.hospital_name.as_deref(),
        city: update.city.as_deref(),
        state: update.state_code.as_deref(),
        assigned_rep_id: update.assigned_rep_id.as_ref().map(|rep| *rep.as_uuid()),
        assigned_tray_serial: update
            .assigned_tray_serial
            .as_ref()
            .map(TraySerial::as_str),
        scheduled_for: update.scheduled_for,
        workflow_status: update.workflow_status.map(WorkflowStatus::as_str),
        check_in_status: update.check_in_status.map(|status| status.as_str()),
        check_in_time: update.check_in_time,
        invoice_submitted: update.invoice_submitted,
        invoice_submitted_time: update.invoice_submitted_time,
        case_completed: update.case_completed,
        case_completed_time: update.case_completed_time,
        completion_notes: update
            .completion_notes
            .as_ref()
            .map(|notes| notes.as_deref()),
        updated_at,
    }
}

#[async_trait]
impl CaseRepository for DieselCaseRepository {
    async fn create(&self, case: &Case) -> Result<(), CaseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewCaseRow {
            id: *case.id().as_uuid(),
            doctor_name: case.doctor_name(),
            hospital_name: case.hospital_name(),
            city: case.city(),
            state: case.state_code(),
            assigned_rep_id: *case.assigned_rep_id().as_uuid(),
            assigned_tray_serial: case.assigned_tray_serial().as_str(),
            scheduled_for: case.scheduled_for(),
            workflow_status: case.workflow_status().as_str(),
            check_in_status: case.check_in_status().as_str(),
            check_in_time: case.check_in_time(),
            invoice_submitted: case.invoice_submitted(),
            invoice_submitted_time: case.invoice_submitted_time(),
            case_completed: case.case_completed(),
            case_completed_time: case.case_completed_time(),
            completion_notes: case.completion_notes(),
            created_at: case.created_at(),
            updated_at: case.updated_at(),
        };

        diesel::insert_into(cases::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, case_id: &CaseId) -> Result<Option<Case>, CaseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = cases::table
            .filter(cases::id.eq(case_id.as_uuid()))
            .select(CaseRow::as_select())
            .first::<CaseRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_case).transpose()
    }

    async fn list(&self, filter: &CaseFilter) -> Result<Vec<Case>, CaseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = cases::table.into_boxed();
        if let Some(rep) = &filter.assigned_rep_id {
            query = query.filter(cases::assigned_rep_id.eq(*rep.as_uuid()));
        }
        if let Some(status) = filter.workflow_status {
            query = query.filter(cases::workflow_status.eq(status.as_str()));
        }

        let rows: Vec<CaseRow> = query
            .order((cases::scheduled_for.asc(), cases::id.asc()))
            .select(CaseRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_case).collect()
    }

    async fn record_check_in(
        &self,
        scan: &NewTrayScan,
        write: &CheckInWrite,
    ) -> Result<Option<Case>, CaseRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changeset = CheckInChangeset {
            workflow_status: write.advance.then(|| WorkflowStatus::CheckedIn.as_str()),
            check_in_status: write.check_in_status.as_str(),
            check_in_time: write.at,
            updated_at: write.at,
        };
        let scan_row = NewTrayScanRow {
            id: scan.id,
            case_id: *scan.case_id.as_uuid(),
            scanned_by: *scan.scanned_by.as_uuid(),
            scanned_serial: &scan.scanned_serial,
            result: scan.result.as_str(),
            scanned_at: scan.scanned_at,
        };
        let case_id = *scan.case_id.as_uuid();

        // Guard and scan append commit or fail together: a lost race writes
        // nothing at all, scan record included.
        let row = conn
            .transaction(|conn| {
                async move {
                    let updated = diesel::update(
                        cases::table.filter(
                            cases::id.eq(case_id).and(
                                cases::workflow_status
                                    .eq(WorkflowStatus::PendingCheckin.as_str()),
                            ),
                        ),
                    )
                    .set(&changeset)
                    .returning(CaseRow::as_returning())
                    .get_result::<CaseRow>(conn)
                    .await
                    .optional()?;

                    let Some(updated) = updated else {
                        return Ok(None);
                    };

                    diesel::insert_into(tray_scans::table)
                        .values(&scan_row)
                        .execute(conn)
                        .await?;

                    Ok(Some(updated))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        row.map(row_to_case).transpose()
    }

    async fn advance(
        &self,
        case_id: &CaseId,
        advance: &WorkflowAdvance,
    ) -> Result<Option<Case>, CaseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changeset = advance_changeset(advance);
        let row = diesel::update(
            cases::table.filter(
                cases::id
                    .eq(case_id.as_uuid())
                    .and(cases::workflow_status.eq(advance.guard().as_str())),
            ),
        )
        .set(&changeset)
        .returning(CaseRow::as_returning())
        .get_result::<CaseRow>(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        row.map(row_to_case).transpose()
    }

    async fn admin_update(
        &self,
        case_id: &CaseId,
        update: &AdminCaseUpdate,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Case>, CaseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changeset = admin_changeset(update, updated_at);
        let row = diesel::update(cases::table.filter(cases::id.eq(case_id.as_uuid())))
            .set(&changeset)
            .returning(CaseRow::as_returning())
            .get_result::<CaseRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_case).transpose()
    }

    async fn list_scans_for_case(
        &self,
        case_id: &CaseId,
    ) -> Result<Vec<TrayScan>, CaseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<TrayScanRow> = tray_scans::table
            .filter(tray_scans::case_id.eq(case_id.as_uuid()))
            .order((tray_scans::scanned_at.asc(), tray_scans::id.asc()))
            .select(TrayScanRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_scan).collect()
    }
}
