//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{cases, notifications, tray_scans};

/// Row struct for reading from the cases table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = cases)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CaseRow {
    pub id: Uuid,
    pub doctor_name: String,
    pub hospital_name: String,
    pub city: String,
    pub state: String,
    pub assigned_rep_id: Uuid,
    pub assigned_tray_serial: String,
    pub scheduled_for: DateTime<Utc>,
    pub workflow_status: String,
    pub check_in_status: String,
    pub check_in_time: Option<DateTime<Utc>>,
    pub invoice_submitted: bool,
    pub invoice_submitted_time: Option<DateTime<Utc>>,
    pub case_completed: bool,
    pub case_completed_time: Option<DateTime<Utc>>,
    pub completion_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating new case records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = cases)]
pub(crate) struct NewCaseRow<'a> {
    pub id: Uuid,
    pub doctor_name: &'a str,
    pub hospital_name: &'a str,
    pub city: &'a str,
    pub state: &'a str,
    pub assigned_rep_id: Uuid,
    pub assigned_tray_serial: &'a str,
    pub scheduled_for: DateTime<Utc>,
    pub workflow_status: &'a str,
    pub check_in_status: &'a str,
    pub check_in_time: Option<DateTime<Utc>>,
    pub invoice_submitted: bool,
    pub invoice_submitted_time: Option<DateTime<Utc>>,
    pub case_completed: bool,
    pub case_completed_time: Option<DateTime<Utc>>,
    pub completion_notes: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset applied by a check-in write alongside the scan insert.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = cases)]
pub(crate) struct CheckInChangeset<'a> {
    /// Set only for a matched scan; a mismatch leaves the workflow in place.
    pub workflow_status: Option<&'a str>,
    pub check_in_status: &'a str,
    pub check_in_time: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset applied by a forward workflow transition.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = cases)]
pub(crate) struct AdvanceChangeset<'a> {
    pub workflow_status: &'a str,
    pub invoice_submitted: Option<bool>,
    pub invoice_submitted_time: Option<DateTime<Utc>>,
    pub case_completed: Option<bool>,
    pub case_completed_time: Option<DateTime<Utc>>,
    pub completion_notes: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset applied by an unrestricted admin edit.
///
/// Outer `None` skips the column; `Some(None)` writes NULL for nullable
/// columns. `updated_at` is always written, which keeps the changeset
/// non-empty even when the edit names no other column.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = cases)]
pub(crate) struct AdminCaseChangeset<'a> {
    pub doctor_name: Option<&'a str>,
    pub hospital_name: Option<&'a str>,
    pub city: Option<&'a str>,
    pub state: Option<&'a str>,
    pub assigned_rep_id: Option<Uuid>,
    pub assigned_tray_serial: Option<&'a str>,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub workflow_status: Option<&'a str>,
    pub check_in_status: Option<&'a str>,
    pub check_in_time: Option<Option<DateTime<Utc>>>,
    pub invoice_submitted: Option<bool>,
    pub invoice_submitted_time: Option<Option<DateTime<Utc>>>,
    pub case_completed: Option<bool>,
    pub case_completed_time: Option<Option<DateTime<Utc>>>,
    pub completion_notes: Option<Option<&'a str>>,
    pub updated_at: DateTime<Utc>,
}

/// Row struct for reading from the tray_scans table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tray_scans)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TrayScanRow {
    pub id: Uuid,
    pub case_id: Uuid,
    pub scanned_by: Uuid,
    pub scanned_serial: String,
    pub result: String,
    pub scanned_at: DateTime<Utc>,
}

/// Insertable struct for appending scan records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tray_scans)]
pub(crate) struct NewTrayScanRow<'a> {
    pub id: Uuid,
    pub case_id: Uuid,
    pub scanned_by: Uuid,
    pub scanned_serial: &'a str,
    pub result: &'a str,
    pub scanned_at: DateTime<Utc>,
}

/// Row struct for reading from the notifications table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct NotificationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub case_id: Uuid,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating notification records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notifications)]
pub(crate) struct NewNotificationRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub case_id: Uuid,
    pub kind: &'a str,
    pub title: &'a str,
    pub message: &'a str,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
