//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are
//! used by Diesel for compile-time query validation and type-safe SQL
//! generation; `diesel print-schema` can regenerate them from a live
//! database after a migration changes the schema.

diesel::table! {
    /// Surgical cases and their two-axis status.
    ///
    /// `workflow_status` carries the ordered lifecycle stage;
    /// `check_in_status` carries the outcome of the latest verification
    /// attempt. Both are stored as their stable string forms.
    cases (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        doctor_name -> Varchar,
        hospital_name -> Varchar,
        city -> Varchar,
        state -> Varchar,
        /// Rep responsible for the tray.
        assigned_rep_id -> Uuid,
        /// Serial of the tray assigned to this case.
        assigned_tray_serial -> Varchar,
        /// Scheduled procedure date.
        scheduled_for -> Timestamptz,
        workflow_status -> Varchar,
        check_in_status -> Varchar,
        check_in_time -> Nullable<Timestamptz>,
        invoice_submitted -> Bool,
        invoice_submitted_time -> Nullable<Timestamptz>,
        case_completed -> Bool,
        case_completed_time -> Nullable<Timestamptz>,
        completion_notes -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only audit trail of verification attempts.
    tray_scans (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Case the scan was performed against (restrict delete).
        case_id -> Uuid,
        /// Rep who performed the scan.
        scanned_by -> Uuid,
        /// Serial string exactly as produced by the scanner.
        scanned_serial -> Varchar,
        /// Verdict: `matched` or `mismatched`.
        result -> Varchar,
        scanned_at -> Timestamptz,
    }
}

diesel::table! {
    /// Per-user notifications emitted on workflow transitions.
    notifications (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Recipient.
        user_id -> Uuid,
        /// Case the event originated from (restrict delete).
        case_id -> Uuid,
        /// Event category string.
        kind -> Varchar,
        title -> Varchar,
        message -> Text,
        read -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(tray_scans -> cases (case_id));
diesel::joinable!(notifications -> cases (case_id));

diesel::allow_tables_to_appear_in_same_query!(cases, tray_scans, notifications);
