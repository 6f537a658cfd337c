//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are
//! used by Diesel for compile-time query validation and type-safe SQL
//! generation; regenerate with `diesel print-schema` when migrations
//! change.

diesel::table! {
    /// Registered user accounts.
    users (user_id) {
        /// Primary key.
        user_id -> Int4,
        /// Display name.
        name -> Varchar,
        /// Unique login email.
        email -> Varchar,
        /// Optional contact phone number.
        phone -> Nullable<Varchar>,
        /// Salted adaptive password hash.
        password_hash -> Varchar,
        /// Access role: `user` or `admin`.
        role -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Static complaint category catalog.
    categories (category_id) {
        /// Primary key.
        category_id -> Int4,
        /// Unique category name.
        category_name -> Varchar,
    }
}

diesel::table! {
    /// Complaint records.
    complaints (complaint_id) {
        /// Primary key.
        complaint_id -> Int4,
        /// Unique human-facing reference.
        complaint_number -> Varchar,
        /// Submitting user.
        user_id -> Int4,
        /// Category filed under.
        category_id -> Int4,
        /// Short summary line.
        subject -> Varchar,
        /// Free-text body.
        description -> Text,
        /// Urgency: `low`, `medium`, or `high`.
        priority -> Varchar,
        /// Cached projection of the newest ledger entry.
        status -> Varchar,
        /// Submission timestamp.
        created_at -> Timestamptz,
        /// Last mutation timestamp.
        updated_at -> Timestamptz,
        /// Set on the first transition into `resolved` or `closed`.
        resolved_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Append-only status-update ledger.
    complaint_updates (update_id) {
        /// Primary key.
        update_id -> Int4,
        /// Complaint the entry belongs to.
        complaint_id -> Int4,
        /// User who performed the transition.
        updated_by -> Int4,
        /// Status before the transition; null for the submission entry.
        old_status -> Nullable<Varchar>,
        /// Status after the transition.
        new_status -> Varchar,
        /// Free-text note.
        note -> Nullable<Text>,
        /// When the entry was appended.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Attachment metadata for uploaded files.
    attachments (attachment_id) {
        /// Primary key.
        attachment_id -> Int4,
        /// Complaint the file belongs to.
        complaint_id -> Int4,
        /// Original client-supplied file name.
        file_name -> Varchar,
        /// Server-relative stored path.
        file_path -> Varchar,
        /// MIME type reported at upload.
        file_type -> Varchar,
        /// Size in bytes.
        file_size -> Int8,
        /// When the file was stored.
        uploaded_at -> Timestamptz,
    }
}

diesel::joinable!(complaints -> categories (category_id));
diesel::joinable!(complaints -> users (user_id));
diesel::joinable!(complaint_updates -> complaints (complaint_id));
diesel::joinable!(complaint_updates -> users (updated_by));
diesel::joinable!(attachments -> complaints (complaint_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    categories,
    complaints,
    complaint_updates,
    attachments,
);
