//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{attachments, categories, complaint_updates, complaints, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub user_id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub role: String,
}

/// Insertable struct for registering new users.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub password_hash: &'a str,
    pub role: &'a str,
}

/// Row struct for reading from the categories table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CategoryRow {
    pub category_id: i32,
    pub category_name: String,
}

/// Row struct for reading from the complaints table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = complaints)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ComplaintRow {
    pub complaint_id: i32,
    pub complaint_number: String,
    pub user_id: i32,
    pub category_id: i32,
    pub subject: String,
    pub description: String,
    pub priority: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Insertable struct for creating new complaints.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = complaints)]
pub(crate) struct NewComplaintRow<'a> {
    pub complaint_number: &'a str,
    pub user_id: i32,
    pub category_id: i32,
    pub subject: &'a str,
    pub description: &'a str,
    pub priority: &'a str,
    pub status: &'a str,
}

/// Row struct for reading ledger entries joined with the updater's name.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = complaint_updates)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ComplaintUpdateRow {
    pub update_id: i32,
    pub complaint_id: i32,
    pub updated_by: i32,
    pub old_status: Option<String>,
    pub new_status: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for appending ledger entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = complaint_updates)]
pub(crate) struct NewComplaintUpdateRow<'a> {
    pub complaint_id: i32,
    pub updated_by: i32,
    pub old_status: Option<&'a str>,
    pub new_status: &'a str,
    pub note: Option<&'a str>,
}

/// Row struct for reading from the attachments table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = attachments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AttachmentRow {
    pub attachment_id: i32,
    pub complaint_id: i32,
    pub file_name: String,
    pub file_path: String,
    pub file_type: String,
    pub file_size: i64,
    pub uploaded_at: DateTime<Utc>,
}

/// Insertable struct for recording attachment metadata.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = attachments)]
pub(crate) struct NewAttachmentRow<'a> {
    pub complaint_id: i32,
    pub file_name: &'a str,
    pub file_path: &'a str,
    pub file_type: &'a str,
    pub file_size: i64,
}
