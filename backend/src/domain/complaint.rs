//! Complaint aggregate: the complaint row, its append-only status ledger,
//! and attachment metadata.
//!
//! The ledger is authoritative: a complaint row's `status` is a cached
//! projection of the newest ledger entry. Both are written together inside
//! one transaction by the persistence adapter, so the invariant cannot be
//! observed broken.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

use super::category::CategoryId;
use super::user::UserId;

/// Stable numeric complaint identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComplaintId(i32);

impl ComplaintId {
    /// Wrap a raw database identifier.
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// Access the raw identifier.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for ComplaintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a complaint.
///
/// The conventional progression is pending → in-progress → resolved →
/// closed, but skips are permitted; only the spelling of the value is
/// validated, not the transition itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComplaintStatus {
    /// Submitted, awaiting triage.
    #[serde(rename = "pending")]
    Pending,
    /// Being worked by an administrator.
    #[serde(rename = "in-progress")]
    InProgress,
    /// Fixed; sets the resolved timestamp.
    #[serde(rename = "resolved")]
    Resolved,
    /// Finalised; also sets the resolved timestamp.
    #[serde(rename = "closed")]
    Closed,
}

impl ComplaintStatus {
    /// Stored column spelling for this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }

    /// True for the two terminal states that stamp `resolved_at`.
    #[must_use]
    pub const fn is_settled(self) -> bool {
        matches!(self, Self::Resolved | Self::Closed)
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure parsing a status value.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("unrecognised complaint status: {value}")]
pub struct ParseStatusError {
    /// The rejected input.
    pub value: String,
}

impl std::str::FromStr for ComplaintStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "in-progress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            "closed" => Ok(Self::Closed),
            other => Err(ParseStatusError {
                value: other.to_owned(),
            }),
        }
    }
}

/// Urgency attached to a complaint at submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Routine issue.
    Low,
    /// Default urgency.
    Medium,
    /// Needs prompt attention; surfaced separately on the dashboard.
    High,
}

impl Priority {
    /// Stored column spelling for this priority.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure parsing a priority value.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("unrecognised priority: {value}")]
pub struct ParsePriorityError {
    /// The rejected input.
    pub value: String,
}

impl std::str::FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(ParsePriorityError {
                value: other.to_owned(),
            }),
        }
    }
}

/// Human-facing complaint reference, distinct from the internal numeric id.
///
/// Generated as `CMP<unix-millis><3-digit-suffix>`; the suffix decorrelates
/// submissions landing on the same millisecond. Uniqueness is enforced by
/// the storage layer, and the lifecycle service regenerates on collision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComplaintNumber(String);

impl ComplaintNumber {
    /// Wrap a stored complaint number without re-validating it.
    #[must_use]
    pub fn from_stored(raw: String) -> Self {
        Self(raw)
    }

    /// Generate a fresh complaint number from a timestamp and random suffix.
    ///
    /// `suffix` is reduced modulo 1000 and zero-padded to three digits.
    #[must_use]
    pub fn generate(now: DateTime<Utc>, suffix: u16) -> Self {
        Self(format!("CMP{}{:03}", now.timestamp_millis(), suffix % 1000))
    }

    /// Borrow the raw reference string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ComplaintNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Complaint row as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Complaint {
    /// Stable identifier.
    pub id: ComplaintId,
    /// Human-facing reference.
    pub number: ComplaintNumber,
    /// Submitting user.
    pub owner: UserId,
    /// Category filed under.
    pub category_id: CategoryId,
    /// Short summary line.
    pub subject: String,
    /// Free-text body.
    pub description: String,
    /// Urgency chosen at submission.
    pub priority: Priority,
    /// Cached projection of the newest ledger entry.
    pub status: ComplaintStatus,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
    /// Set when the complaint transitions into a settled state.
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Complaint joined with its category and owner identity, as returned by
/// list and detail reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintSummary {
    /// The complaint row.
    #[serde(flatten)]
    pub complaint: Complaint,
    /// Name of the category filed under.
    pub category_name: String,
    /// Owner display name.
    pub owner_name: String,
    /// Owner email.
    pub owner_email: String,
    /// Owner phone, when registered.
    pub owner_phone: Option<String>,
}

/// One entry of the append-only status ledger.
///
/// Entries are never mutated or deleted. The initial submission entry has
/// no old status; every administrative transition records old → new.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdateEntry {
    /// Ledger entry identifier.
    pub id: i32,
    /// Complaint the entry belongs to.
    pub complaint_id: ComplaintId,
    /// User who performed the transition.
    pub updated_by: UserId,
    /// Display name of the updater, joined for presentation.
    pub updated_by_name: String,
    /// Status before the transition; `None` only for the submission entry.
    pub old_status: Option<ComplaintStatus>,
    /// Status after the transition.
    pub new_status: ComplaintStatus,
    /// Free-text note attached to the transition.
    pub note: Option<String>,
    /// When the entry was appended.
    pub created_at: DateTime<Utc>,
}

/// Stored attachment metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Stable identifier.
    pub id: i32,
    /// Complaint the file belongs to.
    pub complaint_id: ComplaintId,
    /// Original client-supplied file name.
    pub file_name: String,
    /// Server-relative stored path, e.g. `uploads/1722945600000-photo.png`.
    pub file_path: String,
    /// MIME type reported at upload.
    pub file_type: String,
    /// Size in bytes.
    pub file_size: i64,
    /// When the file was stored.
    pub uploaded_at: DateTime<Utc>,
}

/// Full complaint detail: row, ledger (newest first), attachments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintDetail {
    /// The complaint with joined category and owner identity.
    #[serde(flatten)]
    pub summary: ComplaintSummary,
    /// Complete status history, newest first.
    pub updates: Vec<StatusUpdateEntry>,
    /// Attachment metadata.
    pub attachments: Vec<Attachment>,
}

/// Validated submission input for a new complaint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplaintSubmission {
    /// Category to file under.
    pub category_id: CategoryId,
    /// Short summary line; required.
    pub subject: String,
    /// Free-text body; required.
    pub description: String,
    /// Urgency; defaults to medium when omitted.
    pub priority: Priority,
}

/// An uploaded file as received from the client, prior to storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentUpload {
    /// Client-supplied file name.
    pub original_name: String,
    /// MIME type from the multipart part.
    pub content_type: String,
    /// Raw file bytes.
    pub bytes: Vec<u8>,
}

/// Attachment metadata after the store has written the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAttachment {
    /// Original client-supplied file name.
    pub file_name: String,
    /// Server-relative stored path.
    pub file_path: String,
    /// MIME type reported at upload.
    pub file_type: String,
    /// Size in bytes.
    pub file_size: i64,
}

/// Filters shared by the list operations.
///
/// `status`/`priority` are exact matches; `search` is a case-insensitive
/// substring match over complaint number, subject, and category name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplaintFilter {
    /// Exact status match.
    pub status: Option<ComplaintStatus>,
    /// Exact priority match (admin listing only).
    pub priority: Option<Priority>,
    /// Case-insensitive substring search term.
    pub search: Option<String>,
}

/// Aggregate counters for the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    /// Total complaints on record.
    pub total: i64,
    /// Count currently pending.
    pub pending: i64,
    /// Count currently in progress.
    pub in_progress: i64,
    /// Count currently resolved.
    pub resolved: i64,
    /// Count currently closed.
    pub closed: i64,
    /// Count filed as high priority, regardless of status.
    pub high_priority: i64,
}

/// Complaint volume for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    /// Category name.
    pub category_name: String,
    /// Number of complaints filed under it.
    pub count: i64,
}

/// Dashboard statistics computed live from current table contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// Aggregate counters.
    pub summary: StatusSummary,
    /// Per-category complaint counts, descending.
    pub by_category: Vec<CategoryCount>,
}

/// Ledger note recorded with the initial submission entry.
pub const SUBMISSION_NOTE: &str = "Complaint submitted";

/// Default ledger note when an administrator supplies none.
#[must_use]
pub fn transition_note(old: ComplaintStatus, new: ComplaintStatus) -> String {
    format!("Status changed from {old} to {new}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[test]
    fn number_format_is_cmp_then_digits() {
        let now = Utc.with_ymd_and_hms(2026, 8, 6, 12, 0, 0).single().expect("valid");
        let number = ComplaintNumber::generate(now, 7);
        let raw = number.as_str();
        assert!(raw.starts_with("CMP"), "prefix: {raw}");
        assert!(
            raw.trim_start_matches("CMP").chars().all(|c| c.is_ascii_digit()),
            "digits after prefix: {raw}"
        );
        assert!(raw.ends_with("007"), "zero-padded suffix: {raw}");
    }

    #[test]
    fn number_suffix_wraps_modulo_1000() {
        let now = Utc.with_ymd_and_hms(2026, 8, 6, 12, 0, 0).single().expect("valid");
        let a = ComplaintNumber::generate(now, 1234);
        let b = ComplaintNumber::generate(now, 234);
        assert_eq!(a, b);
    }

    #[rstest]
    #[case("pending", ComplaintStatus::Pending)]
    #[case("in-progress", ComplaintStatus::InProgress)]
    #[case("resolved", ComplaintStatus::Resolved)]
    #[case("closed", ComplaintStatus::Closed)]
    fn status_round_trips(#[case] raw: &str, #[case] status: ComplaintStatus) {
        assert_eq!(raw.parse::<ComplaintStatus>().expect("known"), status);
        assert_eq!(status.as_str(), raw);
    }

    #[test]
    fn status_rejects_arbitrary_strings() {
        assert!("escalated".parse::<ComplaintStatus>().is_err());
        assert!("".parse::<ComplaintStatus>().is_err());
        assert!("Pending".parse::<ComplaintStatus>().is_err());
    }

    #[rstest]
    #[case(ComplaintStatus::Pending, false)]
    #[case(ComplaintStatus::InProgress, false)]
    #[case(ComplaintStatus::Resolved, true)]
    #[case(ComplaintStatus::Closed, true)]
    fn settled_states_stamp_resolved_at(#[case] status: ComplaintStatus, #[case] settled: bool) {
        assert_eq!(status.is_settled(), settled);
    }

    #[test]
    fn priority_defaults_to_medium() {
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn transition_note_names_both_states() {
        assert_eq!(
            transition_note(ComplaintStatus::Pending, ComplaintStatus::Resolved),
            "Status changed from pending to resolved"
        );
    }
}
