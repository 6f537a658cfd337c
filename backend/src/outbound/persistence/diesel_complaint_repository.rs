//! PostgreSQL-backed `ComplaintRepository` implementation using Diesel ORM.
//!
//! The two mutating operations run inside a single transaction so the
//! complaint row, its attachment metadata, and the status ledger can never
//! diverge: the row's `status` column is only ever written together with
//! the ledger entry that justifies it.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, RunQueryDsl};

use crate::domain::complaint::{transition_note, SUBMISSION_NOTE};
use crate::domain::ports::{ComplaintPersistenceError, ComplaintRepository, StatusTransition};
use crate::domain::{
    Attachment, CategoryCount, CategoryId, Complaint, ComplaintDetail, ComplaintFilter,
    ComplaintId, ComplaintNumber, ComplaintStatus, ComplaintSubmission, ComplaintSummary,
    DashboardStats, Priority, StatusSummary, StatusUpdateEntry, StoredAttachment, UserId,
};

use super::diesel_error::{
    is_foreign_key_violation, is_unique_violation, map_diesel_error, map_pool_error,
};
use super::models::{
    AttachmentRow, ComplaintRow, ComplaintUpdateRow, NewAttachmentRow, NewComplaintRow,
    NewComplaintUpdateRow,
};
use super::pool::DbPool;
use super::schema::{attachments, categories, complaint_updates, complaints, users};

/// Joined row shape shared by the list and detail reads.
type SummaryRow = (ComplaintRow, String, String, String, Option<String>);

/// Diesel-backed complaint ledger.
#[derive(Clone)]
pub struct DieselComplaintRepository {
    pool: DbPool,
}

impl DieselComplaintRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_error(error: diesel::result::Error) -> ComplaintPersistenceError {
    map_diesel_error(
        error,
        ComplaintPersistenceError::query,
        ComplaintPersistenceError::connection,
    )
}

fn checkout_error(error: super::pool::PoolError) -> ComplaintPersistenceError {
    map_pool_error(error, ComplaintPersistenceError::connection)
}

fn parse_status(raw: &str) -> Result<ComplaintStatus, ComplaintPersistenceError> {
    raw.parse()
        .map_err(|_| ComplaintPersistenceError::query("unrecognised status value in storage"))
}

fn parse_priority(raw: &str) -> Result<Priority, ComplaintPersistenceError> {
    raw.parse()
        .map_err(|_| ComplaintPersistenceError::query("unrecognised priority value in storage"))
}

fn row_to_complaint(row: ComplaintRow) -> Result<Complaint, ComplaintPersistenceError> {
    Ok(Complaint {
        id: ComplaintId::new(row.complaint_id),
        number: ComplaintNumber::from_stored(row.complaint_number),
        owner: UserId::new(row.user_id),
        category_id: CategoryId::new(row.category_id),
        subject: row.subject,
        description: row.description,
        priority: parse_priority(&row.priority)?,
        status: parse_status(&row.status)?,
        created_at: row.created_at,
        updated_at: row.updated_at,
        resolved_at: row.resolved_at,
    })
}

fn row_to_summary(row: SummaryRow) -> Result<ComplaintSummary, ComplaintPersistenceError> {
    let (complaint, category_name, owner_name, owner_email, owner_phone) = row;
    Ok(ComplaintSummary {
        complaint: row_to_complaint(complaint)?,
        category_name,
        owner_name,
        owner_email,
        owner_phone,
    })
}

fn row_to_update(
    row: ComplaintUpdateRow,
    updated_by_name: String,
) -> Result<StatusUpdateEntry, ComplaintPersistenceError> {
    Ok(StatusUpdateEntry {
        id: row.update_id,
        complaint_id: ComplaintId::new(row.complaint_id),
        updated_by: UserId::new(row.updated_by),
        updated_by_name,
        old_status: row.old_status.as_deref().map(parse_status).transpose()?,
        new_status: parse_status(&row.new_status)?,
        note: row.note,
        created_at: row.created_at,
    })
}

fn row_to_attachment(row: AttachmentRow) -> Attachment {
    Attachment {
        id: row.attachment_id,
        complaint_id: ComplaintId::new(row.complaint_id),
        file_name: row.file_name,
        file_path: row.file_path,
        file_type: row.file_type,
        file_size: row.file_size,
        uploaded_at: row.uploaded_at,
    }
}

/// Failure states inside the status-transition transaction.
enum TransitionTxError {
    Db(diesel::result::Error),
    Missing,
    CorruptStatus,
}

impl From<diesel::result::Error> for TransitionTxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Db(error)
    }
}

#[async_trait]
impl ComplaintRepository for DieselComplaintRepository {
    async fn create(
        &self,
        owner: UserId,
        submission: &ComplaintSubmission,
        number: &ComplaintNumber,
        stored: &[StoredAttachment],
    ) -> Result<ComplaintId, ComplaintPersistenceError> {
        let mut conn = self.pool.get().await.map_err(checkout_error)?;

        let complaint_row = NewComplaintRow {
            complaint_number: number.as_str(),
            user_id: owner.get(),
            category_id: submission.category_id.get(),
            subject: &submission.subject,
            description: &submission.description,
            priority: submission.priority.as_str(),
            status: ComplaintStatus::Pending.as_str(),
        };

        let result = conn
            .transaction::<i32, diesel::result::Error, _>(|conn| {
                async move {
                    let complaint_id: i32 = diesel::insert_into(complaints::table)
                        .values(&complaint_row)
                        .returning(complaints::complaint_id)
                        .get_result(conn)
                        .await?;

                    if !stored.is_empty() {
                        let attachment_rows: Vec<NewAttachmentRow<'_>> = stored
                            .iter()
                            .map(|a| NewAttachmentRow {
                                complaint_id,
                                file_name: &a.file_name,
                                file_path: &a.file_path,
                                file_type: &a.file_type,
                                file_size: a.file_size,
                            })
                            .collect();
                        diesel::insert_into(attachments::table)
                            .values(&attachment_rows)
                            .execute(conn)
                            .await?;
                    }

                    diesel::insert_into(complaint_updates::table)
                        .values(&NewComplaintUpdateRow {
                            complaint_id,
                            updated_by: owner.get(),
                            old_status: None,
                            new_status: ComplaintStatus::Pending.as_str(),
                            note: Some(SUBMISSION_NOTE),
                        })
                        .execute(conn)
                        .await?;

                    Ok(complaint_id)
                }
                .scope_boxed()
            })
            .await;

        match result {
            Ok(id) => Ok(ComplaintId::new(id)),
            Err(error) if is_unique_violation(&error) => {
                Err(ComplaintPersistenceError::DuplicateNumber)
            }
            Err(error) if is_foreign_key_violation(&error) => {
                Err(ComplaintPersistenceError::UnknownCategory)
            }
            Err(error) => Err(map_error(error)),
        }
    }

    async fn find_detail(
        &self,
        id: ComplaintId,
    ) -> Result<Option<ComplaintDetail>, ComplaintPersistenceError> {
        let mut conn = self.pool.get().await.map_err(checkout_error)?;

        // Read all three tables inside one transaction so the detail view
        // observes a consistent snapshot of the ledger.
        type DetailRows = (
            Option<SummaryRow>,
            Vec<(ComplaintUpdateRow, String)>,
            Vec<AttachmentRow>,
        );
        let (summary, updates, files): DetailRows = conn
            .transaction::<DetailRows, diesel::result::Error, _>(|conn| {
                async move {
                    let summary: Option<SummaryRow> = complaints::table
                        .inner_join(categories::table)
                        .inner_join(users::table)
                        .filter(complaints::complaint_id.eq(id.get()))
                        .select((
                            ComplaintRow::as_select(),
                            categories::category_name,
                            users::name,
                            users::email,
                            users::phone,
                        ))
                        .first(conn)
                        .await
                        .optional()?;

                    if summary.is_none() {
                        return Ok((None, Vec::new(), Vec::new()));
                    }

                    let updates: Vec<(ComplaintUpdateRow, String)> = complaint_updates::table
                        .inner_join(users::table)
                        .filter(complaint_updates::complaint_id.eq(id.get()))
                        .order((
                            complaint_updates::created_at.desc(),
                            complaint_updates::update_id.desc(),
                        ))
                        .select((ComplaintUpdateRow::as_select(), users::name))
                        .load(conn)
                        .await?;

                    let files: Vec<AttachmentRow> = attachments::table
                        .filter(attachments::complaint_id.eq(id.get()))
                        .order(attachments::attachment_id.asc())
                        .select(AttachmentRow::as_select())
                        .load(conn)
                        .await?;

                    Ok((summary, updates, files))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_error)?;

        let Some(summary) = summary else {
            return Ok(None);
        };

        Ok(Some(ComplaintDetail {
            summary: row_to_summary(summary)?,
            updates: updates
                .into_iter()
                .map(|(row, name)| row_to_update(row, name))
                .collect::<Result<_, _>>()?,
            attachments: files.into_iter().map(row_to_attachment).collect(),
        }))
    }

    async fn list_for_owner(
        &self,
        owner: UserId,
        filter: &ComplaintFilter,
    ) -> Result<Vec<ComplaintSummary>, ComplaintPersistenceError> {
        let mut conn = self.pool.get().await.map_err(checkout_error)?;

        let mut query = complaints::table
            .inner_join(categories::table)
            .inner_join(users::table)
            .filter(complaints::user_id.eq(owner.get()))
            .select((
                ComplaintRow::as_select(),
                categories::category_name,
                users::name,
                users::email,
                users::phone,
            ))
            .order(complaints::created_at.desc())
            .into_boxed();

        if let Some(status) = filter.status {
            query = query.filter(complaints::status.eq(status.as_str()));
        }
        if let Some(search) = filter.search.as_deref() {
            let pattern = format!("%{search}%");
            query = query.filter(
                complaints::complaint_number
                    .ilike(pattern.clone())
                    .or(complaints::subject.ilike(pattern.clone()))
                    .or(categories::category_name.ilike(pattern)),
            );
        }

        let rows: Vec<SummaryRow> = query.load(&mut conn).await.map_err(map_error)?;
        rows.into_iter().map(row_to_summary).collect()
    }

    async fn list_all(
        &self,
        filter: &ComplaintFilter,
    ) -> Result<Vec<ComplaintSummary>, ComplaintPersistenceError> {
        let mut conn = self.pool.get().await.map_err(checkout_error)?;

        let mut query = complaints::table
            .inner_join(categories::table)
            .inner_join(users::table)
            .select((
                ComplaintRow::as_select(),
                categories::category_name,
                users::name,
                users::email,
                users::phone,
            ))
            .order(complaints::created_at.desc())
            .into_boxed();

        if let Some(status) = filter.status {
            query = query.filter(complaints::status.eq(status.as_str()));
        }
        if let Some(priority) = filter.priority {
            query = query.filter(complaints::priority.eq(priority.as_str()));
        }
        if let Some(search) = filter.search.as_deref() {
            let pattern = format!("%{search}%");
            query = query.filter(
                complaints::complaint_number
                    .ilike(pattern.clone())
                    .or(complaints::subject.ilike(pattern.clone()))
                    .or(categories::category_name.ilike(pattern)),
            );
        }

        let rows: Vec<SummaryRow> = query.load(&mut conn).await.map_err(map_error)?;
        rows.into_iter().map(row_to_summary).collect()
    }

    async fn record_transition(
        &self,
        id: ComplaintId,
        updated_by: UserId,
        new_status: ComplaintStatus,
        note: Option<String>,
    ) -> Result<StatusTransition, ComplaintPersistenceError> {
        let mut conn = self.pool.get().await.map_err(checkout_error)?;
        let note = note.as_deref();

        let result = conn
            .transaction::<ComplaintStatus, TransitionTxError, _>(|conn| {
                async move {
                    let current: Option<String> = complaints::table
                        .find(id.get())
                        .select(complaints::status)
                        .first(conn)
                        .await
                        .optional()?;
                    let old_raw = current.ok_or(TransitionTxError::Missing)?;
                    let old_status: ComplaintStatus =
                        old_raw.parse().map_err(|_| TransitionTxError::CorruptStatus)?;

                    let now = Utc::now();
                    if new_status.is_settled() {
                        diesel::update(complaints::table.find(id.get()))
                            .set((
                                complaints::status.eq(new_status.as_str()),
                                complaints::updated_at.eq(now),
                                complaints::resolved_at.eq(now),
                            ))
                            .execute(conn)
                            .await?;
                    } else {
                        diesel::update(complaints::table.find(id.get()))
                            .set((
                                complaints::status.eq(new_status.as_str()),
                                complaints::updated_at.eq(now),
                            ))
                            .execute(conn)
                            .await?;
                    }

                    let default_note;
                    let note = match note {
                        Some(text) => text,
                        None => {
                            default_note = transition_note(old_status, new_status);
                            default_note.as_str()
                        }
                    };
                    diesel::insert_into(complaint_updates::table)
                        .values(&NewComplaintUpdateRow {
                            complaint_id: id.get(),
                            updated_by: updated_by.get(),
                            old_status: Some(old_status.as_str()),
                            new_status: new_status.as_str(),
                            note: Some(note),
                        })
                        .execute(conn)
                        .await?;

                    Ok(old_status)
                }
                .scope_boxed()
            })
            .await;

        match result {
            Ok(old_status) => Ok(StatusTransition {
                old_status,
                new_status,
            }),
            Err(TransitionTxError::Missing) => Err(ComplaintPersistenceError::NotFound),
            Err(TransitionTxError::CorruptStatus) => Err(ComplaintPersistenceError::query(
                "unrecognised status value in storage",
            )),
            Err(TransitionTxError::Db(error)) => Err(map_error(error)),
        }
    }

    async fn stats(&self) -> Result<DashboardStats, ComplaintPersistenceError> {
        let mut conn = self.pool.get().await.map_err(checkout_error)?;

        let counts = conn
            .transaction::<(StatusSummary, Vec<(String, i64)>), diesel::result::Error, _>(|conn| {
                async move {
                    let count_with_status = |status: ComplaintStatus| {
                        complaints::table
                            .filter(complaints::status.eq(status.as_str()))
                            .count()
                    };

                    let total: i64 = complaints::table.count().get_result(conn).await?;
                    let pending: i64 = count_with_status(ComplaintStatus::Pending)
                        .get_result(conn)
                        .await?;
                    let in_progress: i64 = count_with_status(ComplaintStatus::InProgress)
                        .get_result(conn)
                        .await?;
                    let resolved: i64 = count_with_status(ComplaintStatus::Resolved)
                        .get_result(conn)
                        .await?;
                    let closed: i64 = count_with_status(ComplaintStatus::Closed)
                        .get_result(conn)
                        .await?;
                    let high_priority: i64 = complaints::table
                        .filter(complaints::priority.eq(Priority::High.as_str()))
                        .count()
                        .get_result(conn)
                        .await?;

                    let by_category: Vec<(String, i64)> = complaints::table
                        .inner_join(categories::table)
                        .group_by((categories::category_id, categories::category_name))
                        .select((
                            categories::category_name,
                            diesel::dsl::count(complaints::complaint_id),
                        ))
                        .order(diesel::dsl::count(complaints::complaint_id).desc())
                        .load(conn)
                        .await?;

                    Ok((
                        StatusSummary {
                            total,
                            pending,
                            in_progress,
                            resolved,
                            closed,
                            high_priority,
                        },
                        by_category,
                    ))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_error)?;

        let (summary, by_category) = counts;
        Ok(DashboardStats {
            summary,
            by_category: by_category
                .into_iter()
                .map(|(category_name, count)| CategoryCount {
                    category_name,
                    count,
                })
                .collect(),
        })
    }
}
