//! Complaint lifecycle handlers.
//!
//! ```text
//! POST /api/complaints                   multipart submission
//! GET  /api/complaints/my-complaints     caller's complaints
//! GET  /api/complaints                   all complaints (admin)
//! GET  /api/complaints/stats/dashboard   aggregate counters (admin)
//! GET  /api/complaints/{id}              full detail (owner or admin)
//! PUT  /api/complaints/{id}/status       status transition (admin)
//! ```
//!
//! The literal routes must be registered before the `{id}` route; the
//! server wiring in `server::configure_api` keeps that order.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    Attachment, ComplaintDetail, ComplaintFilter, ComplaintId, ComplaintSummary, DashboardStats,
    StatusUpdateEntry,
};

use super::ApiResult;
use super::auth::AuthContext;
use super::schemas::ErrorSchema;
use super::state::HttpState;
use super::uploads::parse_complaint_form;
use super::validation::{
    missing_field_error, normalise_search, parse_priority_filter, parse_status, parse_status_filter,
};

/// One complaint row joined with category and owner identity.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComplaintSummaryResponse {
    /// Internal identifier.
    pub complaint_id: i32,
    /// Human-facing reference.
    pub complaint_number: String,
    /// Owning user.
    pub user_id: i32,
    /// Category identifier.
    pub category_id: i32,
    /// Short summary line.
    pub subject: String,
    /// Free-text body.
    pub description: String,
    /// `low`, `medium`, or `high`.
    pub priority: String,
    /// `pending`, `in-progress`, `resolved`, or `closed`.
    pub status: String,
    /// RFC 3339 submission timestamp.
    pub created_at: String,
    /// RFC 3339 last-mutation timestamp.
    pub updated_at: String,
    /// RFC 3339 settlement timestamp, when settled.
    pub resolved_at: Option<String>,
    /// Category name.
    pub category_name: String,
    /// Owner display name.
    pub user_name: String,
    /// Owner email.
    pub user_email: String,
    /// Owner phone, when registered.
    pub user_phone: Option<String>,
}

impl From<ComplaintSummary> for ComplaintSummaryResponse {
    fn from(value: ComplaintSummary) -> Self {
        let complaint = value.complaint;
        Self {
            complaint_id: complaint.id.get(),
            complaint_number: complaint.number.to_string(),
            user_id: complaint.owner.get(),
            category_id: complaint.category_id.get(),
            subject: complaint.subject,
            description: complaint.description,
            priority: complaint.priority.to_string(),
            status: complaint.status.to_string(),
            created_at: complaint.created_at.to_rfc3339(),
            updated_at: complaint.updated_at.to_rfc3339(),
            resolved_at: complaint.resolved_at.map(|t| t.to_rfc3339()),
            category_name: value.category_name,
            user_name: value.owner_name,
            user_email: value.owner_email,
            user_phone: value.owner_phone,
        }
    }
}

/// One ledger entry in a detail response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusUpdateResponse {
    /// Ledger entry identifier.
    pub update_id: i32,
    /// User who performed the transition.
    pub updated_by: i32,
    /// Display name of the updater.
    pub updated_by_name: String,
    /// Status before the transition; absent for the submission entry.
    pub old_status: Option<String>,
    /// Status after the transition.
    pub new_status: String,
    /// Note recorded with the transition.
    pub note: Option<String>,
    /// RFC 3339 timestamp of the entry.
    pub created_at: String,
}

impl From<StatusUpdateEntry> for StatusUpdateResponse {
    fn from(value: StatusUpdateEntry) -> Self {
        Self {
            update_id: value.id,
            updated_by: value.updated_by.get(),
            updated_by_name: value.updated_by_name,
            old_status: value.old_status.map(|s| s.to_string()),
            new_status: value.new_status.to_string(),
            note: value.note,
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// One attachment in a detail response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AttachmentResponse {
    /// Attachment identifier.
    pub attachment_id: i32,
    /// Original client-supplied file name.
    pub file_name: String,
    /// Server-relative stored path under the static prefix.
    pub file_path: String,
    /// MIME type reported at upload.
    pub file_type: String,
    /// Size in bytes.
    pub file_size: i64,
    /// RFC 3339 upload timestamp.
    pub uploaded_at: String,
}

impl From<Attachment> for AttachmentResponse {
    fn from(value: Attachment) -> Self {
        Self {
            attachment_id: value.id,
            file_name: value.file_name,
            file_path: value.file_path,
            file_type: value.file_type,
            file_size: value.file_size,
            uploaded_at: value.uploaded_at.to_rfc3339(),
        }
    }
}

/// Full complaint detail: row plus ledger and attachments.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComplaintDetailResponse {
    /// The complaint row with joined identity.
    #[serde(flatten)]
    pub summary: ComplaintSummaryResponse,
    /// Status history, newest first.
    pub updates: Vec<StatusUpdateResponse>,
    /// Attachment metadata.
    pub attachments: Vec<AttachmentResponse>,
}

impl From<ComplaintDetail> for ComplaintDetailResponse {
    fn from(value: ComplaintDetail) -> Self {
        Self {
            summary: value.summary.into(),
            updates: value.updates.into_iter().map(Into::into).collect(),
            attachments: value.attachments.into_iter().map(Into::into).collect(),
        }
    }
}

/// Response payload for a successful submission.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateComplaintResponse {
    /// Human-readable confirmation.
    pub message: String,
    /// Internal identifier of the new complaint.
    #[serde(rename = "complaintId")]
    pub complaint_id: i32,
    /// Human-facing reference of the new complaint.
    #[serde(rename = "complaintNumber")]
    pub complaint_number: String,
}

/// Generic confirmation payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    /// Human-readable confirmation.
    pub message: String,
}

/// Aggregate counters for the admin dashboard.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusSummaryResponse {
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
    /// Count filed as high priority.
    pub high_priority: i64,
}

/// Complaint volume for one category.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryCountResponse {
    /// Category name.
    pub category_name: String,
    /// Number of complaints filed under it.
    pub count: i64,
}

/// Dashboard statistics payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DashboardStatsResponse {
    /// Aggregate counters.
    pub summary: StatusSummaryResponse,
    /// Per-category complaint counts, descending.
    pub by_category: Vec<CategoryCountResponse>,
}

impl From<DashboardStats> for DashboardStatsResponse {
    fn from(value: DashboardStats) -> Self {
        Self {
            summary: StatusSummaryResponse {
                total: value.summary.total,
                pending: value.summary.pending,
                in_progress: value.summary.in_progress,
                resolved: value.summary.resolved,
                closed: value.summary.closed,
                high_priority: value.summary.high_priority,
            },
            by_category: value
                .by_category
                .into_iter()
                .map(|c| CategoryCountResponse {
                    category_name: c.category_name,
                    count: c.count,
                })
                .collect(),
        }
    }
}

/// Filters for `GET /api/complaints/my-complaints`.
#[derive(Debug, Deserialize, IntoParams)]
pub struct MyComplaintsQuery {
    /// Exact status match; `all` or empty means no filter.
    pub status: Option<String>,
    /// Case-insensitive substring search.
    pub search: Option<String>,
}

/// Filters for the admin `GET /api/complaints`.
#[derive(Debug, Deserialize, IntoParams)]
pub struct AllComplaintsQuery {
    /// Exact status match; `all` or empty means no filter.
    pub status: Option<String>,
    /// Exact priority match; `all` or empty means no filter.
    pub priority: Option<String>,
    /// Case-insensitive substring search.
    pub search: Option<String>,
}

/// Request payload for `PUT /api/complaints/{id}/status`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// New status; required and must be a known value.
    pub status: Option<String>,
    /// Optional note; a default is generated when omitted.
    pub note: Option<String>,
}

/// Submit a new complaint with optional attachments.
#[utoipa::path(
    post,
    path = "/api/complaints",
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Complaint submitted", body = CreateComplaintResponse),
        (status = 400, description = "Invalid submission", body = ErrorSchema),
        (status = 401, description = "Missing token", body = ErrorSchema),
        (status = 403, description = "Invalid token", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["complaints"],
    operation_id = "submitComplaint"
)]
#[post("/complaints")]
pub async fn submit_complaint(
    state: web::Data<HttpState>,
    ctx: AuthContext,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    let form = parse_complaint_form(payload).await?;
    let created = state
        .complaints
        .create(ctx.user(), form.submission, form.uploads)
        .await?;
    Ok(HttpResponse::Created().json(CreateComplaintResponse {
        message: "Complaint submitted successfully".to_owned(),
        complaint_id: created.id.get(),
        complaint_number: created.number.to_string(),
    }))
}

/// List the caller's complaints.
#[utoipa::path(
    get,
    path = "/api/complaints/my-complaints",
    params(MyComplaintsQuery),
    responses(
        (status = 200, description = "Caller's complaints", body = [ComplaintSummaryResponse]),
        (status = 400, description = "Invalid filter", body = ErrorSchema),
        (status = 401, description = "Missing token", body = ErrorSchema),
        (status = 403, description = "Invalid token", body = ErrorSchema)
    ),
    tags = ["complaints"],
    operation_id = "myComplaints"
)]
#[get("/complaints/my-complaints")]
pub async fn my_complaints(
    state: web::Data<HttpState>,
    ctx: AuthContext,
    query: web::Query<MyComplaintsQuery>,
) -> ApiResult<web::Json<Vec<ComplaintSummaryResponse>>> {
    let query = query.into_inner();
    let filter = ComplaintFilter {
        status: parse_status_filter(query.status.as_deref())?,
        priority: None,
        search: normalise_search(query.search),
    };
    let rows = state.complaints.list_own(ctx.user(), filter).await?;
    Ok(web::Json(rows.into_iter().map(Into::into).collect()))
}

/// List all complaints across users; admin only.
#[utoipa::path(
    get,
    path = "/api/complaints",
    params(AllComplaintsQuery),
    responses(
        (status = 200, description = "All complaints", body = [ComplaintSummaryResponse]),
        (status = 400, description = "Invalid filter", body = ErrorSchema),
        (status = 401, description = "Missing token", body = ErrorSchema),
        (status = 403, description = "Not an admin", body = ErrorSchema)
    ),
    tags = ["complaints"],
    operation_id = "listComplaints"
)]
#[get("/complaints")]
pub async fn all_complaints(
    state: web::Data<HttpState>,
    ctx: AuthContext,
    query: web::Query<AllComplaintsQuery>,
) -> ApiResult<web::Json<Vec<ComplaintSummaryResponse>>> {
    let query = query.into_inner();
    let filter = ComplaintFilter {
        status: parse_status_filter(query.status.as_deref())?,
        priority: parse_priority_filter(query.priority.as_deref())?,
        search: normalise_search(query.search),
    };
    let rows = state.complaints.list_all(ctx.user(), filter).await?;
    Ok(web::Json(rows.into_iter().map(Into::into).collect()))
}

/// Aggregate dashboard counters; admin only.
#[utoipa::path(
    get,
    path = "/api/complaints/stats/dashboard",
    responses(
        (status = 200, description = "Dashboard statistics", body = DashboardStatsResponse),
        (status = 401, description = "Missing token", body = ErrorSchema),
        (status = 403, description = "Not an admin", body = ErrorSchema)
    ),
    tags = ["complaints"],
    operation_id = "dashboardStats"
)]
#[get("/complaints/stats/dashboard")]
pub async fn dashboard_stats(
    state: web::Data<HttpState>,
    ctx: AuthContext,
) -> ApiResult<web::Json<DashboardStatsResponse>> {
    let stats = state.complaints.dashboard_stats(ctx.user()).await?;
    Ok(web::Json(stats.into()))
}

/// Fetch a complaint's full detail; owner or admin only.
#[utoipa::path(
    get,
    path = "/api/complaints/{id}",
    params(("id" = i32, Path, description = "Complaint identifier")),
    responses(
        (status = 200, description = "Complaint detail", body = ComplaintDetailResponse),
        (status = 401, description = "Missing token", body = ErrorSchema),
        (status = 403, description = "Not the owner or an admin", body = ErrorSchema),
        (status = 404, description = "No such complaint", body = ErrorSchema)
    ),
    tags = ["complaints"],
    operation_id = "complaintDetail"
)]
#[get("/complaints/{id}")]
pub async fn complaint_detail(
    state: web::Data<HttpState>,
    ctx: AuthContext,
    path: web::Path<i32>,
) -> ApiResult<web::Json<ComplaintDetailResponse>> {
    let id = ComplaintId::new(path.into_inner());
    let detail = state.complaints.detail(ctx.user(), id).await?;
    Ok(web::Json(detail.into()))
}

/// Transition a complaint's status; admin only.
#[utoipa::path(
    put,
    path = "/api/complaints/{id}/status",
    params(("id" = i32, Path, description = "Complaint identifier")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = MessageResponse),
        (status = 400, description = "Unknown status value", body = ErrorSchema),
        (status = 401, description = "Missing token", body = ErrorSchema),
        (status = 403, description = "Not an admin", body = ErrorSchema),
        (status = 404, description = "No such complaint", body = ErrorSchema)
    ),
    tags = ["complaints"],
    operation_id = "updateComplaintStatus"
)]
#[put("/complaints/{id}/status")]
pub async fn update_status(
    state: web::Data<HttpState>,
    ctx: AuthContext,
    path: web::Path<i32>,
    payload: web::Json<UpdateStatusRequest>,
) -> ApiResult<web::Json<MessageResponse>> {
    let id = ComplaintId::new(path.into_inner());
    let UpdateStatusRequest { status, note } = payload.into_inner();
    let status = status.ok_or_else(|| missing_field_error("status"))?;
    let new_status = parse_status(&status)?;

    state
        .complaints
        .update_status(ctx.user(), id, new_status, note)
        .await?;
    Ok(web::Json(MessageResponse {
        message: "Complaint status updated successfully".to_owned(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::complaint::{Complaint, ComplaintNumber, ComplaintStatus, Priority};
    use crate::domain::{CategoryId, UserId};
    use chrono::{TimeZone, Utc};

    fn summary() -> ComplaintSummary {
        let created = Utc.with_ymd_and_hms(2026, 8, 6, 9, 30, 0).single().expect("valid");
        ComplaintSummary {
            complaint: Complaint {
                id: crate::domain::ComplaintId::new(5),
                number: ComplaintNumber::from_stored("CMP1722945600000123".to_owned()),
                owner: UserId::new(1),
                category_id: CategoryId::new(2),
                subject: "Leaking pipe".to_owned(),
                description: "Kitchen pipe leaking".to_owned(),
                priority: Priority::High,
                status: ComplaintStatus::Pending,
                created_at: created,
                updated_at: created,
                resolved_at: None,
            },
            category_name: "Water Supply".to_owned(),
            owner_name: "Alice".to_owned(),
            owner_email: "alice@example.com".to_owned(),
            owner_phone: Some("555-0100".to_owned()),
        }
    }

    #[test]
    fn summary_response_uses_row_shaped_keys() {
        let response = ComplaintSummaryResponse::from(summary());
        let value = serde_json::to_value(&response).expect("serialize");
        assert_eq!(value["complaint_number"], "CMP1722945600000123");
        assert_eq!(value["category_name"], "Water Supply");
        assert_eq!(value["user_email"], "alice@example.com");
        assert_eq!(value["priority"], "high");
        assert_eq!(value["status"], "pending");
        assert!(value["resolved_at"].is_null());
    }

    #[test]
    fn create_response_uses_camel_case_identifiers() {
        let response = CreateComplaintResponse {
            message: "Complaint submitted successfully".to_owned(),
            complaint_id: 5,
            complaint_number: "CMP1722945600000123".to_owned(),
        };
        let value = serde_json::to_value(&response).expect("serialize");
        assert_eq!(value["complaintId"], 5);
        assert_eq!(value["complaintNumber"], "CMP1722945600000123");
    }
}
