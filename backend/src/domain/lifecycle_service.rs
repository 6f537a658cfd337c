//! Complaint lifecycle service.
//!
//! The one component with real invariants: creation seeds the ledger with
//! the submission entry, transitions append to it, and role rules gate
//! every operation. Persistence atomicity lives behind
//! [`ComplaintRepository`]; this service sequences the steps, enforces
//! authorization, and handles complaint-number collisions.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde_json::json;
use tracing::{info, warn};

use super::complaint::{
    AttachmentUpload, ComplaintDetail, ComplaintFilter, ComplaintId, ComplaintNumber,
    ComplaintStatus, ComplaintSubmission, ComplaintSummary, DashboardStats, StoredAttachment,
};
use super::error::Error;
use super::ports::{
    AttachmentStore, AttachmentStoreError, ComplaintPersistenceError, ComplaintRepository,
    StatusTransition,
};
use super::user::AuthenticatedUser;

/// Bounded retries when a generated complaint number collides.
const NUMBER_ATTEMPTS: u32 = 3;

/// Outcome of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedComplaint {
    /// Internal identifier of the new complaint.
    pub id: ComplaintId,
    /// Human-facing reference returned to the submitter.
    pub number: ComplaintNumber,
}

/// Driving port for the complaint lifecycle.
#[async_trait]
pub trait ComplaintLifecycle: Send + Sync {
    /// Submit a complaint with optional attachments.
    async fn create(
        &self,
        requester: &AuthenticatedUser,
        submission: ComplaintSubmission,
        uploads: Vec<AttachmentUpload>,
    ) -> Result<CreatedComplaint, Error>;

    /// Fetch a complaint's full detail; owner or admin only.
    async fn detail(
        &self,
        requester: &AuthenticatedUser,
        id: ComplaintId,
    ) -> Result<ComplaintDetail, Error>;

    /// List the requester's own complaints.
    async fn list_own(
        &self,
        requester: &AuthenticatedUser,
        filter: ComplaintFilter,
    ) -> Result<Vec<ComplaintSummary>, Error>;

    /// List all complaints across users; admin only.
    async fn list_all(
        &self,
        requester: &AuthenticatedUser,
        filter: ComplaintFilter,
    ) -> Result<Vec<ComplaintSummary>, Error>;

    /// Transition a complaint's status and append the ledger entry;
    /// admin only.
    async fn update_status(
        &self,
        requester: &AuthenticatedUser,
        id: ComplaintId,
        new_status: ComplaintStatus,
        note: Option<String>,
    ) -> Result<StatusTransition, Error>;

    /// Aggregate dashboard counters; admin only.
    async fn dashboard_stats(&self, requester: &AuthenticatedUser)
    -> Result<DashboardStats, Error>;
}

/// [`ComplaintLifecycle`] backed by the complaint ledger and an attachment
/// store.
#[derive(Clone)]
pub struct ComplaintLifecycleService {
    complaints: Arc<dyn ComplaintRepository>,
    attachments: Arc<dyn AttachmentStore>,
}

impl ComplaintLifecycleService {
    /// Create a new service over the given ports.
    pub fn new(
        complaints: Arc<dyn ComplaintRepository>,
        attachments: Arc<dyn AttachmentStore>,
    ) -> Self {
        Self {
            complaints,
            attachments,
        }
    }

    fn require_admin(requester: &AuthenticatedUser) -> Result<(), Error> {
        if requester.role.is_admin() {
            Ok(())
        } else {
            Err(Error::forbidden("admin access required"))
        }
    }

    async fn store_uploads(
        &self,
        uploads: Vec<AttachmentUpload>,
    ) -> Result<Vec<StoredAttachment>, Error> {
        let mut stored = Vec::with_capacity(uploads.len());
        for upload in uploads {
            let attachment = self
                .attachments
                .store(upload)
                .await
                .map_err(map_store_error)?;
            stored.push(attachment);
        }
        Ok(stored)
    }
}

fn map_store_error(error: AttachmentStoreError) -> Error {
    let AttachmentStoreError::Write { message } = error;
    Error::internal(format!("attachment store failed: {message}"))
}

fn map_persistence_error(error: ComplaintPersistenceError) -> Error {
    match error {
        ComplaintPersistenceError::NotFound => Error::not_found("complaint not found"),
        ComplaintPersistenceError::UnknownCategory => {
            Error::invalid_request("unknown complaint category")
                .with_details(json!({ "field": "category_id", "code": "unknown_category" }))
        }
        ComplaintPersistenceError::DuplicateNumber => {
            Error::internal("complaint number collision exhausted retries")
        }
        ComplaintPersistenceError::Connection { message } => {
            Error::internal(format!("complaint ledger unavailable: {message}"))
        }
        ComplaintPersistenceError::Query { message } => {
            Error::internal(format!("complaint ledger error: {message}"))
        }
    }
}

fn validate_submission(submission: &ComplaintSubmission) -> Result<(), Error> {
    let missing = |field: &str| {
        Error::invalid_request("category, subject, and description are required")
            .with_details(json!({ "field": field, "code": "missing_field" }))
    };
    if submission.subject.trim().is_empty() {
        return Err(missing("subject"));
    }
    if submission.description.trim().is_empty() {
        return Err(missing("description"));
    }
    Ok(())
}

#[async_trait]
impl ComplaintLifecycle for ComplaintLifecycleService {
    async fn create(
        &self,
        requester: &AuthenticatedUser,
        submission: ComplaintSubmission,
        uploads: Vec<AttachmentUpload>,
    ) -> Result<CreatedComplaint, Error> {
        validate_submission(&submission)?;
        let stored = self.store_uploads(uploads).await?;

        let mut rng = SmallRng::from_entropy();
        let mut last_error = ComplaintPersistenceError::DuplicateNumber;
        for attempt in 0..NUMBER_ATTEMPTS {
            let number = ComplaintNumber::generate(Utc::now(), rng.gen_range(0..1000));
            match self
                .complaints
                .create(requester.id, &submission, &number, &stored)
                .await
            {
                Ok(id) => {
                    info!(complaint_id = %id, complaint_number = %number, "complaint submitted");
                    return Ok(CreatedComplaint { id, number });
                }
                Err(ComplaintPersistenceError::DuplicateNumber) => {
                    warn!(attempt, complaint_number = %number, "complaint number collision");
                    last_error = ComplaintPersistenceError::DuplicateNumber;
                }
                Err(other) => return Err(map_persistence_error(other)),
            }
        }
        Err(map_persistence_error(last_error))
    }

    async fn detail(
        &self,
        requester: &AuthenticatedUser,
        id: ComplaintId,
    ) -> Result<ComplaintDetail, Error> {
        let detail = self
            .complaints
            .find_detail(id)
            .await
            .map_err(map_persistence_error)?
            .ok_or_else(|| Error::not_found("complaint not found"))?;

        if !requester.can_access(detail.summary.complaint.owner) {
            return Err(Error::forbidden("access denied"));
        }
        Ok(detail)
    }

    async fn list_own(
        &self,
        requester: &AuthenticatedUser,
        filter: ComplaintFilter,
    ) -> Result<Vec<ComplaintSummary>, Error> {
        self.complaints
            .list_for_owner(requester.id, &filter)
            .await
            .map_err(map_persistence_error)
    }

    async fn list_all(
        &self,
        requester: &AuthenticatedUser,
        filter: ComplaintFilter,
    ) -> Result<Vec<ComplaintSummary>, Error> {
        Self::require_admin(requester)?;
        self.complaints
            .list_all(&filter)
            .await
            .map_err(map_persistence_error)
    }

    async fn update_status(
        &self,
        requester: &AuthenticatedUser,
        id: ComplaintId,
        new_status: ComplaintStatus,
        note: Option<String>,
    ) -> Result<StatusTransition, Error> {
        Self::require_admin(requester)?;
        // An empty note falls through to the generated default.
        let note = note.filter(|n| !n.trim().is_empty());
        let transition = self
            .complaints
            .record_transition(id, requester.id, new_status, note)
            .await
            .map_err(map_persistence_error)?;

        info!(
            complaint_id = %id,
            old_status = %transition.old_status,
            new_status = %transition.new_status,
            "complaint status updated"
        );
        Ok(transition)
    }

    async fn dashboard_stats(
        &self,
        requester: &AuthenticatedUser,
    ) -> Result<DashboardStats, Error> {
        Self::require_admin(requester)?;
        self.complaints.stats().await.map_err(map_persistence_error)
    }
}
