//! Domain primitives, aggregates, and services.
//!
//! Everything in this module is transport and storage agnostic: entities
//! and validation newtypes, the error envelope adapters map to HTTP, the
//! account and complaint-lifecycle services, and the port traits driven
//! adapters implement.

pub mod account_service;
pub mod category;
pub mod complaint;
pub mod error;
pub mod lifecycle_service;
pub mod ports;
pub mod trace_id;
pub mod user;

pub use self::account_service::{AccountService, CredentialAccountService, LoginOutcome};
pub use self::category::{Category, CategoryId};
pub use self::complaint::{
    Attachment, AttachmentUpload, CategoryCount, Complaint, ComplaintDetail, ComplaintFilter,
    ComplaintId, ComplaintNumber, ComplaintStatus, ComplaintSubmission, ComplaintSummary,
    DashboardStats, Priority, StatusSummary, StatusUpdateEntry, StoredAttachment,
};
pub use self::error::{Error, ErrorCode};
pub use self::lifecycle_service::{ComplaintLifecycle, ComplaintLifecycleService, CreatedComplaint};
pub use self::ports::{StatusTransition, TokenError};
pub use self::trace_id::{TraceId, TRACE_ID_HEADER};
pub use self::user::{
    AuthenticatedUser, Credentials, NewRegistration, Role, UserAccount, UserId, UserProfile,
};

/// Convenient result alias for fallible domain operations.
pub type ApiResult<T> = Result<T, Error>;
