//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (database repositories, the attachment store, credential hashing, token
//! issuance). Each trait exposes strongly typed errors so adapters map
//! their failures into predictable variants instead of returning
//! `anyhow::Result`.

use async_trait::async_trait;
use thiserror::Error;

use super::category::Category;
use super::complaint::{
    AttachmentUpload, ComplaintDetail, ComplaintFilter, ComplaintId, ComplaintNumber,
    ComplaintStatus, ComplaintSubmission, ComplaintSummary, DashboardStats, StoredAttachment,
};
use super::user::{AuthenticatedUser, UserAccount, UserId};

/// Registration record ready for the credential store: the password has
/// already been hashed by the time it crosses this port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserRecord {
    /// Display name.
    pub name: String,
    /// Unique login email.
    pub email: String,
    /// Optional contact phone number.
    pub phone: Option<String>,
    /// Salted adaptive hash of the password.
    pub password_hash: String,
}

/// Errors surfaced by the credential store adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserPersistenceError {
    /// Database connectivity or pool checkout failures.
    #[error("user store connection failed: {message}")]
    Connection {
        /// Adapter-level failure description; logged, never shown to clients.
        message: String,
    },
    /// Query execution failures.
    #[error("user store query failed: {message}")]
    Query {
        /// Adapter-level failure description; logged, never shown to clients.
        message: String,
    },
    /// The email column's uniqueness constraint rejected the insert.
    #[error("a user with this email already exists")]
    DuplicateEmail,
}

impl UserPersistenceError {
    /// Helper for connection-level adapter errors.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Credential store: user records keyed by id and unique email.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account, failing with
    /// [`UserPersistenceError::DuplicateEmail`] when the email is taken.
    async fn insert(&self, record: NewUserRecord) -> Result<UserId, UserPersistenceError>;

    /// Look up an account by login email.
    async fn find_by_email(&self, email: &str)
    -> Result<Option<UserAccount>, UserPersistenceError>;
}

/// Errors surfaced by the category catalog adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CategoryPersistenceError {
    /// Database connectivity or pool checkout failures.
    #[error("category catalog connection failed: {message}")]
    Connection {
        /// Adapter-level failure description; logged, never shown to clients.
        message: String,
    },
    /// Query execution failures.
    #[error("category catalog query failed: {message}")]
    Query {
        /// Adapter-level failure description; logged, never shown to clients.
        message: String,
    },
}

impl CategoryPersistenceError {
    /// Helper for connection-level adapter errors.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Read-only catalog of complaint categories.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// All categories, ordered by name.
    async fn list(&self) -> Result<Vec<Category>, CategoryPersistenceError>;
}

/// Errors surfaced by the complaint ledger adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComplaintPersistenceError {
    /// Database connectivity or pool checkout failures.
    #[error("complaint ledger connection failed: {message}")]
    Connection {
        /// Adapter-level failure description; logged, never shown to clients.
        message: String,
    },
    /// Query execution failures.
    #[error("complaint ledger query failed: {message}")]
    Query {
        /// Adapter-level failure description; logged, never shown to clients.
        message: String,
    },
    /// The generated complaint number collided with an existing row.
    /// Callers regenerate and retry rather than overwriting.
    #[error("complaint number already exists")]
    DuplicateNumber,
    /// The referenced category does not exist.
    #[error("unknown complaint category")]
    UnknownCategory,
    /// The referenced complaint does not exist.
    #[error("complaint not found")]
    NotFound,
}

impl ComplaintPersistenceError {
    /// Helper for connection-level adapter errors.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Result of an administrative status transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTransition {
    /// Status the complaint held before the update.
    pub old_status: ComplaintStatus,
    /// Status written by the update.
    pub new_status: ComplaintStatus,
}

/// Complaint ledger: complaint rows, the append-only status history, and
/// attachment metadata.
///
/// The two mutating operations are transactional: either every row they
/// describe is written, or none is.
#[async_trait]
pub trait ComplaintRepository: Send + Sync {
    /// Insert a complaint with initial status `pending`, its attachment
    /// metadata, and the submission ledger entry, atomically.
    ///
    /// Fails with [`ComplaintPersistenceError::DuplicateNumber`] when
    /// `number` collides; the caller regenerates and retries.
    async fn create(
        &self,
        owner: UserId,
        submission: &ComplaintSubmission,
        number: &ComplaintNumber,
        attachments: &[StoredAttachment],
    ) -> Result<ComplaintId, ComplaintPersistenceError>;

    /// Fetch a complaint with its full ledger (newest first) and
    /// attachments.
    async fn find_detail(
        &self,
        id: ComplaintId,
    ) -> Result<Option<ComplaintDetail>, ComplaintPersistenceError>;

    /// Complaints owned by `owner`, filtered, newest first.
    async fn list_for_owner(
        &self,
        owner: UserId,
        filter: &ComplaintFilter,
    ) -> Result<Vec<ComplaintSummary>, ComplaintPersistenceError>;

    /// All complaints joined with owner identity, filtered, newest first.
    async fn list_all(
        &self,
        filter: &ComplaintFilter,
    ) -> Result<Vec<ComplaintSummary>, ComplaintPersistenceError>;

    /// Atomically update the complaint row to `new_status` (stamping
    /// `resolved_at` on transitions into settled states) and append the
    /// ledger entry recording old → new with `note`, or the generated
    /// default when `note` is `None`.
    async fn record_transition(
        &self,
        id: ComplaintId,
        updated_by: UserId,
        new_status: ComplaintStatus,
        note: Option<String>,
    ) -> Result<StatusTransition, ComplaintPersistenceError>;

    /// Aggregate dashboard counters computed from current table contents.
    async fn stats(&self) -> Result<DashboardStats, ComplaintPersistenceError>;
}

/// Errors surfaced by the attachment store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttachmentStoreError {
    /// The backing storage rejected the write.
    #[error("attachment write failed: {message}")]
    Write {
        /// Adapter-level failure description; logged, never shown to clients.
        message: String,
    },
}

impl AttachmentStoreError {
    /// Helper for write failures.
    pub fn write(message: impl Into<String>) -> Self {
        Self::Write {
            message: message.into(),
        }
    }
}

/// Capability for persisting uploaded files outside the database.
///
/// The lifecycle service depends on this abstractly so storage backends
/// can be swapped without touching transition logic.
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Persist an upload and return the metadata to record alongside the
    /// complaint.
    async fn store(
        &self,
        upload: AttachmentUpload,
    ) -> Result<StoredAttachment, AttachmentStoreError>;
}

/// Errors surfaced by the password hashing adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordHashError {
    /// The underlying scheme failed to hash or verify.
    #[error("password hashing failed: {message}")]
    Hash {
        /// Adapter-level failure description; logged, never shown to clients.
        message: String,
    },
}

impl PasswordHashError {
    /// Helper for hashing failures.
    pub fn hash(message: impl Into<String>) -> Self {
        Self::Hash {
            message: message.into(),
        }
    }
}

/// Slow, adaptive password hashing.
///
/// Implementations must never log or retain the plaintext.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password with a fresh salt.
    fn hash(&self, password: &str) -> Result<String, PasswordHashError>;

    /// Compare a plaintext password against a stored hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError>;
}

/// Errors surfaced by the token codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Signing failed; an internal fault, not a client error.
    #[error("token issuance failed: {message}")]
    Issue {
        /// Adapter-level failure description; logged, never shown to clients.
        message: String,
    },
    /// Signature, shape, or expiry verification failed.
    #[error("invalid or expired token")]
    Invalid,
}

impl TokenError {
    /// Helper for issuance failures.
    pub fn issue(message: impl Into<String>) -> Self {
        Self::Issue {
            message: message.into(),
        }
    }
}

/// Bearer-token issuance and verification.
///
/// Tokens embed user id, email, and role, and carry a bounded validity
/// window. Verification failures collapse into [`TokenError::Invalid`] so
/// clients learn nothing about why a token was rejected.
pub trait TokenCodec: Send + Sync {
    /// Mint a signed token for the given identity.
    fn issue(&self, user: &AuthenticatedUser) -> Result<String, TokenError>;

    /// Verify a presented token and decode the identity it carries.
    fn verify(&self, token: &str) -> Result<AuthenticatedUser, TokenError>;
}
