//! In-memory port implementations for tests.
//!
//! These adapters honour the same contracts as the Diesel-backed ones —
//! unique emails and complaint numbers, filter and ordering semantics, the
//! ledger's append-only behaviour — so handler and integration tests can
//! exercise the full HTTP surface without PostgreSQL.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::complaint::{SUBMISSION_NOTE, transition_note};
use crate::domain::ports::{
    AttachmentStore, AttachmentStoreError, CategoryPersistenceError, CategoryRepository,
    ComplaintPersistenceError, ComplaintRepository, NewUserRecord, PasswordHasher as _,
    StatusTransition, TokenCodec as _, UserPersistenceError, UserRepository,
};
use crate::domain::{
    Attachment, AttachmentUpload, AuthenticatedUser, Category, CategoryCount, CategoryId,
    Complaint, ComplaintDetail, ComplaintFilter, ComplaintId, ComplaintLifecycleService,
    ComplaintNumber, ComplaintStatus, ComplaintSubmission, ComplaintSummary,
    CredentialAccountService, DashboardStats, Priority, Role, StatusSummary, StatusUpdateEntry,
    StoredAttachment, UserAccount, UserId,
};
use crate::inbound::http::state::HttpState;
use crate::outbound::auth::{BcryptPasswordHasher, JwtTokenCodec};

/// The catalog seeded by the schema migration, in insertion order.
#[must_use]
pub fn reference_categories() -> Vec<Category> {
    [
        "Water Supply",
        "Electricity",
        "Roads & Infrastructure",
        "Sanitation",
        "Public Safety",
        "Other",
    ]
    .into_iter()
    .enumerate()
    .map(|(index, name)| Category {
        id: CategoryId::new(i32::try_from(index).expect("small catalog") + 1),
        name: name.to_owned(),
    })
    .collect()
}

/// In-memory credential store.
#[derive(Default)]
pub struct InMemoryUserRepository {
    accounts: Mutex<Vec<UserAccount>>,
    next_id: AtomicI32,
}

impl InMemoryUserRepository {
    /// Insert an account directly, bypassing registration; used to seed
    /// administrators.
    pub fn seed(&self, account: UserAccount) -> UserId {
        let mut accounts = self.accounts.lock().expect("lock");
        accounts.push(account.clone());
        account.id
    }

    /// Allocate the next free identifier.
    pub fn allocate_id(&self) -> UserId {
        UserId::new(self.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    fn display_name(&self, id: UserId) -> Option<String> {
        let accounts = self.accounts.lock().expect("lock");
        accounts.iter().find(|a| a.id == id).map(|a| a.name.clone())
    }

    fn identity(&self, id: UserId) -> Option<(String, String, Option<String>)> {
        let accounts = self.accounts.lock().expect("lock");
        accounts
            .iter()
            .find(|a| a.id == id)
            .map(|a| (a.name.clone(), a.email.clone(), a.phone.clone()))
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, record: NewUserRecord) -> Result<UserId, UserPersistenceError> {
        let mut accounts = self.accounts.lock().expect("lock");
        if accounts.iter().any(|a| a.email == record.email) {
            return Err(UserPersistenceError::DuplicateEmail);
        }
        let id = UserId::new(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        accounts.push(UserAccount {
            id,
            name: record.name,
            email: record.email,
            phone: record.phone,
            password_hash: record.password_hash,
            role: Role::User,
        });
        Ok(id)
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        let accounts = self.accounts.lock().expect("lock");
        Ok(accounts.iter().find(|a| a.email == email).cloned())
    }
}

/// In-memory category catalog.
pub struct InMemoryCategoryCatalog {
    categories: Vec<Category>,
}

impl InMemoryCategoryCatalog {
    /// Wrap a fixed catalog.
    #[must_use]
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryCatalog {
    async fn list(&self) -> Result<Vec<Category>, CategoryPersistenceError> {
        let mut categories = self.categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }
}

/// Attachment store recording uploads without touching disk.
#[derive(Default)]
pub struct MemoryAttachmentStore {
    stored: Mutex<Vec<StoredAttachment>>,
}

impl MemoryAttachmentStore {
    /// Everything stored so far.
    #[must_use]
    pub fn stored(&self) -> Vec<StoredAttachment> {
        self.stored.lock().expect("lock").clone()
    }
}

#[async_trait]
impl AttachmentStore for MemoryAttachmentStore {
    async fn store(
        &self,
        upload: AttachmentUpload,
    ) -> Result<StoredAttachment, AttachmentStoreError> {
        let file_size = i64::try_from(upload.bytes.len())
            .map_err(|_| AttachmentStoreError::write("attachment exceeds representable size"))?;
        let attachment = StoredAttachment {
            file_path: format!("uploads/{}", upload.original_name),
            file_name: upload.original_name,
            file_type: upload.content_type,
            file_size,
        };
        self.stored.lock().expect("lock").push(attachment.clone());
        Ok(attachment)
    }
}

struct StoredComplaint {
    complaint: Complaint,
    updates: Vec<StatusUpdateEntry>,
    attachments: Vec<Attachment>,
}

/// In-memory complaint ledger mirroring the Diesel adapter's semantics.
pub struct InMemoryComplaintLedger {
    users: Arc<InMemoryUserRepository>,
    categories: Vec<Category>,
    complaints: Mutex<Vec<StoredComplaint>>,
    next_id: AtomicI32,
    next_entry_id: AtomicI32,
}

impl InMemoryComplaintLedger {
    /// Create a ledger joining against the given users and catalog.
    #[must_use]
    pub fn new(users: Arc<InMemoryUserRepository>, categories: Vec<Category>) -> Self {
        Self {
            users,
            categories,
            complaints: Mutex::new(Vec::new()),
            next_id: AtomicI32::new(0),
            next_entry_id: AtomicI32::new(0),
        }
    }

    fn category_name(&self, id: CategoryId) -> Option<String> {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.clone())
    }

    fn summary(&self, stored: &StoredComplaint) -> ComplaintSummary {
        let (owner_name, owner_email, owner_phone) = self
            .users
            .identity(stored.complaint.owner)
            .unwrap_or_else(|| ("unknown".to_owned(), "unknown".to_owned(), None));
        ComplaintSummary {
            complaint: stored.complaint.clone(),
            category_name: self
                .category_name(stored.complaint.category_id)
                .unwrap_or_else(|| "unknown".to_owned()),
            owner_name,
            owner_email,
            owner_phone,
        }
    }

    fn matches(&self, stored: &StoredComplaint, filter: &ComplaintFilter) -> bool {
        if let Some(status) = filter.status {
            if stored.complaint.status != status {
                return false;
            }
        }
        if let Some(priority) = filter.priority {
            if stored.complaint.priority != priority {
                return false;
            }
        }
        if let Some(search) = filter.search.as_deref() {
            let term = search.to_lowercase();
            let category = self
                .category_name(stored.complaint.category_id)
                .unwrap_or_default()
                .to_lowercase();
            let matches = stored
                .complaint
                .number
                .as_str()
                .to_lowercase()
                .contains(&term)
                || stored.complaint.subject.to_lowercase().contains(&term)
                || category.contains(&term);
            if !matches {
                return false;
            }
        }
        true
    }

    fn list_where(
        &self,
        owner: Option<UserId>,
        filter: &ComplaintFilter,
    ) -> Vec<ComplaintSummary> {
        let complaints = self.complaints.lock().expect("lock");
        let mut rows: Vec<ComplaintSummary> = complaints
            .iter()
            .filter(|stored| owner.is_none_or(|o| stored.complaint.owner == o))
            .filter(|stored| self.matches(stored, filter))
            .map(|stored| self.summary(stored))
            .collect();
        rows.sort_by(|a, b| {
            b.complaint
                .created_at
                .cmp(&a.complaint.created_at)
                .then(b.complaint.id.get().cmp(&a.complaint.id.get()))
        });
        rows
    }

    fn next_entry_id(&self) -> i32 {
        self.next_entry_id.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[async_trait]
impl ComplaintRepository for InMemoryComplaintLedger {
    async fn create(
        &self,
        owner: UserId,
        submission: &ComplaintSubmission,
        number: &ComplaintNumber,
        attachments: &[StoredAttachment],
    ) -> Result<ComplaintId, ComplaintPersistenceError> {
        if self.category_name(submission.category_id).is_none() {
            return Err(ComplaintPersistenceError::UnknownCategory);
        }

        let mut complaints = self.complaints.lock().expect("lock");
        if complaints
            .iter()
            .any(|stored| stored.complaint.number == *number)
        {
            return Err(ComplaintPersistenceError::DuplicateNumber);
        }

        let id = ComplaintId::new(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let now = Utc::now();
        let complaint = Complaint {
            id,
            number: number.clone(),
            owner,
            category_id: submission.category_id,
            subject: submission.subject.clone(),
            description: submission.description.clone(),
            priority: submission.priority,
            status: ComplaintStatus::Pending,
            created_at: now,
            updated_at: now,
            resolved_at: None,
        };
        let submission_entry = StatusUpdateEntry {
            id: self.next_entry_id(),
            complaint_id: id,
            updated_by: owner,
            updated_by_name: self
                .users
                .display_name(owner)
                .unwrap_or_else(|| "unknown".to_owned()),
            old_status: None,
            new_status: ComplaintStatus::Pending,
            note: Some(SUBMISSION_NOTE.to_owned()),
            created_at: now,
        };
        complaints.push(StoredComplaint {
            complaint,
            updates: vec![submission_entry],
            attachments: attachments
                .iter()
                .map(|stored| Attachment {
                    id: self.next_entry_id(),
                    complaint_id: id,
                    file_name: stored.file_name.clone(),
                    file_path: stored.file_path.clone(),
                    file_type: stored.file_type.clone(),
                    file_size: stored.file_size,
                    uploaded_at: now,
                })
                .collect(),
        });
        Ok(id)
    }

    async fn find_detail(
        &self,
        id: ComplaintId,
    ) -> Result<Option<ComplaintDetail>, ComplaintPersistenceError> {
        let complaints = self.complaints.lock().expect("lock");
        Ok(complaints
            .iter()
            .find(|stored| stored.complaint.id == id)
            .map(|stored| ComplaintDetail {
                summary: self.summary(stored),
                // Entries are stored oldest first; the detail view reads
                // newest first.
                updates: stored.updates.iter().rev().cloned().collect(),
                attachments: stored.attachments.clone(),
            }))
    }

    async fn list_for_owner(
        &self,
        owner: UserId,
        filter: &ComplaintFilter,
    ) -> Result<Vec<ComplaintSummary>, ComplaintPersistenceError> {
        Ok(self.list_where(Some(owner), filter))
    }

    async fn list_all(
        &self,
        filter: &ComplaintFilter,
    ) -> Result<Vec<ComplaintSummary>, ComplaintPersistenceError> {
        Ok(self.list_where(None, filter))
    }

    async fn record_transition(
        &self,
        id: ComplaintId,
        updated_by: UserId,
        new_status: ComplaintStatus,
        note: Option<String>,
    ) -> Result<StatusTransition, ComplaintPersistenceError> {
        let entry_id = self.next_entry_id();
        let updated_by_name = self
            .users
            .display_name(updated_by)
            .unwrap_or_else(|| "unknown".to_owned());

        let mut complaints = self.complaints.lock().expect("lock");
        let stored = complaints
            .iter_mut()
            .find(|stored| stored.complaint.id == id)
            .ok_or(ComplaintPersistenceError::NotFound)?;

        let old_status = stored.complaint.status;
        let now = Utc::now();
        stored.complaint.status = new_status;
        stored.complaint.updated_at = now;
        if new_status.is_settled() {
            stored.complaint.resolved_at = Some(now);
        }
        stored.updates.push(StatusUpdateEntry {
            id: entry_id,
            complaint_id: id,
            updated_by,
            updated_by_name,
            old_status: Some(old_status),
            new_status,
            note: note.or_else(|| Some(transition_note(old_status, new_status))),
            created_at: now,
        });

        Ok(StatusTransition {
            old_status,
            new_status,
        })
    }

    async fn stats(&self) -> Result<DashboardStats, ComplaintPersistenceError> {
        let complaints = self.complaints.lock().expect("lock");
        let count_status = |status: ComplaintStatus| -> i64 {
            i64::try_from(
                complaints
                    .iter()
                    .filter(|stored| stored.complaint.status == status)
                    .count(),
            )
            .expect("count fits")
        };

        let mut by_category: Vec<CategoryCount> = self
            .categories
            .iter()
            .filter_map(|category| {
                let count = i64::try_from(
                    complaints
                        .iter()
                        .filter(|stored| stored.complaint.category_id == category.id)
                        .count(),
                )
                .expect("count fits");
                (count > 0).then(|| CategoryCount {
                    category_name: category.name.clone(),
                    count,
                })
            })
            .collect();
        by_category.sort_by(|a, b| b.count.cmp(&a.count));

        Ok(DashboardStats {
            summary: StatusSummary {
                total: i64::try_from(complaints.len()).expect("count fits"),
                pending: count_status(ComplaintStatus::Pending),
                in_progress: count_status(ComplaintStatus::InProgress),
                resolved: count_status(ComplaintStatus::Resolved),
                closed: count_status(ComplaintStatus::Closed),
                high_priority: i64::try_from(
                    complaints
                        .iter()
                        .filter(|stored| stored.complaint.priority == Priority::High)
                        .count(),
                )
                .expect("count fits"),
            },
            by_category,
        })
    }
}

/// Fully wired in-memory backend for HTTP tests.
pub struct TestBackend {
    /// Handler state bundling the in-memory ports.
    pub state: HttpState,
    /// Direct handle on the credential store.
    pub users: Arc<InMemoryUserRepository>,
    /// Direct handle on the complaint ledger.
    pub ledger: Arc<InMemoryComplaintLedger>,
    /// Direct handle on the attachment store.
    pub store: Arc<MemoryAttachmentStore>,
    tokens: Arc<JwtTokenCodec>,
    hasher: Arc<BcryptPasswordHasher>,
}

impl TestBackend {
    /// Mint a token for an arbitrary identity, bypassing login.
    #[must_use]
    pub fn issue_token(&self, id: i32, email: &str, role: Role) -> String {
        self.tokens
            .issue(&AuthenticatedUser {
                id: UserId::new(id),
                email: email.to_owned(),
                role,
            })
            .expect("issue token")
    }

    /// Seed an administrator account and return its id.
    pub fn seed_admin(&self, name: &str, email: &str, password: &str) -> UserId {
        let id = self.users.allocate_id();
        self.users.seed(UserAccount {
            id,
            name: name.to_owned(),
            email: email.to_owned(),
            phone: None,
            password_hash: self.hasher.hash(password).expect("hash password"),
            role: Role::Admin,
        })
    }
}

/// Build a [`TestBackend`] over fresh in-memory state.
///
/// Uses the real account and lifecycle services with bcrypt at its
/// minimum cost and a fixed JWT secret.
#[must_use]
pub fn test_backend() -> TestBackend {
    let users = Arc::new(InMemoryUserRepository::default());
    let categories = reference_categories();
    let ledger = Arc::new(InMemoryComplaintLedger::new(users.clone(), categories.clone()));
    let store = Arc::new(MemoryAttachmentStore::default());
    let hasher = Arc::new(BcryptPasswordHasher::with_cost(4));
    let tokens = Arc::new(JwtTokenCodec::new(b"test-secret"));

    let accounts = Arc::new(CredentialAccountService::new(
        users.clone(),
        hasher.clone(),
        tokens.clone(),
    ));
    let complaints = Arc::new(ComplaintLifecycleService::new(ledger.clone(), store.clone()));
    let catalog = Arc::new(InMemoryCategoryCatalog::new(categories));

    TestBackend {
        state: HttpState::new(accounts, complaints, catalog, tokens.clone()),
        users,
        ledger,
        store,
        tokens,
        hasher,
    }
}
