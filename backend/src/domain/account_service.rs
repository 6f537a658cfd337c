//! Account registration and login.
//!
//! Hashing and token issuance are behind ports so the service stays free of
//! crypto and wire concerns: it sequences the checks and maps adapter
//! failures into the domain error envelope.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use super::error::Error;
use super::ports::{
    NewUserRecord, PasswordHashError, PasswordHasher, TokenCodec, TokenError, UserPersistenceError,
    UserRepository,
};
use super::user::{AuthenticatedUser, Credentials, NewRegistration, UserId, UserProfile};

/// Successful login: the minted token plus the client-safe profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    /// Signed bearer token with a bounded validity window.
    pub token: String,
    /// Profile of the authenticated account.
    pub user: UserProfile,
}

/// Driving port for account registration and login.
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Register a new account, hashing the password before storage.
    async fn register(&self, registration: NewRegistration) -> Result<UserId, Error>;

    /// Authenticate credentials and mint a bearer token.
    async fn login(&self, credentials: Credentials) -> Result<LoginOutcome, Error>;
}

/// [`AccountService`] backed by the credential store, a password hasher,
/// and a token codec.
#[derive(Clone)]
pub struct CredentialAccountService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenCodec>,
}

impl CredentialAccountService {
    /// Create a new service over the given ports.
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenCodec>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }
}

fn map_user_persistence_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::DuplicateEmail => {
            Error::invalid_request("a user with this email already exists")
                .with_details(json!({ "field": "email", "code": "duplicate_email" }))
        }
        UserPersistenceError::Connection { message } => {
            Error::internal(format!("user store unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user store error: {message}"))
        }
    }
}

fn map_hash_error(error: PasswordHashError) -> Error {
    let PasswordHashError::Hash { message } = error;
    Error::internal(format!("password hashing failed: {message}"))
}

fn map_token_error(error: TokenError) -> Error {
    match error {
        TokenError::Issue { message } => Error::internal(format!("token issuance failed: {message}")),
        TokenError::Invalid => Error::forbidden("invalid or expired token"),
    }
}

/// Single message for both unknown email and bad password, so login
/// failures do not reveal which accounts exist.
fn bad_credentials() -> Error {
    Error::unauthorized("invalid email or password")
}

#[async_trait]
impl AccountService for CredentialAccountService {
    async fn register(&self, registration: NewRegistration) -> Result<UserId, Error> {
        let password_hash = self
            .hasher
            .hash(&registration.password)
            .map_err(map_hash_error)?;

        let record = NewUserRecord {
            name: registration.name,
            email: registration.email,
            phone: registration.phone,
            password_hash,
        };
        let user_id = self
            .users
            .insert(record)
            .await
            .map_err(map_user_persistence_error)?;

        info!(user_id = %user_id, "user registered");
        Ok(user_id)
    }

    async fn login(&self, credentials: Credentials) -> Result<LoginOutcome, Error> {
        let account = self
            .users
            .find_by_email(&credentials.email)
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(bad_credentials)?;

        let valid = self
            .hasher
            .verify(&credentials.password, &account.password_hash)
            .map_err(map_hash_error)?;
        if !valid {
            return Err(bad_credentials());
        }

        let identity = AuthenticatedUser {
            id: account.id,
            email: account.email.clone(),
            role: account.role,
        };
        let token = self.tokens.issue(&identity).map_err(map_token_error)?;

        info!(user_id = %account.id, "login succeeded");
        Ok(LoginOutcome {
            token,
            user: account.profile(),
        })
    }
}
