//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O: unit and
//! integration tests swap in in-memory implementations.

use std::sync::Arc;

use crate::domain::AccountService;
use crate::domain::ComplaintLifecycle;
use crate::domain::ports::{CategoryRepository, TokenCodec};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Registration and login.
    pub accounts: Arc<dyn AccountService>,
    /// The complaint lifecycle service.
    pub complaints: Arc<dyn ComplaintLifecycle>,
    /// Read-only category catalog.
    pub categories: Arc<dyn CategoryRepository>,
    /// Bearer-token verification for the auth gate.
    pub tokens: Arc<dyn TokenCodec>,
}

impl HttpState {
    /// Bundle the given port implementations.
    pub fn new(
        accounts: Arc<dyn AccountService>,
        complaints: Arc<dyn ComplaintLifecycle>,
        categories: Arc<dyn CategoryRepository>,
        tokens: Arc<dyn TokenCodec>,
    ) -> Self {
        Self {
            accounts,
            complaints,
            categories,
            tokens,
        }
    }
}
