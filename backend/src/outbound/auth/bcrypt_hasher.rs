//! bcrypt-backed `PasswordHasher` adapter.

use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// Work factor used for newly hashed passwords.
pub const DEFAULT_COST: u32 = 10;

/// Salted adaptive password hashing via bcrypt.
///
/// Verification reads the cost from the stored hash, so raising the cost
/// later only affects new registrations.
#[derive(Clone)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    /// Create a hasher with the default work factor.
    #[must_use]
    pub const fn new() -> Self {
        Self { cost: DEFAULT_COST }
    }

    /// Override the work factor; test-only costs keep suites fast.
    #[must_use]
    pub const fn with_cost(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for BcryptPasswordHasher {
    fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        bcrypt::hash(password, self.cost).map_err(|e| PasswordHashError::hash(e.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError> {
        bcrypt::verify(password, hash).map_err(|e| PasswordHashError::hash(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // bcrypt's minimum cost; the production default is far too slow for
    // unit tests.
    fn hasher() -> BcryptPasswordHasher {
        BcryptPasswordHasher::with_cost(4)
    }

    #[test]
    fn hash_then_verify_accepts_the_password() {
        let hasher = hasher();
        let hash = hasher.hash("s3cret").expect("hash");
        assert_ne!(hash, "s3cret");
        assert!(hasher.verify("s3cret", &hash).expect("verify"));
    }

    #[test]
    fn verify_rejects_a_wrong_password() {
        let hasher = hasher();
        let hash = hasher.hash("s3cret").expect("hash");
        assert!(!hasher.verify("wrong", &hash).expect("verify"));
    }

    #[test]
    fn hashes_are_salted() {
        let hasher = hasher();
        let first = hasher.hash("s3cret").expect("hash");
        let second = hasher.hash("s3cret").expect("hash");
        assert_ne!(first, second);
    }
}
