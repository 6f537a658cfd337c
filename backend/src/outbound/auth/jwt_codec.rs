//! JWT-backed `TokenCodec` adapter.
//!
//! Tokens are HS256-signed and embed the user id (subject), email, and
//! role alongside the standard `iat`/`exp` claims. Every verification
//! failure collapses into [`TokenError::Invalid`] so callers cannot
//! distinguish a bad signature from an expired token.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::ports::{TokenCodec, TokenError};
use crate::domain::{AuthenticatedUser, Role, UserId};

/// Validity window for newly issued tokens.
const TOKEN_VALIDITY_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Subject: the numeric user id.
    sub: i32,
    email: String,
    role: Role,
    iat: i64,
    exp: i64,
}

/// HS256 token codec over a shared secret.
#[derive(Clone)]
pub struct JwtTokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validity: Duration,
}

impl JwtTokenCodec {
    /// Create a codec signing with the given secret and the default
    /// 24-hour validity window.
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validity: Duration::hours(TOKEN_VALIDITY_HOURS),
        }
    }

    /// Override the validity window.
    #[must_use]
    pub fn with_validity(mut self, validity: Duration) -> Self {
        self.validity = validity;
        self
    }
}

impl TokenCodec for JwtTokenCodec {
    fn issue(&self, user: &AuthenticatedUser) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.get(),
            email: user.email.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + self.validity).timestamp(),
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| TokenError::issue(e.to_string()))
    }

    fn verify(&self, token: &str) -> Result<AuthenticatedUser, TokenError> {
        let data =
            jsonwebtoken::decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
                .map_err(|e| {
                    debug!(error = %e, "token verification failed");
                    TokenError::Invalid
                })?;
        Ok(AuthenticatedUser {
            id: UserId::new(data.claims.sub),
            email: data.claims.email,
            role: data.claims.role,
        })
    }
}
