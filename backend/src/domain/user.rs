//! User identity and credential types.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

/// Stable numeric user identifier assigned by the credential store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i32);

impl UserId {
    /// Wrap a raw database identifier.
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// Access the raw identifier.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Access role attached to a user account.
///
/// Serialised as `user` / `admin`, matching the stored column values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Ordinary complainant: sees only their own complaints.
    User,
    /// Administrator: triages all complaints and drives status transitions.
    Admin,
}

impl Role {
    /// True for administrator accounts.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Stored column spelling for this role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure parsing a stored role value.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("unrecognised role: {value}")]
pub struct ParseRoleError {
    /// The rejected input.
    pub value: String,
}

impl std::str::FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(ParseRoleError {
                value: other.to_owned(),
            }),
        }
    }
}

/// Full user record held by the credential store.
///
/// Carries the password hash and therefore must never cross the HTTP
/// boundary; handlers expose [`UserProfile`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    /// Stable identifier.
    pub id: UserId,
    /// Registered display name.
    pub name: String,
    /// Unique login email.
    pub email: String,
    /// Optional contact phone number.
    pub phone: Option<String>,
    /// Salted adaptive hash of the password; never the plaintext.
    pub password_hash: String,
    /// Access role.
    pub role: Role,
}

impl UserAccount {
    /// Client-safe projection of this account.
    #[must_use]
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// Client-visible projection of a user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Stable identifier.
    pub id: UserId,
    /// Registered display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Access role.
    pub role: Role,
}

/// Validated registration input for the credential store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRegistration {
    /// Display name; required.
    pub name: String,
    /// Login email; required, unique.
    pub email: String,
    /// Optional contact phone number.
    pub phone: Option<String>,
    /// Plaintext password; hashed before it reaches storage.
    pub password: String,
}

/// Login credentials submitted by a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Login email.
    pub email: String,
    /// Plaintext password, compared against the stored hash.
    pub password: String,
}

/// Identity decoded from a verified bearer token.
///
/// This is the request-scoped authentication context threaded explicitly
/// through handlers and services; there is no ambient current-user state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Stable identifier from the token's subject claim.
    pub id: UserId,
    /// Email embedded at issuance.
    pub email: String,
    /// Role embedded at issuance; gates admin-only operations.
    pub role: Role,
}

impl AuthenticatedUser {
    /// True when this identity may act on behalf of `owner`.
    ///
    /// Admins may act on any complaint; everyone else only on their own.
    #[must_use]
    pub fn can_access(&self, owner: UserId) -> bool {
        self.role.is_admin() || self.id == owner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("user", Role::User)]
    #[case("admin", Role::Admin)]
    fn role_parses_stored_values(#[case] raw: &str, #[case] expected: Role) {
        assert_eq!(raw.parse::<Role>().expect("known role"), expected);
        assert_eq!(expected.as_str(), raw);
    }

    #[test]
    fn role_rejects_unknown_values() {
        let err = "root".parse::<Role>().expect_err("unknown role");
        assert_eq!(err.value, "root");
    }

    #[rstest]
    #[case(Role::Admin, 7, 9, true)]
    #[case(Role::User, 7, 7, true)]
    #[case(Role::User, 7, 9, false)]
    fn access_requires_ownership_or_admin(
        #[case] role: Role,
        #[case] requester: i32,
        #[case] owner: i32,
        #[case] allowed: bool,
    ) {
        let identity = AuthenticatedUser {
            id: UserId::new(requester),
            email: "a@example.com".to_owned(),
            role,
        };
        assert_eq!(identity.can_access(UserId::new(owner)), allowed);
    }

    #[test]
    fn profile_omits_password_hash() {
        let account = UserAccount {
            id: UserId::new(3),
            name: "Alice".to_owned(),
            email: "alice@example.com".to_owned(),
            phone: None,
            password_hash: "$2b$10$hash".to_owned(),
            role: Role::User,
        };
        let profile = account.profile();
        let json = serde_json::to_string(&profile).expect("serialize profile");
        assert!(!json.contains("hash"));
    }
}
