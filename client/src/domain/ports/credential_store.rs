//! Driven port persisting the authorization header and role list.
//!
//! The store behaves like client-side cookie storage: writes never fail from
//! the caller's point of view, reads return `None` for missing or expired
//! values.

use chrono::{DateTime, Utc};

/// When a stored credential stops being valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialExpiry {
    /// Expires at the given instant.
    At(DateTime<Utc>),
    /// Lives as long as the storage session (no explicit expiry).
    Session,
}

/// Credential material written after a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredential {
    /// Full `Authorization` header value, e.g. `Bearer abc.def.ghi`.
    pub authorization: String,
    /// Comma-joined role names.
    pub roles: String,
    /// Shared expiry of both values.
    pub expiry: CredentialExpiry,
}

impl StoredCredential {
    /// Assemble a credential from a header value and a role list.
    pub fn new(authorization: impl Into<String>, roles: &[String], expiry: CredentialExpiry) -> Self {
        Self {
            authorization: authorization.into(),
            roles: roles.join(","),
            expiry,
        }
    }
}

/// Port for persisting session credentials.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialStore: Send + Sync {
    /// Persist the authorization header and roles with a shared expiry.
    fn save(&self, credential: &StoredCredential);

    /// Stored `Authorization` header value, if present and unexpired.
    fn authorization(&self) -> Option<String>;

    /// Stored comma-joined role list, if present and unexpired.
    fn roles(&self) -> Option<String>;

    /// Expire both stored values.
    fn delete(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_are_comma_joined_without_spaces() {
        let roles = vec!["ROLE_ADMIN".to_owned(), "ROLE_KUNDE".to_owned()];
        let credential = StoredCredential::new("Bearer t", &roles, CredentialExpiry::Session);
        assert_eq!(credential.roles, "ROLE_ADMIN,ROLE_KUNDE");
    }

    #[test]
    fn empty_role_list_joins_to_empty_string() {
        let credential = StoredCredential::new("Bearer t", &[], CredentialExpiry::Session);
        assert_eq!(credential.roles, "");
    }
}
