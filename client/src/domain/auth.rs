//! Authentication primitives: login credentials and role lists.
//!
//! Inbound adapters validate raw strings through these constructors before
//! any login flow touches the network.

use std::fmt;

use zeroize::Zeroizing;

/// Role granting access to mutating views.
pub const ROLE_ADMIN: &str = "ROLE_ADMIN";

/// Domain error returned when login inputs are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials handed to a login flow.
///
/// ## Invariants
/// - `username` is trimmed and non-empty.
/// - `password` is non-empty, keeps caller whitespace and is zeroized on drop.
///
/// # Examples
/// ```
/// use admin_client::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" admin ", "p").unwrap();
/// assert_eq!(creds.username(), "admin");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }

        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Trimmed username.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password as entered.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Ordered list of role names granted to the current user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roles(Vec<String>);

impl Roles {
    /// Wrap a role list as received from the backend.
    pub fn new(roles: Vec<String>) -> Self {
        Self(roles)
    }

    /// Empty role list.
    pub fn none() -> Self {
        Self::default()
    }

    /// Parse a stored comma-joined role list.
    ///
    /// Empty segments are dropped, so an empty string yields no roles.
    pub fn from_joined(joined: &str) -> Self {
        Self(
            joined
                .split(',')
                .filter(|role| !role.is_empty())
                .map(str::to_owned)
                .collect(),
        )
    }

    /// Comma-joined form as stored in the credential store.
    pub fn joined(&self) -> String {
        self.0.join(",")
    }

    /// `true` when `role` is present (exact match).
    pub fn contains(&self, role: &str) -> bool {
        self.0.iter().any(|candidate| candidate == role)
    }

    /// `true` when the list contains [`ROLE_ADMIN`].
    pub fn is_admin(&self) -> bool {
        self.contains(ROLE_ADMIN)
    }

    /// `true` when no role is granted.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Role names in order.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for Roles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}
