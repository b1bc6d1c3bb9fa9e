//! Cookie-backed credential storage.

mod jar;

pub use jar::{AUTHORIZATION_COOKIE, CookieJarCredentialStore, CookieScope, ROLES_COOKIE};
