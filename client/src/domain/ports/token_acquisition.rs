//! Driving contract for the login exchange.
//!
//! Token formats and login protocols vary by backend, so the exchange sits
//! behind one trait. The rest of the client only sees `login -> roles`.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::auth::{LoginCredentials, Roles};

define_port_error! {
    /// Reasons a login attempt fails.
    pub enum LoginError {
        /// Username or password failed validation before any request.
        InvalidCredentials { message: String } =>
            "invalid credentials: {message}",
        /// No response could be obtained from the backend.
        Communication { message: String } =>
            "Kommunikationsfehler mit dem Appserver: {message}",
        /// The backend answered with a non-success status.
        Rejected { status: u16, status_text: String } =>
            "login rejected ({status}): {status_text}",
        /// The response body or the token inside it could not be decoded.
        Decode { message: String } =>
            "login response could not be decoded: {message}",
    }
}

/// Port performing the login exchange and populating the credential store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenAcquisition: Send + Sync {
    /// Exchange `credentials` for a role list.
    ///
    /// Implementations persist the credential on success and leave the store
    /// untouched on failure.
    async fn login(&self, credentials: &LoginCredentials) -> Result<Roles, LoginError>;
}
