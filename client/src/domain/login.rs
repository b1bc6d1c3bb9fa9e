//! Token acquisition flows.
//!
//! Two interchangeable implementations of [`TokenAcquisition`]: a bearer
//! token exchange against `POST login` and an HTTP Basic probe against
//! `GET auth/rollen`. Both persist the credential only after the whole
//! exchange succeeded.
//!
//! [`TokenAcquisition`]: crate::domain::ports::TokenAcquisition

mod basic;
mod bearer;

pub use basic::BasicAuthLogin;
pub use bearer::BearerTokenLogin;

use tracing::{error, warn};

use crate::domain::ports::{LoginError, RestResponse, RestTransportError};

fn communication_error(err: &RestTransportError) -> LoginError {
    error!(error = %err, "Kommunikationsfehler mit dem Appserver");
    LoginError::communication(err.to_string())
}

fn ensure_success(response: RestResponse) -> Result<RestResponse, LoginError> {
    if response.is_success() {
        return Ok(response);
    }
    warn!(status = response.status, "login rejected by backend");
    Err(LoginError::rejected(response.status, response.status_text))
}
