//! HTTP Basic login against `GET auth/rollen`.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::Duration;
use mockable::Clock;
use tracing::debug;

use super::{communication_error, ensure_success};
use crate::domain::auth::{LoginCredentials, Roles};
use crate::domain::ports::{
    CredentialExpiry, CredentialStore, LoginError, RestRequest, RestTransport, StoredCredential,
    TokenAcquisition,
};

/// Basic flow.
///
/// The `Basic` header itself is the credential; it is stored for one day.
pub struct BasicAuthLogin<T: ?Sized, S: ?Sized> {
    transport: Arc<T>,
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<T: ?Sized, S: ?Sized> BasicAuthLogin<T, S> {
    /// Create the flow over a transport, a credential store and a clock.
    pub fn new(transport: Arc<T>, store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            transport,
            store,
            clock,
        }
    }
}

/// `Basic base64(username:password)`.
pub(crate) fn basic_authorization(credentials: &LoginCredentials) -> String {
    let pair = format!("{}:{}", credentials.username(), credentials.password());
    format!("Basic {}", STANDARD.encode(pair))
}

#[async_trait]
impl<T, S> TokenAcquisition for BasicAuthLogin<T, S>
where
    T: RestTransport + ?Sized,
    S: CredentialStore + ?Sized,
{
    async fn login(&self, credentials: &LoginCredentials) -> Result<Roles, LoginError> {
        debug!(username = credentials.username(), "basic login");
        let authorization = basic_authorization(credentials);
        let request =
            RestRequest::get("auth/rollen").with_header("Authorization", authorization.clone());
        let response = self
            .transport
            .send(request)
            .await
            .map_err(|err| communication_error(&err))?;
        let response = ensure_success(response)?;

        let roles: Vec<String> = serde_json::from_str(&response.body)
            .map_err(|err| LoginError::decode(err.to_string()))?;
        let roles = Roles::new(roles);
        let expiry = CredentialExpiry::At(self.clock.utc() + Duration::days(1));
        self.store
            .save(&StoredCredential::new(authorization, roles.as_slice(), expiry));
        debug!(roles = %roles, "basic login succeeded");
        Ok(roles)
    }
}
