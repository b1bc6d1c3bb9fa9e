//! Bearer token login against `POST login`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use mockable::Clock;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{communication_error, ensure_success};
use crate::domain::auth::{LoginCredentials, Roles};
use crate::domain::ports::{
    CredentialExpiry, CredentialStore, LoginError, RestRequest, RestTransport, StoredCredential,
    TokenAcquisition,
};
use crate::domain::token::decode_claims;

const MILLIS_PER_SECOND: f64 = 1000.0;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(alias = "token")]
    access_token: String,
    roles: Option<Vec<String>>,
}

/// Bearer token flow.
///
/// Posts the form-encoded credentials, decodes the returned token's claims
/// and stores `Bearer <token>` with an expiry derived from the `exp` claim.
pub struct BearerTokenLogin<T: ?Sized, S: ?Sized> {
    transport: Arc<T>,
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<T: ?Sized, S: ?Sized> BearerTokenLogin<T, S> {
    /// Create the flow over a transport, a credential store and a clock.
    pub fn new(transport: Arc<T>, store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            transport,
            store,
            clock,
        }
    }

    /// Cookie expiry for a token expiring at `exp` epoch seconds.
    ///
    /// The local UTC offset is subtracted the way browsers report
    /// `getTimezoneOffset` (minutes west of UTC), so the stored instant is
    /// shifted by the local offset.
    fn expiry_for(&self, exp: f64) -> Option<CredentialExpiry> {
        let offset_ms = -i64::from(self.clock.local().offset().local_minus_utc()) * 1000;
        #[expect(
            clippy::cast_possible_truncation,
            reason = "epoch milliseconds of any realistic token fit in i64"
        )]
        let exp_ms = (exp * MILLIS_PER_SECOND).round() as i64;
        DateTime::from_timestamp_millis(exp_ms.checked_add(offset_ms)?).map(CredentialExpiry::At)
    }

    /// `true` when `expiry` is not after now, so the store will not keep it.
    fn is_already_expired(&self, expiry: CredentialExpiry) -> bool {
        matches!(expiry, CredentialExpiry::At(at) if at <= self.clock.utc())
    }
}

#[async_trait]
impl<T, S> TokenAcquisition for BearerTokenLogin<T, S>
where
    T: RestTransport + ?Sized,
    S: CredentialStore + ?Sized,
{
    async fn login(&self, credentials: &LoginCredentials) -> Result<Roles, LoginError> {
        debug!(username = credentials.username(), "bearer login");
        let request = RestRequest::post("login").with_form(vec![
            ("username".to_owned(), credentials.username().to_owned()),
            ("password".to_owned(), credentials.password().to_owned()),
        ]);
        let response = self
            .transport
            .send(request)
            .await
            .map_err(|err| communication_error(&err))?;
        let response = ensure_success(response)?;

        let body: TokenResponse = serde_json::from_str(&response.body)
            .map_err(|err| LoginError::decode(err.to_string()))?;
        let claims =
            decode_claims(&body.access_token).map_err(|err| LoginError::decode(err.to_string()))?;
        let authorization = format!("Bearer {}", body.access_token);

        let Some(exp) = claims.exp() else {
            debug!("token carries no exp claim; storing a session credential");
            self.store.save(&StoredCredential::new(
                authorization,
                &[],
                CredentialExpiry::Session,
            ));
            return Ok(Roles::none());
        };

        let expiry = self
            .expiry_for(exp)
            .ok_or_else(|| LoginError::decode(format!("exp claim {exp} is out of range")))?;
        let roles = Roles::new(body.roles.or_else(|| claims.roles()).unwrap_or_default());
        if self.is_already_expired(expiry) {
            warn!(exp, "token is already expired; the session will not be kept");
        }
        debug!(roles = %roles, "bearer login succeeded");
        self.store
            .save(&StoredCredential::new(authorization, roles.as_slice(), expiry));
        Ok(roles)
    }
}

#[cfg(test)]
mod tests {
    //! Bearer flow behaviour against a scripted transport.
    use super::*;
    use crate::domain::ports::{
        FixtureRestTransport, MockCredentialStore, RestBody, RestResponse, RestTransportError,
    };
    use crate::test_support::{fixture_clock, token_with_claims};
    use futures::executor::block_on;
    use rstest::{fixture, rstest};

    #[fixture]
    fn credentials() -> LoginCredentials {
        LoginCredentials::try_from_parts("admin", "p").expect("valid credentials")
    }

    fn login_with(
        transport: FixtureRestTransport,
        store: MockCredentialStore,
        credentials: &LoginCredentials,
    ) -> (Result<Roles, LoginError>, Arc<FixtureRestTransport>) {
        let transport = Arc::new(transport);
        let flow = BearerTokenLogin::new(Arc::clone(&transport), Arc::new(store), fixture_clock());
        (block_on(flow.login(credentials)), transport)
    }

    #[rstest]
    #[case::expired_before_the_clock(1_000_000_000.0, true)]
    #[case::valid_after_the_clock(1_700_000_000.0, false)]
    fn stale_tokens_are_detected(#[case] exp: f64, #[case] stale: bool) {
        let flow = BearerTokenLogin::new(
            Arc::new(FixtureRestTransport::new()),
            Arc::new(MockCredentialStore::new()),
            fixture_clock(),
        );
        let expiry = flow.expiry_for(exp).expect("exp in range");
        assert_eq!(flow.is_already_expired(expiry), stale);
        assert!(!flow.is_already_expired(CredentialExpiry::Session));
    }

    #[rstest]
    fn expired_token_still_completes_the_login(credentials: LoginCredentials) {
        let token = token_with_claims(r#"{"exp":1000000000,"roles":["ROLE_ADMIN"]}"#);
        let transport = FixtureRestTransport::new();
        transport.respond_with(RestResponse::new(
            200,
            "OK",
            serde_json::json!({ "access_token": token }).to_string(),
        ));
        let mut store = MockCredentialStore::new();
        store
            .expect_save()
            .withf(|credential| matches!(credential.expiry, CredentialExpiry::At(_)))
            .times(1)
            .return_const(());

        let (result, _) = login_with(transport, store, &credentials);

        assert!(result.is_ok());
    }

    #[rstest]
    fn successful_login_stores_bearer_header_and_roles(credentials: LoginCredentials) {
        let token = token_with_claims(r#"{"exp":1700000000}"#);
        let transport = FixtureRestTransport::new();
        transport.respond_with(RestResponse::new(
            200,
            "OK",
            format!(r#"{{"access_token":"{token}","roles":["ROLE_ADMIN","ROLE_KUNDE"]}}"#),
        ));
        let clock = fixture_clock();
        let offset = i64::from(clock.local().offset().local_minus_utc());
        let expected_expiry =
            DateTime::from_timestamp(1_700_000_000 - offset, 0).expect("valid instant");
        let expected_header = format!("Bearer {token}");

        let mut store = MockCredentialStore::new();
        store
            .expect_save()
            .withf(move |credential| {
                credential.authorization == expected_header
                    && credential.roles == "ROLE_ADMIN,ROLE_KUNDE"
                    && credential.expiry == CredentialExpiry::At(expected_expiry)
            })
            .times(1)
            .return_const(());

        let (result, transport) = login_with(transport, store, &credentials);

        let roles = result.expect("login succeeds");
        assert!(roles.is_admin());
        let request = transport.requests().remove(0);
        assert_eq!(request.path, "login");
        assert_eq!(
            request.body,
            RestBody::Form(vec![
                ("username".to_owned(), "admin".to_owned()),
                ("password".to_owned(), "p".to_owned()),
            ])
        );
    }

    #[rstest]
    fn legacy_token_field_is_accepted(credentials: LoginCredentials) {
        let token = token_with_claims(r#"{"exp":1700000000,"roles":["ROLE_KUNDE"]}"#);
        let transport = FixtureRestTransport::new();
        transport.respond_with(RestResponse::new(
            200,
            "OK",
            format!(r#"{{"token":"{token}"}}"#),
        ));
        let mut store = MockCredentialStore::new();
        store
            .expect_save()
            .withf(|credential| credential.roles == "ROLE_KUNDE")
            .times(1)
            .return_const(());

        let (result, _) = login_with(transport, store, &credentials);

        assert_eq!(
            result.expect("login succeeds"),
            Roles::new(vec!["ROLE_KUNDE".to_owned()])
        );
    }

    #[rstest]
    fn missing_exp_stores_session_credential_without_roles(credentials: LoginCredentials) {
        let token = token_with_claims(r#"{"sub":"admin"}"#);
        let transport = FixtureRestTransport::new();
        transport.respond_with(RestResponse::new(
            200,
            "OK",
            format!(r#"{{"access_token":"{token}","roles":["ROLE_ADMIN"]}}"#),
        ));
        let mut store = MockCredentialStore::new();
        store
            .expect_save()
            .withf(|credential| {
                credential.roles.is_empty() && credential.expiry == CredentialExpiry::Session
            })
            .times(1)
            .return_const(());

        let (result, _) = login_with(transport, store, &credentials);

        assert!(result.expect("login succeeds").is_empty());
    }

    #[rstest]
    #[case::rejected(Ok(RestResponse::new(401, "Unauthorized", "")))]
    #[case::network(Err(RestTransportError::network("refused")))]
    #[case::malformed_json(Ok(RestResponse::new(200, "OK", "not json")))]
    #[case::bad_token(Ok(RestResponse::new(200, "OK", r#"{"access_token":"a.b"}"#)))]
    fn failed_login_leaves_store_untouched(
        credentials: LoginCredentials,
        #[case] reply: Result<RestResponse, RestTransportError>,
    ) {
        let transport = FixtureRestTransport::new();
        match reply {
            Ok(response) => transport.respond_with(response),
            Err(err) => transport.fail_with(err),
        };
        let mut store = MockCredentialStore::new();
        store.expect_save().never();

        let (result, _) = login_with(transport, store, &credentials);

        assert!(result.is_err());
    }

    #[rstest]
    fn rejection_carries_status_text(credentials: LoginCredentials) {
        let transport = FixtureRestTransport::new();
        transport.respond_with(RestResponse::new(401, "Unauthorized", ""));
        let mut store = MockCredentialStore::new();
        store.expect_save().never();

        let (result, _) = login_with(transport, store, &credentials);

        assert_eq!(result, Err(LoginError::rejected(401_u16, "Unauthorized")));
    }
}
