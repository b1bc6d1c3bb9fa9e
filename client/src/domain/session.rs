//! Session facade over the credential store and the configured login flow.
//!
//! Views consult this service for login state and admin membership, and
//! subscribe to its event bus to react to login and logout.

use std::sync::Arc;

use tracing::{debug, warn};

use super::auth::{LoginCredentials, Roles};
use super::events::{EventBus, SessionEvent};
use super::ports::{CredentialStore, LoginError, TokenAcquisition};

/// Login state, roles and login/logout orchestration.
pub struct SessionService {
    store: Arc<dyn CredentialStore>,
    login_flow: Arc<dyn TokenAcquisition>,
    events: EventBus<SessionEvent>,
}

impl SessionService {
    /// Create the facade over a credential store and a login flow.
    pub fn new(store: Arc<dyn CredentialStore>, login_flow: Arc<dyn TokenAcquisition>) -> Self {
        let service = Self {
            store,
            login_flow,
            events: EventBus::new(),
        };
        debug!(logged_in = service.is_logged_in(), "session service ready");
        service
    }

    /// `true` when an authorization value is stored.
    pub fn is_logged_in(&self) -> bool {
        self.store.authorization().is_some()
    }

    /// `true` when the stored role list contains `ROLE_ADMIN`.
    pub fn is_admin(&self) -> bool {
        self.roles().is_admin()
    }

    /// Stored role list, empty when none is stored.
    pub fn roles(&self) -> Roles {
        self.store
            .roles()
            .map(|joined| Roles::from_joined(&joined))
            .unwrap_or_default()
    }

    /// Stored `Authorization` header value.
    pub fn authorization(&self) -> Option<String> {
        self.store.authorization()
    }

    /// Event bus publishing [`SessionEvent`]s.
    pub fn events(&self) -> &EventBus<SessionEvent> {
        &self.events
    }

    /// Validate the inputs and run the configured login flow.
    ///
    /// Success publishes `LoginStateChanged(true)` then the granted roles.
    /// Any failure publishes `LoginStateChanged(false)` then an empty role
    /// list and returns the error.
    pub async fn login(&self, username: &str, password: &str) -> Result<Roles, LoginError> {
        let outcome = match LoginCredentials::try_from_parts(username, password) {
            Ok(credentials) => self.login_flow.login(&credentials).await,
            Err(err) => Err(LoginError::invalid_credentials(err.to_string())),
        };

        match outcome {
            Ok(roles) => {
                debug!(roles = %roles, "login succeeded");
                self.events.publish(&SessionEvent::LoginStateChanged(true));
                self.events.publish(&SessionEvent::RolesChanged(roles.clone()));
                Ok(roles)
            }
            Err(err) => {
                warn!(error = %err, "login failed");
                self.publish_logged_out();
                Err(err)
            }
        }
    }

    /// Clear stored credentials and announce the logout.
    pub fn logout(&self) {
        debug!("logout");
        self.store.delete();
        self.publish_logged_out();
    }

    fn publish_logged_out(&self) {
        self.events.publish(&SessionEvent::LoginStateChanged(false));
        self.events
            .publish(&SessionEvent::RolesChanged(Roles::none()));
    }
}

#[cfg(test)]
mod tests {
    //! Facade behaviour with mocked ports.
    use std::sync::{Mutex, PoisonError};

    use super::*;
    use crate::domain::ports::{MockCredentialStore, MockTokenAcquisition};
    use futures::executor::block_on;
    use rstest::rstest;

    fn record_events(service: &SessionService) -> Arc<Mutex<Vec<SessionEvent>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        service.events().subscribe(move |event: &SessionEvent| {
            sink.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(event.clone());
        });
        seen
    }

    fn store_with(authorization: Option<&str>, roles: Option<&str>) -> MockCredentialStore {
        let mut store = MockCredentialStore::new();
        let authorization = authorization.map(str::to_owned);
        let roles = roles.map(str::to_owned);
        store
            .expect_authorization()
            .returning(move || authorization.clone());
        store.expect_roles().returning(move || roles.clone());
        store
    }

    #[rstest]
    #[case(None, None, false, false)]
    #[case(Some("Bearer t"), Some("ROLE_KUNDE"), true, false)]
    #[case(Some("Bearer t"), Some("ROLE_KUNDE,ROLE_ADMIN"), true, true)]
    #[case(None, Some("ROLE_ADMIN"), false, true)]
    fn state_is_read_from_the_store(
        #[case] authorization: Option<&str>,
        #[case] roles: Option<&str>,
        #[case] logged_in: bool,
        #[case] admin: bool,
    ) {
        let service = SessionService::new(
            Arc::new(store_with(authorization, roles)),
            Arc::new(MockTokenAcquisition::new()),
        );
        assert_eq!(service.is_logged_in(), logged_in);
        assert_eq!(service.is_admin(), admin);
    }

    #[test]
    fn successful_login_publishes_state_then_roles() {
        let roles = Roles::new(vec!["ROLE_ADMIN".to_owned()]);
        let mut flow = MockTokenAcquisition::new();
        let granted = roles.clone();
        flow.expect_login()
            .withf(|credentials| credentials.username() == "admin")
            .times(1)
            .returning(move |_| Ok(granted.clone()));
        let service = SessionService::new(Arc::new(store_with(None, None)), Arc::new(flow));
        let seen = record_events(&service);

        let result = block_on(service.login(" admin ", "p"));

        assert_eq!(result, Ok(roles.clone()));
        assert_eq!(
            *seen.lock().expect("events lock"),
            vec![
                SessionEvent::LoginStateChanged(true),
                SessionEvent::RolesChanged(roles),
            ]
        );
    }

    #[test]
    fn failed_login_publishes_logged_out_state() {
        let mut flow = MockTokenAcquisition::new();
        flow.expect_login()
            .times(1)
            .returning(|_| Err(LoginError::rejected(401_u16, "Unauthorized")));
        let service = SessionService::new(Arc::new(store_with(None, None)), Arc::new(flow));
        let seen = record_events(&service);

        let result = block_on(service.login("admin", "wrong"));

        assert_eq!(result, Err(LoginError::rejected(401_u16, "Unauthorized")));
        assert_eq!(
            *seen.lock().expect("events lock"),
            vec![
                SessionEvent::LoginStateChanged(false),
                SessionEvent::RolesChanged(Roles::none()),
            ]
        );
    }

    #[test]
    fn blank_username_fails_before_the_login_flow_runs() {
        let mut flow = MockTokenAcquisition::new();
        flow.expect_login().never();
        let service = SessionService::new(Arc::new(store_with(None, None)), Arc::new(flow));

        let result = block_on(service.login("   ", "p"));

        assert!(matches!(result, Err(LoginError::InvalidCredentials { .. })));
    }

    #[test]
    fn logout_clears_store_and_announces_it() {
        let mut store = store_with(None, None);
        store.expect_delete().times(1).return_const(());
        let service = SessionService::new(Arc::new(store), Arc::new(MockTokenAcquisition::new()));
        let seen = record_events(&service);

        service.logout();

        assert_eq!(
            *seen.lock().expect("events lock"),
            vec![
                SessionEvent::LoginStateChanged(false),
                SessionEvent::RolesChanged(Roles::none()),
            ]
        );
    }
}
