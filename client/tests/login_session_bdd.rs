//! Behaviour tests for login, logout and session state.
//!
//! Scenarios drive the session facade through the real bearer and basic
//! login flows against a scripted transport, storing credentials in an
//! in-memory cookie jar.
//
// rstest-bdd generates guard variables with double underscores, which trips
// the non_snake_case lint under -D warnings.
#![allow(non_snake_case, reason = "rstest-bdd generated guard names")]

use std::cell::{Cell, RefCell};
use std::sync::{Arc, Mutex, PoisonError};

use admin_client::config::LoginFlow;
use admin_client::domain::ports::{
    CredentialStore, FixtureRestTransport, LoginError, RestResponse, RestTransport,
    TokenAcquisition,
};
use admin_client::domain::{
    BasicAuthLogin, BearerTokenLogin, Roles, SessionEvent, SessionService,
};
use admin_client::outbound::cookies::CookieJarCredentialStore;
use admin_client::test_support::{FixtureClock, fixture_clock, token_with_claims};
use chrono::Duration;
use futures::executor::block_on;
use mockable::Clock;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::json;

struct LoginWorld {
    transport: Arc<FixtureRestTransport>,
    store: Arc<CookieJarCredentialStore>,
    clock: Arc<FixtureClock>,
    flow: Cell<LoginFlow>,
    session: RefCell<Option<Arc<SessionService>>>,
    token: RefCell<Option<String>>,
    outcome: RefCell<Option<Result<Roles, LoginError>>>,
    events: Arc<Mutex<Vec<SessionEvent>>>,
}

impl LoginWorld {
    fn new() -> Self {
        let clock = fixture_clock();
        Self {
            transport: Arc::new(FixtureRestTransport::new()),
            store: Arc::new(CookieJarCredentialStore::in_memory(
                Arc::clone(&clock) as Arc<dyn Clock>
            )),
            clock,
            flow: Cell::new(LoginFlow::Bearer),
            session: RefCell::new(None),
            token: RefCell::new(None),
            outcome: RefCell::new(None),
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn session(&self) -> Arc<SessionService> {
        let mut slot = self.session.borrow_mut();
        let session = slot.get_or_insert_with(|| {
            let transport = Arc::clone(&self.transport) as Arc<dyn RestTransport>;
            let store = Arc::clone(&self.store) as Arc<dyn CredentialStore>;
            let clock = Arc::clone(&self.clock) as Arc<dyn Clock>;
            let flow: Arc<dyn TokenAcquisition> = match self.flow.get() {
                LoginFlow::Bearer => Arc::new(BearerTokenLogin::new(
                    transport,
                    Arc::clone(&store),
                    clock,
                )),
                LoginFlow::Basic => {
                    Arc::new(BasicAuthLogin::new(transport, Arc::clone(&store), clock))
                }
            };
            let session = Arc::new(SessionService::new(store, flow));
            let sink = Arc::clone(&self.events);
            session.events().subscribe(move |event: &SessionEvent| {
                sink.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(event.clone());
            });
            session
        });
        Arc::clone(session)
    }

    fn issue_token(&self, claims: &serde_json::Value, roles: Option<Vec<String>>) {
        let token = token_with_claims(&claims.to_string());
        let mut body = json!({ "access_token": token });
        if let Some(roles) = roles {
            body["roles"] = json!(roles);
        }
        self.transport
            .respond_with(RestResponse::new(200, "OK", body.to_string()));
        *self.token.borrow_mut() = Some(token);
    }

    fn log_in(&self, username: &str, password: &str) {
        let session = self.session();
        let outcome = block_on(session.login(username, password));
        *self.outcome.borrow_mut() = Some(outcome);
    }

    fn events(&self) -> Vec<SessionEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

fn split_roles(roles: &str) -> Vec<String> {
    roles.split(',').map(str::to_owned).collect()
}

#[fixture]
fn world() -> LoginWorld {
    LoginWorld::new()
}

#[given("the basic login flow")]
fn the_basic_login_flow(world: &LoginWorld) {
    world.flow.set(LoginFlow::Basic);
}

#[given("an appserver issuing a bearer token with roles \"{roles}\"")]
fn an_appserver_issuing_a_bearer_token_with_roles(world: &LoginWorld, roles: String) {
    world.issue_token(&json!({ "exp": 1_700_000_000 }), Some(split_roles(&roles)));
}

#[given("an appserver issuing a bearer token without expiry")]
fn an_appserver_issuing_a_bearer_token_without_expiry(world: &LoginWorld) {
    world.issue_token(&json!({ "sub": "admin" }), None);
}

#[given("an appserver answering the login with status {status}")]
fn an_appserver_answering_the_login_with_status(world: &LoginWorld, status: u16) {
    world
        .transport
        .respond_with(RestResponse::new(status, "Unauthorized", ""));
}

#[given("an appserver granting roles \"{roles}\"")]
fn an_appserver_granting_roles(world: &LoginWorld, roles: String) {
    world.transport.respond_with(RestResponse::new(
        200,
        "OK",
        json!(split_roles(&roles)).to_string(),
    ));
}

#[given("the user has logged in as \"{username}\" with password \"{password}\"")]
fn the_user_has_logged_in(world: &LoginWorld, username: String, password: String) {
    world.log_in(&username, &password);
    assert!(world.session().is_logged_in());
}

#[when("the user logs in as \"{username}\" with password \"{password}\"")]
fn the_user_logs_in(world: &LoginWorld, username: String, password: String) {
    world.log_in(&username, &password);
}

#[when("the user logs out")]
fn the_user_logs_out(world: &LoginWorld) {
    world.session().logout();
}

#[then("the session is logged in")]
fn the_session_is_logged_in(world: &LoginWorld) {
    assert!(world.session().is_logged_in());
}

#[then("the session is logged out")]
fn the_session_is_logged_out(world: &LoginWorld) {
    let session = world.session();
    assert!(!session.is_logged_in());
    assert!(!session.is_admin());
}

#[then("the session has the admin role")]
fn the_session_has_the_admin_role(world: &LoginWorld) {
    assert!(world.session().is_admin());
}

#[then("the session has no roles")]
fn the_session_has_no_roles(world: &LoginWorld) {
    assert!(world.session().roles().is_empty());
}

#[then("the authorization cookie holds the bearer token")]
fn the_authorization_cookie_holds_the_bearer_token(world: &LoginWorld) {
    let token = world.token.borrow().clone().expect("token was issued");
    assert_eq!(world.store.authorization(), Some(format!("Bearer {token}")));
}

#[then("the authorization cookie holds \"{value}\"")]
fn the_authorization_cookie_holds(world: &LoginWorld, value: String) {
    assert_eq!(world.store.authorization(), Some(value));
}

#[then("the roles cookie holds \"{value}\"")]
fn the_roles_cookie_holds(world: &LoginWorld, value: String) {
    assert_eq!(world.store.roles(), Some(value));
}

#[then("the authorization cookie survives a year")]
fn the_authorization_cookie_survives_a_year(world: &LoginWorld) {
    world.clock.advance(Duration::days(365));
    assert!(world.store.authorization().is_some());
}

#[then("no cookies are stored")]
fn no_cookies_are_stored(world: &LoginWorld) {
    assert_eq!(world.store.authorization(), None);
    assert_eq!(world.store.roles(), None);
}

#[then("the login fails")]
fn the_login_fails(world: &LoginWorld) {
    let outcome = world.outcome.borrow();
    assert!(
        matches!(outcome.as_ref(), Some(Err(_))),
        "expected a failed login, got {outcome:?}"
    );
}

#[then("the appserver received no request")]
fn the_appserver_received_no_request(world: &LoginWorld) {
    assert_eq!(world.transport.request_count(), 0);
}

#[then("subscribers saw the login succeed")]
fn subscribers_saw_the_login_succeed(world: &LoginWorld) {
    let events = world.events();
    assert_eq!(events.first(), Some(&SessionEvent::LoginStateChanged(true)));
    assert!(matches!(
        events.get(1),
        Some(SessionEvent::RolesChanged(roles)) if roles.is_admin()
    ));
}

#[then("subscribers saw the login fail")]
fn subscribers_saw_the_login_fail(world: &LoginWorld) {
    assert_eq!(
        world.events(),
        vec![
            SessionEvent::LoginStateChanged(false),
            SessionEvent::RolesChanged(Roles::none()),
        ]
    );
}

#[scenario(path = "tests/features/login_session.feature")]
fn login_session_scenarios(world: LoginWorld) {
    drop(world);
}
