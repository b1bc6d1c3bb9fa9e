//! Cookie jar implementing the credential store port.
//!
//! Cookies are held in memory with browser semantics: writing a cookie with
//! an expiry in the past removes it, reads ignore expired cookies and values
//! are URI-component encoded. A persistent jar mirrors its contents to a file
//! holding one `Set-Cookie` line per cookie so separate CLI invocations share
//! one session. Storage failures are logged, never surfaced.

use std::io::ErrorKind;
use std::sync::{Arc, Mutex, PoisonError};

use actix_web::cookie::time::OffsetDateTime;
use actix_web::cookie::{Cookie, Expiration, SameSite};
use cap_std::fs::Dir;
use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::{debug, warn};
use url::form_urlencoded;

use crate::domain::ports::{CredentialExpiry, CredentialStore, StoredCredential};

/// Cookie carrying the `Authorization` header value.
pub const AUTHORIZATION_COOKIE: &str = "authorization";
/// Cookie carrying the comma-joined role list.
pub const ROLES_COOKIE: &str = "roles";

/// Optional `Path` and `Domain` attributes applied to written cookies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieScope {
    /// `Path` attribute.
    pub path: Option<String>,
    /// `Domain` attribute.
    pub domain: Option<String>,
}

struct CookieFile {
    dir: Dir,
    name: String,
}

/// Browser-style cookie jar storing session credentials.
pub struct CookieJarCredentialStore {
    cookies: Mutex<Vec<Cookie<'static>>>,
    file: Option<CookieFile>,
    scope: CookieScope,
    clock: Arc<dyn Clock>,
}

impl CookieJarCredentialStore {
    /// Jar living only as long as this value.
    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        Self {
            cookies: Mutex::new(Vec::new()),
            file: None,
            scope: CookieScope::default(),
            clock,
        }
    }

    /// Jar backed by `file_name` inside `dir`, loading any live cookies.
    ///
    /// A missing file starts an empty jar. Unreadable files and malformed
    /// lines are logged and skipped.
    pub fn persistent(dir: Dir, file_name: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        let file = CookieFile {
            dir,
            name: file_name.into(),
        };
        let now = clock.utc().timestamp();
        let cookies = load(&file)
            .into_iter()
            .filter(|cookie| is_live(cookie, now))
            .collect();
        Self {
            cookies: Mutex::new(cookies),
            file: Some(file),
            scope: CookieScope::default(),
            clock,
        }
    }

    /// Apply `scope` to every cookie written from now on.
    #[must_use]
    pub fn with_scope(mut self, scope: CookieScope) -> Self {
        self.scope = scope;
        self
    }

    /// Decoded value of the live cookie `name`.
    pub fn get(&self, name: &str) -> Option<String> {
        let now = self.clock.utc().timestamp();
        let cookies = self.cookies.lock().unwrap_or_else(PoisonError::into_inner);
        cookies
            .iter()
            .find(|cookie| cookie.name() == name && is_live(cookie, now))
            .map(|cookie| decode_component(cookie.value()))
    }

    /// Write `name=value`; `None` makes a session cookie.
    ///
    /// An expiry at or before the current instant removes the cookie.
    pub fn set(&self, name: &str, value: &str, expires: Option<DateTime<Utc>>) {
        let now = self.clock.utc();
        let mut cookies = self.cookies.lock().unwrap_or_else(PoisonError::into_inner);
        cookies.retain(|cookie| cookie.name() != name);
        if expires.is_none_or(|at| at > now) {
            cookies.push(self.build(name, value, expires));
        } else {
            debug!(cookie = name, "cookie expired on write");
        }
        self.persist(&cookies);
    }

    /// Remove `name` by writing it with an expiry in the past.
    pub fn expire(&self, name: &str) {
        self.set(name, "", Some(DateTime::<Utc>::UNIX_EPOCH));
    }

    fn build(&self, name: &str, value: &str, expires: Option<DateTime<Utc>>) -> Cookie<'static> {
        let mut cookie = Cookie::new(name.to_owned(), encode_component(value));
        cookie.set_secure(true);
        cookie.set_same_site(SameSite::Strict);
        if let Some(at) = expires.and_then(to_offset_date_time) {
            cookie.set_expires(Expiration::DateTime(at));
        }
        if let Some(path) = &self.scope.path {
            cookie.set_path(path.clone());
        }
        if let Some(domain) = &self.scope.domain {
            cookie.set_domain(domain.clone());
        }
        cookie
    }

    fn persist(&self, cookies: &[Cookie<'static>]) {
        let Some(file) = &self.file else {
            return;
        };
        let contents: String = cookies
            .iter()
            .map(|cookie| format!("{cookie}\n"))
            .collect();
        if let Err(err) = file.dir.write(&file.name, contents) {
            warn!(file = %file.name, error = %err, "failed to write cookie file");
        }
    }
}

impl CredentialStore for CookieJarCredentialStore {
    fn save(&self, credential: &StoredCredential) {
        let expires = match credential.expiry {
            CredentialExpiry::At(at) => Some(at),
            CredentialExpiry::Session => None,
        };
        self.set(AUTHORIZATION_COOKIE, &credential.authorization, expires);
        self.set(ROLES_COOKIE, &credential.roles, expires);
    }

    fn authorization(&self) -> Option<String> {
        self.get(AUTHORIZATION_COOKIE)
    }

    fn roles(&self) -> Option<String> {
        self.get(ROLES_COOKIE)
    }

    fn delete(&self) {
        self.expire(AUTHORIZATION_COOKIE);
        self.expire(ROLES_COOKIE);
    }
}

fn load(file: &CookieFile) -> Vec<Cookie<'static>> {
    let contents = match file.dir.read_to_string(&file.name) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return Vec::new(),
        Err(err) => {
            warn!(file = %file.name, error = %err, "failed to read cookie file");
            return Vec::new();
        }
    };
    contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match Cookie::parse(line.to_owned()) {
            Ok(cookie) => Some(cookie),
            Err(err) => {
                warn!(file = %file.name, error = %err, "skipping malformed cookie line");
                None
            }
        })
        .collect()
}

fn is_live(cookie: &Cookie<'_>, now: i64) -> bool {
    cookie
        .expires_datetime()
        .is_none_or(|at| at.unix_timestamp() > now)
}

fn to_offset_date_time(at: DateTime<Utc>) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp(at.timestamp()).ok()
}

fn encode_component(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

fn decode_component(raw: &str) -> String {
    form_urlencoded::parse(raw.as_bytes())
        .next()
        .map(|(decoded, _)| decoded.into_owned())
        .unwrap_or_default()
}
