//! Driven port for issuing requests against the REST backend.
//!
//! The port speaks plain HTTP concepts (method, path, headers, body) so the
//! entity sync service and the login flows own all status and header
//! interpretation, while adapters own connection handling only.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use super::define_port_error;

/// HTTP verbs used by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestMethod {
    /// Read a resource or collection.
    Get,
    /// Create a resource or submit a login form.
    Post,
    /// Replace a resource.
    Put,
    /// Remove a resource.
    Delete,
}

impl RestMethod {
    /// Upper-case verb as sent on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

/// Request payload variants.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RestBody {
    /// No request body.
    #[default]
    Empty,
    /// JSON document sent as `application/json`.
    Json(Value),
    /// Form fields sent as `application/x-www-form-urlencoded`.
    Form(Vec<(String, String)>),
}

/// A request relative to the configured REST base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct RestRequest {
    /// HTTP method.
    pub method: RestMethod,
    /// Path below the base URL without a leading slash, e.g. `buecher/1`.
    pub path: String,
    /// Query parameters in insertion order.
    pub query: Vec<(String, String)>,
    /// Additional request headers.
    pub headers: Vec<(String, String)>,
    /// Request body.
    pub body: RestBody,
}

impl RestRequest {
    /// Start a request for `method` and `path`.
    pub fn new(method: RestMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: RestBody::Empty,
        }
    }

    /// Shorthand for a `GET` request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(RestMethod::Get, path)
    }

    /// Shorthand for a `POST` request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(RestMethod::Post, path)
    }

    /// Shorthand for a `PUT` request.
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(RestMethod::Put, path)
    }

    /// Shorthand for a `DELETE` request.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(RestMethod::Delete, path)
    }

    /// Replace the query parameters.
    #[must_use]
    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    /// Append a request header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn with_json(mut self, body: Value) -> Self {
        self.body = RestBody::Json(body);
        self
    }

    /// Attach a form-encoded body.
    #[must_use]
    pub fn with_form(mut self, fields: Vec<(String, String)>) -> Self {
        self.body = RestBody::Form(fields);
        self
    }

    /// Look up a request header case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// A response as seen by the domain.
///
/// Adapters return every HTTP response here, including 4xx and 5xx statuses;
/// only failures without a response become [`RestTransportError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestResponse {
    /// Numeric HTTP status.
    pub status: u16,
    /// Reason phrase, e.g. `Not Found`.
    pub status_text: String,
    /// Response headers in arrival order.
    pub headers: Vec<(String, String)>,
    /// Raw response body, possibly empty.
    pub body: String,
}

impl RestResponse {
    /// Build a response without headers.
    pub fn new(status: u16, status_text: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Append a response header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Look up a response header case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// `true` for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

define_port_error! {
    /// Failures that prevented a response from being obtained.
    pub enum RestTransportError {
        /// The request could not be built from the given parts.
        InvalidRequest { message: String } =>
            "invalid request: {message}",
        /// Connection, TLS, timeout or body read failure.
        Network { message: String } =>
            "network failure: {message}",
    }
}

/// Port for sending requests to the REST backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RestTransport: Send + Sync {
    /// Send `request` and return the response, whatever its status.
    async fn send(&self, request: RestRequest) -> Result<RestResponse, RestTransportError>;
}

/// Scripted transport replaying canned responses in order and recording every
/// request it receives.
#[derive(Debug, Default)]
pub struct FixtureRestTransport {
    replies: Mutex<VecDeque<Result<RestResponse, RestTransportError>>>,
    requests: Mutex<Vec<RestRequest>>,
}

impl FixtureRestTransport {
    /// Create a transport with no canned replies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response.
    pub fn respond_with(&self, response: RestResponse) -> &Self {
        self.push(Ok(response))
    }

    /// Queue a transport failure.
    pub fn fail_with(&self, error: RestTransportError) -> &Self {
        self.push(Err(error))
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<RestRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn push(&self, reply: Result<RestResponse, RestTransportError>) -> &Self {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(reply);
        self
    }
}

#[async_trait]
impl RestTransport for FixtureRestTransport {
    async fn send(&self, request: RestRequest) -> Result<RestResponse, RestTransportError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Err(RestTransportError::network("no canned reply left")))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for request/response helpers and the fixture.

    use super::*;
    use futures::executor::block_on;
    use rstest::rstest;

    #[rstest]
    #[case("ETag")]
    #[case("etag")]
    #[case("ETAG")]
    fn response_headers_are_case_insensitive(#[case] name: &str) {
        let response = RestResponse::new(200, "OK", "").with_header("ETag", "\"3\"");
        assert_eq!(response.header(name), Some("\"3\""));
    }

    #[rstest]
    #[case(199, false)]
    #[case(200, true)]
    #[case(204, true)]
    #[case(299, true)]
    #[case(304, false)]
    #[case(404, false)]
    fn success_covers_2xx_only(#[case] status: u16, #[case] expected: bool) {
        assert_eq!(RestResponse::new(status, "", "").is_success(), expected);
    }

    #[test]
    fn fixture_replays_in_order_and_records_requests() {
        let transport = FixtureRestTransport::new();
        transport
            .respond_with(RestResponse::new(200, "OK", "first"))
            .fail_with(RestTransportError::network("down"));

        let first = block_on(transport.send(RestRequest::get("buecher")));
        let second = block_on(transport.send(RestRequest::delete("buecher/1")));
        let third = block_on(transport.send(RestRequest::get("buecher")));

        assert_eq!(first.expect("first reply").body, "first");
        assert_eq!(second, Err(RestTransportError::network("down")));
        assert!(third.is_err(), "exhausted fixture should fail");
        assert_eq!(transport.request_count(), 3);
        assert_eq!(transport.requests()[1].method, RestMethod::Delete);
    }
}
