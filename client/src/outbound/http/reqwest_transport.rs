//! Reqwest-backed REST transport adapter.
//!
//! This adapter owns transport details only: URL resolution against the
//! configured base, body encoding, timeout and connection error mapping.
//! Every HTTP response, whatever its status, is handed back to the domain.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Response, Url};
use tracing::debug;

use crate::domain::ports::{
    RestBody, RestMethod, RestRequest, RestResponse, RestTransport, RestTransportError,
};

/// Transport sending requests relative to one REST base URL.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
}

impl ReqwestTransport {
    /// Build a transport using a reqwest client with an explicit timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: with_trailing_slash(base_url),
        })
    }

    /// Base URL every request path is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn resolve(&self, request: &RestRequest) -> Result<Url, RestTransportError> {
        let mut url = self
            .base_url
            .join(request.path.trim_start_matches('/'))
            .map_err(|err| {
                RestTransportError::invalid_request(format!("path {}: {err}", request.path))
            })?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        Ok(url)
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

const fn method(method: RestMethod) -> Method {
    match method {
        RestMethod::Get => Method::GET,
        RestMethod::Post => Method::POST,
        RestMethod::Put => Method::PUT,
        RestMethod::Delete => Method::DELETE,
    }
}

#[async_trait]
impl RestTransport for ReqwestTransport {
    async fn send(&self, request: RestRequest) -> Result<RestResponse, RestTransportError> {
        let url = self.resolve(&request)?;
        debug!(method = request.method.as_str(), %url, "sending request");

        let mut builder = self.client.request(method(request.method), url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match &request.body {
            RestBody::Empty => builder,
            RestBody::Json(body) => builder.json(body),
            RestBody::Form(fields) => builder.form(fields),
        };

        let response = builder.send().await.map_err(map_transport_error)?;
        into_rest_response(response).await
    }
}

async fn into_rest_response(response: Response) -> Result<RestResponse, RestTransportError> {
    let status = response.status();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_owned(), value.to_owned()))
        })
        .collect();
    let body = response.text().await.map_err(map_transport_error)?;
    debug!(status = status.as_u16(), "response received");
    Ok(RestResponse {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or_default().to_owned(),
        headers,
        body,
    })
}

fn map_transport_error(error: reqwest::Error) -> RestTransportError {
    if error.is_builder() {
        RestTransportError::invalid_request(error.to_string())
    } else if error.is_timeout() {
        RestTransportError::network(format!("timeout: {error}"))
    } else {
        RestTransportError::network(error.to_string())
    }
}
