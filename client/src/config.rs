//! Client configuration loaded via OrthoConfig.
//!
//! Settings layer defaults, an optional configuration file and
//! `ADMIN_CLIENT_*` environment variables. Command-line flags are applied on
//! top by the inbound adapter.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::outbound::cookies::CookieScope;

const DEFAULT_BASE_URL: &str = "https://localhost:3000/rest";
const DEFAULT_COOKIE_FILE: &str = ".admin-client/cookies";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// How the client obtains credentials from the appserver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LoginFlow {
    /// Form login returning a bearer token.
    #[default]
    Bearer,
    /// HTTP Basic credentials checked against the role endpoint.
    Basic,
}

impl LoginFlow {
    /// Configuration spelling of the flow.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bearer => "bearer",
            Self::Basic => "basic",
        }
    }
}

impl fmt::Display for LoginFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoginFlow {
    type Err = SettingsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "bearer" => Ok(Self::Bearer),
            "basic" => Ok(Self::Basic),
            _ => Err(SettingsError::UnknownLoginFlow {
                value: value.to_owned(),
            }),
        }
    }
}

/// Invalid configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// The base URL does not parse.
    #[error("invalid base url {value:?}: {message}")]
    InvalidBaseUrl {
        /// Configured value.
        value: String,
        /// Parser message.
        message: String,
    },
    /// The login flow is neither `bearer` nor `basic`.
    #[error("unknown login flow {value:?} (expected bearer or basic)")]
    UnknownLoginFlow {
        /// Configured value.
        value: String,
    },
}

/// Configuration values for the administration client.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ADMIN_CLIENT")]
pub struct ClientSettings {
    /// Base URL of the REST API, e.g. `https://localhost:3000/rest`.
    pub base_url: Option<String>,
    /// File persisting the session cookies between invocations.
    pub cookie_file: Option<PathBuf>,
    /// Login flow: `bearer` or `basic`.
    pub login_flow: Option<String>,
    /// Request timeout in seconds.
    pub request_timeout_secs: Option<u64>,
    /// `Domain` attribute for written cookies.
    pub cookie_domain: Option<String>,
    /// `Path` attribute for written cookies.
    pub cookie_path: Option<String>,
}

impl ClientSettings {
    /// Configured base URL, falling back to the local appserver.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidBaseUrl`] when the value does not parse.
    pub fn base_url(&self) -> Result<Url, SettingsError> {
        let value = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        Url::parse(value).map_err(|err| SettingsError::InvalidBaseUrl {
            value: value.to_owned(),
            message: err.to_string(),
        })
    }

    /// Configured cookie file, falling back to `.admin-client/cookies`.
    pub fn cookie_file(&self) -> PathBuf {
        self.cookie_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_COOKIE_FILE))
    }

    /// Configured login flow, falling back to bearer.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::UnknownLoginFlow`] for unrecognised names.
    pub fn login_flow(&self) -> Result<LoginFlow, SettingsError> {
        self.login_flow
            .as_deref()
            .map_or(Ok(LoginFlow::default()), str::parse)
    }

    /// Configured request timeout, falling back to 30 seconds.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Cookie attributes derived from `cookie_path` and `cookie_domain`.
    pub fn cookie_scope(&self) -> CookieScope {
        CookieScope {
            path: self.cookie_path.clone(),
            domain: self.cookie_domain.clone(),
        }
    }
}
