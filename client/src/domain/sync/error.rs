//! Typed outcomes of failed sync operations.

use std::fmt;

use tracing::error;

use crate::domain::ports::{RestResponse, RestTransportError};

/// Status code used when no HTTP response was obtained.
pub const NETWORK_FAILURE: i32 = -1;

/// What caused a sync failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncCause {
    /// The request never produced a response.
    Transport(String),
    /// The backend answered with a non-success status.
    Response {
        /// Reason phrase.
        status_text: String,
        /// Raw response body, e.g. validation messages on 400.
        body: String,
    },
    /// A client-side precondition or decoding step failed.
    Message(String),
}

impl SyncCause {
    /// Response body when the cause is a server response.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Response { body, .. } => Some(body.as_str()),
            Self::Transport(_) | Self::Message(_) => None,
        }
    }
}

impl fmt::Display for SyncCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(message) | Self::Message(message) => f.write_str(message),
            Self::Response { status_text, body } if body.is_empty() => f.write_str(status_text),
            Self::Response { status_text, body } => write!(f, "{status_text}: {body}"),
        }
    }
}

macro_rules! define_sync_error {
    ($(#[$outer:meta])* $name:ident => $operation:literal) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            /// HTTP status, or [`NETWORK_FAILURE`].
            pub statuscode: i32,
            /// Underlying cause, when known.
            pub cause: Option<SyncCause>,
        }

        impl $name {
            /// Error with an explicit status and cause.
            pub fn new(statuscode: i32, cause: Option<SyncCause>) -> Self {
                Self { statuscode, cause }
            }

            /// Failure without a response.
            pub fn transport(err: &RestTransportError) -> Self {
                error!(error = %err, operation = $operation, "Client-seitiger oder Netzwerkfehler");
                Self::new(NETWORK_FAILURE, Some(SyncCause::Transport(err.to_string())))
            }

            /// Failure carried by a non-success response.
            pub fn response(response: RestResponse) -> Self {
                Self::new(
                    i32::from(response.status),
                    Some(SyncCause::Response {
                        status_text: response.status_text,
                        body: response.body,
                    }),
                )
            }

            /// Client-side failure described by `message`.
            pub fn client(message: impl Into<String>) -> Self {
                Self::new(NETWORK_FAILURE, Some(SyncCause::Message(message.into())))
            }

            /// Response body of the failing request, if any.
            pub fn body(&self) -> Option<&str> {
                self.cause.as_ref().and_then(SyncCause::body)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{} failed with status {}", $operation, self.statuscode)?;
                if let Some(cause) = &self.cause {
                    write!(f, " ({cause})")?;
                }
                Ok(())
            }
        }

        impl std::error::Error for $name {}
    };
}

define_sync_error! {
    /// A search or lookup failed.
    FindError => "find"
}

define_sync_error! {
    /// Creating an entity failed.
    SaveError => "save"
}

define_sync_error! {
    /// Updating an entity failed.
    UpdateError => "update"
}

define_sync_error! {
    /// Removing an entity failed.
    RemoveError => "remove"
}
