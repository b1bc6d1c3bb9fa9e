//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (cookie storage, the REST backend, login endpoints). Each trait exposes
//! strongly typed errors so adapters map their failures into predictable
//! variants instead of returning `anyhow::Result`.

mod credential_store;
mod macros;
mod rest_transport;
mod token_acquisition;

pub(crate) use macros::define_port_error;

#[cfg(test)]
pub use credential_store::MockCredentialStore;
pub use credential_store::{CredentialExpiry, CredentialStore, StoredCredential};
#[cfg(test)]
pub use rest_transport::MockRestTransport;
pub use rest_transport::{
    FixtureRestTransport, RestBody, RestMethod, RestRequest, RestResponse, RestTransport,
    RestTransportError,
};
#[cfg(test)]
pub use token_acquisition::MockTokenAcquisition;
pub use token_acquisition::{LoginError, TokenAcquisition};
