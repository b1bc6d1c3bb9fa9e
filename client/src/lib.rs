//! Client-side core of the Buch/Kunde administration front-end.
//!
//! The crate follows a hexagonal layout:
//! - [`domain`] holds entities, login flows, the session facade and the
//!   entity sync service. It talks to the outside world only through
//!   [`domain::ports`].
//! - [`outbound`] implements those ports (cookie jar, reqwest transport).
//! - [`inbound`] drives the domain from the command line.

pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
