//! Outbound adapters implementing domain ports.
//!
//! - **cookies**: browser-style cookie jar backing the credential store,
//!   optionally persisted to a file so CLI invocations share a session.
//! - **http**: reqwest-backed REST transport.
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod cookies;
pub mod http;
