//! Entity synchronisation with the REST backend.
//!
//! [`EntitySyncService`] implements find, find-by-id, save, update and remove
//! for any [`SyncEntity`](crate::domain::entity::SyncEntity). Every operation
//! returns a typed error carrying the HTTP status (or `-1` when no response
//! was obtained) instead of raising.

mod cache;
mod error;
mod service;

pub use cache::{EntitySlot, SessionCache};
pub use error::{FindError, NETWORK_FAILURE, RemoveError, SaveError, SyncCause, UpdateError};
pub use service::{EntitySyncService, Removed};
