//! Domain entities, login flows and services.
//!
//! Purpose: hold everything the administration client knows about Buch and
//! Kunde records, authentication and session state, independent of HTTP
//! clients, cookie files and the command line.
//!
//! Public surface:
//! - `Buch`, `Kunde` with their wire, form and criteria types.
//! - `LoginCredentials`, `Roles` and the bearer/basic login flows.
//! - `SessionService` with its `EventBus<SessionEvent>`.
//! - `EntitySyncService` with `SessionCache` and typed sync errors.

pub mod auth;
pub mod buch;
pub mod entity;
pub mod events;
pub mod kunde;
pub mod login;
pub mod ports;
pub mod session;
pub mod sync;
pub mod token;

pub use self::auth::{LoginCredentials, LoginValidationError, ROLE_ADMIN, Roles};
pub use self::buch::{Buch, BuchArt, BuchCriteria, BuchForm, BuchStammdaten, Verlag};
pub use self::entity::{SearchCriteria, SyncEntity};
pub use self::events::{EventBus, SessionEvent, SubscriptionId};
pub use self::kunde::{
    Adresse, Familienstand, Geschlecht, Interesse, Kunde, KundeCriteria, KundeForm,
    KundeStammdaten,
};
pub use self::login::{BasicAuthLogin, BearerTokenLogin};
pub use self::session::SessionService;
pub use self::sync::{
    EntitySlot, EntitySyncService, FindError, RemoveError, Removed, SaveError, SessionCache,
    SyncCause, UpdateError,
};
