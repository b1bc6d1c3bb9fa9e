//! Command-line adapter.

mod args;
mod commands;
mod messages;
mod render;

pub use args::{
    BuchCommand, BuchCreateArgs, BuchFindArgs, BuchUpdateArgs, Cli, Command, GlobalArgs,
    KundeCommand, KundeCreateArgs, KundeFindArgs, KundeUpdateArgs,
};
pub use commands::Console;
pub use messages::{
    ADMIN_REQUIRED, INTERNAL_ERROR, NotFoundText, TOO_MANY_REQUESTS, UNKNOWN_ERROR, find_failure,
    lookup_failure, remove_failure, save_failure, update_failure,
};
pub use render::{SessionView, View, render};
