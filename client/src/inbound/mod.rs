//! Inbound adapters driving the domain.
//!
//! - **cli**: clap command tree, dispatch with the admin guard, status
//!   messages and text rendering of view states.

pub mod cli;
