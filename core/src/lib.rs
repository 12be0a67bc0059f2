//! Offline-first sync core of the MyBar cocktail app.
//!
//! Local edits to personal bars and the cocktail catalog are recorded as durable pending
//! actions, drained against the server when it is reachable and reconciled with the
//! authoritative catalog on every fetch.

pub mod actions;
pub mod config;
pub mod credentials;
pub mod domain;
pub mod notifications;
pub mod queue;
pub mod reconcile;
pub mod services;
pub mod store;
pub mod sync;

mod error;
mod session;

pub use error::Error;
pub use session::Session;

pub use mybar_remote_api as remote;
