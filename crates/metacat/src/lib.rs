//! Metacat settings service
//!
//! Wires the settings subsystem of `metacat-core` to a storage adapter and
//! serves its HTTP API. Use [`AppBuilder`] to configure and start it.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

// Feature crate re-exports
pub use metacat_core::settings;
pub use metacat_email as email;
pub use metacat_types as types;

// Local modules
pub mod app;
pub mod prelude;
pub mod routes;
pub mod webserver;

pub use crate::app::{App, AppBuilder};

// vim: ts=4
