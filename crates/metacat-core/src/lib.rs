//! Core of the Metacat settings service.
//!
//! Holds the settings subsystem (registry, typed documents, field policy,
//! secret codec, defaults and store), its HTTP handlers and the shared app
//! state that the server crate builds.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod app;
pub mod core_settings;
pub mod extensions;
pub mod prelude;
pub mod settings;

pub use app::{App, AppBuilderOpts, AppState};
pub use extensions::Extensions;

pub fn register_settings(
	registry: &mut settings::SettingsRegistry,
) -> metacat_types::error::ClResult<()> {
	core_settings::register_settings(registry)
}

// vim: ts=4
