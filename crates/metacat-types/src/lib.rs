//! Shared types, adapter traits, and core utilities for Metacat.
//!
//! This crate contains the foundational types that are shared between the
//! server crates and all storage adapter implementations, so adapters can
//! compile without pulling in the settings subsystem itself.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod error;
pub mod prelude;
pub mod settings_adapter;
pub mod types;

// vim: ts=4
