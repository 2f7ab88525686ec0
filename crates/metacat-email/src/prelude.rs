pub use metacat_core::prelude::*;

// vim: ts=4
