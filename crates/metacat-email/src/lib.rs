//! Outbound email
//!
//! Mail goes out through SMTP (lettre) using the `emailConfiguration` settings.
//! The SMTP password is decrypted only for the duration of a send.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod sender;

mod prelude;

pub use sender::{EmailSender, SendStatus};

use serde::{Deserialize, Serialize};

/// Email message to be sent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailMessage {
	pub to: String,
	pub subject: String,
	pub text_body: String,
	pub html_body: Option<String>,
}

// vim: ts=4
