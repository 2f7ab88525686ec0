//! Outbound email (SMTP) settings

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransportationStrategy {
	#[default]
	Smtp,
	Smtps,
	SmtpTls,
}

/// Which template set renders outgoing mail
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailTemplates {
	#[default]
	Default,
	Custom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SmtpSettings {
	/// Name shown as the sender of outgoing mail
	pub emailing_entity: String,
	pub support_url: String,
	pub enable_smtp_server: bool,
	/// Public URL of the catalog, used for links in mail bodies
	pub catalog_url: Option<String>,
	pub sender_mail: Option<String>,
	pub server_endpoint: Option<String>,
	pub server_port: Option<u16>,
	pub username: Option<String>,
	/// Stored as a secret token
	pub password: Option<String>,
	pub transportation_strategy: TransportationStrategy,
	pub templates: EmailTemplates,
}

impl Default for SmtpSettings {
	fn default() -> Self {
		Self {
			emailing_entity: "Metacat".to_string(),
			support_url: "https://metacat.dev/support".to_string(),
			enable_smtp_server: false,
			catalog_url: None,
			sender_mail: None,
			server_endpoint: None,
			server_port: None,
			username: None,
			password: None,
			transportation_strategy: TransportationStrategy::Smtp,
			templates: EmailTemplates::Default,
		}
	}
}


// vim: ts=4
