//! SMTP email sender using lettre
//!
//! Reads the `emailConfiguration` settings with the password decrypted on
//! every send, so configuration changes apply without a restart.

use lettre::message::{MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;
use std::time::Duration;

use metacat_core::settings::documents::{SmtpSettings, TransportationStrategy};
use metacat_core::settings::SettingsStore;

use crate::prelude::*;
use crate::EmailMessage;

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStatus {
	Sent,
	/// `enableSmtpServer` is off
	Disabled,
}

/// SMTP email sender
pub struct EmailSender {
	settings: Arc<SettingsStore>,
}

impl EmailSender {
	pub fn new(settings: Arc<SettingsStore>) -> Self {
		Self { settings }
	}

	/// Send email using the stored SMTP settings
	pub async fn send(&self, message: EmailMessage) -> ClResult<SendStatus> {
		let smtp: SmtpSettings = self.settings.decrypted_document().await?;
		if !smtp.enable_smtp_server {
			info!("Email sending disabled, skipping send to {}", message.to);
			return Ok(SendStatus::Disabled);
		}

		let email = build_message(&smtp, message.clone())?;
		let mailer = build_transport(&smtp)?;

		debug!(
			"Sending email to {} via {:?} using {:?}",
			message.to, smtp.server_endpoint, smtp.transportation_strategy
		);
		match mailer.send(email).await {
			Ok(response) => {
				info!("Email sent successfully to {} (response: {:?})", message.to, response.code());
				Ok(SendStatus::Sent)
			}
			Err(err) => {
				warn!("Failed to send email to {}: {}", message.to, err);
				Err(Error::ServiceUnavailable(format!("SMTP send failed: {}", err)))
			}
		}
	}
}

pub(crate) fn build_message(smtp: &SmtpSettings, message: EmailMessage) -> ClResult<Message> {
	let from_address = smtp
		.sender_mail
		.as_deref()
		.filter(|addr| !addr.is_empty())
		.ok_or_else(|| Error::ConfigError("emailConfiguration.senderMail is not set".into()))?;

	let builder = Message::builder()
		.from(
			format!("{} <{}>", smtp.emailing_entity, from_address)
				.parse()
				.map_err(|_| Error::ConfigError("Invalid sender email format".into()))?,
		)
		.to(message
			.to
			.parse()
			.map_err(|_| Error::ValidationError("Invalid recipient email format".into()))?)
		.subject(message.subject);

	let email = match message.html_body {
		Some(html_body) => builder.multipart(
			MultiPart::alternative()
				.singlepart(SinglePart::plain(message.text_body))
				.singlepart(SinglePart::html(html_body)),
		),
		None => builder.singlepart(SinglePart::plain(message.text_body)),
	};
	email.map_err(|err| Error::ValidationError(format!("Failed to build email: {}", err)))
}

pub(crate) fn default_port(strategy: TransportationStrategy) -> u16 {
	match strategy {
		TransportationStrategy::Smtp => 25,
		TransportationStrategy::Smtps => 465,
		TransportationStrategy::SmtpTls => 587,
	}
}

pub(crate) fn build_transport(smtp: &SmtpSettings) -> ClResult<AsyncSmtpTransport<Tokio1Executor>> {
	let host = smtp
		.server_endpoint
		.as_deref()
		.filter(|host| !host.is_empty())
		.ok_or_else(|| Error::ConfigError("emailConfiguration.serverEndpoint is not set".into()))?;
	let tls_params = || {
		TlsParameters::builder(host.to_string())
			.build()
			.map_err(|err| Error::ConfigError(format!("TLS configuration error: {}", err)))
	};

	let tls = match smtp.transportation_strategy {
		TransportationStrategy::Smtp => Tls::None,
		TransportationStrategy::Smtps => Tls::Wrapper(tls_params()?),
		TransportationStrategy::SmtpTls => Tls::Required(tls_params()?),
	};
	let port = smtp.server_port.unwrap_or_else(|| default_port(smtp.transportation_strategy));

	let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
		.port(port)
		.timeout(Some(SMTP_TIMEOUT))
		.tls(tls);
	if let Some(username) = smtp.username.as_deref().filter(|user| !user.is_empty()) {
		let password = smtp.password.clone().unwrap_or_default();
		builder = builder.credentials(Credentials::new(username.to_string(), password));
	}
	Ok(builder.build())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn enabled_smtp() -> SmtpSettings {
		SmtpSettings {
			enable_smtp_server: true,
			sender_mail: Some("catalog@example.com".into()),
			server_endpoint: Some("smtp.example.com".into()),
			..Default::default()
		}
	}

	fn message(html: bool) -> EmailMessage {
		EmailMessage {
			to: "user@example.com".into(),
			subject: "Test Email".into(),
			text_body: "This is a test".into(),
			html_body: html.then(|| "<p>This is a test</p>".into()),
		}
	}

	#[test]
	fn test_build_message() {
		let smtp = enabled_smtp();
		assert!(build_message(&smtp, message(false)).is_ok());
		let email = build_message(&smtp, message(true)).unwrap();
		let raw = String::from_utf8(email.formatted()).unwrap();
		assert!(raw.contains("From: Metacat <catalog@example.com>"));
		assert!(raw.contains("multipart/alternative"));
	}

	#[test]
	fn test_build_message_rejects_bad_addresses() {
		let smtp = enabled_smtp();
		let mut msg = message(false);
		msg.to = "not an address".into();
		assert!(matches!(build_message(&smtp, msg), Err(Error::ValidationError(_))));

		let smtp = SmtpSettings { sender_mail: None, ..enabled_smtp() };
		assert!(matches!(build_message(&smtp, message(false)), Err(Error::ConfigError(_))));
	}

	#[test]
	fn test_transport_requires_endpoint() {
		let smtp = SmtpSettings { server_endpoint: None, ..enabled_smtp() };
		assert!(matches!(build_transport(&smtp), Err(Error::ConfigError(_))));

		for strategy in
			[TransportationStrategy::Smtp, TransportationStrategy::Smtps, TransportationStrategy::SmtpTls]
		{
			let smtp = SmtpSettings { transportation_strategy: strategy, ..enabled_smtp() };
			assert!(build_transport(&smtp).is_ok());
		}
	}

	#[test]
	fn test_default_ports() {
		assert_eq!(default_port(TransportationStrategy::Smtp), 25);
		assert_eq!(default_port(TransportationStrategy::Smtps), 465);
		assert_eq!(default_port(TransportationStrategy::SmtpTls), 587);
	}
}

// vim: ts=4
