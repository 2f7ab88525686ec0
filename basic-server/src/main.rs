use std::{env, path::PathBuf, sync::Arc};

use metacat::prelude::*;
use metacat::settings::documents::{SmtpSettings, TransportationStrategy};
use metacat_settings_adapter_sqlite::SettingsAdapterSqlite;

pub struct Config {
	pub db_dir: PathBuf,
	pub listen: String,
	/// Comma separated, the first key is the primary
	pub secret_keys: Vec<String>,
	pub search_settings_path: Option<PathBuf>,
	pub disable_cache: bool,
	pub smtp: Option<SmtpSettings>,
}

impl Config {
	fn from_env() -> ClResult<Self> {
		let Ok(secret_keys) = env::var("METACAT_SECRET_KEYS") else {
			return Err(Error::ConfigError("METACAT_SECRET_KEYS is not set".into()));
		};
		Ok(Config {
			db_dir: PathBuf::from(env::var("DB_DIR").unwrap_or("./data".to_string())),
			listen: env::var("LISTEN").unwrap_or("127.0.0.1:8080".to_string()),
			secret_keys: secret_keys
				.split(',')
				.map(str::trim)
				.filter(|key| !key.is_empty())
				.map(String::from)
				.collect(),
			search_settings_path: env::var("SEARCH_SETTINGS_PATH").ok().map(PathBuf::from),
			disable_cache: env_flag("DISABLE_CACHE"),
			smtp: smtp_from_env()?,
		})
	}
}

fn env_flag(name: &str) -> bool {
	env::var(name).is_ok_and(|value| matches!(value.as_str(), "1" | "true" | "yes"))
}

/// Bootstrap SMTP configuration, only when SMTP_HOST is set
fn smtp_from_env() -> ClResult<Option<SmtpSettings>> {
	let Ok(server_endpoint) = env::var("SMTP_HOST") else {
		return Ok(None);
	};
	let server_port = env::var("SMTP_PORT")
		.ok()
		.map(|port| {
			port.parse::<u16>()
				.map_err(|_| Error::ConfigError(format!("invalid SMTP_PORT '{}'", port)))
		})
		.transpose()?;
	let transportation_strategy = match env::var("SMTP_STRATEGY") {
		Ok(strategy) => serde_json::from_value::<TransportationStrategy>(strategy.clone().into())
			.map_err(|_| Error::ConfigError(format!("invalid SMTP_STRATEGY '{}'", strategy)))?,
		Err(_) => TransportationStrategy::default(),
	};

	Ok(Some(SmtpSettings {
		enable_smtp_server: true,
		server_endpoint: Some(server_endpoint),
		server_port,
		username: env::var("SMTP_USERNAME").ok(),
		password: env::var("SMTP_PASSWORD").ok(),
		sender_mail: env::var("SMTP_SENDER").ok(),
		catalog_url: env::var("CATALOG_URL").ok(),
		transportation_strategy,
		..SmtpSettings::default()
	}))
}

#[tokio::main]
async fn main() -> ClResult<()> {
	let mut builder = metacat::AppBuilder::new();

	let config = Config::from_env().map_err(|e| {
		error!("FATAL: {}", e);
		e
	})?;
	let settings_adapter = Arc::new(SettingsAdapterSqlite::new(&config.db_dir).await?);

	builder
		.listen(config.listen)
		.secret_keys(config.secret_keys)
		.disable_cache(config.disable_cache)
		.settings_adapter(settings_adapter);
	if let Some(path) = config.search_settings_path {
		builder.search_settings_path(path);
	}
	if let Some(smtp) = config.smtp {
		builder.smtp(smtp);
	}

	builder.run().await
}

// vim: ts=4
