//! App builder - constructs and runs the Metacat settings service

use std::path::Path;
use std::sync::Arc;

use crate::prelude::*;
use crate::settings::documents::SmtpSettings;
use crate::settings::{
	BootstrapData, DefaultsProvider, SecretCodec, SettingsRegistry, SettingsStore,
	SettingsStoreOpts,
};
use crate::{routes, webserver};
pub use metacat_core::app::{App, AppBuilderOpts, AppState, VERSION};
use metacat_core::extensions::Extensions;
use metacat_email::EmailSender;
use metacat_types::settings_adapter::SettingsAdapter;

pub struct AppBuilder {
	opts: AppBuilderOpts,
	secret_keys: Vec<Box<str>>,
	smtp: Option<SmtpSettings>,
	settings_adapter: Option<Arc<dyn SettingsAdapter>>,
}

impl AppBuilder {
	pub fn new() -> Self {
		// A second builder in the same process keeps the first subscriber
		let _ = tracing_subscriber::fmt()
			.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
			.with_target(false)
			.try_init();
		AppBuilder {
			opts: AppBuilderOpts::default(),
			secret_keys: Vec::new(),
			smtp: None,
			settings_adapter: None,
		}
	}

	// Opts
	pub fn listen(&mut self, listen: impl Into<Box<str>>) -> &mut Self {
		self.opts.listen = listen.into();
		self
	}
	pub fn cache_size(&mut self, cache_size: usize) -> &mut Self {
		self.opts.cache_size = cache_size;
		self
	}
	pub fn max_retries(&mut self, max_retries: u32) -> &mut Self {
		self.opts.max_retries = max_retries;
		self
	}
	pub fn disable_cache(&mut self, disable: bool) -> &mut Self {
		self.opts.disable_cache = disable;
		self
	}
	pub fn search_settings_path(&mut self, path: impl Into<Box<Path>>) -> &mut Self {
		self.opts.search_settings_path = Some(path.into());
		self
	}

	/// Keys sealing secret settings fields. The first one encrypts, every one
	/// of them is tried when decrypting.
	pub fn secret_keys(&mut self, keys: impl IntoIterator<Item = impl Into<Box<str>>>) -> &mut Self {
		self.secret_keys = keys.into_iter().map(Into::into).collect();
		self
	}

	/// SMTP configuration used as the default of `emailConfiguration`
	pub fn smtp(&mut self, smtp: SmtpSettings) -> &mut Self {
		self.smtp = Some(smtp);
		self
	}

	// Adapters
	pub fn settings_adapter(&mut self, settings_adapter: Arc<dyn SettingsAdapter>) -> &mut Self {
		self.settings_adapter = Some(settings_adapter);
		self
	}

	/// Build the app state and bootstrap the settings rows
	pub async fn build(self) -> ClResult<App> {
		let Some(settings_adapter) = self.settings_adapter else {
			error!("FATAL: No settings adapter configured");
			return Err(Error::Internal("No settings adapter configured".to_string()));
		};
		let codec = SecretCodec::new(&self.secret_keys).map_err(|e| {
			error!("FATAL: Invalid secret keys: {}", e);
			e
		})?;

		// Initialize settings registry
		let mut settings_registry = SettingsRegistry::new();
		metacat_core::register_settings(&mut settings_registry)?;
		info!("Registered {} settings", settings_registry.len());
		let frozen_registry = Arc::new(settings_registry.freeze());

		let mut bootstrap = BootstrapData::builtin()?;
		if let Some(smtp) = self.smtp {
			bootstrap = bootstrap.with_smtp(smtp);
		}
		if let Some(path) = &self.opts.search_settings_path {
			bootstrap = bootstrap.with_search_settings_file(path).map_err(|e| {
				error!("FATAL: {}", e);
				e
			})?;
		}
		let defaults = DefaultsProvider::new(frozen_registry.clone(), bootstrap)?;

		let settings = Arc::new(SettingsStore::new(
			frozen_registry.clone(),
			defaults,
			Arc::new(codec),
			settings_adapter.clone(),
			SettingsStoreOpts {
				cache_size: self.opts.cache_size,
				max_retries: self.opts.max_retries,
				disable_cache: self.opts.disable_cache,
			},
		));

		let seeded = settings.seed_defaults().await.map_err(|e| {
			error!("FATAL: Seeding default settings failed: {}", e);
			e
		})?;
		info!("Seeded {} default settings", seeded);

		// Old keys are only kept for decryption, move everything to the primary
		if self.secret_keys.len() > 1 {
			match settings.rotate_secrets().await {
				Ok(rotated) => info!("Re-encrypted secrets of {} settings", rotated),
				Err(e) => warn!("Secret rotation failed: {}", e),
			}
		}

		let mut extensions = Extensions::new();
		extensions.insert(EmailSender::new(settings.clone()));

		Ok(Arc::new(AppState {
			opts: self.opts,
			settings_adapter,
			settings,
			settings_registry: frozen_registry,
			extensions,
		}))
	}

	pub async fn run(self) -> ClResult<()> {
		info!("  __  __      _                  _");
		info!(" |  \\/  | ___| |_ __ _  ___ __ _| |_");
		info!(" | |\\/| |/ _ \\ __/ _` |/ __/ _` | __|");
		info!(" | |  | |  __/ || (_| | (_| (_| | |_");
		info!(" |_|  |_|\\___|\\__\\__,_|\\___\\__,_|\\__|");
		info!("V{}", VERSION);
		info!("");

		let app = self.build().await?;
		let router = routes::init(app.clone());

		webserver::serve(&app.opts.listen, router).await
	}
}

impl Default for AppBuilder {
	fn default() -> Self {
		Self::new()
	}
}

// vim: ts=4
