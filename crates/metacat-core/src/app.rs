//! App state type

use std::path::Path;
use std::sync::Arc;

use metacat_types::settings_adapter::SettingsAdapter;

use crate::extensions::Extensions;
use crate::prelude::*;
use crate::settings::service::SettingsStore;
use crate::settings::types::FrozenSettingsRegistry;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct AppState {
	pub opts: AppBuilderOpts,

	pub settings_adapter: Arc<dyn SettingsAdapter>,

	// Settings subsystem
	pub settings: Arc<SettingsStore>,
	pub settings_registry: Arc<FrozenSettingsRegistry>,

	// Type-erased extension map for feature-specific state
	pub extensions: Extensions,
}

impl AppState {
	/// Get a registered extension by type. Returns error if not found.
	pub fn ext<T: Send + Sync + 'static>(&self) -> ClResult<&T> {
		self.extensions.get::<T>().ok_or_else(|| {
			Error::Internal(format!("Extension {} not registered", std::any::type_name::<T>()))
		})
	}
}

pub type App = Arc<AppState>;

/// Runtime options, without secret material
#[derive(Debug, Clone)]
pub struct AppBuilderOpts {
	pub listen: Box<str>,
	pub cache_size: usize,
	/// Read-merge-write attempts per settings write
	pub max_retries: u32,
	/// Disable the settings cache (for multi-instance deployments without coordination)
	pub disable_cache: bool,
	pub search_settings_path: Option<Box<Path>>,
}

impl Default for AppBuilderOpts {
	fn default() -> Self {
		Self {
			listen: "127.0.0.1:8080".into(),
			cache_size: 64,
			max_retries: 8,
			disable_cache: false,
			search_settings_path: None,
		}
	}
}

// vim: ts=4
