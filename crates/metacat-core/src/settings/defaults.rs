//! Default values for settings types

use std::path::Path;
use std::sync::Arc;

use crate::prelude::*;

use super::documents::{SearchSettings, SettingValue, SmtpSettings};
use super::types::{FrozenSettingsRegistry, SettingsType};

const BUILTIN_SEARCH_SETTINGS: &str = include_str!("../../data/search_settings.json");

/// Startup input the defaults are derived from
#[derive(Debug, Clone)]
pub struct BootstrapData {
	/// Operator supplied SMTP configuration
	pub smtp: SmtpSettings,
	pub search: SearchSettings,
}

impl BootstrapData {
	/// Built-in search configuration and SMTP disabled
	pub fn builtin() -> ClResult<Self> {
		Ok(Self { smtp: SmtpSettings::default(), search: builtin_search_settings()? })
	}

	pub fn with_smtp(mut self, smtp: SmtpSettings) -> Self {
		self.smtp = smtp;
		self
	}

	/// Replace the built-in search configuration with the contents of a JSON file
	pub fn with_search_settings_file(mut self, path: &Path) -> ClResult<Self> {
		let text = std::fs::read_to_string(path).map_err(|err| {
			Error::ConfigError(format!("cannot read search settings '{}': {}", path.display(), err))
		})?;
		self.search = parse_search_settings(&text)
			.map_err(|err| Error::ConfigError(format!("'{}': {}", path.display(), err)))?;
		info!("Loaded search settings from {}", path.display());
		Ok(self)
	}
}

pub fn builtin_search_settings() -> ClResult<SearchSettings> {
	parse_search_settings(BUILTIN_SEARCH_SETTINGS)
		.map_err(|err| Error::ConfigError(format!("built-in search settings: {}", err)))
}

fn parse_search_settings(text: &str) -> ClResult<SearchSettings> {
	let doc: serde_json::Value =
		serde_json::from_str(text).map_err(|err| Error::ValidationError(err.to_string()))?;
	match SettingValue::from_document(SettingsType::SearchSettings, doc)? {
		SettingValue::SearchSettings(search) => Ok(search),
		other => Err(Error::Internal(format!("expected search settings, got '{}'", other.typ()))),
	}
}

/// Produces the default value of every registered settings type
#[derive(Debug, Clone)]
pub struct DefaultsProvider {
	registry: Arc<FrozenSettingsRegistry>,
	bootstrap: Arc<BootstrapData>,
}

impl DefaultsProvider {
	/// Fails if a registered default does not pass its own validation
	pub fn new(registry: Arc<FrozenSettingsRegistry>, bootstrap: BootstrapData) -> ClResult<Self> {
		let provider = Self { registry, bootstrap: Arc::new(bootstrap) };
		for def in provider.registry.list() {
			let value = def.default_value(&provider.bootstrap);
			def.validate(&value).map_err(|err| {
				Error::ConfigError(format!("default of '{}' is invalid: {}", def.typ, err))
			})?;
		}
		Ok(provider)
	}

	pub fn default_for(&self, typ: SettingsType) -> ClResult<SettingValue> {
		let def = self.registry.lookup(typ)?;
		Ok(def.default_value(&self.bootstrap))
	}

	pub fn default_document(&self, typ: SettingsType) -> ClResult<serde_json::Value> {
		self.default_for(typ)?.to_document()
	}

	pub fn bootstrap(&self) -> &BootstrapData {
		&self.bootstrap
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::core_settings::register_settings;
	use crate::settings::SettingsRegistry;

	fn provider(bootstrap: BootstrapData) -> DefaultsProvider {
		let mut registry = SettingsRegistry::new();
		register_settings(&mut registry).unwrap();
		DefaultsProvider::new(Arc::new(registry.freeze()), bootstrap).unwrap()
	}

	#[test]
	fn test_builtin_search_settings_parse() {
		let search = builtin_search_settings().unwrap();
		assert!(!search.enable_access_control);
		assert_eq!(search.field_boost("table", "name"), Some(10.0));
		assert!(!search.global_settings.aggregations.is_empty());
		assert!(!search.global_settings.highlight_fields.is_empty());
	}

	#[test]
	fn test_defaults_are_deterministic() {
		let provider = provider(BootstrapData::builtin().unwrap());
		for typ in SettingsType::ALL {
			let first = provider.default_for(typ).unwrap();
			assert_eq!(first.typ(), typ);
			assert_eq!(first, provider.default_for(typ).unwrap());
		}
	}

	#[test]
	fn test_smtp_default_comes_from_bootstrap() {
		let smtp = SmtpSettings {
			enable_smtp_server: true,
			server_endpoint: Some("smtp.example.com".into()),
			server_port: Some(587),
			sender_mail: Some("catalog@example.com".into()),
			..Default::default()
		};
		let provider = provider(BootstrapData::builtin().unwrap().with_smtp(smtp.clone()));
		assert_eq!(
			provider.default_for(SettingsType::EmailConfiguration).unwrap(),
			SettingValue::EmailConfiguration(smtp)
		);
	}

	#[test]
	fn test_search_settings_file_override() {
		let dir = tempfile::TempDir::new().unwrap();
		let path = dir.path().join("search.json");
		std::fs::write(&path, r#"{ "enableAccessControl": true }"#).unwrap();

		let bootstrap = BootstrapData::builtin().unwrap().with_search_settings_file(&path).unwrap();
		assert!(bootstrap.search.enable_access_control);

		std::fs::write(&path, r#"{ "enableAccessControl": true, "bogus": 1 }"#).unwrap();
		let res = BootstrapData::builtin().unwrap().with_search_settings_file(&path);
		assert!(matches!(res, Err(Error::ConfigError(_))));

		std::fs::write(&path, "not json").unwrap();
		let res = BootstrapData::builtin().unwrap().with_search_settings_file(&path);
		assert!(matches!(res, Err(Error::ConfigError(_))));
	}
}

// vim: ts=4
