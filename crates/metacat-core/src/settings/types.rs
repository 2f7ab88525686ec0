//! Settings types and definitions
//!
//! Every settings type is registered once with a definition that carries its
//! field policy, its secret fields and a constructor for its default value.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::str::FromStr;

use crate::prelude::*;

use super::defaults::BootstrapData;
use super::documents::SettingValue;
use super::policy::{FieldPolicy, FieldRule};

/// Type alias for setting validator function
pub type SettingValidator = fn(&SettingValue) -> ClResult<()>;

/// Type alias for the default value constructor
pub type DefaultFn = fn(&BootstrapData) -> SettingValue;

/// Settings type identifier
///
/// The serialized (camelCase) form is the stable storage key and the
/// `configType` value on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SettingsType {
	EmailConfiguration,
	CustomUiThemePreference,
	LoginConfiguration,
	SearchSettings,
	AssetCertificationSettings,
	LineageSettings,
	ProfilerConfiguration,
}

impl SettingsType {
	pub const ALL: [SettingsType; 7] = [
		SettingsType::EmailConfiguration,
		SettingsType::CustomUiThemePreference,
		SettingsType::LoginConfiguration,
		SettingsType::SearchSettings,
		SettingsType::AssetCertificationSettings,
		SettingsType::LineageSettings,
		SettingsType::ProfilerConfiguration,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			SettingsType::EmailConfiguration => "emailConfiguration",
			SettingsType::CustomUiThemePreference => "customUiThemePreference",
			SettingsType::LoginConfiguration => "loginConfiguration",
			SettingsType::SearchSettings => "searchSettings",
			SettingsType::AssetCertificationSettings => "assetCertificationSettings",
			SettingsType::LineageSettings => "lineageSettings",
			SettingsType::ProfilerConfiguration => "profilerConfiguration",
		}
	}
}

impl std::fmt::Display for SettingsType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for SettingsType {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		SettingsType::ALL
			.into_iter()
			.find(|typ| typ.as_str() == s)
			.ok_or_else(|| Error::UnknownType(s.to_string()))
	}
}

/// Setting definition - defines metadata for each settings type
#[derive(Clone)]
pub struct SettingDefinition {
	pub typ: SettingsType,

	/// Human-readable description
	pub description: String,

	/// Which fields callers may change and how lists are merged
	pub policy: FieldPolicy,

	/// Dotted paths of string fields that are stored as secret tokens
	pub secret_fields: Vec<Box<str>>,

	default_fn: DefaultFn,
	validator: Option<SettingValidator>,
}

impl Debug for SettingDefinition {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SettingDefinition")
			.field("typ", &self.typ)
			.field("description", &self.description)
			.field("policy", &self.policy)
			.field("secret_fields", &self.secret_fields)
			.field("validator", &self.validator.is_some())
			.finish_non_exhaustive()
	}
}

impl SettingDefinition {
	/// Create a builder for constructing a SettingDefinition
	pub fn builder(typ: SettingsType) -> SettingDefinitionBuilder {
		SettingDefinitionBuilder::new(typ)
	}

	/// Build the default value from bootstrap data
	pub fn default_value(&self, bootstrap: &BootstrapData) -> SettingValue {
		(self.default_fn)(bootstrap)
	}

	/// Run the type-specific validator, if any
	pub fn validate(&self, value: &SettingValue) -> ClResult<()> {
		if value.typ() != self.typ {
			return Err(Error::ValidationError(format!(
				"Expected '{}' value, got '{}'",
				self.typ,
				value.typ()
			)));
		}
		match self.validator {
			Some(validator) => validator(value),
			None => Ok(()),
		}
	}
}

/// Builder for SettingDefinition with fluent API
pub struct SettingDefinitionBuilder {
	typ: SettingsType,
	description: Option<String>,
	default_fn: Option<DefaultFn>,
	policy: FieldPolicy,
	secret_fields: Vec<Box<str>>,
	validator: Option<SettingValidator>,
}

impl SettingDefinitionBuilder {
	pub fn new(typ: SettingsType) -> Self {
		Self {
			typ,
			description: None,
			default_fn: None,
			policy: FieldPolicy::new(),
			secret_fields: Vec::new(),
			validator: None,
		}
	}

	/// Set the description (required)
	pub fn description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());
		self
	}

	/// Set the default value constructor (required)
	pub fn default_fn(mut self, default_fn: DefaultFn) -> Self {
		self.default_fn = Some(default_fn);
		self
	}

	/// Callers can never change this subtree
	pub fn restricted(mut self, path: &str) -> Self {
		self.policy.insert(path, FieldRule::Restricted);
		self
	}

	/// Incoming value replaces this subtree wholesale
	pub fn replace(mut self, path: &str) -> Self {
		self.policy.insert(path, FieldRule::Replace);
		self
	}

	/// List elements are matched by `key`; stored elements are never dropped
	pub fn keyed_list(mut self, path: &str, key: &str) -> Self {
		self.policy.insert(path, FieldRule::KeyedList(key.into()));
		self
	}

	/// String field encrypted at rest
	pub fn secret(mut self, path: &str) -> Self {
		self.secret_fields.push(path.into());
		self
	}

	/// Set a validation function
	pub fn validator(mut self, validator: SettingValidator) -> Self {
		self.validator = Some(validator);
		self
	}

	/// Build the SettingDefinition
	pub fn build(self) -> ClResult<SettingDefinition> {
		let description = self.description.ok_or_else(|| {
			Error::ConfigError(format!("Settings '{}' needs a description", self.typ))
		})?;
		let default_fn = self.default_fn.ok_or_else(|| {
			Error::ConfigError(format!("Settings '{}' needs a default value", self.typ))
		})?;

		if let Some((path, _)) = self.policy.entries().find(|(path, _)| !is_valid_path(path)) {
			return Err(Error::ConfigError(format!(
				"Settings '{}' has an invalid policy path '{}'",
				self.typ, path
			)));
		}
		for path in &self.secret_fields {
			if !is_valid_path(path) || path.contains("[]") {
				return Err(Error::ConfigError(format!(
					"Settings '{}' has an invalid secret path '{}'",
					self.typ, path
				)));
			}
			if self.policy.is_restricted(path) {
				warn!("Secret field '{}' of '{}' is restricted and can only hold its default", path, self.typ);
			}
		}

		Ok(SettingDefinition {
			typ: self.typ,
			description,
			policy: self.policy,
			secret_fields: self.secret_fields,
			default_fn,
			validator: self.validator,
		})
	}
}

fn is_valid_path(path: &str) -> bool {
	!path.is_empty()
		&& path.split('.').all(|seg| {
			let name = seg.strip_suffix("[]").unwrap_or(seg);
			!name.is_empty() && !name.contains('[') && !name.contains(']')
		})
}

/// Runtime setting instance
#[derive(Debug, Clone, PartialEq)]
pub struct Setting {
	pub value: SettingValue,
	/// Row version, 0 if nothing is stored yet
	pub version: u64,
	pub last_modified: Option<Timestamp>,
}

impl Setting {
	pub fn typ(&self) -> SettingsType {
		self.value.typ()
	}
}

/// Mutable registry used during app initialization
pub struct SettingsRegistry {
	definitions: BTreeMap<SettingsType, SettingDefinition>,
}

impl SettingsRegistry {
	pub fn new() -> Self {
		Self { definitions: BTreeMap::new() }
	}

	/// Register a new setting definition
	pub fn register(&mut self, def: SettingDefinition) -> ClResult<()> {
		if self.definitions.contains_key(&def.typ) {
			return Err(Error::ConfigError(format!("Settings '{}' is already registered", def.typ)));
		}

		debug!("Registering settings type: {}", def.typ);
		self.definitions.insert(def.typ, def);
		Ok(())
	}

	/// Freeze the registry (make it immutable)
	pub fn freeze(self) -> FrozenSettingsRegistry {
		info!("Freezing settings registry with {} definitions", self.definitions.len());
		FrozenSettingsRegistry { definitions: self.definitions }
	}

	/// Get number of registered settings types
	pub fn len(&self) -> usize {
		self.definitions.len()
	}

	/// Check if registry is empty
	pub fn is_empty(&self) -> bool {
		self.definitions.is_empty()
	}
}

impl Default for SettingsRegistry {
	fn default() -> Self {
		Self::new()
	}
}

/// Immutable registry stored in AppState
#[derive(Debug)]
pub struct FrozenSettingsRegistry {
	definitions: BTreeMap<SettingsType, SettingDefinition>,
}

impl FrozenSettingsRegistry {
	pub fn get(&self, typ: SettingsType) -> Option<&SettingDefinition> {
		self.definitions.get(&typ)
	}

	/// Like `get`, but an unregistered type is an error
	pub fn lookup(&self, typ: SettingsType) -> ClResult<&SettingDefinition> {
		self.definitions.get(&typ).ok_or_else(|| Error::UnknownType(typ.to_string()))
	}

	/// List all registered settings in declaration order
	pub fn list(&self) -> impl Iterator<Item = &SettingDefinition> {
		self.definitions.values()
	}

	/// Get number of registered settings types
	pub fn len(&self) -> usize {
		self.definitions.len()
	}

	/// Check if registry is empty
	pub fn is_empty(&self) -> bool {
		self.definitions.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::settings::documents::LineageSettings;

	fn lineage_default(_: &BootstrapData) -> SettingValue {
		SettingValue::LineageSettings(LineageSettings::default())
	}

	#[test]
	fn test_settings_type_round_trips_identifier() {
		for typ in SettingsType::ALL {
			assert_eq!(typ.as_str().parse::<SettingsType>().unwrap(), typ);
			assert_eq!(serde_json::to_value(typ).unwrap(), serde_json::json!(typ.as_str()));
		}
	}

	#[test]
	fn test_unknown_type_is_rejected() {
		let err = "bogusSettings".parse::<SettingsType>().unwrap_err();
		assert!(matches!(err, Error::UnknownType(ref name) if name == "bogusSettings"));
		// identifiers are case sensitive
		assert!("LoginConfiguration".parse::<SettingsType>().is_err());
	}

	#[test]
	fn test_builder_requires_description_and_default() {
		let res = SettingDefinition::builder(SettingsType::LineageSettings)
			.default_fn(lineage_default)
			.build();
		assert!(matches!(res, Err(Error::ConfigError(_))));

		let res = SettingDefinition::builder(SettingsType::LineageSettings)
			.description("Lineage")
			.build();
		assert!(matches!(res, Err(Error::ConfigError(_))));
	}

	#[test]
	fn test_builder_rejects_malformed_paths() {
		let res = SettingDefinition::builder(SettingsType::LineageSettings)
			.description("Lineage")
			.default_fn(lineage_default)
			.restricted("a..b")
			.build();
		assert!(matches!(res, Err(Error::ConfigError(_))));

		let res = SettingDefinition::builder(SettingsType::LineageSettings)
			.description("Lineage")
			.default_fn(lineage_default)
			.secret("items[].password")
			.build();
		assert!(matches!(res, Err(Error::ConfigError(_))));
	}

	#[test]
	fn test_duplicate_registration_fails() {
		let build = || {
			SettingDefinition::builder(SettingsType::LineageSettings)
				.description("Lineage")
				.default_fn(lineage_default)
				.build()
				.unwrap()
		};
		let mut registry = SettingsRegistry::new();
		registry.register(build()).unwrap();
		assert!(matches!(registry.register(build()), Err(Error::ConfigError(_))));

		let frozen = registry.freeze();
		assert_eq!(frozen.len(), 1);
		assert!(frozen.get(SettingsType::LineageSettings).is_some());
		assert!(matches!(
			frozen.lookup(SettingsType::SearchSettings),
			Err(Error::UnknownType(_))
		));
	}
}

// vim: ts=4
