//! Built-in settings registration
//!
//! Registers every system settings type with its default, field policy and
//! secret fields.

use std::collections::HashSet;

use crate::prelude::*;
use crate::settings::{SettingDefinition, SettingValue, SettingsRegistry, SettingsType};

/// Register all core settings
pub fn register_settings(registry: &mut SettingsRegistry) -> ClResult<()> {
	registry.register(
		SettingDefinition::builder(SettingsType::EmailConfiguration)
			.description("Outbound email (SMTP) configuration")
			.default_fn(|bootstrap| SettingValue::EmailConfiguration(bootstrap.smtp.clone()))
			.secret("password")
			.validator(validate_email)
			.build()?,
	)?;

	registry.register(
		SettingDefinition::builder(SettingsType::CustomUiThemePreference)
			.description("Custom logo and theme colors of the web UI")
			.default_fn(|_| SettingValue::CustomUiThemePreference(Default::default()))
			.build()?,
	)?;

	registry.register(
		SettingDefinition::builder(SettingsType::LoginConfiguration)
			.description("Login lockout and token lifetime")
			.default_fn(|_| SettingValue::LoginConfiguration(Default::default()))
			.validator(validate_login)
			.build()?,
	)?;

	// Aggregations and highlight fields must match the search index mappings
	registry.register(
		SettingDefinition::builder(SettingsType::SearchSettings)
			.description("Search result limits and per asset type ranking")
			.default_fn(|bootstrap| SettingValue::SearchSettings(bootstrap.search.clone()))
			.restricted("globalSettings.aggregations")
			.restricted("globalSettings.highlightFields")
			.keyed_list("assetTypeConfigurations", "assetType")
			.replace("assetTypeConfigurations[].fields")
			.replace("defaultConfiguration.fields")
			.validator(validate_search)
			.build()?,
	)?;

	registry.register(
		SettingDefinition::builder(SettingsType::AssetCertificationSettings)
			.description("Classification used for asset certification and its validity")
			.default_fn(|_| SettingValue::AssetCertificationSettings(Default::default()))
			.validator(validate_certification)
			.build()?,
	)?;

	registry.register(
		SettingDefinition::builder(SettingsType::LineageSettings)
			.description("Default lineage depth and layer")
			.default_fn(|_| SettingValue::LineageSettings(Default::default()))
			.build()?,
	)?;

	registry.register(
		SettingDefinition::builder(SettingsType::ProfilerConfiguration)
			.description("Metrics computed by the profiler per data type")
			.default_fn(|_| SettingValue::ProfilerConfiguration(Default::default()))
			.validator(validate_profiler)
			.build()?,
	)?;

	Ok(())
}

fn validate_email(value: &SettingValue) -> ClResult<()> {
	if let SettingValue::EmailConfiguration(smtp) = value {
		if smtp.server_port == Some(0) {
			return Err(Error::ValidationError("serverPort must not be 0".into()));
		}
	}
	Ok(())
}

fn validate_login(value: &SettingValue) -> ClResult<()> {
	if let SettingValue::LoginConfiguration(login) = value {
		if login.max_login_fail_attempts == 0 {
			return Err(Error::ValidationError("maxLoginFailAttempts must be at least 1".into()));
		}
		if login.jwt_token_expiry_time == 0 {
			return Err(Error::ValidationError("jwtTokenExpiryTime must be positive".into()));
		}
	}
	Ok(())
}

fn validate_search(value: &SettingValue) -> ClResult<()> {
	let SettingValue::SearchSettings(search) = value else {
		return Ok(());
	};
	if search.global_settings.max_result_hits == 0 {
		return Err(Error::ValidationError("globalSettings.maxResultHits must be positive".into()));
	}

	let mut seen = HashSet::new();
	for conf in &search.asset_type_configurations {
		if conf.asset_type.is_empty() {
			return Err(Error::ValidationError("assetType must not be empty".into()));
		}
		if !seen.insert(conf.asset_type.as_str()) {
			return Err(Error::ValidationError(format!(
				"duplicate asset type configuration '{}'",
				conf.asset_type
			)));
		}
	}

	let configs =
		search.asset_type_configurations.iter().chain(std::iter::once(&search.default_configuration));
	for conf in configs {
		if let Some((field, _)) = conf.fields.iter().find(|(_, boost)| !boost.is_finite() || **boost < 0.0) {
			return Err(Error::ValidationError(format!(
				"boost of '{}.{}' must be a non-negative number",
				conf.asset_type, field
			)));
		}
		if let Some(boost) = conf.boosts.iter().find(|boost| !boost.factor.is_finite()) {
			return Err(Error::ValidationError(format!(
				"factor of '{}' boost on '{}' must be a number",
				conf.asset_type, boost.field
			)));
		}
	}
	Ok(())
}

fn validate_certification(value: &SettingValue) -> ClResult<()> {
	if let SettingValue::AssetCertificationSettings(cert) = value {
		if !cert.has_valid_period() {
			return Err(Error::ValidationError(format!(
				"validityPeriod '{}' is not an ISO-8601 duration",
				cert.validity_period
			)));
		}
	}
	Ok(())
}

fn validate_profiler(value: &SettingValue) -> ClResult<()> {
	if let SettingValue::ProfilerConfiguration(profiler) = value {
		let mut seen = HashSet::new();
		for conf in &profiler.metric_configuration {
			if conf.data_type.is_empty() {
				return Err(Error::ValidationError("dataType must not be empty".into()));
			}
			if !seen.insert(conf.data_type.to_ascii_uppercase()) {
				return Err(Error::ValidationError(format!(
					"duplicate metric configuration for '{}'",
					conf.data_type
				)));
			}
		}
	}
	Ok(())
}


// vim: ts=4
