//! UI branding and theme preference

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogoConfiguration {
	pub custom_logo_url_path: String,
	pub custom_monogram_url_path: String,
	pub custom_favicon_url_path: String,
}

/// Theme colors, empty means "use the built-in color"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomTheme {
	pub primary_color: String,
	pub success_color: String,
	pub error_color: String,
	pub warning_color: String,
	pub info_color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiThemePreference {
	pub custom_logo_config: LogoConfiguration,
	pub custom_theme: CustomTheme,
}

// vim: ts=4
