//! Typed settings documents
//!
//! Each settings type has exactly one document struct. The structs double as
//! schema: decoding goes through serde, and any key that does not survive a
//! decode/encode round trip is reported as an unknown field.

mod certification;
mod email;
mod lineage;
mod login;
mod profiler;
mod search;
mod theme;

pub use certification::AssetCertificationSettings;
pub use email::{EmailTemplates, SmtpSettings, TransportationStrategy};
pub use lineage::{LineageLayer, LineageSettings};
pub use login::LoginConfiguration;
pub use profiler::{MetricConfigurationDefinition, MetricType, ProfilerConfiguration};
pub use search::{
	Aggregation, AssetTypeConfiguration, BoostMode, BoostModifier, FieldValueBoost, GlobalSettings,
	ScoreMode, SearchSettings,
};
pub use theme::{CustomTheme, LogoConfiguration, UiThemePreference};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::prelude::*;

use super::types::SettingsType;

/// A typed settings document bound to its settings type
pub trait SettingsDocument: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
	const TYPE: SettingsType;

	fn into_setting_value(self) -> SettingValue;
	fn from_setting_value(value: SettingValue) -> Option<Self>;
}

macro_rules! settings_documents {
	($($variant:ident => $doc:ty),* $(,)?) => {
		/// Setting value: one variant per settings type
		#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
		#[serde(tag = "configType", content = "configValue", rename_all = "camelCase")]
		pub enum SettingValue {
			$($variant($doc),)*
		}

		impl SettingValue {
			pub fn typ(&self) -> SettingsType {
				match self {
					$(SettingValue::$variant(_) => SettingsType::$variant,)*
				}
			}

			/// Strict decode: unknown fields and malformed values are rejected
			pub fn from_document(typ: SettingsType, doc: serde_json::Value) -> ClResult<Self> {
				match typ {
					$(SettingsType::$variant => Ok(SettingValue::$variant(decode_strict(doc)?)),)*
				}
			}

			/// Lenient decode for stored rows: fields dropped from the schema are ignored
			pub fn from_stored(typ: SettingsType, doc: serde_json::Value) -> ClResult<Self> {
				match typ {
					$(SettingsType::$variant => Ok(SettingValue::$variant(decode_stored(typ, doc)?)),)*
				}
			}

			pub fn to_document(&self) -> ClResult<serde_json::Value> {
				match self {
					$(SettingValue::$variant(doc) => Ok(serde_json::to_value(doc)?),)*
				}
			}
		}

		$(
			impl SettingsDocument for $doc {
				const TYPE: SettingsType = SettingsType::$variant;

				fn into_setting_value(self) -> SettingValue {
					SettingValue::$variant(self)
				}

				fn from_setting_value(value: SettingValue) -> Option<Self> {
					match value {
						SettingValue::$variant(doc) => Some(doc),
						_ => None,
					}
				}
			}

			impl From<$doc> for SettingValue {
				fn from(doc: $doc) -> Self {
					SettingValue::$variant(doc)
				}
			}
		)*
	};
}

settings_documents! {
	EmailConfiguration => SmtpSettings,
	CustomUiThemePreference => UiThemePreference,
	LoginConfiguration => LoginConfiguration,
	SearchSettings => SearchSettings,
	AssetCertificationSettings => AssetCertificationSettings,
	LineageSettings => LineageSettings,
	ProfilerConfiguration => ProfilerConfiguration,
}

fn decode_strict<T: Serialize + DeserializeOwned>(doc: serde_json::Value) -> ClResult<T> {
	let parsed: T = serde_json::from_value(doc.clone())
		.map_err(|err| Error::ValidationError(err.to_string()))?;
	let normalized = serde_json::to_value(&parsed)?;
	if let Some(path) = find_unknown_field(&doc, &normalized, "") {
		return Err(Error::UnknownField(path));
	}
	Ok(parsed)
}

fn decode_stored<T: DeserializeOwned>(typ: SettingsType, doc: serde_json::Value) -> ClResult<T> {
	serde_json::from_value(doc).map_err(|err| {
		warn!("Stored '{}' settings do not match the schema: {}", typ, err);
		Error::Internal(format!("stored '{}' settings are corrupt", typ))
	})
}

/// Dotted path of the first key in `original` that has no counterpart in `normalized`
fn find_unknown_field(
	original: &serde_json::Value,
	normalized: &serde_json::Value,
	path: &str,
) -> Option<String> {
	use serde_json::Value;

	match (original, normalized) {
		(Value::Object(orig), Value::Object(norm)) => orig.iter().find_map(|(key, value)| {
			let child = if path.is_empty() { key.clone() } else { format!("{}.{}", path, key) };
			match norm.get(key) {
				None => Some(child),
				Some(norm_value) => find_unknown_field(value, norm_value, &child),
			}
		}),
		(Value::Array(orig), Value::Array(norm)) => orig
			.iter()
			.zip(norm)
			.enumerate()
			.find_map(|(idx, (value, norm_value))| {
				find_unknown_field(value, norm_value, &format!("{}[{}]", path, idx))
			}),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_unknown_top_level_field() {
		let res = SettingValue::from_document(
			SettingsType::LoginConfiguration,
			json!({ "maxLoginFailAttempts": 5, "bogus": true }),
		);
		assert!(matches!(res, Err(Error::UnknownField(ref path)) if path == "bogus"));
	}

	#[test]
	fn test_unknown_nested_field_reports_path() {
		let res = SettingValue::from_document(
			SettingsType::SearchSettings,
			json!({ "globalSettings": { "bogusField": 1 } }),
		);
		assert!(matches!(res, Err(Error::UnknownField(ref path)) if path == "globalSettings.bogusField"));

		let res = SettingValue::from_document(
			SettingsType::SearchSettings,
			json!({ "assetTypeConfigurations": [
				{ "assetType": "table" },
				{ "assetType": "topic", "extra": "x" }
			]}),
		);
		assert!(
			matches!(res, Err(Error::UnknownField(ref path)) if path == "assetTypeConfigurations[1].extra")
		);
	}

	#[test]
	fn test_wrong_value_type_is_validation_error() {
		let res = SettingValue::from_document(
			SettingsType::LoginConfiguration,
			json!({ "maxLoginFailAttempts": "three" }),
		);
		assert!(matches!(res, Err(Error::ValidationError(_))));
	}

	#[test]
	fn test_missing_fields_take_defaults() {
		let value =
			SettingValue::from_document(SettingsType::LoginConfiguration, json!({})).unwrap();
		assert_eq!(value, SettingValue::LoginConfiguration(LoginConfiguration::default()));
	}

	#[test]
	fn test_stored_decode_ignores_dropped_fields() {
		let value = SettingValue::from_stored(
			SettingsType::LineageSettings,
			json!({ "upstreamDepth": 4, "retiredField": "x" }),
		)
		.unwrap();
		let SettingValue::LineageSettings(lineage) = value else { panic!("wrong variant") };
		assert_eq!(lineage.upstream_depth, 4);
	}

	#[test]
	fn test_wire_shape() {
		let value = SettingValue::from(AssetCertificationSettings::default());
		assert_eq!(
			serde_json::to_value(&value).unwrap(),
			json!({
				"configType": "assetCertificationSettings",
				"configValue": { "allowedClassification": "Certification", "validityPeriod": "P30D" }
			})
		);
	}

	#[test]
	fn test_document_trait_conversions() {
		let value = LoginConfiguration::default().into_setting_value();
		assert_eq!(value.typ(), LoginConfiguration::TYPE);
		assert!(LoginConfiguration::from_setting_value(value.clone()).is_some());
		assert!(LineageSettings::from_setting_value(value).is_none());
	}
}

// vim: ts=4
