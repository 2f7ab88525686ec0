//! Search ranking settings
//!
//! The global section holds result limits plus the aggregation and highlight
//! lists the search backend is built against; callers cannot change the latter
//! two. Per-asset-type sections carry field boosts and scoring functions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Aggregation {
	pub name: String,
	#[serde(rename = "type")]
	pub kind: String,
	pub field: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GlobalSettings {
	pub max_aggregate_size: u32,
	pub max_result_hits: u32,
	pub max_analyzed_offset: u32,
	pub aggregations: Vec<Aggregation>,
	pub highlight_fields: Vec<String>,
}

impl Default for GlobalSettings {
	fn default() -> Self {
		Self {
			max_aggregate_size: 10_000,
			max_result_hits: 10_000,
			max_analyzed_offset: 1000,
			aggregations: Vec::new(),
			highlight_fields: Vec::new(),
		}
	}
}

/// How a numeric field value is transformed before it multiplies the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoostModifier {
	None,
	Log,
	Log1p,
	Log2p,
	Ln,
	Ln1p,
	Ln2p,
	Square,
	Sqrt,
	Reciprocal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldValueBoost {
	pub field: String,
	pub factor: f64,
	pub modifier: Option<BoostModifier>,
	/// Value used when a document lacks the field
	pub missing: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreMode {
	Multiply,
	#[default]
	Sum,
	Avg,
	First,
	Max,
	Min,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoostMode {
	#[default]
	Multiply,
	Replace,
	Sum,
	Avg,
	Max,
	Min,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssetTypeConfiguration {
	pub asset_type: String,
	/// Searchable field name -> query boost
	pub fields: BTreeMap<String, f64>,
	/// Fields of which at least one must match the query
	pub should_match: Vec<String>,
	pub highlight_fields: Vec<String>,
	pub aggregations: Vec<Aggregation>,
	pub boosts: Vec<FieldValueBoost>,
	pub score_mode: ScoreMode,
	pub boost_mode: BoostMode,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchSettings {
	pub enable_access_control: bool,
	pub global_settings: GlobalSettings,
	pub asset_type_configurations: Vec<AssetTypeConfiguration>,
	/// Used for asset types without their own configuration
	pub default_configuration: AssetTypeConfiguration,
}

impl SearchSettings {
	pub fn asset_type(&self, asset_type: &str) -> Option<&AssetTypeConfiguration> {
		self.asset_type_configurations.iter().find(|conf| conf.asset_type == asset_type)
	}

	/// Configuration for `asset_type`, falling back to the default configuration
	pub fn config_for(&self, asset_type: &str) -> &AssetTypeConfiguration {
		self.asset_type(asset_type).unwrap_or(&self.default_configuration)
	}

	/// Boost of `field` for `asset_type`, if the field is searchable
	pub fn field_boost(&self, asset_type: &str, field: &str) -> Option<f64> {
		self.config_for(asset_type).fields.get(field).copied()
	}
}


// vim: ts=4
