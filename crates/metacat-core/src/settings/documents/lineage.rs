//! Lineage graph defaults

use serde::{Deserialize, Serialize};

/// Layer the lineage view opens with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineageLayer {
	#[default]
	EntityLineage,
	ColumnLevelLineage,
	DataObservability,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LineageSettings {
	pub upstream_depth: u32,
	pub downstream_depth: u32,
	pub lineage_layer: LineageLayer,
}

impl Default for LineageSettings {
	fn default() -> Self {
		Self { upstream_depth: 2, downstream_depth: 2, lineage_layer: LineageLayer::EntityLineage }
	}
}

// vim: ts=4
