//! Profiler metric configuration

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricType {
	ColumnCount,
	ColumnNames,
	RowCount,
	Count,
	CountInSet,
	DistinctCount,
	DistinctProportion,
	DuplicateCount,
	FirstQuartile,
	Histogram,
	InterQuartileRange,
	Max,
	MaxLength,
	Mean,
	Median,
	Min,
	MinLength,
	NonParametricSkew,
	NullCount,
	NullProportion,
	Stddev,
	Sum,
	System,
	ThirdQuartile,
	UniqueCount,
	UniqueProportion,
	ValuesCount,
}

/// Metrics to compute for columns of one data type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetricConfigurationDefinition {
	/// Column data type, e.g. `INT` or `VARCHAR`
	pub data_type: String,
	/// None computes every applicable metric
	pub metrics: Option<Vec<MetricType>>,
	pub disabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfilerConfiguration {
	pub metric_configuration: Vec<MetricConfigurationDefinition>,
}

impl ProfilerConfiguration {
	/// Metrics configured for `data_type`, None if the type is not configured or disabled
	pub fn metrics_for(&self, data_type: &str) -> Option<&MetricConfigurationDefinition> {
		self.metric_configuration
			.iter()
			.find(|conf| conf.data_type.eq_ignore_ascii_case(data_type))
			.filter(|conf| conf.disabled != Some(true))
	}
}


// vim: ts=4
