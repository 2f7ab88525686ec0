//! Asset certification settings

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssetCertificationSettings {
	/// Classification whose tags count as certifications
	pub allowed_classification: String,
	/// ISO-8601 duration, e.g. `P30D`
	pub validity_period: String,
}

impl Default for AssetCertificationSettings {
	fn default() -> Self {
		Self {
			allowed_classification: "Certification".to_string(),
			validity_period: "P30D".to_string(),
		}
	}
}

impl AssetCertificationSettings {
	/// Loose ISO-8601 duration check (`P[nY][nM][nW][nD][T[nH][nM][nS]]`)
	pub fn has_valid_period(&self) -> bool {
		let Some(rest) = self.validity_period.strip_prefix('P') else {
			return false;
		};
		let (date, time) = match rest.split_once('T') {
			Some((date, time)) => (date, Some(time)),
			None => (rest, None),
		};
		if time == Some("") || (date.is_empty() && time.is_none()) {
			return false;
		}
		units_ok(date, &['Y', 'M', 'W', 'D']) && time.is_none_or(|t| units_ok(t, &['H', 'M', 'S']))
	}
}

fn units_ok(part: &str, units: &[char]) -> bool {
	let mut digits = 0;
	let mut next_unit = 0;
	for ch in part.chars() {
		if ch.is_ascii_digit() {
			digits += 1;
			continue;
		}
		if digits == 0 {
			return false;
		}
		match units[next_unit..].iter().position(|u| *u == ch) {
			Some(pos) => next_unit += pos + 1,
			None => return false,
		}
		digits = 0;
	}
	digits == 0
}


// vim: ts=4
