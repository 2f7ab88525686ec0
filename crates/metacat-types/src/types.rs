//! Common types used throughout Metacat.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

// Timestamp //
//***********//
/// Seconds since the Unix epoch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub i64);

impl std::fmt::Display for Timestamp {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl Serialize for Timestamp {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.serialize_i64(self.0)
	}
}

impl<'de> Deserialize<'de> for Timestamp {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		Ok(Timestamp(i64::deserialize(deserializer)?))
	}
}

impl Timestamp {
	pub fn now() -> Timestamp {
		now()
	}
}

pub fn now() -> Timestamp {
	let res = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default();
	Timestamp(i64::try_from(res.as_secs()).unwrap_or(i64::MAX))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_timestamp_serializes_as_number() {
		let ts = Timestamp(1_700_000_000);
		assert_eq!(serde_json::to_string(&ts).unwrap(), "1700000000");
		let back: Timestamp = serde_json::from_str("1700000000").unwrap();
		assert_eq!(back, ts);
	}

	#[test]
	fn test_now_is_monotonic_enough() {
		let a = now();
		let b = Timestamp::now();
		assert!(b >= a);
		assert!(a.0 > 0);
	}
}

// vim: ts=4
