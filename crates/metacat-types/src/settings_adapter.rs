//! Settings storage adapter
//!
//! A settings adapter persists one JSON document per settings key. Every row
//! carries a version number so that callers can do optimistic
//! read-modify-write cycles: `write_setting` only succeeds if the row is still
//! at the version the caller read (or still absent).

use async_trait::async_trait;
use std::fmt::Debug;

use crate::prelude::*;

/// A persisted settings row
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSetting {
	pub key: Box<str>,
	pub value: serde_json::Value,
	/// Starts at 1 on insert, incremented on every write
	pub version: u64,
	pub updated_at: Timestamp,
}

/// Result of a conditional write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
	Written { version: u64, updated_at: Timestamp },
	/// The row changed (or appeared) since it was read
	Conflict,
}

#[async_trait]
pub trait SettingsAdapter: Debug + Send + Sync {
	/// Read a single settings row by key
	async fn read_setting(&self, key: &str) -> ClResult<Option<StoredSetting>>;

	/// List all stored settings rows
	async fn list_settings(&self) -> ClResult<Vec<StoredSetting>>;

	/// Write a settings row
	///
	/// `expected_version` of `None` means "insert only if the row does not exist",
	/// `Some(v)` means "update only if the row is at version `v`".
	async fn write_setting(
		&self,
		key: &str,
		value: &serde_json::Value,
		expected_version: Option<u64>,
	) -> ClResult<WriteOutcome>;
}

// vim: ts=4
