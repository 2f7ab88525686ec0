//! Versioned settings documents
//!
//! Writes are conditional on the version the caller read, so concurrent
//! read-modify-write cycles never overwrite each other silently.

use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use metacat_types::prelude::*;
use metacat_types::settings_adapter::{StoredSetting, WriteOutcome};

fn from_row(row: &SqliteRow) -> Result<StoredSetting, sqlx::Error> {
	let name: String = row.try_get("name")?;
	let value: String = row.try_get("value")?;
	let version: i64 = row.try_get("version")?;
	let updated_at: i64 = row.try_get("updated_at")?;

	let value = serde_json::from_str(&value)
		.map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
	let version = u64::try_from(version).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

	Ok(StoredSetting { key: name.into(), value, version, updated_at: Timestamp(updated_at) })
}

/// List all settings
pub(crate) async fn list(db: &SqlitePool) -> ClResult<Vec<StoredSetting>> {
	let rows = sqlx::query("SELECT name, value, version, updated_at FROM settings ORDER BY name")
		.fetch_all(db)
		.await
		.inspect_err(|err| warn!("DB: {:#?}", err))
		.map_err(|_| Error::DbError)?;

	rows.iter()
		.map(|row| from_row(row).inspect_err(|err| warn!("DB: {:#?}", err)).map_err(|_| Error::DbError))
		.collect()
}

/// Read a single setting by name
pub(crate) async fn read(db: &SqlitePool, name: &str) -> ClResult<Option<StoredSetting>> {
	let row = sqlx::query("SELECT name, value, version, updated_at FROM settings WHERE name = ?")
		.bind(name)
		.fetch_optional(db)
		.await
		.inspect_err(|err| warn!("DB: {:#?}", err))
		.map_err(|_| Error::DbError)?;

	row.as_ref()
		.map(from_row)
		.transpose()
		.inspect_err(|err| warn!("DB: {:#?}", err))
		.map_err(|_| Error::DbError)
}

/// Insert (expected_version = None) or update a setting if it is unchanged
pub(crate) async fn write(
	db: &SqlitePool,
	name: &str,
	value: &serde_json::Value,
	expected_version: Option<u64>,
) -> ClResult<WriteOutcome> {
	let value_str = value.to_string();
	let updated_at = now();

	let res = match expected_version {
		None => {
			sqlx::query(
				"INSERT INTO settings (name, value, version, updated_at) VALUES (?, ?, 1, ?)
				ON CONFLICT(name) DO NOTHING",
			)
			.bind(name)
			.bind(value_str)
			.bind(updated_at.0)
			.execute(db)
			.await
		}
		Some(version) => {
			let version = i64::try_from(version).map_err(|_| Error::DbError)?;
			sqlx::query(
				"UPDATE settings SET value = ?, version = version + 1, updated_at = ?
				WHERE name = ? AND version = ?",
			)
			.bind(value_str)
			.bind(updated_at.0)
			.bind(name)
			.bind(version)
			.execute(db)
			.await
		}
	}
	.inspect_err(|err| warn!("DB: {:#?}", err))
	.map_err(|_| Error::DbError)?;

	if res.rows_affected() == 0 {
		debug!("Settings '{}' write conflict (expected version {:?})", name, expected_version);
		return Ok(WriteOutcome::Conflict);
	}
	Ok(WriteOutcome::Written { version: expected_version.map_or(1, |v| v + 1), updated_at })
}

// vim: ts=4
