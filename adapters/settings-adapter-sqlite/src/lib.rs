//! SQLite settings adapter

use async_trait::async_trait;
use sqlx::sqlite::{self, SqlitePool};
use std::path::Path;

use metacat_types::prelude::*;
use metacat_types::settings_adapter::{SettingsAdapter, StoredSetting, WriteOutcome};

mod schema;
mod setting;

use schema::init_db;

#[derive(Debug)]
pub struct SettingsAdapterSqlite {
	db: SqlitePool,
}

impl SettingsAdapterSqlite {
	/// Open (or create) the settings database in directory `path`
	pub async fn new(path: impl AsRef<Path>) -> ClResult<Self> {
		let dir = path.as_ref();
		tokio::fs::create_dir_all(dir).await?;

		let opts = sqlite::SqliteConnectOptions::new()
			.filename(dir.join("settings.db"))
			.create_if_missing(true)
			.journal_mode(sqlite::SqliteJournalMode::Wal);
		let db = sqlite::SqlitePoolOptions::new()
			.max_connections(5)
			.connect_with(opts)
			.await
			.inspect_err(|err| warn!("DB: {:#?}", err))
			.map_err(|_| Error::DbError)?;

		init_db(&db)
			.await
			.inspect_err(|err| warn!("DB: {:#?}", err))
			.map_err(|_| Error::DbError)?;

		info!("Settings database opened in {}", dir.display());
		Ok(Self { db })
	}
}

#[async_trait]
impl SettingsAdapter for SettingsAdapterSqlite {
	async fn read_setting(&self, key: &str) -> ClResult<Option<StoredSetting>> {
		setting::read(&self.db, key).await
	}

	async fn list_settings(&self) -> ClResult<Vec<StoredSetting>> {
		setting::list(&self.db).await
	}

	async fn write_setting(
		&self,
		key: &str,
		value: &serde_json::Value,
		expected_version: Option<u64>,
	) -> ClResult<WriteOutcome> {
		setting::write(&self.db, key, value, expected_version).await
	}
}

// vim: ts=4
