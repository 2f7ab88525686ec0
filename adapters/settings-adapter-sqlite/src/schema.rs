//! Database schema initialization

use sqlx::SqlitePool;

/// Initialize the database schema
pub(crate) async fn init_db(db: &SqlitePool) -> Result<(), sqlx::Error> {
	let mut tx = db.begin().await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS globals (
			key text NOT NULL,
			value text,
			PRIMARY KEY(key)
	)",
	)
	.execute(&mut *tx)
	.await?;

	// Settings
	//**********
	// One JSON document per settings type, versioned for compare-and-swap
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS settings (
		name text NOT NULL,
		value text NOT NULL,
		version integer NOT NULL DEFAULT 1,
		updated_at integer NOT NULL DEFAULT (unixepoch()),
		PRIMARY KEY(name)
	) WITHOUT ROWID",
	)
	.execute(&mut *tx)
	.await?;

	sqlx::query("INSERT OR IGNORE INTO globals (key, value) VALUES ('schema_version', '1')")
		.execute(&mut *tx)
		.await?;

	tx.commit().await?;

	Ok(())
}

// vim: ts=4
