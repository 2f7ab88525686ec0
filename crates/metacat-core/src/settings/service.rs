//! Settings store with caching, field policy merge and optimistic writes
//!
//! Every write is a read-merge-write cycle that is committed only if the row
//! is still at the version that was read. On conflict the whole cycle is
//! retried, so concurrent partial updates of one settings type all apply.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;

use metacat_types::settings_adapter::{SettingsAdapter, StoredSetting, WriteOutcome};

use crate::prelude::*;

use super::defaults::DefaultsProvider;
use super::documents::{SettingValue, SettingsDocument};
use super::secret::SecretCodec;
use super::types::{FrozenSettingsRegistry, Setting, SettingDefinition, SettingsType};

const DEFAULT_CACHE_SIZE: NonZeroUsize = match NonZeroUsize::new(64) {
	Some(size) => size,
	None => NonZeroUsize::MIN,
};

/// LRU cache for stored settings
pub struct SettingsCache {
	cache: Arc<parking_lot::RwLock<LruCache<SettingsType, Setting>>>,
}

impl SettingsCache {
	pub fn new(capacity: usize) -> Self {
		let capacity = NonZeroUsize::new(capacity).unwrap_or(DEFAULT_CACHE_SIZE);
		Self { cache: Arc::new(parking_lot::RwLock::new(LruCache::new(capacity))) }
	}

	pub fn get(&self, typ: SettingsType) -> Option<Setting> {
		let mut cache = self.cache.write();
		cache.get(&typ).cloned()
	}

	/// Store `setting` unless a newer version is already cached
	pub fn put(&self, setting: Setting) {
		let mut cache = self.cache.write();
		let typ = setting.typ();
		if cache.peek(&typ).is_some_and(|cached| cached.version > setting.version) {
			return;
		}
		cache.put(typ, setting);
	}

	pub fn invalidate(&self, typ: SettingsType) {
		let mut cache = self.cache.write();
		cache.pop(&typ);
	}
}

#[derive(Debug, Clone)]
pub struct SettingsStoreOpts {
	pub cache_size: usize,
	/// Attempts of one read-merge-write cycle before giving up
	pub max_retries: u32,
	pub disable_cache: bool,
}

impl Default for SettingsStoreOpts {
	fn default() -> Self {
		Self { cache_size: 64, max_retries: 8, disable_cache: false }
	}
}

/// Result of `SettingsStore::put`
#[derive(Debug, Clone)]
pub struct PutOutcome {
	pub setting: Setting,
	/// No row existed before this write
	pub inserted: bool,
}

/// Setting with its secret fields in plaintext
#[derive(Debug, Clone)]
pub struct DecryptedSetting {
	pub setting: Setting,
	/// Secret fields that could not be decrypted; they are null in `setting`
	pub failed_fields: Vec<Box<str>>,
}

/// Settings store - main interface for reading and changing settings
pub struct SettingsStore {
	registry: Arc<FrozenSettingsRegistry>,
	defaults: DefaultsProvider,
	codec: Arc<SecretCodec>,
	adapter: Arc<dyn SettingsAdapter>,
	cache: Option<SettingsCache>,
	max_retries: u32,
}

impl std::fmt::Debug for SettingsStore {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SettingsStore")
			.field("adapter", &self.adapter)
			.field("cache", &self.cache.is_some())
			.field("max_retries", &self.max_retries)
			.finish_non_exhaustive()
	}
}

impl SettingsStore {
	pub fn new(
		registry: Arc<FrozenSettingsRegistry>,
		defaults: DefaultsProvider,
		codec: Arc<SecretCodec>,
		adapter: Arc<dyn SettingsAdapter>,
		opts: SettingsStoreOpts,
	) -> Self {
		let cache = (!opts.disable_cache).then(|| SettingsCache::new(opts.cache_size));
		Self { registry, defaults, codec, adapter, cache, max_retries: opts.max_retries.max(1) }
	}

	pub fn registry(&self) -> &Arc<FrozenSettingsRegistry> {
		&self.registry
	}

	pub fn defaults(&self) -> &DefaultsProvider {
		&self.defaults
	}

	pub fn codec(&self) -> &SecretCodec {
		&self.codec
	}

	/// Current value of a settings type; the default if nothing is stored
	pub async fn get(&self, typ: SettingsType) -> ClResult<Setting> {
		let def = self.registry.lookup(typ)?;

		if let Some(setting) = self.cache.as_ref().and_then(|cache| cache.get(typ)) {
			debug!("Settings cache hit: {}", typ);
			return Ok(setting);
		}

		match self.adapter.read_setting(typ.as_str()).await? {
			Some(row) => {
				let setting = Self::setting_from_row(typ, row)?;
				self.cache_put(&setting);
				Ok(setting)
			}
			None => Ok(Setting { value: self.sealed_default(def)?, version: 0, last_modified: None }),
		}
	}

	/// Current value of every registered settings type
	pub async fn list(&self) -> ClResult<Vec<Setting>> {
		let mut settings = Vec::with_capacity(self.registry.len());
		for def in self.registry.list() {
			settings.push(self.get(def.typ).await?);
		}
		Ok(settings)
	}

	/// Apply a (partial) document to a settings type
	///
	/// Restricted fields keep their current value. Secret fields are sealed
	/// before anything is written.
	pub async fn put(&self, typ: SettingsType, candidate: serde_json::Value) -> ClResult<PutOutcome> {
		let def = self.registry.lookup(typ)?;
		if !candidate.is_object() {
			return Err(Error::ValidationError("configValue must be a JSON object".into()));
		}

		for attempt in 1..=self.max_retries {
			let current = self.adapter.read_setting(typ.as_str()).await?;
			let (base, expected) = match current {
				Some(row) => (SettingValue::from_stored(typ, row.value)?.to_document()?, Some(row.version)),
				None => (self.defaults.default_document(typ)?, None),
			};

			self.codec.check_tokens(&base, &candidate, &def.secret_fields)?;
			let mut merged = def.policy.merge(&base, &candidate)?;
			self.codec.seal_fields(&mut merged, &def.secret_fields)?;
			let value = SettingValue::from_document(typ, merged)?;
			def.validate(&value)?;

			if let Some(setting) = self.write(typ, &value, expected).await? {
				info!("Settings '{}' updated to version {}", typ, setting.version);
				return Ok(PutOutcome { setting, inserted: expected.is_none() });
			}
			debug!("Settings '{}' changed concurrently (attempt {}/{})", typ, attempt, self.max_retries);
		}

		warn!("Giving up on settings '{}' after {} conflicting writes", typ, self.max_retries);
		Err(Error::ConcurrentModification(typ.to_string()))
	}

	/// Overwrite a settings type with its default value
	pub async fn reset(&self, typ: SettingsType) -> ClResult<Setting> {
		let def = self.registry.lookup(typ)?;

		for attempt in 1..=self.max_retries {
			let expected = self.adapter.read_setting(typ.as_str()).await?.map(|row| row.version);
			let value = self.sealed_default(def)?;
			if let Some(setting) = self.write(typ, &value, expected).await? {
				info!("Settings '{}' reset to default", typ);
				return Ok(setting);
			}
			debug!("Settings '{}' changed concurrently (attempt {}/{})", typ, attempt, self.max_retries);
		}

		warn!("Giving up on resetting '{}' after {} conflicting writes", typ, self.max_retries);
		Err(Error::ConcurrentModification(typ.to_string()))
	}

	/// Like `get`, with secret fields decrypted
	///
	/// A secret that cannot be decrypted is nulled and reported in `failed_fields`.
	pub async fn decrypted_get(&self, typ: SettingsType) -> ClResult<DecryptedSetting> {
		let def = self.registry.lookup(typ)?;
		let setting = self.get(typ).await?;
		if def.secret_fields.is_empty() {
			return Ok(DecryptedSetting { setting, failed_fields: Vec::new() });
		}

		let mut doc = setting.value.to_document()?;
		let failed_fields = self.codec.open_fields(&mut doc, &def.secret_fields);
		for field in &failed_fields {
			warn!("Cannot decrypt secret field '{}' of '{}'", field, typ);
		}
		let value = SettingValue::from_stored(typ, doc)?;
		Ok(DecryptedSetting { setting: Setting { value, ..setting }, failed_fields })
	}

	/// Typed current value
	pub async fn get_document<T: SettingsDocument>(&self) -> ClResult<T> {
		let setting = self.get(T::TYPE).await?;
		T::from_setting_value(setting.value)
			.ok_or_else(|| Error::Internal(format!("settings '{}' have the wrong type", T::TYPE)))
	}

	/// Typed current value with secrets in plaintext; any undecryptable secret is an error
	pub async fn decrypted_document<T: SettingsDocument>(&self) -> ClResult<T> {
		let decrypted = self.decrypted_get(T::TYPE).await?;
		if !decrypted.failed_fields.is_empty() {
			return Err(Error::DecryptionError(format!(
				"{}: {}",
				T::TYPE,
				decrypted.failed_fields.join(", ")
			)));
		}
		T::from_setting_value(decrypted.setting.value)
			.ok_or_else(|| Error::Internal(format!("settings '{}' have the wrong type", T::TYPE)))
	}

	/// Insert the default of every settings type that has no stored row
	///
	/// Safe to run repeatedly and from several instances at once.
	pub async fn seed_defaults(&self) -> ClResult<usize> {
		let mut seeded = 0;
		for def in self.registry.list() {
			if self.adapter.read_setting(def.typ.as_str()).await?.is_some() {
				continue;
			}
			let value = self.sealed_default(def)?;
			if self.write(def.typ, &value, None).await?.is_some() {
				info!("Seeded default settings '{}'", def.typ);
				seeded += 1;
			} else {
				debug!("Settings '{}' were seeded concurrently", def.typ);
			}
		}
		Ok(seeded)
	}

	/// Re-seal stored secrets with the primary key
	///
	/// Returns the number of rows rewritten.
	pub async fn rotate_secrets(&self) -> ClResult<usize> {
		let mut rotated = 0;
		for def in self.registry.list().filter(|def| !def.secret_fields.is_empty()) {
			if self.rotate_row(def).await? {
				info!("Re-encrypted secrets of '{}'", def.typ);
				rotated += 1;
			}
		}
		Ok(rotated)
	}

	async fn rotate_row(&self, def: &SettingDefinition) -> ClResult<bool> {
		for _ in 0..self.max_retries {
			let Some(row) = self.adapter.read_setting(def.typ.as_str()).await? else {
				return Ok(false);
			};
			let mut doc = SettingValue::from_stored(def.typ, row.value)?.to_document()?;
			if !self.codec.rotate_fields(&mut doc, &def.secret_fields)? {
				return Ok(false);
			}
			let value = SettingValue::from_stored(def.typ, doc)?;
			if self.write(def.typ, &value, Some(row.version)).await?.is_some() {
				return Ok(true);
			}
		}
		Err(Error::ConcurrentModification(def.typ.to_string()))
	}

	fn sealed_default(&self, def: &SettingDefinition) -> ClResult<SettingValue> {
		let mut doc = self.defaults.default_document(def.typ)?;
		if !def.secret_fields.is_empty() {
			self.codec.seal_fields(&mut doc, &def.secret_fields)?;
		}
		SettingValue::from_stored(def.typ, doc)
	}

	/// Conditional write; None on version conflict
	async fn write(
		&self,
		typ: SettingsType,
		value: &SettingValue,
		expected_version: Option<u64>,
	) -> ClResult<Option<Setting>> {
		let doc = value.to_document()?;
		match self.adapter.write_setting(typ.as_str(), &doc, expected_version).await? {
			WriteOutcome::Written { version, updated_at } => {
				let setting = Setting { value: value.clone(), version, last_modified: Some(updated_at) };
				self.cache_put(&setting);
				Ok(Some(setting))
			}
			WriteOutcome::Conflict => {
				if let Some(cache) = &self.cache {
					cache.invalidate(typ);
				}
				Ok(None)
			}
		}
	}

	fn setting_from_row(typ: SettingsType, row: StoredSetting) -> ClResult<Setting> {
		Ok(Setting {
			value: SettingValue::from_stored(typ, row.value)?,
			version: row.version,
			last_modified: Some(row.updated_at),
		})
	}

	fn cache_put(&self, setting: &Setting) {
		if let Some(cache) = &self.cache {
			cache.put(setting.clone());
		}
	}
}


// vim: ts=4
