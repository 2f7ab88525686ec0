//! Field policy merge
//!
//! Merges an incoming (possibly partial) settings document over the stored one:
//! - Objects are merged key by key, keys absent from the update keep their value
//! - `Restricted` paths always keep the stored value
//! - `Replace` paths take the incoming value wholesale
//! - `KeyedList` paths match list elements by a key field; stored elements
//!   are never dropped, new ones are appended
//! - Everything else (scalars, plain lists) is replaced by the incoming value
//!
//! Paths are dotted; list elements are addressed with a `[]` suffix, e.g.
//! `assetTypeConfigurations[].fields`.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::prelude::*;

/// Merge rule for one field path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRule {
	Restricted,
	Replace,
	KeyedList(Box<str>),
}

#[derive(Debug, Clone, Default)]
pub struct FieldPolicy {
	rules: BTreeMap<Box<str>, FieldRule>,
}

impl FieldPolicy {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, path: &str, rule: FieldRule) {
		self.rules.insert(path.into(), rule);
	}

	pub fn with_rule(mut self, path: &str, rule: FieldRule) -> Self {
		self.insert(path, rule);
		self
	}

	pub fn rule(&self, path: &str) -> Option<&FieldRule> {
		self.rules.get(path)
	}

	pub fn entries(&self) -> impl Iterator<Item = (&str, &FieldRule)> {
		self.rules.iter().map(|(path, rule)| (path.as_ref(), rule))
	}

	/// Whether `path` or one of its ancestors is restricted
	pub fn is_restricted(&self, path: &str) -> bool {
		let mut end = 0;
		for seg in path.split('.') {
			end += seg.len();
			if let Some(FieldRule::Restricted) = self.rules.get(&path[..end]) {
				return true;
			}
			end += 1;
		}
		false
	}

	/// Merge `incoming` over `base`
	///
	/// Fails if an incoming keyed list names the same key twice.
	pub fn merge(&self, base: &Value, incoming: &Value) -> ClResult<Value> {
		Ok(self.merge_at("", Some(base), Some(incoming))?.unwrap_or(Value::Null))
	}

	fn merge_at(
		&self,
		path: &str,
		base: Option<&Value>,
		incoming: Option<&Value>,
	) -> ClResult<Option<Value>> {
		match self.rules.get(path) {
			Some(FieldRule::Restricted) => return Ok(base.cloned()),
			Some(FieldRule::Replace) => return Ok(incoming.or(base).cloned()),
			Some(FieldRule::KeyedList(key)) => {
				if let Some(Value::Array(incoming)) = incoming {
					check_unique_keys(path, key, incoming)?;
				}
				if let (Some(Value::Array(base)), Some(Value::Array(incoming))) = (base, incoming) {
					return Ok(Some(self.merge_keyed(path, key, base, incoming)?));
				}
			}
			None => {}
		}

		Ok(match (base, incoming) {
			(Some(Value::Object(base)), Some(Value::Object(incoming))) => {
				Some(Value::Object(self.merge_objects(path, base, incoming)?))
			}
			// Nothing stored here yet: still strip restricted descendants
			(None, Some(Value::Object(incoming))) => {
				Some(Value::Object(self.merge_objects(path, &Map::new(), incoming)?))
			}
			(_, Some(incoming)) => Some(incoming.clone()),
			(base, None) => base.cloned(),
		})
	}

	fn merge_objects(
		&self,
		path: &str,
		base: &Map<String, Value>,
		incoming: &Map<String, Value>,
	) -> ClResult<Map<String, Value>> {
		let mut merged = Map::new();
		for (key, base_value) in base {
			if let Some(value) =
				self.merge_at(&child_path(path, key), Some(base_value), incoming.get(key))?
			{
				merged.insert(key.clone(), value);
			}
		}
		for (key, incoming_value) in incoming {
			if base.contains_key(key) {
				continue;
			}
			if let Some(value) = self.merge_at(&child_path(path, key), None, Some(incoming_value))? {
				merged.insert(key.clone(), value);
			}
		}
		Ok(merged)
	}

	fn merge_keyed(
		&self,
		path: &str,
		key: &str,
		base: &[Value],
		incoming: &[Value],
	) -> ClResult<Value> {
		let item_path = format!("{}[]", path);
		let mut merged = Vec::with_capacity(base.len().max(incoming.len()));

		for base_item in base {
			let update = base_item
				.get(key)
				.and_then(|id| incoming.iter().find(|item| item.get(key) == Some(id)));
			merged.push(
				self.merge_at(&item_path, Some(base_item), update)?
					.unwrap_or_else(|| base_item.clone()),
			);
		}
		for item in incoming {
			let known = item
				.get(key)
				.is_some_and(|id| base.iter().any(|base_item| base_item.get(key) == Some(id)));
			if known {
				continue;
			}
			if let Some(value) = self.merge_at(&item_path, None, Some(item))? {
				merged.push(value);
			}
		}
		Ok(Value::Array(merged))
	}
}

fn check_unique_keys(path: &str, key: &str, items: &[Value]) -> ClResult<()> {
	for (idx, item) in items.iter().enumerate() {
		let Some(id) = item.get(key) else {
			continue;
		};
		if items[..idx].iter().any(|prev| prev.get(key) == Some(id)) {
			return Err(Error::ValidationError(format!("{}: duplicate {} {}", path, key, id)));
		}
	}
	Ok(())
}

fn child_path(path: &str, key: &str) -> String {
	if path.is_empty() { key.to_string() } else { format!("{}.{}", path, key) }
}


// vim: ts=4
