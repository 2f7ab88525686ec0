//! Secret field encryption
//!
//! Secrets are sealed with AES-256-GCM under a random 96-bit nonce and stored
//! as `secret:v1:` followed by `base64(nonce || ciphertext || tag)`.
//!
//! More than one key may be configured. The first one (primary) seals new
//! secrets, all of them are tried when opening, so keys can be rotated without
//! losing stored secrets.

use aes_gcm::{
	aead::{Aead, AeadCore, KeyInit, OsRng},
	Aes256Gcm, Nonce,
};
use base64::{
	engine::general_purpose::{STANDARD, URL_SAFE},
	Engine,
};
use sha2::{Digest, Sha256};

use crate::prelude::*;

pub const TOKEN_PREFIX: &str = "secret:v1:";

const KEY_SIZE: usize = 32;
const NONCE_SIZE: usize = 12;
const TAG_SIZE: usize = 16;

#[derive(Clone)]
pub struct SecretCodec {
	ciphers: Vec<Aes256Gcm>,
}

impl std::fmt::Debug for SecretCodec {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SecretCodec").field("keys", &self.ciphers.len()).finish()
	}
}

impl SecretCodec {
	/// Create a codec from key material, primary key first
	///
	/// A key is either 32 bytes of base64 or a passphrase that is hashed with SHA-256.
	pub fn new<S: AsRef<str>>(keys: &[S]) -> ClResult<Self> {
		let mut ciphers = Vec::with_capacity(keys.len());
		for key in keys {
			let key = key.as_ref().trim();
			if key.is_empty() {
				return Err(Error::ConfigError("empty secret key".into()));
			}
			let cipher = Aes256Gcm::new_from_slice(&derive_key(key))
				.map_err(|_| Error::ConfigError("invalid secret key length".into()))?;
			ciphers.push(cipher);
		}
		if ciphers.is_empty() {
			return Err(Error::ConfigError("no secret key configured".into()));
		}
		Ok(Self { ciphers })
	}

	/// Parse a comma separated key list, e.g. from an environment variable
	pub fn from_config(keys: &str) -> ClResult<Self> {
		let keys: Vec<&str> = keys.split(',').map(str::trim).filter(|k| !k.is_empty()).collect();
		Self::new(&keys)
	}

	/// Whether `value` looks like a token produced by `encrypt`
	pub fn is_tokenized(value: &str) -> bool {
		decode_token(value).is_some()
	}

	/// Seal `plaintext` with the primary key. Tokens are returned unchanged.
	pub fn encrypt(&self, plaintext: &str) -> ClResult<String> {
		if Self::is_tokenized(plaintext) {
			return Ok(plaintext.to_string());
		}
		self.seal(plaintext)
	}

	pub fn decrypt(&self, token: &str) -> ClResult<String> {
		let payload = decode_token(token)
			.ok_or_else(|| Error::DecryptionError("value is not a secret token".into()))?;
		let (nonce, ciphertext) = payload.split_at(NONCE_SIZE);
		let nonce = Nonce::from_slice(nonce);

		let plaintext = self
			.ciphers
			.iter()
			.find_map(|cipher| cipher.decrypt(nonce, ciphertext).ok())
			.ok_or_else(|| Error::DecryptionError("no configured key opens the token".into()))?;
		String::from_utf8(plaintext)
			.map_err(|_| Error::DecryptionError("decrypted secret is not UTF-8".into()))
	}

	/// Decrypt tokens, pass anything else through
	pub fn decrypt_if_applies(&self, value: &str) -> ClResult<String> {
		if Self::is_tokenized(value) { self.decrypt(value) } else { Ok(value.to_string()) }
	}

	/// Re-seal a token with the primary key
	pub fn rotate(&self, token: &str) -> ClResult<String> {
		let plaintext = self.decrypt(token)?;
		self.seal(&plaintext)
	}

	/// Whether the primary key can open `token`
	pub fn is_primary(&self, token: &str) -> bool {
		let Some(payload) = decode_token(token) else {
			return false;
		};
		let (nonce, ciphertext) = payload.split_at(NONCE_SIZE);
		self.ciphers
			.first()
			.is_some_and(|cipher| cipher.decrypt(Nonce::from_slice(nonce), ciphertext).is_ok())
	}

	/// Encrypt every non-empty plaintext string at `paths` in a document
	pub fn seal_fields(&self, doc: &mut serde_json::Value, paths: &[Box<str>]) -> ClResult<()> {
		for path in paths {
			if let Some(serde_json::Value::String(value)) = field_mut(doc, path) {
				if !value.is_empty() && !Self::is_tokenized(value) {
					*value = self.seal(value)?;
				}
			}
		}
		Ok(())
	}

	/// Reject tokens at `paths` of `incoming` that no configured key opens
	///
	/// A token equal to the one already stored in `base` is accepted as is.
	pub fn check_tokens(
		&self,
		base: &serde_json::Value,
		incoming: &serde_json::Value,
		paths: &[Box<str>],
	) -> ClResult<()> {
		for path in paths {
			let Some(value) = field(incoming, path).and_then(serde_json::Value::as_str) else {
				continue;
			};
			if !Self::is_tokenized(value) || field(base, path).and_then(serde_json::Value::as_str) == Some(value) {
				continue;
			}
			if self.decrypt(value).is_err() {
				return Err(Error::ValidationError(format!(
					"{}: secret token cannot be decrypted, submit the plaintext instead",
					path
				)));
			}
		}
		Ok(())
	}

	/// Decrypt every token at `paths` in a document
	///
	/// Fields that fail to decrypt are set to null; their paths are returned.
	pub fn open_fields(&self, doc: &mut serde_json::Value, paths: &[Box<str>]) -> Vec<Box<str>> {
		let mut failed = Vec::new();
		for path in paths {
			let Some(field) = field_mut(doc, path) else {
				continue;
			};
			let result = match field.as_str() {
				Some(value) => self.decrypt_if_applies(value),
				None => continue,
			};
			match result {
				Ok(plaintext) => *field = serde_json::Value::String(plaintext),
				Err(err) => {
					debug!("Secret field '{}' could not be opened: {}", path, err);
					*field = serde_json::Value::Null;
					failed.push(path.clone());
				}
			}
		}
		failed
	}

	/// Re-seal tokens at `paths` that the primary key cannot open
	///
	/// Returns whether the document changed.
	pub fn rotate_fields(&self, doc: &mut serde_json::Value, paths: &[Box<str>]) -> ClResult<bool> {
		let mut changed = false;
		for path in paths {
			if let Some(serde_json::Value::String(value)) = field_mut(doc, path) {
				if value.is_empty() {
					continue;
				}
				if !Self::is_tokenized(value) {
					*value = self.seal(value)?;
					changed = true;
				} else if !self.is_primary(value) {
					*value = self.rotate(value)?;
					changed = true;
				}
			}
		}
		Ok(changed)
	}

	fn seal(&self, plaintext: &str) -> ClResult<String> {
		let cipher =
			self.ciphers.first().ok_or_else(|| Error::Internal("no secret key".into()))?;
		let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
		let ciphertext = cipher
			.encrypt(&nonce, plaintext.as_bytes())
			.map_err(|_| Error::Internal("secret encryption failed".into()))?;

		let mut payload = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
		payload.extend_from_slice(&nonce);
		payload.extend_from_slice(&ciphertext);
		Ok(format!("{}{}", TOKEN_PREFIX, STANDARD.encode(payload)))
	}
}

fn derive_key(key: &str) -> [u8; KEY_SIZE] {
	for engine in [&STANDARD, &URL_SAFE] {
		if let Ok(bytes) = engine.decode(key) {
			if let Ok(raw) = <[u8; KEY_SIZE]>::try_from(bytes.as_slice()) {
				return raw;
			}
		}
	}
	let mut hasher = Sha256::new();
	hasher.update(key.as_bytes());
	let mut raw = [0u8; KEY_SIZE];
	raw.copy_from_slice(&hasher.finalize());
	raw
}

fn decode_token(value: &str) -> Option<Vec<u8>> {
	let payload = STANDARD.decode(value.strip_prefix(TOKEN_PREFIX)?).ok()?;
	(payload.len() >= NONCE_SIZE + TAG_SIZE).then_some(payload)
}

fn field<'a>(doc: &'a serde_json::Value, path: &str) -> Option<&'a serde_json::Value> {
	path.split('.').try_fold(doc, |node, seg| node.get(seg))
}

fn field_mut<'a>(doc: &'a mut serde_json::Value, path: &str) -> Option<&'a mut serde_json::Value> {
	path.split('.').try_fold(doc, |node, seg| node.get_mut(seg))
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn codec() -> SecretCodec {
		SecretCodec::new(&["test passphrase"]).unwrap()
	}

	#[test]
	fn test_encrypt_decrypt() {
		let codec = codec();
		let token = codec.encrypt("hunter2").unwrap();
		assert!(token.starts_with(TOKEN_PREFIX));
		assert!(SecretCodec::is_tokenized(&token));
		assert_ne!(token, codec.encrypt("hunter2").unwrap());
		assert_eq!(codec.decrypt(&token).unwrap(), "hunter2");
	}

	#[test]
	fn test_encrypt_is_idempotent() {
		let codec = codec();
		let token = codec.encrypt("hunter2").unwrap();
		assert_eq!(codec.encrypt(&token).unwrap(), token);
	}

	#[test]
	fn test_check_tokens_rejects_foreign_tokens() {
		let codec = codec();
		let paths = [Box::<str>::from("password")];
		let own = codec.encrypt("hunter2").unwrap();
		let forged = format!("{}{}", TOKEN_PREFIX, STANDARD.encode([0u8; 40]));
		assert!(SecretCodec::is_tokenized(&forged));

		let base = json!({ "password": null });
		assert!(codec.check_tokens(&base, &json!({ "password": "plain" }), &paths).is_ok());
		assert!(codec.check_tokens(&base, &json!({ "password": own }), &paths).is_ok());
		assert!(codec.check_tokens(&base, &json!({}), &paths).is_ok());
		let res = codec.check_tokens(&base, &json!({ "password": forged }), &paths);
		assert!(matches!(res, Err(Error::ValidationError(_))));

		// already stored: an unchanged round-trip is accepted
		let base = json!({ "password": forged });
		assert!(codec.check_tokens(&base, &json!({ "password": forged }), &paths).is_ok());
	}

	#[test]
	fn test_decrypt_if_applies() {
		let codec = codec();
		assert_eq!(codec.decrypt_if_applies("plain").unwrap(), "plain");
		let token = codec.encrypt("sealed").unwrap();
		assert_eq!(codec.decrypt_if_applies(&token).unwrap(), "sealed");
	}

	#[test]
	fn test_corrupt_tokens() {
		let codec = codec();
		assert!(!SecretCodec::is_tokenized("secret:v1:"));
		assert!(!SecretCodec::is_tokenized("secret:v1:not base64!"));
		assert!(matches!(codec.decrypt("plain"), Err(Error::DecryptionError(_))));

		let token = codec.encrypt("hunter2").unwrap();
		let mut payload = STANDARD.decode(&token[TOKEN_PREFIX.len()..]).unwrap();
		let last = payload.len() - 1;
		payload[last] ^= 0x01;
		let tampered = format!("{}{}", TOKEN_PREFIX, STANDARD.encode(payload));
		assert!(SecretCodec::is_tokenized(&tampered));
		assert!(matches!(codec.decrypt(&tampered), Err(Error::DecryptionError(_))));
	}

	#[test]
	fn test_empty_key_is_config_error() {
		assert!(matches!(SecretCodec::new(&[""]), Err(Error::ConfigError(_))));
		assert!(matches!(SecretCodec::new::<&str>(&[]), Err(Error::ConfigError(_))));
		assert!(matches!(SecretCodec::from_config(" , "), Err(Error::ConfigError(_))));
	}

	#[test]
	fn test_raw_base64_key() {
		let key = STANDARD.encode([7u8; KEY_SIZE]);
		let codec = SecretCodec::new(&[key.as_str()]).unwrap();
		let token = codec.encrypt("x").unwrap();
		assert_eq!(codec.decrypt(&token).unwrap(), "x");
		// a passphrase with the same text is a different key
		assert!(codec.decrypt(&SecretCodec::new(&["other"]).unwrap().encrypt("x").unwrap()).is_err());
	}

	#[test]
	fn test_key_rotation() {
		let old = SecretCodec::new(&["old key"]).unwrap();
		let token = old.encrypt("hunter2").unwrap();

		let rotated = SecretCodec::from_config("new key, old key").unwrap();
		assert_eq!(rotated.decrypt(&token).unwrap(), "hunter2");
		assert!(!rotated.is_primary(&token));

		let new_token = rotated.rotate(&token).unwrap();
		assert!(rotated.is_primary(&new_token));
		assert!(old.decrypt(&new_token).is_err());
		assert_eq!(SecretCodec::new(&["new key"]).unwrap().decrypt(&new_token).unwrap(), "hunter2");
	}

	#[test]
	fn test_seal_and_open_fields() {
		let codec = codec();
		let paths: Vec<Box<str>> = vec!["password".into(), "nested.token".into()];
		let mut doc = json!({ "password": "hunter2", "nested": { "token": "" }, "username": "bob" });

		codec.seal_fields(&mut doc, &paths).unwrap();
		let sealed = doc["password"].as_str().unwrap().to_string();
		assert!(SecretCodec::is_tokenized(&sealed));
		assert_eq!(doc["nested"]["token"], "");
		assert_eq!(doc["username"], "bob");

		// sealing again leaves tokens alone
		codec.seal_fields(&mut doc, &paths).unwrap();
		assert_eq!(doc["password"], sealed.as_str());

		let failed = codec.open_fields(&mut doc, &paths);
		assert!(failed.is_empty());
		assert_eq!(doc["password"], "hunter2");
	}

	#[test]
	fn test_open_fields_reports_failures() {
		let other = SecretCodec::new(&["other key"]).unwrap();
		let paths: Vec<Box<str>> = vec!["password".into()];
		let mut doc = json!({ "password": other.encrypt("hunter2").unwrap(), "username": "bob" });

		let failed = codec().open_fields(&mut doc, &paths);
		assert_eq!(failed, paths);
		assert_eq!(doc["password"], serde_json::Value::Null);
		assert_eq!(doc["username"], "bob");
	}
}

// vim: ts=4
