//! System settings subsystem
//!
//! # Architecture
//!
//! - **Types** (`types.rs`): settings type identifiers, definitions and registry
//! - **Documents** (`documents/`): one typed document per settings type
//! - **Policy** (`policy.rs`): field policy merge of partial updates
//! - **Secret** (`secret.rs`): encryption of secret fields at rest
//! - **Defaults** (`defaults.rs`): default values derived from bootstrap data
//! - **Service** (`service.rs`): SettingsStore with caching and optimistic writes
//! - **Handler** (`handler.rs`): HTTP API endpoints

pub mod defaults;
pub mod documents;
pub mod handler;
pub mod policy;
pub mod secret;
pub mod service;
pub mod types;

pub use defaults::{BootstrapData, DefaultsProvider};
pub use documents::{SettingValue, SettingsDocument};
pub use policy::{FieldPolicy, FieldRule};
pub use secret::SecretCodec;
pub use service::{DecryptedSetting, PutOutcome, SettingsStore, SettingsStoreOpts};
pub use types::{
	FrozenSettingsRegistry, Setting, SettingDefinition, SettingDefinitionBuilder, SettingsRegistry,
	SettingsType,
};

// vim: ts=4
