//! Login lockout and token lifetime settings

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginConfiguration {
	pub max_login_fail_attempts: u32,
	/// Seconds an account stays blocked after too many failures
	pub access_block_time: u64,
	/// Seconds
	pub jwt_token_expiry_time: u64,
}

impl Default for LoginConfiguration {
	fn default() -> Self {
		Self { max_login_fail_attempts: 3, access_block_time: 600, jwt_token_expiry_time: 3600 }
	}
}

// vim: ts=4
