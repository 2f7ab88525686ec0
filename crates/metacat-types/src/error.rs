//! Error type shared by every Metacat crate
//!
//! Variants map onto HTTP statuses in the `IntoResponse` impl, so handlers can
//! simply return `ClResult<...>`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

pub type ClResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	NotFound,
	PermissionDenied,
	DbError,
	Parse,
	ValidationError(String),
	ConfigError(String),
	Internal(String),
	ServiceUnavailable(String),

	// settings
	/// Settings type identifier not known to the registry
	UnknownType(String),
	/// Dotted path of a field that is not part of the settings schema
	UnknownField(String),
	/// Stored secret token is corrupt or was sealed with an unknown key
	DecryptionError(String),
	/// Compare-and-swap retry budget exhausted
	ConcurrentModification(String),

	// externals
	Io(std::io::Error),
}

impl Error {
	/// Stable machine-readable error code
	pub fn code(&self) -> &'static str {
		match self {
			Error::NotFound => "E-NOT-FOUND",
			Error::PermissionDenied => "E-PERMISSION",
			Error::DbError => "E-DB",
			Error::Parse => "E-PARSE",
			Error::ValidationError(_) => "E-VALIDATION",
			Error::ConfigError(_) => "E-CONFIG",
			Error::Internal(_) | Error::Io(_) => "E-INTERNAL",
			Error::ServiceUnavailable(_) => "E-UNAVAILABLE",
			Error::UnknownType(_) => "E-SETTINGS-TYPE",
			Error::UnknownField(_) => "E-SETTINGS-FIELD",
			Error::DecryptionError(_) => "E-SETTINGS-DECRYPT",
			Error::ConcurrentModification(_) => "E-SETTINGS-CONFLICT",
		}
	}

	pub fn status(&self) -> StatusCode {
		match self {
			Error::NotFound => StatusCode::NOT_FOUND,
			Error::PermissionDenied => StatusCode::FORBIDDEN,
			Error::Parse
			| Error::ValidationError(_)
			| Error::UnknownType(_)
			| Error::UnknownField(_) => StatusCode::BAD_REQUEST,
			Error::ConcurrentModification(_) => StatusCode::CONFLICT,
			Error::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
			Error::DbError
			| Error::ConfigError(_)
			| Error::Internal(_)
			| Error::DecryptionError(_)
			| Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	/// Whether the caller may retry the same request unchanged
	pub fn is_retryable(&self) -> bool {
		matches!(self, Error::ConcurrentModification(_) | Error::ServiceUnavailable(_))
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Error::NotFound => write!(f, "Not found"),
			Error::PermissionDenied => write!(f, "Permission denied"),
			Error::DbError => write!(f, "Database error"),
			Error::Parse => write!(f, "Parse error"),
			Error::ValidationError(msg) => write!(f, "Validation error: {}", msg),
			Error::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
			Error::Internal(msg) => write!(f, "Internal error: {}", msg),
			Error::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
			Error::UnknownType(typ) => write!(f, "Unknown settings type: {}", typ),
			Error::UnknownField(path) => write!(f, "Unknown settings field: {}", path),
			Error::DecryptionError(msg) => write!(f, "Decryption failed: {}", msg),
			Error::ConcurrentModification(typ) => {
				write!(f, "Settings '{}' modified concurrently, please retry", typ)
			}
			Error::Io(err) => write!(f, "I/O error: {}", err),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Error::Io(err) => Some(err),
			_ => None,
		}
	}
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		tracing::debug!("JSON error: {}", err);
		Self::Parse
	}
}

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		let status = self.status();
		// Internal details stay in the log
		let message = if status.is_server_error() {
			tracing::warn!("Request failed: {}", self);
			if matches!(self, Error::ServiceUnavailable(_)) {
				"Service temporarily unavailable".to_string()
			} else {
				"Internal server error".to_string()
			}
		} else {
			self.to_string()
		};
		let body = serde_json::json!({
			"error": {
				"code": self.code(),
				"message": message,
			}
		});
		(status, Json(body)).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_settings_errors_are_client_errors() {
		assert_eq!(Error::UnknownType("bogus".into()).status(), StatusCode::BAD_REQUEST);
		assert_eq!(Error::UnknownField("a.b".into()).status(), StatusCode::BAD_REQUEST);
		assert_eq!(
			Error::ConcurrentModification("loginConfiguration".into()).status(),
			StatusCode::CONFLICT
		);
		assert_eq!(
			Error::DecryptionError("bad tag".into()).status(),
			StatusCode::INTERNAL_SERVER_ERROR
		);
	}

	#[test]
	fn test_retryable() {
		assert!(Error::ConcurrentModification("x".into()).is_retryable());
		assert!(!Error::UnknownType("x".into()).is_retryable());
		assert!(!Error::UnknownField("x".into()).is_retryable());
	}

	#[test]
	fn test_display_includes_path() {
		let err = Error::UnknownField("globalSettings.bogusField".into());
		assert_eq!(err.to_string(), "Unknown settings field: globalSettings.bogusField");
	}
}

// vim: ts=4
