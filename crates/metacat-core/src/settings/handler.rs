//! Settings management handlers

use axum::{
	extract::{Path, State},
	http::StatusCode,
	Json,
};
use serde::{Deserialize, Serialize};

use crate::prelude::*;

use super::types::{Setting, SettingsType};

/// Setting as returned by the API
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingResponse {
	pub config_type: SettingsType,
	pub config_value: serde_json::Value,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub last_modified: Option<Timestamp>,
}

impl SettingResponse {
	pub fn from_setting(setting: &Setting) -> ClResult<Self> {
		Ok(Self {
			config_type: setting.typ(),
			config_value: setting.value.to_document()?,
			last_modified: setting.last_modified,
		})
	}
}

/// Request body of PUT /settings
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingRequest {
	pub config_type: String,
	pub config_value: serde_json::Value,
}

/// GET /settings - List all settings types with their current values
pub async fn list_settings(
	State(app): State<App>,
) -> ClResult<(StatusCode, Json<Vec<SettingResponse>>)> {
	let settings = app.settings.list().await?;
	let response = settings.iter().map(SettingResponse::from_setting).collect::<ClResult<Vec<_>>>()?;

	Ok((StatusCode::OK, Json(response)))
}

/// GET /settings/{name} - Get one settings type
pub async fn get_setting(
	State(app): State<App>,
	Path(name): Path<String>,
) -> ClResult<(StatusCode, Json<SettingResponse>)> {
	let typ: SettingsType = name.parse()?;
	let setting = app.settings.get(typ).await?;

	Ok((StatusCode::OK, Json(SettingResponse::from_setting(&setting)?)))
}

/// PUT /settings - Create or update a settings type
///
/// Returns 201 when the settings type had no stored row yet, 200 otherwise.
pub async fn update_setting(
	State(app): State<App>,
	Json(req): Json<UpdateSettingRequest>,
) -> ClResult<(StatusCode, Json<SettingResponse>)> {
	let typ: SettingsType = req.config_type.parse()?;
	let outcome = app.settings.put(typ, req.config_value).await?;

	let status = if outcome.inserted { StatusCode::CREATED } else { StatusCode::OK };
	Ok((status, Json(SettingResponse::from_setting(&outcome.setting)?)))
}

/// PUT /settings/reset/{name} - Restore the default of a settings type
pub async fn reset_setting(
	State(app): State<App>,
	Path(name): Path<String>,
) -> ClResult<(StatusCode, Json<SettingResponse>)> {
	let typ: SettingsType = name.parse()?;
	let setting = app.settings.reset(typ).await?;

	Ok((StatusCode::OK, Json(SettingResponse::from_setting(&setting)?)))
}

// vim: ts=4
