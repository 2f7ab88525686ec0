//! HTTP routes

use axum::{
	Json, Router,
	extract::State,
	routing::{get, put},
};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::app::{App, VERSION};
use crate::prelude::*;
use crate::settings::handler;

async fn get_health(State(app): State<App>) -> Json<serde_json::Value> {
	debug!("Health check, {} settings types", app.settings_registry.len());
	Json(json!({ "status": "ok", "version": VERSION }))
}

pub fn init(app: App) -> Router {
	let system_router = Router::new()
		.route("/settings", get(handler::list_settings).put(handler::update_setting))
		.route("/settings/{name}", get(handler::get_setting))
		.route("/settings/reset/{name}", put(handler::reset_setting))
		.route("/health", get(get_health));

	Router::new()
		.nest("/api/system", system_router)
		.layer(TraceLayer::new_for_http())
		.with_state(app)
}

// vim: ts=4
