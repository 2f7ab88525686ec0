//! Common test utilities and helpers
//!
//! Builds apps on top of a temporary SQLite settings database and sends
//! requests through the router without binding a socket.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use metacat::app::{App, AppBuilderOpts, AppState};
use metacat::settings::{
	BootstrapData, DefaultsProvider, SecretCodec, SettingsRegistry, SettingsStore,
	SettingsStoreOpts,
};
use metacat::{AppBuilder, routes};
use metacat_settings_adapter_sqlite::SettingsAdapterSqlite;

pub const TEST_KEY: &str = "test-secret-key";

pub async fn sqlite_adapter(dir: &TempDir) -> Arc<SettingsAdapterSqlite> {
	Arc::new(SettingsAdapterSqlite::new(dir.path()).await.expect("Failed to create adapter"))
}

/// App as started by `AppBuilder`, defaults already seeded
pub async fn create_test_app() -> (App, TempDir) {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let mut builder = AppBuilder::new();
	builder.secret_keys([TEST_KEY]).settings_adapter(sqlite_adapter(&temp_dir).await);
	let app = builder.build().await.expect("Failed to build app");
	(app, temp_dir)
}

/// App over an empty database, nothing seeded
pub async fn create_unseeded_app() -> (App, TempDir) {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let adapter = sqlite_adapter(&temp_dir).await;

	let mut registry = SettingsRegistry::new();
	metacat_core::register_settings(&mut registry).expect("Failed to register settings");
	let registry = Arc::new(registry.freeze());
	let bootstrap = BootstrapData::builtin().expect("Failed to load built-in defaults");
	let defaults = DefaultsProvider::new(registry.clone(), bootstrap).expect("Invalid defaults");
	let codec = Arc::new(SecretCodec::new(&[TEST_KEY]).expect("Invalid key"));
	let settings = Arc::new(SettingsStore::new(
		registry.clone(),
		defaults,
		codec,
		adapter.clone(),
		SettingsStoreOpts::default(),
	));

	let app = Arc::new(AppState {
		opts: AppBuilderOpts::default(),
		settings_adapter: adapter,
		settings,
		settings_registry: registry,
		extensions: Default::default(),
	});
	(app, temp_dir)
}

pub fn router(app: &App) -> Router {
	routes::init(app.clone())
}

pub async fn request(
	router: &Router,
	method: Method,
	uri: &str,
	body: Option<Value>,
) -> (StatusCode, Value) {
	let builder = Request::builder().method(method).uri(uri);
	let request = match body {
		Some(body) => builder
			.header("content-type", "application/json")
			.body(Body::from(body.to_string()))
			.unwrap(),
		None => builder.body(Body::empty()).unwrap(),
	};

	let response = router.clone().oneshot(request).await.unwrap();
	let status = response.status();
	let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
	let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
	(status, json)
}

pub async fn get_setting(router: &Router, typ: &str) -> (StatusCode, Value) {
	request(router, Method::GET, &format!("/api/system/settings/{}", typ), None).await
}

pub async fn put_setting(router: &Router, typ: &str, value: Value) -> (StatusCode, Value) {
	let body = serde_json::json!({ "configType": typ, "configValue": value });
	request(router, Method::PUT, "/api/system/settings", Some(body)).await
}

pub async fn reset_setting(router: &Router, typ: &str) -> (StatusCode, Value) {
	request(router, Method::PUT, &format!("/api/system/settings/reset/{}", typ), None).await
}

// vim: ts=4
