use axum::{
	Json, Router, middleware,
	routing::{get, post},
};
use serde_json::json;

use crate::prelude::*;
use crate::webserver::log_request;
use confman_auth::{handler as auth, oauth};
use confman_config::handler as config;
use confman_core::middleware::{request_id, require_auth};

async fn get_health() -> Json<serde_json::Value> {
	Json(json!({ "status": "ok", "version": crate::app::VERSION }))
}

/// Builds the HTTP router for `app`
pub fn init(app: App) -> Router {
	let protected_router = Router::new()
		.route("/configs", get(config::list_configs).post(config::post_config))
		.route("/configs/search", get(config::search_configs))
		.route("/configs/meta/environments", get(config::list_environments))
		.route("/configs/meta/services", get(config::list_services))
		.route(
			"/configs/{id}",
			get(config::get_config).put(config::put_config).delete(config::delete_config),
		)
		.route("/auth/me", get(auth::get_me))
		.route("/auth/user/{email}", get(auth::get_user_by_email))
		.route_layer(middleware::from_fn_with_state(app.clone(), require_auth));

	let public_router = Router::new()
		.route("/health", get(get_health))
		.route("/auth/register", post(auth::post_register))
		.route("/auth/login", post(auth::post_login))
		.route("/auth/oauth/{provider}/url", get(oauth::get_oauth_url))
		.route("/auth/oauth/{provider}/callback", get(oauth::get_oauth_callback));

	Router::new()
		.merge(public_router)
		.merge(protected_router)
		.layer(middleware::from_fn(log_request))
		.layer(middleware::from_fn(request_id))
		.with_state(app)
}

// vim: ts=4
