//! Configuration REST endpoints

use axum::{
	Json,
	extract::{Path, Query, State},
	http::StatusCode,
};
use serde::Deserialize;

use confman_core::extract::{Auth, OptionalRequestId, ValidJson};
use confman_types::auth_adapter::AuthCtx;
use confman_types::types::ApiResponse;

use crate::prelude::*;
use crate::service::{ConfigService, ConfigView, CreatedConfig, DeletedConfig, UpdatedConfig};
use crate::validate::ConfigPayload;

/// Reads a config on behalf of `auth`. Records of other owners read as missing.
async fn read_owned(svc: &ConfigService, auth: &AuthCtx, id: &str) -> CmResult<ConfigView> {
	let config = svc.get_by_id(id).await?;
	if config.owner_id != auth.user_id {
		debug!(id = %id, user_id = %auth.user_id, "Config of another owner requested");
		return Err(Error::NotFound(format!("Configuration '{}' not found", id)));
	}
	Ok(config)
}

/// POST /configs
pub async fn post_config(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
	ValidJson(payload): ValidJson<ConfigPayload>,
) -> CmResult<(StatusCode, Json<ApiResponse<CreatedConfig>>)> {
	let svc = app.ext::<ConfigService>()?;
	let created = svc.create(&auth.user_id, &payload).await?;

	let mut response = ApiResponse::new(created);
	if let Some(id) = req_id {
		response = response.with_req_id(id);
	}

	Ok((StatusCode::CREATED, Json(response)))
}

/// GET /configs - the caller's own configs
pub async fn list_configs(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
) -> CmResult<(StatusCode, Json<ApiResponse<Vec<ConfigView>>>)> {
	let configs = app.ext::<ConfigService>()?.list_all(Some(&auth.user_id)).await?;

	let mut response = ApiResponse::new(configs);
	if let Some(id) = req_id {
		response = response.with_req_id(id);
	}

	Ok((StatusCode::OK, Json(response)))
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
	#[serde(default)]
	pub service_name: String,
	#[serde(default)]
	pub env_name: String,
}

/// GET /configs/search?service_name=&env_name=
pub async fn search_configs(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
	Query(query): Query<SearchQuery>,
) -> CmResult<(StatusCode, Json<ApiResponse<Vec<ConfigView>>>)> {
	let configs = app
		.ext::<ConfigService>()?
		.get_by_service_env(&auth.user_id, &query.service_name, &query.env_name)
		.await?;

	let mut response = ApiResponse::new(configs);
	if let Some(id) = req_id {
		response = response.with_req_id(id);
	}

	Ok((StatusCode::OK, Json(response)))
}

/// GET /configs/meta/environments
pub async fn list_environments(
	State(app): State<App>,
	OptionalRequestId(req_id): OptionalRequestId,
) -> CmResult<(StatusCode, Json<ApiResponse<Vec<Box<str>>>>)> {
	let envs = app.ext::<ConfigService>()?.list_distinct_environments().await?;

	let mut response = ApiResponse::new(envs);
	if let Some(id) = req_id {
		response = response.with_req_id(id);
	}

	Ok((StatusCode::OK, Json(response)))
}

/// GET /configs/meta/services
pub async fn list_services(
	State(app): State<App>,
	OptionalRequestId(req_id): OptionalRequestId,
) -> CmResult<(StatusCode, Json<ApiResponse<Vec<Box<str>>>>)> {
	let services = app.ext::<ConfigService>()?.list_distinct_services().await?;

	let mut response = ApiResponse::new(services);
	if let Some(id) = req_id {
		response = response.with_req_id(id);
	}

	Ok((StatusCode::OK, Json(response)))
}

/// GET /configs/{id}
pub async fn get_config(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
	Path(config_id): Path<String>,
) -> CmResult<(StatusCode, Json<ApiResponse<ConfigView>>)> {
	let svc = app.ext::<ConfigService>()?;
	let config = read_owned(svc, &auth, &config_id).await?;

	let mut response = ApiResponse::new(config);
	if let Some(id) = req_id {
		response = response.with_req_id(id);
	}

	Ok((StatusCode::OK, Json(response)))
}

/// PUT /configs/{id} - full replacement
pub async fn put_config(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
	Path(config_id): Path<String>,
	ValidJson(payload): ValidJson<ConfigPayload>,
) -> CmResult<(StatusCode, Json<ApiResponse<UpdatedConfig>>)> {
	let svc = app.ext::<ConfigService>()?;
	read_owned(svc, &auth, &config_id).await?;
	let updated = svc.update(&config_id, &payload).await?;

	let mut response = ApiResponse::new(updated);
	if let Some(id) = req_id {
		response = response.with_req_id(id);
	}

	Ok((StatusCode::OK, Json(response)))
}

/// DELETE /configs/{id}
pub async fn delete_config(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
	Path(config_id): Path<String>,
) -> CmResult<(StatusCode, Json<ApiResponse<DeletedConfig>>)> {
	let svc = app.ext::<ConfigService>()?;
	read_owned(svc, &auth, &config_id).await?;
	let deleted = svc.delete(&config_id).await?;

	let mut response = ApiResponse::new(deleted);
	if let Some(id) = req_id {
		response = response.with_req_id(id);
	}

	Ok((StatusCode::OK, Json(response)))
}

// vim: ts=4
