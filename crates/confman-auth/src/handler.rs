//! Account endpoints: registration, password login and user lookup

use axum::{
	Json,
	extract::{Path, State},
	http::StatusCode,
};
use serde::Serialize;

use crate::prelude::*;
use crate::validate::{LoginRequest, RegisterRequest, check_email, validate_registration};
use confman_core::extract::{Auth, OptionalRequestId, ValidJson};
use confman_types::auth_adapter::{CreateUserData, PROVIDER_EMAIL, UserView};
use confman_types::types::ApiResponse;
use confman_types::utils::hash_email;

/// A signed in user together with a fresh access token
#[derive(Debug, Serialize)]
pub struct Login {
	pub user: UserView,
	pub token: Box<str>,
}

pub(crate) fn return_login(
	login: Login,
	req_id: Option<String>,
) -> CmResult<(StatusCode, Json<ApiResponse<Login>>)> {
	let response = ApiResponse::new(login).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// # POST /auth/register
pub async fn post_register(
	State(app): State<App>,
	OptionalRequestId(req_id): OptionalRequestId,
	ValidJson(req): ValidJson<RegisterRequest>,
) -> CmResult<(StatusCode, Json<ApiResponse<Login>>)> {
	validate_registration(&req)?;

	let user_id = app
		.auth_adapter
		.create_user(&CreateUserData {
			email: &req.email,
			name: &req.name,
			password: Some(&req.password),
			email_verified: false,
			provider: PROVIDER_EMAIL,
		})
		.await?;

	let user = app
		.auth_adapter
		.read_user(&user_id)
		.await?
		.ok_or_else(|| Error::Internal("registered user vanished".into()))?;
	let token = app.auth_adapter.create_access_token(&user_id).await?;

	let response =
		ApiResponse::new(Login { user: user.into(), token }).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::CREATED, Json(response)))
}

/// # POST /auth/login
pub async fn post_login(
	State(app): State<App>,
	OptionalRequestId(req_id): OptionalRequestId,
	ValidJson(req): ValidJson<LoginRequest>,
) -> CmResult<(StatusCode, Json<ApiResponse<Login>>)> {
	let auth = match app.auth_adapter.check_user_password(&req.email, &req.password).await {
		Ok(auth) => auth,
		Err(Error::StoreUnavailable) => return Err(Error::StoreUnavailable),
		Err(err) => {
			debug!("Login failed: {}", err);
			return Err(Error::Unauthorized);
		}
	};

	let user = app.auth_adapter.read_user(&auth.user_id).await?.ok_or(Error::Unauthorized)?;
	info!(user_id = %user.id, "Password login");

	return_login(Login { user: user.into(), token: auth.token }, req_id)
}

/// # GET /auth/me
pub async fn get_me(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
) -> CmResult<(StatusCode, Json<ApiResponse<UserView>>)> {
	let user = app
		.auth_adapter
		.read_user(&auth.user_id)
		.await?
		.ok_or_else(|| Error::NotFound("User not found".into()))?;

	let response = ApiResponse::new(UserView::from(user)).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// # GET /auth/user/{email}
///
/// Users may look up themselves, admins anyone.
pub async fn get_user_by_email(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
	Path(email): Path<String>,
) -> CmResult<(StatusCode, Json<ApiResponse<UserView>>)> {
	check_email(&email)?;

	let caller = app.auth_adapter.read_user(&auth.user_id).await?.ok_or(Error::Unauthorized)?;
	if caller.email_hash != hash_email(&email) && !caller.is_admin {
		warn!(user_id = %auth.user_id, "User lookup of another account denied");
		return Err(Error::PermissionDenied);
	}

	let user = app
		.auth_adapter
		.read_user_by_email(&email)
		.await?
		.ok_or_else(|| Error::NotFound("User not found".into()))?;

	let response = ApiResponse::new(UserView::from(user)).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

// vim: ts=4
