//! OAuth sign-in: authorization URLs, state tracking and the code callback

use axum::{
	Json,
	extract::{Path, Query, State},
	http::StatusCode,
};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::handler::{Login, return_login};
use crate::prelude::*;
use confman_core::extract::OptionalRequestId;
use confman_types::auth_adapter::{CreateUserData, OAuthUserInfo};
use confman_types::types::ApiResponse;
use confman_types::utils::{is_valid_email, random_id};

/// Seconds an issued OAuth state stays redeemable
pub const STATE_EXPIRY: i64 = 600;

const MAX_NAME_LEN: usize = 100;

#[derive(Debug)]
struct PendingState {
	provider: Box<str>,
	expires_at: Timestamp,
}

/// One-time `state` values handed out with authorization URLs
#[derive(Debug, Default)]
pub struct OAuthStates {
	pending: DashMap<Box<str>, PendingState>,
}

impl OAuthStates {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn issue(&self, provider: &str) -> Box<str> {
		let now = Timestamp::now();
		self.pending.retain(|_, pending| pending.expires_at > now);

		let state = random_id();
		self.pending.insert(
			state.clone(),
			PendingState { provider: provider.into(), expires_at: Timestamp(now.0 + STATE_EXPIRY) },
		);
		state
	}

	/// Redeems a state. It is consumed even when it does not match the provider.
	pub fn take(&self, state: &str, provider: &str) -> bool {
		match self.pending.remove(state) {
			Some((_, pending)) => {
				pending.provider.as_ref() == provider && pending.expires_at > Timestamp::now()
			}
			None => false,
		}
	}
}

fn display_name(info: &OAuthUserInfo) -> String {
	let name = info.name.as_deref().map(str::trim).filter(|name| !name.is_empty());
	let name = name.unwrap_or_else(|| info.email.split('@').next().unwrap_or_default());
	name.chars().take(MAX_NAME_LEN).collect()
}

/// Signs a user in through `provider`.
///
/// The user is resolved by the existing provider link first, then by email, and created
/// without a password when neither exists. The provider account is linked in every case.
pub async fn oauth_login(app: &App, provider: &str, code: &str) -> CmResult<Login> {
	let oauth = app.oauth_provider(provider)?;
	let mut info = oauth.exchange_code(code).await?;
	info.provider = oauth.name().into();
	info.email = info.email.trim().to_lowercase().into();
	if !is_valid_email(&info.email) {
		warn!(provider = %provider, "OAuth provider returned an invalid email");
		return Err(Error::ValidationError("OAuth account has no valid email address".into()));
	}

	let linked = app.auth_adapter.read_oauth_account(&info.provider, &info.provider_user_id).await?;
	let user_id = match linked {
		Some(user_id) => user_id,
		None => match app.auth_adapter.read_user_by_email(&info.email).await? {
			Some(user) => user.id,
			None => {
				let name = display_name(&info);
				let data = CreateUserData {
					email: &info.email,
					name: &name,
					password: None,
					email_verified: true,
					provider: &info.provider,
				};
				match app.auth_adapter.create_user(&data).await {
					Ok(user_id) => user_id,
					// Registered concurrently
					Err(Error::Conflict(_)) => app
						.auth_adapter
						.read_user_by_email(&info.email)
						.await?
						.map(|user| user.id)
						.ok_or(Error::Unauthorized)?,
					Err(err) => return Err(err),
				}
			}
		},
	};

	app.auth_adapter.link_oauth_account(&user_id, &info).await?;

	let user = app.auth_adapter.read_user(&user_id).await?.ok_or(Error::Unauthorized)?;
	if !user.is_active {
		return Err(Error::Unauthorized);
	}
	let token = app.auth_adapter.create_access_token(&user.id).await?;
	info!(user_id = %user.id, provider = %info.provider, "OAuth login");

	Ok(Login { user: user.into(), token })
}

#[derive(Debug, Serialize)]
pub struct OAuthUrl {
	pub url: String,
	pub state: Box<str>,
}

/// GET /auth/oauth/{provider}/url
pub async fn get_oauth_url(
	State(app): State<App>,
	OptionalRequestId(req_id): OptionalRequestId,
	Path(provider): Path<String>,
) -> CmResult<(StatusCode, Json<ApiResponse<OAuthUrl>>)> {
	let oauth = app.oauth_provider(&provider)?;
	let state = app.ext::<OAuthStates>()?.issue(oauth.name());
	let url = oauth.authorize_url(&state)?;

	let response =
		ApiResponse::new(OAuthUrl { url, state }).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
	#[serde(default)]
	pub code: String,
	#[serde(default)]
	pub state: String,
}

/// GET /auth/oauth/{provider}/callback?code=&state=
pub async fn get_oauth_callback(
	State(app): State<App>,
	OptionalRequestId(req_id): OptionalRequestId,
	Path(provider): Path<String>,
	Query(query): Query<CallbackQuery>,
) -> CmResult<(StatusCode, Json<ApiResponse<Login>>)> {
	let oauth = app.oauth_provider(&provider)?;
	if query.code.is_empty() {
		return Err(Error::ValidationError("code is required".into()));
	}
	if !app.ext::<OAuthStates>()?.take(&query.state, oauth.name()) {
		debug!(provider = %provider, "Unknown or expired OAuth state");
		return Err(Error::Unauthorized);
	}

	let login = oauth_login(&app, &provider, &query.code).await?;
	return_login(login, req_id)
}


// vim: ts=4
