//! Adapter that manages user accounts, credentials and access tokens.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::fmt::Debug;

use crate::{prelude::*, types::serialize_timestamp_iso};

/// Access token lifetime in seconds (24 hours)
pub const ACCESS_TOKEN_EXPIRY: i64 = 86400;

/// Provider tag of password based accounts
pub const PROVIDER_EMAIL: &str = "email";

/// Claims of the HS256 access tokens
#[skip_serializing_none]
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AccessToken<S> {
	pub sub: Option<S>,
	pub iat: Timestamp,
	pub exp: Timestamp,
}

/// Context struct for an authenticated user
#[derive(Clone, Debug)]
pub struct AuthCtx {
	pub user_id: Box<str>,
}

#[derive(Debug)]
pub struct AuthLogin {
	pub user_id: Box<str>,
	pub token: Box<str>,
}

/// A stored user account
#[derive(Debug, Clone)]
pub struct UserRecord {
	pub id: Box<str>,
	pub email: Box<str>,
	pub email_hash: Box<str>,
	pub email_verified: bool,
	pub password_hash: Option<Box<str>>,
	pub name: Box<str>,
	pub is_admin: bool,
	pub is_active: bool,
	/// Login methods linked to this account, it only ever grows
	pub auth_providers: Vec<Box<str>>,
	pub created_at: Timestamp,
	pub updated_at: Timestamp,
}

/// Public view of a user, without credentials
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
	pub id: Box<str>,
	pub email: Box<str>,
	pub name: Box<str>,
	pub email_verified: bool,
	pub is_admin: bool,
	pub auth_providers: Vec<Box<str>>,
	#[serde(serialize_with = "serialize_timestamp_iso")]
	pub created_at: Timestamp,
}

impl From<UserRecord> for UserView {
	fn from(user: UserRecord) -> Self {
		UserView {
			id: user.id,
			email: user.email,
			name: user.name,
			email_verified: user.email_verified,
			is_admin: user.is_admin,
			auth_providers: user.auth_providers,
			created_at: user.created_at,
		}
	}
}

/// Data needed to create a new user
#[derive(Debug)]
pub struct CreateUserData<'a> {
	pub email: &'a str,
	pub name: &'a str,
	/// `None` creates an OAuth-only account
	pub password: Option<&'a str>,
	/// Set for addresses confirmed by an OAuth provider
	pub email_verified: bool,
	/// Initial login method tag
	pub provider: &'a str,
}

/// Identity returned by an OAuth provider after a successful code exchange
#[derive(Debug, Clone)]
pub struct OAuthUserInfo {
	pub provider: Box<str>,
	pub provider_user_id: Box<str>,
	pub email: Box<str>,
	pub name: Option<Box<str>>,
}

#[async_trait]
pub trait AuthAdapter: Debug + Send + Sync {
	/// Creates a user and returns its id. Fails with `Error::Conflict` on duplicate email.
	async fn create_user(&self, data: &CreateUserData<'_>) -> CmResult<Box<str>>;
	async fn read_user(&self, user_id: &str) -> CmResult<Option<UserRecord>>;
	/// Looks the user up by the hash of `email`
	async fn read_user_by_email(&self, email: &str) -> CmResult<Option<UserRecord>>;

	/// Verifies the password and issues an access token. Any failure is `Error::Unauthorized`.
	async fn check_user_password(&self, email: &str, password: &str) -> CmResult<AuthLogin>;

	/// Records an OAuth account for the user and adds the provider to `auth_providers`
	async fn link_oauth_account(&self, user_id: &str, info: &OAuthUserInfo) -> CmResult<()>;
	/// Returns the user linked to a provider account
	async fn read_oauth_account(
		&self,
		provider: &str,
		provider_user_id: &str,
	) -> CmResult<Option<Box<str>>>;

	async fn create_access_token(&self, user_id: &str) -> CmResult<Box<str>>;
	/// Returns the user id carried by a valid token
	async fn verify_access_token(&self, token: &str) -> CmResult<Box<str>>;
}

/// An OAuth 2.0 authorization-code provider (Google, GitHub, ...)
#[async_trait]
pub trait OAuthProvider: Debug + Send + Sync {
	/// Provider tag, also stored in `auth_providers`
	fn name(&self) -> &str;
	/// URL the user is redirected to for consent
	fn authorize_url(&self, state: &str) -> CmResult<String>;
	/// Exchanges an authorization code for the user's identity
	async fn exchange_code(&self, code: &str) -> CmResult<OAuthUserInfo>;
}

// vim: ts=4
