//! SQLite implementation of the Confman authentication adapter.
//!
//! Stores user accounts and their linked OAuth accounts, hashes passwords with bcrypt
//! and signs HS256 access tokens. The signing secret is either supplied by the caller
//! or generated once and kept in the `vars` table.

#![forbid(unsafe_code)]

mod crypto;
mod schema;
mod user;
mod utils;

use async_trait::async_trait;
use jsonwebtoken::{DecodingKey, EncodingKey};
use sqlx::{
	Row,
	sqlite::{self, SqlitePool},
};
use std::{fmt, path::Path};

use confman::{auth_adapter::*, prelude::*};

use crate::utils::db_err;

const DB_FILE: &str = "auth.db";
const JWT_SECRET_VAR: &str = "jwt_secret";

pub struct AuthAdapterSqlite {
	db: SqlitePool,
	encoding_key: EncodingKey,
	decoding_key: DecodingKey,
}

impl fmt::Debug for AuthAdapterSqlite {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AuthAdapterSqlite").field("db", &self.db).finish_non_exhaustive()
	}
}

/// Get or generate the JWT secret for HS256 signing
async fn ensure_jwt_secret(db: &SqlitePool) -> CmResult<String> {
	let res = sqlx::query("SELECT value FROM vars WHERE key = ?1")
		.bind(JWT_SECRET_VAR)
		.fetch_optional(db)
		.await
		.map_err(db_err)?;

	if let Some(row) = res {
		return row.try_get("value").map_err(db_err);
	}

	// Generate new secret (32 random bytes, base64 encoded)
	use base64::Engine;
	use rand::Rng;
	let mut secret_bytes = [0u8; 32];
	rand::rng().fill_bytes(&mut secret_bytes);
	let secret_str = base64::engine::general_purpose::STANDARD.encode(secret_bytes);

	sqlx::query("INSERT OR REPLACE INTO vars (key, value) VALUES (?1, ?2)")
		.bind(JWT_SECRET_VAR)
		.bind(&secret_str)
		.execute(db)
		.await
		.map_err(db_err)?;

	info!("Generated new JWT secret");
	Ok(secret_str)
}

impl AuthAdapterSqlite {
	/// Opens (or creates) the database in the `dir` directory.
	///
	/// Without `jwt_secret` a persisted random secret is used, so tokens survive restarts.
	pub async fn new(dir: impl AsRef<Path>, jwt_secret: Option<&str>) -> CmResult<Self> {
		tokio::fs::create_dir_all(dir.as_ref()).await?;

		let opts = sqlite::SqliteConnectOptions::new()
			.filename(dir.as_ref().join(DB_FILE))
			.create_if_missing(true)
			.journal_mode(sqlite::SqliteJournalMode::Wal);
		let db = sqlite::SqlitePoolOptions::new()
			.max_connections(5)
			.connect_with(opts)
			.await
			.map_err(db_err)?;

		schema::init_db(&db).await.map_err(db_err)?;

		let secret = match jwt_secret {
			Some(secret) if !secret.is_empty() => secret.to_string(),
			_ => ensure_jwt_secret(&db).await?,
		};

		Ok(Self {
			db,
			encoding_key: EncodingKey::from_secret(secret.as_bytes()),
			decoding_key: DecodingKey::from_secret(secret.as_bytes()),
		})
	}
}

#[async_trait]
impl AuthAdapter for AuthAdapterSqlite {
	async fn create_user(&self, data: &CreateUserData<'_>) -> CmResult<Box<str>> {
		user::create(&self.db, data).await
	}

	async fn read_user(&self, user_id: &str) -> CmResult<Option<UserRecord>> {
		user::read(&self.db, user_id).await
	}

	async fn read_user_by_email(&self, email: &str) -> CmResult<Option<UserRecord>> {
		user::read_by_email(&self.db, email).await
	}

	async fn check_user_password(&self, email: &str, password: &str) -> CmResult<AuthLogin> {
		let Some(user) = user::read_by_email(&self.db, email).await? else {
			debug!("Login attempt for unknown email");
			return Err(Error::Unauthorized);
		};
		// OAuth-only accounts have no password to check
		let Some(password_hash) = user.password_hash else {
			return Err(Error::Unauthorized);
		};
		if !user.is_active {
			return Err(Error::Unauthorized);
		}

		crypto::check_password(password.into(), password_hash).await?;
		let token = crypto::generate_access_token(&self.encoding_key, &user.id)?;

		Ok(AuthLogin { user_id: user.id, token })
	}

	async fn link_oauth_account(&self, user_id: &str, info: &OAuthUserInfo) -> CmResult<()> {
		user::link_oauth_account(&self.db, user_id, info).await
	}

	async fn read_oauth_account(
		&self,
		provider: &str,
		provider_user_id: &str,
	) -> CmResult<Option<Box<str>>> {
		user::read_oauth_account(&self.db, provider, provider_user_id).await
	}

	async fn create_access_token(&self, user_id: &str) -> CmResult<Box<str>> {
		crypto::generate_access_token(&self.encoding_key, user_id)
	}

	async fn verify_access_token(&self, token: &str) -> CmResult<Box<str>> {
		crypto::validate_access_token(&self.decoding_key, token)
	}
}

// vim: ts=4
