//! User accounts and linked OAuth accounts

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use crate::crypto;
use crate::utils::*;
use confman::auth_adapter::*;
use confman::prelude::*;
use confman::utils::{hash_email, random_id};

const USER_COLUMNS: &str = "user_id, email, email_hash, email_verified, password, name, is_admin,
	is_active, auth_providers, created_at, updated_at";

fn map_user(row: &SqliteRow) -> Result<UserRecord, sqlx::Error> {
	let auth_providers: String = row.try_get("auth_providers")?;

	Ok(UserRecord {
		id: row.try_get::<String, _>("user_id")?.into(),
		email: row.try_get::<String, _>("email")?.into(),
		email_hash: row.try_get::<String, _>("email_hash")?.into(),
		email_verified: row.try_get("email_verified")?,
		password_hash: row.try_get::<Option<String>, _>("password")?.map(Box::from),
		name: row.try_get::<String, _>("name")?.into(),
		is_admin: row.try_get("is_admin")?,
		is_active: row.try_get("is_active")?,
		auth_providers: parse_str_list(&auth_providers),
		created_at: Timestamp(row.try_get("created_at")?),
		updated_at: Timestamp(row.try_get("updated_at")?),
	})
}

pub(crate) async fn create(db: &SqlitePool, data: &CreateUserData<'_>) -> CmResult<Box<str>> {
	let user_id = random_id();
	let email = data.email.trim().to_lowercase();
	let password_hash = match data.password {
		Some(password) => Some(crypto::generate_password_hash(password.into()).await?),
		None => None,
	};
	let now = Timestamp::now();

	sqlx::query(
		"INSERT INTO users (user_id, email, email_hash, email_verified, password, name,
			auth_providers, created_at, updated_at)
		VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
	)
	.bind(user_id.as_ref())
	.bind(&email)
	.bind(hash_email(&email).as_ref())
	.bind(data.email_verified)
	.bind(password_hash.as_deref())
	.bind(data.name.trim())
	.bind(data.provider)
	.bind(now.0)
	.execute(db)
	.await
	.map_err(db_err)?;

	info!(user_id = %user_id, provider = %data.provider, "User created");
	Ok(user_id)
}

pub(crate) async fn read(db: &SqlitePool, user_id: &str) -> CmResult<Option<UserRecord>> {
	let res = sqlx::query(&format!("SELECT {} FROM users WHERE user_id = ?1", USER_COLUMNS))
		.bind(user_id)
		.fetch_optional(db)
		.await;

	map_opt(res, map_user)
}

/// Users are looked up by the hash of their email, never by the plain address
pub(crate) async fn read_by_email(db: &SqlitePool, email: &str) -> CmResult<Option<UserRecord>> {
	let res = sqlx::query(&format!("SELECT {} FROM users WHERE email_hash = ?1", USER_COLUMNS))
		.bind(hash_email(email).as_ref())
		.fetch_optional(db)
		.await;

	map_opt(res, map_user)
}

pub(crate) async fn link_oauth_account(
	db: &SqlitePool,
	user_id: &str,
	info: &OAuthUserInfo,
) -> CmResult<()> {
	let now = Timestamp::now();
	let mut tx = db.begin().await.map_err(db_err)?;

	let providers: Option<String> =
		sqlx::query_scalar("SELECT auth_providers FROM users WHERE user_id = ?1")
			.bind(user_id)
			.fetch_optional(&mut *tx)
			.await
			.map_err(db_err)?;
	let Some(providers) = providers else {
		return Err(Error::NotFound(format!("User '{}' not found", user_id)));
	};

	// An existing link keeps pointing at its original user
	sqlx::query(
		"INSERT INTO oauth_accounts (provider, provider_user_id, user_id, provider_email,
			created_at, updated_at)
		VALUES (?1, ?2, ?3, ?4, ?5, ?5)
		ON CONFLICT (provider, provider_user_id)
		DO UPDATE SET provider_email = excluded.provider_email, updated_at = excluded.updated_at",
	)
	.bind(info.provider.as_ref())
	.bind(info.provider_user_id.as_ref())
	.bind(user_id)
	.bind(info.email.as_ref())
	.bind(now.0)
	.execute(&mut *tx)
	.await
	.map_err(db_err)?;

	// auth_providers only ever grows
	let mut providers = parse_str_list(&providers);
	if !providers.iter().any(|p| *p == info.provider) {
		providers.push(info.provider.clone());
		sqlx::query("UPDATE users SET auth_providers = ?2, updated_at = ?3 WHERE user_id = ?1")
			.bind(user_id)
			.bind(providers.join(","))
			.bind(now.0)
			.execute(&mut *tx)
			.await
			.map_err(db_err)?;
	}

	tx.commit().await.map_err(db_err)?;
	Ok(())
}

pub(crate) async fn read_oauth_account(
	db: &SqlitePool,
	provider: &str,
	provider_user_id: &str,
) -> CmResult<Option<Box<str>>> {
	let res = sqlx::query(
		"SELECT user_id FROM oauth_accounts WHERE provider = ?1 AND provider_user_id = ?2",
	)
	.bind(provider)
	.bind(provider_user_id)
	.fetch_optional(db)
	.await;

	map_opt(res, |row| row.try_get::<String, _>("user_id").map(Box::from))
}

// vim: ts=4
