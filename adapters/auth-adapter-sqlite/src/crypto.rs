//! Password hashing and access token signing

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use confman::{auth_adapter::*, prelude::*};

const BCRYPT_COST: u32 = 10;

fn generate_password_hash_sync(password: &str) -> CmResult<Box<str>> {
	let hash = bcrypt::hash(password, BCRYPT_COST)
		.map_err(|err| Error::Internal(format!("bcrypt: {}", err)))?;

	Ok(hash.into())
}

/// Hashes a password on the blocking thread pool
pub(crate) async fn generate_password_hash(password: Box<str>) -> CmResult<Box<str>> {
	tokio::task::spawn_blocking(move || generate_password_hash_sync(&password))
		.await
		.map_err(|err| Error::Internal(format!("password hash task: {}", err)))?
}

fn check_password_sync(password: &str, password_hash: &str) -> CmResult<()> {
	let res = bcrypt::verify(password, password_hash).map_err(|_| Error::Unauthorized)?;
	if res { Ok(()) } else { Err(Error::Unauthorized) }
}

/// Verifies a password on the blocking thread pool. Any mismatch is `Unauthorized`.
pub(crate) async fn check_password(password: Box<str>, password_hash: Box<str>) -> CmResult<()> {
	tokio::task::spawn_blocking(move || check_password_sync(&password, &password_hash))
		.await
		.map_err(|err| Error::Internal(format!("password check task: {}", err)))?
}

pub(crate) fn generate_access_token(key: &EncodingKey, user_id: &str) -> CmResult<Box<str>> {
	let claims = AccessToken {
		sub: Some(user_id),
		iat: Timestamp::now(),
		exp: Timestamp::from_now(ACCESS_TOKEN_EXPIRY),
	};
	let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, key)
		.map_err(|err| Error::Internal(format!("jwt encode: {}", err)))?;

	Ok(token.into())
}

/// Returns the subject of a valid, unexpired token
pub(crate) fn validate_access_token(key: &DecodingKey, token: &str) -> CmResult<Box<str>> {
	let token_data =
		jsonwebtoken::decode::<AccessToken<Box<str>>>(token, key, &Validation::new(Algorithm::HS256))
			.map_err(|err| {
				debug!("Rejected access token: {}", err);
				Error::Unauthorized
			})?;

	token_data.claims.sub.filter(|sub| !sub.is_empty()).ok_or(Error::Unauthorized)
}


// vim: ts=4
