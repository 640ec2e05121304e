//! Registration and login payloads

use serde::Deserialize;

use crate::prelude::*;
use confman_types::utils::is_valid_email;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_NAME_LEN: usize = 100;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
	pub email: String,
	pub password: String,
	pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
	pub email: String,
	pub password: String,
}

pub fn check_email(email: &str) -> CmResult<()> {
	if is_valid_email(email.trim()) {
		Ok(())
	} else {
		Err(Error::ValidationError("email must be a valid email address".into()))
	}
}

pub fn check_password(password: &str) -> CmResult<()> {
	if password.trim().is_empty() {
		return Err(Error::ValidationError("password must not be blank".into()));
	}
	if password.chars().count() < MIN_PASSWORD_LEN {
		return Err(Error::ValidationError(format!(
			"password must be at least {} characters",
			MIN_PASSWORD_LEN
		)));
	}
	Ok(())
}

pub fn check_name(name: &str) -> CmResult<()> {
	let name = name.trim();
	if name.is_empty() {
		return Err(Error::ValidationError("name must not be blank".into()));
	}
	if name.chars().count() > MAX_NAME_LEN {
		return Err(Error::ValidationError(format!(
			"name must be at most {} characters",
			MAX_NAME_LEN
		)));
	}
	Ok(())
}

/// Checks email, password and name, in that order
pub fn validate_registration(req: &RegisterRequest) -> CmResult<()> {
	check_email(&req.email)?;
	check_password(&req.password)?;
	check_name(&req.name)
}


// vim: ts=4
