//! Utility functions

use rand::RngExt;
use sha2::{Digest, Sha256};

use crate::prelude::*;

pub const ID_LENGTH: usize = 24;
pub const SAFE: [char; 62] = [
	'0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i',
	'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'A', 'B',
	'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U',
	'V', 'W', 'X', 'Y', 'Z',
];

pub fn random_id() -> Box<str> {
	let mut rng = rand::rng();
	let mut result = String::with_capacity(ID_LENGTH);

	for _ in 0..ID_LENGTH {
		result.push(SAFE[rng.random_range(0..SAFE.len())]);
	}
	result.into()
}

/// Structural check for identifiers produced by `random_id()`
pub fn is_valid_id(id: &str) -> bool {
	id.len() == ID_LENGTH && id.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Fails with `InvalidIdentifier` unless `id` could have been produced by `random_id()`
pub fn check_id(id: &str) -> CmResult<()> {
	if is_valid_id(id) { Ok(()) } else { Err(Error::InvalidIdentifier(id.into())) }
}

/// Lookup key for user emails: hex encoded SHA-256 of the lower-cased address.
///
/// Plain emails are never used as an index key.
pub fn hash_email(email: &str) -> Box<str> {
	let digest = Sha256::digest(email.trim().to_lowercase().as_bytes());
	digest.iter().map(|b| format!("{:02x}", b)).collect::<String>().into()
}

/// Minimal email shape check: `local@domain.tld`, no whitespace, at most 254 chars
pub fn is_valid_email(email: &str) -> bool {
	if email.len() > 254 || email.chars().any(char::is_whitespace) {
		return false;
	}
	match email.split_once('@') {
		Some((local, domain)) => {
			!local.is_empty()
				&& !domain.contains('@')
				&& domain.contains('.')
				&& !domain.starts_with('.')
				&& !domain.ends_with('.')
		}
		None => false,
	}
}


// vim: ts=4
