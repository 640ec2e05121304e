//! Utility functions for database operations

use sqlx::sqlite::SqliteRow;

use confman::prelude::*;

/// Parse a comma-separated string into a vector of boxed strings
pub(crate) fn parse_str_list(s: &str) -> Vec<Box<str>> {
	s.split(',').map(str::trim).filter(|s| !s.is_empty()).map(Box::from).collect()
}

/// Log database errors
pub(crate) fn inspect(err: &sqlx::Error) {
	warn!("DB: {:#?}", err);
}

/// Classify a store error. Unique violations only come from the user email index.
pub(crate) fn db_err(err: sqlx::Error) -> Error {
	inspect(&err);
	match &err {
		sqlx::Error::PoolTimedOut
		| sqlx::Error::PoolClosed
		| sqlx::Error::Io(_)
		| sqlx::Error::Tls(_) => Error::StoreUnavailable,
		sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
			Error::Conflict("A user with this email already exists".into())
		}
		_ => Error::DbError,
	}
}

/// Map an optional row to a value using a closure
pub(crate) fn map_opt<T, F>(row: Result<Option<SqliteRow>, sqlx::Error>, f: F) -> CmResult<Option<T>>
where
	F: FnOnce(&SqliteRow) -> Result<T, sqlx::Error>,
{
	match row {
		Ok(Some(ref row)) => f(row).map(Some).map_err(db_err),
		Ok(None) => Ok(None),
		Err(err) => Err(db_err(err)),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_str_list() {
		assert_eq!(parse_str_list("email, google,,"), ["email", "google"].map(Box::<str>::from));
		assert!(parse_str_list("").is_empty());
	}
}

// vim: ts=4
