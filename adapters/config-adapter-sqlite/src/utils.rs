//! Utility functions for database operations

use sqlx::sqlite::SqliteRow;

use confman::prelude::*;

/// Log database errors
pub(crate) fn inspect(err: &sqlx::Error) {
	warn!("DB: {:#?}", err);
}

/// SQLITE_BUSY and SQLITE_LOCKED, the database is held by another connection
const BUSY_CODES: [i32; 2] = [5, 6];

/// Matches busy codes by their primary part, so extended codes such as
/// SQLITE_BUSY_SNAPSHOT (517) are included
fn is_busy_code(code: &str) -> bool {
	code.parse::<i32>().is_ok_and(|code| BUSY_CODES.contains(&(code & 0xff)))
}

/// Classify a store error.
///
/// Connectivity problems become `StoreUnavailable`, a unique index violation becomes
/// `Conflict`, everything else is an opaque `DbError`.
pub(crate) fn db_err(err: sqlx::Error) -> Error {
	inspect(&err);
	match &err {
		sqlx::Error::PoolTimedOut
		| sqlx::Error::PoolClosed
		| sqlx::Error::Io(_)
		| sqlx::Error::Tls(_) => Error::StoreUnavailable,
		sqlx::Error::Database(db_err) if db_err.is_unique_violation() => Error::Conflict(
			"Configuration for this service and environment already exists".into(),
		),
		sqlx::Error::Database(db_err)
			if db_err.code().is_some_and(|code| is_busy_code(&code)) =>
		{
			Error::StoreUnavailable
		}
		_ => Error::DbError,
	}
}

/// Map an optional row to a value using a closure
pub(crate) fn map_opt<T, F>(row: Result<Option<SqliteRow>, sqlx::Error>, f: F) -> CmResult<Option<T>>
where
	F: FnOnce(&SqliteRow) -> CmResult<T>,
{
	match row {
		Ok(Some(ref row)) => f(row).map(Some),
		Ok(None) => Ok(None),
		Err(err) => Err(db_err(err)),
	}
}

/// Collect result iterator into a vector
pub(crate) fn collect_res<T>(iter: impl Iterator<Item = CmResult<T>>) -> CmResult<Vec<T>> {
	let mut items = Vec::new();
	for item in iter {
		items.push(item?);
	}
	Ok(items)
}


// vim: ts=4
