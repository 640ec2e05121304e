//! Adapter that stores configuration documents.
//!
//! The adapter is the only component touching the document store. It distinguishes
//! connectivity failures (`Error::StoreUnavailable`) from absence, which is always
//! expressed as `None` or a zero count, never as an error.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::prelude::*;

/// Maximum number of records returned by a single `list_configs()` call
pub const MAX_LIST_RESULTS: u32 = 1000;

/// Validated, user-controlled part of a configuration document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFields {
	pub service_name: Box<str>,
	pub env_name: Box<str>,
	pub data: BTreeMap<String, String>,
}

/// A configuration document ready to be inserted
#[derive(Debug, Clone)]
pub struct NewConfig<'a> {
	pub owner_id: &'a str,
	pub fields: ConfigFields,
	pub version: u32,
	pub created_at: Timestamp,
	pub updated_at: Timestamp,
}

/// Whole-field replacement applied by `update_config()`
#[derive(Debug, Clone)]
pub struct ConfigUpdate {
	pub fields: ConfigFields,
	pub version: u32,
	pub updated_at: Timestamp,
}

/// A stored configuration document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigRecord {
	pub id: Box<str>,
	pub owner_id: Box<str>,
	pub service_name: Box<str>,
	pub env_name: Box<str>,
	pub data: BTreeMap<String, String>,
	pub version: u32,
	pub created_at: Timestamp,
	pub updated_at: Timestamp,
}

/// Filter for `list_configs()`. Unset fields do not constrain the result.
#[derive(Debug, Default, Clone, Copy)]
pub struct ListConfigOptions<'a> {
	pub owner_id: Option<&'a str>,
	pub service_name: Option<&'a str>,
	pub env_name: Option<&'a str>,
}

/// Fields supported by `list_distinct()`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DistinctField {
	ServiceName,
	EnvName,
}

impl DistinctField {
	pub fn column(self) -> &'static str {
		match self {
			DistinctField::ServiceName => "service_name",
			DistinctField::EnvName => "env_name",
		}
	}
}

#[async_trait]
pub trait ConfigAdapter: Debug + Send + Sync {
	/// Checks identifier syntax without touching the store.
	///
	/// Every id-based operation calls this before querying.
	fn check_id(&self, id: &str) -> CmResult<()>;

	/// Inserts a new document and returns its generated id.
	///
	/// Fails with `Error::Conflict` if the (owner, service, env) triple already exists.
	async fn insert_config(&self, config: &NewConfig<'_>) -> CmResult<Box<str>>;

	/// Finds the document for an (owner, service, env) triple
	async fn find_config(
		&self,
		owner_id: &str,
		service_name: &str,
		env_name: &str,
	) -> CmResult<Option<ConfigRecord>>;

	async fn read_config(&self, id: &str) -> CmResult<Option<ConfigRecord>>;

	/// Lists documents matching `opts`, at most `MAX_LIST_RESULTS` of them
	async fn list_configs(&self, opts: &ListConfigOptions<'_>) -> CmResult<Vec<ConfigRecord>>;

	/// Replaces the fields of a document. Returns the number of matched documents.
	///
	/// If `expected_version` is set, the document only matches while its stored version
	/// still equals it.
	async fn update_config(
		&self,
		id: &str,
		update: &ConfigUpdate,
		expected_version: Option<u32>,
	) -> CmResult<u64>;

	/// Deletes a document. Returns the number of deleted documents.
	async fn delete_config(&self, id: &str) -> CmResult<u64>;

	/// Distinct values of `field` across all owners, sorted ascending
	async fn list_distinct(&self, field: DistinctField) -> CmResult<Vec<Box<str>>>;
}

// vim: ts=4
