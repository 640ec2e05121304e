//! Config service. Orchestrates validation, stamping and the document store.

use serde::Serialize;
use std::{collections::BTreeMap, fmt, sync::Arc, time::Duration};

use confman_types::config_adapter::{
	ConfigAdapter, ConfigRecord, DistinctField, ListConfigOptions,
};
use confman_types::types::serialize_timestamp_iso;

use crate::prelude::*;
use crate::stamp::{stamp_create, stamp_update};
use crate::validate::{ConfigPayload, validate, validate_lookup};

pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(10);

pub type Clock = Arc<dyn Fn() -> Timestamp + Send + Sync>;

/// A configuration document as returned to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigView {
	pub id: Box<str>,
	pub owner_id: Box<str>,
	pub service_name: Box<str>,
	pub env_name: Box<str>,
	pub data: BTreeMap<String, String>,
	pub version: u32,
	#[serde(serialize_with = "serialize_timestamp_iso")]
	pub created_at: Timestamp,
	#[serde(serialize_with = "serialize_timestamp_iso")]
	pub updated_at: Timestamp,
}

impl From<ConfigRecord> for ConfigView {
	fn from(rec: ConfigRecord) -> Self {
		ConfigView {
			id: rec.id,
			owner_id: rec.owner_id,
			service_name: rec.service_name,
			env_name: rec.env_name,
			data: rec.data,
			version: rec.version,
			created_at: rec.created_at,
			updated_at: rec.updated_at,
		}
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedConfig {
	pub id: Box<str>,
	pub version: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdatedConfig {
	pub id: Box<str>,
	pub modified_count: u64,
	pub version: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeletedConfig {
	pub deleted_count: u64,
}

#[derive(Clone)]
pub struct ConfigService {
	adapter: Arc<dyn ConfigAdapter>,
	timeout: Duration,
	clock: Clock,
}

impl fmt::Debug for ConfigService {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ConfigService")
			.field("adapter", &self.adapter)
			.field("timeout", &self.timeout)
			.finish_non_exhaustive()
	}
}

impl ConfigService {
	pub fn new(adapter: Arc<dyn ConfigAdapter>) -> Self {
		Self { adapter, timeout: DEFAULT_STORE_TIMEOUT, clock: Arc::new(Timestamp::now) }
	}

	/// Upper bound for a single store call
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}

	pub fn with_clock(mut self, clock: impl Fn() -> Timestamp + Send + Sync + 'static) -> Self {
		self.clock = Arc::new(clock);
		self
	}

	/// Runs a store call under the configured timeout and classifies its failure.
	///
	/// `StoreUnavailable`, `Conflict` and client errors pass through unchanged. Anything
	/// else is logged with the operation and record id and replaced by an opaque error.
	async fn store<T>(
		&self,
		op: &'static str,
		id: Option<&str>,
		fut: impl Future<Output = CmResult<T>>,
	) -> CmResult<T> {
		match tokio::time::timeout(self.timeout, fut).await {
			Ok(Ok(res)) => Ok(res),
			Ok(Err(err @ (Error::DbError | Error::Internal(_) | Error::Parse))) => {
				error!(op, id = id.unwrap_or("-"), "Unexpected store failure: {}", err);
				Err(Error::Internal(format!("{} failed", op)))
			}
			Ok(Err(err)) => Err(err),
			Err(_) => {
				warn!(op, id = id.unwrap_or("-"), "Store call timed out after {:?}", self.timeout);
				Err(Error::StoreUnavailable)
			}
		}
	}

	/// Malformed identifiers are a client mistake, not an absent record
	fn check_id(&self, id: &str) -> CmResult<()> {
		self.adapter
			.check_id(id)
			.map_err(|_| Error::ValidationError(format!("'{}' is not a valid config id", id)))
	}

	pub async fn create(&self, owner_id: &str, payload: &ConfigPayload) -> CmResult<CreatedConfig> {
		let fields = validate(payload)?;

		// Fast path for a friendlier message, the unique index has the final word
		let existing = self
			.store(
				"create",
				None,
				self.adapter.find_config(owner_id, &fields.service_name, &fields.env_name),
			)
			.await?;
		if existing.is_some() {
			return Err(Error::Conflict(format!(
				"Configuration for service '{}' in environment '{}' already exists",
				fields.service_name, fields.env_name
			)));
		}

		let new_config = stamp_create(owner_id, fields, (self.clock)());
		let id = self.store("create", None, self.adapter.insert_config(&new_config)).await?;
		info!(
			id = %id,
			service = %new_config.fields.service_name,
			env = %new_config.fields.env_name,
			"Config created"
		);

		Ok(CreatedConfig { id, version: new_config.version })
	}

	/// Targeted lookup. Unlike `list_all()`, an empty result is an error here.
	pub async fn get_by_service_env(
		&self,
		owner_id: &str,
		service_name: &str,
		env_name: &str,
	) -> CmResult<Vec<ConfigView>> {
		validate_lookup(service_name, env_name)?;

		let opts = ListConfigOptions {
			owner_id: Some(owner_id),
			service_name: Some(service_name),
			env_name: Some(env_name),
		};
		let records = self.store("search", None, self.adapter.list_configs(&opts)).await?;
		if records.is_empty() {
			return Err(Error::NotFound(format!(
				"No configuration found for service '{}' in environment '{}'",
				service_name, env_name
			)));
		}

		Ok(records.into_iter().map(ConfigView::from).collect())
	}

	pub async fn get_by_id(&self, id: &str) -> CmResult<ConfigView> {
		self.check_id(id)?;

		self.store("get", Some(id), self.adapter.read_config(id))
			.await?
			.map(ConfigView::from)
			.ok_or_else(|| Error::NotFound(format!("Configuration '{}' not found", id)))
	}

	pub async fn list_all(&self, owner_id: Option<&str>) -> CmResult<Vec<ConfigView>> {
		let opts = ListConfigOptions { owner_id, ..Default::default() };
		let records = self.store("list", None, self.adapter.list_configs(&opts)).await?;

		Ok(records.into_iter().map(ConfigView::from).collect())
	}

	/// Replaces service_name, env_name and data of a document and bumps its version
	pub async fn update(&self, id: &str, payload: &ConfigPayload) -> CmResult<UpdatedConfig> {
		self.check_id(id)?;
		let fields = validate(payload)?;

		let previous = self.store("update", Some(id), self.adapter.read_config(id)).await?;
		let previous_version = previous.as_ref().map(|rec| rec.version);
		let update = stamp_update(fields, (self.clock)(), previous_version);

		let modified_count = self
			.store("update", Some(id), self.adapter.update_config(id, &update, previous_version))
			.await?;
		if modified_count == 0 {
			if previous.is_some()
				&& self.store("update", Some(id), self.adapter.read_config(id)).await?.is_some()
			{
				// Another writer bumped the version between our read and write
				return Err(Error::Conflict(format!(
					"Configuration '{}' was modified concurrently, retry the update",
					id
				)));
			}
			return Err(Error::NotFound(format!("Configuration '{}' not found", id)));
		}
		info!(id = %id, version = update.version, "Config updated");

		Ok(UpdatedConfig { id: id.into(), modified_count, version: update.version })
	}

	pub async fn delete(&self, id: &str) -> CmResult<DeletedConfig> {
		self.check_id(id)?;

		let deleted_count = self.store("delete", Some(id), self.adapter.delete_config(id)).await?;
		if deleted_count == 0 {
			return Err(Error::NotFound(format!("Configuration '{}' not found", id)));
		}
		info!(id = %id, "Config deleted");

		Ok(DeletedConfig { deleted_count })
	}

	/// Sorted service names across all owners
	pub async fn list_distinct_services(&self) -> CmResult<Vec<Box<str>>> {
		self.store(
			"list_services",
			None,
			self.adapter.list_distinct(DistinctField::ServiceName),
		)
		.await
	}

	/// Sorted environment names across all owners
	pub async fn list_distinct_environments(&self) -> CmResult<Vec<Box<str>>> {
		self.store(
			"list_environments",
			None,
			self.adapter.list_distinct(DistinctField::EnvName),
		)
		.await
	}
}

// vim: ts=4
