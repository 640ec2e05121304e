//! Config service tests against in-memory document stores

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use confman_config::{ConfigPayload, ConfigService};
use confman_types::config_adapter::{
	ConfigAdapter, ConfigRecord, ConfigUpdate, DistinctField, ListConfigOptions, NewConfig,
};
use confman_types::error::{CmResult, Error};
use confman_types::types::Timestamp;
use confman_types::utils::{check_id, random_id};

/// Keeps documents in a vector and enforces the (owner, service, env) uniqueness like the
/// SQLite index does
#[derive(Debug, Default)]
struct MemoryAdapter {
	records: Mutex<Vec<ConfigRecord>>,
}

#[async_trait]
impl ConfigAdapter for MemoryAdapter {
	fn check_id(&self, id: &str) -> CmResult<()> {
		check_id(id)
	}

	async fn insert_config(&self, config: &NewConfig<'_>) -> CmResult<Box<str>> {
		let mut records = self.records.lock();
		if records.iter().any(|r| {
			r.owner_id.as_ref() == config.owner_id
				&& r.service_name == config.fields.service_name
				&& r.env_name == config.fields.env_name
		}) {
			return Err(Error::Conflict("duplicate".into()));
		}
		let id = random_id();
		records.push(ConfigRecord {
			id: id.clone(),
			owner_id: config.owner_id.into(),
			service_name: config.fields.service_name.clone(),
			env_name: config.fields.env_name.clone(),
			data: config.fields.data.clone(),
			version: config.version,
			created_at: config.created_at,
			updated_at: config.updated_at,
		});
		Ok(id)
	}

	async fn find_config(
		&self,
		owner_id: &str,
		service_name: &str,
		env_name: &str,
	) -> CmResult<Option<ConfigRecord>> {
		Ok(self
			.records
			.lock()
			.iter()
			.find(|r| {
				r.owner_id.as_ref() == owner_id
					&& r.service_name.as_ref() == service_name
					&& r.env_name.as_ref() == env_name
			})
			.cloned())
	}

	async fn read_config(&self, id: &str) -> CmResult<Option<ConfigRecord>> {
		check_id(id)?;
		Ok(self.records.lock().iter().find(|r| r.id.as_ref() == id).cloned())
	}

	async fn list_configs(&self, opts: &ListConfigOptions<'_>) -> CmResult<Vec<ConfigRecord>> {
		Ok(self
			.records
			.lock()
			.iter()
			.filter(|r| opts.owner_id.is_none_or(|o| r.owner_id.as_ref() == o))
			.filter(|r| opts.service_name.is_none_or(|s| r.service_name.as_ref() == s))
			.filter(|r| opts.env_name.is_none_or(|e| r.env_name.as_ref() == e))
			.cloned()
			.collect())
	}

	async fn update_config(
		&self,
		id: &str,
		update: &ConfigUpdate,
		expected_version: Option<u32>,
	) -> CmResult<u64> {
		let mut records = self.records.lock();
		let Some(pos) = records
			.iter()
			.position(|r| r.id.as_ref() == id && expected_version.is_none_or(|v| r.version == v))
		else {
			return Ok(0);
		};
		let owner_id = records[pos].owner_id.clone();
		if records.iter().any(|r| {
			r.id.as_ref() != id
				&& r.owner_id == owner_id
				&& r.service_name == update.fields.service_name
				&& r.env_name == update.fields.env_name
		}) {
			return Err(Error::Conflict("duplicate".into()));
		}
		let rec = &mut records[pos];
		rec.service_name = update.fields.service_name.clone();
		rec.env_name = update.fields.env_name.clone();
		rec.data = update.fields.data.clone();
		rec.version = update.version;
		rec.updated_at = update.updated_at;
		Ok(1)
	}

	async fn delete_config(&self, id: &str) -> CmResult<u64> {
		let mut records = self.records.lock();
		let before = records.len();
		records.retain(|r| r.id.as_ref() != id);
		Ok((before - records.len()) as u64)
	}

	async fn list_distinct(&self, field: DistinctField) -> CmResult<Vec<Box<str>>> {
		let mut values: Vec<Box<str>> = self
			.records
			.lock()
			.iter()
			.map(|r| match field {
				DistinctField::ServiceName => r.service_name.clone(),
				DistinctField::EnvName => r.env_name.clone(),
			})
			.collect();
		values.sort();
		values.dedup();
		Ok(values)
	}
}

/// Store whose every call fails with the configured error, or hangs
#[derive(Debug)]
enum BrokenAdapter {
	Unavailable,
	Unclassified,
	Hanging,
}

impl BrokenAdapter {
	async fn fail<T>(&self) -> CmResult<T> {
		match self {
			BrokenAdapter::Unavailable => Err(Error::StoreUnavailable),
			BrokenAdapter::Unclassified => Err(Error::DbError),
			BrokenAdapter::Hanging => {
				tokio::time::sleep(Duration::from_secs(3600)).await;
				Err(Error::DbError)
			}
		}
	}
}

#[async_trait]
impl ConfigAdapter for BrokenAdapter {
	fn check_id(&self, id: &str) -> CmResult<()> {
		check_id(id)
	}
	async fn insert_config(&self, _config: &NewConfig<'_>) -> CmResult<Box<str>> {
		self.fail().await
	}
	async fn find_config(&self, _o: &str, _s: &str, _e: &str) -> CmResult<Option<ConfigRecord>> {
		self.fail().await
	}
	async fn read_config(&self, _id: &str) -> CmResult<Option<ConfigRecord>> {
		self.fail().await
	}
	async fn list_configs(&self, _opts: &ListConfigOptions<'_>) -> CmResult<Vec<ConfigRecord>> {
		self.fail().await
	}
	async fn update_config(&self, _id: &str, _u: &ConfigUpdate, _v: Option<u32>) -> CmResult<u64> {
		self.fail().await
	}
	async fn delete_config(&self, _id: &str) -> CmResult<u64> {
		self.fail().await
	}
	async fn list_distinct(&self, _field: DistinctField) -> CmResult<Vec<Box<str>>> {
		self.fail().await
	}
}

/// Memory store where a competing writer bumps the version right before each update
#[derive(Debug, Default)]
struct RacingAdapter {
	inner: MemoryAdapter,
}

#[async_trait]
impl ConfigAdapter for RacingAdapter {
	fn check_id(&self, id: &str) -> CmResult<()> {
		self.inner.check_id(id)
	}
	async fn insert_config(&self, config: &NewConfig<'_>) -> CmResult<Box<str>> {
		self.inner.insert_config(config).await
	}
	async fn find_config(&self, o: &str, s: &str, e: &str) -> CmResult<Option<ConfigRecord>> {
		self.inner.find_config(o, s, e).await
	}
	async fn read_config(&self, id: &str) -> CmResult<Option<ConfigRecord>> {
		self.inner.read_config(id).await
	}
	async fn list_configs(&self, opts: &ListConfigOptions<'_>) -> CmResult<Vec<ConfigRecord>> {
		self.inner.list_configs(opts).await
	}
	async fn update_config(&self, id: &str, u: &ConfigUpdate, v: Option<u32>) -> CmResult<u64> {
		for rec in self.inner.records.lock().iter_mut().filter(|r| r.id.as_ref() == id) {
			rec.version += 1;
		}
		self.inner.update_config(id, u, v).await
	}
	async fn delete_config(&self, id: &str) -> CmResult<u64> {
		self.inner.delete_config(id).await
	}
	async fn list_distinct(&self, field: DistinctField) -> CmResult<Vec<Box<str>>> {
		self.inner.list_distinct(field).await
	}
}

/// Memory store whose lookup by names never sees anything, as when two creates both pass the
/// existence check before either inserts
#[derive(Debug, Default)]
struct BlindLookupAdapter {
	inner: MemoryAdapter,
}

#[async_trait]
impl ConfigAdapter for BlindLookupAdapter {
	fn check_id(&self, id: &str) -> CmResult<()> {
		self.inner.check_id(id)
	}
	async fn insert_config(&self, config: &NewConfig<'_>) -> CmResult<Box<str>> {
		self.inner.insert_config(config).await
	}
	async fn find_config(&self, _o: &str, _s: &str, _e: &str) -> CmResult<Option<ConfigRecord>> {
		Ok(None)
	}
	async fn read_config(&self, id: &str) -> CmResult<Option<ConfigRecord>> {
		self.inner.read_config(id).await
	}
	async fn list_configs(&self, opts: &ListConfigOptions<'_>) -> CmResult<Vec<ConfigRecord>> {
		self.inner.list_configs(opts).await
	}
	async fn update_config(&self, id: &str, u: &ConfigUpdate, v: Option<u32>) -> CmResult<u64> {
		self.inner.update_config(id, u, v).await
	}
	async fn delete_config(&self, id: &str) -> CmResult<u64> {
		self.inner.delete_config(id).await
	}
	async fn list_distinct(&self, field: DistinctField) -> CmResult<Vec<Box<str>>> {
		self.inner.list_distinct(field).await
	}
}

/// Service over a fresh memory store with a clock that advances one second per reading
fn service() -> ConfigService {
	let clock = Arc::new(AtomicI64::new(1_700_000_000));
	ConfigService::new(Arc::new(MemoryAdapter::default()))
		.with_clock(move || Timestamp(clock.fetch_add(1, Ordering::SeqCst)))
}

fn payload(service_name: &str, env_name: &str, host: &str) -> ConfigPayload {
	serde_json::from_value(json!({
		"service_name": service_name,
		"env_name": env_name,
		"data": { "DB_HOST": host }
	}))
	.unwrap()
}

#[tokio::test]
async fn test_payments_api_example() {
	let svc = service();

	let created = svc.create("u1", &payload("payments-api", "prod", "10.0.0.1")).await.unwrap();
	assert_eq!(created.version, 1);

	let updated = svc.update(&created.id, &payload("payments-api", "prod", "10.0.0.2")).await.unwrap();
	assert_eq!(updated.version, 2);
	assert_eq!(updated.modified_count, 1);

	let config = svc.get_by_id(&created.id).await.unwrap();
	assert_eq!(config.data["DB_HOST"], "10.0.0.2");
	assert_eq!(config.data.len(), 1);
}

#[tokio::test]
async fn test_create_then_get() {
	let svc = service();
	let created = svc.create("u1", &payload("api", "dev", "localhost")).await.unwrap();

	let config = svc.get_by_id(&created.id).await.unwrap();
	assert_eq!(config.id, created.id);
	assert_eq!(config.owner_id.as_ref(), "u1");
	assert_eq!(config.version, 1);
	assert_eq!(config.created_at, config.updated_at);
}

#[tokio::test]
async fn test_update_bumps_version_and_keeps_created_at() {
	let svc = service();
	let created = svc.create("u1", &payload("api", "dev", "a")).await.unwrap();
	let before = svc.get_by_id(&created.id).await.unwrap();

	for (i, host) in ["b", "c", "d"].iter().enumerate() {
		let updated = svc.update(&created.id, &payload("api", "dev", host)).await.unwrap();
		assert_eq!(updated.version, before.version + 1 + i as u32);
	}

	let after = svc.get_by_id(&created.id).await.unwrap();
	assert_eq!(after.version, 4);
	assert_eq!(after.created_at, before.created_at);
	assert!(after.updated_at >= before.updated_at);
}

#[tokio::test]
async fn test_duplicate_create_conflicts() {
	let svc = service();
	svc.create("u1", &payload("api", "prod", "a")).await.unwrap();

	let res = svc.create("u1", &payload("api", "prod", "b")).await;
	assert!(matches!(res, Err(Error::Conflict(_))));

	// Same names under another owner are fine
	assert!(svc.create("u2", &payload("api", "prod", "b")).await.is_ok());
}

#[tokio::test]
async fn test_concurrent_creates_one_conflicts() {
	let svc = ConfigService::new(Arc::new(BlindLookupAdapter::default()));

	let (first, second) = (payload("api", "prod", "a"), payload("api", "prod", "b"));
	let (a, b) = tokio::join!(svc.create("u1", &first), svc.create("u1", &second));
	let (created, rejected) = match (a, b) {
		(Ok(created), rejected @ Err(_)) | (rejected @ Err(_), Ok(created)) => (created, rejected),
		(a, b) => panic!("expected exactly one create to succeed, got {:?} and {:?}", a, b),
	};
	assert_eq!(created.version, 1);
	assert!(matches!(rejected, Err(Error::Conflict(_))));

	let stored = svc.list_all(Some("u1")).await.unwrap();
	assert_eq!(stored.len(), 1);
	assert_eq!(stored[0].id, created.id);
}

#[tokio::test]
async fn test_update_into_taken_triple_conflicts() {
	let svc = service();
	svc.create("u1", &payload("api", "prod", "a")).await.unwrap();
	let dev = svc.create("u1", &payload("api", "dev", "b")).await.unwrap();

	let res = svc.update(&dev.id, &payload("api", "prod", "c")).await;
	assert!(matches!(res, Err(Error::Conflict(_))));

	let after = svc.get_by_id(&dev.id).await.unwrap();
	assert_eq!(after.version, 1);
	assert_eq!(after.env_name.as_ref(), "dev");
	assert_eq!(after.data["DB_HOST"], "b");
}

#[tokio::test]
async fn test_search_empty_is_not_found_but_list_is_not() {
	let svc = service();

	let res = svc.get_by_service_env("u1", "api", "prod").await;
	assert!(matches!(res, Err(Error::NotFound(_))));

	let list = svc.list_all(Some("u1")).await.unwrap();
	assert!(list.is_empty());
}

#[tokio::test]
async fn test_search_is_owner_scoped() {
	let svc = service();
	svc.create("u1", &payload("api", "prod", "a")).await.unwrap();
	svc.create("u1", &payload("api", "dev", "b")).await.unwrap();

	let found = svc.get_by_service_env("u1", "api", "prod").await.unwrap();
	assert_eq!(found.len(), 1);
	assert_eq!(found[0].env_name.as_ref(), "prod");

	let res = svc.get_by_service_env("u2", "api", "prod").await;
	assert!(matches!(res, Err(Error::NotFound(_))));

	let res = svc.get_by_service_env("u1", " ", "prod").await;
	assert!(matches!(res, Err(Error::ValidationError(_))));
}

#[tokio::test]
async fn test_list_all_scoping() {
	let svc = service();
	svc.create("u1", &payload("api", "prod", "a")).await.unwrap();
	svc.create("u2", &payload("web", "prod", "b")).await.unwrap();

	assert_eq!(svc.list_all(Some("u1")).await.unwrap().len(), 1);
	assert_eq!(svc.list_all(None).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_delete_then_get_is_not_found() {
	let svc = service();
	let created = svc.create("u1", &payload("api", "prod", "a")).await.unwrap();

	let deleted = svc.delete(&created.id).await.unwrap();
	assert_eq!(deleted.deleted_count, 1);

	assert!(matches!(svc.get_by_id(&created.id).await, Err(Error::NotFound(_))));
	assert!(matches!(svc.delete(&created.id).await, Err(Error::NotFound(_))));
	assert!(matches!(
		svc.update(&created.id, &payload("api", "prod", "b")).await,
		Err(Error::NotFound(_))
	));
}

#[tokio::test]
async fn test_malformed_id_is_validation_error() {
	let svc = service();

	assert!(matches!(svc.get_by_id("not-an-id").await, Err(Error::ValidationError(_))));
	assert!(matches!(svc.delete("123").await, Err(Error::ValidationError(_))));
	assert!(matches!(
		svc.update("zzz", &payload("api", "prod", "a")).await,
		Err(Error::ValidationError(_))
	));
}

#[tokio::test]
async fn test_update_rejects_partial_payload() {
	let svc = service();
	let created = svc.create("u1", &payload("api", "prod", "a")).await.unwrap();

	let partial: ConfigPayload =
		serde_json::from_value(json!({ "data": { "DB_HOST": "b" } })).unwrap();
	let res = svc.update(&created.id, &partial).await;
	assert!(matches!(res, Err(Error::ValidationError(_))));

	assert_eq!(svc.get_by_id(&created.id).await.unwrap().version, 1);
}

#[tokio::test]
async fn test_lost_update_race_conflicts() {
	let svc = ConfigService::new(Arc::new(RacingAdapter::default()));
	let created = svc.create("u1", &payload("api", "prod", "a")).await.unwrap();

	let res = svc.update(&created.id, &payload("api", "prod", "b")).await;
	assert!(matches!(res, Err(Error::Conflict(_))));

	// Only the competing write landed, no version was skipped
	let config = svc.get_by_id(&created.id).await.unwrap();
	assert_eq!(config.version, 2);
	assert_eq!(config.data["DB_HOST"], "a");
}

#[tokio::test]
async fn test_distinct_listings_are_sorted_and_global() {
	let svc = service();
	svc.create("u1", &payload("web", "prod", "a")).await.unwrap();
	svc.create("u2", &payload("api", "dev", "b")).await.unwrap();
	svc.create("u2", &payload("api", "prod", "c")).await.unwrap();

	let services = svc.list_distinct_services().await.unwrap();
	assert_eq!(services, ["api", "web"].map(Box::<str>::from));

	let envs = svc.list_distinct_environments().await.unwrap();
	assert_eq!(envs, ["dev", "prod"].map(Box::<str>::from));
}

#[tokio::test]
async fn test_store_unavailable_passes_through() {
	let svc = ConfigService::new(Arc::new(BrokenAdapter::Unavailable));

	let res = svc.create("u1", &payload("api", "prod", "a")).await;
	assert!(matches!(res, Err(Error::StoreUnavailable)));
	assert!(matches!(svc.list_all(None).await, Err(Error::StoreUnavailable)));
}

#[tokio::test]
async fn test_unclassified_store_error_becomes_internal() {
	let svc = ConfigService::new(Arc::new(BrokenAdapter::Unclassified));

	let res = svc.get_by_id("65a1f0c2e4b0a1b2c3d4e5f6").await;
	assert!(matches!(res, Err(Error::Internal(_))));
}

#[tokio::test(start_paused = true)]
async fn test_store_timeout_is_unavailable() {
	let svc = ConfigService::new(Arc::new(BrokenAdapter::Hanging))
		.with_timeout(Duration::from_millis(50));

	let res = svc.list_distinct_services().await;
	assert!(matches!(res, Err(Error::StoreUnavailable)));
}

// vim: ts=4
