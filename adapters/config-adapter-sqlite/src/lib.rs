//! SQLite implementation of the Confman configuration document store.
//!
//! Documents live in a single `configs` table. A unique index on
//! `(owner_id, service_name, env_name)` is the source of truth for uniqueness.

#![forbid(unsafe_code)]

mod config;
mod schema;
mod utils;

use async_trait::async_trait;
use sqlx::sqlite::{self, SqlitePool};
use std::path::Path;

use confman::{config_adapter::*, prelude::*, utils::check_id};

const DB_FILE: &str = "config.db";

#[derive(Debug)]
pub struct ConfigAdapterSqlite {
	db: SqlitePool,
}

impl ConfigAdapterSqlite {
	/// Opens (or creates) the database in the `dir` directory
	pub async fn new(dir: impl AsRef<Path>) -> CmResult<Self> {
		tokio::fs::create_dir_all(dir.as_ref()).await?;

		let opts = sqlite::SqliteConnectOptions::new()
			.filename(dir.as_ref().join(DB_FILE))
			.create_if_missing(true)
			.journal_mode(sqlite::SqliteJournalMode::Wal);
		let db = sqlite::SqlitePoolOptions::new()
			.max_connections(5)
			.connect_with(opts)
			.await
			.map_err(utils::db_err)?;

		schema::init_db(&db).await.map_err(utils::db_err)?;
		info!("Config store opened in {}", dir.as_ref().display());

		Ok(Self { db })
	}
}

#[async_trait]
impl ConfigAdapter for ConfigAdapterSqlite {
	fn check_id(&self, id: &str) -> CmResult<()> {
		check_id(id)
	}

	async fn insert_config(&self, config: &NewConfig<'_>) -> CmResult<Box<str>> {
		config::insert(&self.db, config).await
	}

	async fn find_config(
		&self,
		owner_id: &str,
		service_name: &str,
		env_name: &str,
	) -> CmResult<Option<ConfigRecord>> {
		config::find(&self.db, owner_id, service_name, env_name).await
	}

	async fn read_config(&self, id: &str) -> CmResult<Option<ConfigRecord>> {
		check_id(id)?;
		config::read(&self.db, id).await
	}

	async fn list_configs(&self, opts: &ListConfigOptions<'_>) -> CmResult<Vec<ConfigRecord>> {
		config::list(&self.db, opts).await
	}

	async fn update_config(
		&self,
		id: &str,
		update: &ConfigUpdate,
		expected_version: Option<u32>,
	) -> CmResult<u64> {
		check_id(id)?;
		config::update(&self.db, id, update, expected_version).await
	}

	async fn delete_config(&self, id: &str) -> CmResult<u64> {
		check_id(id)?;
		config::delete(&self.db, id).await
	}

	async fn list_distinct(&self, field: DistinctField) -> CmResult<Vec<Box<str>>> {
		config::list_distinct(&self.db, field).await
	}
}

// vim: ts=4
