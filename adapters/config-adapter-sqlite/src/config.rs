//! Configuration document queries

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use std::collections::BTreeMap;

use crate::utils::*;
use confman::config_adapter::*;
use confman::prelude::*;
use confman::utils::random_id;

const CONFIG_COLUMNS: &str =
	"config_id, owner_id, service_name, env_name, data, version, created_at, updated_at";

fn map_config(row: &SqliteRow) -> CmResult<ConfigRecord> {
	let data: &str = row.try_get("data").map_err(db_err)?;
	let data: BTreeMap<String, String> = serde_json::from_str(data).map_err(|err| {
		warn!("DB: corrupt config data: {}", err);
		Error::DbError
	})?;
	let version: i64 = row.try_get("version").map_err(db_err)?;

	Ok(ConfigRecord {
		id: row.try_get::<String, _>("config_id").map_err(db_err)?.into(),
		owner_id: row.try_get::<String, _>("owner_id").map_err(db_err)?.into(),
		service_name: row.try_get::<String, _>("service_name").map_err(db_err)?.into(),
		env_name: row.try_get::<String, _>("env_name").map_err(db_err)?.into(),
		data,
		version: u32::try_from(version).map_err(|_| Error::DbError)?,
		created_at: Timestamp(row.try_get("created_at").map_err(db_err)?),
		updated_at: Timestamp(row.try_get("updated_at").map_err(db_err)?),
	})
}

fn encode_data(data: &BTreeMap<String, String>) -> CmResult<String> {
	serde_json::to_string(data).map_err(|err| Error::Internal(format!("encode data: {}", err)))
}

pub(crate) async fn insert(db: &SqlitePool, config: &NewConfig<'_>) -> CmResult<Box<str>> {
	let config_id = random_id();
	let data = encode_data(&config.fields.data)?;

	sqlx::query(
		"INSERT INTO configs (config_id, owner_id, service_name, env_name, data, version,
			created_at, updated_at)
		VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
	)
	.bind(config_id.as_ref())
	.bind(config.owner_id)
	.bind(config.fields.service_name.as_ref())
	.bind(config.fields.env_name.as_ref())
	.bind(data)
	.bind(i64::from(config.version))
	.bind(config.created_at.0)
	.bind(config.updated_at.0)
	.execute(db)
	.await
	.map_err(db_err)?;

	Ok(config_id)
}

pub(crate) async fn find(
	db: &SqlitePool,
	owner_id: &str,
	service_name: &str,
	env_name: &str,
) -> CmResult<Option<ConfigRecord>> {
	let res = sqlx::query(&format!(
		"SELECT {} FROM configs WHERE owner_id = ?1 AND service_name = ?2 AND env_name = ?3",
		CONFIG_COLUMNS
	))
	.bind(owner_id)
	.bind(service_name)
	.bind(env_name)
	.fetch_optional(db)
	.await;

	map_opt(res, map_config)
}

pub(crate) async fn read(db: &SqlitePool, config_id: &str) -> CmResult<Option<ConfigRecord>> {
	let res = sqlx::query(&format!("SELECT {} FROM configs WHERE config_id = ?1", CONFIG_COLUMNS))
		.bind(config_id)
		.fetch_optional(db)
		.await;

	map_opt(res, map_config)
}

pub(crate) async fn list(
	db: &SqlitePool,
	opts: &ListConfigOptions<'_>,
) -> CmResult<Vec<ConfigRecord>> {
	let mut query: sqlx::QueryBuilder<'_, sqlx::Sqlite> =
		sqlx::QueryBuilder::new(format!("SELECT {} FROM configs WHERE 1=1", CONFIG_COLUMNS));
	if let Some(owner_id) = opts.owner_id {
		query.push(" AND owner_id = ").push_bind(owner_id);
	}
	if let Some(service_name) = opts.service_name {
		query.push(" AND service_name = ").push_bind(service_name);
	}
	if let Some(env_name) = opts.env_name {
		query.push(" AND env_name = ").push_bind(env_name);
	}
	query.push(" ORDER BY created_at, config_id LIMIT ").push_bind(i64::from(MAX_LIST_RESULTS));

	let rows = query.build().fetch_all(db).await.map_err(db_err)?;
	collect_res(rows.iter().map(map_config))
}

pub(crate) async fn update(
	db: &SqlitePool,
	config_id: &str,
	update: &ConfigUpdate,
	expected_version: Option<u32>,
) -> CmResult<u64> {
	let data = encode_data(&update.fields.data)?;

	let mut query: sqlx::QueryBuilder<'_, sqlx::Sqlite> =
		sqlx::QueryBuilder::new("UPDATE configs SET service_name = ");
	query
		.push_bind(update.fields.service_name.as_ref())
		.push(", env_name = ")
		.push_bind(update.fields.env_name.as_ref())
		.push(", data = ")
		.push_bind(data)
		.push(", version = ")
		.push_bind(i64::from(update.version))
		.push(", updated_at = ")
		.push_bind(update.updated_at.0)
		.push(" WHERE config_id = ")
		.push_bind(config_id);
	if let Some(expected_version) = expected_version {
		query.push(" AND version = ").push_bind(i64::from(expected_version));
	}

	let res = query.build().execute(db).await.map_err(db_err)?;
	Ok(res.rows_affected())
}

pub(crate) async fn delete(db: &SqlitePool, config_id: &str) -> CmResult<u64> {
	let res = sqlx::query("DELETE FROM configs WHERE config_id = ?1")
		.bind(config_id)
		.execute(db)
		.await
		.map_err(db_err)?;

	Ok(res.rows_affected())
}

pub(crate) async fn list_distinct(db: &SqlitePool, field: DistinctField) -> CmResult<Vec<Box<str>>> {
	let column = field.column();
	let values = sqlx::query_scalar::<_, String>(&format!(
		"SELECT DISTINCT {0} FROM configs ORDER BY {0}",
		column
	))
	.fetch_all(db)
	.await
	.map_err(db_err)?;

	Ok(values.into_iter().map(Box::from).collect())
}

// vim: ts=4
