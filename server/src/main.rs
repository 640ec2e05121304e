use std::{env, path::PathBuf, sync::Arc, time::Duration};

use confman::AppBuilder;
use confman::prelude::*;
use confman_auth_adapter_sqlite::AuthAdapterSqlite;
use confman_config_adapter_sqlite::ConfigAdapterSqlite;

const DEFAULT_STORE_TIMEOUT_SECS: u64 = 10;

pub struct Config {
	pub listen: String,
	pub db_dir: PathBuf,
	pub jwt_secret: Option<String>,
	pub store_timeout: Duration,
}

impl Config {
	fn from_env() -> Self {
		let store_timeout = match env::var("STORE_TIMEOUT_SECS") {
			Ok(secs) => secs.parse().unwrap_or_else(|_| {
				warn!("Invalid STORE_TIMEOUT_SECS '{}', using {}", secs, DEFAULT_STORE_TIMEOUT_SECS);
				DEFAULT_STORE_TIMEOUT_SECS
			}),
			Err(_) => DEFAULT_STORE_TIMEOUT_SECS,
		};

		Config {
			listen: env::var("LISTEN").unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
			db_dir: PathBuf::from(env::var("DB_DIR").unwrap_or_else(|_| "./data".to_string())),
			jwt_secret: env::var("JWT_SECRET").ok().filter(|secret| !secret.is_empty()),
			store_timeout: Duration::from_secs(store_timeout),
		}
	}
}

#[tokio::main]
async fn main() -> CmResult<()> {
	let mut builder = AppBuilder::new();
	let config = Config::from_env();

	tokio::fs::create_dir_all(&config.db_dir).await?;
	let auth_adapter =
		Arc::new(AuthAdapterSqlite::new(&config.db_dir, config.jwt_secret.as_deref()).await?);
	let config_adapter = Arc::new(ConfigAdapterSqlite::new(&config.db_dir).await?);

	builder
		.listen(config.listen)
		.store_timeout(config.store_timeout)
		.auth_adapter(auth_adapter)
		.config_adapter(config_adapter);
	builder.run().await
}

// vim: ts=4
