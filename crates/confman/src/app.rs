//! App builder - constructs and runs the Confman application

use std::{collections::HashMap, sync::Arc, time::Duration};

use crate::auth_adapter::{AuthAdapter, OAuthProvider};
use crate::config_adapter::ConfigAdapter;
use crate::prelude::*;
use crate::routes;
use confman_auth::OAuthStates;
use confman_config::ConfigService;
use confman_config::service::DEFAULT_STORE_TIMEOUT;
pub use confman_core::app::{Adapters, App, AppBuilderOpts, AppState, VERSION};
use confman_core::extensions::Extensions;

pub struct AppBuilder {
	opts: AppBuilderOpts,
	adapters: Adapters,
	oauth_providers: HashMap<Box<str>, Arc<dyn OAuthProvider>>,
}

impl AppBuilder {
	pub fn new() -> Self {
		// A second builder in the same process keeps the first subscriber
		let _ = tracing_subscriber::fmt()
			.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
			.with_target(false)
			.try_init();
		AppBuilder {
			opts: AppBuilderOpts {
				listen: "127.0.0.1:8080".into(),
				store_timeout: DEFAULT_STORE_TIMEOUT,
			},
			adapters: Adapters::default(),
			oauth_providers: HashMap::new(),
		}
	}

	// Opts
	pub fn listen(&mut self, listen: impl Into<Box<str>>) -> &mut Self {
		self.opts.listen = listen.into();
		self
	}
	pub fn store_timeout(&mut self, store_timeout: Duration) -> &mut Self {
		self.opts.store_timeout = store_timeout;
		self
	}

	// Adapters
	pub fn auth_adapter(&mut self, auth_adapter: Arc<dyn AuthAdapter>) -> &mut Self {
		self.adapters.auth_adapter = Some(auth_adapter);
		self
	}
	pub fn config_adapter(&mut self, config_adapter: Arc<dyn ConfigAdapter>) -> &mut Self {
		self.adapters.config_adapter = Some(config_adapter);
		self
	}
	pub fn oauth_provider(&mut self, provider: Arc<dyn OAuthProvider>) -> &mut Self {
		self.oauth_providers.insert(provider.name().into(), provider);
		self
	}

	/// Assembles the app state. Fails when a required adapter is missing.
	pub fn build(self) -> CmResult<App> {
		let Some(auth_adapter) = self.adapters.auth_adapter else {
			error!("FATAL: No auth adapter configured");
			return Err(Error::Internal("No auth adapter configured".to_string()));
		};
		let Some(config_adapter) = self.adapters.config_adapter else {
			error!("FATAL: No config adapter configured");
			return Err(Error::Internal("No config adapter configured".to_string()));
		};

		let mut extensions = Extensions::new();
		extensions.insert(
			ConfigService::new(config_adapter.clone()).with_timeout(self.opts.store_timeout),
		);
		extensions.insert(OAuthStates::new());

		for name in self.oauth_providers.keys() {
			info!("OAuth provider registered: {}", name);
		}

		Ok(Arc::new(AppState {
			opts: self.opts,
			auth_adapter,
			config_adapter,
			oauth_providers: self.oauth_providers,
			extensions,
		}))
	}

	pub async fn run(self) -> CmResult<()> {
		info!("Confman V{}", VERSION);

		let app = self.build()?;
		let listen = app.opts.listen.clone();
		let router = routes::init(app);

		let listener = tokio::net::TcpListener::bind(listen.as_ref()).await.map_err(|err| {
			error!("FATAL: Cannot listen on {}: {}", listen, err);
			Error::Internal(format!("Cannot listen on {}", listen))
		})?;
		info!("Listening on HTTP {}", listen);

		axum::serve(listener, router).await?;
		Ok(())
	}
}

impl Default for AppBuilder {
	fn default() -> Self {
		Self::new()
	}
}

// vim: ts=4
