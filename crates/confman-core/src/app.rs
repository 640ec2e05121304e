//! App state type

use std::{collections::HashMap, sync::Arc, time::Duration};

use crate::extensions::Extensions;
use crate::prelude::*;

use confman_types::auth_adapter::{AuthAdapter, OAuthProvider};
use confman_types::config_adapter::ConfigAdapter;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct AppState {
	pub opts: AppBuilderOpts,

	pub auth_adapter: Arc<dyn AuthAdapter>,
	pub config_adapter: Arc<dyn ConfigAdapter>,
	/// Registered OAuth providers by name
	pub oauth_providers: HashMap<Box<str>, Arc<dyn OAuthProvider>>,

	// Type-erased extension map for feature-specific state
	pub extensions: Extensions,
}

impl AppState {
	/// Get a registered extension by type. Returns error if not found.
	pub fn ext<T: Send + Sync + 'static>(&self) -> CmResult<&T> {
		self.extensions.get::<T>().ok_or_else(|| {
			Error::Internal(format!("Extension {} not registered", std::any::type_name::<T>()))
		})
	}

	/// Unknown providers read as absent routes
	pub fn oauth_provider(&self, name: &str) -> CmResult<&Arc<dyn OAuthProvider>> {
		self.oauth_providers
			.get(name)
			.ok_or_else(|| Error::NotFound(format!("Unknown OAuth provider '{}'", name)))
	}
}

impl std::fmt::Debug for AppState {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AppState")
			.field("opts", &self.opts)
			.field("auth_adapter", &self.auth_adapter)
			.field("config_adapter", &self.config_adapter)
			.field("oauth_providers", &self.oauth_providers.keys().collect::<Vec<_>>())
			.finish_non_exhaustive()
	}
}

pub type App = Arc<AppState>;

#[derive(Default)]
pub struct Adapters {
	pub auth_adapter: Option<Arc<dyn AuthAdapter>>,
	pub config_adapter: Option<Arc<dyn ConfigAdapter>>,
}

#[derive(Debug)]
pub struct AppBuilderOpts {
	pub listen: Box<str>,
	/// Upper bound for a single document store call
	pub store_timeout: Duration,
}

// vim: ts=4
