//! Confman is a configuration management backend.
//!
//! # Features
//!
//! - Per-service, per-environment configuration documents
//!     - validated key/value data
//!     - version bumped on every update
//!     - one document per owner, service and environment
//! - User accounts
//!     - password registration and login
//!     - OAuth sign-in through pluggable providers
//!     - JWT access tokens
//! - Pluggable storage adapters (SQLite included)

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

// Re-export shared types and adapter traits from confman-types
pub use confman_types::auth_adapter;
pub use confman_types::config_adapter;
pub use confman_types::error;
pub use confman_types::types;
pub use confman_types::utils;

// Feature crate re-exports
pub use confman_auth as auth;
pub use confman_config as config;

// Local modules
pub mod app;
pub mod prelude;
pub mod routes;
pub mod webserver;

pub use app::AppBuilder;

// vim: ts=4
