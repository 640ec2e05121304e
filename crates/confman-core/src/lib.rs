//! Core infrastructure for Confman.
//!
//! App state, extractors and middleware shared by the feature crates and the server.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod app;
pub mod extensions;
pub mod extract;
pub mod middleware;
pub mod prelude;

pub use app::{Adapters, App, AppBuilderOpts, AppState, VERSION};
pub use extract::{Auth, OptionalRequestId, RequestId, ValidJson};

// vim: ts=4
