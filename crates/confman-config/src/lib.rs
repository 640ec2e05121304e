//! Configuration documents: validation, version stamping, the config service and its
//! REST endpoints.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod handler;
pub mod service;
pub mod stamp;
pub mod validate;

mod prelude;

pub use service::{ConfigService, ConfigView};
pub use validate::ConfigPayload;

// vim: ts=4
