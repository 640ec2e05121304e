//! Shared types, adapter traits, and core utilities for Confman.
//!
//! This crate contains the foundational types that are shared between the
//! service crates and all adapter implementations, so adapters never depend
//! on the HTTP layer.

pub mod auth_adapter;
pub mod config_adapter;
pub mod error;
pub mod prelude;
pub mod types;
pub mod utils;

// vim: ts=4
