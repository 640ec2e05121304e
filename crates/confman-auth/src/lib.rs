//! Authentication subsystem: registration, password login and OAuth sign-in.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod handler;
pub mod oauth;
pub mod validate;

mod prelude;

pub use handler::Login;
pub use oauth::{OAuthStates, oauth_login};

// vim: ts=4
