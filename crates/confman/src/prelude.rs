pub use crate::app::App;
pub use confman_types::prelude::*;

// vim: ts=4
