pub use confman_core::prelude::*;

// vim: ts=4
