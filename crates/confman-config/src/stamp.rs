//! Version and timestamp bookkeeping for configuration documents.
//!
//! Both functions are pure: the caller supplies `now`.

use confman_types::config_adapter::{ConfigFields, ConfigUpdate, NewConfig};

use crate::prelude::*;

/// Version of a freshly created document
pub const INITIAL_VERSION: u32 = 1;

pub fn stamp_create(owner_id: &str, fields: ConfigFields, now: Timestamp) -> NewConfig<'_> {
	NewConfig { owner_id, fields, version: INITIAL_VERSION, created_at: now, updated_at: now }
}

/// A missing previous version counts as 0, so the result is never below `INITIAL_VERSION`.
pub fn stamp_update(
	fields: ConfigFields,
	now: Timestamp,
	previous_version: Option<u32>,
) -> ConfigUpdate {
	let version = previous_version.unwrap_or(0).saturating_add(1);
	ConfigUpdate { fields, version, updated_at: now }
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::BTreeMap;

	fn fields() -> ConfigFields {
		ConfigFields {
			service_name: "payments-api".into(),
			env_name: "prod".into(),
			data: BTreeMap::from([("DB_HOST".to_string(), "10.0.0.1".to_string())]),
		}
	}

	#[test]
	fn test_stamp_create() {
		let stamped = stamp_create("u1", fields(), Timestamp(1000));
		assert_eq!(stamped.version, 1);
		assert_eq!(stamped.created_at, Timestamp(1000));
		assert_eq!(stamped.created_at, stamped.updated_at);
		assert_eq!(stamped.owner_id, "u1");
	}

	#[test]
	fn test_stamp_update() {
		let stamped = stamp_update(fields(), Timestamp(2000), Some(4));
		assert_eq!(stamped.version, 5);
		assert_eq!(stamped.updated_at, Timestamp(2000));

		let stamped = stamp_update(fields(), Timestamp(2000), None);
		assert_eq!(stamped.version, 1);
	}
}

// vim: ts=4
