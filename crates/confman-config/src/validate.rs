//! Structural and content checks for configuration payloads.
//!
//! Rules are checked in a fixed order and the first failure wins. Each failure names
//! the field and the violated constraint.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use confman_types::config_adapter::ConfigFields;

use crate::prelude::*;

pub const MAX_SERVICE_NAME_LEN: usize = 100;
pub const MAX_ENV_NAME_LEN: usize = 50;
pub const MAX_DATA_KEYS: usize = 100;
pub const MAX_KEY_LEN: usize = 100;
pub const MAX_VALUE_LEN: usize = 10000;

/// Create / update request body. Updates are whole replacements, so the same shape is used.
///
/// Fields are optional here so that a missing field is reported by `validate()` with a
/// field-specific reason instead of a generic deserialization error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigPayload {
	pub service_name: Option<String>,
	pub env_name: Option<String>,
	pub data: Option<Value>,
}

fn invalid(msg: impl Into<String>) -> Error {
	Error::ValidationError(msg.into())
}

fn is_name_char(c: char) -> bool {
	c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn validate_name<'a>(field: &str, value: Option<&'a str>, max_len: usize) -> CmResult<&'a str> {
	let value = value.ok_or_else(|| invalid(format!("{} is required", field)))?;
	if value.trim().is_empty() {
		return Err(invalid(format!("{} must not be blank", field)));
	}
	if value.chars().count() > max_len {
		return Err(invalid(format!("{} must be at most {} characters", field, max_len)));
	}
	if !value.chars().all(is_name_char) {
		return Err(invalid(format!(
			"{} may only contain letters, digits, '-' and '_'",
			field
		)));
	}
	Ok(value)
}

fn validate_data(data: Option<&Value>) -> CmResult<BTreeMap<String, String>> {
	let Some(Value::Object(map)) = data else {
		return Err(invalid("data must be an object mapping keys to string values"));
	};
	if map.is_empty() {
		return Err(invalid("data must contain at least one entry"));
	}
	if map.len() > MAX_DATA_KEYS {
		return Err(invalid(format!("data must have at most {} keys", MAX_DATA_KEYS)));
	}

	for key in map.keys() {
		if key.trim().is_empty() {
			return Err(invalid("data keys must not be blank"));
		}
		if key.chars().count() > MAX_KEY_LEN {
			return Err(invalid(format!(
				"data key '{}…' exceeds {} characters",
				key.chars().take(20).collect::<String>(),
				MAX_KEY_LEN
			)));
		}
	}

	let mut res = BTreeMap::new();
	for (key, value) in map {
		let Value::String(value) = value else {
			return Err(invalid(format!("data value of '{}' must be a string", key)));
		};
		if value.chars().count() > MAX_VALUE_LEN {
			return Err(invalid(format!(
				"data value of '{}' must be at most {} characters",
				key, MAX_VALUE_LEN
			)));
		}
		res.insert(key.clone(), value.clone());
	}
	Ok(res)
}

/// Validates a create / update payload and returns the typed fields
pub fn validate(payload: &ConfigPayload) -> CmResult<ConfigFields> {
	let service_name =
		validate_name("service_name", payload.service_name.as_deref(), MAX_SERVICE_NAME_LEN)?;
	let env_name = validate_name("env_name", payload.env_name.as_deref(), MAX_ENV_NAME_LEN)?;
	let data = validate_data(payload.data.as_ref())?;

	Ok(ConfigFields { service_name: service_name.into(), env_name: env_name.into(), data })
}

/// Checks the parameters of a targeted (service, environment) lookup
pub fn validate_lookup(service_name: &str, env_name: &str) -> CmResult<()> {
	if service_name.trim().is_empty() {
		return Err(invalid("service_name must not be blank"));
	}
	if env_name.trim().is_empty() {
		return Err(invalid("env_name must not be blank"));
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn payload(value: Value) -> ConfigPayload {
		serde_json::from_value(value).unwrap()
	}

	fn reason(res: CmResult<ConfigFields>) -> String {
		match res {
			Err(Error::ValidationError(msg)) => msg,
			other => panic!("expected validation error, got {:?}", other),
		}
	}

	#[test]
	fn test_valid_payload() {
		let fields = validate(&payload(json!({
			"service_name": "payments-api",
			"env_name": "prod",
			"data": { "DB_HOST": "10.0.0.1", "DB_PORT": "5432" }
		})))
		.unwrap();

		assert_eq!(fields.service_name.as_ref(), "payments-api");
		assert_eq!(fields.env_name.as_ref(), "prod");
		assert_eq!(fields.data.len(), 2);
		assert_eq!(fields.data["DB_HOST"], "10.0.0.1");
	}

	#[test]
	fn test_unknown_fields_are_rejected() {
		let res = serde_json::from_value::<ConfigPayload>(json!({
			"service_name": "a", "env_name": "b", "data": { "k": "v" }, "version": 7
		}));
		assert!(res.is_err());
	}

	#[test]
	fn test_distinct_reasons() {
		let empty_data = reason(validate(&payload(json!({
			"service_name": "api", "env_name": "prod", "data": {}
		}))));
		let space_in_name = reason(validate(&payload(json!({
			"service_name": "payments api", "env_name": "prod", "data": { "k": "v" }
		}))));
		let long_value = reason(validate(&payload(json!({
			"service_name": "api", "env_name": "prod", "data": { "k": "x".repeat(10001) }
		}))));
		let mut many = serde_json::Map::new();
		for i in 0..101 {
			many.insert(format!("KEY_{}", i), Value::String("v".into()));
		}
		let too_many_keys = reason(validate(&payload(json!({
			"service_name": "api", "env_name": "prod", "data": many
		}))));

		assert!(empty_data.contains("data"));
		assert!(space_in_name.contains("service_name"));
		assert!(long_value.contains("'k'"));
		assert!(too_many_keys.contains("100 keys"));

		let all = [&empty_data, &space_in_name, &long_value, &too_many_keys];
		for (i, a) in all.iter().enumerate() {
			for b in all.iter().skip(i + 1) {
				assert_ne!(a, b);
			}
		}
	}

	#[test]
	fn test_rule_order() {
		// Both names are broken, service_name is reported first
		let msg = reason(validate(&payload(json!({
			"service_name": "", "env_name": "", "data": {}
		}))));
		assert!(msg.starts_with("service_name"));

		let msg = reason(validate(&payload(json!({
			"service_name": "api", "env_name": "a".repeat(51), "data": {}
		}))));
		assert!(msg.starts_with("env_name"));
	}

	#[test]
	fn test_missing_fields() {
		let msg = reason(validate(&payload(json!({ "env_name": "prod", "data": { "k": "v" } }))));
		assert_eq!(msg, "service_name is required");

		let msg = reason(validate(&payload(json!({ "service_name": "api", "env_name": "prod" }))));
		assert!(msg.starts_with("data must be an object"));
	}

	#[test]
	fn test_length_limits() {
		let mut data = serde_json::Map::new();
		data.insert("k".repeat(100), Value::String("v".repeat(10000)));
		let ok = validate(&payload(json!({
			"service_name": "s".repeat(100),
			"env_name": "e".repeat(50),
			"data": data
		})));
		assert!(ok.is_ok());

		let msg = reason(validate(&payload(json!({
			"service_name": "s".repeat(101), "env_name": "prod", "data": { "k": "v" }
		}))));
		assert!(msg.contains("at most 100"));

		let mut data = serde_json::Map::new();
		data.insert("k".repeat(101), Value::String("v".into()));
		let msg = reason(validate(&payload(json!({
			"service_name": "api", "env_name": "prod", "data": data
		}))));
		assert!(msg.contains("exceeds 100"));
	}

	#[test]
	fn test_non_string_value() {
		let msg = reason(validate(&payload(json!({
			"service_name": "api", "env_name": "prod", "data": { "PORT": 5432 }
		}))));
		assert_eq!(msg, "data value of 'PORT' must be a string");
	}

	#[test]
	fn test_blank_key() {
		let msg = reason(validate(&payload(json!({
			"service_name": "api", "env_name": "prod", "data": { "  ": "v" }
		}))));
		assert_eq!(msg, "data keys must not be blank");
	}

	#[test]
	fn test_validate_lookup() {
		assert!(validate_lookup("api", "prod").is_ok());
		assert!(matches!(validate_lookup(" ", "prod"), Err(Error::ValidationError(_))));
		assert!(matches!(validate_lookup("api", ""), Err(Error::ValidationError(_))));
	}
}

// vim: ts=4
