//! Schema validation for raw TOML configuration.
//!
//! The config loader checks the parsed TOML tree against a [`Schema`] before
//! deserializing it, so that a bad address or URL is reported with the full
//! dotted path of the offending field.

use alloy_primitives::Address;
use thiserror::Error;

/// Errors that can occur during configuration validation.
#[derive(Debug, Error)]
pub enum ValidationError {
	#[error("Missing required field: {0}")]
	MissingField(String),
	#[error("Invalid value for field '{field}': {message}")]
	InvalidValue { field: String, message: String },
	#[error("Type mismatch for field '{field}': expected {expected}, got {actual}")]
	TypeMismatch {
		field: String,
		expected: String,
		actual: String,
	},
}

/// Type of a configuration field.
#[derive(Debug)]
pub enum FieldType {
	String,
	Integer { min: Option<i64>, max: Option<i64> },
	Boolean,
	/// A `0x`-prefixed 20-byte hex address.
	Address,
	/// An `http://` or `https://` URL.
	Url,
	/// An array, optionally of an exact length.
	Array {
		item: Box<FieldType>,
		len: Option<usize>,
	},
	Table(Schema),
}

/// Type alias for field validator functions.
pub type FieldValidator = Box<dyn Fn(&toml::Value) -> Result<(), String> + Send + Sync>;

/// A field definition with name and type.
pub struct Field {
	pub name: String,
	pub field_type: FieldType,
	pub validator: Option<FieldValidator>,
}

impl std::fmt::Debug for Field {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Field")
			.field("name", &self.name)
			.field("field_type", &self.field_type)
			.field("validator", &self.validator.is_some())
			.finish()
	}
}

impl Field {
	/// Creates a field with the given name and expected type.
	pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
		Self {
			name: name.into(),
			field_type,
			validator: None,
		}
	}

	/// Adds a custom validator run after the type check passes.
	pub fn with_validator<F>(mut self, validator: F) -> Self
	where
		F: Fn(&toml::Value) -> Result<(), String> + Send + Sync + 'static,
	{
		self.validator = Some(Box::new(validator));
		self
	}

	fn check(&self, prefix: &str, value: &toml::Value) -> Result<(), ValidationError> {
		let path = join_path(prefix, &self.name);
		validate_field_type(&path, value, &self.field_type)?;
		if let Some(validator) = &self.validator {
			validator(value).map_err(|message| ValidationError::InvalidValue {
				field: path,
				message,
			})?;
		}
		Ok(())
	}
}

/// Schema definition with required and optional fields.
#[derive(Debug, Default)]
pub struct Schema {
	pub required: Vec<Field>,
	pub optional: Vec<Field>,
}

impl Schema {
	/// Creates a schema from required and optional fields.
	pub fn new(required: Vec<Field>, optional: Vec<Field>) -> Self {
		Self { required, optional }
	}

	/// Validates a TOML value against this schema.
	pub fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		self.validate_at("", config)
	}

	fn validate_at(&self, prefix: &str, config: &toml::Value) -> Result<(), ValidationError> {
		let table = config
			.as_table()
			.ok_or_else(|| ValidationError::TypeMismatch {
				field: if prefix.is_empty() {
					"root".to_string()
				} else {
					prefix.to_string()
				},
				expected: "table".to_string(),
				actual: config.type_str().to_string(),
			})?;

		for field in &self.required {
			let value = table
				.get(&field.name)
				.ok_or_else(|| ValidationError::MissingField(join_path(prefix, &field.name)))?;
			field.check(prefix, value)?;
		}

		for field in &self.optional {
			if let Some(value) = table.get(&field.name) {
				field.check(prefix, value)?;
			}
		}

		Ok(())
	}
}

fn join_path(prefix: &str, name: &str) -> String {
	if prefix.is_empty() {
		name.to_string()
	} else {
		format!("{}.{}", prefix, name)
	}
}

fn type_mismatch(field: &str, expected: &str, value: &toml::Value) -> ValidationError {
	ValidationError::TypeMismatch {
		field: field.to_string(),
		expected: expected.to_string(),
		actual: value.type_str().to_string(),
	}
}

/// Validates that a value matches the expected field type.
fn validate_field_type(
	path: &str,
	value: &toml::Value,
	expected_type: &FieldType,
) -> Result<(), ValidationError> {
	match expected_type {
		FieldType::String => {
			value
				.as_str()
				.ok_or_else(|| type_mismatch(path, "string", value))?;
		}
		FieldType::Integer { min, max } => {
			let int_val = value
				.as_integer()
				.ok_or_else(|| type_mismatch(path, "integer", value))?;

			if let Some(min_val) = min {
				if int_val < *min_val {
					return Err(ValidationError::InvalidValue {
						field: path.to_string(),
						message: format!("Value {} is less than minimum {}", int_val, min_val),
					});
				}
			}

			if let Some(max_val) = max {
				if int_val > *max_val {
					return Err(ValidationError::InvalidValue {
						field: path.to_string(),
						message: format!("Value {} is greater than maximum {}", int_val, max_val),
					});
				}
			}
		}
		FieldType::Boolean => {
			if !value.is_bool() {
				return Err(type_mismatch(path, "boolean", value));
			}
		}
		FieldType::Address => {
			let raw = value
				.as_str()
				.ok_or_else(|| type_mismatch(path, "address string", value))?;
			if !raw.starts_with("0x") || raw.parse::<Address>().is_err() {
				return Err(ValidationError::InvalidValue {
					field: path.to_string(),
					message: format!("'{}' is not a 0x-prefixed 20-byte address", raw),
				});
			}
		}
		FieldType::Url => {
			let raw = value
				.as_str()
				.ok_or_else(|| type_mismatch(path, "url string", value))?;
			if !(raw.starts_with("http://") || raw.starts_with("https://")) {
				return Err(ValidationError::InvalidValue {
					field: path.to_string(),
					message: "URL must start with http:// or https://".to_string(),
				});
			}
		}
		FieldType::Array { item, len } => {
			let array = value
				.as_array()
				.ok_or_else(|| type_mismatch(path, "array", value))?;

			if let Some(expected) = len {
				if array.len() != *expected {
					return Err(ValidationError::InvalidValue {
						field: path.to_string(),
						message: format!(
							"expected exactly {} entries, got {}",
							expected,
							array.len()
						),
					});
				}
			}

			for (i, entry) in array.iter().enumerate() {
				validate_field_type(&format!("{}[{}]", path, i), entry, item)?;
			}
		}
		FieldType::Table(schema) => schema.validate_at(path, value)?,
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn parse(raw: &str) -> toml::Value {
		toml::Value::Table(raw.parse::<toml::Table>().unwrap())
	}

	fn network_schema() -> Schema {
		Schema::new(
			vec![Field::new(
				"network",
				FieldType::Table(Schema::new(
					vec![
						Field::new("rpc_url", FieldType::Url),
						Field::new("composer", FieldType::Address),
					],
					vec![Field::new(
						"destination_eid",
						FieldType::Integer {
							min: Some(1),
							max: Some(u32::MAX as i64),
						},
					)],
				)),
			)],
			vec![],
		)
	}

	#[test]
	fn test_valid_config_passes() {
		let config = parse(
			r#"
			[network]
			rpc_url = "https://rpc.example"
			composer = "0xc689cA9BC4C0176b8a0d50d4733A44Af83834Ae8"
			destination_eid = 30184
			"#,
		);
		network_schema().validate(&config).unwrap();
	}

	#[test]
	fn test_nested_errors_carry_full_path() {
		let config = parse(
			r#"
			[network]
			rpc_url = "https://rpc.example"
			composer = "0x1234"
			"#,
		);
		match network_schema().validate(&config) {
			Err(ValidationError::InvalidValue { field, .. }) => {
				assert_eq!(field, "network.composer")
			}
			other => panic!("unexpected result: {:?}", other),
		}

		let config = parse("[network]\nrpc_url = \"ftp://x\"");
		assert!(matches!(
			network_schema().validate(&config),
			Err(ValidationError::InvalidValue { field, .. }) if field == "network.rpc_url"
		));
	}

	#[test]
	fn test_array_length_is_enforced() {
		let schema = Schema::new(
			vec![Field::new(
				"symbols",
				FieldType::Array {
					item: Box::new(FieldType::String),
					len: Some(2),
				},
			)],
			vec![],
		);
		let config = parse(r#"symbols = ["USDC"]"#);
		assert!(matches!(
			schema.validate(&config),
			Err(ValidationError::InvalidValue { .. })
		));
		let config = parse(r#"symbols = ["USDC", 1]"#);
		assert!(matches!(
			schema.validate(&config),
			Err(ValidationError::TypeMismatch { field, .. }) if field == "symbols[1]"
		));
	}
}
