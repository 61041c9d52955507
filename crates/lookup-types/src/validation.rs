//! Schema checks for per-transport settings.
//!
//! Each transport reads its settings from its own TOML table under
//! `transport.implementations.<name>`. A [`Schema`] lists the keys such a table
//! may hold, and rejects missing, mistyped, out-of-range and unknown keys
//! before the transport is built.

use std::fmt;
use thiserror::Error;

/// Reasons a settings table can be rejected.
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
	/// A key no field of the schema accepts, usually a typo.
	#[error("Unknown field '{0}'")]
	UnknownField(String),
}

/// Accepted shape of a settings value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
	String,
	/// Integer within the inclusive bounds, when given.
	Integer { min: Option<i64>, max: Option<i64> },
	/// Nested table; its contents are up to the transport.
	Table,
}

impl fmt::Display for FieldType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			FieldType::String => f.write_str("string"),
			FieldType::Integer { .. } => f.write_str("integer"),
			FieldType::Table => f.write_str("table"),
		}
	}
}

impl FieldType {
	fn check(&self, name: &str, value: &toml::Value) -> Result<(), ValidationError> {
		let matches = match self {
			FieldType::String => value.is_str(),
			FieldType::Integer { .. } => value.is_integer(),
			FieldType::Table => value.is_table(),
		};
		if !matches {
			return Err(ValidationError::TypeMismatch {
				field: name.to_string(),
				expected: self.to_string(),
				actual: value.type_str().to_string(),
			});
		}

		if let (FieldType::Integer { min, max }, Some(n)) = (self, value.as_integer()) {
			let out_of_range = |message: String| ValidationError::InvalidValue {
				field: name.to_string(),
				message,
			};
			match (min, max) {
				(Some(min), _) if n < *min => {
					return Err(out_of_range(format!("{} is below the minimum of {}", n, min)));
				},
				(_, Some(max)) if n > *max => {
					return Err(out_of_range(format!("{} is above the maximum of {}", n, max)));
				},
				_ => {},
			}
		}

		Ok(())
	}
}

/// Extra check run on a value once its type is known to be right.
pub type FieldValidator = Box<dyn Fn(&toml::Value) -> Result<(), String> + Send + Sync>;

/// One key of a settings table.
pub struct Field {
	pub name: String,
	pub field_type: FieldType,
	pub validator: Option<FieldValidator>,
}

impl fmt::Debug for Field {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Field")
			.field("name", &self.name)
			.field("field_type", &self.field_type)
			.field("has_validator", &self.validator.is_some())
			.finish()
	}
}

impl Field {
	pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
		Self {
			name: name.into(),
			field_type,
			validator: None,
		}
	}

	/// Attaches a value check; its error message is reported as an invalid value.
	pub fn with_validator<F>(mut self, validator: F) -> Self
	where
		F: Fn(&toml::Value) -> Result<(), String> + Send + Sync + 'static,
	{
		self.validator = Some(Box::new(validator));
		self
	}

	fn check(&self, value: &toml::Value) -> Result<(), ValidationError> {
		self.field_type.check(&self.name, value)?;

		match &self.validator {
			Some(validator) => validator(value).map_err(|message| ValidationError::InvalidValue {
				field: self.name.clone(),
				message,
			}),
			None => Ok(()),
		}
	}
}

/// Keys a settings table must and may hold.
#[derive(Debug)]
pub struct Schema {
	pub required: Vec<Field>,
	pub optional: Vec<Field>,
}

impl Schema {
	pub fn new(required: Vec<Field>, optional: Vec<Field>) -> Self {
		Self { required, optional }
	}

	fn field(&self, name: &str) -> Option<&Field> {
		self.required
			.iter()
			.chain(&self.optional)
			.find(|field| field.name == name)
	}

	/// Checks `config` against the schema, reporting the first problem found.
	///
	/// Required fields are checked first, in declaration order, then the keys
	/// actually present.
	pub fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let table = config.as_table().ok_or_else(|| ValidationError::TypeMismatch {
			field: "root".to_string(),
			expected: FieldType::Table.to_string(),
			actual: config.type_str().to_string(),
		})?;

		if let Some(missing) = self.required.iter().find(|f| !table.contains_key(&f.name)) {
			return Err(ValidationError::MissingField(missing.name.clone()));
		}

		for (key, value) in table {
			let field = self
				.field(key)
				.ok_or_else(|| ValidationError::UnknownField(key.clone()))?;
			field.check(value)?;
		}

		Ok(())
	}
}

/// Settings check provided by each transport implementation.
pub trait ConfigSchema: Send + Sync {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError>;
}

#[cfg(test)]
mod tests {
	use super::*;

	fn parse(input: &str) -> toml::Value {
		toml::from_str(input).unwrap()
	}

	fn http_like() -> Schema {
		Schema::new(
			vec![Field::new("base_url", FieldType::String)],
			vec![Field::new(
				"timeout_seconds",
				FieldType::Integer {
					min: Some(1),
					max: Some(300),
				},
			)],
		)
	}

	#[test]
	fn test_required_field_missing() {
		let result = http_like().validate(&parse("timeout_seconds = 5"));
		assert!(matches!(result, Err(ValidationError::MissingField(f)) if f == "base_url"));
	}

	#[test]
	fn test_type_mismatch() {
		let err = http_like().validate(&parse("base_url = 8081")).unwrap_err();
		assert_eq!(
			err.to_string(),
			"Type mismatch for field 'base_url': expected string, got integer"
		);
	}

	#[test]
	fn test_integer_bounds() {
		let schema = http_like();
		let with_timeout = |t: &str| parse(&format!("base_url = \"x\"\ntimeout_seconds = {}", t));

		assert!(schema.validate(&with_timeout("1")).is_ok());
		assert!(schema.validate(&with_timeout("300")).is_ok());
		assert!(schema
			.validate(&with_timeout("0"))
			.unwrap_err()
			.to_string()
			.contains("below the minimum of 1"));
		assert!(schema
			.validate(&with_timeout("301"))
			.unwrap_err()
			.to_string()
			.contains("above the maximum of 300"));
		assert!(schema.validate(&with_timeout("\"30\"")).is_err());
	}

	#[test]
	fn test_unknown_field() {
		let result = http_like().validate(&parse("base_url = \"x\"\nbase-url = \"y\""));
		assert!(matches!(result, Err(ValidationError::UnknownField(f)) if f == "base-url"));
	}

	#[test]
	fn test_root_must_be_table() {
		let err = http_like().validate(&toml::Value::Integer(1)).unwrap_err();
		assert!(matches!(err, ValidationError::TypeMismatch { field, .. } if field == "root"));
	}

	#[test]
	fn test_custom_validator() {
		let schema = Schema::new(
			vec![
				Field::new("base_url", FieldType::String).with_validator(|value| {
					match value.as_str() {
						Some(url) if url.starts_with("http") => Ok(()),
						_ => Err("must be an http(s) URL".to_string()),
					}
				}),
			],
			vec![],
		);
		assert!(schema.validate(&parse("base_url = \"http://localhost:8081\"")).is_ok());
		let err = schema.validate(&parse("base_url = \"ftp://x\"")).unwrap_err();
		assert!(err.to_string().contains("must be an http(s) URL"));
	}
}
