//! Schema validator for flow inputs and model outputs.
//!
//! Schemas are compiled once with `jsonschema` (draft-07, the dialect
//! `schemars` emits) and reused for every call.

use crate::error::{Error, ErrorContext};
use crate::structured::error::{ValidationError, ValidationResult};
use jsonschema::{Draft, JSONSchema};
use serde_json::Value;

/// Compiled JSON schema plus the raw document it came from.
pub struct OutputValidator {
    schema: Value,
    compiled: JSONSchema,
}

impl OutputValidator {
    /// Compile `schema`. Fails with a configuration error if the schema itself is malformed.
    pub fn new(schema: Value) -> crate::Result<Self> {
        let compiled = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&schema)
            .map_err(|e| {
                Error::configuration_with_context(
                    format!("Failed to compile schema: {}", e),
                    ErrorContext::new().with_source("structured::validator"),
                )
            })?;
        Ok(Self { schema, compiled })
    }

    /// Compile the schema derived from `T`.
    pub fn for_type<T: schemars::JsonSchema>() -> crate::Result<Self> {
        Self::new(crate::structured::json_schema_from_type::<T>())
    }

    /// The schema document this validator was compiled from.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Validate `data`, collecting every violation.
    pub fn validate(&self, data: &Value) -> ValidationResult {
        match self.compiled.validate(data) {
            Ok(()) => ValidationResult::success(),
            Err(errors) => errors
                .map(|e| {
                    let path = e.instance_path.to_string();
                    if path.is_empty() || path == "/" {
                        ValidationError::without_path(e.to_string())
                    } else {
                        ValidationError::with_path(e.to_string(), path)
                    }
                })
                .collect::<Vec<_>>()
                .into(),
        }
    }

    pub fn is_valid(&self, data: &Value) -> bool {
        self.compiled.is_valid(data)
    }
}

impl std::fmt::Debug for OutputValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputValidator")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn script_schema() -> Value {
        json!({
            "type": "object",
            "properties": { "script": { "type": "string" } },
            "required": ["script"]
        })
    }

    #[test]
    fn test_valid_object() {
        let validator = OutputValidator::new(script_schema()).unwrap();
        let result = validator.validate(&json!({"script": "Tune in!"}));
        assert!(result.is_valid());
    }

    #[test]
    fn test_wrong_type_reports_path() {
        let validator = OutputValidator::new(script_schema()).unwrap();
        let result = validator.validate(&json!({"script": 42}));
        assert!(!result.is_valid());
        assert_eq!(result.errors[0].path.as_deref(), Some("/script"));
    }

    #[test]
    fn test_missing_required_field_at_root() {
        let validator = OutputValidator::new(script_schema()).unwrap();
        let result = validator.validate(&json!({}));
        assert!(!result.is_valid());
        assert!(result.errors[0].path.is_none());
        assert!(result.errors[0].message.contains("script"));
    }

    #[test]
    fn test_null_is_rejected() {
        let validator = OutputValidator::new(script_schema()).unwrap();
        assert!(!validator.is_valid(&Value::Null));
    }

    #[test]
    fn test_malformed_schema_is_configuration_error() {
        let err = OutputValidator::new(json!({"type": 12})).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }
}
