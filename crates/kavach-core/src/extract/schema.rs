//! JSON Schema validation for extracted identities.
//!
//! The analysis model's output is validated against
//! `schema/identity.schema.json` before it is deserialized, so a malformed
//! answer is reported with every violation instead of only the first serde
//! error.

use std::sync::OnceLock;

use serde_json::Value as JsonValue;

use super::ExtractionError;

/// Embedded identity schema (loaded at compile time).
const IDENTITY_SCHEMA_JSON: &str = include_str!("../../schema/identity.schema.json");

/// Compiled JSON Schema validator (initialized once, reused).
static COMPILED_SCHEMA: OnceLock<Result<jsonschema::Validator, String>> = OnceLock::new();

fn get_validator() -> Result<&'static jsonschema::Validator, ExtractionError> {
    let result = COMPILED_SCHEMA.get_or_init(|| {
        let schema_value: JsonValue = match serde_json::from_str(IDENTITY_SCHEMA_JSON) {
            Ok(v) => v,
            Err(e) => return Err(format!("Invalid schema JSON: {}", e)),
        };

        match jsonschema::options().build(&schema_value) {
            Ok(v) => Ok(v),
            Err(e) => Err(format!("Failed to compile schema: {}", e)),
        }
    });

    match result {
        Ok(v) => Ok(v),
        Err(e) => Err(ExtractionError::SchemaUnavailable(e.clone())),
    }
}

/// Validate a value against the identity schema.
///
/// Returns every violation, each suffixed with its instance path.
pub fn validate_identity_schema(value: &JsonValue) -> Result<(), ExtractionError> {
    let validator = get_validator()?;

    let errors: Vec<String> = validator
        .iter_errors(value)
        .map(|e| format!("{} at {}", e, e.instance_path))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ExtractionError::SchemaMismatch(errors))
    }
}
