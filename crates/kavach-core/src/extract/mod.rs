//! Structured-data extraction from analysis model output.
//!
//! [`extract_json`] recovers a JSON value from free-form text;
//! [`extract_identity`] additionally checks it against the identity schema
//! and materializes an [`ExtractedIdentity`].

mod parser;
mod schema;

pub use parser::extract_json;
pub use schema::validate_identity_schema;

use thiserror::Error;

use crate::types::ExtractedIdentity;

/// Errors from extracting structured data out of model text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Failed to parse JSON from model output")]
    NoJsonFound,

    #[error("Model output does not match the identity schema: {}", .0.join("; "))]
    SchemaMismatch(Vec<String>),

    #[error("Model output has an invalid identity shape: {0}")]
    InvalidShape(String),

    #[error("Failed to load identity schema: {0}")]
    SchemaUnavailable(String),
}

/// Extract an [`ExtractedIdentity`] from model output.
pub fn extract_identity(text: &str) -> Result<ExtractedIdentity, ExtractionError> {
    let value = extract_json(text)?;
    validate_identity_schema(&value)?;
    serde_json::from_value(value).map_err(|e| ExtractionError::InvalidShape(e.to_string()))
}
