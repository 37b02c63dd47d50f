//! Core data model for identity-document validation.
//!
//! Field names on the wire follow the stored report format: identity fields
//! are snake_case (as the analysis model emits them), report and
//! cross-verification fields are camelCase.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Maximum number of documents accepted in one batch.
pub const MAX_DOCUMENTS: usize = 5;

/// File name used when the uploader did not supply one.
pub const DEFAULT_FILE_NAME: &str = "image.png";

/// MIME type used when the uploader did not supply one.
pub const DEFAULT_MIME_TYPE: &str = "image/png";

/// Errors raised before any document reaches the pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("No documents uploaded")]
    NoDocuments,

    #[error("Too many documents: {count} uploaded, at most {max} allowed")]
    TooManyDocuments { count: usize, max: usize },

    #[error("Document '{file_name}' is empty")]
    EmptyFile { file_name: String },
}

/// Check that a batch holds between 1 and [`MAX_DOCUMENTS`] documents.
pub fn check_batch_size(count: usize) -> Result<(), UploadError> {
    match count {
        0 => Err(UploadError::NoDocuments),
        n if n > MAX_DOCUMENTS => Err(UploadError::TooManyDocuments {
            count: n,
            max: MAX_DOCUMENTS,
        }),
        _ => Ok(()),
    }
}

/// A document as received from the uploader.
///
/// Owned by the pipeline invocation that processes it and dropped when that
/// invocation returns.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadedDocument {
    /// Raw file contents
    pub bytes: Vec<u8>,

    /// Original file name
    pub file_name: String,

    /// MIME type reported by the uploader
    pub mime_type: String,
}

impl UploadedDocument {
    /// Create a document, substituting defaults for a blank name or MIME type.
    pub fn new(
        bytes: impl Into<Vec<u8>>,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        let file_name = file_name.into();
        let mime_type = mime_type.into();
        Self {
            bytes: bytes.into(),
            file_name: if file_name.trim().is_empty() {
                DEFAULT_FILE_NAME.to_string()
            } else {
                file_name
            },
            mime_type: if mime_type.trim().is_empty() {
                DEFAULT_MIME_TYPE.to_string()
            } else {
                mime_type
            },
        }
    }

    /// Reject documents with no content.
    pub fn validate(&self) -> Result<(), UploadError> {
        if self.bytes.is_empty() {
            return Err(UploadError::EmptyFile {
                file_name: self.file_name.clone(),
            });
        }
        Ok(())
    }

    /// Size of the document in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the document has no content.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for UploadedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedDocument")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("bytes", &format_args!("<{} bytes>", self.bytes.len()))
            .finish()
    }
}

/// Whether the document's fields follow the expected format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormatCheck {
    Valid,
    Invalid,
}

/// Photo assessment reported by the analysis model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhotoMatch {
    Likely,
    Suspicious,
    #[serde(rename = "Not Available")]
    NotAvailable,
}

/// Overall verdict for a single document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinalStatus {
    Valid,
    Suspicious,
    Fraud,
}

impl fmt::Display for FormatCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatCheck::Valid => write!(f, "Valid"),
            FormatCheck::Invalid => write!(f, "Invalid"),
        }
    }
}

impl fmt::Display for PhotoMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhotoMatch::Likely => write!(f, "Likely"),
            PhotoMatch::Suspicious => write!(f, "Suspicious"),
            PhotoMatch::NotAvailable => write!(f, "Not Available"),
        }
    }
}

impl fmt::Display for FinalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinalStatus::Valid => write!(f, "Valid"),
            FinalStatus::Suspicious => write!(f, "Suspicious"),
            FinalStatus::Fraud => write!(f, "Fraud"),
        }
    }
}

/// Validation checks reported for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationDetails {
    pub format_check: FormatCheck,

    pub photo_match: PhotoMatch,

    pub final_status: FinalStatus,

    /// Extracted fields are logically consistent with each other
    #[serde(default)]
    pub consistency_check: bool,

    /// The document appears to carry security elements
    #[serde(default)]
    pub security_features: bool,
}

/// Identity fields extracted from one document by the analysis model.
///
/// Missing or `null` string fields materialize as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedIdentity {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,

    /// ISO date (`YYYY-MM-DD`) or empty
    #[serde(default, deserialize_with = "lenient::string")]
    pub dob: String,

    #[serde(default, deserialize_with = "lenient::string")]
    pub document_type: String,

    #[serde(default, deserialize_with = "lenient::string")]
    pub document_number: String,

    /// Model's confidence in the extraction (0-100)
    #[serde(default, deserialize_with = "lenient::confidence")]
    pub confidence_score: u8,

    pub validation: ValidationDetails,

    #[serde(default, deserialize_with = "lenient::string")]
    pub reasoning: String,
}

/// Deserializers for the loosely typed values models emit.
mod lenient {
    use serde::{de::Error as _, Deserialize, Deserializer};

    /// A string, with `null` read as empty.
    pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
    }

    /// An integral number in 0..=100, written either as `85` or `85.0`.
    pub fn confidence<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
        let value = f64::deserialize(deserializer)?;
        if value.fract() != 0.0 || !(0.0..=100.0).contains(&value) {
            return Err(D::Error::custom(format!(
                "confidence score {value} is not an integer between 0 and 100"
            )));
        }
        Ok(value as u8)
    }
}

/// Result for one successfully processed document of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentResult {
    #[serde(flatten)]
    pub identity: ExtractedIdentity,

    #[serde(rename = "fileName")]
    pub file_name: String,

    /// Position of the document in the uploaded batch (0-based)
    #[serde(rename = "documentIndex")]
    pub document_index: usize,
}

impl DocumentResult {
    pub fn new(identity: ExtractedIdentity, file_name: impl Into<String>, index: usize) -> Self {
        Self {
            identity,
            file_name: file_name.into(),
            document_index: index,
        }
    }
}

/// Outcome category of cross-document identity verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationStatus {
    #[serde(rename = "Single Document")]
    SingleDocument,

    #[serde(rename = "Identity Verified")]
    IdentityVerified,

    #[serde(rename = "Identity Mismatch")]
    IdentityMismatch,
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationStatus::SingleDocument => write!(f, "Single Document"),
            VerificationStatus::IdentityVerified => write!(f, "Identity Verified"),
            VerificationStatus::IdentityMismatch => write!(f, "Identity Mismatch"),
        }
    }
}

/// Whether the documents of a batch describe the same person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossVerificationResult {
    pub status: VerificationStatus,

    /// Human-readable summary
    pub message: String,

    pub identity_match: bool,

    /// 100 (match), 75 (partial match) or 20 (no match)
    pub confidence: u8,

    /// Distinct normalized names, in first-seen order
    pub extracted_names: Vec<String>,

    pub document_count: usize,

    /// Raw name fields in document order, empty entries included
    pub raw_names: Vec<String>,
}

/// The persisted outcome of one successful batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub documents: Vec<DocumentResult>,

    pub cross_verification: CrossVerificationResult,

    pub total_documents: usize,

    /// When the report was assembled
    pub timestamp: DateTime<Utc>,
}

/// Response object for a single-document validation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateResponse {
    pub ok: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ExtractedIdentity>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidateResponse {
    pub fn success(identity: ExtractedIdentity) -> Self {
        Self {
            ok: true,
            data: Some(identity),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

impl<E: fmt::Display> From<Result<ExtractedIdentity, E>> for ValidateResponse {
    fn from(result: Result<ExtractedIdentity, E>) -> Self {
        match result {
            Ok(identity) => Self::success(identity),
            Err(e) => Self::failure(e.to_string()),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_size_bounds() {
        assert_eq!(check_batch_size(0), Err(UploadError::NoDocuments));
        assert!(check_batch_size(1).is_ok());
        assert!(check_batch_size(MAX_DOCUMENTS).is_ok());
        assert_eq!(
            check_batch_size(6),
            Err(UploadError::TooManyDocuments { count: 6, max: 5 })
        );
    }

    #[test]
    fn test_uploaded_document_defaults() {
        let doc = UploadedDocument::new(vec![1, 2, 3], "", " ");
        assert_eq!(doc.file_name, DEFAULT_FILE_NAME);
        assert_eq!(doc.mime_type, DEFAULT_MIME_TYPE);
        assert!(doc.validate().is_ok());

        let empty = UploadedDocument::new(Vec::new(), "pan.jpg", "image/jpeg");
        assert_eq!(
            empty.validate(),
            Err(UploadError::EmptyFile {
                file_name: "pan.jpg".to_string()
            })
        );
    }

    #[test]
    fn test_debug_does_not_dump_bytes() {
        let doc = UploadedDocument::new(vec![0xAB; 64], "id.png", "image/png");
        let debug = format!("{:?}", doc);
        assert!(debug.contains("<64 bytes>"));
        assert!(!debug.contains("171"));
    }

    #[test]
    fn test_photo_match_wire_name() {
        let json = serde_json::to_string(&PhotoMatch::NotAvailable).unwrap();
        assert_eq!(json, "\"Not Available\"");
        let parsed: PhotoMatch = serde_json::from_str("\"Not Available\"").unwrap();
        assert_eq!(parsed, PhotoMatch::NotAvailable);
    }

    #[test]
    fn test_document_result_is_flattened() {
        let result = DocumentResult::new(fixtures::identity("Asha Rao"), "aadhaar.png", 2);
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["name"], "Asha Rao");
        assert_eq!(value["fileName"], "aadhaar.png");
        assert_eq!(value["documentIndex"], 2);
        assert_eq!(value["validation"]["final_status"], "Valid");
    }

    #[test]
    fn test_validate_response_from_result() {
        let ok: ValidateResponse = Ok::<_, String>(fixtures::identity("A")).into();
        assert!(ok.ok);
        assert!(ok.error.is_none());

        let err: ValidateResponse = Err::<ExtractedIdentity, _>("OCR failed").into();
        assert!(!err.ok);
        assert_eq!(err.error.as_deref(), Some("OCR failed"));

        let json = serde_json::to_value(&err).unwrap();
        assert!(json.get("data").is_none());
    }
}
