//! # kavach-core
//!
//! Deterministic identity-document validation logic.
//!
//! This crate holds everything that does not talk to the outside world:
//! - Recovering a JSON object from free-form analysis model output
//! - Materializing and schema-checking the extracted identity
//! - Cross-verifying names across the documents of a batch
//! - Assembling the final [`ValidationReport`]
//! - The stage state machine used for progress reporting
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same input always produces same output
//! 2. **No I/O**: OCR and AI analysis live in `kavach-runtime`
//! 3. **Whole reports only**: a report is assembled once per successful
//!    batch and never merged with an earlier one
//!
//! ## Example
//!
//! ```rust,ignore
//! use kavach_core::{extract_identity, finalize_batch, DocumentResult};
//!
//! let identity = extract_identity(&model_output)?;
//! let documents = vec![DocumentResult::new(identity, "aadhaar.png", 0)];
//! let report = finalize_batch(documents);
//!
//! println!("{}: {}", report.status(), report.cross_verification.message);
//! ```

pub mod extract;
pub mod progress;
pub mod report;
pub mod types;
pub mod verify;

// Re-export main types at crate root
pub use extract::{extract_identity, extract_json, ExtractionError};
pub use progress::{Stage, StageError};
pub use report::ReportAssembler;
pub use types::{
    check_batch_size, CrossVerificationResult, DocumentResult, ExtractedIdentity, FinalStatus,
    FormatCheck, PhotoMatch, UploadError, UploadedDocument, ValidateResponse, ValidationDetails,
    ValidationReport, VerificationStatus, DEFAULT_FILE_NAME, DEFAULT_MIME_TYPE, MAX_DOCUMENTS,
};
pub use verify::{cross_verify, normalize_name};

/// Cross-verify a completed batch and assemble its report.
///
/// Call only after every document of the batch has been processed
/// successfully; `documents` must be in upload order.
pub fn finalize_batch(documents: Vec<DocumentResult>) -> ValidationReport {
    let cross_verification = cross_verify(&documents);
    ReportAssembler::new().assemble(documents, cross_verification)
}
