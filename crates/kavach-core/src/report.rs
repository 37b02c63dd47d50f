//! Final report assembly.

use chrono::{DateTime, Utc};

use crate::types::{
    CrossVerificationResult, DocumentResult, FinalStatus, ValidationReport, VerificationStatus,
};

/// Merges batch results and cross-verification into a [`ValidationReport`].
///
/// The assembled report is meant to replace whatever report was stored
/// before it; reports are never merged.
#[derive(Debug, Default)]
pub struct ReportAssembler;

impl ReportAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Assemble a report stamped with the current time.
    pub fn assemble(
        &self,
        documents: Vec<DocumentResult>,
        cross_verification: CrossVerificationResult,
    ) -> ValidationReport {
        self.assemble_at(documents, cross_verification, Utc::now())
    }

    /// Assemble a report with an explicit timestamp.
    pub fn assemble_at(
        &self,
        documents: Vec<DocumentResult>,
        cross_verification: CrossVerificationResult,
        timestamp: DateTime<Utc>,
    ) -> ValidationReport {
        ValidationReport {
            total_documents: documents.len(),
            documents,
            cross_verification,
            timestamp,
        }
    }
}

impl ValidationReport {
    /// Headline status of the report.
    pub fn status(&self) -> VerificationStatus {
        self.cross_verification.status
    }

    /// Whether every document was judged `Valid` and the identities agree.
    pub fn is_clean(&self) -> bool {
        self.cross_verification.identity_match
            && self
                .documents
                .iter()
                .all(|doc| doc.identity.validation.final_status == FinalStatus::Valid)
    }
}
