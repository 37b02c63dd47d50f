//! Terminal output for reports and progress.

use kavach_core::{Stage, ValidationReport};
use kavach_runtime::ProgressSink;
use std::fmt::Write;

/// Prints each stage to stderr as the run advances.
pub struct ConsoleSink;

impl ProgressSink for ConsoleSink {
    fn on_stage(&self, stage: Stage) {
        match stage {
            Stage::Idle | Stage::Done | Stage::Failed => {}
            _ => eprintln!("  -> {}", stage),
        }
    }
}

/// Human-readable summary of a report.
pub fn render_report(report: &ValidationReport) -> String {
    let mut out = String::new();
    let cross = &report.cross_verification;

    let _ = writeln!(
        out,
        "Validation report ({} document{}, {})",
        report.total_documents,
        if report.total_documents == 1 { "" } else { "s" },
        report.timestamp.to_rfc3339()
    );
    let _ = writeln!(out);

    for doc in &report.documents {
        let id = &doc.identity;
        let _ = writeln!(out, "[{}] {}", doc.document_index + 1, doc.file_name);
        let _ = writeln!(out, "    Name:            {}", or_dash(&id.name));
        let _ = writeln!(out, "    Date of birth:   {}", or_dash(&id.dob));
        let _ = writeln!(out, "    Document type:   {}", or_dash(&id.document_type));
        let _ = writeln!(out, "    Document number: {}", or_dash(&id.document_number));
        let _ = writeln!(
            out,
            "    Status:          {} (format {}, photo {}, confidence {})",
            id.validation.final_status,
            id.validation.format_check,
            id.validation.photo_match,
            id.confidence_score
        );
        if !id.reasoning.is_empty() {
            let _ = writeln!(out, "    Reasoning:       {}", id.reasoning);
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Cross-verification: {} (confidence {})",
        cross.status, cross.confidence
    );
    let _ = writeln!(out, "  {}", cross.message);

    out
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kavach_core::{finalize_batch, DocumentResult, ExtractedIdentity};

    fn document(name: &str, index: usize) -> DocumentResult {
        let identity: ExtractedIdentity = serde_json::from_value(serde_json::json!({
            "name": name,
            "document_type": "Aadhaar Card",
            "confidence_score": 82,
            "validation": {
                "format_check": "Valid",
                "photo_match": "Not Available",
                "final_status": "Suspicious"
            }
        }))
        .unwrap();
        DocumentResult::new(identity, format!("scan{}.jpg", index), index)
    }

    #[test]
    fn test_render_mismatch_report() {
        let report = finalize_batch(vec![document("Amit Singh", 0), document("Rahul Verma", 1)]);
        let text = render_report(&report);

        assert!(text.starts_with("Validation report (2 documents, "));
        assert!(text.contains("[2] scan1.jpg"));
        assert!(text.contains("Name:            Rahul Verma"));
        assert!(text.contains("Date of birth:   -"));
        assert!(text.contains("Status:          Suspicious (format Valid, photo Not Available, confidence 82)"));
        assert!(text.contains("Cross-verification: Identity Mismatch (confidence 20)"));
        assert!(text.contains("Documents contain different names (amit singh, rahul verma) - manual review required"));
    }

    #[test]
    fn test_render_single_document() {
        let report = finalize_batch(vec![document("Amit Singh", 0)]);
        let text = render_report(&report);
        assert!(text.starts_with("Validation report (1 document, "));
        assert!(text.contains("Single Document (confidence 100)"));
    }
}
