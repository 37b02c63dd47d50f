//! Prompt for the identity analysis model.
//!
//! The prompt has two parts:
//! 1. Fixed instructions and the expected JSON shape
//! 2. The OCR text of the document, between separator lines
//!
//! The JSON shape here must stay in step with `schema/identity.schema.json`
//! in kavach-core; replies that drift from it are rejected by the extractor.

/// Separator placed above and below the OCR text.
pub const OCR_TEXT_SEPARATOR: &str = "----------------";

/// Fixed instructions for identity document analysis.
pub const IDENTITY_ANALYSIS_PROMPT: &str = r#"You are validating an identity document for a KYC check.

From the OCR text of the document, extract the holder's Name, Date of Birth,
the Document Type and the Document Number. Check whether the document number
and dates follow the expected format for that document type, look for
inconsistencies between fields, and look for signs of tampering.

Reply with a JSON object in exactly this shape:

{
  "name": "...",
  "dob": "YYYY-MM-DD",
  "document_type": "...",
  "document_number": "...",
  "confidence_score": 85,
  "validation": {
    "format_check": "Valid" | "Invalid",
    "photo_match": "Likely" | "Suspicious" | "Not Available",
    "final_status": "Valid" | "Suspicious" | "Fraud",
    "consistency_check": true,
    "security_features": true
  },
  "reasoning": "short explanation"
}

## Rules
- Reply with the JSON object only. No commentary before or after it.
- Use "" for any text field you cannot read, and still pick the closest
  validation values.
- If the document image is attached, use it to confirm the name, document
  type and number.
- confidence_score is an integer from 0 to 100 reflecting how clear and
  complete the OCR text is.
- consistency_check is true when the fields agree with each other.
- security_features is true when the document shows security elements such
  as holograms, microprint or official seals.
"#;

/// Build the full analysis prompt for one document.
pub fn build_analysis_prompt(ocr_text: &str) -> String {
    format!(
        "{}\nOCR TEXT:\n{}\n{}\n{}",
        IDENTITY_ANALYSIS_PROMPT, OCR_TEXT_SEPARATOR, ocr_text, OCR_TEXT_SEPARATOR
    )
}
