//! Scripted providers for tests.

use super::{AnalysisProvider, AnalysisRequest, OcrProvider, OcrText, ProviderError};
use async_trait::async_trait;
use kavach_core::UploadedDocument;
use parking_lot::Mutex;

/// A fenced model reply describing a valid document for `name`.
pub(crate) fn identity_reply(name: &str) -> String {
    format!(
        "Here is the analysis:\n```json\n{}\n```",
        serde_json::json!({
            "name": name,
            "dob": "1988-11-03",
            "document_type": "PAN Card",
            "document_number": "ABCDE1234F",
            "confidence_score": 90,
            "validation": {
                "format_check": "Valid",
                "photo_match": "Likely",
                "final_status": "Valid",
                "consistency_check": true,
                "security_features": true
            },
            "reasoning": "Clear scan."
        })
    )
}

/// OCR provider that "reads" the document bytes as UTF-8 text.
#[derive(Default)]
pub(crate) struct MockOcr {
    calls: Mutex<Vec<String>>,
    fail_on: Option<String>,
}

impl MockOcr {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail with an API error for the document with this file name.
    pub fn failing_on(file_name: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on: Some(file_name.to_string()),
        }
    }

    /// File names seen, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl OcrProvider for MockOcr {
    async fn extract_text(
        &self,
        document: &UploadedDocument,
        language: &str,
    ) -> Result<OcrText, ProviderError> {
        assert_eq!(language, "eng");
        self.calls.lock().push(document.file_name.clone());

        if self.fail_on.as_deref() == Some(document.file_name.as_str()) {
            return Err(ProviderError::ApiError {
                status: 500,
                message: "E500: Resource Exhaustion".to_string(),
            });
        }

        Ok(OcrText::new(String::from_utf8_lossy(&document.bytes)))
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "mock-ocr"
    }
}

/// Analysis provider that answers with an identity named after the OCR text.
#[derive(Default)]
pub(crate) struct MockAnalyzer {
    calls: Mutex<Vec<(String, bool)>>,
    fixed_reply: Option<String>,
    fail_on: Option<String>,
}

impl MockAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always answer with `reply`.
    pub fn replying(reply: &str) -> Self {
        Self {
            fixed_reply: Some(reply.to_string()),
            ..Self::default()
        }
    }

    /// Fail with a rate-limit error when the OCR text is `ocr_text`.
    pub fn failing_on(ocr_text: &str) -> Self {
        Self {
            fail_on: Some(ocr_text.to_string()),
            ..Self::default()
        }
    }

    /// OCR text and whether an image was attached, per call.
    pub fn calls(&self) -> Vec<(String, bool)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl AnalysisProvider for MockAnalyzer {
    async fn analyze(&self, request: AnalysisRequest<'_>) -> Result<String, ProviderError> {
        self.calls
            .lock()
            .push((request.ocr_text.to_string(), request.image.is_some()));

        if self.fail_on.as_deref() == Some(request.ocr_text.trim()) {
            return Err(ProviderError::ApiError {
                status: 429,
                message: "Resource has been exhausted (RESOURCE_EXHAUSTED)".to_string(),
            });
        }

        Ok(match &self.fixed_reply {
            Some(reply) => reply.clone(),
            None => identity_reply(request.ocr_text.trim()),
        })
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "mock-analyzer"
    }
}
