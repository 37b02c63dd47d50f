//! OCR.space text recognition provider.
//!
//! Uploads the document as a multipart form to the `parse/image` endpoint and
//! returns the text of the first parsed result.

use super::{
    secrets::{ApiCredential, CredentialSource},
    OcrProvider, OcrText, ProviderError,
};
use crate::config::OcrConfig;
use async_trait::async_trait;
use kavach_core::UploadedDocument;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::time::Duration;

/// Environment variable name for the OCR.space API key.
pub const OCR_SPACE_API_KEY_ENV: &str = "OCR_SPACE_API_KEY";

/// Config key for the OCR.space API key.
pub const OCR_SPACE_API_KEY_CONFIG: &str = "ocr_api_key";

/// Default OCR.space endpoint.
pub const DEFAULT_OCR_ENDPOINT: &str = "https://api.ocr.space/parse/image";

/// OCR.space provider.
///
/// The API key is held in an [`ApiCredential`] and only exposed when the
/// `apikey` header is set.
#[cfg_attr(not(feature = "ocr-space"), allow(dead_code))]
pub struct OcrSpaceProvider {
    credential: ApiCredential,
    endpoint: String,
    engine: u8,
    timeout: Duration,
}

impl std::fmt::Debug for OcrSpaceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrSpaceProvider")
            .field("credential", &self.credential)
            .field("endpoint", &self.endpoint)
            .field("engine", &self.engine)
            .finish()
    }
}

impl OcrSpaceProvider {
    /// Create a provider with default settings.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_credential(
            ApiCredential::new(api_key, CredentialSource::Programmatic, "OCR.space API key"),
            &OcrConfig::default(),
        )
    }

    /// Create from an already loaded credential.
    pub fn with_credential(credential: ApiCredential, config: &OcrConfig) -> Self {
        Self {
            credential,
            endpoint: config.endpoint.clone(),
            engine: config.engine,
            timeout: config.timeout,
        }
    }

    /// Set custom endpoint.
    pub fn with_endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = url.into();
        self
    }

    /// Text fields sent alongside the file.
    #[cfg_attr(not(feature = "ocr-space"), allow(dead_code))]
    fn form_fields(&self, language: &str) -> Vec<(&'static str, String)> {
        vec![
            ("language", language.to_string()),
            ("isTable", "false".to_string()),
            ("OCREngine", self.engine.to_string()),
            ("scale", "true".to_string()),
            ("detectOrientation", "true".to_string()),
            ("isOverlayRequired", "false".to_string()),
            ("isCreateSearchablePdf", "false".to_string()),
            ("isSearchablePdfHideTextLayer", "true".to_string()),
        ]
    }
}

/// OCR.space response format.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OcrSpaceResponse {
    #[serde(default)]
    parsed_results: Option<Vec<ParsedResult>>,
    #[serde(default)]
    is_errored_on_processing: bool,
    #[serde(default)]
    error_message: Option<JsonValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ParsedResult {
    #[serde(default)]
    parsed_text: Option<String>,
}

/// Read the recognized text out of an OCR.space response body.
///
/// The text is the first parsed result's `ParsedText`, or empty when the
/// service returned no results. A processing error reported inside a
/// successful response is logged, not raised.
pub fn parse_ocr_response(body: &str) -> Result<OcrText, ProviderError> {
    let response: OcrSpaceResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::ParseError(e.to_string()))?;

    if response.is_errored_on_processing {
        let message = match &response.error_message {
            Some(JsonValue::String(s)) => s.clone(),
            Some(JsonValue::Array(items)) => items
                .iter()
                .filter_map(JsonValue::as_str)
                .collect::<Vec<_>>()
                .join("; "),
            _ => String::new(),
        };
        tracing::warn!(error = %message, "OCR.space reported a processing error");
    }

    let text = response
        .parsed_results
        .and_then(|results| results.into_iter().next())
        .and_then(|first| first.parsed_text)
        .unwrap_or_default();

    Ok(OcrText::new(text))
}

#[async_trait]
impl OcrProvider for OcrSpaceProvider {
    #[cfg(feature = "ocr-space")]
    async fn extract_text(
        &self,
        document: &UploadedDocument,
        language: &str,
    ) -> Result<OcrText, ProviderError> {
        let client = super::http_client();

        let part = reqwest::multipart::Part::bytes(document.bytes.clone())
            .file_name(document.file_name.clone())
            .mime_str(&document.mime_type)
            .map_err(|e| ProviderError::HttpError(e.to_string()))?;

        let form = self
            .form_fields(language)
            .into_iter()
            .fold(reqwest::multipart::Form::new().part("file", part), |form, (k, v)| {
                form.text(k, v)
            });

        // SECURITY: Only expose the credential here, at the point of use
        let response = client
            .post(&self.endpoint)
            .header("apikey", self.credential.expose())
            .timeout(self.timeout)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.timeout))?;

        if !status.is_success() {
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        parse_ocr_response(&body)
    }

    #[cfg(not(feature = "ocr-space"))]
    async fn extract_text(
        &self,
        _document: &UploadedDocument,
        _language: &str,
    ) -> Result<OcrText, ProviderError> {
        Err(ProviderError::NotConfigured(
            "OCR.space provider requires 'ocr-space' feature".to_string(),
        ))
    }

    async fn health_check(&self) -> bool {
        !self.credential.is_empty()
    }

    fn name(&self) -> &str {
        "ocr-space"
    }
}
