//! OCR and analysis provider abstractions for kavach-runtime.
//!
//! This module defines the traits for the two external collaborators of the
//! validation pipeline and includes implementations for OCR.space and
//! Google Gemini.
//!
//! ## Security
//!
//! All providers use the [`secrets`] module for secure credential handling.
//! See [`ApiCredential`] for the recommended patterns.

use async_trait::async_trait;
use kavach_core::UploadedDocument;
use std::time::Duration;
use thiserror::Error;

pub mod gemini;
pub mod ocr_space;
pub mod secrets;

#[cfg(test)]
pub(crate) mod mock;

pub use gemini::{GeminiProvider, GOOGLE_GEMINI_API_KEY_ENV};
pub use ocr_space::{OcrSpaceProvider, OCR_SPACE_API_KEY_ENV};
pub use secrets::{
    ApiCredential, CredentialBuilder, CredentialError, CredentialSet, CredentialSource,
    CredentialsConfig,
};

/// Errors from OCR and analysis providers.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    ParseError(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

#[cfg(any(feature = "ocr-space", feature = "gemini"))]
impl ProviderError {
    fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout(timeout)
        } else {
            ProviderError::HttpError(err.to_string())
        }
    }
}

/// Plain text recognized in a document. May be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OcrText {
    pub text: String,
}

impl OcrText {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Original document image sent alongside the OCR text.
#[derive(Debug, Clone, Copy)]
pub struct ImageAttachment<'a> {
    pub bytes: &'a [u8],
    pub mime_type: &'a str,
}

/// Input for one analysis call.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisRequest<'a> {
    /// Text recognized by the OCR provider
    pub ocr_text: &'a str,

    /// The document itself, when image attachment is enabled
    pub image: Option<ImageAttachment<'a>>,
}

impl<'a> AnalysisRequest<'a> {
    /// A text-only request.
    pub fn text(ocr_text: &'a str) -> Self {
        Self {
            ocr_text,
            image: None,
        }
    }

    /// Attach the original document image.
    pub fn with_image(mut self, document: &'a UploadedDocument) -> Self {
        self.image = Some(ImageAttachment {
            bytes: &document.bytes,
            mime_type: &document.mime_type,
        });
        self
    }
}

/// Text recognition service.
///
/// Called exactly once per document, before analysis.
#[async_trait]
pub trait OcrProvider: Send + Sync {
    /// Recognize the text in a document.
    async fn extract_text(
        &self,
        document: &UploadedDocument,
        language: &str,
    ) -> Result<OcrText, ProviderError>;

    /// Check if provider is healthy.
    async fn health_check(&self) -> bool;

    /// Get provider name for logging.
    fn name(&self) -> &str;
}

/// Generative model that judges a document from its OCR text.
///
/// Returns the model's raw reply; recovering the identity from it is the
/// extractor's job.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    /// Run one analysis request.
    async fn analyze(&self, request: AnalysisRequest<'_>) -> Result<String, ProviderError>;

    /// Check if provider is healthy.
    async fn health_check(&self) -> bool;

    /// Get provider name for logging.
    fn name(&self) -> &str;
}

/// Shared HTTP client for all providers.
#[cfg(any(feature = "ocr-space", feature = "gemini"))]
pub(crate) fn http_client() -> &'static reqwest::Client {
    static CLIENT: std::sync::OnceLock<reqwest::Client> = std::sync::OnceLock::new();
    CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .build()
            .expect("Failed to build HTTP client")
    })
}
