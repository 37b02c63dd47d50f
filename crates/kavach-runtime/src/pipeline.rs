//! Per-document validation pipeline.
//!
//! One document goes through exactly two external calls, awaited in order:
//! OCR, then analysis of the recognized text. The analysis reply is handed to
//! the core extractor. Nothing is retried; the first failure is returned as is.

use std::sync::Arc;
use thiserror::Error;

use kavach_core::{
    extract_identity, DocumentResult, ExtractedIdentity, ExtractionError, Stage, UploadedDocument,
};

use crate::config::RuntimeConfig;
use crate::progress::ProgressTracker;
use crate::providers::gemini::GEMINI_API_KEY_CONFIG;
use crate::providers::ocr_space::OCR_SPACE_API_KEY_CONFIG;
use crate::providers::{
    AnalysisProvider, AnalysisRequest, CredentialBuilder, CredentialError, GeminiProvider,
    OcrProvider, OcrSpaceProvider, ProviderError, GOOGLE_GEMINI_API_KEY_ENV,
    OCR_SPACE_API_KEY_ENV,
};

/// Failure of the analysis step.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("analysis request failed: {0}")]
    Provider(ProviderError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

/// Failure of one document's pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("OCR failed: {0}")]
    Ocr(ProviderError),

    #[error("AI analysis failed: {0}")]
    Analysis(#[from] AnalysisError),
}

/// Runs OCR and analysis for single documents.
#[derive(Clone)]
pub struct DocumentPipeline {
    ocr: Arc<dyn OcrProvider>,
    analyzer: Arc<dyn AnalysisProvider>,
    language: String,
    attach_image: bool,
}

impl std::fmt::Debug for DocumentPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentPipeline")
            .field("ocr", &self.ocr.name())
            .field("analyzer", &self.analyzer.name())
            .field("language", &self.language)
            .field("attach_image", &self.attach_image)
            .finish()
    }
}

impl DocumentPipeline {
    /// Create a pipeline with the default language hint and image attachment on.
    pub fn new(ocr: Arc<dyn OcrProvider>, analyzer: Arc<dyn AnalysisProvider>) -> Self {
        Self {
            ocr,
            analyzer,
            language: "eng".to_string(),
            attach_image: true,
        }
    }

    /// Build OCR.space and Gemini providers from configuration.
    ///
    /// Both credentials must resolve, from the config or the environment.
    pub fn from_config(config: &RuntimeConfig) -> Result<Self, CredentialError> {
        let mut credentials = CredentialBuilder::new()
            .require(OCR_SPACE_API_KEY_CONFIG, OCR_SPACE_API_KEY_ENV, "OCR.space API key")
            .require(GEMINI_API_KEY_CONFIG, GOOGLE_GEMINI_API_KEY_ENV, "Gemini API key")
            .build(&config.credentials)?;

        let ocr_key = credentials.take(OCR_SPACE_API_KEY_CONFIG)?;
        let gemini_key = credentials.take(GEMINI_API_KEY_CONFIG)?;
        tracing::debug!(
            ocr_key = %ocr_key.source(),
            gemini_key = %gemini_key.source(),
            "Loaded provider credentials"
        );

        let ocr = OcrSpaceProvider::with_credential(ocr_key, &config.ocr);
        let analyzer = GeminiProvider::with_credential(gemini_key, &config.analysis);

        Ok(Self::new(Arc::new(ocr), Arc::new(analyzer))
            .with_language(config.ocr.language.clone())
            .with_image_attachment(config.analysis.attach_image))
    }

    /// Set the OCR language hint.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Send (or stop sending) the document image to the analysis provider.
    pub fn with_image_attachment(mut self, attach: bool) -> Self {
        self.attach_image = attach;
        self
    }

    /// Ask both providers whether they can serve requests.
    pub async fn health_check(&self) -> Result<(), ProviderError> {
        for (name, healthy) in [
            (self.ocr.name(), self.ocr.health_check().await),
            (self.analyzer.name(), self.analyzer.health_check().await),
        ] {
            if !healthy {
                tracing::warn!(provider = name, "Provider failed health check");
                return Err(ProviderError::NotConfigured(format!(
                    "provider '{name}' failed health check"
                )));
            }
        }
        Ok(())
    }

    /// Validate one document outside of a batch.
    ///
    /// The result converts into a [`kavach_core::ValidateResponse`].
    pub async fn analyze_document(
        &self,
        document: &UploadedDocument,
    ) -> Result<ExtractedIdentity, PipelineError> {
        self.identify(document, None, 0).await
    }

    /// Validate the document at `index` of a batch.
    pub async fn process(
        &self,
        index: usize,
        document: &UploadedDocument,
        progress: Option<&ProgressTracker<'_>>,
    ) -> Result<DocumentResult, PipelineError> {
        let identity = self.identify(document, progress, index).await?;
        Ok(DocumentResult::new(identity, document.file_name.clone(), index))
    }

    async fn identify(
        &self,
        document: &UploadedDocument,
        progress: Option<&ProgressTracker<'_>>,
        index: usize,
    ) -> Result<ExtractedIdentity, PipelineError> {
        if let Some(tracker) = progress {
            tracker.advance(Stage::Extracting(index));
        }

        tracing::debug!(
            document_index = index,
            file_name = %document.file_name,
            bytes = document.len(),
            provider = self.ocr.name(),
            "Extracting text"
        );

        let ocr = self
            .ocr
            .extract_text(document, &self.language)
            .await
            .map_err(PipelineError::Ocr)?;

        if ocr.is_empty() {
            tracing::warn!(
                document_index = index,
                file_name = %document.file_name,
                "OCR returned no text"
            );
        }

        if let Some(tracker) = progress {
            tracker.advance(Stage::Analyzing(index));
        }

        let mut request = AnalysisRequest::text(&ocr.text);
        if self.attach_image {
            request = request.with_image(document);
        }

        tracing::debug!(
            document_index = index,
            file_name = %document.file_name,
            provider = self.analyzer.name(),
            image = self.attach_image,
            "Analyzing document"
        );

        let reply = self
            .analyzer
            .analyze(request)
            .await
            .map_err(AnalysisError::Provider)?;

        let identity = extract_identity(&reply).map_err(AnalysisError::from)?;

        tracing::info!(
            document_index = index,
            file_name = %document.file_name,
            document_type = %identity.document_type,
            final_status = %identity.validation.final_status,
            confidence = identity.confidence_score,
            "Document analyzed"
        );

        Ok(identity)
    }
}
