//! Multi-document validation orchestrator.
//!
//! The orchestrator runs a batch of up to five documents through the
//! [`DocumentPipeline`] one at a time, in upload order. It implements:
//! - Upload checks before any external call
//! - Strictly sequential processing, one suspension per external call
//! - Fail-fast: the first failing document ends the batch
//! - Cross-verification and report assembly for complete batches only
//! - Persisting the report, or clearing it when a run fails

use std::sync::Arc;
use thiserror::Error;

use kavach_core::{
    check_batch_size, cross_verify, DocumentResult, ReportAssembler, Stage, UploadedDocument,
    ValidateResponse, ValidationReport,
};

use crate::config::RuntimeConfig;
use crate::pipeline::{DocumentPipeline, PipelineError};
use crate::progress::{ProgressSink, ProgressTracker};
use crate::store::{FileReportStore, InMemoryReportStore, ReportStore};
use crate::RuntimeError;

/// A document of the batch failed; the batch produced no report.
#[derive(Error, Debug)]
#[error("Document {} ({}) validation failed: {}", .index + 1, .file_name, .source)]
pub struct BatchError {
    /// Zero-based position of the failing document
    pub index: usize,
    pub file_name: String,
    pub source: PipelineError,
}

/// Runs validation batches and owns the report slot.
pub struct ValidationOrchestrator {
    pipeline: DocumentPipeline,
    store: Arc<dyn ReportStore>,
    assembler: ReportAssembler,
    clear_report_on_failure: bool,
}

impl ValidationOrchestrator {
    /// Create an orchestrator that clears the stored report on failure.
    pub fn new(pipeline: DocumentPipeline, store: Arc<dyn ReportStore>) -> Self {
        Self {
            pipeline,
            store,
            assembler: ReportAssembler::new(),
            clear_report_on_failure: true,
        }
    }

    /// Build the production pipeline and file store from configuration.
    pub fn from_config(config: &RuntimeConfig) -> Result<Self, RuntimeError> {
        let pipeline = DocumentPipeline::from_config(config)?;
        let store = Arc::new(FileReportStore::new(config.store.dir.clone()));

        ValidationOrchestratorBuilder::new()
            .pipeline(pipeline)
            .store(store)
            .clear_report_on_failure(config.clear_report_on_failure)
            .build()
    }

    /// The per-document pipeline.
    pub fn pipeline(&self) -> &DocumentPipeline {
        &self.pipeline
    }

    /// The report slot.
    pub fn store(&self) -> &Arc<dyn ReportStore> {
        &self.store
    }

    /// Validate a single document outside of a batch.
    ///
    /// Never touches the report store.
    pub async fn validate_document(&self, document: &UploadedDocument) -> ValidateResponse {
        if let Err(e) = document.validate() {
            return ValidateResponse::failure(e.to_string());
        }
        self.pipeline.analyze_document(document).await.into()
    }

    /// Process every document of a batch, in order.
    ///
    /// Stops at the first failing document. Does not cross-verify or touch
    /// the store.
    pub async fn run_batch(
        &self,
        documents: &[UploadedDocument],
        progress: &ProgressTracker<'_>,
    ) -> Result<Vec<DocumentResult>, RuntimeError> {
        progress.advance(Stage::Uploading);

        check_batch_size(documents.len())?;
        for document in documents {
            document.validate()?;
        }

        tracing::info!(documents = documents.len(), "Starting validation batch");

        let mut results = Vec::with_capacity(documents.len());
        for (index, document) in documents.iter().enumerate() {
            let result = self
                .pipeline
                .process(index, document, Some(progress))
                .await
                .map_err(|source| BatchError {
                    index,
                    file_name: document.file_name.clone(),
                    source,
                })?;
            results.push(result);
        }

        Ok(results)
    }

    /// Run a full validation: batch, cross-verification, report, store.
    ///
    /// On success the stored report is replaced. On failure no report is
    /// produced and, if configured, the stored one is removed.
    pub async fn run(
        &self,
        documents: &[UploadedDocument],
        sink: &dyn ProgressSink,
    ) -> Result<ValidationReport, RuntimeError> {
        let progress = ProgressTracker::new(sink);

        match self.run_inner(documents, &progress).await {
            Ok(report) => {
                progress.advance(Stage::Done);
                Ok(report)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Validation run failed");
                progress.fail();
                if self.clear_report_on_failure {
                    if let Err(clear_err) = self.store.clear() {
                        tracing::error!(error = %clear_err, "Failed to clear stored report");
                    }
                }
                Err(e)
            }
        }
    }

    async fn run_inner(
        &self,
        documents: &[UploadedDocument],
        progress: &ProgressTracker<'_>,
    ) -> Result<ValidationReport, RuntimeError> {
        let results = self.run_batch(documents, progress).await?;

        progress.advance(Stage::CrossVerifying);
        let cross_verification = cross_verify(&results);

        tracing::info!(
            status = %cross_verification.status,
            confidence = cross_verification.confidence,
            documents = results.len(),
            "Cross-verification complete"
        );

        let report = self.assembler.assemble(results, cross_verification);
        self.store.put(&report)?;

        Ok(report)
    }
}

/// Builder for ValidationOrchestrator.
pub struct ValidationOrchestratorBuilder {
    pipeline: Option<DocumentPipeline>,
    store: Option<Arc<dyn ReportStore>>,
    clear_report_on_failure: bool,
}

impl ValidationOrchestratorBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            pipeline: None,
            store: None,
            clear_report_on_failure: true,
        }
    }

    /// Set the document pipeline.
    pub fn pipeline(mut self, pipeline: DocumentPipeline) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    /// Set the report store. Defaults to an in-memory store.
    pub fn store(mut self, store: Arc<dyn ReportStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Whether a failed run removes the stored report.
    pub fn clear_report_on_failure(mut self, clear: bool) -> Self {
        self.clear_report_on_failure = clear;
        self
    }

    /// Build the orchestrator.
    pub fn build(self) -> Result<ValidationOrchestrator, RuntimeError> {
        let pipeline = self
            .pipeline
            .ok_or_else(|| RuntimeError::NotConfigured("No pipeline set".to_string()))?;
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(InMemoryReportStore::new()));

        let mut orchestrator = ValidationOrchestrator::new(pipeline, store);
        orchestrator.clear_report_on_failure = self.clear_report_on_failure;
        Ok(orchestrator)
    }
}

impl Default for ValidationOrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
