//! # kavach-runtime
//!
//! OCR and AI-analysis runtime for Kavach.
//!
//! This crate performs the two external calls a document needs (text
//! recognition, then model analysis), runs batches of documents through
//! them in order, and keeps the latest report in a [`ReportStore`].
//!
//! Everything deterministic (JSON recovery, cross-verification, report
//! assembly) lives in `kavach-core`.
//!
//! ## Providers
//!
//! HTTP providers are behind cargo features:
//! - `ocr-space`: OCR.space text recognition
//! - `gemini`: Google Gemini analysis
//! - `all-providers`: both
//!
//! Without the feature the provider still builds but every call returns
//! [`ProviderError::NotConfigured`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use kavach_runtime::{NoopSink, RuntimeConfig, ValidationOrchestrator};
//!
//! let config = RuntimeConfig::from_yaml_file("kavach.yaml")?;
//! let orchestrator = ValidationOrchestrator::from_config(&config)?;
//!
//! let report = orchestrator.run(&documents, &NoopSink).await?;
//! println!("{}", report.cross_verification.message);
//! ```

use thiserror::Error;

pub mod config;
pub mod orchestrator;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod providers;
pub mod store;

pub use config::{AnalysisConfig, ConfigError, OcrConfig, RuntimeConfig, StoreConfig};
pub use orchestrator::{BatchError, ValidationOrchestrator, ValidationOrchestratorBuilder};
pub use pipeline::{AnalysisError, DocumentPipeline, PipelineError};
pub use progress::{NoopSink, ProgressSink, ProgressTracker, RecordingSink};
pub use providers::{
    AnalysisProvider, ApiCredential, CredentialError, GeminiProvider, OcrProvider,
    OcrSpaceProvider, OcrText, ProviderError,
};
pub use store::{FileReportStore, InMemoryReportStore, ReportStore, StoreError, REPORT_KEY};

use kavach_core::UploadError;

/// Errors from a validation run.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Runtime not configured: {0}")]
    NotConfigured(String),
}
