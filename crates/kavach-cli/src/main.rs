//! `kavach` - command-line front end for identity-document validation.

mod args;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use kavach_core::UploadedDocument;
use kavach_runtime::{FileReportStore, ReportStore, RuntimeConfig, ValidationOrchestrator};

use args::{Args, Commands};
use render::{render_report, ConsoleSink};

/// Config file picked up from the working directory when `--config` is absent.
const DEFAULT_CONFIG_FILE: &str = "kavach.yaml";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(args.config.as_deref())?;

    match args.command {
        Commands::Validate { files, json } => validate(&config, &files, json).await,
        Commands::Check { file } => check(&config, &file).await,
        Commands::Report { json } => report(&config, json),
        Commands::Clear => {
            store(&config).clear().context("Failed to clear stored report")?;
            println!("Stored report cleared.");
            Ok(())
        }
        Commands::Config => {
            let mut shown = config.clone();
            shown.credentials = config.credentials.redacted();
            print!("{}", shown.to_yaml()?);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<RuntimeConfig> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !default.exists() {
                tracing::debug!("No config file, using defaults");
                return Ok(RuntimeConfig::default());
            }
            default
        }
    };

    tracing::debug!(path = %path.display(), "Loading config");
    RuntimeConfig::from_yaml_file(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}

fn store(config: &RuntimeConfig) -> FileReportStore {
    FileReportStore::new(config.store.dir.clone())
}

/// Read a document from disk, guessing its MIME type from the extension.
fn load_document(path: &Path) -> Result<UploadedDocument> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    let mime_type = mime_guess::from_path(path)
        .first()
        .map(|m| m.to_string())
        .unwrap_or_default();

    Ok(UploadedDocument::new(bytes, file_name, mime_type))
}

/// Build the orchestrator and make sure both providers can serve requests.
async fn ready_orchestrator(config: &RuntimeConfig) -> Result<ValidationOrchestrator> {
    let orchestrator = ValidationOrchestrator::from_config(config)?;
    orchestrator
        .pipeline()
        .health_check()
        .await
        .context("Providers are not ready")?;
    Ok(orchestrator)
}

async fn validate(config: &RuntimeConfig, files: &[PathBuf], json: bool) -> Result<()> {
    let documents = files
        .iter()
        .map(|path| load_document(path))
        .collect::<Result<Vec<_>>>()?;

    let orchestrator = ready_orchestrator(config).await?;
    let report = orchestrator
        .run(&documents, &ConsoleSink)
        .await
        .context("Validation failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_report(&report));
    }
    Ok(())
}

async fn check(config: &RuntimeConfig, file: &Path) -> Result<()> {
    let document = load_document(file)?;
    let orchestrator = ready_orchestrator(config).await?;

    let response = orchestrator.validate_document(&document).await;
    println!("{}", serde_json::to_string_pretty(&response)?);

    if !response.ok {
        std::process::exit(1);
    }
    Ok(())
}

fn report(config: &RuntimeConfig, json: bool) -> Result<()> {
    match store(config).get().context("Failed to read stored report")? {
        Some(report) if json => println!("{}", serde_json::to_string_pretty(&report)?),
        Some(report) => print!("{}", render_report(&report)),
        None => println!("No stored report. Run `kavach validate <FILE>...` first."),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_document_guesses_mime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voter-id.JPG");
        std::fs::write(&path, b"\xff\xd8\xff").unwrap();

        let document = load_document(&path).unwrap();
        assert_eq!(document.file_name, "voter-id.JPG");
        assert_eq!(document.mime_type, "image/jpeg");
        assert_eq!(document.len(), 3);
    }

    #[test]
    fn test_load_document_unknown_extension_defaults_to_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan");
        std::fs::write(&path, b"raw").unwrap();

        let document = load_document(&path).unwrap();
        assert_eq!(document.mime_type, "image/png");
    }

    #[test]
    fn test_load_missing_document_fails() {
        let err = load_document(Path::new("/nonexistent/aadhaar.png")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/aadhaar.png"));
    }

    #[test]
    fn test_explicit_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kavach.yaml");
        std::fs::write(&path, "store:\n  dir: /var/lib/kavach\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.store.dir, PathBuf::from("/var/lib/kavach"));
        assert!(load_config(Some(Path::new("/nonexistent/kavach.yaml"))).is_err());
    }

    #[tokio::test]
    async fn test_ready_orchestrator_with_configured_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = RuntimeConfig::default();
        config.store.dir = dir.path().to_path_buf();
        config.credentials = kavach_runtime::providers::CredentialsConfig::new()
            .with("ocr_api_key", "K-test")
            .with("gemini_api_key", "AIza-test");

        let orchestrator = ready_orchestrator(&config).await.unwrap();
        assert!(orchestrator.store().get().unwrap().is_none());
    }
}
