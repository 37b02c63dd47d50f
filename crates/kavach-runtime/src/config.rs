//! Runtime configuration.
//!
//! Loaded from YAML. Every field has a default, so an empty file (or no file
//! at all) is a valid configuration. Durations are written in humantime form
//! (`"30s"`, `"1m 30s"`).
//!
//! ```yaml
//! ocr:
//!   timeout: 45s
//! analysis:
//!   model: gemini-1.5-flash
//!   attach_image: true
//! credentials:
//!   ocr_api_key: K8...
//! store:
//!   dir: .kavach
//! clear_report_on_failure: true
//! ```

use crate::providers::gemini::{DEFAULT_GEMINI_ENDPOINT, DEFAULT_GEMINI_MODEL};
use crate::providers::ocr_space::DEFAULT_OCR_ENDPOINT;
use crate::providers::CredentialsConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors from loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level runtime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub ocr: OcrConfig,
    pub analysis: AnalysisConfig,
    pub credentials: CredentialsConfig,
    pub store: StoreConfig,

    /// Remove the stored report when a run fails
    pub clear_report_on_failure: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            ocr: OcrConfig::default(),
            analysis: AnalysisConfig::default(),
            credentials: CredentialsConfig::default(),
            store: StoreConfig::default(),
            clear_report_on_failure: true,
        }
    }
}

/// OCR provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    pub endpoint: String,

    /// Language hint passed with every document
    pub language: String,

    /// OCR.space engine (1, 2 or 3)
    pub engine: u8,

    #[serde(with = "humantime_duration")]
    pub timeout: Duration,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_OCR_ENDPOINT.to_string(),
            language: "eng".to_string(),
            engine: 2,
            timeout: Duration::from_secs(60),
        }
    }
}

/// Analysis provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub endpoint: String,
    pub model: String,

    #[serde(with = "humantime_duration")]
    pub timeout: Duration,

    /// Send the document image along with the OCR text
    pub attach_image: bool,

    /// Sampling temperature; the model default when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_GEMINI_ENDPOINT.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            timeout: Duration::from_secs(60),
            attach_image: true,
            temperature: None,
        }
    }
}

/// Report store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding the stored report
    pub dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(".kavach"),
        }
    }
}

impl RuntimeConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: RuntimeConfig = if yaml.trim().is_empty() {
            RuntimeConfig::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Serialize back to YAML. Credential values are included.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Check values serde cannot check.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (section, url) in [("ocr", &self.ocr.endpoint), ("analysis", &self.analysis.endpoint)] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::Invalid(format!(
                    "{}.endpoint must start with http:// or https://",
                    section
                )));
            }
        }

        if self.ocr.language.trim().is_empty() {
            return Err(ConfigError::Invalid("ocr.language must not be empty".to_string()));
        }

        if !(1..=3).contains(&self.ocr.engine) {
            return Err(ConfigError::Invalid(format!(
                "ocr.engine must be 1, 2 or 3, got {}",
                self.ocr.engine
            )));
        }

        if self.analysis.model.trim().is_empty() {
            return Err(ConfigError::Invalid("analysis.model must not be empty".to_string()));
        }

        Ok(())
    }
}

/// Serde adapter for humantime durations.
mod humantime_duration {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&humantime::format_duration(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.ocr.language, "eng");
        assert_eq!(config.ocr.engine, 2);
        assert_eq!(config.ocr.endpoint, "https://api.ocr.space/parse/image");
        assert_eq!(config.analysis.model, "gemini-1.5-flash");
        assert!(config.analysis.attach_image);
        assert!(config.clear_report_on_failure);
        assert_eq!(config.store.dir, PathBuf::from(".kavach"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = RuntimeConfig::from_yaml("").unwrap();
        assert_eq!(config.ocr.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r#"
ocr:
  timeout: 1m 30s
analysis:
  attach_image: false
  temperature: 0.1
credentials:
  gemini_api_key: from-config
clear_report_on_failure: false
"#;
        let config = RuntimeConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.ocr.timeout, Duration::from_secs(90));
        assert_eq!(config.ocr.engine, 2);
        assert!(!config.analysis.attach_image);
        assert_eq!(config.analysis.temperature, Some(0.1));
        assert_eq!(config.credentials.get("gemini_api_key"), Some("from-config"));
        assert!(!config.clear_report_on_failure);
    }

    #[test]
    fn test_yaml_round_trip_keeps_humantime() {
        let yaml = RuntimeConfig::default().to_yaml().unwrap();
        assert!(yaml.contains("timeout: 1m"));
        let parsed = RuntimeConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed.analysis.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_bad_duration_rejected() {
        let err = RuntimeConfig::from_yaml("ocr:\n  timeout: soon\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn test_validation_failures() {
        let err = RuntimeConfig::from_yaml("ocr:\n  endpoint: ftp://example.com\n").unwrap_err();
        assert!(err.to_string().contains("ocr.endpoint"));

        let err = RuntimeConfig::from_yaml("ocr:\n  engine: 7\n").unwrap_err();
        assert!(err.to_string().contains("ocr.engine"));

        let err = RuntimeConfig::from_yaml("ocr:\n  language: \"\"\n").unwrap_err();
        assert!(err.to_string().contains("ocr.language"));
    }

    #[test]
    fn test_missing_file() {
        let err = RuntimeConfig::from_yaml_file("/nonexistent/kavach.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
