//! Secure credential handling for OCR and analysis providers.
//!
//! This module provides a centralized, type-safe way to handle API credentials
//! across all providers. Using this module ensures:
//!
//! - **No accidental logging**: Credentials cannot appear in Debug/Display output
//! - **Memory safety**: Credentials are zeroed on drop
//! - **Consistent patterns**: All providers use the same secure handling
//!
//! ## Usage
//!
//! ```ignore
//! use crate::providers::secrets::{ApiCredential, CredentialBuilder};
//!
//! // Load from config with env fallback
//! let mut creds = CredentialBuilder::new()
//!     .require("ocr_api_key", "OCR_SPACE_API_KEY", "OCR.space API key")
//!     .build(&config.credentials)?;
//! let cred = creds.take("ocr_api_key")?;
//!
//! // Use in HTTP header (explicit exposure)
//! request.header("apikey", cred.expose());
//! ```

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Errors from loading credentials.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("{name} required: set '{config_key}' in config or {env_var} environment variable")]
    Missing {
        name: &'static str,
        config_key: &'static str,
        env_var: &'static str,
    },

    #[error("Credential '{0}' not found")]
    NotLoaded(String),
}

/// Where a credential was loaded from.
///
/// This is useful for debugging configuration issues without
/// exposing the actual credential value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Loaded from the configuration file
    Config,
    /// Loaded from environment variable
    Environment,
    /// Provided programmatically
    Programmatic,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Config => write!(f, "config"),
            CredentialSource::Environment => write!(f, "environment"),
            CredentialSource::Programmatic => write!(f, "programmatic"),
        }
    }
}

/// Credential values from the `credentials` section of the config file.
///
/// Values are plain strings until loaded into an [`ApiCredential`]; the
/// `Debug` output lists only the keys.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialsConfig(BTreeMap<String, String>);

impl CredentialsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a credential value.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Non-empty configured value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }

    /// Copy with every non-empty value replaced by `[REDACTED]`.
    pub fn redacted(&self) -> Self {
        Self(
            self.0
                .iter()
                .map(|(k, v)| {
                    let shown = if v.is_empty() { String::new() } else { "[REDACTED]".to_string() };
                    (k.clone(), shown)
                })
                .collect(),
        )
    }
}

impl fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("keys", &self.0.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Non-empty value of an environment variable.
fn env_value(env_var: &str) -> Option<String> {
    std::env::var(env_var).ok().filter(|v| !v.is_empty())
}

/// A securely-stored API credential.
///
/// This wrapper provides:
/// - Safe Debug implementation that shows `[REDACTED]`
/// - Memory zeroing on drop via `secrecy` crate
/// - Explicit exposure via `.expose()` method
/// - Source tracking for debugging
pub struct ApiCredential {
    value: SecretString,
    source: CredentialSource,
    name: &'static str,
}

impl ApiCredential {
    /// Create a new credential from a string value.
    ///
    /// The value is immediately wrapped in SecretString and cannot
    /// be accidentally logged after this point.
    pub fn new(value: impl Into<String>, source: CredentialSource, name: &'static str) -> Self {
        Self {
            value: SecretString::from(value.into()),
            source,
            name,
        }
    }

    /// Load credential from config, falling back to environment variable.
    ///
    /// 1. Use `config_key` from the config if present and non-empty
    /// 2. Otherwise fall back to `env_var`
    /// 3. Return error if neither is set
    pub fn from_config_or_env(
        config: &CredentialsConfig,
        config_key: &'static str,
        env_var: &'static str,
        name: &'static str,
    ) -> Result<Self, CredentialError> {
        if let Some(value) = config.get(config_key) {
            return Ok(Self::new(value, CredentialSource::Config, name));
        }

        if let Some(value) = env_value(env_var) {
            return Ok(Self::new(value, CredentialSource::Environment, name));
        }

        Err(CredentialError::Missing {
            name,
            config_key,
            env_var,
        })
    }

    /// Expose the credential value for use in API calls.
    ///
    /// Only call this where the credential is actually needed (e.g. setting
    /// an HTTP header). Never store the exposed value.
    pub fn expose(&self) -> &str {
        self.value.expose_secret()
    }

    /// Check if the credential is empty.
    pub fn is_empty(&self) -> bool {
        self.value.expose_secret().is_empty()
    }

    /// Get the source of this credential.
    pub fn source(&self) -> CredentialSource {
        self.source
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredential")
            .field("value", &"[REDACTED]")
            .field("source", &self.source)
            .field("name", &self.name)
            .finish()
    }
}

impl fmt::Display for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} from {} [REDACTED]", self.name, self.source)
    }
}

/// Builder for loading several credentials at once.
///
/// A validation run needs both the OCR and the analysis key; loading them
/// together reports the first missing one before any provider is built.
pub struct CredentialBuilder {
    required: Vec<CredentialSpec>,
}

struct CredentialSpec {
    config_key: &'static str,
    env_var: &'static str,
    name: &'static str,
}

impl CredentialBuilder {
    /// Create a new credential builder.
    pub fn new() -> Self {
        Self {
            required: Vec::new(),
        }
    }

    /// Add a required credential.
    pub fn require(
        mut self,
        config_key: &'static str,
        env_var: &'static str,
        name: &'static str,
    ) -> Self {
        self.required.push(CredentialSpec {
            config_key,
            env_var,
            name,
        });
        self
    }

    /// Build the credential set from config.
    pub fn build(self, config: &CredentialsConfig) -> Result<CredentialSet, CredentialError> {
        let mut credentials = BTreeMap::new();

        for spec in self.required {
            let cred =
                ApiCredential::from_config_or_env(config, spec.config_key, spec.env_var, spec.name)?;
            credentials.insert(spec.config_key, cred);
        }

        Ok(CredentialSet { credentials })
    }
}

impl Default for CredentialBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A set of loaded credentials.
pub struct CredentialSet {
    credentials: BTreeMap<&'static str, ApiCredential>,
}

impl CredentialSet {
    /// Move a credential out of the set, handing ownership to a provider.
    pub fn take(&mut self, key: &str) -> Result<ApiCredential, CredentialError> {
        self.credentials
            .remove(key)
            .ok_or_else(|| CredentialError::NotLoaded(key.to_string()))
    }
}

impl fmt::Debug for CredentialSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSet")
            .field("keys", &self.credentials.keys().collect::<Vec<_>>())
            .finish()
    }
}
