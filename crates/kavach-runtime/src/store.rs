//! Persistent slot for the latest validation report.
//!
//! There is exactly one slot, keyed `kycResult`. A successful run replaces
//! whatever is stored; nothing is merged and no history is kept.

use kavach_core::ValidationReport;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Key under which the report is stored.
pub const REPORT_KEY: &str = "kycResult";

/// Errors from the report store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Report store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Report serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Single-slot, last-write-wins report storage.
pub trait ReportStore: Send + Sync {
    /// Replace the stored report.
    fn put(&self, report: &ValidationReport) -> Result<(), StoreError>;

    /// The stored report, if any.
    fn get(&self) -> Result<Option<ValidationReport>, StoreError>;

    /// Remove the stored report. Clearing an empty store succeeds.
    fn clear(&self) -> Result<(), StoreError>;
}

/// Report store held in memory as serialized JSON.
#[derive(Debug, Default)]
pub struct InMemoryReportStore {
    slot: RwLock<Option<String>>,
}

impl InMemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReportStore for InMemoryReportStore {
    fn put(&self, report: &ValidationReport) -> Result<(), StoreError> {
        let json = serde_json::to_string(report)?;
        *self.slot.write() = Some(json);
        Ok(())
    }

    fn get(&self) -> Result<Option<ValidationReport>, StoreError> {
        match self.slot.read().as_deref() {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.slot.write() = None;
        Ok(())
    }
}

/// Report store backed by `<dir>/kycResult.json`.
#[derive(Debug, Clone)]
pub struct FileReportStore {
    dir: PathBuf,
}

impl FileReportStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the report file.
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", REPORT_KEY))
    }

    fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
        move |source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl ReportStore for FileReportStore {
    fn put(&self, report: &ValidationReport) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(report)?;
        std::fs::create_dir_all(&self.dir).map_err(Self::io_error(&self.dir))?;

        let path = self.path();
        let tmp = self.dir.join(format!(".{}.json.tmp", REPORT_KEY));
        std::fs::write(&tmp, json).map_err(Self::io_error(&tmp))?;
        std::fs::rename(&tmp, &path).map_err(Self::io_error(&path))?;

        tracing::debug!(path = %path.display(), "Report stored");
        Ok(())
    }

    fn get(&self) -> Result<Option<ValidationReport>, StoreError> {
        let path = self.path();
        match std::fs::read_to_string(&path) {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_error(&path)(e)),
        }
    }

    fn clear(&self) -> Result<(), StoreError> {
        let path = self.path();
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Report cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error(&path)(e)),
        }
    }
}
