// cbm-core/src/inventory.rs
//! Persisted list of installed builds.
//!
//! The file is owned by a single process at a time. Writes go through a
//! temporary file in the same directory followed by a rename, so a crash
//! never leaves a half-written inventory behind.
use std::fs;
use std::io::{ErrorKind as IoErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cbm_common::error::{CbmError, Result};
use cbm_common::model::{Architecture, InstallRecord, Locale, VersionId};
use tempfile::NamedTempFile;
use tracing::{debug, error};

#[derive(Debug, Clone)]
pub struct Inventory {
    path: PathBuf,
}

impl Inventory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads all records. A missing file is an empty inventory; a file that
    /// does not parse is an error, never silently discarded.
    pub fn load(&self) -> Result<Vec<InstallRecord>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == IoErrorKind::NotFound => {
                debug!("No inventory at {}, starting empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        let records: Vec<InstallRecord> = serde_json::from_slice(&bytes).map_err(|e| {
            error!("Inventory {} is malformed: {}", self.path.display(), e);
            CbmError::Json(Arc::new(e))
        })?;
        debug!(
            "Loaded {} record(s) from {}",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }

    pub fn save(&self, records: &[InstallRecord]) -> Result<()> {
        let dir = self.path.parent().ok_or_else(|| {
            CbmError::IoError(format!(
                "Cannot get parent directory for {}",
                self.path.display()
            ))
        })?;
        fs::create_dir_all(dir)?;

        let mut content = serde_json::to_vec_pretty(records)?;
        content.push(b'\n');

        let mut temp_file = NamedTempFile::new_in(dir)?;
        temp_file.write_all(&content)?;
        temp_file.flush()?;
        temp_file.as_file().sync_all()?;
        temp_file.persist(&self.path).map_err(|e| {
            error!(
                "Failed to persist inventory over {}: {}",
                self.path.display(),
                e.error
            );
            CbmError::Io(Arc::new(e.error))
        })?;
        debug!(
            "Saved {} record(s) to {}",
            records.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Drops every record with the identity of `record`, then appends it.
pub fn upsert(mut records: Vec<InstallRecord>, record: InstallRecord) -> Vec<InstallRecord> {
    records.retain(|r| !r.same_identity(&record));
    records.push(record);
    records
}

/// Drops the record identified by the triple. Unknown triples are a no-op.
pub fn remove(
    mut records: Vec<InstallRecord>,
    version: &VersionId,
    arch: Architecture,
    locale: &Locale,
) -> Vec<InstallRecord> {
    records.retain(|r| !r.matches(version, arch, locale));
    records
}
