//! Scan history persisted as a JSON array in a single local file.
//!
//! Every mutation rewrites the whole file. There is no temp-file rename, so an
//! interrupted write leaves a truncated file that the next [`ScanLog::load`]
//! reads as an empty history.

use crate::error::ScanLogError;
use crate::models::{timestamp_now, ScanRecord};
use std::path::{Path, PathBuf};

/// In-memory scan history bound to its backing file.
#[derive(Debug)]
pub struct ScanLog {
    path: PathBuf,
    records: Vec<ScanRecord>,
}

impl ScanLog {
    /// Read the history at `path`.
    ///
    /// A missing, unreadable or corrupt file yields an empty history.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let records = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::debug!("Discarding unreadable scan log {}: {}", path.display(), e);
                Vec::new()
            }),
            Err(e) => {
                tracing::debug!("No scan log at {}: {}", path.display(), e);
                Vec::new()
            }
        };

        Self { path, records }
    }

    /// Records in insertion order.
    pub fn records(&self) -> &[ScanRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Newest first, paired with the index [`Self::delete`] expects.
    pub fn history(&self) -> impl Iterator<Item = (usize, &ScanRecord)> {
        self.records.iter().enumerate().rev()
    }

    /// Record a scan stamped with the current time.
    ///
    /// Blank input is ignored and returns `Ok(None)`.
    pub fn add(&mut self, barcode: &str) -> Result<Option<&ScanRecord>, ScanLogError> {
        let barcode = barcode.trim();
        if barcode.is_empty() {
            return Ok(None);
        }

        self.records.push(ScanRecord {
            barcode: barcode.to_string(),
            timestamp: timestamp_now(),
        });
        self.save()?;
        tracing::info!("Recorded scan {}", barcode);
        Ok(self.records.last())
    }

    /// Remove the record at `index`. Out-of-range indices are ignored.
    pub fn delete(&mut self, index: usize) -> Result<Option<ScanRecord>, ScanLogError> {
        if index >= self.records.len() {
            return Ok(None);
        }

        let removed = self.records.remove(index);
        self.save()?;
        Ok(Some(removed))
    }

    /// Drop every record.
    pub fn clear(&mut self) -> Result<(), ScanLogError> {
        self.records.clear();
        self.save()
    }

    fn save(&self) -> Result<(), ScanLogError> {
        let io_err = |source| ScanLogError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let contents = serde_json::to_string_pretty(&self.records)?;
        std::fs::write(&self.path, contents).map_err(|e| {
            tracing::error!("Failed to write scan log {}: {}", self.path.display(), e);
            io_err(e)
        })
    }
}
