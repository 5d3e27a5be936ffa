//! Storage layer: the in-memory dataset and its on-disk mirror.
//!
//! The dataset lives in memory behind a `parking_lot::RwLock` and is replaced
//! wholesale on every successful save. Durability comes from atomic
//! temp-file + rename writes in [`persistence`].

/// Atomic dataset file read/write with corruption recovery.
pub mod persistence;

use crate::record::Record;
use parking_lot::RwLock;
use persistence::{read_dataset, write_dataset, LoadOutcome};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

/// Single source of truth for the dataset, backed by a JSON file.
///
/// Cheap to clone; clones share the same dataset. Owned by the composition
/// root and handed to request handlers through the application state, never
/// a process-wide global.
#[derive(Debug, Clone)]
pub struct Store {
    records: Arc<RwLock<Vec<Record>>>,
    path: Arc<PathBuf>,
}

impl Store {
    /// Open the store, creating or recovering the backing file as needed.
    ///
    /// An absent file starts an empty dataset; an unparsable one is moved
    /// aside to a timestamped backup and the dataset resets to empty; a bare
    /// object is coerced into a one-element dataset. In every non-`Loaded`
    /// case the resulting dataset is persisted immediately, so the file
    /// exists after startup.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let records = match read_dataset(&path)? {
            LoadOutcome::Loaded(records) => {
                tracing::info!("Loaded {} records from {:?}", records.len(), path);
                records
            }
            LoadOutcome::Missing => {
                write_dataset(&path, &[])?;
                tracing::info!("No data file at {:?}, starting empty", path);
                Vec::new()
            }
            LoadOutcome::Coerced(records) => {
                write_dataset(&path, &records)?;
                tracing::warn!("Data file {:?} was a bare object, wrapped into a dataset", path);
                records
            }
            LoadOutcome::Recovered { backup } => {
                write_dataset(&path, &[])?;
                tracing::warn!(
                    "Data file {:?} was corrupt, backed up to {:?}, starting empty",
                    path,
                    backup
                );
                Vec::new()
            }
        };

        Ok(Self {
            records: Arc::new(RwLock::new(records)),
            path: Arc::new(path),
        })
    }

    /// Replace the dataset wholesale.
    ///
    /// The in-memory swap commits only after the on-disk rename succeeds, so
    /// a failed save leaves both memory and disk at the previous dataset.
    /// Holding the write lock across the disk write serializes concurrent
    /// saves.
    pub fn replace(&self, new_dataset: Vec<Record>) -> io::Result<usize> {
        let mut records = self.records.write();
        write_dataset(&self.path, &new_dataset)?;
        let count = new_dataset.len();
        *records = new_dataset;
        Ok(count)
    }

    /// Snapshot of the current dataset for read handlers.
    pub fn snapshot(&self) -> Vec<Record> {
        self.records.read().clone()
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// True when the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Best-effort save of the current dataset for shutdown and crash paths.
    /// Failures are logged, never propagated.
    pub fn flush(&self) {
        let records = self.records.read();
        match write_dataset(&self.path, &records) {
            Ok(()) => tracing::info!("Flushed {} records to {:?}", records.len(), &*self.path),
            Err(e) => tracing::error!("Flush of {:?} failed: {}", &*self.path, e),
        }
    }

    /// Size and mtime of the backing file.
    pub fn file_stats(&self) -> io::Result<(u64, SystemTime)> {
        let meta = std::fs::metadata(&*self.path)?;
        Ok((meta.len(), meta.modified()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::dataset_from_value;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn sample() -> Vec<Record> {
        dataset_from_value(json!([
            {"id": "1", "Status": "Open"},
            {"id": "2", "Status": "Closed"}
        ]))
        .unwrap()
    }

    #[test]
    fn test_open_missing_creates_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        let store = Store::open(&path).unwrap();

        assert!(store.is_empty());
        assert!(path.exists());
        assert_eq!(fs::read_to_string(&path).unwrap().trim(), "[]");
    }

    #[test]
    fn test_replace_round_trips_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");

        let store = Store::open(&path).unwrap();
        store.replace(sample()).unwrap();
        drop(store);

        let reopened = Store::open(&path).unwrap();
        assert_eq!(reopened.snapshot(), sample());
    }

    #[test]
    fn test_open_recovers_from_corruption() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, b"<<<garbage>>>").unwrap();

        let store = Store::open(&path).unwrap();
        assert!(store.is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap().trim(), "[]");

        let backups: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|n| n.contains(".corrupt-"))
            .collect();
        assert_eq!(backups.len(), 1);
    }

    #[test]
    fn test_open_coerces_bare_object() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, br#"{"id": "only"}"#).unwrap();

        let store = Store::open(&path).unwrap();
        assert_eq!(store.len(), 1);

        // Coercion is persisted.
        let reopened = Store::open(&path).unwrap();
        assert_eq!(reopened.len(), 1);
    }

    #[test]
    fn test_failed_replace_leaves_memory_and_disk_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        let store = Store::open(&path).unwrap();
        store.replace(sample()).unwrap();

        // Make the rename fail by replacing the target with a non-empty dir.
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();
        fs::write(path.join("occupied"), b"x").unwrap();

        let attempted = dataset_from_value(json!([{"id": "3"}])).unwrap();
        assert!(store.replace(attempted).is_err());
        assert_eq!(store.snapshot(), sample());
    }

    #[test]
    fn test_flush_never_panics_on_failure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        let store = Store::open(&path).unwrap();

        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();
        fs::write(path.join("occupied"), b"x").unwrap();

        store.flush();
    }

    #[test]
    fn test_file_stats_reports_size() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        let store = Store::open(&path).unwrap();
        store.replace(sample()).unwrap();

        let (size, _mtime) = store.file_stats().unwrap();
        assert_eq!(size, fs::metadata(&path).unwrap().len());
        assert!(size > 2);
    }
}
