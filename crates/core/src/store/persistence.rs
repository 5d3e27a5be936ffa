//! Disk persistence for the dataset file.
//!
//! The backing file is a plain JSON array of objects. Writes go through an
//! atomic temp-file + rename, so the real path is never observed in a
//! half-written state; a scoped guard removes the temp file on every failure
//! path. Unparsable files are moved aside to a timestamped backup instead of
//! aborting startup.

use crate::record::{dataset_from_value, Record};
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Outcome of reading the backing file at startup.
#[derive(Debug)]
pub enum LoadOutcome {
    /// File parsed as an array of objects.
    Loaded(Vec<Record>),
    /// File absent; the caller persists an empty dataset.
    Missing,
    /// File held a single bare object; it was coerced into a one-element
    /// dataset and should be re-persisted.
    Coerced(Vec<Record>),
    /// File was unreadable as a dataset and has been moved to `backup`.
    Recovered { backup: PathBuf },
}

/// Read and interpret the backing file.
///
/// I/O errors other than absence are returned as-is; parse-level problems are
/// resolved by coercion or backup, never surfaced as fatal.
pub fn read_dataset(path: &Path) -> io::Result<LoadOutcome> {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(LoadOutcome::Missing),
        Err(e) => return Err(e),
    };

    let value: Value = match serde_json::from_slice(&raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Data file {:?} is not valid JSON: {}", path, e);
            let backup = backup_corrupt(path)?;
            return Ok(LoadOutcome::Recovered { backup });
        }
    };

    match value {
        Value::Array(_) => match dataset_from_value(value) {
            Ok(records) => Ok(LoadOutcome::Loaded(records)),
            // An array with non-object elements can only come from external
            // tampering; the save boundary never writes one.
            Err(reason) => {
                tracing::warn!("Data file {:?} failed validation: {}", path, reason);
                let backup = backup_corrupt(path)?;
                Ok(LoadOutcome::Recovered { backup })
            }
        },
        Value::Object(map) => Ok(LoadOutcome::Coerced(vec![Record(map)])),
        other => {
            let kind = match other {
                Value::Null => "null",
                Value::Bool(_) => "boolean",
                Value::Number(_) => "number",
                _ => "string",
            };
            tracing::warn!(
                "Data file {:?} holds a bare {} instead of an array",
                path,
                kind
            );
            let backup = backup_corrupt(path)?;
            Ok(LoadOutcome::Recovered { backup })
        }
    }
}

/// Serialize and atomically write the dataset: write to a sibling temp file,
/// then rename over the real path.
pub fn write_dataset(path: &Path, dataset: &[Record]) -> io::Result<()> {
    let bytes = serde_json::to_vec_pretty(dataset).map_err(io::Error::other)?;

    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }

    let tmp_path = sibling_with_suffix(path, ".tmp");
    let guard = TempGuard::new(&tmp_path);
    fs::write(&tmp_path, &bytes)?;
    fs::rename(&tmp_path, path)?;
    guard.disarm();

    tracing::debug!(
        "Wrote dataset {:?} ({} records, {} bytes)",
        path,
        dataset.len(),
        bytes.len()
    );
    Ok(())
}

/// Move an unreadable data file aside to `<file>.corrupt-<unix-seconds>`.
fn backup_corrupt(path: &Path) -> io::Result<PathBuf> {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let backup = sibling_with_suffix(path, &format!(".corrupt-{ts}"));
    fs::rename(path, &backup)?;
    tracing::warn!("Backed up corrupt data file to {:?}", backup);
    Ok(backup)
}

fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Removes the temp file on drop unless the rename committed.
struct TempGuard<'a> {
    path: &'a Path,
    armed: bool,
}

impl<'a> TempGuard<'a> {
    fn new(path: &'a Path) -> Self {
        Self { path, armed: true }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for TempGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            let _ = fs::remove_file(self.path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn data_path(dir: &TempDir) -> PathBuf {
        dir.path().join("data.json")
    }

    #[test]
    fn test_write_then_read_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = data_path(&dir);
        let dataset =
            dataset_from_value(json!([{"id": "1", "Status": "Open"}, {"id": "2"}])).unwrap();

        write_dataset(&path, &dataset).unwrap();
        match read_dataset(&path).unwrap() {
            LoadOutcome::Loaded(records) => assert_eq!(records, dataset),
            other => panic!("expected Loaded, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            read_dataset(&data_path(&dir)).unwrap(),
            LoadOutcome::Missing
        ));
    }

    #[test]
    fn test_corrupt_file_is_backed_up() {
        let dir = TempDir::new().unwrap();
        let path = data_path(&dir);
        fs::write(&path, b"{not json at all").unwrap();

        let LoadOutcome::Recovered { backup } = read_dataset(&path).unwrap() else {
            panic!("expected Recovered");
        };
        assert!(backup.exists());
        assert!(!path.exists());
        assert!(backup
            .file_name()
            .unwrap()
            .to_string_lossy()
            .contains(".corrupt-"));
    }

    #[test]
    fn test_bare_object_is_coerced() {
        let dir = TempDir::new().unwrap();
        let path = data_path(&dir);
        fs::write(&path, br#"{"id": "1"}"#).unwrap();

        match read_dataset(&path).unwrap() {
            LoadOutcome::Coerced(records) => {
                assert_eq!(records.len(), 1);
                assert_eq!(records[0].0["id"], json!("1"));
            }
            other => panic!("expected Coerced, got {other:?}"),
        }
    }

    #[test]
    fn test_bare_scalar_is_recovered() {
        let dir = TempDir::new().unwrap();
        let path = data_path(&dir);
        fs::write(&path, b"42").unwrap();

        assert!(matches!(
            read_dataset(&path).unwrap(),
            LoadOutcome::Recovered { .. }
        ));
    }

    #[test]
    fn test_array_with_non_objects_is_recovered() {
        let dir = TempDir::new().unwrap();
        let path = data_path(&dir);
        fs::write(&path, br#"[{"a": 1}, 7]"#).unwrap();

        assert!(matches!(
            read_dataset(&path).unwrap(),
            LoadOutcome::Recovered { .. }
        ));
    }

    #[test]
    fn test_failed_write_cleans_up_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = data_path(&dir);
        // Make rename fail by turning the target into a non-empty directory.
        fs::create_dir(&path).unwrap();
        fs::write(path.join("occupied"), b"x").unwrap();

        let dataset = dataset_from_value(json!([{"id": "1"}])).unwrap();
        assert!(write_dataset(&path, &dataset).is_err());

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty(), "temp file leaked: {leftovers:?}");
    }
}
