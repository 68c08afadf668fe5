use crate::domain::error::{AppError, Result};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::warn;
use uuid::Uuid;

pub const LOCAL_STORAGE_FILE: &str = "local_storage.json";
pub const REPORT_DESCRIPTION_KEY: &str = "reportDescription";

fn io_err(msg: impl Into<String>) -> AppError {
    AppError::IoError(msg.into())
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .map_err(|e| io_err(format!("Failed to create dir {}: {e}", path.display())))?;
    Ok(())
}

/// Makes `data_dir` absolute against the working directory and creates it.
pub fn resolve_data_dir(data_dir: &Path) -> Result<PathBuf> {
    let resolved = if data_dir.is_absolute() {
        data_dir.to_path_buf()
    } else {
        std::env::current_dir()?.join(data_dir)
    };
    ensure_dir(&resolved)?;
    Ok(resolved)
}

pub fn ensure_evidence_dir(data_dir: &Path) -> Result<PathBuf> {
    let evidence_dir = data_dir.join("evidence");
    ensure_dir(&evidence_dir)?;
    Ok(evidence_dir)
}

/// Writes through a temp file and renames it over `path`.
pub fn atomic_write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    let tmp_path = path.with_extension(format!("tmp-{}", Uuid::new_v4()));
    {
        let mut file = fs::File::create(&tmp_path).map_err(|e| {
            io_err(format!(
                "Failed to create temp file {}: {e}",
                tmp_path.display()
            ))
        })?;
        file.write_all(bytes).map_err(|e| {
            io_err(format!(
                "Failed to write temp file {}: {e}",
                tmp_path.display()
            ))
        })?;
        file.sync_all().ok();
    }

    // Windows cannot rename over an existing file.
    if cfg!(windows) && path.exists() {
        fs::remove_file(path).map_err(|e| {
            io_err(format!("Failed to replace {}: {e}", path.display()))
        })?;
    }

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        io_err(format!(
            "Failed to rename temp file {} to {}: {e}",
            tmp_path.display(),
            path.display()
        ))
    })
}

/// String key/value pairs persisted as one JSON object, the way a browser's
/// local storage keeps page state between visits.
#[derive(Debug)]
pub struct KeyValueStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl KeyValueStore {
    /// Opens `local_storage.json` under `data_dir`. A missing file is empty;
    /// an unreadable one is logged and treated as empty.
    pub fn open(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(LOCAL_STORAGE_FILE);
        let entries = match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "Ignoring corrupt local storage file");
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .ok()
            .and_then(|entries| entries.get(key).cloned())
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| AppError::Internal("Local storage lock poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        let bytes = serde_json::to_vec_pretty(&*entries)?;
        atomic_write_bytes(&self.path, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");
        atomic_write_bytes(&path, b"one").unwrap();
        atomic_write_bytes(&path, b"two").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"two");

        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name() != "state.json")
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_key_value_store_persists_between_opens() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyValueStore::open(dir.path()).unwrap();
        assert_eq!(store.get(REPORT_DESCRIPTION_KEY), None);
        store
            .set(REPORT_DESCRIPTION_KEY, "Supplier spend report")
            .unwrap();

        let reopened = KeyValueStore::open(dir.path()).unwrap();
        assert_eq!(
            reopened.get(REPORT_DESCRIPTION_KEY).as_deref(),
            Some("Supplier spend report")
        );
    }

    #[test]
    fn test_corrupt_file_is_treated_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(LOCAL_STORAGE_FILE), b"{not json").unwrap();
        let store = KeyValueStore::open(dir.path()).unwrap();
        assert_eq!(store.get(REPORT_DESCRIPTION_KEY), None);
        store.set(REPORT_DESCRIPTION_KEY, "fresh").unwrap();
        assert_eq!(store.get(REPORT_DESCRIPTION_KEY).as_deref(), Some("fresh"));
    }

    #[test]
    fn test_resolve_data_dir_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("data");
        let resolved = resolve_data_dir(&target).unwrap();
        assert!(resolved.is_dir());
        let evidence = ensure_evidence_dir(&resolved).unwrap();
        assert!(evidence.ends_with("evidence"));
    }
}
