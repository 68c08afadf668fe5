use crate::domain::error::{AppError, Result};
use crate::domain::test_case::{Evidence, EvidenceHandle};
use crate::infrastructure::storage::{atomic_write_bytes, ensure_dir};
use base64::Engine as _;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

static UNSAFE_FILE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("valid file name pattern"));

/// Upload payload posted by the page: the file name plus its contents as a
/// base64 data URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceUpload {
    pub name: String,
    pub data_url: String,
}

/// Splits a `data:<mime>;base64,<payload>` URL into its mime type and bytes.
pub fn decode_data_url(data_url: &str) -> Result<(String, Vec<u8>)> {
    let (header, data) = data_url
        .split_once(',')
        .ok_or_else(|| AppError::ValidationError("Evidence is not a valid data URL".to_string()))?;

    if !header.starts_with("data:") || !header.contains(";base64") {
        return Err(AppError::ValidationError(
            "Evidence data is not base64 encoded".to_string(),
        ));
    }

    let mime = header
        .trim_start_matches("data:")
        .split(';')
        .next()
        .filter(|mime| !mime.is_empty())
        .unwrap_or("application/octet-stream")
        .to_string();

    let cleaned: String = data
        .trim()
        .trim_start_matches('\u{feff}')
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(cleaned.as_bytes())
        .or_else(|_| {
            let url_safe = cleaned.replace('-', "+").replace('_', "/");
            base64::engine::general_purpose::STANDARD.decode(url_safe.as_bytes())
        })
        .map_err(|e| AppError::ValidationError(format!("Failed to decode evidence payload: {e}")))?;

    Ok((mime, bytes))
}

/// Keeps letters, digits, dots, dashes and underscores.
pub fn sanitize_file_name(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(name);
    let cleaned = UNSAFE_FILE_CHARS.replace_all(base, "_");
    let cleaned = cleaned.trim_matches(|c| c == '_' || c == '.');
    if cleaned.is_empty() {
        "evidence".to_string()
    } else {
        cleaned.to_string()
    }
}

fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// A decoded upload waiting to be written.
#[derive(Debug)]
pub struct PreparedEvidence {
    name: String,
    mime_type: String,
    url: Option<String>,
    path: PathBuf,
    sha256: String,
    bytes: Vec<u8>,
}

impl PreparedEvidence {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Content-addressed store for uploaded evidence files.
#[derive(Debug, Clone)]
pub struct EvidenceStore {
    root: PathBuf,
}

impl EvidenceStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        ensure_dir(&root)?;
        Ok(Self { root })
    }

    /// Decodes and hashes an upload without touching the disk.
    pub fn prepare(&self, upload: &EvidenceUpload) -> Result<PreparedEvidence> {
        let name = upload.name.trim();
        if name.is_empty() {
            return Err(AppError::ValidationError(
                "Evidence file name is required".to_string(),
            ));
        }

        let (mime_type, bytes) = decode_data_url(&upload.data_url)?;
        let sha256 = hex::encode(Sha256::digest(&bytes));
        let stored_name = match extension_of(&sanitize_file_name(name)) {
            Some(ext) => format!("{}.{}", sha256, ext),
            None => sha256.clone(),
        };
        let url = mime_type
            .starts_with("image/")
            .then(|| upload.data_url.clone());

        Ok(PreparedEvidence {
            name: name.to_string(),
            mime_type,
            url,
            path: self.root.join(stored_name),
            sha256,
            bytes,
        })
    }

    /// Writes the bytes under their SHA-256 and returns the record to attach.
    /// Only images keep an inline `url`.
    pub fn commit(&self, prepared: PreparedEvidence) -> Result<Evidence> {
        let PreparedEvidence {
            name,
            mime_type,
            url,
            path,
            sha256,
            bytes,
        } = prepared;
        if !path.exists() {
            atomic_write_bytes(&path, &bytes)?;
        }

        info!(name = %name, size = bytes.len(), mime = %mime_type, "Stored evidence file");

        Ok(Evidence {
            name,
            mime_type,
            url,
            file: Some(EvidenceHandle {
                path,
                size: bytes.len() as u64,
                sha256,
            }),
        })
    }

    /// Deletes a stored file. Callers check that no remaining evidence points
    /// at it. Paths outside the store root are left alone.
    pub fn discard(&self, handle: &EvidenceHandle) -> Result<bool> {
        if !handle.path.starts_with(&self.root) {
            warn!(path = %handle.path.display(), "Refusing to delete file outside evidence dir");
            return Ok(false);
        }
        match fs::remove_file(&handle.path) {
            Ok(()) => {
                info!(path = %handle.path.display(), "Deleted evidence file");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::IoError(format!(
                "Failed to delete {}: {e}",
                handle.path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn save(store: &EvidenceStore, upload: &EvidenceUpload) -> Result<Evidence> {
        store.commit(store.prepare(upload)?)
    }

    fn data_url(mime: &str, bytes: &[u8]) -> String {
        format!(
            "data:{};base64,{}",
            mime,
            base64::engine::general_purpose::STANDARD.encode(bytes)
        )
    }

    #[test]
    fn test_decode_data_url() {
        let (mime, bytes) = decode_data_url(&data_url("text/plain", b"hello")).unwrap();
        assert_eq!(mime, "text/plain");
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn test_decode_rejects_plain_text() {
        assert!(matches!(
            decode_data_url("hello"),
            Err(AppError::ValidationError(_))
        ));
        assert!(decode_data_url("data:text/plain,hello").is_err());
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("row count (final).png"), "row_count_final_.png");
        assert_eq!(sanitize_file_name("***"), "evidence");
    }

    #[test]
    fn test_image_upload_keeps_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = EvidenceStore::new(dir.path().join("evidence")).unwrap();
        let upload = EvidenceUpload {
            name: "chart.PNG".into(),
            data_url: data_url("image/png", b"\x89PNG fake"),
        };

        let evidence = save(&store, &upload).unwrap();
        assert_eq!(evidence.name, "chart.PNG");
        assert_eq!(evidence.mime_type, "image/png");
        assert_eq!(evidence.url.as_deref(), Some(upload.data_url.as_str()));

        let handle = evidence.file.unwrap();
        assert_eq!(handle.size, 9);
        assert!(handle.path.to_string_lossy().ends_with(".png"));
        assert_eq!(fs::read(&handle.path).unwrap(), b"\x89PNG fake");
    }

    #[test]
    fn test_non_image_upload_has_no_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = EvidenceStore::new(dir.path()).unwrap();
        let evidence = save(
            &store,
            &EvidenceUpload {
                name: "counts.csv".into(),
                data_url: data_url("text/csv", b"a,b\n1,2\n"),
            },
        )
        .unwrap();
        assert_eq!(evidence.url, None);
        assert!(!evidence.is_image());
    }

    #[test]
    fn test_same_content_is_stored_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = EvidenceStore::new(dir.path()).unwrap();
        let upload = EvidenceUpload {
            name: "a.txt".into(),
            data_url: data_url("text/plain", b"same"),
        };
        let first = save(&store, &upload).unwrap();
        let second = save(&store, &upload).unwrap();
        assert_eq!(first.file, second.file);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_prepare_writes_nothing_until_commit() {
        let dir = tempfile::tempdir().unwrap();
        let store = EvidenceStore::new(dir.path()).unwrap();
        let prepared = store
            .prepare(&EvidenceUpload {
                name: "rows.txt".into(),
                data_url: data_url("text/plain", b"42"),
            })
            .unwrap();
        assert_eq!(prepared.name(), "rows.txt");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);

        let evidence = store.commit(prepared).unwrap();
        assert_eq!(fs::read(evidence.file.unwrap().path).unwrap(), b"42");
    }

    #[test]
    fn test_discard_deletes_only_inside_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = EvidenceStore::new(dir.path().join("evidence")).unwrap();
        let evidence = save(
            &store,
            &EvidenceUpload {
                name: "a.txt".into(),
                data_url: data_url("text/plain", b"gone"),
            },
        )
        .unwrap();
        let handle = evidence.file.unwrap();

        assert!(store.discard(&handle).unwrap());
        assert!(!handle.path.exists());
        assert!(!store.discard(&handle).unwrap());

        let outside = dir.path().join("keep.txt");
        fs::write(&outside, b"keep").unwrap();
        let foreign = EvidenceHandle {
            path: outside.clone(),
            size: 4,
            sha256: String::new(),
        };
        assert!(!store.discard(&foreign).unwrap());
        assert!(outside.exists());
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = EvidenceStore::new(dir.path()).unwrap();
        let err = save(
            &store,
            &EvidenceUpload {
                name: "  ".into(),
                data_url: data_url("text/plain", b"x"),
            },
        )
        .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
}
