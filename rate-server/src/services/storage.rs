//! Ratecard archive storage
//!
//! Uploaded sheets are archived under
//! `ratecards/<country-code>/<unix-timestamp>_<original-name>` relative
//! to the work dir, and retained forever.

use sha2::{Digest, Sha256};
use std::fs;
use std::path::PathBuf;

use crate::utils::AppError;

#[derive(Debug, Clone)]
pub struct StorageService {
    root: PathBuf,
}

/// Result of archiving one uploaded sheet
#[derive(Debug, Clone)]
pub struct ArchivedFile {
    /// Path relative to the work dir (stored in ratecard_file.path)
    pub rel_path: String,
    /// SHA-256 of the uploaded bytes
    pub checksum: String,
}

impl StorageService {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Absolute path for a stored relative path
    pub fn absolute(&self, rel_path: &str) -> PathBuf {
        self.root.join(rel_path)
    }

    /// Archive an uploaded sheet. `timestamp` is shared across the
    /// sheets of one upload so they sort together.
    pub fn archive_ratecard(
        &self,
        country_code: &str,
        original_name: &str,
        data: &[u8],
        timestamp: i64,
    ) -> Result<ArchivedFile, AppError> {
        let name = sanitize_filename(original_name);
        if name.is_empty() {
            return Err(AppError::invalid("Uploaded file has no usable name"));
        }

        let rel_path = format!(
            "ratecards/{}/{}_{}",
            country_code.to_lowercase(),
            timestamp,
            name
        );
        let target = self.root.join(&rel_path);
        if target.exists() {
            return Err(AppError::invalid(format!(
                "Sheet filename collides with an already archived file: {name}"
            )));
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::internal(format!("Failed to create archive dir: {e}")))?;
        }
        fs::write(&target, data)
            .map_err(|e| AppError::internal(format!("Failed to archive ratecard: {e}")))?;

        Ok(ArchivedFile {
            rel_path,
            checksum: hex::encode(Sha256::digest(data)),
        })
    }

    /// Best-effort removal, used to undo archiving when the import
    /// transaction fails
    pub fn remove(&self, rel_path: &str) {
        let _ = fs::remove_file(self.root.join(rel_path));
    }
}

/// Keep the final path component and reduce it to a safe character set
fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    cleaned.trim_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_paths_and_odd_characters() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("rates (v2).csv"), "rates__v2_.csv");
        assert_eq!(sanitize_filename("ok-name_1.csv"), "ok-name_1.csv");
        assert_eq!(sanitize_filename("..."), "");
    }

    #[test]
    fn archive_writes_under_country_dir_with_checksum() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageService::new(dir.path());

        let archived = storage
            .archive_ratecard("TL", "documents.csv", b"zone,weight,price\n", 1700000000)
            .unwrap();

        assert_eq!(archived.rel_path, "ratecards/tl/1700000000_documents.csv");
        assert!(storage.absolute(&archived.rel_path).is_file());
        assert_eq!(archived.checksum.len(), 64);

        // Same target again is refused
        let err = storage.archive_ratecard("TL", "documents.csv", b"x", 1700000000);
        assert!(err.is_err());
    }

    #[test]
    fn remove_is_best_effort() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageService::new(dir.path());
        let archived = storage
            .archive_ratecard("TL", "zones.csv", b"name,zone,transit_days\n", 1700000001)
            .unwrap();

        storage.remove(&archived.rel_path);
        assert!(!storage.absolute(&archived.rel_path).exists());
        // Removing again does not panic
        storage.remove(&archived.rel_path);
    }
}
