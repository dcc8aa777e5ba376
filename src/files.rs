//! Stateless directory-listing collaborator.
//!
//! A single-call file-system query with no lifecycle: given a path (or the
//! private application directory when none is supplied), return the entries
//! with their metadata. Entries that fail to stat are skipped.

use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error("path is not a valid directory or does not exist: {0}")]
    InvalidPath(String),

    #[error("failed to list files: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub name: String,
    pub path: String,
    pub is_directory: bool,
    pub size: u64,
    /// Milliseconds since the Unix epoch; 0 when unavailable.
    pub last_modified: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileListing {
    pub files: Vec<FileEntry>,
    pub path: String,
}

/// Answers directory-listing queries against the host file system.
pub struct FileQuery {
    default_dir: PathBuf,
}

impl FileQuery {
    pub fn new(default_dir: PathBuf) -> Self {
        Self { default_dir }
    }

    pub fn list(&self, path: Option<&str>) -> Result<FileListing, ListError> {
        let dir: &Path = match path {
            Some(p) => Path::new(p),
            None => &self.default_dir,
        };

        if !dir.is_dir() {
            return Err(ListError::InvalidPath(dir.display().to_string()));
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = match entry {
                Ok(e) => e,
                Err(_) => continue,
            };
            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(_) => continue,
            };

            let last_modified = metadata
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_millis() as i64)
                .unwrap_or(0);

            files.push(FileEntry {
                name: entry.file_name().to_string_lossy().to_string(),
                path: entry.path().to_string_lossy().to_string(),
                is_directory: metadata.is_dir(),
                size: metadata.len(),
                last_modified,
            });
        }

        Ok(FileListing {
            files,
            path: dir.to_string_lossy().to_string(),
        })
    }
}
