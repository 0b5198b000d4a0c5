//! Serving-directory access for the `/files/` route.
//!
//! # Responsibilities
//! - Resolve a URL file name to a path under the serving root
//! - Reject names that could escape the root
//! - Read and write whole files

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors from the serving directory.
#[derive(Debug, Error)]
pub enum FileError {
    /// Empty name, a separator, or a dot segment.
    #[error("invalid file name: {0:?}")]
    InvalidName(String),

    #[error("file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// A directory files are served from and uploaded into.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of `name` under the root. Only single, plain file names are accepted.
    pub fn resolve(&self, name: &str) -> Result<PathBuf, FileError> {
        let invalid = name.is_empty()
            || name == "."
            || name == ".."
            || name.contains(['/', '\\', '\0']);
        if invalid {
            return Err(FileError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(name))
    }

    /// Contents of the regular file `name`. Anything else under that name,
    /// a directory included, is reported as not found.
    pub async fn read(&self, name: &str) -> Result<Vec<u8>, FileError> {
        let path = self.resolve(name)?;
        match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) => return Err(FileError::NotFound(path)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(FileError::NotFound(path)),
            Err(source) => return Err(FileError::Read { path, source }),
        }
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(FileError::NotFound(path)),
            Err(source) => Err(FileError::Read { path, source }),
        }
    }

    /// Create or truncate `name` and write `data` into it.
    pub async fn write(&self, name: &str, data: &[u8]) -> Result<(), FileError> {
        let path = self.resolve(name)?;
        tokio::fs::write(&path, data)
            .await
            .map_err(|source| FileError::Write { path, source })
    }
}
