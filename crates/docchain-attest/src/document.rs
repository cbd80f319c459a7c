//! Document selection.
//!
//! A document is read in full when a workflow hashes it. Nothing is read at
//! selection time.

use std::path::{Path, PathBuf};

use docchain_core::HashError;

/// Where a selected document's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    /// A file on disk, read when hashed.
    Path(PathBuf),
    /// Bytes already in memory.
    Bytes(Vec<u8>),
}

/// A document selected for attestation or verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    name: String,
    source: DocumentSource,
}

impl Document {
    /// Select a file. The display name is the file name.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            source: DocumentSource::Path(path),
        }
    }

    /// Select in-memory bytes under a display name.
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            source: DocumentSource::Bytes(bytes.into()),
        }
    }

    /// Display name sent to the content store.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The byte source.
    pub fn source(&self) -> &DocumentSource {
        &self.source
    }

    /// Read the whole document.
    pub async fn read(&self) -> Result<Vec<u8>, HashError> {
        match &self.source {
            DocumentSource::Bytes(bytes) => Ok(bytes.clone()),
            DocumentSource::Path(path) => tokio::fs::read(path).await.map_err(|e| read_error(path, e)),
        }
    }
}

fn read_error(path: &Path, source: std::io::Error) -> HashError {
    HashError::Read {
        source_name: path.display().to_string(),
        source,
    }
}
