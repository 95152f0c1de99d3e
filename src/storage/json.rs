//! JSON file storage backend
//!
//! Each document is written to a temporary file next to its target and then
//! renamed over it, so a reader (or a resumed run) never observes a
//! half-written checkpoint.

use crate::output::OutputArtifact;
use crate::state::CrawlProgress;
use crate::storage::traits::{ProgressStore, StorageError, StorageResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Stores progress and output as pretty-printed JSON files
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    progress_path: PathBuf,
    output_path: PathBuf,
}

impl JsonFileStore {
    pub fn new(progress_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            progress_path: progress_path.into(),
            output_path: output_path.into(),
        }
    }

    pub fn progress_path(&self) -> &Path {
        &self.progress_path
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }
}

impl ProgressStore for JsonFileStore {
    fn load_progress(&self) -> StorageResult<CrawlProgress> {
        Ok(read_document(&self.progress_path)?.unwrap_or_default())
    }

    fn save_progress(&mut self, progress: &CrawlProgress) -> StorageResult<()> {
        write_document(&self.progress_path, progress)
    }

    fn load_output(&self) -> StorageResult<Option<OutputArtifact>> {
        read_document(&self.output_path)
    }

    fn save_output(&mut self, artifact: &OutputArtifact) -> StorageResult<()> {
        write_document(&self.output_path, artifact)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn json_error(path: &Path, source: serde_json::Error) -> StorageError {
    StorageError::Serialization {
        path: path.display().to_string(),
        source,
    }
}

fn read_document<T: DeserializeOwned>(path: &Path) -> StorageResult<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    let document = serde_json::from_str(&content).map_err(|e| json_error(path, e))?;
    Ok(Some(document))
}

fn write_document<T: Serialize>(path: &Path, document: &T) -> StorageResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;

    let mut file = NamedTempFile::new_in(dir).map_err(|e| io_error(dir, e))?;
    serde_json::to_writer_pretty(&mut file, document).map_err(|e| json_error(path, e))?;
    file.write_all(b"\n").map_err(|e| io_error(path, e))?;
    file.as_file().sync_all().map_err(|e| io_error(path, e))?;
    file.persist(path).map_err(|e| io_error(path, e.error))?;

    tracing::trace!("Wrote {}", path.display());
    Ok(())
}
