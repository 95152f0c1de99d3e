use crate::output::OutputArtifact;
use crate::state::CrawlProgress;
use crate::storage::traits::{ProgressStore, StorageResult};

/// In-memory store that keeps every saved checkpoint
///
/// Used by the coordinator tests to inspect checkpoint cadence.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    progress: Option<CrawlProgress>,
    output: Option<OutputArtifact>,
    history: Vec<CrawlProgress>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that starts from previously persisted documents
    pub fn with_documents(progress: CrawlProgress, output: Option<OutputArtifact>) -> Self {
        Self {
            progress: Some(progress),
            output,
            history: Vec::new(),
        }
    }

    /// Every progress document saved so far, oldest first
    pub fn history(&self) -> &[CrawlProgress] {
        &self.history
    }

    pub fn output(&self) -> Option<&OutputArtifact> {
        self.output.as_ref()
    }
}

impl ProgressStore for MemoryStore {
    fn load_progress(&self) -> StorageResult<CrawlProgress> {
        Ok(self.progress.clone().unwrap_or_default())
    }

    fn save_progress(&mut self, progress: &CrawlProgress) -> StorageResult<()> {
        self.progress = Some(progress.clone());
        self.history.push(progress.clone());
        Ok(())
    }

    fn load_output(&self) -> StorageResult<Option<OutputArtifact>> {
        Ok(self.output.clone())
    }

    fn save_output(&mut self, artifact: &OutputArtifact) -> StorageResult<()> {
        self.output = Some(artifact.clone());
        Ok(())
    }
}
