use crate::site::SiteTarget;
use crate::state::CrawlProgress;

/// The slice of pending sites selected for one invocation
///
/// Derived from the site list and the loaded progress; never persisted.
#[derive(Debug, Clone)]
pub struct BatchPlan {
    /// All sites not yet completed, in input order
    pub pending: Vec<SiteTarget>,

    /// The first `batch_size` entries of `pending`
    pub batch: Vec<SiteTarget>,
}

impl BatchPlan {
    pub fn new(all_sites: &[SiteTarget], progress: &CrawlProgress, batch_size: usize) -> Self {
        let pending = progress.pending(all_sites);
        let batch = pending.iter().take(batch_size).cloned().collect();
        Self { pending, batch }
    }

    /// Pending sites left untouched by this batch
    pub fn remaining(&self) -> usize {
        self.pending.len() - self.batch.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }
}
