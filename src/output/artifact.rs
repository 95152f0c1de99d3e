use crate::site::JobRecord;
use serde::{Deserialize, Serialize};

/// Summary statistics for a finished batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    /// Sites in the input list
    pub total_sites: usize,

    /// Sites attempted so far, across all runs
    pub sites_completed: usize,

    /// Sites recorded as failed, across all runs
    pub sites_failed: usize,

    /// Pending sites not reached by this batch
    pub sites_remaining: usize,

    /// Sites processed by this batch
    pub batch_sites: usize,

    /// Jobs extracted by this batch
    pub batch_jobs: usize,

    /// Jobs in the artifact
    pub total_jobs: usize,

    /// Wall-clock duration of the batch, rounded to 0.1s
    pub time_seconds: f64,

    /// ISO 8601 timestamp of batch completion
    pub date: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_hash: Option<String>,
}

/// The aggregate jobs document
///
/// Only constructible through [`OutputArtifact::new`], which derives
/// `total_jobs` from the job list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputArtifact {
    total_jobs: usize,
    stats: RunStats,
    jobs: Vec<JobRecord>,
}

impl OutputArtifact {
    pub fn new(jobs: Vec<JobRecord>, stats: RunStats) -> Self {
        Self {
            total_jobs: jobs.len(),
            stats,
            jobs,
        }
    }

    pub fn total_jobs(&self) -> usize {
        self.total_jobs
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn jobs(&self) -> &[JobRecord] {
        &self.jobs
    }

    pub fn into_jobs(self) -> Vec<JobRecord> {
        self.jobs
    }
}

/// Rounds seconds to one decimal place
pub fn round_seconds(secs: f64) -> f64 {
    (secs * 10.0).round() / 10.0
}
