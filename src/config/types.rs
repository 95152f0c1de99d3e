use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Jobsweep
///
/// Every section has defaults, so an empty file (or no file at all) yields a
/// usable configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub batch: BatchConfig,
    pub fetch: FetchConfig,
    pub client: ClientConfig,
}

/// Input file locations
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct InputConfig {
    /// Text file with one site URL per line
    pub sites_path: String,

    /// Optional text file with one proxy endpoint per line
    pub proxies_path: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            sites_path: "input/sites.txt".to_string(),
            proxies_path: "input/proxies.txt".to_string(),
        }
    }
}

/// Output document locations
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path to the aggregate jobs artifact
    pub jobs_path: String,

    /// Path to the checkpoint document
    pub progress_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            jobs_path: "output/jobs.json".to_string(),
            progress_path: "output/progress.json".to_string(),
        }
    }
}

/// Batch slicing and checkpoint cadence
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BatchConfig {
    /// Maximum number of pending sites processed per invocation
    pub batch_size: usize,

    /// Persist a checkpoint every N processed sites
    pub save_every: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 20,
            save_every: 5,
        }
    }
}

/// Retry and politeness settings for page fetches
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FetchConfig {
    /// Attempts per request, including the first one
    pub max_retries: u32,

    /// Backoff base in milliseconds; attempt N waits `base * 2^N`
    pub base_delay_ms: u64,

    /// Lower bound of the politeness delay before every attempt
    pub jitter_min_ms: u64,

    /// Upper bound of the politeness delay before every attempt
    pub jitter_max_ms: u64,

    /// Whole-request timeout in seconds
    pub timeout_secs: u64,

    /// Records requested per listing page
    pub per_page: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1000,
            jitter_min_ms: 300,
            jitter_max_ms: 800,
            timeout_secs: 15,
            per_page: 50,
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Browser profile presented to remote servers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserProfile {
    #[default]
    Chrome,
    Firefox,
}

/// HTTP client identity
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ClientConfig {
    pub profile: BrowserProfile,
}
