//! Output module for the aggregate jobs artifact and run statistics

mod artifact;
pub mod stats;

pub use artifact::{round_seconds, OutputArtifact, RunStats};
pub use stats::{collect_statistics, print_statistics, CrawlStatistics};
