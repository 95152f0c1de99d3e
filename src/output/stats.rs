//! Statistics display for persisted crawl data
//!
//! Backs the `--stats` mode: summarises the output artifact and the
//! checkpoint document without touching the network.

use crate::output::OutputArtifact;
use crate::state::CrawlProgress;
use std::collections::HashMap;

/// Crawl statistics summary
#[derive(Debug, Clone, Default)]
pub struct CrawlStatistics {
    /// Sites recorded as completed
    pub sites_completed: usize,

    /// Sites recorded as failed
    pub sites_failed: usize,

    /// Jobs in the output artifact
    pub jobs_in_output: usize,

    /// Jobs checkpointed but not yet flushed to the output
    pub jobs_buffered: usize,

    /// Job counts per company, from the output artifact
    pub jobs_by_company: HashMap<String, usize>,

    /// Timestamp of the last completed batch, if any
    pub last_run: Option<String>,
}

/// Collects statistics from the persisted documents
pub fn collect_statistics(
    artifact: Option<&OutputArtifact>,
    progress: &CrawlProgress,
) -> CrawlStatistics {
    let mut jobs_by_company = HashMap::new();
    if let Some(artifact) = artifact {
        for job in artifact.jobs() {
            *jobs_by_company.entry(job.company.clone()).or_insert(0) += 1;
        }
    }

    CrawlStatistics {
        sites_completed: progress.completed.len(),
        sites_failed: progress.failed.len(),
        jobs_in_output: artifact.map_or(0, |a| a.total_jobs()),
        jobs_buffered: progress.jobs.len(),
        jobs_by_company,
        last_run: artifact.map(|a| a.stats().date.clone()),
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Sites:");
    println!("  Completed: {}", stats.sites_completed);
    println!("  Failed: {}", stats.sites_failed);
    println!();

    println!("Jobs:");
    println!("  In output: {}", stats.jobs_in_output);
    println!("  Checkpointed, not yet flushed: {}", stats.jobs_buffered);
    if let Some(last_run) = &stats.last_run {
        println!("  Last batch finished: {}", last_run);
    }
    println!();

    if !stats.jobs_by_company.is_empty() {
        println!("Top Companies:");
        let mut counts: Vec<_> = stats.jobs_by_company.iter().collect();
        counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

        for (company, count) in counts.into_iter().take(10) {
            println!("  {}: {}", company, count);
        }
        println!();
    }

    let success_rate = if stats.sites_completed > 0 {
        let ok = stats.sites_completed.saturating_sub(stats.sites_failed);
        (ok as f64 / stats.sites_completed as f64) * 100.0
    } else {
        0.0
    };
    println!(
        "Success Rate: {:.1}% of completed sites extracted without error",
        success_rate
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::RunStats;
    use crate::site::{JobRecord, SiteTarget};

    fn job(company: &str, n: usize) -> JobRecord {
        JobRecord {
            title: format!("Role {}", n),
            company: company.to_string(),
            location: None,
            url: format!("https://{}.avature.net/JobDetail/{}", company, n),
            job_id: None,
            source_site: format!("https://{}.avature.net", company),
        }
    }

    #[test]
    fn test_collect_statistics() {
        let artifact = OutputArtifact::new(
            vec![job("acme", 1), job("acme", 2), job("globex", 3)],
            RunStats {
                date: "2026-10-19T00:00:00+00:00".to_string(),
                ..RunStats::default()
            },
        );
        let mut progress = CrawlProgress::new();
        let site = SiteTarget::parse("https://acme.avature.net").unwrap();
        progress.mark_completed(&site);
        progress.jobs.push(job("initech", 4));

        let stats = collect_statistics(Some(&artifact), &progress);
        assert_eq!(stats.sites_completed, 1);
        assert_eq!(stats.jobs_in_output, 3);
        assert_eq!(stats.jobs_buffered, 1);
        assert_eq!(stats.jobs_by_company["acme"], 2);
        assert_eq!(stats.last_run.as_deref(), Some("2026-10-19T00:00:00+00:00"));
    }

    #[test]
    fn test_collect_statistics_without_output() {
        let stats = collect_statistics(None, &CrawlProgress::new());
        assert_eq!(stats.jobs_in_output, 0);
        assert!(stats.last_run.is_none());
    }
}
