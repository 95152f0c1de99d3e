//! Jobsweep main entry point
//!
//! This is the command-line interface for the Jobsweep listing harvester.

use anyhow::Context;
use clap::Parser;
use jobsweep::config::{load_config_with_hash, Config};
use jobsweep::crawler::run_batch;
use jobsweep::output::{collect_statistics, print_statistics};
use jobsweep::proxy::{ProxyPool, ProxyProvider};
use jobsweep::site::{load_sites, SiteTarget};
use jobsweep::state::{BatchPlan, CrawlProgress};
use jobsweep::storage::{open_store, ProgressStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Jobsweep: a resumable job-listing harvester
///
/// Jobsweep walks a list of career sites one at a time, paginating each
/// site's job search until it is exhausted. Progress is checkpointed so a
/// run can be stopped and resumed, and each invocation processes one batch.
#[derive(Parser, Debug)]
#[command(name = "jobsweep")]
#[command(version = "1.0.0")]
#[command(about = "A resumable job-listing harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Start from scratch, ignoring previous progress and output
    #[arg(long)]
    fresh: bool,

    /// Show the next batch without fetching anything
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the persisted documents and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = match load_config_with_hash(cli.config.as_deref()) {
        Ok((cfg, hash)) => {
            match (&cli.config, &hash) {
                (Some(path), Some(hash)) => tracing::info!(
                    "Configuration loaded from {} (hash: {})",
                    path.display(),
                    hash
                ),
                _ => tracing::info!("Using default configuration"),
            }
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.stats {
        return handle_stats(&config);
    }

    let sites_path = Path::new(&config.input.sites_path);
    let sites = load_sites(sites_path)
        .with_context(|| format!("failed to load sites from {}", sites_path.display()))?;

    if cli.dry_run {
        handle_dry_run(&config, &sites, cli.fresh)
    } else {
        handle_run(config, sites, cli.fresh, config_hash).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("jobsweep=info,warn"),
            1 => EnvFilter::new("jobsweep=debug,info"),
            2 => EnvFilter::new("jobsweep=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn load_progress(config: &Config, fresh: bool) -> anyhow::Result<CrawlProgress> {
    if fresh {
        return Ok(CrawlProgress::new());
    }
    open_store(&config.output)
        .load_progress()
        .context("failed to load progress")
}

/// Handles the --dry-run mode: shows the next batch without fetching
fn handle_dry_run(config: &Config, sites: &[SiteTarget], fresh: bool) -> anyhow::Result<()> {
    let progress = load_progress(config, fresh)?;
    let plan = BatchPlan::new(sites, &progress, config.batch.batch_size);

    println!("=== Jobsweep Dry Run ===\n");

    println!("Input:");
    println!("  Sites: {} ({})", sites.len(), config.input.sites_path);
    println!("  Proxies: {}", config.input.proxies_path);

    println!("\nOutput:");
    println!("  Jobs: {}", config.output.jobs_path);
    println!("  Progress: {}", config.output.progress_path);

    println!("\nFetch:");
    println!("  Max retries: {}", config.fetch.max_retries);
    println!("  Backoff base: {}ms", config.fetch.base_delay_ms);
    println!(
        "  Politeness delay: {}-{}ms",
        config.fetch.jitter_min_ms, config.fetch.jitter_max_ms
    );
    println!("  Records per page: {}", config.fetch.per_page);

    println!("\nProgress:");
    println!("  Completed: {}", progress.completed.len());
    println!("  Pending: {}", plan.pending.len());

    println!("\nNext batch ({} sites):", plan.batch.len());
    for site in &plan.batch {
        println!("  - {}", site);
    }

    if plan.remaining() > 0 {
        println!("\n{} sites would remain after this batch", plan.remaining());
    }

    Ok(())
}

/// Handles the --stats mode: summarises the persisted documents
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let store = open_store(&config.output);

    println!("Output: {}", config.output.jobs_path);
    println!("Progress: {}\n", config.output.progress_path);

    let progress = store.load_progress().context("failed to load progress")?;
    let artifact = store.load_output().context("failed to load output")?;

    let stats = collect_statistics(artifact.as_ref(), &progress);
    print_statistics(&stats);

    Ok(())
}

/// Handles a normal run: processes the next batch
async fn handle_run(
    config: Config,
    sites: Vec<SiteTarget>,
    fresh: bool,
    config_hash: Option<String>,
) -> anyhow::Result<()> {
    if fresh {
        tracing::info!("Starting fresh (ignoring previous progress and output)");
    }

    let proxies = ProxyPool::load(Path::new(&config.input.proxies_path))?
        .map(|pool| Arc::new(pool) as Arc<dyn ProxyProvider>);

    let store = open_store(&config.output);
    let outcome = match run_batch(&config, &sites, proxies, store, fresh, config_hash).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Run failed: {}", e);
            return Err(e.into());
        }
    };

    tracing::info!("Output: {}", config.output.jobs_path);
    if outcome.stats.sites_remaining > 0 {
        tracing::info!(
            "Run again to process next {} sites",
            config.batch.batch_size.min(outcome.stats.sites_remaining)
        );
    }

    Ok(())
}
