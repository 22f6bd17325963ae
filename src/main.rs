//! Scopecrawl main entry point
//!
//! Command-line interface for the scoped web crawler.

use anyhow::Context;
use clap::Parser;
use scopecrawl::config::load_config_with_hash;
use scopecrawl::crawler::run_crawl;
use scopecrawl::frontier::{Frontier, SqliteFrontier};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Scopecrawl: a scoped, polite web crawler
///
/// Crawls a configured set of allowed domains with a pool of concurrent
/// workers, respecting per-host politeness delays and filtering out crawl
/// traps, dead pages, and duplicate content.
#[derive(Parser, Debug)]
#[command(name = "scopecrawl")]
#[command(version = "1.0.0")]
#[command(about = "A scoped, polite web crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Start a fresh crawl, discarding previous frontier state
    #[arg(long)]
    fresh: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with = "status")]
    dry_run: bool,

    /// Show frontier progress counts and exit
    #[arg(long, conflicts_with = "dry_run")]
    status: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) =
        load_config_with_hash(&cli.config).context("failed to load configuration")?;
    tracing::info!("Configuration loaded (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    if cli.status {
        return handle_status(&config);
    }

    handle_crawl(config, cli.fresh).await
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("scopecrawl=info,warn"),
            1 => EnvFilter::new("scopecrawl=debug,info"),
            2 => EnvFilter::new("scopecrawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Handles --dry-run: shows the effective crawl setup without crawling
fn handle_dry_run(config: &scopecrawl::config::Config) {
    println!("=== Scopecrawl Dry Run ===\n");

    println!("Crawler:");
    println!("  Workers: {}", config.crawler.workers);
    println!(
        "  Politeness delay: {}ms per host",
        config.crawler.politeness_delay_ms
    );
    println!("  Trap threshold: {}", config.crawler.trap_threshold);
    println!("  Minimum word count: {}", config.crawler.min_word_count);
    println!(
        "  Backoff: {}ms floor, {}ms cap",
        config.crawler.backoff_floor_ms, config.crawler.backoff_cap_ms
    );

    println!("\nScope ({} allowed domains):", config.scope.allowed_domains.len());
    for domain in &config.scope.allowed_domains {
        println!("  - {}", domain);
    }
    println!(
        "  Excluded extensions: {}",
        config.scope.excluded_extensions.join(" ")
    );

    println!("\nOutput:");
    println!("  Frontier: {}", config.output.frontier_path);
    println!("  Report: {}", config.output.report_path);

    println!("\nSeeds ({}):", config.seeds.len());
    for seed in &config.seeds {
        println!("  - {}", seed);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles --status: shows frontier progress counts
fn handle_status(config: &scopecrawl::config::Config) -> anyhow::Result<()> {
    let frontier = SqliteFrontier::open(Path::new(&config.output.frontier_path))
        .context("failed to open frontier database")?;
    let counts = frontier.counts().context("failed to read frontier counts")?;

    println!("Frontier: {}\n", config.output.frontier_path);
    println!("  Pending:     {}", counts.pending);
    println!("  In progress: {}", counts.in_progress);
    println!("  Done:        {}", counts.done);
    println!("  Failed:      {}", counts.failed);
    println!("  Total:       {}", counts.total());

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: scopecrawl::config::Config, fresh: bool) -> anyhow::Result<()> {
    if fresh {
        tracing::info!("Starting fresh crawl (discarding previous frontier state)");
    } else {
        tracing::info!("Starting crawl (resuming previous frontier state if present)");
    }

    let report = run_crawl(config, fresh).await.context("crawl failed")?;

    println!("Crawl finished.");
    println!("  Admitted pages: {}", report.admitted);
    println!("  Discarded pages: {}", report.total_discarded());
    println!("  Fetch failures: {}", report.failed);
    if let Some((url, words)) = &report.longest_page {
        println!("  Longest page: {} ({} words)", url, words);
    }

    Ok(())
}
