//! Crawl orchestration: session assembly, seeding, and the worker pool
//!
//! All shared mutable state lives in one `CrawlSession` passed to every
//! worker, each structure behind its own lock. The session owns nothing
//! durable beyond the frontier handle; everything else evaporates with the
//! process.

mod fetcher;
mod worker;

pub use fetcher::{
    format_user_agent, Fetch, FetchError, FetchResponse, HttpFetcher, INFRA_STATUS_CEIL,
    INFRA_STATUS_FLOOR,
};
pub use worker::Worker;

use crate::admission::AdmissionPipeline;
use crate::config::{Config, CrawlerConfig, ScopeConfig};
use crate::dedup::{FingerprintStore, PatternCounter};
use crate::frontier::{Frontier, SqliteFrontier};
use crate::output::{aggregate_events, event_channel, CrawlEvent, CrawlReport};
use crate::state::{PolitenessTracker, VisitedSet};
use crate::url::{normalize_url, ScopeFilter};
use crate::{CrawlError, Result};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// Shared state for one crawl run
///
/// Owned by `run_crawl` and handed to every worker behind an `Arc`. Each
/// member guards its own synchronization; no operation spans two locks.
pub struct CrawlSession {
    /// Scope decisions for candidate links
    pub scope: ScopeFilter,

    /// Global per-host request spacing and backoff
    pub politeness: PolitenessTracker,

    /// Per-page admission gates
    pub pipeline: AdmissionPipeline,

    /// The work queue; sole owner of entry state
    pub frontier: Mutex<Box<dyn Frontier + Send>>,

    /// The external fetch layer
    pub fetcher: Arc<dyn Fetch>,

    /// Fire-and-forget outcome events
    pub events: UnboundedSender<CrawlEvent>,
}

impl CrawlSession {
    /// Assembles a session from configuration and collaborators
    pub fn new(
        crawler: &CrawlerConfig,
        scope: &ScopeConfig,
        frontier: Box<dyn Frontier + Send>,
        fetcher: Arc<dyn Fetch>,
        events: UnboundedSender<CrawlEvent>,
    ) -> Self {
        let politeness = PolitenessTracker::new(
            Duration::from_millis(crawler.politeness_delay_ms),
            Duration::from_millis(crawler.backoff_floor_ms),
            Duration::from_millis(crawler.backoff_cap_ms),
        );

        let pipeline = AdmissionPipeline::new(
            Arc::new(VisitedSet::new()),
            Arc::new(FingerprintStore::new()),
            Arc::new(PatternCounter::new(crawler.trap_threshold)),
            crawler.min_word_count,
        );

        Self {
            scope: ScopeFilter::new(scope),
            politeness,
            pipeline,
            frontier: Mutex::new(frontier),
            fetcher,
            events,
        }
    }
}

/// Runs a complete crawl
///
/// Opens the durable frontier (optionally clearing it for a fresh run),
/// seeds it from configuration, spawns the worker pool, and aggregates the
/// resulting events into a report, which is also written to the configured
/// report path.
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `fresh` - Whether to discard any previous frontier state
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed; aggregated results
/// * `Err(CrawlError)` - Setup failed before any worker started
pub async fn run_crawl(config: Config, fresh: bool) -> Result<CrawlReport> {
    let mut frontier = SqliteFrontier::open(Path::new(&config.output.frontier_path))?;
    if fresh {
        tracing::info!("Starting fresh: clearing frontier");
        frontier.clear()?;
    }

    seed_frontier(&mut frontier, &config)?;

    let fetcher: Arc<dyn Fetch> = Arc::new(HttpFetcher::new(&config.crawler, &config.user_agent)?);

    run_crawl_with(config, Box::new(frontier), fetcher).await
}

/// Runs the worker pool against prepared collaborators
///
/// Split out from [`run_crawl`] so tests can substitute frontier and fetch
/// implementations.
pub async fn run_crawl_with(
    config: Config,
    frontier: Box<dyn Frontier + Send>,
    fetcher: Arc<dyn Fetch>,
) -> Result<CrawlReport> {
    let (events, rx) = event_channel();
    let reporter = tokio::spawn(aggregate_events(rx));

    let session = Arc::new(CrawlSession::new(
        &config.crawler,
        &config.scope,
        frontier,
        fetcher,
        events,
    ));

    let started = std::time::Instant::now();
    tracing::info!("Starting crawl with {} workers", config.crawler.workers);

    let mut handles = Vec::new();
    for id in 0..config.crawler.workers {
        let worker = Worker::new(id, Arc::clone(&session));
        handles.push(tokio::spawn(worker.run()));
    }

    for (id, handle) in handles.into_iter().enumerate() {
        if let Err(e) = handle.await {
            tracing::error!("Worker {} terminated abnormally: {}", id, e);
        }
    }

    let counts = {
        let frontier = session.frontier.lock().unwrap();
        frontier.counts()?
    };

    // Close the event channel so the reporter drains and finishes
    drop(session);

    let report = reporter
        .await
        .map_err(|e| CrawlError::Task(format!("reporter task failed: {}", e)))?;

    tracing::info!(
        "Crawl completed in {:?}: {} done, {} failed, {} admitted",
        started.elapsed(),
        counts.done,
        counts.failed,
        report.admitted
    );

    report.write_to(Path::new(&config.output.report_path))?;
    tracing::info!("Report written to {}", config.output.report_path);

    Ok(report)
}

/// Seeds the frontier with the configured start URLs
///
/// Seeds must normalize and sit inside the crawl scope; anything else is a
/// configuration mistake worth failing loudly on.
fn seed_frontier(frontier: &mut SqliteFrontier, config: &Config) -> Result<()> {
    let scope = ScopeFilter::new(&config.scope);

    for seed in &config.seeds {
        let normalized = normalize_url(seed)?;
        if !scope.is_in_scope(&normalized) {
            return Err(CrawlError::Config(crate::ConfigError::InvalidUrl(format!(
                "seed '{}' is outside the configured crawl scope",
                seed
            ))));
        }
        frontier.add(&normalized)?;
        tracing::debug!("Seeded frontier with {}", normalized);
    }

    Ok(())
}
