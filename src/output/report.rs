//! Crawl event aggregation and report generation
//!
//! Workers emit fire-and-forget events; a single reporter task aggregates
//! them so no counters are mutated inline by the pipeline. The core
//! guarantees exactly one `PageAdmitted` per admitted page, which is what
//! makes the per-subdomain unique-page counts correct.

use crate::admission::DiscardReason;
use crate::output::OutputError;
use crate::url::extract_host;
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use url::Url;

/// A terminal crawl outcome, emitted once per URL
#[derive(Debug, Clone)]
pub enum CrawlEvent {
    /// A page passed every admission gate
    PageAdmitted { url: Url, word_count: usize },

    /// A page was classified out of the crawl
    PageDiscarded { url: Url, reason: DiscardReason },

    /// A redirect was recorded; its target continues as a new identity
    Redirected { url: Url, target: Option<Url> },

    /// A fetch failed permanently
    FetchFailed { url: Url },
}

/// Creates the event channel the workers publish into
pub fn event_channel() -> (UnboundedSender<CrawlEvent>, UnboundedReceiver<CrawlEvent>) {
    unbounded_channel()
}

/// Aggregated results of a crawl run
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// URL of the page with the most words, with its count
    pub longest_page: Option<(String, usize)>,

    /// Unique admitted pages per subdomain
    pub subdomain_pages: HashMap<String, u64>,

    /// Pages that passed admission
    pub admitted: u64,

    /// Discards per reason
    pub discarded: HashMap<DiscardReason, u64>,

    /// Redirects recorded
    pub redirects: u64,

    /// Permanent fetch failures
    pub failed: u64,
}

impl CrawlReport {
    /// Total discards across all reasons
    pub fn total_discarded(&self) -> u64 {
        self.discarded.values().sum()
    }

    /// Folds one event into the report
    fn record(&mut self, event: CrawlEvent) {
        match event {
            CrawlEvent::PageAdmitted { url, word_count } => {
                self.admitted += 1;

                if self
                    .longest_page
                    .as_ref()
                    .map_or(true, |(_, best)| word_count > *best)
                {
                    self.longest_page = Some((url.to_string(), word_count));
                }

                if let Some(host) = extract_host(&url) {
                    *self.subdomain_pages.entry(host).or_insert(0) += 1;
                }
            }
            CrawlEvent::PageDiscarded { reason, .. } => {
                *self.discarded.entry(reason).or_insert(0) += 1;
            }
            CrawlEvent::Redirected { .. } => {
                self.redirects += 1;
            }
            CrawlEvent::FetchFailed { .. } => {
                self.failed += 1;
            }
        }
    }

    /// Renders the report as markdown
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();

        out.push_str("# Crawl Report\n\n");
        out.push_str(&format!(
            "Generated: {}\n\n",
            chrono::Utc::now().to_rfc3339()
        ));

        out.push_str("## Outcomes\n\n");
        out.push_str(&format!("- Admitted pages: {}\n", self.admitted));
        out.push_str(&format!("- Discarded pages: {}\n", self.total_discarded()));
        out.push_str(&format!("- Redirects: {}\n", self.redirects));
        out.push_str(&format!("- Fetch failures: {}\n\n", self.failed));

        if !self.discarded.is_empty() {
            out.push_str("## Discards by reason\n\n");
            let mut reasons: Vec<_> = self.discarded.iter().collect();
            reasons.sort_by(|a, b| b.1.cmp(a.1));
            for (reason, count) in reasons {
                out.push_str(&format!("- {}: {}\n", reason, count));
            }
            out.push('\n');
        }

        out.push_str("## Longest page\n\n");
        match &self.longest_page {
            Some((url, words)) => {
                out.push_str(&format!("{} with {} words\n\n", url, words));
            }
            None => out.push_str("No pages admitted.\n\n"),
        }

        out.push_str("## Pages per subdomain\n\n");
        if self.subdomain_pages.is_empty() {
            out.push_str("None.\n");
        } else {
            let mut subdomains: Vec<_> = self.subdomain_pages.iter().collect();
            subdomains.sort_by(|a, b| a.0.cmp(b.0));
            for (subdomain, count) in subdomains {
                out.push_str(&format!("- {}: {} pages\n", subdomain, count));
            }
        }

        out
    }

    /// Writes the markdown report to a file
    pub fn write_to(&self, path: &Path) -> Result<(), OutputError> {
        std::fs::write(path, self.to_markdown())?;
        Ok(())
    }
}

/// Consumes events until every sender is dropped, then returns the report
pub async fn aggregate_events(mut rx: UnboundedReceiver<CrawlEvent>) -> CrawlReport {
    let mut report = CrawlReport::default();

    while let Some(event) = rx.recv().await {
        report.record(event);
    }

    tracing::debug!(
        "Reporter finished: {} admitted, {} discarded, {} failed",
        report.admitted,
        report.total_discarded(),
        report.failed
    );

    report
}
