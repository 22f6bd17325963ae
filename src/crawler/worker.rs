//! The crawl worker loop
//!
//! Each worker independently pulls a URL from the frontier, waits out the
//! politeness delay for its host, fetches it, runs the admission pipeline,
//! and reports the outcome back to the frontier and the event sink. Workers
//! terminate once nothing is pending and no other worker has work in
//! flight, since in-flight pages may still add links.

use crate::admission::AdmissionOutcome;
use crate::crawler::CrawlSession;
use crate::output::CrawlEvent;
use crate::url::{extract_host, normalize_url};
use crate::{CrawlError, UrlError};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// How long an idle worker waits before re-checking the frontier
const IDLE_POLL: Duration = Duration::from_millis(100);

/// One member of the crawl pool
pub struct Worker {
    id: u32,
    session: Arc<CrawlSession>,
}

impl Worker {
    /// Creates a worker bound to a session
    pub fn new(id: u32, session: Arc<CrawlSession>) -> Self {
        Self { id, session }
    }

    /// Runs until the frontier is exhausted
    pub async fn run(self) {
        tracing::debug!("Worker {} started", self.id);

        loop {
            let next = { self.session.frontier.lock().unwrap().get_next() };

            match next {
                Ok(Some(url)) => {
                    if let Err(e) = self.process(&url).await {
                        tracing::error!("Worker {}: error processing {}: {}", self.id, url, e);
                        let mark = self.session.frontier.lock().unwrap().mark_failed(&url);
                        if let Err(mark_err) = mark {
                            tracing::error!(
                                "Worker {}: could not mark {} failed: {}",
                                self.id,
                                url,
                                mark_err
                            );
                            break;
                        }
                    }
                }
                Ok(None) => {
                    let counts = match self.session.frontier.lock().unwrap().counts() {
                        Ok(c) => c,
                        Err(e) => {
                            tracing::error!("Worker {}: frontier unusable: {}", self.id, e);
                            break;
                        }
                    };

                    if counts.in_progress == 0 {
                        tracing::info!("Worker {}: frontier exhausted, stopping", self.id);
                        break;
                    }

                    // Another worker may still discover links
                    tokio::time::sleep(IDLE_POLL).await;
                }
                Err(e) => {
                    tracing::error!("Worker {}: frontier unusable: {}", self.id, e);
                    break;
                }
            }
        }
    }

    /// Processes a single claimed URL through fetch and admission
    pub(crate) async fn process(&self, url: &Url) -> Result<(), CrawlError> {
        let host = extract_host(url).ok_or(UrlError::MissingHost)?;

        let wait = self.session.politeness.acquire(&host);
        if wait > Duration::ZERO {
            tracing::trace!("Worker {}: waiting {:?} before hitting {}", self.id, wait, host);
            tokio::time::sleep(wait).await;
        }

        match self.session.fetcher.fetch(url).await {
            Ok(resp) if resp.is_infrastructure_error() => {
                let delay = self.session.politeness.record_cache_error(&host);
                tracing::warn!(
                    "Fetch layer reported {} for {}; backing off {:?} and retrying",
                    resp.status,
                    url,
                    delay
                );
                tokio::time::sleep(delay).await;
                self.session.frontier.lock().unwrap().requeue(url)?;
            }

            Ok(resp) if resp.is_redirect() => {
                self.session.politeness.record_success(&host);
                let target = resp.redirect_target();

                match &target {
                    Some(t) => {
                        tracing::debug!("Redirect {} -> {}", url, t);
                        self.enqueue_candidate(t)?;
                    }
                    None => {
                        tracing::debug!("Redirect {} carries no usable Location", url);
                    }
                }

                let _ = self.session.events.send(CrawlEvent::Redirected {
                    url: url.clone(),
                    target,
                });
                self.session.frontier.lock().unwrap().mark_done(url)?;
            }

            Ok(resp) if resp.is_success() => {
                self.session.politeness.record_success(&host);

                match self.session.pipeline.admit(url, &resp) {
                    Ok(AdmissionOutcome::Admitted(page)) => {
                        let mut queued = 0;
                        for link in &page.links {
                            if self.enqueue_candidate(link)? {
                                queued += 1;
                            }
                        }

                        tracing::info!(
                            "Admitted {} ({} words, queued {} of {} links)",
                            page.canonical_url,
                            page.word_count,
                            queued,
                            page.links.len()
                        );
                        let _ = self.session.events.send(CrawlEvent::PageAdmitted {
                            url: page.canonical_url,
                            word_count: page.word_count,
                        });
                        self.session.frontier.lock().unwrap().mark_done(url)?;
                    }

                    Ok(AdmissionOutcome::Discarded(reason)) => {
                        tracing::info!("Discarded {} ({})", url, reason);
                        let _ = self.session.events.send(CrawlEvent::PageDiscarded {
                            url: url.clone(),
                            reason,
                        });
                        self.session.frontier.lock().unwrap().mark_done(url)?;
                    }

                    Err(e) => {
                        // The effective URL itself was malformed; that points
                        // at the fetch or extraction stage, so surface it
                        tracing::error!("Malformed effective URL for {}: {}", url, e);
                        self.session.frontier.lock().unwrap().mark_failed(url)?;
                    }
                }
            }

            Ok(resp) => {
                tracing::warn!(
                    "Fetch failed for {} (status {}); not retrying",
                    url,
                    resp.status
                );
                let _ = self
                    .session
                    .events
                    .send(CrawlEvent::FetchFailed { url: url.clone() });
                self.session.frontier.lock().unwrap().mark_done(url)?;
            }

            Err(e) => {
                tracing::warn!("Fetch error for {}: {}; not retrying", url, e);
                let _ = self
                    .session
                    .events
                    .send(CrawlEvent::FetchFailed { url: url.clone() });
                self.session.frontier.lock().unwrap().mark_done(url)?;
            }
        }

        Ok(())
    }

    /// Normalizes, scope-checks, and queues one candidate link
    ///
    /// Malformed candidates are skipped with a debug log: at this point the
    /// error names a bad href in someone else's markup, not a bug here.
    ///
    /// Returns true if the link was queued.
    fn enqueue_candidate(&self, link: &Url) -> Result<bool, CrawlError> {
        let normalized = match normalize_url(link.as_str()) {
            Ok(n) => n,
            Err(e) => {
                tracing::debug!("Skipping malformed candidate {}: {}", link, e);
                return Ok(false);
            }
        };

        if !self.session.scope.is_in_scope(&normalized) {
            return Ok(false);
        }

        self.session.frontier.lock().unwrap().add(&normalized)?;
        Ok(true)
    }
}
