//! Content admission pipeline
//!
//! Decides, per fetched page, whether the content is worth keeping and
//! crawling further. The pipeline is a fixed sequence of gates that
//! short-circuits at the first failure; every discard carries a distinct
//! reason so crawl behavior stays auditable. Discards are classifications,
//! not errors — the frontier entry is still completed by the caller.

mod links;
mod text;

pub use links::extract_hrefs;
pub use text::{count_words, extract_visible_text, tokenize};

use crate::crawler::FetchResponse;
use crate::dedup::{FingerprintStore, PatternCounter};
use crate::state::VisitedSet;
use crate::url::normalize_url;
use crate::UrlError;
use std::fmt;
use std::sync::Arc;
use url::Url;

/// Why a fetched page was discarded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscardReason {
    /// The canonical URL was already processed (e.g. via a redirect)
    AlreadyVisited,

    /// The URL pattern crossed the trap threshold
    TrapDetected,

    /// Success status but an empty or absent body
    Dead,

    /// Too little extracted text to be worth keeping
    LowInformation,

    /// Identical content was already seen under another URL
    DuplicateContent,
}

impl fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::AlreadyVisited => "already_visited",
            Self::TrapDetected => "trap_detected",
            Self::Dead => "dead",
            Self::LowInformation => "low_information",
            Self::DuplicateContent => "duplicate_content",
        };
        write!(f, "{}", label)
    }
}

/// A page that passed every admission gate
#[derive(Debug, Clone)]
pub struct AdmittedPage {
    /// Canonical URL recorded as visited (keyed off the final destination)
    pub canonical_url: Url,

    /// Number of word tokens extracted from the page
    pub word_count: usize,

    /// Candidate outbound links, absolute, not yet scope-filtered
    pub links: Vec<Url>,
}

/// Result of running a page through the admission gates
#[derive(Debug, Clone)]
pub enum AdmissionOutcome {
    /// Keep the page; crawl its links
    Admitted(AdmittedPage),

    /// Drop the page for the given reason
    Discarded(DiscardReason),
}

/// Orchestrates per-page admission decisions
///
/// Stateless itself; all state lives in the shared stores it consults.
pub struct AdmissionPipeline {
    visited: Arc<VisitedSet>,
    fingerprints: Arc<FingerprintStore>,
    patterns: Arc<PatternCounter>,
    min_word_count: usize,
}

impl AdmissionPipeline {
    /// Creates a pipeline over the session's shared stores
    pub fn new(
        visited: Arc<VisitedSet>,
        fingerprints: Arc<FingerprintStore>,
        patterns: Arc<PatternCounter>,
        min_word_count: usize,
    ) -> Self {
        Self {
            visited,
            fingerprints,
            patterns,
            min_word_count,
        }
    }

    /// Runs a fetched page through the admission gates
    ///
    /// Gate order: visited → trap → dead → low-information → duplicate.
    /// Bookkeeping keys off the canonical form of the *effective* URL — for
    /// a redirect-class response that is the resolved `Location` target, and
    /// when the fetch layer followed redirects itself it is the final URL it
    /// actually retrieved.
    ///
    /// # Errors
    ///
    /// A malformed effective URL propagates as `UrlError`: it means the
    /// fetch or extraction stage produced garbage, which is worth surfacing
    /// rather than silently discarding.
    pub fn admit(
        &self,
        requested: &Url,
        response: &FetchResponse,
    ) -> Result<AdmissionOutcome, UrlError> {
        tracing::trace!("Running admission gates for {}", requested);
        let effective = response.final_destination();
        let canonical = normalize_url(effective.as_str())?;

        if !self.visited.insert(&canonical) {
            return Ok(AdmissionOutcome::Discarded(DiscardReason::AlreadyVisited));
        }

        if self.patterns.observe_pattern(&canonical) {
            return Ok(AdmissionOutcome::Discarded(DiscardReason::TrapDetected));
        }

        if is_dead(response) {
            return Ok(AdmissionOutcome::Discarded(DiscardReason::Dead));
        }

        let body = response.body.as_deref().unwrap_or_default();
        let visible_text = extract_visible_text(body);
        let word_count = count_words(&visible_text);

        if word_count < self.min_word_count {
            return Ok(AdmissionOutcome::Discarded(DiscardReason::LowInformation));
        }

        if self
            .fingerprints
            .record_and_check_duplicate(&visible_text, &canonical)
        {
            return Ok(AdmissionOutcome::Discarded(DiscardReason::DuplicateContent));
        }

        let links = extract_hrefs(body, &effective);

        Ok(AdmissionOutcome::Admitted(AdmittedPage {
            canonical_url: canonical,
            word_count,
            links,
        }))
    }

    /// Returns true if the page carries enough text to be worth keeping
    pub fn has_sufficient_information(&self, response: &FetchResponse) -> bool {
        let body = response.body.as_deref().unwrap_or_default();
        count_words(&extract_visible_text(body)) >= self.min_word_count
    }
}

/// Returns true if the response claims success but carries no content
pub fn is_dead(response: &FetchResponse) -> bool {
    response.is_success() && response.body.as_deref().map_or(true, |b| b.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::FetchResponse;
    use std::collections::HashMap;

    fn pipeline(min_words: usize) -> AdmissionPipeline {
        AdmissionPipeline::new(
            Arc::new(VisitedSet::new()),
            Arc::new(FingerprintStore::new()),
            Arc::new(PatternCounter::new(10)),
            min_words,
        )
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn response(status: u16, requested: &Url, body: Option<&str>) -> FetchResponse {
        FetchResponse {
            status,
            effective_url: requested.clone(),
            headers: HashMap::new(),
            body: body.map(|b| b.as_bytes().to_vec()),
        }
    }

    fn body_with_words(count: usize) -> String {
        let words: Vec<String> = (0..count).map(|i| format!("word{}", i)).collect();
        format!("<html><body><p>{}</p></body></html>", words.join(" "))
    }

    #[test]
    fn test_admits_page_with_enough_words() {
        let pipeline = pipeline(100);
        let u = url("https://vision.ics.uci.edu/page");
        let body = body_with_words(150);
        let resp = response(200, &u, Some(&body));

        match pipeline.admit(&u, &resp).unwrap() {
            AdmissionOutcome::Admitted(page) => {
                assert_eq!(page.canonical_url.as_str(), "https://vision.ics.uci.edu/page");
                assert_eq!(page.word_count, 150);
                assert!(page.links.is_empty());
            }
            other => panic!("expected admission, got {:?}", other),
        }
    }

    #[test]
    fn test_second_visit_discarded() {
        let pipeline = pipeline(1);
        let u = url("https://example.com/page");
        let body = body_with_words(50);
        let resp = response(200, &u, Some(&body));

        assert!(matches!(
            pipeline.admit(&u, &resp).unwrap(),
            AdmissionOutcome::Admitted(_)
        ));
        assert!(matches!(
            pipeline.admit(&u, &resp).unwrap(),
            AdmissionOutcome::Discarded(DiscardReason::AlreadyVisited)
        ));
    }

    #[test]
    fn test_fragment_variant_is_already_visited() {
        let pipeline = pipeline(1);
        let body = body_with_words(50);

        let u1 = url("https://example.com/page");
        let resp1 = response(200, &u1, Some(&body));
        pipeline.admit(&u1, &resp1).unwrap();

        // Same page under a fragment; canonicalization collapses them.
        // Distinct body text keeps the duplicate-content gate out of the way.
        let u2 = url("https://example.com/page#top");
        let other_body = body_with_words(60);
        let resp2 = response(200, &u2, Some(&other_body));
        assert!(matches!(
            pipeline.admit(&u2, &resp2).unwrap(),
            AdmissionOutcome::Discarded(DiscardReason::AlreadyVisited)
        ));
    }

    #[test]
    fn test_dead_page_discarded() {
        let pipeline = pipeline(100);
        let u = url("https://example.com/empty");

        let resp = response(200, &u, Some(""));
        assert!(matches!(
            pipeline.admit(&u, &resp).unwrap(),
            AdmissionOutcome::Discarded(DiscardReason::Dead)
        ));

        let u2 = url("https://example.com/absent");
        let resp = response(200, &u2, None);
        assert!(matches!(
            pipeline.admit(&u2, &resp).unwrap(),
            AdmissionOutcome::Discarded(DiscardReason::Dead)
        ));
    }

    #[test]
    fn test_low_information_discarded() {
        let pipeline = pipeline(100);
        let u = url("https://example.com/thin");
        let body = body_with_words(20);
        let resp = response(200, &u, Some(&body));

        assert!(matches!(
            pipeline.admit(&u, &resp).unwrap(),
            AdmissionOutcome::Discarded(DiscardReason::LowInformation)
        ));
    }

    #[test]
    fn test_duplicate_content_discarded() {
        let pipeline = pipeline(10);
        let body = body_with_words(50);

        let u1 = url("https://example.com/original");
        let resp1 = response(200, &u1, Some(&body));
        assert!(matches!(
            pipeline.admit(&u1, &resp1).unwrap(),
            AdmissionOutcome::Admitted(_)
        ));

        let u2 = url("https://example.com/mirror");
        let resp2 = response(200, &u2, Some(&body));
        assert!(matches!(
            pipeline.admit(&u2, &resp2).unwrap(),
            AdmissionOutcome::Discarded(DiscardReason::DuplicateContent)
        ));
    }

    #[test]
    fn test_trap_pattern_discarded() {
        let pipeline = AdmissionPipeline::new(
            Arc::new(VisitedSet::new()),
            Arc::new(FingerprintStore::new()),
            Arc::new(PatternCounter::new(2)),
            1,
        );

        for day in 1..=2 {
            let u = url(&format!("https://example.com/cal/2024/{}", day));
            let body = body_with_words(30 + day);
            let resp = response(200, &u, Some(&body));
            assert!(matches!(
                pipeline.admit(&u, &resp).unwrap(),
                AdmissionOutcome::Admitted(_)
            ));
        }

        let u = url("https://example.com/cal/2024/3");
        let body = body_with_words(40);
        let resp = response(200, &u, Some(&body));
        assert!(matches!(
            pipeline.admit(&u, &resp).unwrap(),
            AdmissionOutcome::Discarded(DiscardReason::TrapDetected)
        ));
    }

    #[test]
    fn test_links_extracted_unfiltered() {
        let pipeline = pipeline(10);
        let u = url("https://vision.ics.uci.edu/page");
        let body = format!(
            "<html><body><p>{}</p>
            <a href=\"/research\">in scope</a>
            <a href=\"https://example.com\">out of scope</a>
            <a href=\"assets/img.png\">image</a>
            </body></html>",
            body_with_words(150)
        );
        let resp = response(200, &u, Some(&body));

        match pipeline.admit(&u, &resp).unwrap() {
            AdmissionOutcome::Admitted(page) => {
                // All three candidates survive extraction; scope filtering is
                // the caller's separate stage.
                assert_eq!(page.links.len(), 3);
            }
            other => panic!("expected admission, got {:?}", other),
        }
    }

    #[test]
    fn test_redirect_keys_off_location_target() {
        let pipeline = pipeline(1);
        let requested = url("https://example.com/old");

        let mut headers = HashMap::new();
        headers.insert("location".to_string(), "/new".to_string());
        let redirect = FetchResponse {
            status: 301,
            effective_url: requested.clone(),
            headers,
            body: None,
        };

        // The empty redirect body is discarded as low-information, but the
        // visited set must now hold the *target*, not the requested URL.
        pipeline.admit(&requested, &redirect).unwrap();

        let body = body_with_words(50);
        let target = url("https://example.com/new");
        let resp = response(200, &target, Some(&body));
        assert!(matches!(
            pipeline.admit(&target, &resp).unwrap(),
            AdmissionOutcome::Discarded(DiscardReason::AlreadyVisited)
        ));
    }

    #[test]
    fn test_has_sufficient_information() {
        let pipeline = pipeline(100);
        let u = url("https://example.com/page");

        let rich = body_with_words(150);
        assert!(pipeline.has_sufficient_information(&response(200, &u, Some(&rich))));

        let thin = body_with_words(20);
        assert!(!pipeline.has_sufficient_information(&response(200, &u, Some(&thin))));
    }

    #[test]
    fn test_is_dead() {
        let u = url("https://example.com/");
        assert!(is_dead(&response(200, &u, None)));
        assert!(is_dead(&response(200, &u, Some(""))));
        assert!(!is_dead(&response(200, &u, Some("content"))));
        // Non-success statuses are not "dead", they are failures
        assert!(!is_dead(&response(404, &u, None)));
    }
}
