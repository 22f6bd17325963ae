//! Anchor extraction
//!
//! Turns raw markup into absolute candidate URLs resolved against the page's
//! effective (post-redirect) URL. Extraction is deliberately scope-blind:
//! scope filtering is a separate stage, so both are testable on their own.

use scraper::{Html, Selector};
use url::Url;

/// Extracts anchor references from markup as absolute URLs
///
/// Every `<a href>` is resolved against `base` and has its fragment
/// stripped. Non-navigable references (`javascript:`, `mailto:`, `tel:`,
/// `data:`, fragment-only anchors) are skipped, as are hrefs that fail to
/// resolve. No scope filtering happens here.
pub fn extract_hrefs(markup: &[u8], base: &Url) -> Vec<Url> {
    let html = String::from_utf8_lossy(markup);
    let document = Html::parse_document(&html);

    // Always parses; the selector is a literal
    let anchors = Selector::parse("a[href]").unwrap();

    let mut links = Vec::new();
    for element in document.select(&anchors) {
        if let Some(href) = element.value().attr("href") {
            if let Some(resolved) = resolve_href(href, base) {
                links.push(resolved);
            }
        }
    }

    links
}

/// Resolves one href against a base URL
///
/// Returns None for hrefs that should be excluded:
/// - javascript:, mailto:, tel:, data: schemes
/// - fragment-only links (same-page anchors)
/// - unresolvable references
/// - non-HTTP(S) URLs after resolution
fn resolve_href(href: &str, base: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    if href.starts_with('#') {
        return None;
    }

    match base.join(href) {
        Ok(mut absolute) => {
            if absolute.scheme() != "http" && absolute.scheme() != "https" {
                return None;
            }
            absolute.set_fragment(None);
            Some(absolute)
        }
        Err(_) => None,
    }
}
