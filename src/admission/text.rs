//! Visible-text extraction and tokenization
//!
//! Word counts drive both the low-information gate and the per-page
//! statistics, so extraction skips markup that never renders (scripts,
//! styles) and tokenization matches word-boundary semantics: maximal runs of
//! alphanumeric characters or underscores, lower-cased.

use scraper::{Html, Selector};

/// Extracts the visible text of an HTML document
///
/// Script and style contents are excluded; everything else that would render
/// as text is concatenated with single-space separators.
pub fn extract_visible_text(markup: &[u8]) -> String {
    let html = String::from_utf8_lossy(markup);
    let document = Html::parse_document(&html);

    // Always parse: the selector is a literal
    let skip = Selector::parse("script, style, noscript").unwrap();

    let skipped: Vec<_> = document.select(&skip).map(|el| el.id()).collect();

    let mut parts: Vec<&str> = Vec::new();
    for node in document.tree.nodes() {
        if let Some(text) = node.value().as_text() {
            let inside_skipped = node
                .ancestors()
                .any(|ancestor| skipped.contains(&ancestor.id()));
            if !inside_skipped {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    parts.push(trimmed);
                }
            }
        }
    }

    parts.join(" ")
}

/// Splits text into word tokens
///
/// A token is a maximal run of alphanumeric characters or underscores,
/// lower-cased.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    lowered
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|token| !token.is_empty())
        .map(|token| token.to_string())
        .collect()
}

/// Counts word tokens in text
pub fn count_words(text: &str) -> usize {
    tokenize(text).len()
}
