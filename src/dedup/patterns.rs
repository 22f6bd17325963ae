use regex::Regex;
use std::collections::HashMap;
use std::sync::Mutex;
use url::Url;

/// Placeholder substituted for every digit run in a URL pattern
const DIGIT_TOKEN: &str = "{n}";

/// Counts visits per URL pattern to flag likely crawl traps
///
/// Calendar pages, paginated listings, and parametrized query spaces produce
/// unbounded distinct URLs that collapse onto a single pattern once digit
/// runs are replaced. A pattern visited more than `threshold` times is
/// flagged as a trap. This is a heuristic: false positives are accepted as
/// the cost of bounding crawl size.
pub struct PatternCounter {
    counts: Mutex<HashMap<String, u32>>,
    threshold: u32,
    digits: Regex,
}

impl PatternCounter {
    /// Creates a counter with the given trap threshold
    pub fn new(threshold: u32) -> Self {
        Self {
            counts: Mutex::new(HashMap::new()),
            threshold,
            // Always compiles; the pattern is a literal
            digits: Regex::new(r"[0-9]+").unwrap(),
        }
    }

    /// Records a visit to the URL's pattern, reporting whether it is a trap
    ///
    /// Increment and check happen under one lock so concurrent workers never
    /// under-count a pattern.
    ///
    /// # Returns
    ///
    /// * `true` - This pattern has now been visited more than `threshold` times
    /// * `false` - Still below the threshold
    pub fn observe_pattern(&self, url: &Url) -> bool {
        let pattern = self.derive_pattern(url);

        let mut counts = self.counts.lock().unwrap();
        let count = counts.entry(pattern).or_insert(0);
        *count += 1;
        *count > self.threshold
    }

    /// Current visit count for a URL's pattern (0 if never seen)
    pub fn pattern_count(&self, url: &Url) -> u32 {
        let pattern = self.derive_pattern(url);
        self.counts.lock().unwrap().get(&pattern).copied().unwrap_or(0)
    }

    /// Derives the trap-detection key for a URL
    ///
    /// Host plus path (plus query when present), with every digit run
    /// replaced by a placeholder. The host is part of the key so identical
    /// paths on different sites do not pool into one counter.
    fn derive_pattern(&self, url: &Url) -> String {
        let host = url.host_str().unwrap_or("");
        let path = self.digits.replace_all(url.path(), DIGIT_TOKEN);

        match url.query() {
            Some(query) => {
                let query = self.digits.replace_all(query, DIGIT_TOKEN);
                format!("{}{}?{}", host, path, query)
            }
            None => format!("{}{}", host, path),
        }
    }
}
