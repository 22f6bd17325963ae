use std::collections::HashSet;
use std::sync::Mutex;
use url::Url;

/// Set of normalized URLs already run through the admission pipeline
///
/// Distinct from the frontier's queue dedup: the frontier dedups what gets
/// *queued*, this set dedups what was *fetched and processed* — including
/// redirect targets that differ from the URL originally requested.
pub struct VisitedSet {
    urls: Mutex<HashSet<String>>,
}

impl VisitedSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self {
            urls: Mutex::new(HashSet::new()),
        }
    }

    /// Marks a URL visited, reporting whether this is the first visit
    ///
    /// # Returns
    ///
    /// * `true` - The URL was not yet visited and is now recorded
    /// * `false` - Already visited
    pub fn insert(&self, url: &Url) -> bool {
        self.urls.lock().unwrap().insert(url.to_string())
    }

    /// Returns true if the URL has been visited
    pub fn contains(&self, url: &Url) -> bool {
        self.urls.lock().unwrap().contains(url.as_str())
    }

    /// Number of visited URLs
    pub fn len(&self) -> usize {
        self.urls.lock().unwrap().len()
    }

    /// Returns true if nothing has been visited yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for VisitedSet {
    fn default() -> Self {
        Self::new()
    }
}
