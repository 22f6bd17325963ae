use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Mutex;
use url::Url;

/// Append-only store of exact-content fingerprints
///
/// Each fingerprint is a SHA-256 of the page's normalized visible text and
/// maps to the first URL that produced it. Entries are never removed, so a
/// page that was once seen stays a duplicate for the rest of the process.
pub struct FingerprintStore {
    seen: Mutex<HashMap<String, String>>,
}

impl FingerprintStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self {
            seen: Mutex::new(HashMap::new()),
        }
    }

    /// Records a page's content fingerprint, reporting whether it is a duplicate
    ///
    /// The text is normalized (lower-cased, whitespace runs collapsed) before
    /// hashing, so pages that differ only in formatting hash identically.
    ///
    /// Check-and-insert happens under one lock: of two workers racing with
    /// identical content, exactly one is told "not a duplicate".
    ///
    /// # Returns
    ///
    /// * `true` - The fingerprint was already present; the caller must discard
    /// * `false` - First sighting; the fingerprint is now recorded
    pub fn record_and_check_duplicate(&self, text: &str, url: &Url) -> bool {
        let digest = fingerprint(text);

        let mut seen = self.seen.lock().unwrap();
        if seen.contains_key(&digest) {
            return true;
        }
        seen.insert(digest, url.to_string());
        false
    }

    /// Returns the first URL recorded for a given text, if any
    pub fn first_seen(&self, text: &str) -> Option<String> {
        let digest = fingerprint(text);
        self.seen.lock().unwrap().get(&digest).cloned()
    }

    /// Number of distinct fingerprints recorded
    pub fn len(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    /// Returns true if no fingerprints have been recorded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for FingerprintStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Computes the hex fingerprint of normalized text
fn fingerprint(text: &str) -> String {
    let normalized = normalize_text(text);
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    hex::encode(hasher.finalize())
}

/// Lower-cases text and collapses every whitespace run to a single space
fn normalize_text(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
