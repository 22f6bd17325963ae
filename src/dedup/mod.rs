//! Duplicate and crawl-trap detection
//!
//! Two append-only structures shared by all workers: exact-content
//! fingerprints (near-duplicate pages under different URLs) and URL pattern
//! counters (unbounded parametrized URL spaces). Both use insert-if-absent
//! semantics under their own locks.

mod fingerprint;
mod patterns;

pub use fingerprint::FingerprintStore;
pub use patterns::PatternCounter;
