//! Shared crawl-session state
//!
//! Process-wide structures mutated concurrently by the worker pool, each
//! behind its own lock. No teardown beyond process exit.

mod politeness;
mod visited;

pub use politeness::{HostPoliteness, PolitenessTracker};
pub use visited::VisitedSet;
