//! The URL frontier: a durable work queue with completion tracking
//!
//! The frontier owns every `FrontierEntry` exclusively; workers never hold
//! entry state, they only request transitions through this interface. Queue
//! dedup lives here too: `add` is idempotent and re-adding any previously
//! seen URL, whatever its state, is a no-op.

mod sqlite;

pub use sqlite::SqliteFrontier;

use std::fmt;
use thiserror::Error;
use url::Url;

/// Errors from frontier operations
#[derive(Debug, Error)]
pub enum FrontierError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Stored URL is corrupt: {0}")]
    CorruptEntry(String),
}

/// Result type for frontier operations
pub type FrontierResult<T> = Result<T, FrontierError>;

/// Lifecycle state of a frontier entry
///
/// Transitions: Pending → InProgress → {Done, Failed}, with
/// InProgress → Pending on a transient fetch failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryState {
    /// Waiting to be handed to a worker
    Pending,

    /// Handed to a worker; outcome not yet known
    InProgress,

    /// Terminal: processed (admitted or discarded, either way complete)
    Done,

    /// Terminal: could not be processed
    Failed,
}

impl EntryState {
    /// Converts the state to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    /// Parses a state from its database string representation
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "done" => Some(Self::Done),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for EntryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}

/// Counts of frontier entries per state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrontierCounts {
    pub pending: u64,
    pub in_progress: u64,
    pub done: u64,
    pub failed: u64,
}

impl FrontierCounts {
    /// Total number of entries ever queued
    pub fn total(&self) -> u64 {
        self.pending + self.in_progress + self.done + self.failed
    }
}

/// Trait for frontier implementations
///
/// Implementations must be safe to call from multiple workers; callers wrap
/// them in a mutex and hold the lock only for the duration of one operation.
pub trait Frontier {
    /// Claims the next pending URL, moving it to InProgress
    ///
    /// Returns None when nothing is pending right now. Workers distinguish
    /// "idle while others finish" from "exhausted" via `counts()`.
    fn get_next(&mut self) -> FrontierResult<Option<Url>>;

    /// Queues a URL if it has never been seen before (idempotent)
    fn add(&mut self, url: &Url) -> FrontierResult<()>;

    /// Marks an in-progress URL complete
    fn mark_done(&mut self, url: &Url) -> FrontierResult<()>;

    /// Marks an in-progress URL as terminally failed
    fn mark_failed(&mut self, url: &Url) -> FrontierResult<()>;

    /// Returns an in-progress URL to pending after a transient failure
    fn requeue(&mut self, url: &Url) -> FrontierResult<()>;

    /// Current entry counts per state
    fn counts(&self) -> FrontierResult<FrontierCounts>;
}
