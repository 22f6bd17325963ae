//! Reporting: crawl events, aggregation, and the markdown report

mod report;

pub use report::{aggregate_events, event_channel, CrawlEvent, CrawlReport};

use thiserror::Error;

/// Errors that can occur while producing output
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
