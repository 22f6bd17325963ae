//! Configuration loading and validation
//!
//! Configuration is TOML with kebab-case keys. Tunables that have sensible
//! defaults (worker count, trap threshold, minimum word count, backoff
//! bounds) may be omitted from the file.

mod parser;
mod types;
mod validation;

pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use types::{Config, CrawlerConfig, OutputConfig, ScopeConfig, UserAgentConfig};
pub use validation::validate;
