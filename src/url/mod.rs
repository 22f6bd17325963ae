//! URL handling: normalization, scope validation, host extraction
//!
//! Normalization produces the canonical identity a page is tracked under;
//! the scope filter decides whether that identity may be crawled at all.
//! Both are pure functions over their inputs.

mod domain;
mod normalize;
mod scope;

pub use domain::extract_host;
pub use normalize::normalize_url;
pub use scope::{matches_domain, ScopeFilter};
