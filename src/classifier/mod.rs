// ABOUTME: Classifier module - maps a free-text request to a routing decision.
// ABOUTME: Model-backed classification with a deterministic pattern fallback.

mod classifier;
mod patterns;
mod types;

pub use classifier::*;
pub use patterns::{DomainPatterns, PatternScore, DOMAIN_PATTERNS};
pub use types::*;
