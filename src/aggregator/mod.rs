// ABOUTME: Aggregator module - merges several subagent results into one answer.
// ABOUTME: Model-driven synthesis, concatenation fallback, numeric conflicts.

mod aggregator;
mod conflict;
mod types;

pub use aggregator::*;
pub use conflict::*;
pub use types::*;
