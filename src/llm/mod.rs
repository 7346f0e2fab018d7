// ABOUTME: LLM module - the model transport seam consumed by the orchestrator.
// ABOUTME: Defines message types, the LlmClient trait, and the Anthropic adapter.

mod anthropic;
mod client;
mod types;

pub use anthropic::*;
pub use client::*;
pub use types::*;
