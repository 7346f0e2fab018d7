// ABOUTME: Root module for triage - request classification and subagent orchestration.
// ABOUTME: Re-exports the public types from submodules.

pub mod aggregator;
pub mod classifier;
pub mod config;
pub mod domain;
pub mod error;
mod extract;
pub mod invoker;
pub mod llm;
pub mod orchestrator;
pub mod prelude;
pub mod registry;
pub mod research;
pub mod tool;

#[cfg(test)]
mod test_support;

pub use error::TriageError;
