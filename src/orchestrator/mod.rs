// ABOUTME: Orchestrator module - the caller-facing entry point that classifies
// ABOUTME: a request and dispatches it to the matching execution path.

mod orchestrator;

pub use orchestrator::*;
