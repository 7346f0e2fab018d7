// ABOUTME: Invoker module - runs one subagent's bounded tool-use loop.
// ABOUTME: Exposes the loop as an event stream and as a folded result.

mod event;
mod invoker;

pub use event::*;
pub use invoker::*;
