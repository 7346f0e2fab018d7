// ABOUTME: Defines the LlmClient trait - the transport abstraction that lets
// ABOUTME: classifier, invoker, and aggregator run against any model provider.

use async_trait::async_trait;

use super::{Request, Response};
use crate::error::LlmError;

/// Trait for LLM transport implementations.
///
/// Implementations are expected to be stateless per call so that many
/// invocations can share one client concurrently. Retry and backoff, if
/// any, live inside the implementation.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send one completion request and wait for the full reply.
    async fn create_message(&self, req: &Request) -> Result<Response, LlmError>;
}
