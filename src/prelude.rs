// ABOUTME: Prelude module - convenient imports for common use cases.
// ABOUTME: Use `use triage::prelude::*;` to get started quickly.

pub use crate::aggregator::{AggregatedResult, Aggregator, Conflict, Strategy, SubagentSummary};
pub use crate::classifier::{
    ClassificationMethod, ClassificationResult, Classifier, Complexity, RoutingDecision,
    DEEP_RESEARCH_SUBAGENT,
};
pub use crate::config::TriageConfig;
pub use crate::domain::Domain;
pub use crate::error::{
    ConfigError, LlmError, RegistryError, SettingsError, ToolError, TriageError,
};
pub use crate::invoker::{EventKind, InvocationEvent, InvocationResult, Invoker};
pub use crate::llm::{
    AnthropicClient, ContentBlock, LlmClient, Message, Request, Response, Role, StopReason,
    ToolDefinition, Usage,
};
pub use crate::orchestrator::{Orchestrator, Outcome};
pub use crate::registry::{
    ConfigSource, DirectorySource, MemorySource, SubagentConfig, SubagentRegistry,
};
pub use crate::research::{
    DeepResearch, DeepResearchResult, EvidenceStatus, Finding, ParsedReport, ResearchOptions,
    ResearchScope, VerificationSummary,
};
pub use crate::tool::{Tool, ToolRegistry, ToolResult};
