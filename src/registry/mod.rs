// ABOUTME: Subagent registry module - loads declarative worker configurations.
// ABOUTME: Frontmatter parsing, configuration sources, and the immutable registry.

mod config;
mod parser;
mod registry;
mod source;

pub use config::SubagentConfig;
pub use parser::parse_record;
pub use registry::{RegistryStats, SubagentRegistry};
pub use source::{ConfigSource, DirectorySource, MemorySource};
