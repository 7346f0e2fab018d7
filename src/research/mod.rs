// ABOUTME: Deep-research module - drives the research subagent and turns its
// ABOUTME: report into structured findings with a verification summary.

mod parser;
mod research;

pub use parser::*;
pub use research::*;

#[cfg(test)]
mod research_test;
