// ABOUTME: Tool module - the external tool collaborator seam.
// ABOUTME: Tool trait, results, an immutable registry, and allowlist views.

mod filter;
mod registry;
mod result;
mod traits;

pub use filter::*;
pub use registry::*;
pub use result::*;
pub use traits::*;

#[cfg(test)]
mod registry_test;
