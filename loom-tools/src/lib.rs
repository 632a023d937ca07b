//! Tool contract, builtin capabilities, and the caching tool registry.
//!
//! Every auxiliary capability implements the uniform [`Tool`] contract
//! (`run(input) -> output`); the [`registry::ToolRegistry`] resolves tool
//! names from descriptors into live, cached handles.

#![warn(missing_docs, clippy::pedantic)]

pub mod builtin;
pub mod registry;
mod tool;

pub use registry::ToolRegistry;
pub use tool::{Tool, ToolError, ToolHandle, ToolResult};
