//! Configurable model/tool workflow engine facade.
//!
//! Depend on this crate via `cargo add textloom`. It bundles the internal
//! crates behind feature flags so downstream users can enable only the
//! components they need.

#![warn(missing_docs, clippy::pedantic)]

/// Re-export descriptor schemas and configuration loading for convenience.
pub use loom_config as config;

/// Model provider adapters (enabled by `adapters` feature).
#[cfg(feature = "adapters")]
pub use loom_adapters as adapters;

/// Builtin tools and the tool registry (enabled by `tools` feature).
#[cfg(feature = "tools")]
pub use loom_tools as tools;

/// Registries, agents, and orchestration (enabled by `runtime` feature).
#[cfg(feature = "runtime")]
pub use loom_runtime as runtime;
