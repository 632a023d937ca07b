//! Registries, workflow agents, and orchestration for textloom.
//!
//! The runtime resolves validated descriptors into live, cached handles:
//! [`ModelRegistry`] for provider adapters, the tool registry from
//! `loom-tools` for capabilities, and [`Orchestrator`] for workflow agents
//! that bind a model, a tool set, and conversation memory. Callers enter
//! through [`WorkflowExecutor`], or through [`GenericWorkflow`] for the
//! single-call pipeline.

#![warn(missing_docs, clippy::pedantic)]

mod agent;
mod error;
mod executor;
mod generic;
mod memory;
mod models;
mod orchestrator;
mod prompt;

pub use agent::{DEFAULT_TOOL_TIMEOUT, DEFAULT_TURN_BUDGET, WorkflowAgent};
pub use error::{RuntimeError, RuntimeResult};
pub use executor::{WorkflowExecutor, WorkflowSummary};
pub use generic::{GenericOutcome, GenericWorkflow, SkippedTool};
pub use memory::ConversationMemory;
pub use models::{AdapterFactory, EnvAdapterFactory, ModelRegistry};
pub use orchestrator::Orchestrator;
pub use prompt::PromptTemplate;
