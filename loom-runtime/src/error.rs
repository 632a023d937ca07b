//! Error taxonomy for registries, agents, and workflow execution.

use loom_adapters::traits::AdapterError;
use loom_tools::ToolError;

/// Result alias for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors surfaced by the registries and the orchestration layer.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// A model name was requested that no loaded descriptor declares.
    #[error("model not found: {name}")]
    ModelNotFound {
        /// The requested model name.
        name: String,
    },

    /// No loaded model descriptor carries the default flag.
    #[error("no model is flagged as default")]
    MissingDefault,

    /// A workflow name was requested that no loaded descriptor declares.
    #[error("unknown workflow: {name}")]
    UnknownWorkflow {
        /// The requested workflow name.
        name: String,
    },

    /// A model provider call failed.
    #[error("adapter error: {0}")]
    Adapter(#[from] AdapterError),

    /// Tool resolution or execution failed.
    #[error("tool error: {0}")]
    Tool(#[from] ToolError),

    /// An external call exceeded its deadline.
    #[error("timed out waiting for {what}")]
    TimedOut {
        /// Description of the stalled operation.
        what: String,
    },
}

impl RuntimeError {
    /// Convenience constructor for [`RuntimeError::ModelNotFound`].
    #[must_use]
    pub fn model_not_found(name: impl Into<String>) -> Self {
        Self::ModelNotFound { name: name.into() }
    }

    /// Convenience constructor for [`RuntimeError::UnknownWorkflow`].
    #[must_use]
    pub fn unknown_workflow(name: impl Into<String>) -> Self {
        Self::UnknownWorkflow { name: name.into() }
    }

    /// Convenience constructor for [`RuntimeError::TimedOut`].
    #[must_use]
    pub fn timed_out(what: impl Into<String>) -> Self {
        Self::TimedOut { what: what.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_are_stable() {
        assert_eq!(
            RuntimeError::model_not_found("gpt-x").to_string(),
            "model not found: gpt-x"
        );
        assert_eq!(
            RuntimeError::MissingDefault.to_string(),
            "no model is flagged as default"
        );
        assert_eq!(
            RuntimeError::unknown_workflow("nope").to_string(),
            "unknown workflow: nope"
        );
        assert_eq!(
            RuntimeError::timed_out("tool run").to_string(),
            "timed out waiting for tool run"
        );
    }
}
