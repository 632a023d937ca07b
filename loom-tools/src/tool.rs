//! Uniform capability contract and live tool handles.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

/// Result alias for tool operations.
pub type ToolResult<T> = Result<T, ToolError>;

/// Errors produced by tool resolution and invocation.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Requested tool has no descriptor in the loaded configuration.
    #[error("no configuration found for tool `{name}`")]
    UnknownTool {
        /// Name of the missing tool.
        name: String,
    },

    /// A descriptor exists but no implementation is available for it.
    #[error("tool `{name}` has no registered implementation")]
    Unsupported {
        /// Name of the unimplemented tool.
        name: String,
    },

    /// Construction-time parameters failed validation.
    #[error("invalid parameters for tool `{name}`: {reason}")]
    InvalidParams {
        /// Name of the tool.
        name: String,
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// Tool execution failed.
    #[error("tool execution failed: {reason}")]
    Execution {
        /// Human-readable error returned by the tool implementation.
        reason: String,
    },
}

impl ToolError {
    /// Creates an execution error from the supplied reason.
    #[must_use]
    pub fn execution(reason: impl Into<String>) -> Self {
        Self::Execution {
            reason: reason.into(),
        }
    }
}

/// Trait implemented by every auxiliary capability.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Invokes the tool with the given text input, returning text output.
    async fn run(&self, input: &str) -> ToolResult<String>;
}

/// Live, constructed tool handle returned by the registry.
#[derive(Clone)]
pub struct ToolHandle {
    name: Arc<str>,
    description: Arc<str>,
    return_direct: bool,
    executor: Arc<dyn Tool>,
}

impl std::fmt::Debug for ToolHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolHandle")
            .field("name", &self.name)
            .field("return_direct", &self.return_direct)
            .finish_non_exhaustive()
    }
}

impl ToolHandle {
    /// Creates a handle binding descriptor metadata to an implementation.
    #[must_use]
    pub fn new(
        name: impl Into<Arc<str>>,
        description: impl Into<Arc<str>>,
        return_direct: bool,
        executor: Arc<dyn Tool>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            return_direct,
            executor,
        }
    }

    /// Returns the tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns whether this tool's output should be returned to the caller
    /// directly, bypassing further model turns.
    #[must_use]
    pub const fn return_direct(&self) -> bool {
        self.return_direct
    }

    /// Executes the underlying tool implementation.
    ///
    /// # Errors
    ///
    /// Propagates any [`ToolError::Execution`] returned by the underlying
    /// implementation.
    pub async fn run(&self, input: &str) -> ToolResult<String> {
        self.executor.run(input).await
    }
}
