//! Shared error definitions for configuration loading.

use thiserror::Error;

/// Result alias used by configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors produced while loading or validating descriptor documents.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A descriptor document could not be read from disk.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// A descriptor document was not valid YAML or used an unknown field value
    /// (for example an unrecognised provider tag).
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A descriptor failed semantic validation.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// Two descriptors of the same kind shared a name.
    #[error("duplicate {kind} descriptor `{name}`")]
    Duplicate {
        /// Descriptor kind ("model", "tool", or "workflow").
        kind: &'static str,
        /// The colliding name.
        name: String,
    },

    /// A workflow referenced a model or tool that is not declared.
    #[error("workflow `{workflow}` references unknown {kind} `{name}`")]
    UnknownReference {
        /// Name of the offending workflow.
        workflow: String,
        /// Referenced descriptor kind ("model" or "tool").
        kind: &'static str,
        /// The missing name.
        name: String,
    },
}

impl ConfigError {
    /// Creates a validation error from the supplied reason.
    #[must_use]
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }
}
