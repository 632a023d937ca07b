//! Shared model adapter trait and data structures.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result alias used by model adapters.
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Error type shared by adapter implementations.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Adapter is misconfigured or missing credentials.
    #[error("adapter not configured: {reason}")]
    Configuration {
        /// Additional context for the failure.
        reason: String,
    },

    /// The supplied request was invalid for the target model.
    #[error("invalid model request: {reason}")]
    InvalidRequest {
        /// Reason describing why the request could not be processed.
        reason: String,
    },

    /// Transport-level failures (network, protocol, etc.).
    #[error("adapter transport error: {reason}")]
    Transport {
        /// Additional context about the error.
        reason: String,
    },

    /// The provider did not respond within the configured deadline.
    #[error("adapter call timed out: {what}")]
    TimedOut {
        /// Description of the operation that timed out.
        what: String,
    },

    /// The provider returned a malformed or failing response.
    #[error("adapter response error: {reason}")]
    Response {
        /// Additional context about the response failure.
        reason: String,
    },
}

impl AdapterError {
    /// Convenience constructor for invalid requests.
    #[must_use]
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for configuration issues.
    #[must_use]
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for transport failures.
    #[must_use]
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for timeouts.
    #[must_use]
    pub fn timed_out(what: impl Into<String>) -> Self {
        Self::TimedOut { what: what.into() }
    }
}

/// Minimal metadata describing a model adapter instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdapterMetadata {
    provider: &'static str,
    model: String,
}

impl AdapterMetadata {
    /// Creates metadata for the supplied provider and model identifier.
    #[must_use]
    pub fn new(provider: &'static str, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Returns the provider identifier (e.g., "openai").
    #[must_use]
    pub const fn provider(&self) -> &'static str {
        self.provider
    }

    /// Returns the configured model name.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Roles supported in chat-style conversations.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System messages steer the assistant behaviour.
    System,
    /// User-authored content.
    User,
    /// Assistant (model) responses.
    Assistant,
    /// Tool output fed back into the conversation.
    Tool,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        })
    }
}

/// One turn in a chat-style conversation.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ChatMessage {
    role: MessageRole,
    content: String,
}

impl ChatMessage {
    /// Creates a new chat message.
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Creates a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// Creates a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Creates an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    /// Creates a tool-output message.
    #[must_use]
    pub fn tool(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Tool, content)
    }

    /// Returns the message role.
    #[must_use]
    pub const fn role(&self) -> MessageRole {
        self.role
    }

    /// Returns the message content.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Trait implemented by all model adapters.
///
/// Implementations are expected to block the caller (via `await`) until the
/// provider answers, bounding every call with their configured timeout.
#[async_trait]
pub trait ModelAdapter: Send + Sync {
    /// Returns basic metadata describing the adapter instance.
    fn metadata(&self) -> &AdapterMetadata;

    /// Sends a chat-style conversation and returns the model's reply text.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] when the request cannot be encoded, the
    /// transport fails, the deadline expires, or the provider rejects the
    /// call.
    async fn chat(&self, messages: &[ChatMessage]) -> AdapterResult<String>;

    /// Sends a single free-form prompt and returns the reply text.
    ///
    /// The default implementation wraps the prompt in a single user turn.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`ModelAdapter::chat`].
    async fn generate(&self, prompt: &str) -> AdapterResult<String> {
        self.chat(&[ChatMessage::user(prompt)]).await
    }
}

impl fmt::Debug for dyn ModelAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelAdapter")
            .field("metadata", self.metadata())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Upcase;

    #[async_trait]
    impl ModelAdapter for Upcase {
        fn metadata(&self) -> &AdapterMetadata {
            static METADATA: std::sync::OnceLock<AdapterMetadata> = std::sync::OnceLock::new();
            METADATA.get_or_init(|| AdapterMetadata::new("test", "upcase"))
        }

        async fn chat(&self, messages: &[ChatMessage]) -> AdapterResult<String> {
            Ok(messages
                .last()
                .map(|msg| msg.content().to_uppercase())
                .unwrap_or_default())
        }
    }

    #[tokio::test]
    async fn generate_delegates_to_chat() {
        let adapter = Upcase;
        let reply = adapter.generate("ping").await.unwrap();
        assert_eq!(reply, "PING");
    }

    #[test]
    fn roles_render_lowercase() {
        assert_eq!(MessageRole::System.to_string(), "system");
        assert_eq!(MessageRole::Tool.to_string(), "tool");
    }
}
