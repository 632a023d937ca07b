//! Strongly typed descriptor records for models, tools, and workflows.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque parameter map attached to tool descriptors and overrides.
pub type ParamMap = Map<String, Value>;

/// Supported model providers.
///
/// Unknown tags are rejected during YAML deserialization, so the registries
/// never see an unrecognised provider at runtime.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI chat completion models.
    OpenAi,
    /// Google Gemini models.
    Google,
    /// Models hosted on Replicate.
    Replicate,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OpenAi => "openai",
            Self::Google => "google",
            Self::Replicate => "replicate",
        })
    }
}

/// Declarative description of one language model.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ModelDescriptor {
    /// Unique key used to reference the model from workflows.
    pub name: String,
    /// Provider responsible for serving the model.
    pub provider: ProviderKind,
    /// Provider-side model identifier (e.g. `gpt-4o-mini`).
    pub model: String,
    /// Sampling temperature applied when requests omit one.
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Whether responses should be streamed from the provider.
    #[serde(default)]
    pub streaming: bool,
    /// Marks this model as the fallback when a workflow names none.
    #[serde(default)]
    pub default: bool,
}

/// Declarative description of one auxiliary capability.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct ToolDescriptor {
    /// Unique key used to reference the tool from workflows.
    pub name: String,
    /// Human-readable description, surfaced in tool catalogs.
    #[serde(default)]
    pub description: String,
    /// When set, the tool's output is returned to the caller directly,
    /// bypassing further model turns.
    #[serde(default)]
    pub return_direct: bool,
    /// Construction-time parameters, interpreted by the tool itself.
    #[serde(default)]
    pub params: ParamMap,
}

/// Reference to a tool from within a workflow, with optional overrides.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ToolRef {
    /// Name of the referenced tool descriptor.
    pub name: String,
    /// Parameters overriding the descriptor defaults at construction time.
    #[serde(default)]
    pub params: ParamMap,
}

/// Declarative description of one named workflow.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct WorkflowDescriptor {
    /// Unique key used to select the workflow for execution.
    pub name: String,
    /// Human-readable description, surfaced by `--list`.
    #[serde(default)]
    pub description: String,
    /// Model reference; absent means "resolve the default model".
    #[serde(default)]
    pub model: Option<String>,
    /// Ordered tool references bound to the workflow agent.
    #[serde(default)]
    pub tools: Vec<ToolRef>,
    /// System message seeding the agent conversation.
    #[serde(default)]
    pub system_message: Option<String>,
}
