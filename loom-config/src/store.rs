//! One-shot loading and validation of descriptor collections.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::descriptor::{ModelDescriptor, ToolDescriptor, WorkflowDescriptor};
use crate::error::{ConfigError, ConfigResult};

#[derive(Debug, Deserialize)]
struct ModelsDocument {
    models: Vec<ModelDescriptor>,
}

#[derive(Debug, Deserialize)]
struct ToolsDocument {
    tools: Vec<ToolDescriptor>,
}

#[derive(Debug, Deserialize)]
struct WorkflowsDocument {
    workflows: Vec<WorkflowDescriptor>,
}

/// Validated, in-memory descriptor collections.
///
/// Loading is a one-shot operation performed at registry construction; there
/// is no hot reload. Collections preserve document order, which matters for
/// default-model resolution and workflow listing.
#[derive(Clone, Debug, Default)]
pub struct ConfigStore {
    models: Vec<ModelDescriptor>,
    tools: Vec<ToolDescriptor>,
    workflows: Vec<WorkflowDescriptor>,
}

impl ConfigStore {
    /// Loads the three descriptor documents (`models.yaml`, `tools.yaml`,
    /// `workflows.yaml`) from the supplied directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when a document cannot be read,
    /// [`ConfigError::Parse`] when one is malformed, or a validation error
    /// when the collections are inconsistent.
    pub fn load(dir: impl AsRef<Path>) -> ConfigResult<Self> {
        let dir = dir.as_ref();
        let models = fs::read_to_string(dir.join("models.yaml"))?;
        let tools = fs::read_to_string(dir.join("tools.yaml"))?;
        let workflows = fs::read_to_string(dir.join("workflows.yaml"))?;
        let store = Self::from_yaml(&models, &tools, &workflows)?;
        debug!(
            models = store.models.len(),
            tools = store.tools.len(),
            workflows = store.workflows.len(),
            dir = %dir.display(),
            "configuration loaded"
        );
        Ok(store)
    }

    /// Parses and validates descriptor collections from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when a document is malformed or a
    /// validation error when the collections are inconsistent.
    pub fn from_yaml(models: &str, tools: &str, workflows: &str) -> ConfigResult<Self> {
        let models: ModelsDocument = serde_yaml::from_str(models)?;
        let tools: ToolsDocument = serde_yaml::from_str(tools)?;
        let workflows: WorkflowsDocument = serde_yaml::from_str(workflows)?;

        let store = Self {
            models: models.models,
            tools: tools.tools,
            workflows: workflows.workflows,
        };
        store.validate()?;
        Ok(store)
    }

    /// Returns the loaded model descriptors in document order.
    #[must_use]
    pub fn models(&self) -> &[ModelDescriptor] {
        &self.models
    }

    /// Returns the loaded tool descriptors in document order.
    #[must_use]
    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    /// Returns the loaded workflow descriptors in document order.
    #[must_use]
    pub fn workflows(&self) -> &[WorkflowDescriptor] {
        &self.workflows
    }

    /// Looks up a model descriptor by name.
    #[must_use]
    pub fn model(&self, name: &str) -> Option<&ModelDescriptor> {
        self.models.iter().find(|model| model.name == name)
    }

    /// Looks up a tool descriptor by name.
    #[must_use]
    pub fn tool(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.iter().find(|tool| tool.name == name)
    }

    /// Looks up a workflow descriptor by name.
    #[must_use]
    pub fn workflow(&self, name: &str) -> Option<&WorkflowDescriptor> {
        self.workflows.iter().find(|workflow| workflow.name == name)
    }

    /// Returns the model flagged as default, if any. The first flagged
    /// descriptor in document order wins; validation rejects more than one.
    #[must_use]
    pub fn default_model(&self) -> Option<&ModelDescriptor> {
        self.models.iter().find(|model| model.default)
    }

    fn validate(&self) -> ConfigResult<()> {
        check_unique("model", self.models.iter().map(|m| m.name.as_str()))?;
        check_unique("tool", self.tools.iter().map(|t| t.name.as_str()))?;
        check_unique("workflow", self.workflows.iter().map(|w| w.name.as_str()))?;

        for model in &self.models {
            if model.name.trim().is_empty() {
                return Err(ConfigError::invalid("model name must not be empty"));
            }
            if model.model.trim().is_empty() {
                return Err(ConfigError::invalid(format!(
                    "model `{}` must declare a provider model id",
                    model.name
                )));
            }
        }

        let defaults: Vec<&str> = self
            .models
            .iter()
            .filter(|model| model.default)
            .map(|model| model.name.as_str())
            .collect();
        if defaults.len() > 1 {
            return Err(ConfigError::invalid(format!(
                "at most one model may be flagged default, found {}: {}",
                defaults.len(),
                defaults.join(", ")
            )));
        }

        for tool in &self.tools {
            if tool.name.trim().is_empty() {
                return Err(ConfigError::invalid("tool name must not be empty"));
            }
        }

        for workflow in &self.workflows {
            if workflow.name.trim().is_empty() {
                return Err(ConfigError::invalid("workflow name must not be empty"));
            }
            if let Some(model) = &workflow.model {
                if self.model(model).is_none() {
                    return Err(ConfigError::UnknownReference {
                        workflow: workflow.name.clone(),
                        kind: "model",
                        name: model.clone(),
                    });
                }
            }
            for tool_ref in &workflow.tools {
                if self.tool(&tool_ref.name).is_none() {
                    return Err(ConfigError::UnknownReference {
                        workflow: workflow.name.clone(),
                        kind: "tool",
                        name: tool_ref.name.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

fn check_unique<'a>(
    kind: &'static str,
    names: impl Iterator<Item = &'a str>,
) -> ConfigResult<()> {
    let mut seen = Vec::new();
    for name in names {
        if seen.contains(&name) {
            return Err(ConfigError::Duplicate {
                kind,
                name: name.to_owned(),
            });
        }
        seen.push(name);
    }
    Ok(())
}
