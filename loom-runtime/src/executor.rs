//! Caller-facing facade over the orchestrator.

use std::sync::Arc;

use loom_config::ConfigStore;
use loom_tools::ToolRegistry;

use crate::error::RuntimeResult;
use crate::models::ModelRegistry;
use crate::orchestrator::Orchestrator;

/// Name and description of one available workflow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkflowSummary {
    /// Workflow name, as declared in configuration.
    pub name: String,
    /// Human-readable description.
    pub description: String,
}

/// External entry point: lists workflows and forwards execution requests.
#[derive(Debug)]
pub struct WorkflowExecutor {
    orchestrator: Orchestrator,
}

impl WorkflowExecutor {
    /// Creates an executor wiring the default registries over the store.
    #[must_use]
    pub fn new(config: ConfigStore) -> Self {
        let config = Arc::new(config);
        let models = Arc::new(ModelRegistry::new(config.models().to_vec()));
        let tools = Arc::new(ToolRegistry::new(config.tools().to_vec()));
        Self {
            orchestrator: Orchestrator::new(config, models, tools),
        }
    }

    /// Creates an executor over a pre-built orchestrator.
    #[must_use]
    pub fn with_orchestrator(orchestrator: Orchestrator) -> Self {
        Self { orchestrator }
    }

    /// Lists the available workflows in document order.
    #[must_use]
    pub fn list(&self) -> Vec<WorkflowSummary> {
        self.orchestrator
            .workflows()
            .iter()
            .map(|workflow| WorkflowSummary {
                name: workflow.name.clone(),
                description: workflow.description.clone(),
            })
            .collect()
    }

    /// Returns the description of the named workflow, if declared.
    #[must_use]
    pub fn describe(&self, name: &str) -> Option<String> {
        self.orchestrator
            .workflows()
            .iter()
            .find(|workflow| workflow.name == name)
            .map(|workflow| workflow.description.clone())
    }

    /// Executes the named workflow against the supplied input.
    ///
    /// # Errors
    ///
    /// Propagates orchestrator errors unmodified; see
    /// [`Orchestrator::execute`].
    pub async fn execute(&self, workflow_name: &str, input: &str) -> RuntimeResult<String> {
        self.orchestrator.execute(workflow_name, input).await
    }
}
