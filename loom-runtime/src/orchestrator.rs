//! Workflow orchestration: agent construction, caching, and execution.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use loom_config::{ConfigStore, WorkflowDescriptor};
use loom_tools::ToolRegistry;
use tracing::{debug, info};

use crate::agent::WorkflowAgent;
use crate::error::{RuntimeError, RuntimeResult};
use crate::models::ModelRegistry;

/// Builds workflow agents on first use, caches them by workflow name, and
/// drives execution.
///
/// Agents persist for the orchestrator's lifetime, so a workflow's
/// conversation memory spans every call made through the same orchestrator.
pub struct Orchestrator {
    config: Arc<ConfigStore>,
    models: Arc<ModelRegistry>,
    tools: Arc<ToolRegistry>,
    agents: Mutex<HashMap<String, Arc<tokio::sync::Mutex<WorkflowAgent>>>>,
    turn_budget: Option<usize>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let agents = self.agents.lock().expect("agent cache poisoned");
        let cached: Vec<_> = agents.keys().cloned().collect();
        f.debug_struct("Orchestrator")
            .field("workflows", &self.config.workflows().len())
            .field("cached_agents", &cached)
            .finish()
    }
}

impl Orchestrator {
    /// Creates an orchestrator over the supplied configuration and registries.
    #[must_use]
    pub fn new(config: Arc<ConfigStore>, models: Arc<ModelRegistry>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            config,
            models,
            tools,
            agents: Mutex::new(HashMap::new()),
            turn_budget: None,
        }
    }

    /// Overrides the turn budget applied to newly built agents.
    #[must_use]
    pub fn with_turn_budget(mut self, turn_budget: usize) -> Self {
        self.turn_budget = Some(turn_budget);
        self
    }

    /// Returns the loaded workflow descriptors in document order.
    #[must_use]
    pub fn workflows(&self) -> &[WorkflowDescriptor] {
        self.config.workflows()
    }

    /// Executes the named workflow against the supplied input.
    ///
    /// The workflow's agent is built on first use and reused afterwards, so
    /// conversation memory carries across calls.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::UnknownWorkflow`] when the name is not
    /// declared; the lookup happens before any model or tool is touched.
    /// Construction and execution errors propagate unmodified.
    ///
    /// # Panics
    ///
    /// Panics if the internal agent cache lock is poisoned.
    pub async fn execute(&self, workflow_name: &str, input: &str) -> RuntimeResult<String> {
        let descriptor = self
            .config
            .workflow(workflow_name)
            .ok_or_else(|| RuntimeError::unknown_workflow(workflow_name))?
            .clone();

        let agent = {
            let mut agents = self.agents.lock().expect("agent cache poisoned");
            if let Some(agent) = agents.get(workflow_name) {
                Arc::clone(agent)
            } else {
                let agent = Arc::new(tokio::sync::Mutex::new(self.build_agent(&descriptor)?));
                info!(workflow = workflow_name, "workflow agent constructed");
                agents.insert(workflow_name.to_owned(), Arc::clone(&agent));
                agent
            }
        };

        debug!(workflow = workflow_name, "executing workflow");
        agent.lock().await.run(input).await
    }

    /// Builds a fresh agent for the supplied workflow descriptor.
    fn build_agent(&self, descriptor: &WorkflowDescriptor) -> RuntimeResult<WorkflowAgent> {
        let mut handles = Vec::with_capacity(descriptor.tools.len());
        for tool_ref in &descriptor.tools {
            let params = (!tool_ref.params.is_empty()).then_some(&tool_ref.params);
            handles.push(self.tools.get(&tool_ref.name, params)?);
        }

        let model = self.models.get(descriptor.model.as_deref())?;

        let mut agent = WorkflowAgent::new(
            descriptor.name.clone(),
            model,
            handles,
            descriptor.system_message.as_deref(),
        );
        if let Some(turn_budget) = self.turn_budget {
            agent = agent.with_turn_budget(turn_budget);
        }
        Ok(agent)
    }
}
