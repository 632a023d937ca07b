//! Single-call workflow with post-hoc, substring-triggered tool application.

use std::sync::Arc;
use std::time::Duration;

use loom_adapters::traits::ModelAdapter;
use loom_tools::ToolRegistry;
use tracing::{debug, warn};

use crate::agent::DEFAULT_TOOL_TIMEOUT;
use crate::error::RuntimeResult;
use crate::prompt::PromptTemplate;

/// A tool that matched but could not be applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedTool {
    /// Name of the tool that was skipped.
    pub name: String,
    /// Why the application failed.
    pub reason: String,
}

/// Result of one generic workflow run.
///
/// Carries the final text plus which catalog tools were applied and which
/// matched but failed, so callers can observe degradation instead of
/// inferring it from logs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenericOutcome {
    /// The final output text.
    pub output: String,
    /// Tools applied, in catalog order.
    pub applied: Vec<String>,
    /// Tools that matched but failed, with the failure reason.
    pub skipped: Vec<SkippedTool>,
}

/// A lighter-weight pipeline that bypasses the multi-turn agent loop.
///
/// The model is called exactly once with a prompt embedding the full tool
/// catalog. Its output is then scanned in catalog order for each tool name as
/// a case-insensitive substring; every match invokes the tool on the entire
/// current output and replaces the output with the tool's return value.
///
/// Because the scan continues over the transformed text, an earlier tool's
/// output can newly match a later tool's name. This cascading trigger is
/// deliberate and pinned by tests.
pub struct GenericWorkflow {
    model: Arc<dyn ModelAdapter>,
    tools: Arc<ToolRegistry>,
    tool_timeout: Duration,
}

impl std::fmt::Debug for GenericWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenericWorkflow")
            .field("model", &self.model.metadata().model())
            .field("catalog", &self.tools.catalog().len())
            .finish()
    }
}

impl GenericWorkflow {
    /// Creates a generic workflow over the supplied model and tool catalog.
    #[must_use]
    pub fn new(model: Arc<dyn ModelAdapter>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            model,
            tools,
            tool_timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }

    /// Overrides the per-tool deadline.
    #[must_use]
    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = timeout;
        self
    }

    /// Runs the workflow: one model call, then best-effort tool application.
    ///
    /// Tool failures are recovered locally (logged and recorded in
    /// [`GenericOutcome::skipped`]); the workflow always produces a result.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::RuntimeError::Adapter`] only when the single
    /// model call fails.
    pub async fn run(&self, input: &str) -> RuntimeResult<GenericOutcome> {
        let prompt = self.build_prompt(input);
        let mut output = self.model.generate(&prompt).await?;

        let mut applied = Vec::new();
        let mut skipped = Vec::new();

        for descriptor in self.tools.catalog() {
            let lowered = output.to_lowercase();
            if !lowered.contains(&descriptor.name.to_lowercase()) {
                continue;
            }

            match self.apply_tool(&descriptor.name, &output).await {
                Ok(transformed) => {
                    debug!(tool = %descriptor.name, "catalog tool applied");
                    applied.push(descriptor.name.clone());
                    output = transformed;
                }
                Err(reason) => {
                    warn!(tool = %descriptor.name, reason = %reason, "catalog tool skipped");
                    skipped.push(SkippedTool {
                        name: descriptor.name.clone(),
                        reason,
                    });
                }
            }
        }

        Ok(GenericOutcome {
            output,
            applied,
            skipped,
        })
    }

    async fn apply_tool(&self, name: &str, output: &str) -> Result<String, String> {
        let handle = self.tools.get(name, None).map_err(|err| err.to_string())?;
        match tokio::time::timeout(self.tool_timeout, handle.run(output)).await {
            Ok(Ok(transformed)) => Ok(transformed),
            Ok(Err(err)) => Err(err.to_string()),
            Err(_) => Err(format!("tool '{name}' timed out")),
        }
    }

    fn build_prompt(&self, input: &str) -> String {
        let mut catalog = String::new();
        for descriptor in self.tools.catalog() {
            catalog.push_str("- ");
            catalog.push_str(&descriptor.name);
            catalog.push_str(": ");
            catalog.push_str(&descriptor.description);
            catalog.push('\n');
        }

        PromptTemplate::new(
            "You are a text-processing assistant. The following tools exist:\n\
             {{catalog}}\n\
             Mention a tool by name if it should be applied to your answer.\n\n\
             Request:\n{{input}}",
        )
        .with_variable("catalog", catalog)
        .with_variable("input", input)
        .render()
    }
}
