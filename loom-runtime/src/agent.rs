//! Workflow agents: a bound model, a tool set, and conversation memory.

use std::sync::Arc;
use std::time::Duration;

use loom_adapters::traits::{ChatMessage, ModelAdapter};
use loom_tools::ToolHandle;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{RuntimeError, RuntimeResult};
use crate::memory::ConversationMemory;

/// Default number of model/tool exchange rounds before forced termination.
pub const DEFAULT_TURN_BUDGET: usize = 5;

/// Default deadline for a single tool invocation.
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);

/// A tool request parsed from the model's output.
#[derive(Debug, Deserialize, PartialEq)]
struct ToolDirective {
    tool: String,
    input: String,
}

/// One workflow's execution agent.
///
/// The agent owns its conversation memory, which persists across calls for as
/// long as the agent stays cached by the orchestrator.
pub struct WorkflowAgent {
    workflow: String,
    model: Arc<dyn ModelAdapter>,
    tools: Vec<ToolHandle>,
    memory: ConversationMemory,
    turn_budget: usize,
    tool_timeout: Duration,
}

impl std::fmt::Debug for WorkflowAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowAgent")
            .field("workflow", &self.workflow)
            .field("model", &self.model.metadata().model())
            .field("tools", &self.tools.len())
            .field("turns", &self.memory.len())
            .finish()
    }
}

impl WorkflowAgent {
    /// Creates an agent for the named workflow.
    ///
    /// When a system message is given the conversation is seeded with it,
    /// followed by the tool-use instructions when any tools are bound.
    #[must_use]
    pub fn new(
        workflow: impl Into<String>,
        model: Arc<dyn ModelAdapter>,
        tools: Vec<ToolHandle>,
        system_message: Option<&str>,
    ) -> Self {
        let mut seed = system_message.unwrap_or("You are a helpful assistant.").to_owned();
        if !tools.is_empty() {
            seed.push_str("\n\n");
            seed.push_str(&tool_instructions(&tools));
        }
        Self {
            workflow: workflow.into(),
            model,
            tools,
            memory: ConversationMemory::with_system(seed),
            turn_budget: DEFAULT_TURN_BUDGET,
            tool_timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }

    /// Overrides the turn budget.
    #[must_use]
    pub fn with_turn_budget(mut self, turn_budget: usize) -> Self {
        self.turn_budget = turn_budget.max(1);
        self
    }

    /// Overrides the per-tool deadline.
    #[must_use]
    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = timeout;
        self
    }

    /// Returns the workflow name this agent serves.
    #[must_use]
    pub fn workflow(&self) -> &str {
        &self.workflow
    }

    /// Returns the accumulated conversation memory.
    #[must_use]
    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    /// Runs one request through the reasoning/tool loop.
    ///
    /// Each round the model sees the full transcript and either answers or
    /// requests a tool by emitting a JSON directive. Tool output is appended
    /// to memory before the next round. When the turn budget is exhausted the
    /// best partial answer seen so far is returned instead of an error.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Adapter`] when a model call fails,
    /// [`RuntimeError::Tool`] when a requested tool fails, or
    /// [`RuntimeError::TimedOut`] when a tool exceeds its deadline.
    pub async fn run(&mut self, input: &str) -> RuntimeResult<String> {
        self.memory.push(ChatMessage::user(input));
        let mut partial = String::new();

        for turn in 0..self.turn_budget {
            let text = self.model.chat(self.memory.turns()).await?;

            let Some(directive) = parse_tool_directive(&text) else {
                self.memory.push(ChatMessage::assistant(text.clone()));
                return Ok(text);
            };

            debug!(
                workflow = %self.workflow,
                turn,
                tool = %directive.tool,
                "model requested tool"
            );
            self.memory.push(ChatMessage::assistant(text));

            let Some(handle) = self
                .tools
                .iter()
                .find(|handle| handle.name() == directive.tool)
                .cloned()
            else {
                warn!(
                    workflow = %self.workflow,
                    tool = %directive.tool,
                    "model requested a tool that is not bound to this workflow"
                );
                self.memory.push(ChatMessage::tool(format!(
                    "tool '{}' is not available; answer with the tools you have",
                    directive.tool
                )));
                continue;
            };

            let output = tokio::time::timeout(self.tool_timeout, handle.run(&directive.input))
                .await
                .map_err(|_| RuntimeError::timed_out(format!("tool '{}'", handle.name())))??;

            if handle.return_direct() {
                self.memory.push(ChatMessage::tool(output.clone()));
                return Ok(output);
            }

            partial = output.clone();
            self.memory.push(ChatMessage::tool(output));
        }

        warn!(
            workflow = %self.workflow,
            budget = self.turn_budget,
            "turn budget exhausted; returning best partial answer"
        );
        Ok(partial)
    }
}

/// Renders the instruction block telling the model how to request tools.
fn tool_instructions(tools: &[ToolHandle]) -> String {
    let mut text = String::from(
        "You may call the following tools. To call one, reply with only a \
         JSON object of the form {\"tool\": \"<name>\", \"input\": \"<text>\"}. \
         Otherwise reply with your final answer.\n",
    );
    for handle in tools {
        text.push_str("- ");
        text.push_str(handle.name());
        text.push_str(": ");
        text.push_str(handle.description());
        text.push('\n');
    }
    text
}

/// Parses a tool directive from model output, tolerating fenced code blocks.
fn parse_tool_directive(text: &str) -> Option<ToolDirective> {
    let trimmed = strip_code_fence(text.trim());
    if !trimmed.starts_with('{') {
        return None;
    }
    serde_json::from_str(trimmed).ok()
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.trim_start_matches(['\r', '\n'])
        .strip_suffix("```")
        .unwrap_or(rest)
        .trim_end()
}
