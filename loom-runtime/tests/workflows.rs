use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use loom_adapters::traits::{AdapterMetadata, AdapterResult, ChatMessage, ModelAdapter};
use loom_config::{ConfigStore, ModelDescriptor};
use loom_runtime::{
    AdapterFactory, GenericWorkflow, ModelRegistry, Orchestrator, RuntimeError, RuntimeResult,
    WorkflowExecutor,
};
use loom_tools::ToolRegistry;
use serde_json::json;

/// Adapter that replays a fixed script of responses and records every call.
struct ScriptedAdapter {
    metadata: AdapterMetadata,
    responses: Mutex<VecDeque<String>>,
    calls: AtomicUsize,
    transcript_lens: Mutex<Vec<usize>>,
}

impl ScriptedAdapter {
    fn new(responses: impl IntoIterator<Item = String>) -> Self {
        Self {
            metadata: AdapterMetadata::new("test", "scripted"),
            responses: Mutex::new(responses.into_iter().collect()),
            calls: AtomicUsize::new(0),
            transcript_lens: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn transcript_lens(&self) -> Vec<usize> {
        self.transcript_lens.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelAdapter for ScriptedAdapter {
    fn metadata(&self) -> &AdapterMetadata {
        &self.metadata
    }

    async fn chat(&self, messages: &[ChatMessage]) -> AdapterResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.transcript_lens.lock().unwrap().push(messages.len());
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("script exhausted"))
    }
}

struct ScriptedFactory {
    adapter: Arc<ScriptedAdapter>,
    builds: AtomicUsize,
}

impl ScriptedFactory {
    fn new(adapter: Arc<ScriptedAdapter>) -> Self {
        Self {
            adapter,
            builds: AtomicUsize::new(0),
        }
    }
}

impl AdapterFactory for ScriptedFactory {
    fn build(&self, _descriptor: &ModelDescriptor) -> RuntimeResult<Arc<dyn ModelAdapter>> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::clone(&self.adapter) as Arc<dyn ModelAdapter>)
    }
}

const MODELS_YAML: &str = r"
models:
  - name: scripted
    provider: openai
    model: scripted-model
    default: true
";

const TOOLS_YAML: &str = r#"
tools:
  - name: summarizer
    description: "Condenses text to a target word budget"
    return_direct: true
    params:
      max_length: 150
  - name: text_to_markdown
    description: "Converts plain text into markdown format"
"#;

const WORKFLOWS_YAML: &str = r#"
workflows:
  - name: "Basic Summary Workflow"
    description: "Summarizes long-form text"
    tools:
      - name: summarizer
        params:
          max_length: 200
    system_message: "You summarize documents for busy readers."
  - name: "Plain Chat"
    description: "Single-model conversation with no tools"
"#;

fn store() -> ConfigStore {
    ConfigStore::from_yaml(MODELS_YAML, TOOLS_YAML, WORKFLOWS_YAML).unwrap()
}

fn orchestrator(
    store: ConfigStore,
    adapter: &Arc<ScriptedAdapter>,
) -> (Orchestrator, Arc<ScriptedAdapter>) {
    let config = Arc::new(store);
    let models = Arc::new(ModelRegistry::with_factory(
        config.models().to_vec(),
        Box::new(ScriptedFactory::new(Arc::clone(adapter))),
    ));
    let tools = Arc::new(ToolRegistry::new(config.tools().to_vec()));
    (
        Orchestrator::new(config, models, tools),
        Arc::clone(adapter),
    )
}

fn long_input() -> String {
    let mut paragraphs = Vec::new();
    for topic in ["harbor logistics", "rail freight", "inland warehousing"] {
        let mut sentences = Vec::new();
        for i in 0..20 {
            sentences.push(format!(
                "Paragraph about {topic} adds sentence number {i} with several filler words \
                 to reach a realistic length."
            ));
        }
        paragraphs.push(sentences.join(" "));
    }
    paragraphs.join("\n\n")
}

fn directive(tool: &str, input: &str) -> String {
    json!({ "tool": tool, "input": input }).to_string()
}

#[tokio::test]
async fn unknown_workflow_fails_before_any_model_or_tool_call() {
    let adapter = Arc::new(ScriptedAdapter::new(Vec::new()));
    let (orchestrator, adapter) = orchestrator(store(), &adapter);

    let err = orchestrator.execute("does-not-exist", "x").await.unwrap_err();
    assert!(matches!(err, RuntimeError::UnknownWorkflow { name } if name == "does-not-exist"));
    assert_eq!(adapter.calls(), 0);
}

#[tokio::test]
async fn summary_workflow_shortens_long_input() {
    let input = long_input();
    let input_words = input.split_whitespace().count();
    assert!(input_words > 500);

    let adapter = Arc::new(ScriptedAdapter::new([directive("summarizer", &input)]));
    let (orchestrator, adapter) = orchestrator(store(), &adapter);

    let output = orchestrator
        .execute("Basic Summary Workflow", &input)
        .await
        .unwrap();

    let output_words = output.split_whitespace().count();
    assert!(output_words <= 210, "summary too long: {output_words} words");
    assert!(output_words < input_words / 2);
    // return_direct short-circuits after the single tool call.
    assert_eq!(adapter.calls(), 1);
}

#[tokio::test]
async fn conversation_memory_persists_across_calls() {
    let adapter = Arc::new(ScriptedAdapter::new([
        "First answer.".to_owned(),
        "Second answer.".to_owned(),
    ]));
    let (orchestrator, adapter) = orchestrator(store(), &adapter);

    orchestrator.execute("Plain Chat", "first question").await.unwrap();
    orchestrator.execute("Plain Chat", "second question").await.unwrap();

    let lens = adapter.transcript_lens();
    assert_eq!(lens.len(), 2);
    // system + user on the first call; plus assistant + user on the second.
    assert_eq!(lens[0], 2);
    assert_eq!(lens[1], 4);
}

#[tokio::test]
async fn turn_budget_exhaustion_returns_partial_answer() {
    let input = "Alpha beta gamma delta. Epsilon zeta eta theta.";
    let tools_yaml = r"
tools:
  - name: summarizer
    description: Condenses text
    params:
      max_length: 100
";
    let store = ConfigStore::from_yaml(MODELS_YAML, tools_yaml, WORKFLOWS_YAML).unwrap();

    let adapter = Arc::new(ScriptedAdapter::new([
        directive("summarizer", input),
        directive("summarizer", input),
    ]));
    let (orchestrator, adapter) = orchestrator(store, &adapter);
    let orchestrator = orchestrator.with_turn_budget(2);

    let output = orchestrator
        .execute("Basic Summary Workflow", input)
        .await
        .unwrap();

    assert_eq!(adapter.calls(), 2);
    assert!(output.starts_with("Alpha beta gamma delta."));
}

#[tokio::test]
async fn unbound_tool_request_keeps_the_loop_alive() {
    let adapter = Arc::new(ScriptedAdapter::new([
        directive("code_runner", "2 + 2"),
        "The answer is 4.".to_owned(),
    ]));
    let (orchestrator, adapter) = orchestrator(store(), &adapter);

    let output = orchestrator
        .execute("Basic Summary Workflow", "what is 2 + 2?")
        .await
        .unwrap();

    assert_eq!(output, "The answer is 4.");
    assert_eq!(adapter.calls(), 2);
}

#[tokio::test]
async fn executor_lists_and_describes_workflows() {
    let executor = WorkflowExecutor::new(store());

    let listed = executor.list();
    let names: Vec<_> = listed.iter().map(|summary| summary.name.as_str()).collect();
    assert_eq!(names, ["Basic Summary Workflow", "Plain Chat"]);

    assert_eq!(
        executor.describe("Plain Chat").as_deref(),
        Some("Single-model conversation with no tools")
    );
    assert!(executor.describe("nope").is_none());
}

mod generic {
    use super::*;
    use loom_config::ToolDescriptor;

    fn catalog_registry(descriptors: Vec<ToolDescriptor>) -> Arc<ToolRegistry> {
        Arc::new(ToolRegistry::new(descriptors))
    }

    fn markdown_descriptor() -> ToolDescriptor {
        ToolDescriptor {
            name: "text_to_markdown".into(),
            description: "Converts plain text into markdown format".into(),
            ..ToolDescriptor::default()
        }
    }

    #[tokio::test]
    async fn output_without_catalog_match_passes_through() {
        let adapter = Arc::new(ScriptedAdapter::new(["Nothing to do here.".to_owned()]));
        let workflow = GenericWorkflow::new(
            Arc::clone(&adapter) as Arc<dyn ModelAdapter>,
            catalog_registry(vec![markdown_descriptor()]),
        );

        let outcome = workflow.run("hello").await.unwrap();
        assert_eq!(outcome.output, "Nothing to do here.");
        assert!(outcome.applied.is_empty());
        assert!(outcome.skipped.is_empty());
    }

    #[tokio::test]
    async fn matching_tool_is_applied_to_the_full_output() {
        let model_output = "Section Overview\n\nApply TEXT_TO_MARKDOWN to this answer.";
        let adapter = Arc::new(ScriptedAdapter::new([model_output.to_owned()]));
        let workflow = GenericWorkflow::new(
            Arc::clone(&adapter) as Arc<dyn ModelAdapter>,
            catalog_registry(vec![markdown_descriptor()]),
        );

        let outcome = workflow.run("format my notes").await.unwrap();
        assert_eq!(outcome.applied, ["text_to_markdown"]);
        assert!(outcome.skipped.is_empty());
        // The whole output went through the tool: the bare lead line became a
        // heading and the rest survived.
        assert!(outcome.output.starts_with("## Section Overview"));
        assert!(outcome.output.contains("Apply TEXT_TO_MARKDOWN to this answer."));
    }

    #[tokio::test]
    async fn earlier_tool_output_can_trigger_a_later_tool() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("file_loader-notes.txt"),
            "Cascade Notes\n\nNow run text_to_markdown over this file.",
        )
        .unwrap();

        let loader = ToolDescriptor {
            name: "file_loader".into(),
            description: "Loads a file from disk".into(),
            params: json!({ "base_dir": dir.path().to_str().unwrap() })
                .as_object()
                .cloned()
                .unwrap(),
            ..ToolDescriptor::default()
        };

        // Model output names only the loader; the loaded file mentions the
        // markdown tool, so the re-scan picks it up.
        let adapter = Arc::new(ScriptedAdapter::new(["file_loader-notes.txt".to_owned()]));
        let workflow = GenericWorkflow::new(
            Arc::clone(&adapter) as Arc<dyn ModelAdapter>,
            catalog_registry(vec![loader, markdown_descriptor()]),
        );

        let outcome = workflow.run("load my notes").await.unwrap();
        assert_eq!(outcome.applied, ["file_loader", "text_to_markdown"]);
        assert!(outcome.output.starts_with("## Cascade Notes"));
    }

    #[tokio::test]
    async fn failing_tool_is_recorded_and_output_kept() {
        let search = ToolDescriptor {
            name: "web_search".into(),
            description: "Search the web for information".into(),
            ..ToolDescriptor::default()
        };

        let adapter = Arc::new(ScriptedAdapter::new([
            "Try web_search for current prices.".to_owned(),
        ]));
        let workflow = GenericWorkflow::new(
            Arc::clone(&adapter) as Arc<dyn ModelAdapter>,
            catalog_registry(vec![search]),
        );

        let outcome = workflow.run("prices?").await.unwrap();
        assert_eq!(outcome.output, "Try web_search for current prices.");
        assert!(outcome.applied.is_empty());
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].name, "web_search");
    }
}
