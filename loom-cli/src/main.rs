//! textloom CLI
//!
//! Runs declaratively configured workflows over text input.
//!
//! Usage:
//!   textloom --list
//!   textloom --workflow "Basic Summary Workflow" --input "long text ..."
//!   textloom --workflow "Basic Summary Workflow" --input-file report.txt

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use loom_adapters::gemini::GEMINI_API_KEY_ENV;
use loom_adapters::openai::OPENAI_API_KEY_ENV;
use loom_adapters::replicate::REPLICATE_API_TOKEN_ENV;
use loom_config::{ConfigStore, ProviderKind};
use loom_runtime::WorkflowExecutor;
use tracing::warn;

#[derive(Parser)]
#[command(name = "textloom")]
#[command(about = "Run configured model/tool workflows over text")]
struct Cli {
    /// List available workflows and exit
    #[arg(long, conflicts_with_all = ["workflow", "input", "input_file"])]
    list: bool,

    /// Name of the workflow to execute
    #[arg(long, required_unless_present = "list")]
    workflow: Option<String>,

    /// Input text for the workflow
    #[arg(long, conflicts_with = "input_file")]
    input: Option<String>,

    /// Read the workflow input from a file
    #[arg(long)]
    input_file: Option<PathBuf>,

    /// Directory containing models.yaml, tools.yaml, and workflows.yaml
    #[arg(long, default_value = "config")]
    config: PathBuf,

    /// Increase verbosity (-v info, -vv debug, -vvv trace). Default is warn.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Warns about absent credentials for every provider the config declares.
fn check_credentials(store: &ConfigStore) {
    for descriptor in store.models() {
        let key = match descriptor.provider {
            ProviderKind::OpenAi => OPENAI_API_KEY_ENV,
            ProviderKind::Google => GEMINI_API_KEY_ENV,
            ProviderKind::Replicate => REPLICATE_API_TOKEN_ENV,
        };
        if std::env::var(key).is_err() {
            warn!(
                model = %descriptor.name,
                key,
                "credential not set; this model will fail to construct"
            );
        }
    }
}

fn read_input(cli: &Cli) -> Result<String> {
    if let Some(input) = &cli.input {
        return Ok(input.clone());
    }
    if let Some(path) = &cli.input_file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input file `{}`", path.display()));
    }
    anyhow::bail!("either --input or --input-file is required with --workflow")
}

async fn run(cli: Cli) -> Result<()> {
    let store = ConfigStore::load(&cli.config)
        .with_context(|| format!("failed to load configuration from `{}`", cli.config.display()))?;

    if cli.list {
        let executor = WorkflowExecutor::new(store);
        for summary in executor.list() {
            println!("{}: {}", summary.name, summary.description);
        }
        return Ok(());
    }

    let workflow = cli.workflow.as_deref().unwrap_or_default();
    let input = read_input(&cli)?;
    check_credentials(&store);

    let executor = WorkflowExecutor::new(store);
    let output = executor.execute(workflow, &input).await?;
    println!("{output}");
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Missing .env is fine; credentials can come from the environment.
    dotenvy::dotenv().ok();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Help and version are not usage errors.
            if err.use_stderr() {
                eprint!("{err}");
                return ExitCode::from(1);
            }
            print!("{err}");
            return ExitCode::SUCCESS;
        }
    };

    if !cli.list && cli.input.is_none() && cli.input_file.is_none() {
        eprintln!("error: either --input or --input-file is required with --workflow");
        return ExitCode::from(1);
    }

    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}
