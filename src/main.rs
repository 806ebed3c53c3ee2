use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::{info, warn};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use coderefine::domain::ExecutionResult;
use coderefine::llm::{LlmClient, OpenAiClient};
use coderefine::oracle::{LlmEvaluator, LlmGenerator};
use coderefine::runner::{RefineOutcome, RefinementLoop};
use coderefine::sandbox::ProcessSandbox;
use coderefine::tools::ExecutePythonTool;

mod cli;
mod config;

use cli::Cli;
use cli::commands::Commands;
use config::Config;

fn setup_logging(default_level: &str) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("coderefine")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("coderefine.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        Commands::Run { task, max_attempts } => handle_run_command(task, *max_attempts, cli.is_verbose(), config).await,
        Commands::Exec { file, timeout } => handle_exec_command(file, *timeout, config).await,
        Commands::Schema => handle_schema_command(),
    }
}

fn sandbox(config: &Config) -> ProcessSandbox {
    let sandbox = ProcessSandbox::new(config.sandbox_config());
    if sandbox.resolve_interpreter().is_none() {
        warn!("Interpreter {} not found on PATH", sandbox.config().interpreter.display());
        println!(
            "{} interpreter {} not found on PATH",
            "Warning:".yellow(),
            sandbox.config().interpreter.display()
        );
    }
    sandbox
}

async fn handle_run_command(task: &str, max_attempts: Option<u32>, verbose: bool, config: &Config) -> Result<()> {
    info!("Refining task: {}", task);

    let client: Arc<dyn LlmClient> = Arc::new(
        OpenAiClient::from_env(&config.llm.api_key_env, config.openai_config()).context("Failed to create LLM client")?,
    );
    let refine_config = config.refine_config()?;
    let generator = LlmGenerator::new(client.clone())
        .with_temperature(config.llm.generation_temperature)
        .with_max_tokens(config.llm.max_tokens)
        .with_history_output_lines(refine_config.history.max_output_lines);
    let evaluator = LlmEvaluator::new(client)
        .with_temperature(config.llm.evaluation_temperature)
        .with_max_tokens(config.llm.max_tokens);

    let attempts = max_attempts.unwrap_or(refine_config.max_attempts);
    let refinement = RefinementLoop::with_config(
        Arc::new(generator),
        Arc::new(evaluator),
        Arc::new(sandbox(config)),
        refine_config,
    );

    println!("{} {}", "Refining:".cyan(), task);
    let outcome = refinement
        .run_with_attempts(task, attempts)
        .await
        .context("Refinement failed")?;

    print_outcome(&outcome, verbose);
    Ok(())
}

fn print_outcome(outcome: &RefineOutcome, verbose: bool) {
    for attempt in &outcome.attempts {
        let status = match (&attempt.execution, &attempt.feedback) {
            (_, Some(feedback)) if feedback.success => "accepted".green(),
            (_, Some(_)) => "rejected".yellow(),
            (Some(execution), None) if execution.timed_out => "timed out".red(),
            _ => "failed".red(),
        };
        println!("{} {}: {}", "Attempt".bold(), attempt.index, status);

        if let Some(signature) = attempt.error_signature() {
            println!("  {}", signature.red());
        }
        for point in attempt.failure_points() {
            println!("  - {}", point);
        }
        if verbose {
            if let Some(feedback) = &attempt.feedback {
                println!("  {}", feedback.analysis.dimmed());
            }
        }
    }

    match &outcome.solution {
        Some(code) => {
            println!("\n{}", "Final solution:".green().bold());
            println!("{}", code);
        }
        None => println!("\n{}", "No solution found within the attempt budget".red().bold()),
    }
}

async fn handle_exec_command(file: &Path, timeout: Option<u64>, config: &Config) -> Result<()> {
    info!("Executing file: {}", file.display());
    let code = fs::read_to_string(file).context(format!("Failed to read {}", file.display()))?;

    let mut input = json!({ "code": code });
    input["timeout"] = json!(timeout.unwrap_or(config.sandbox.default_timeout_secs));

    let tool = ExecutePythonTool::new(Arc::new(sandbox(config)));
    let result = tool.run(&input).await.context("Invalid execution parameters")?;

    print_execution(&result);
    Ok(())
}

fn print_execution(result: &ExecutionResult) {
    if !result.stdout.is_empty() {
        print!("{}", result.stdout);
    }
    if !result.stderr.is_empty() {
        eprint!("{}", result.stderr.red());
        if !result.stderr.ends_with('\n') {
            eprintln!();
        }
    }
    let status = if result.succeeded {
        format!("exit code {}", result.exit_code).green()
    } else if result.timed_out {
        "timed out".red()
    } else {
        format!("exit code {}", result.exit_code).red()
    };
    println!("{} {}", "Status:".bold(), status);
}

fn handle_schema_command() -> Result<()> {
    let schema = ExecutePythonTool::<ProcessSandbox>::tool_spec().function_schema();
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration; it decides the log level
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    setup_logging(config.log_filter(cli.is_verbose())).context("Failed to setup logging")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
