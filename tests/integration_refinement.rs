//! End-to-end refinement tests
//!
//! Drives the LLM-backed oracles with a scripted client against the real
//! process sandbox.

use std::sync::Arc;
use std::time::Duration;

use coderefine::domain::TimeoutSecs;
use coderefine::error::{RefineError, Result};
use coderefine::llm::MockLlmClient;
use coderefine::oracle::{LlmEvaluator, LlmGenerator};
use coderefine::runner::{LoopState, RefineConfig, RefinementLoop};
use coderefine::sandbox::{ProcessSandbox, SandboxConfig};
use coderefine::tools::{ExecutePythonTool, Tool};
use serde_json::json;
use tempfile::TempDir;

const ACCEPT: &str = r#"Evaluation:
```json
{"success": true, "feedback": {"technical_analysis": "prints the expected value", "failure_points": [], "suggestions": [], "performance_notes": "trivial", "edge_cases": []}}
```"#;

fn shell_available() -> bool {
    which::which("sh").is_ok()
}

fn python_available() -> bool {
    which::which("python3").is_ok()
}

fn shell_sandbox(scratch: &TempDir) -> ProcessSandbox {
    ProcessSandbox::new(SandboxConfig::with_interpreter("sh", "sh").scratch_dir(scratch.path()))
}

fn scratch_is_empty(scratch: &TempDir) -> bool {
    std::fs::read_dir(scratch.path()).map(|mut d| d.next().is_none()).unwrap_or(false)
}

fn refinement(
    client: Arc<MockLlmClient>,
    sandbox: ProcessSandbox,
    config: RefineConfig,
) -> RefinementLoop<LlmGenerator, LlmEvaluator, ProcessSandbox> {
    RefinementLoop::with_config(
        Arc::new(LlmGenerator::new(client.clone())),
        Arc::new(LlmEvaluator::new(client)),
        Arc::new(sandbox),
        config,
    )
}

/// A failed run feeds its error into the next reasoning prompt, the retry is accepted
#[tokio::test]
async fn test_refines_after_execution_failure() -> Result<()> {
    if !shell_available() {
        eprintln!("skipping: sh not found");
        return Ok(());
    }
    let scratch = TempDir::new()?;
    let client = Arc::new(MockLlmClient::with_texts([
        "Print four.",
        "```sh\necho 'fatal: missing operand' >&2\nexit 3\n```",
        "Avoid the missing operand.",
        "echo 4",
        ACCEPT,
    ]));
    let config = RefineConfig::default().with_pacing_delay(Duration::ZERO);

    let outcome = refinement(client.clone(), shell_sandbox(&scratch), config)
        .run("print the number four")
        .await?;

    assert_eq!(outcome.solution.as_deref(), Some("echo 4"));
    assert_eq!(outcome.final_state, LoopState::Succeeded);
    assert_eq!(outcome.attempts.len(), 2);

    let first = &outcome.attempts[0];
    assert!(first.feedback.is_none());
    assert_eq!(first.execution.as_ref().map(|e| e.exit_code), Some(3));
    assert!(
        outcome
            .history
            .error_signatures
            .contains("fatal: missing operand")
    );

    let second = &outcome.attempts[1];
    assert_eq!(second.execution.as_ref().map(|e| e.stdout.as_str()), Some("4\n"));
    assert!(second.accepted());

    let requests = client.requests();
    assert_eq!(requests.len(), 5);
    assert!(!requests[0].messages[0].content.contains("missing operand"));
    assert!(requests[2].messages[0].content.contains("fatal: missing operand"));
    assert!(requests[4].messages[0].content.contains("Output:\n4\n"));

    assert!(scratch_is_empty(&scratch));
    Ok(())
}

/// Every attempt hits the deadline; the evaluator is never consulted
#[tokio::test]
async fn test_exhausts_on_repeated_timeouts() -> Result<()> {
    if !shell_available() {
        eprintln!("skipping: sh not found");
        return Ok(());
    }
    let scratch = TempDir::new()?;
    let client = Arc::new(MockLlmClient::with_texts(["plan", "sleep 5", "plan", "sleep 5"]));
    let config = RefineConfig::default()
        .with_max_attempts(2)
        .with_execution_timeout(TimeoutSecs::new(1)?)
        .with_pacing_delay(Duration::ZERO);

    let outcome = refinement(client.clone(), shell_sandbox(&scratch), config)
        .run("wait a while")
        .await?;

    assert!(!outcome.is_solved());
    assert_eq!(outcome.final_state, LoopState::Exhausted);
    assert_eq!(outcome.attempts.len(), 2);
    for attempt in &outcome.attempts {
        let execution = attempt.execution.as_ref().unwrap();
        assert!(execution.timed_out);
        assert_eq!(execution.exit_code, -1);
        assert!(execution.stderr.contains('1'));
    }
    assert_eq!(client.call_count(), 4);
    assert_eq!(outcome.history.error_signatures.len(), 1);
    assert!(scratch_is_empty(&scratch));
    Ok(())
}

/// Unparsable evaluator output ends the run under the default policy
#[tokio::test]
async fn test_unparsable_verdict_ends_run() -> Result<()> {
    if !shell_available() {
        eprintln!("skipping: sh not found");
        return Ok(());
    }
    let scratch = TempDir::new()?;
    let client = Arc::new(MockLlmClient::with_texts(["plan", "echo hi", "Looks fine to me."]));

    let outcome = refinement(client.clone(), shell_sandbox(&scratch), RefineConfig::default())
        .run_with_attempts("say hi", 3)
        .await?;

    assert_eq!(outcome.solution.as_deref(), Some("echo hi"));
    assert_eq!(outcome.attempts.len(), 1);
    assert_eq!(client.call_count(), 3);
    Ok(())
}

/// Oracle failures are errors, not outcomes
#[tokio::test]
async fn test_oracle_failure_propagates() {
    let scratch = TempDir::new().unwrap();
    let client = Arc::new(MockLlmClient::new(vec![]));

    let result = refinement(client, shell_sandbox(&scratch), RefineConfig::default())
        .run("anything")
        .await;

    assert!(matches!(result, Err(RefineError::Oracle(_))));
}

/// Out-of-range parameters are rejected before anything runs
#[tokio::test]
async fn test_tool_rejects_invalid_parameters() {
    let scratch = TempDir::new().unwrap();
    let tool = ExecutePythonTool::new(Arc::new(ProcessSandbox::new(
        SandboxConfig::default().scratch_dir(scratch.path()),
    )));

    for input in [
        json!({ "timeout": 5 }),
        json!({ "code": "print(1)", "timeout": 0 }),
        json!({ "code": "print(1)", "timeout": 31 }),
        json!({ "code": "print(1)", "timeout": "ten" }),
        json!({ "code": 42 }),
    ] {
        let result = tool.invoke(input.clone()).await;
        assert!(
            matches!(result, Err(RefineError::Validation(_))),
            "expected validation error for {}",
            input
        );
    }
    assert!(scratch_is_empty(&scratch));
}

#[test]
fn test_tool_schema() {
    let schema = ExecutePythonTool::<ProcessSandbox>::tool_spec().function_schema();
    let function = &schema["function"];
    let timeout = &function["parameters"]["properties"]["timeout"];
    assert_eq!(function["name"], "execute_python");
    assert_eq!(timeout["type"], "integer");
    assert_eq!(timeout["minimum"], 1);
    assert_eq!(timeout["maximum"], 30);
    assert_eq!(function["parameters"]["required"], json!(["code"]));
}

/// The tool runs real Python through the sandbox
#[tokio::test]
async fn test_tool_executes_python() {
    if !python_available() {
        eprintln!("skipping: python3 not found");
        return;
    }
    let scratch = TempDir::new().unwrap();
    let tool = ExecutePythonTool::new(Arc::new(ProcessSandbox::new(
        SandboxConfig::default().scratch_dir(scratch.path()),
    )));

    let ok = tool.invoke(json!({ "code": "print(\"hi\")" })).await.unwrap();
    assert_eq!(ok["success"], true);
    assert_eq!(ok["output"], "hi\n");
    assert_eq!(ok["return_code"], 0);

    let fault = tool.invoke(json!({ "code": "1/0", "timeout": 5 })).await.unwrap();
    assert_eq!(fault["success"], false);
    assert_ne!(fault["return_code"], 0);
    assert!(fault["error"].as_str().unwrap().contains("ZeroDivisionError"));

    assert!(scratch_is_empty(&scratch));
}
