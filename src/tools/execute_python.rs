//! execute_python tool - validated entry point into the sandbox

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use serde_json::{Value, json};

use super::definition::{ParameterType, ToolParameter, ToolSpec};
use super::Tool;
use crate::domain::{ExecutionResult, TimeoutSecs};
use crate::error::{RefineError, Result};
use crate::sandbox::Executor;

/// Tool name exposed to LLM function calling
pub const EXECUTE_PYTHON: &str = "execute_python";

/// A validated sandbox invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    pub code: String,
    pub timeout: TimeoutSecs,
}

/// Runs Python code in the sandbox after validating its parameters
pub struct ExecutePythonTool<X: Executor> {
    spec: ToolSpec,
    executor: Arc<X>,
}

impl<X: Executor> ExecutePythonTool<X> {
    pub fn new(executor: Arc<X>) -> Self {
        Self {
            spec: Self::tool_spec(),
            executor,
        }
    }

    /// Parameter declarations: `code` (required) and `timeout` (1..=30, default 10)
    pub fn tool_spec() -> ToolSpec {
        ToolSpec::new(
            EXECUTE_PYTHON,
            "Execute Python code and return its output. The code runs in a separate process with a time limit.",
        )
        .with_parameter(ToolParameter::new(
            "code",
            ParameterType::String,
            "The Python code to execute",
        ))
        .with_parameter(
            ToolParameter::new("timeout", ParameterType::Integer, "Maximum execution time in seconds")
                .optional(TimeoutSecs::DEFAULT)
                .with_range(TimeoutSecs::MIN as f64, TimeoutSecs::MAX as f64),
        )
    }

    /// Validate raw parameters into a request. Nothing is executed on failure.
    pub fn parse_request(&self, input: &Value) -> Result<ExecutionRequest> {
        self.spec.validate(input)?;

        let code = input["code"]
            .as_str()
            .ok_or_else(|| RefineError::Validation("code must be a string".to_string()))?
            .to_string();

        let timeout = match self.spec.value_or_default(input, "timeout").and_then(Value::as_u64) {
            Some(secs) => TimeoutSecs::new(secs)?,
            None => TimeoutSecs::default(),
        };

        Ok(ExecutionRequest { code, timeout })
    }

    /// Validate, then run the code
    pub async fn run(&self, input: &Value) -> Result<ExecutionResult> {
        let request = self.parse_request(input)?;
        debug!("{}: dispatching with timeout {}", EXECUTE_PYTHON, request.timeout);
        Ok(self.executor.execute(&request.code, request.timeout).await)
    }
}

/// Tool output shape returned to callers that speak JSON
pub fn result_to_json(result: &ExecutionResult) -> Value {
    json!({
        "success": result.succeeded,
        "output": result.stdout,
        "error": result.stderr,
        "return_code": result.exit_code,
        "timed_out": result.timed_out,
    })
}

#[async_trait]
impl<X: Executor> Tool for ExecutePythonTool<X> {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn invoke(&self, input: Value) -> Result<Value> {
        let result = self.run(&input).await?;
        Ok(result_to_json(&result))
    }
}
