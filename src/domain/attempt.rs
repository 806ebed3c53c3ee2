//! One generate → execute → evaluate cycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::execution::ExecutionResult;
use super::feedback::Feedback;

/// A single recorded attempt. Built once per iteration and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    /// 1-based position within the run
    pub index: u32,
    pub source_code: String,
    /// Absent only when execution could not be attempted
    pub execution: Option<ExecutionResult>,
    /// Absent when execution failed and the evaluator was skipped
    pub feedback: Option<Feedback>,
    pub recorded_at: DateTime<Utc>,
}

impl Attempt {
    pub fn new(
        index: u32,
        source_code: impl Into<String>,
        execution: Option<ExecutionResult>,
        feedback: Option<Feedback>,
    ) -> Self {
        Self {
            index,
            source_code: source_code.into(),
            execution,
            feedback,
            recorded_at: Utc::now(),
        }
    }

    /// Whether the evaluator accepted this attempt.
    pub fn accepted(&self) -> bool {
        self.feedback.as_ref().is_some_and(|f| f.success)
    }

    /// Error signature of a failed execution, if any.
    pub fn error_signature(&self) -> Option<String> {
        self.execution.as_ref().and_then(ExecutionResult::error_signature)
    }

    /// Evaluator failure points, empty when there is no feedback.
    pub fn failure_points(&self) -> &[String] {
        self.feedback.as_ref().map(|f| f.failure_points.as_slice()).unwrap_or(&[])
    }
}
