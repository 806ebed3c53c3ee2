//! Refinement loop - generate, execute, evaluate, retry.
//!
//! Each attempt asks the generator for code given the instruction and a
//! compressed view of earlier attempts, runs it in the sandbox, and (only if
//! it ran cleanly) asks the evaluator for a verdict. The loop stops on the
//! first accepted attempt or after `max_attempts`.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::sanitize::sanitize_code;
use super::verdict::parse_verdict;
use crate::domain::{Attempt, ExecutionResult, Feedback, ParseFailurePolicy, TimeoutSecs};
use crate::error::{RefineError, Result};
use crate::history::{CompressedHistory, HistoryCompressor, HistoryLimits};
use crate::id::generate_run_id;
use crate::oracle::{EvaluationRequest, Evaluator, GenerationRequest, Generator};
use crate::sandbox::Executor;

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopState {
    Idle,
    Generating,
    Executing,
    Evaluating,
    Retrying,
    Succeeded,
    Exhausted,
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoopState::Idle => "idle",
            LoopState::Generating => "generating",
            LoopState::Executing => "executing",
            LoopState::Evaluating => "evaluating",
            LoopState::Retrying => "retrying",
            LoopState::Succeeded => "succeeded",
            LoopState::Exhausted => "exhausted",
        };
        f.write_str(name)
    }
}

/// Configuration for the RefinementLoop.
#[derive(Debug, Clone)]
pub struct RefineConfig {
    /// Attempts before giving up
    pub max_attempts: u32,
    /// Deadline applied to every sandbox run
    pub execution_timeout: TimeoutSecs,
    /// Pause after a rejected evaluation
    pub pacing_delay: Duration,
    pub parse_failure_policy: ParseFailurePolicy,
    /// Deadline for each generator or evaluator call
    pub oracle_timeout: Duration,
    pub history: HistoryLimits,
}

impl Default for RefineConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            execution_timeout: TimeoutSecs::default(),
            pacing_delay: Duration::from_secs(1),
            parse_failure_policy: ParseFailurePolicy::default(),
            oracle_timeout: Duration::from_secs(300),
            history: HistoryLimits::default(),
        }
    }
}

impl RefineConfig {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_execution_timeout(mut self, timeout: TimeoutSecs) -> Self {
        self.execution_timeout = timeout;
        self
    }

    pub fn with_pacing_delay(mut self, delay: Duration) -> Self {
        self.pacing_delay = delay;
        self
    }

    pub fn with_parse_failure_policy(mut self, policy: ParseFailurePolicy) -> Self {
        self.parse_failure_policy = policy;
        self
    }

    pub fn with_oracle_timeout(mut self, timeout: Duration) -> Self {
        self.oracle_timeout = timeout;
        self
    }

    pub fn with_history_limits(mut self, limits: HistoryLimits) -> Self {
        self.history = limits;
        self
    }
}

/// Result of one `run` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefineOutcome {
    /// Accepted source code, absent when attempts ran out
    pub solution: Option<String>,
    /// Every attempt in order
    pub attempts: Vec<Attempt>,
    pub history: CompressedHistory,
    pub final_state: LoopState,
}

impl RefineOutcome {
    pub fn is_solved(&self) -> bool {
        self.solution.is_some()
    }
}

/// Drives the generate → execute → evaluate cycle.
///
/// Collaborators are injected; the loop holds no per-run state, so one
/// instance can serve concurrent `run` calls.
pub struct RefinementLoop<G, E, X>
where
    G: Generator,
    E: Evaluator,
    X: Executor,
{
    generator: Arc<G>,
    evaluator: Arc<E>,
    executor: Arc<X>,
    config: RefineConfig,
}

impl<G, E, X> RefinementLoop<G, E, X>
where
    G: Generator,
    E: Evaluator,
    X: Executor,
{
    /// Create a new loop with default configuration.
    pub fn new(generator: Arc<G>, evaluator: Arc<E>, executor: Arc<X>) -> Self {
        Self::with_config(generator, evaluator, executor, RefineConfig::default())
    }

    /// Create a new loop with custom configuration.
    pub fn with_config(generator: Arc<G>, evaluator: Arc<E>, executor: Arc<X>, config: RefineConfig) -> Self {
        Self {
            generator,
            evaluator,
            executor,
            config,
        }
    }

    pub fn config(&self) -> &RefineConfig {
        &self.config
    }

    /// Run with the configured attempt budget.
    pub async fn run(&self, instruction: &str) -> Result<RefineOutcome> {
        self.run_with_attempts(instruction, self.config.max_attempts).await
    }

    /// Run with an explicit attempt budget.
    pub async fn run_with_attempts(&self, instruction: &str, max_attempts: u32) -> Result<RefineOutcome> {
        if max_attempts == 0 {
            return Err(RefineError::Validation("max_attempts must be >= 1".to_string()));
        }

        let run_id = generate_run_id();
        let mut state = LoopState::Idle;
        let mut compressor = HistoryCompressor::new(self.config.history);
        let mut attempts: Vec<Attempt> = Vec::new();

        info!("[{}] starting refinement, up to {} attempt(s)", run_id, max_attempts);

        for index in 1..=max_attempts {
            transition(&run_id, &mut state, LoopState::Generating);
            let raw = self
                .bounded(self.generator.generate(GenerationRequest {
                    instruction,
                    history: compressor.summarize(),
                }))
                .await?;
            let code = sanitize_code(&raw);

            transition(&run_id, &mut state, LoopState::Executing);
            info!("[{}] attempt {}/{}: executing {} bytes", run_id, index, max_attempts, code.len());
            let execution = self.executor.execute(&code, self.config.execution_timeout).await;

            if !execution.succeeded {
                info!(
                    "[{}] attempt {} failed execution: {}",
                    run_id,
                    index,
                    execution.error_signature().unwrap_or_default()
                );
                record(&mut attempts, &mut compressor, Attempt::new(index, code, Some(execution), None));
                transition(&run_id, &mut state, LoopState::Retrying);
                continue;
            }

            transition(&run_id, &mut state, LoopState::Evaluating);
            let feedback = self.evaluate(&run_id, instruction, &code, &execution).await?;
            let accepted = feedback.success;
            record(
                &mut attempts,
                &mut compressor,
                Attempt::new(index, code.clone(), Some(execution), Some(feedback)),
            );

            if accepted {
                transition(&run_id, &mut state, LoopState::Succeeded);
                info!("[{}] accepted on attempt {}", run_id, index);
                return Ok(RefineOutcome {
                    solution: Some(code),
                    attempts,
                    history: compressor.into_history(),
                    final_state: state,
                });
            }

            transition(&run_id, &mut state, LoopState::Retrying);
            if !self.config.pacing_delay.is_zero() {
                tokio::time::sleep(self.config.pacing_delay).await;
            }
        }

        transition(&run_id, &mut state, LoopState::Exhausted);
        info!("[{}] no accepted solution after {} attempt(s)", run_id, max_attempts);
        Ok(RefineOutcome {
            solution: None,
            attempts,
            history: compressor.into_history(),
            final_state: state,
        })
    }

    async fn evaluate(&self, run_id: &str, instruction: &str, code: &str, execution: &ExecutionResult) -> Result<Feedback> {
        let raw = self
            .bounded(self.evaluator.evaluate(EvaluationRequest {
                instruction,
                code,
                output: &execution.stdout,
            }))
            .await?;

        match parse_verdict(&raw) {
            Ok(feedback) => Ok(feedback),
            Err(e) => {
                warn!(
                    "[{}] {}; applying {:?} policy",
                    run_id, e, self.config.parse_failure_policy
                );
                debug!("[{}] unparsed verdict: {}", run_id, raw);
                Ok(Feedback::parse_failure_default(self.config.parse_failure_policy))
            }
        }
    }

    /// Apply the oracle deadline to a call.
    async fn bounded<T>(&self, call: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.config.oracle_timeout, call)
            .await
            .map_err(|_| RefineError::OracleTimeout(self.config.oracle_timeout))?
    }
}

fn transition(run_id: &str, state: &mut LoopState, next: LoopState) {
    info!("[{}] {} -> {}", run_id, state, next);
    *state = next;
}

fn record(attempts: &mut Vec<Attempt>, compressor: &mut HistoryCompressor, attempt: Attempt) {
    compressor.record(attempt.clone());
    attempts.push(attempt);
}
