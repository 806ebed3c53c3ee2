//! Generator and evaluator oracles.
//!
//! The refinement loop only sees these two traits. `LlmGenerator` and
//! `LlmEvaluator` are the chat-completion backed implementations used by the
//! binary; tests substitute scripted ones.

mod llm;
mod prompts;

use async_trait::async_trait;

use crate::error::Result;
use crate::history::CompressedHistory;

pub use llm::{LlmEvaluator, LlmGenerator};

/// Input to a generation call.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub instruction: &'a str,
    pub history: &'a CompressedHistory,
}

/// Input to an evaluation call.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationRequest<'a> {
    pub instruction: &'a str,
    pub code: &'a str,
    pub output: &'a str,
}

/// Produces candidate source text, possibly wrapped in markdown fences.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate<'a>(&self, request: GenerationRequest<'a>) -> Result<String>;
}

/// Produces a raw verdict, nominally the feedback JSON object.
#[async_trait]
pub trait Evaluator: Send + Sync {
    async fn evaluate<'a>(&self, request: EvaluationRequest<'a>) -> Result<String>;
}
