//! Chat-completion backed oracles

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use super::prompts;
use super::{EvaluationRequest, Evaluator, GenerationRequest, Generator};
use crate::error::Result;
use crate::llm::{CompletionRequest, LlmClient};

/// Generator that plans first, then writes code from the plan.
///
/// The reasoning call sees the rendered history; the code call sees only the
/// reasoning and the instruction.
pub struct LlmGenerator {
    client: Arc<dyn LlmClient>,
    temperature: f32,
    max_tokens: Option<u32>,
    history_output_lines: usize,
}

impl LlmGenerator {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            temperature: 0.7,
            max_tokens: None,
            history_output_lines: 50,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Lines of program output shown from the most recent attempt
    pub fn with_history_output_lines(mut self, lines: usize) -> Self {
        self.history_output_lines = lines;
        self
    }

    fn request(&self, system: &str, user: String) -> CompletionRequest {
        let mut request = CompletionRequest::new(system)
            .with_user_message(user)
            .with_temperature(self.temperature);
        request.max_tokens = self.max_tokens;
        request
    }

    async fn reason(&self, instruction: &str, context: &str) -> Result<String> {
        let request = self.request(prompts::REASONING_SYSTEM, prompts::reasoning_prompt(instruction, context));
        let response = self.client.complete(request).await?;
        debug!("reasoning: {}", response.content);
        Ok(response.content)
    }
}

#[async_trait]
impl Generator for LlmGenerator {
    async fn generate<'a>(&self, request: GenerationRequest<'a>) -> Result<String> {
        let context = request.history.render(self.history_output_lines);
        let reasoning = self.reason(request.instruction, &context).await?;

        let code_request = self.request(prompts::CODE_SYSTEM, prompts::code_prompt(request.instruction, &reasoning));
        let response = self.client.complete(code_request).await?;
        debug!("generated {} bytes of code", response.content.len());
        Ok(response.content)
    }
}

/// Evaluator asking for the feedback JSON object at low temperature.
pub struct LlmEvaluator {
    client: Arc<dyn LlmClient>,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl LlmEvaluator {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            temperature: 0.3,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

#[async_trait]
impl Evaluator for LlmEvaluator {
    async fn evaluate<'a>(&self, request: EvaluationRequest<'a>) -> Result<String> {
        let mut completion = CompletionRequest::new(prompts::EVALUATOR_SYSTEM)
            .with_user_message(prompts::evaluation_prompt(request.instruction, request.code, request.output))
            .with_temperature(self.temperature);
        completion.max_tokens = self.max_tokens;

        let response = self.client.complete(completion).await?;
        debug!("raw verdict: {}", response.content);
        Ok(response.content)
    }
}
