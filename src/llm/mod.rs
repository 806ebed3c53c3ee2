//! LLM client layer - chat-completion types, client trait and the OpenAI backend

pub mod client;
pub mod openai;
pub mod types;

pub use client::{LlmClient, MockLlmClient};
pub use openai::{OpenAiClient, OpenAiConfig};
pub use types::{CompletionRequest, CompletionResponse, LlmError, Message, Role, StopReason, Usage};
