//! The generative-text capability trait.
//!
//! Implemented by the `examforge-providers` crate. The engine makes exactly
//! one attempt per call: any failure sends the caller down the deterministic
//! fallback path, so no retry or backoff lives here.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Trait for text-generation backends used for question generation and
/// free-text scoring.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    /// Human-readable provider name (e.g. "openai").
    fn name(&self) -> &str;

    /// Complete a prompt. One attempt; errors are recovered by the caller.
    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<CompletionResponse>;
}

/// A single completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The main prompt.
    pub prompt: String,
    /// Optional system prompt override.
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
}

/// Response from a completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// The raw response text.
    pub content: String,
    /// Model that produced the response.
    pub model: String,
    /// Latency in milliseconds.
    pub latency_ms: u64,
}

/// System prompt for question generation.
pub const GENERATION_SYSTEM_PROMPT: &str = "You are an expert educator and question generator. Generate high-quality educational questions in the specified format.";

/// System prompt for free-text answer scoring.
pub const EVALUATION_SYSTEM_PROMPT: &str = "You are an expert educator evaluating student responses. Provide fair, constructive feedback with specific scores.";

/// System prompt for study-hint generation.
pub const HINT_SYSTEM_PROMPT: &str = "You are a helpful tutor providing study hints.";
