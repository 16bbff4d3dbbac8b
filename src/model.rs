//! Language-model collaborator.
//!
//! Defines the [`ChatModel`] trait that answer generation goes through,
//! plus the shipped implementation:
//! - **[`AnthropicModel`]** — calls the Anthropic Messages API with
//!   timeout, retry, and backoff.
//!
//! Also provides the prompt builders that turn retrieved context and a
//! question (or a truncated document) into the single `user` message sent
//! to the model.
//!
//! # Retry Strategy
//!
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Request deadline exceeded → fail with `Timeout`, no retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)

use std::time::Duration;

use async_trait::async_trait;

use crate::config::ModelConfig;
use crate::error::{DocChatError, Result};
use crate::models::ChatMessage;

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

/// Trait for hosted chat models.
///
/// Accepts a role-tagged message list and a maximum output length; returns
/// a single text answer. Failures surface as recoverable errors, never a
/// crash.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Returns the model identifier (e.g. `"claude-sonnet-4-20250514"`).
    fn model_name(&self) -> &str;
    /// Send `messages` and return the model's text reply.
    async fn complete(&self, messages: &[ChatMessage], max_tokens: u32) -> Result<String>;
}

/// Chat model backed by the Anthropic Messages API.
pub struct AnthropicModel {
    model: String,
    api_key: String,
    client: reqwest::Client,
    max_retries: u32,
    timeout_secs: u64,
}

impl AnthropicModel {
    /// Create a model client from configuration.
    ///
    /// Fails if the configured API-key environment variable is not set or
    /// the HTTP client cannot be built.
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            DocChatError::ModelCallFailure(format!(
                "{} environment variable not set",
                config.api_key_env
            ))
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DocChatError::ModelCallFailure(e.to_string()))?;

        Ok(Self {
            model: config.name.clone(),
            api_key,
            client,
            max_retries: config.max_retries,
            timeout_secs: config.timeout_secs,
        })
    }
}

#[async_trait]
impl ChatModel for AnthropicModel {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: &[ChatMessage], max_tokens: u32) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": max_tokens,
            "messages": messages,
        });

        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tracing::debug!(attempt, ?delay, "retrying model call");
                tokio::time::sleep(delay).await;
            }

            let resp = self
                .client
                .post(API_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", API_VERSION)
                .header("Content-Type", "application/json")
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let json: serde_json::Value = response.json().await.map_err(|e| {
                            DocChatError::ModelCallFailure(format!("invalid response body: {e}"))
                        })?;
                        return parse_message_response(&json);
                    }

                    // Rate limited or server error — retry
                    if status.as_u16() == 429 || status.is_server_error() {
                        let body_text = response.text().await.unwrap_or_default();
                        last_err = Some(DocChatError::ModelCallFailure(format!(
                            "API error {status}: {body_text}"
                        )));
                        continue;
                    }

                    // Client error (not 429) — don't retry
                    let body_text = response.text().await.unwrap_or_default();
                    return Err(DocChatError::ModelCallFailure(format!(
                        "API error {status}: {body_text}"
                    )));
                }
                Err(e) if e.is_timeout() => {
                    return Err(DocChatError::Timeout(self.timeout_secs));
                }
                Err(e) => {
                    last_err = Some(DocChatError::ModelCallFailure(e.to_string()));
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| {
            DocChatError::ModelCallFailure("model call failed after retries".to_string())
        }))
    }
}

/// Extract the first text block from a Messages API response.
fn parse_message_response(json: &serde_json::Value) -> Result<String> {
    json.get("content")
        .and_then(|c| c.as_array())
        .and_then(|blocks| {
            blocks
                .iter()
                .find(|b| b.get("type").map_or(true, |t| t == "text"))
        })
        .and_then(|b| b.get("text"))
        .and_then(|t| t.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| DocChatError::ModelCallFailure("response missing text content".to_string()))
}

// ============ Prompt builders ============

/// Build the question-answering prompt from retrieved context.
pub fn answer_prompt(context: &str, question: &str) -> String {
    format!(
        "You are a helpful assistant answering questions about a document. \
         Use the following context from the document to answer the question. \
         If the answer cannot be found in the context, say so.\n\n\
         Context from document:\n{context}\n\n\
         Question: {question}\n\n\
         Please provide a clear, concise answer based on the context provided."
    )
}

/// Build the summarization prompt from a document, truncated to
/// `max_chars` characters.
pub fn summary_prompt(document: &str, max_chars: usize) -> String {
    let excerpt: String = document.chars().take(max_chars).collect();
    format!("Please provide a concise summary of the following document:\n\n{excerpt}")
}
