pub mod groq;

use async_trait::async_trait;
use log::warn;
use std::error::Error as StdError;
use std::sync::Arc;
use thiserror::Error;
use super::LlmConfig;
use self::groq::GroqChatClient;
use crate::models::chat::ChatMessage;

pub const CHAT_MAX_TOKENS: u32 = 400;
pub const CHAT_TEMPERATURE: f64 = 0.6;

#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub response: String,
}

#[derive(Debug, Clone, Copy)]
pub struct CompletionOptions {
    pub max_tokens: u32,
    pub temperature: f64,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            max_tokens: CHAT_MAX_TOKENS,
            temperature: CHAT_TEMPERATURE,
        }
    }
}

/// Failure modes of a completion call. `Display` yields the text that is
/// handed back to the browser in place of a model reply.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("[No GROQ_API_KEY set in .env]")]
    MissingApiKey,
    #[error("[Network error contacting Groq: {0}]")]
    Network(#[from] reqwest::Error),
    #[error("[Groq Error {status}: {body}]")]
    Status {
        status: u16,
        body: String,
    },
    #[error("[Unexpected Groq response shape: {0}]")]
    UnexpectedShape(String),
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        model: &str,
        options: CompletionOptions
    ) -> Result<CompletionResponse, UpstreamError>;

    /// Never fails: every upstream error is rendered into the reply text.
    async fn complete_text(
        &self,
        messages: &[ChatMessage],
        model: &str,
        options: CompletionOptions
    ) -> String {
        match self.complete(messages, model, options).await {
            Ok(resp) => resp.response,
            Err(e) => {
                warn!("Upstream completion failed: {}", e);
                e.to_string()
            }
        }
    }
}

pub fn new_client(
    config: &LlmConfig
) -> Result<Arc<dyn ChatClient>, Box<dyn StdError + Send + Sync>> {
    let client = GroqChatClient::from_config(config)?;
    Ok(Arc::new(client))
}
