use async_trait::async_trait;
use log::debug;
use reqwest::{Client as HttpClient, header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION}};
use serde::Serialize;
use serde_json::Value;
use std::error::Error as StdError;
use std::time::Duration;

use super::{ChatClient, CompletionOptions, CompletionResponse, UpstreamError};
use crate::config::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::llm::LlmConfig;
use crate::models::chat::{ChatMessage, Role};

pub struct GroqChatClient {
    http: HttpClient,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct GroqRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f64,
}

impl GroqChatClient {
    pub fn new(
        api_key: Option<String>,
        model: Option<String>,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let chat_model = model.unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let api_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let api_key = api_key.filter(|k| !k.trim().is_empty());

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = &api_key {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", key))
                    .map_err(|e| format!("Invalid API key format: {}", e))?
            );
        }

        let http = HttpClient::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| Box::new(e) as Box<dyn StdError + Send + Sync>)?;

        Ok(Self {
            http,
            api_key,
            model: chat_model,
            base_url: api_url,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        Self::new(
            config.api_key.clone(),
            Some(config.completion_model.clone()),
            Some(config.base_url.clone()),
            config.timeout,
        )
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Sends a single user prompt and hands back the raw status and body.
    pub async fn probe(
        &self,
        prompt: &str,
        max_tokens: u32
    ) -> Result<(u16, String), UpstreamError> {
        if !self.has_api_key() {
            return Err(UpstreamError::MissingApiKey);
        }
        let messages = [ChatMessage::new(Role::User, prompt)];
        let req = GroqRequest {
            model: &self.model,
            messages: &messages,
            max_tokens,
            temperature: CompletionOptions::default().temperature,
        };
        let resp = self.http.post(self.endpoint()).json(&req).send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok((status, body))
    }
}

fn render_error_body(text: String) -> String {
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => json.to_string(),
        Err(_) => text,
    }
}

#[async_trait]
impl ChatClient for GroqChatClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        model: &str,
        options: CompletionOptions
    ) -> Result<CompletionResponse, UpstreamError> {
        if !self.has_api_key() {
            return Err(UpstreamError::MissingApiKey);
        }

        let req = GroqRequest {
            model,
            messages,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
        };

        debug!("Sending {} messages to {} (model {})", messages.len(), self.endpoint(), model);
        let resp = self.http.post(self.endpoint()).json(&req).send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body: render_error_body(text),
            });
        }

        let data: Value = serde_json::from_str(&text)
            .map_err(|_| UpstreamError::UnexpectedShape(text.clone()))?;

        let content = data
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .ok_or_else(|| UpstreamError::UnexpectedShape(data.to_string()))?;

        Ok(CompletionResponse { response: content.to_string() })
    }
}
