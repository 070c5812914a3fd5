//! Completion backends for the category classifier
//!
//! The classifier only needs "prompt in, text out"; the provider's endpoint,
//! auth and response shape stay behind [`CompletionBackend`].

use crate::config::ClassifierConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One chat-completion call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// A text completion provider
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Returns the raw reply text
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible `/chat/completions` client
#[derive(Clone)]
pub struct OpenAiBackend {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl OpenAiBackend {
    pub fn new(client: Client, api_base_url: &str, model: String, api_key: String) -> Self {
        let endpoint = format!("{}/chat/completions", api_base_url.trim_end_matches('/'));
        Self {
            client,
            endpoint,
            model,
            api_key,
        }
    }

    /// Builds a backend from configuration, reading the API key from the
    /// environment variable named by `api-key-env`
    pub fn from_config(config: &ClassifierConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .with_context(|| format!("{} is not set", config.api_key_env))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build classifier HTTP client")?;

        Ok(Self::new(
            client,
            &config.api_base_url,
            config.model.clone(),
            api_key,
        ))
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        tracing::debug!(
            model = %self.model,
            prompt_length = request.user_prompt.len(),
            "Calling chat completions"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("Failed to send chat completion request")?
            .error_for_status()
            .context("Chat completion request was rejected")?;

        let parsed: ChatResponse = response
            .json()
            .await
            .context("Failed to parse chat completion response")?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| anyhow::anyhow!("No completion choices returned"))?;

        Ok(content)
    }
}

/// Backend used when no API key is configured; every call fails, so the
/// classifier relies on its URL and default fallbacks
#[derive(Debug, Clone)]
pub struct DisabledBackend {
    reason: String,
}

impl DisabledBackend {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl CompletionBackend for DisabledBackend {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String> {
        Err(anyhow::anyhow!("classifier backend disabled: {}", self.reason))
    }
}
