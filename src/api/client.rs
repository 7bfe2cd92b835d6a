// HTTP client for the completions and model-listing endpoints

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::types::{ChatReply, ChatRequest, ChatResponse, ModelEntry, ModelList};
use super::CompletionsApi;
use crate::chat::Message;

const REQUEST_TIMEOUT_SECS: u64 = 60;

/// reqwest-backed client for any OpenAI-compatible endpoint.
pub struct HttpApi {
    client: Client,
    api_base: String,
    api_key: String,
}

impl HttpApi {
    pub fn new(api_base: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl CompletionsApi for HttpApi {
    async fn chat(&self, model: &str, messages: &[Message]) -> Result<ChatReply> {
        let url = format!("{}/v1/chat/completions", self.api_base);
        let request = ChatRequest {
            model: model.to_string(),
            messages: messages.to_vec(),
            stream: false,
        };

        tracing::debug!("Requesting completion from {} ({} messages)", url, messages.len());

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .context("Failed to send completion request")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("Completion request failed with status {}: {}", status, error_body);
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .context("Failed to parse completion response")?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .context("Completion response contained no choices")?;

        let reply = ChatReply {
            content: choice.message.content.unwrap_or_default(),
            total_tokens: parsed.usage.total_tokens,
        };

        tracing::debug!(
            "Received {} chars, {} total tokens",
            reply.content.len(),
            reply.total_tokens
        );

        Ok(reply)
    }

    async fn list_models(&self) -> Result<Vec<ModelEntry>> {
        let url = format!("{}/v1/models", self.api_base);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .context("Failed to request model list")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("Model listing failed with status {}: {}", status, error_body);
        }

        let list: ModelList = response
            .json()
            .await
            .context("Failed to parse model list")?;

        Ok(list.data)
    }
}
