// Wire types for the OpenAI-compatible endpoint

use serde::{Deserialize, Deserializer, Serialize};

use crate::chat::Message;

/// Non-streaming chat completion request body.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    /// Always false; replies are consumed whole.
    pub stream: bool,
}

/// The two response fields the client consumes.
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub content: String,
    pub total_tokens: u64,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    /// Null for empty replies on some endpoints.
    pub content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Usage {
    /// Zero when the endpoint omits usage or reports it in a non-numeric shape.
    #[serde(default, deserialize_with = "lenient_u64")]
    pub total_tokens: u64,
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_u64().unwrap_or(0))
}

/// One entry from the model-listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelEntry {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl ModelEntry {
    /// Human-facing label, falling back to the id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Deserialize)]
pub struct ModelList {
    pub data: Vec<ModelEntry>,
}
