// Completions API seam

pub mod client;
pub mod types;

pub use client::HttpApi;
pub use types::{ChatReply, ModelEntry};

use anyhow::Result;
use async_trait::async_trait;

use crate::chat::Message;

/// What the rest of the client needs from the endpoint.
#[async_trait]
pub trait CompletionsApi: Send + Sync {
    /// One non-streaming completion over the full message history.
    async fn chat(&self, model: &str, messages: &[Message]) -> Result<ChatReply>;

    /// Model catalog for the `/models` picker.
    async fn list_models(&self) -> Result<Vec<ModelEntry>>;
}
