// Conversation state shared across turns

use serde::{Deserialize, Serialize};

/// One entry in the transcript sent to the completions endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Ordered, append-only message history for one session.
///
/// The full history is sent on every request — no windowing, no truncation.
/// If a system prompt is configured it occupies index 0 and survives every
/// mutation except a process exit; `clear()` resets back to that state.
pub struct Conversation {
    messages: Vec<Message>,
    system_prompt: Option<String>,
}

impl Conversation {
    pub fn new(system_prompt: Option<String>) -> Self {
        let mut conversation = Self {
            messages: Vec::new(),
            system_prompt: system_prompt.filter(|p| !p.is_empty()),
        };
        conversation.seed_system_prompt();
        conversation
    }

    fn seed_system_prompt(&mut self) {
        if let Some(prompt) = &self.system_prompt {
            self.messages.push(Message::system(prompt.clone()));
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    /// Roll back the most recent append. Used when a proposed command is
    /// denied or an in-flight request is cancelled.
    pub fn pop_last(&mut self) -> Option<Message> {
        self.messages.pop()
    }

    /// Reset to the system prompt only (or empty when none is configured).
    pub fn clear(&mut self) {
        self.messages.clear();
        self.seed_system_prompt();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
