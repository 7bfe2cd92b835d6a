// Configuration structs

use anyhow::{bail, Result};

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Endpoint root, e.g. "https://llm.example.com/api". The client appends
    /// the `/v1/...` paths.
    pub api_base: String,

    /// Bearer token sent with every request.
    pub api_key: String,

    /// Model id sent with every completion request. `/models` switches it
    /// for the session only.
    pub model: String,

    /// Render replies as markdown; plain typewriter output when false.
    pub markdown: bool,

    /// Wall-clock limit for approved commands.
    pub command_timeout_secs: u64,
}

impl Config {
    /// Validate configuration and return helpful errors.
    pub fn validate(&self) -> Result<()> {
        if !self.api_base.starts_with("http") {
            bail!(
                "api_base must be an http(s) URL, got '{}'\n\
                 Example: api_base = \"https://llm.example.com/api\"",
                self.api_base
            );
        }

        if self.api_key.trim().is_empty() {
            bail!("api_key must not be empty");
        }

        if self.model.trim().is_empty() {
            bail!("model must not be empty");
        }

        if self.command_timeout_secs == 0 {
            bail!("command_timeout_secs must be greater than 0");
        }

        Ok(())
    }
}
