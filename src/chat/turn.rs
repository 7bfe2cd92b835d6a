// The turn state machine: one operator input through to a settled reply

use anyhow::Result;
use crossterm::style::Stylize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::api::{ChatReply, CompletionsApi};
use crate::chat::conversation::Conversation;
use crate::chat::directive;
use crate::cli::render::Renderer;
use crate::cli::spinner::Spinner;
use crate::cli::terminal_width;
use crate::command::{CommandRunner, Confirmer, Decision, ExecOutcome};

/// How a turn settled, from the prompt loop's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// A reply was rendered and stored.
    Completed,
    /// Operator backed out; history rolled back to where the turn started.
    Cancelled,
    /// Transport or endpoint error; the input stays in history.
    Failed,
}

enum RequestResult {
    Reply(ChatReply),
    Cancelled,
    Failed(anyhow::Error),
}

/// Drives one operator input to completion: request a reply, and when it
/// carries a `[RUN:...]` directive, confirm, execute, and feed the result
/// back for a follow-up reply. Holds the conversation and the active model.
pub struct TurnController {
    conversation: Conversation,
    model: String,
    api: Arc<dyn CompletionsApi>,
    confirmer: Box<dyn Confirmer>,
    runner: Box<dyn CommandRunner>,
    renderer: Box<dyn Renderer>,
    /// Gates the spinner and the stats footer. Rendering itself is not gated.
    interactive: bool,
}

impl TurnController {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        conversation: Conversation,
        model: impl Into<String>,
        api: Arc<dyn CompletionsApi>,
        confirmer: Box<dyn Confirmer>,
        runner: Box<dyn CommandRunner>,
        renderer: Box<dyn Renderer>,
        interactive: bool,
    ) -> Self {
        Self {
            conversation,
            model: model.into(),
            api,
            confirmer,
            runner,
            renderer,
            interactive,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
    }

    pub fn clear_history(&mut self) {
        self.conversation.clear();
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// One full turn. Every iteration appends exactly one user-role message
    /// before requesting, so rolling back on deny or cancel is always a
    /// single pop. After a command runs, directives in the follow-up reply
    /// are inert: stripped from what is rendered and stored, never executed.
    pub async fn run_turn(&mut self, input: &str) -> Result<TurnOutcome> {
        let mut message = input.to_string();
        let mut suppress_directives = false;

        loop {
            self.conversation.push_user(message);

            let started = Instant::now();
            let reply = match self.request_completion().await {
                RequestResult::Reply(reply) => reply,
                RequestResult::Cancelled => {
                    self.conversation.pop_last();
                    return Ok(TurnOutcome::Cancelled);
                }
                RequestResult::Failed(err) => {
                    tracing::debug!("Completion request failed: {:#}", err);
                    println!();
                    println!("{}", format!("Error: {:#}", err).red());
                    println!();
                    return Ok(TurnOutcome::Failed);
                }
            };
            let elapsed = started.elapsed();

            if suppress_directives {
                let cleaned = directive::strip_directives(&reply.content);
                self.render_reply(&cleaned)?;
                self.print_stats(elapsed, reply.total_tokens);
                self.conversation.push_assistant(cleaned);
                return Ok(TurnOutcome::Completed);
            }

            let command = match directive::extract_command(&reply.content) {
                Some(command) => command,
                None => {
                    self.render_reply(&reply.content)?;
                    self.print_stats(elapsed, reply.total_tokens);
                    self.conversation.push_assistant(reply.content);
                    return Ok(TurnOutcome::Completed);
                }
            };

            match self.confirmer.confirm(&command)? {
                Decision::Cancelled => {
                    self.conversation.pop_last();
                    return Ok(TurnOutcome::Cancelled);
                }
                Decision::Run(approved) => {
                    let result = self.runner.run(&approved).await?;
                    if result.outcome == ExecOutcome::Cancelled {
                        self.conversation.pop_last();
                        return Ok(TurnOutcome::Cancelled);
                    }

                    // The directive reply joins history unmodified so the
                    // model can see what it asked for.
                    self.conversation.push_assistant(reply.content);

                    message = if result.succeeded() {
                        self.print_output(&result.output);
                        format!("Command output:\n{}", result.output)
                    } else {
                        "Command failed.".to_string()
                    };
                    suppress_directives = true;
                }
            }
        }
    }

    /// Race the completion against Ctrl+C. The spinner runs only while the
    /// request is in flight.
    async fn request_completion(&self) -> RequestResult {
        let spinner = if self.interactive {
            Some(Spinner::start())
        } else {
            None
        };

        let result = tokio::select! {
            result = self.api.chat(&self.model, self.conversation.messages()) => {
                match result {
                    Ok(reply) => RequestResult::Reply(reply),
                    Err(err) => RequestResult::Failed(err),
                }
            }
            _ = tokio::signal::ctrl_c() => RequestResult::Cancelled,
        };

        if let Some(spinner) = spinner {
            spinner.stop().await;
        }

        result
    }

    fn render_reply(&self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.renderer.render(text)
    }

    fn print_output(&self, output: &str) {
        println!("{}", output.dark_grey());
    }

    fn print_stats(&self, elapsed: Duration, total_tokens: u64) {
        if !self.interactive {
            return;
        }
        let stats = format_stats(elapsed, total_tokens);
        let padding = terminal_width().saturating_sub(stats.len());
        println!("{}{}", " ".repeat(padding), stats.dark_grey());
        println!();
    }
}

fn format_stats(elapsed: Duration, total_tokens: u64) -> String {
    format!("{:.2}s | {} tokens", elapsed.as_secs_f64(), total_tokens)
}
