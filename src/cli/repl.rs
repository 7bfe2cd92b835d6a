// Interactive chat loop

use anyhow::{Context as _, Result};
use crossterm::{
    cursor,
    style::Stylize,
    terminal::{Clear, ClearType},
    ExecutableCommand,
};
use rustyline::error::ReadlineError;
use rustyline::{
    Cmd, ConditionalEventHandler, DefaultEditor, Event, EventContext, EventHandler, KeyEvent,
    RepeatCount,
};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::api::CompletionsApi;
use crate::chat::{TurnController, TurnOutcome};

use super::commands::Command;
use super::picker::ModelPicker;

/// Ctrl+L handler: raises a flag so the loop can tell "clear conversation"
/// apart from a plain interrupt, then aborts the readline call.
struct ClearRequest {
    flag: Arc<AtomicBool>,
}

impl ConditionalEventHandler for ClearRequest {
    fn handle(
        &self,
        _evt: &Event,
        _n: RepeatCount,
        _positive: bool,
        _ctx: &EventContext,
    ) -> Option<Cmd> {
        self.flag.store(true, Ordering::SeqCst);
        Some(Cmd::Interrupt)
    }
}

pub struct Repl {
    controller: TurnController,
    api: Arc<dyn CompletionsApi>,
    picker: Box<dyn ModelPicker>,
}

impl Repl {
    pub fn new(
        controller: TurnController,
        api: Arc<dyn CompletionsApi>,
        picker: Box<dyn ModelPicker>,
    ) -> Self {
        Self {
            controller,
            api,
            picker,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut editor = DefaultEditor::new().context("Failed to create line editor")?;

        // History lives for the session only; nothing is persisted.
        let clear_requested = Arc::new(AtomicBool::new(false));
        editor.bind_sequence(
            KeyEvent::ctrl('l'),
            EventHandler::Conditional(Box::new(ClearRequest {
                flag: clear_requested.clone(),
            })),
        );

        self.greet()?;

        let prompt = format!("{} ", ">".cyan().bold());
        loop {
            match editor.readline(&prompt) {
                Ok(line) => {
                    let input = line.trim().to_string();
                    if input.is_empty() {
                        continue;
                    }
                    let _ = editor.add_history_entry(&input);

                    match Command::parse(&input) {
                        Some(Command::Models) => {
                            self.switch_model().await?;
                            continue;
                        }
                        Some(Command::Clear) => {
                            self.clear_conversation()?;
                            continue;
                        }
                        Some(Command::Exit) => {
                            println!();
                            break;
                        }
                        None => {}
                    }

                    if self.controller.run_turn(&input).await? == TurnOutcome::Cancelled {
                        println!();
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    if clear_requested.swap(false, Ordering::SeqCst) {
                        self.clear_conversation()?;
                    } else {
                        println!();
                    }
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(e) => return Err(e).context("Failed to read input"),
            }
        }

        Ok(())
    }

    fn greet(&self) -> Result<()> {
        io::stdout()
            .execute(Clear(ClearType::All))?
            .execute(cursor::MoveTo(0, 0))?;
        println!("{}", format!("⚡ {}", self.controller.model()).cyan().bold());
        println!(
            "{}",
            "/models | /clear | /exit | ctrl+l to clear | ctrl+d to exit | ctrl+c to cancel"
                .dark_grey()
        );
        println!();
        Ok(())
    }

    fn clear_conversation(&mut self) -> Result<()> {
        self.controller.clear_history();
        self.greet()?;
        println!("{}", "Conversation cleared".yellow().bold());
        println!();
        Ok(())
    }

    async fn switch_model(&mut self) -> Result<()> {
        let models = match self.api.list_models().await {
            Ok(models) => models,
            Err(e) => {
                tracing::warn!("Model listing failed: {:#}", e);
                println!("{}", format!("Error fetching models: {:#}", e).red());
                println!();
                return Ok(());
            }
        };

        match self.picker.pick(&models)? {
            Some(model) => {
                self.controller.set_model(model);
                println!();
                println!(
                    "{}",
                    format!("✓ Switched to: {}", self.controller.model())
                        .green()
                        .bold()
                );
                println!();
                tokio::time::sleep(Duration::from_secs(1)).await;
                self.greet()?;
            }
            None => println!(),
        }

        Ok(())
    }
}
