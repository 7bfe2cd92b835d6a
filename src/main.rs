// Wren - terminal chat with in-band command execution
// Main entry point

use anyhow::Result;
use clap::Parser;
use std::io::{self, IsTerminal};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use wren::api::{CompletionsApi, HttpApi};
use wren::chat::{Conversation, TurnController};
use wren::cli::{
    FzfPicker, MarkdownRenderer, ModelPicker, NumberedPicker, Renderer, Repl, TypewriterRenderer,
};
use wren::command::{ShellRunner, TerminalConfirmer};
use wren::config::load_config;
use wren::context;

/// Terminal chat against any OpenAI-compatible endpoint, with confirmed
/// execution of model-proposed shell commands.
#[derive(Parser)]
#[command(name = "wren", version, about)]
struct Args {
    /// Model id for this session (overrides config and WREN_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// Disable markdown rendering
    #[arg(long)]
    plain: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr and stay silent unless RUST_LOG asks for them.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    // Load configuration
    let mut config = load_config()?;
    if let Some(model) = args.model {
        config.model = model;
    }
    if args.plain {
        config.markdown = false;
    }

    let is_interactive = io::stdout().is_terminal();

    // Wire the endpoint client
    let api: Arc<dyn CompletionsApi> =
        Arc::new(HttpApi::new(config.api_base.clone(), config.api_key.clone())?);

    let renderer: Box<dyn Renderer> = if config.markdown {
        Box::new(MarkdownRenderer::new())
    } else {
        Box::new(TypewriterRenderer::new())
    };

    let picker: Box<dyn ModelPicker> = if FzfPicker::available() {
        Box::new(FzfPicker)
    } else {
        Box::new(NumberedPicker)
    };

    // Seed the conversation with the environment context prompt
    let conversation = Conversation::new(Some(context::system_prompt()));

    let controller = TurnController::new(
        conversation,
        config.model.clone(),
        api.clone(),
        Box::new(TerminalConfirmer::new()?),
        Box::new(ShellRunner::new(config.command_timeout_secs)),
        renderer,
        is_interactive,
    );

    // Create and run REPL
    let mut repl = Repl::new(controller, api, picker);

    repl.run().await?;

    Ok(())
}
