// Operator confirmation for proposed commands

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::style::Stylize;
use crossterm::terminal;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::{self, Write};

/// Resolution of the confirm/edit/deny workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Run the approved (possibly edited) command.
    Run(String),
    /// Operator declined; nothing runs and the turn rolls back.
    Cancelled,
}

/// One keypress at the confirm prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    Yes,
    No,
    Edit,
}

/// Interaction surface for the workflow. Split from the loop itself so the
/// Prompting/Editing state machine is testable without a terminal.
trait ConfirmIo {
    fn choose(&mut self, command: &str) -> Result<Choice>;
    fn edit(&mut self, command: &str) -> Result<String>;
}

/// The workflow loop: Prompting resolves to Run/Cancelled, Editing feeds a
/// new command back into Prompting. An empty edit cancels. Each iteration
/// needs a keypress, so only the operator can keep it looping.
fn resolve<I: ConfirmIo>(io: &mut I, command: &str) -> Result<Decision> {
    let mut current = command.to_string();
    loop {
        match io.choose(&current)? {
            Choice::Yes => return Ok(Decision::Run(current)),
            Choice::No => return Ok(Decision::Cancelled),
            Choice::Edit => {
                let edited = io.edit(&current)?.trim().to_string();
                if edited.is_empty() {
                    return Ok(Decision::Cancelled);
                }
                current = edited;
            }
        }
    }
}

/// Confirmation seam used by the turn controller.
pub trait Confirmer: Send {
    fn confirm(&mut self, command: &str) -> Result<Decision>;
}

/// Terminal confirmer: raw single-key choice, pre-filled inline edit.
pub struct TerminalConfirmer {
    editor: DefaultEditor,
}

impl TerminalConfirmer {
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new().context("Failed to create line editor")?;
        Ok(Self { editor })
    }
}

impl Confirmer for TerminalConfirmer {
    fn confirm(&mut self, command: &str) -> Result<Decision> {
        resolve(self, command)
    }
}

impl ConfirmIo for TerminalConfirmer {
    fn choose(&mut self, command: &str) -> Result<Choice> {
        println!("{} {}", "🔧 Command:".yellow().bold(), command);
        print!(
            "{} / {} / {} ? ",
            "[Y]es".green().bold(),
            "[n]o".red().bold(),
            "[e]dit".cyan().bold()
        );
        io::stdout().flush()?;

        let key = read_key()?;
        let (choice, echo) = choice_for_key(key);
        match echo {
            Some(c) => println!("{}", c),
            None => println!(),
        }
        println!();
        Ok(choice)
    }

    fn edit(&mut self, command: &str) -> Result<String> {
        let prompt = format!("{} ", "Edit command:".cyan().bold());
        match self.editor.readline_with_initial(&prompt, (command, "")) {
            Ok(line) => Ok(line),
            // Abandoning the editor cancels, same as submitting nothing.
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(String::new()),
            Err(e) => Err(e).context("Failed to read edited command"),
        }
    }
}

/// Read one keypress in raw mode, restoring the terminal before returning.
fn read_key() -> Result<KeyCode> {
    terminal::enable_raw_mode().context("Failed to enter raw mode")?;
    let key = loop {
        match event::read() {
            Ok(Event::Key(k)) if k.kind == KeyEventKind::Press => break Ok(k.code),
            Ok(_) => continue,
            Err(e) => break Err(e),
        }
    };
    terminal::disable_raw_mode().ok();
    key.context("Failed to read confirmation key")
}

/// Case-insensitive single-key dispatch: `y` or Enter runs, `e` edits,
/// anything else declines. Returns the character to echo, if any.
fn choice_for_key(code: KeyCode) -> (Choice, Option<char>) {
    match code {
        KeyCode::Enter => (Choice::Yes, None),
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'y' => (Choice::Yes, Some(c)),
            'e' => (Choice::Edit, Some(c)),
            _ => (Choice::No, Some(c)),
        },
        _ => (Choice::No, None),
    }
}
