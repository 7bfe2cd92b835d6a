// Reply rendering strategies

use anyhow::Result;
use std::io::{self, IsTerminal, Write};
use std::time::Duration;
use termimad::crossterm::style::Color;
use termimad::MadSkin;

/// How settled replies reach the terminal.
pub trait Renderer: Send + Sync {
    fn render(&self, text: &str) -> Result<()>;
}

/// Markdown rendering via termimad with a cool-toned skin.
pub struct MarkdownRenderer {
    skin: MadSkin,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        let mut skin = MadSkin::default();
        skin.set_headers_fg(Color::Cyan);
        skin.bold.set_fg(Color::White);
        skin.italic.set_fg(Color::Grey);
        skin.inline_code.set_fg(Color::Yellow);
        Self { skin }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for MarkdownRenderer {
    fn render(&self, text: &str) -> Result<()> {
        self.skin.print_text(text);
        Ok(())
    }
}

/// Plain-text rendering with a character-by-character reveal on a TTY.
/// Piped output gets the text verbatim with no delay.
pub struct TypewriterRenderer {
    delay: Duration,
}

impl TypewriterRenderer {
    pub fn new() -> Self {
        Self {
            delay: Duration::from_millis(1),
        }
    }
}

impl Default for TypewriterRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for TypewriterRenderer {
    fn render(&self, text: &str) -> Result<()> {
        let mut stdout = io::stdout();
        if stdout.is_terminal() {
            for ch in text.chars() {
                write!(stdout, "{}", ch)?;
                stdout.flush()?;
                std::thread::sleep(self.delay);
            }
            writeln!(stdout)?;
        } else {
            writeln!(stdout, "{}", text)?;
        }
        Ok(())
    }
}
