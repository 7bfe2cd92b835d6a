// CLI module
// Public interface for the interactive terminal surface

mod commands;
pub mod picker;
pub mod render;
mod repl;
pub mod spinner;

pub use picker::{FzfPicker, ModelPicker, NumberedPicker};
pub use render::{MarkdownRenderer, Renderer, TypewriterRenderer};
pub use repl::Repl;

/// Current terminal width, or 80 when not a TTY.
pub(crate) fn terminal_width() -> usize {
    crossterm::terminal::size()
        .map(|(w, _)| w as usize)
        .unwrap_or(80)
}
