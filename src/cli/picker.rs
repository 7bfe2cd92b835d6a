// Model selection surfaces

use anyhow::{Context, Result};
use std::io::{self, Write};
use std::process::{Command, Stdio};

use crate::api::ModelEntry;

/// Picks a model id from the catalog; `None` when selection is abandoned.
pub trait ModelPicker {
    fn pick(&self, models: &[ModelEntry]) -> Result<Option<String>>;
}

/// fzf-backed picker. Entries are piped as `id\tname` lines with only the
/// name column shown; the id column comes back in the selection.
pub struct FzfPicker;

impl FzfPicker {
    /// True when fzf is on PATH.
    pub fn available() -> bool {
        Command::new("which")
            .arg("fzf")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }
}

impl ModelPicker for FzfPicker {
    fn pick(&self, models: &[ModelEntry]) -> Result<Option<String>> {
        let lines: Vec<String> = models
            .iter()
            .map(|model| format!("{}\t{}", model.id, model.display_name()))
            .collect();

        let mut child = Command::new("fzf")
            .args([
                "--height=40%",
                "--reverse",
                "--prompt=Select model: ",
                "--delimiter=\t",
                "--with-nth=2",
            ])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .context("Failed to launch fzf")?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(lines.join("\n").as_bytes())
                .context("Failed to write model list to fzf")?;
        }

        let output = child
            .wait_with_output()
            .context("fzf did not exit cleanly")?;

        // Non-zero exit means the operator backed out (Esc or Ctrl+C).
        if !output.status.success() {
            return Ok(None);
        }

        Ok(parse_selection(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Id column of an fzf selection line.
fn parse_selection(stdout: &str) -> Option<String> {
    let selected = stdout.trim();
    if selected.is_empty() {
        return None;
    }
    selected.split('\t').next().map(str::to_string)
}

/// Plain numbered fallback for hosts without fzf.
pub struct NumberedPicker;

impl ModelPicker for NumberedPicker {
    fn pick(&self, models: &[ModelEntry]) -> Result<Option<String>> {
        println!();
        for (index, model) in models.iter().enumerate() {
            println!("  {:>3}. {}", index + 1, model.display_name());
        }
        println!();
        print!("Select model (1-{}, empty to cancel): ", models.len());
        io::stdout().flush()?;

        let mut line = String::new();
        io::stdin().read_line(&mut line)?;

        Ok(entry_for_choice(models, &line))
    }
}

/// Resolves a typed 1-based index; anything unparsable cancels.
fn entry_for_choice(models: &[ModelEntry], line: &str) -> Option<String> {
    let choice: usize = line.trim().parse().ok()?;
    if choice == 0 || choice > models.len() {
        return None;
    }
    Some(models[choice - 1].id.clone())
}
