// Environment context embedded in the system prompt

use chrono::Local;
use std::env;
use std::fs;
use std::path::Path;

/// Protocol contract appended after the context line. The model is told to
/// answer from context first and to emit at most one `[RUN:...]` directive.
const PROTOCOL_GUIDE: &str = "\
IMPORTANT: Use the context information above to answer questions when possible. Only run commands when you need information NOT already provided in the context.

To run system commands when needed, use this exact format: [RUN:your_command_here]

Examples:
- Check date: [RUN:date]
- Current directory: [RUN:pwd]
- List files: [RUN:ls -la]
- Chain commands: [RUN:date && whoami]

Run ONLY ONE command per user request. After receiving command output, provide a helpful response but DO NOT run additional verification commands.

Always assume bash. Before running any command, consider if you can answer using the context provided above.";

/// Builds the system prompt sent as message zero: date, distro, shell and
/// editor on one line, then the command protocol.
pub fn system_prompt() -> String {
    format!(
        "Current context: {} | Distro: {} | Shell: {} | Editor: {}\n\n{}",
        Local::now().format("%b %d %Y"),
        detect_distro(),
        detect_shell(),
        detect_editor(),
        PROTOCOL_GUIDE
    )
}

/// Distro id from an os-release `ID=` line, quotes stripped.
fn parse_distro(contents: &str) -> Option<String> {
    contents
        .lines()
        .find_map(|line| line.strip_prefix("ID="))
        .map(|value| value.trim().trim_matches('"').to_string())
}

fn detect_distro() -> String {
    fs::read_to_string("/etc/os-release")
        .ok()
        .and_then(|contents| parse_distro(&contents))
        .unwrap_or_else(|| {
            tracing::warn!("Could not determine distro from /etc/os-release");
            "unknown".to_string()
        })
}

fn detect_shell() -> String {
    env::var("SHELL")
        .ok()
        .and_then(|path| {
            Path::new(&path)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "bash".to_string())
}

fn detect_editor() -> String {
    env::var("EDITOR").unwrap_or_else(|_| "vi".to_string())
}
