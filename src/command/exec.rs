// Shell execution of approved commands

use anyhow::Result;
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// How an execution ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecOutcome {
    Succeeded,
    Failed,
    /// Interrupted before completion; the turn rolls back.
    Cancelled,
}

/// Captured result of one shell invocation.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// stdout followed by stderr, as one block.
    pub output: String,
    pub exit_code: i32,
    pub outcome: ExecOutcome,
}

impl ExecutionResult {
    pub fn cancelled() -> Self {
        Self {
            output: String::new(),
            exit_code: -1,
            outcome: ExecOutcome::Cancelled,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.outcome == ExecOutcome::Succeeded
    }
}

/// Execution seam used by the turn controller.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &str) -> Result<ExecutionResult>;
}

/// Runs approved commands under `bash -c` with a wall-clock limit.
pub struct ShellRunner {
    timeout: Duration,
}

impl ShellRunner {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command: &str) -> Result<ExecutionResult> {
        tracing::debug!("Executing command: {}", command);

        // Spawn failures fold into the failed path so the model can react.
        let child = match Command::new("bash")
            .arg("-c")
            .arg(command)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                return Ok(ExecutionResult {
                    output: format!("[Command failed: {}]", e),
                    exit_code: -1,
                    outcome: ExecOutcome::Failed,
                })
            }
        };

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Ok(ExecutionResult {
                    output: format!("[Command failed: {}]", e),
                    exit_code: -1,
                    outcome: ExecOutcome::Failed,
                })
            }
            // kill_on_drop reaps the child when the timed-out future drops.
            Err(_) => {
                return Ok(ExecutionResult {
                    output: format!("[Command timed out after {} seconds]", self.timeout.as_secs()),
                    exit_code: -1,
                    outcome: ExecOutcome::Failed,
                })
            }
        };

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        let exit_code = output.status.code().unwrap_or(-1);
        let outcome = if output.status.success() {
            ExecOutcome::Succeeded
        } else {
            ExecOutcome::Failed
        };

        tracing::debug!("Command exited with code {}", exit_code);

        Ok(ExecutionResult {
            output: combined,
            exit_code,
            outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_successful_command_captures_stdout() {
        let runner = ShellRunner::new(30);
        let result = runner.run("echo 'Hello, World!'").await.unwrap();

        assert!(result.succeeded());
        assert_eq!(result.exit_code, 0);
        assert!(result.output.contains("Hello, World!"));
    }

    #[tokio::test]
    async fn test_failing_command_keeps_exit_code() {
        let runner = ShellRunner::new(30);
        let result = runner.run("exit 2").await.unwrap();

        assert_eq!(result.outcome, ExecOutcome::Failed);
        assert_eq!(result.exit_code, 2);
    }

    #[tokio::test]
    async fn test_stderr_follows_stdout() {
        let runner = ShellRunner::new(30);
        let result = runner.run("echo out; echo err 1>&2").await.unwrap();

        assert!(result.succeeded());
        assert_eq!(result.output, "out\nerr\n");
    }

    #[tokio::test]
    async fn test_timeout_produces_failure_marker() {
        let runner = ShellRunner::new(1);
        let result = runner.run("sleep 5").await.unwrap();

        assert_eq!(result.outcome, ExecOutcome::Failed);
        assert_eq!(result.exit_code, -1);
        assert!(result.output.contains("timed out after 1 seconds"));
    }

    #[tokio::test]
    async fn test_shell_pipeline() {
        let runner = ShellRunner::new(30);
        let result = runner.run("printf 'a\\nb\\nc\\n' | wc -l").await.unwrap();

        assert!(result.succeeded());
        assert_eq!(result.output.trim(), "3");
    }

    #[test]
    fn test_cancelled_constructor() {
        let result = ExecutionResult::cancelled();
        assert_eq!(result.outcome, ExecOutcome::Cancelled);
        assert!(result.output.is_empty());
    }
}
