// Command approval and execution

pub mod confirm;
pub mod exec;

pub use confirm::{Confirmer, Decision, TerminalConfirmer};
pub use exec::{CommandRunner, ExecOutcome, ExecutionResult, ShellRunner};
