use std::io::Write;

use crate::env::Environment;
use crate::error::ShellError;
use crate::external::BackgroundJobs;
use crate::history::HistoryStore;
use crate::lexer::CommandLine;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// Programs killed by a signal report `128 + signal`, as POSIX shells do.
pub type ExitCode = i32;

/// Everything a command may read or change while it runs.
pub struct Context<'a> {
    pub env: &'a mut Environment,
    pub history: &'a HistoryStore,
    pub jobs: &'a mut BackgroundJobs,
    /// Where builtin output goes. External programs inherit the real stdout
    /// instead, so this is flushed before they start.
    pub stdout: &'a mut dyn Write,
}

/// Object-safe trait for any command that can be executed by the shell.
///
/// This is implemented by builtins via a blanket impl and by external commands.
pub trait ExecutableCommand {
    fn execute(self: Box<Self>, ctx: &mut Context<'_>) -> Result<ExitCode, ShellError>;
}

/// Factory that tries to create a command from a tokenized line.
///
/// Returns `None` when the factory doesn't recognize the command name, and
/// `Some(Err(_))` when it does but the arguments are unacceptable.
pub trait CommandFactory {
    fn try_create(
        &self,
        line: &CommandLine<'_>,
    ) -> Option<Result<Box<dyn ExecutableCommand>, ShellError>>;
}
