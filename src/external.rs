use std::io::{self, ErrorKind};
use std::process::{Child, Command, ExitStatus};

use tracing::{debug, info, warn};

use crate::command::{CommandFactory, Context, ExecutableCommand, ExitCode};
use crate::error::ShellError;
use crate::interpreter::Factory;
use crate::lexer::CommandLine;

/// Command that is not a builtin.
///
/// The program is looked up on `PATH` by the OS and inherits the shell's
/// stdin, stdout and stderr.
pub struct ExternalCommand {
    name: String,
    args: Vec<String>,
    background: bool,
}

impl ExternalCommand {
    pub fn new(name: impl Into<String>, args: Vec<String>, background: bool) -> Self {
        Self {
            name: name.into(),
            args,
            background,
        }
    }

    fn spawn(&self) -> Result<Child, ShellError> {
        Command::new(&self.name)
            .args(&self.args)
            .spawn()
            .map_err(|err| launch_error(&self.name, err))
    }
}

/// Claims every line, so it must be the last factory in the chain.
impl CommandFactory for Factory<ExternalCommand> {
    fn try_create(
        &self,
        line: &CommandLine<'_>,
    ) -> Option<Result<Box<dyn ExecutableCommand>, ShellError>> {
        let name = line.name()?;
        let args = line.args().iter().map(|arg| arg.to_string()).collect();
        Some(Ok(Box::new(ExternalCommand::new(
            name,
            args,
            line.background(),
        ))))
    }
}

impl ExecutableCommand for ExternalCommand {
    fn execute(self: Box<Self>, ctx: &mut Context<'_>) -> Result<ExitCode, ShellError> {
        // The child writes straight to fd 1; keep our own output ahead of it.
        ctx.stdout.flush()?;
        let mut child = self.spawn()?;
        let pid = child.id();

        if self.background {
            info!(pid, name = %self.name, "started background job");
            ctx.jobs.push(child);
            return Ok(0);
        }

        debug!(pid, name = %self.name, "waiting for foreground job");
        let status = child.wait()?;
        let code = exit_code(status);
        debug!(pid, code, "foreground job finished");
        Ok(code)
    }
}

/// Fork-level failures are fatal; anything else about starting the program
/// is reported and the shell carries on.
fn launch_error(name: &str, err: io::Error) -> ShellError {
    match err.kind() {
        ErrorKind::WouldBlock | ErrorKind::OutOfMemory => ShellError::Fork(err),
        _ => ShellError::Spawn {
            name: name.to_string(),
            source: err,
        },
    }
}

fn exit_code(status: ExitStatus) -> ExitCode {
    match status.code() {
        Some(code) => code,
        None => terminated_by_signal(status),
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = exit_status.signal() {
        128 + signal
    } else if exit_status.core_dumped() {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}

/// Background children that have not been reaped yet.
#[derive(Debug, Default)]
pub struct BackgroundJobs {
    children: Vec<Child>,
}

impl BackgroundJobs {
    pub fn push(&mut self, child: Child) {
        self.children.push(child);
    }

    /// Collect every child that has already exited, without blocking.
    ///
    /// Returns how many were reaped.
    pub fn reap(&mut self) -> usize {
        let before = self.children.len();
        self.children.retain_mut(|child| match child.try_wait() {
            Ok(Some(status)) => {
                info!(pid = child.id(), code = exit_code(status), "reaped background job");
                false
            }
            Ok(None) => true,
            Err(err) => {
                warn!(pid = child.id(), %err, "could not poll background job");
                false
            }
        });
        before - self.children.len()
    }

    /// Number of jobs still running, as of the last sweep.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}
