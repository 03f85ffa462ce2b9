use std::path::Path;

use crate::command::{CommandFactory, Context, ExecutableCommand, ExitCode};
use crate::error::ShellError;
use crate::interpreter::Factory;
use crate::lexer::CommandLine;

/// Built-in commands known to the shell at compile time.
///
/// Builtins run in-process. Argument counting is done once, by the generic
/// [`CommandFactory`] impl below, before `from_args` is called.
pub(crate) trait BuiltinCommand: Sized {
    /// Canonical name of the command, e.g. "pwd" or "cd".
    fn name() -> &'static str;

    /// One-line description shown by `help`, without the trailing newline.
    fn description(history_capacity: usize) -> String;

    /// Most arguments the command accepts.
    const MAX_ARGS: usize;

    /// Build the command from at most `MAX_ARGS` arguments.
    fn from_args(args: &[&str]) -> Self;

    fn execute(self, ctx: &mut Context<'_>) -> Result<ExitCode, ShellError>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(self: Box<Self>, ctx: &mut Context<'_>) -> Result<ExitCode, ShellError> {
        T::execute(*self, ctx)
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(
        &self,
        line: &CommandLine<'_>,
    ) -> Option<Result<Box<dyn ExecutableCommand>, ShellError>> {
        if line.name()? != T::name() {
            return None;
        }
        Some(parse_args::<T>(line.args()).map(|cmd| Box::new(cmd) as Box<dyn ExecutableCommand>))
    }
}

fn parse_args<T: BuiltinCommand>(args: &[&str]) -> Result<T, ShellError> {
    if args.len() > T::MAX_ARGS {
        return Err(ShellError::Argument);
    }
    Ok(T::from_args(args))
}

/// Order in which `help` lists the builtins.
const HELP_ORDER: [&str; 5] = ["pwd", "cd", "exit", "help", "history"];

fn describe(name: &str, history_capacity: usize) -> Option<String> {
    let description = match name {
        n if n == Exit::name() => Exit::description(history_capacity),
        n if n == Pwd::name() => Pwd::description(history_capacity),
        n if n == Cd::name() => Cd::description(history_capacity),
        n if n == History::name() => History::description(history_capacity),
        n if n == Help::name() => Help::description(history_capacity),
        _ => return None,
    };
    Some(description)
}

/// Every builtin's description, one per line, in `help` order.
pub fn help_listing(history_capacity: usize) -> String {
    HELP_ORDER
        .iter()
        .filter_map(|name| describe(name, history_capacity))
        .map(|line| line + "\n")
        .collect()
}

/// Leave the shell.
pub struct Exit;

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn description(_: usize) -> String {
        "'exit' is a builtin command for exiting the shell program.".to_string()
    }

    const MAX_ARGS: usize = 0;

    fn from_args(_args: &[&str]) -> Self {
        Exit
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<ExitCode, ShellError> {
        ctx.env.should_exit = true;
        Ok(0)
    }
}

/// Print the current working directory.
pub struct Pwd;

impl BuiltinCommand for Pwd {
    fn name() -> &'static str {
        "pwd"
    }

    fn description(_: usize) -> String {
        "'pwd' is a builtin command for displaying the current working directory.".to_string()
    }

    const MAX_ARGS: usize = 0;

    fn from_args(_args: &[&str]) -> Self {
        Pwd
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<ExitCode, ShellError> {
        writeln!(ctx.stdout, "{}", ctx.env.current_dir.display())?;
        Ok(0)
    }
}

/// Change the current working directory.
///
/// With no target or `~`, go to the user's home; with `-`, go back to the
/// previous directory and print it.
pub struct Cd {
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn description(_: usize) -> String {
        "'cd' is a builtin command for changing the current working directory.".to_string()
    }

    const MAX_ARGS: usize = 1;

    fn from_args(args: &[&str]) -> Self {
        Cd {
            target: args.first().map(|arg| arg.to_string()),
        }
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<ExitCode, ShellError> {
        match self.target.as_deref() {
            None | Some("~") => {
                let home = ctx.env.home_dir()?;
                ctx.env.change_dir(&home)?;
            }
            Some("-") => {
                let previous = ctx
                    .env
                    .previous_target()
                    .ok_or(ShellError::PreviousDirUnset)?
                    .to_path_buf();
                writeln!(ctx.stdout, "{}", previous.display())?;
                ctx.env.change_dir(&previous)?;
            }
            Some(path) => ctx.env.change_dir(Path::new(path))?,
        }
        Ok(0)
    }
}

/// Describe one builtin, or all of them.
pub struct Help {
    pub topic: Option<String>,
}

impl BuiltinCommand for Help {
    fn name() -> &'static str {
        "help"
    }

    fn description(_: usize) -> String {
        "'help' is a builtin command for printing information on builtin commands.".to_string()
    }

    const MAX_ARGS: usize = 1;

    fn from_args(args: &[&str]) -> Self {
        Help {
            topic: args.first().map(|arg| arg.to_string()),
        }
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<ExitCode, ShellError> {
        let capacity = ctx.history.capacity();
        match self.topic {
            None => write!(ctx.stdout, "{}", help_listing(capacity))?,
            Some(topic) => match describe(&topic, capacity) {
                Some(line) => writeln!(ctx.stdout, "{line}")?,
                None => writeln!(ctx.stdout, "'{topic}' is an external command or application.")?,
            },
        }
        Ok(0)
    }
}

/// Print the retained history, newest first.
pub struct History;

impl BuiltinCommand for History {
    fn name() -> &'static str {
        "history"
    }

    fn description(history_capacity: usize) -> String {
        format!(
            "'history' is a builtin command for printing the {history_capacity} most recent commands."
        )
    }

    const MAX_ARGS: usize = 0;

    fn from_args(_args: &[&str]) -> Self {
        History
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<ExitCode, ShellError> {
        for line in ctx.history.render() {
            writeln!(ctx.stdout, "{line}")?;
        }
        Ok(0)
    }
}
