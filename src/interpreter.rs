use std::env as stdenv;
use std::io::{self, ErrorKind, IsTerminal, Write};
use std::path::PathBuf;

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{debug, trace};

use crate::builtin::help_listing;
use crate::command::{CommandFactory, Context, ExitCode};
use crate::config::ShellConfig;
use crate::env::Environment;
use crate::error::ShellError;
use crate::external::BackgroundJobs;
use crate::history::{BangRef, HistoryStore};
use crate::lexer::{self, CommandLine};
use crate::signals;

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports commands defined in this crate: builtins and ExternalCommand.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// What one attempt to read a line produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Line(String),
    /// The user pressed Ctrl-C while editing.
    Interrupted,
    Eof,
}

/// Source of input lines for [`Interpreter::run_loop`].
pub trait LineSource {
    /// Show `prompt` and block until a line, an interrupt or end of input.
    fn read_line(&mut self, prompt: &str) -> Result<Input, ShellError>;
}

/// Terminals rustyline refuses to drive; it prints the prompt itself for these.
const UNSUPPORTED_TERMS: [&str; 3] = ["dumb", "cons25", "emacs"];

/// Line editing backed by [`rustyline`].
pub struct RustylineSource {
    editor: DefaultEditor,
    /// rustyline reads piped input without showing the prompt.
    echo_prompt: bool,
}

impl RustylineSource {
    pub fn new() -> Result<Self, ShellError> {
        let editor = DefaultEditor::new().map_err(ShellError::ReadFailure)?;
        let unsupported_term = stdenv::var("TERM")
            .is_ok_and(|term| UNSUPPORTED_TERMS.iter().any(|t| t.eq_ignore_ascii_case(&term)));
        Ok(Self {
            editor,
            echo_prompt: !io::stdin().is_terminal() && !unsupported_term,
        })
    }
}

impl LineSource for RustylineSource {
    fn read_line(&mut self, prompt: &str) -> Result<Input, ShellError> {
        if self.echo_prompt {
            let mut stdout = io::stdout();
            stdout.write_all(prompt.as_bytes())?;
            stdout.flush()?;
        }
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.editor
                        .add_history_entry(line.as_str())
                        .map_err(ShellError::ReadFailure)?;
                }
                Ok(Input::Line(line))
            }
            Err(ReadlineError::Interrupted) => Ok(Input::Interrupted),
            Err(ReadlineError::Eof) => Ok(Input::Eof),
            // The offending line has been consumed; the next read starts after it.
            Err(ReadlineError::Io(err)) if err.kind() == ErrorKind::InvalidData => {
                Err(ShellError::InvalidInput(err))
            }
            Err(err) => Err(ShellError::ReadFailure(err)),
        }
    }
}

/// An interactive shell: history, working-directory memory, background
/// jobs, and the chain of factories each line is dispatched through.
///
/// Example
/// ```
/// use bangsh::{Interpreter, ShellConfig};
/// let mut sh = Interpreter::new(ShellConfig::default());
/// let (mut out, mut err) = (Vec::new(), Vec::new());
/// sh.handle_line("help pwd", &mut out, &mut err).unwrap();
/// assert_eq!(
///     String::from_utf8(out).unwrap(),
///     "'pwd' is a builtin command for displaying the current working directory.\n"
/// );
/// assert_eq!(sh.history().len(), 1);
/// ```
pub struct Interpreter {
    env: Environment,
    history: HistoryStore,
    jobs: BackgroundJobs,
    config: ShellConfig,
    commands: Vec<Box<dyn CommandFactory>>,
}

impl Interpreter {
    /// Create an interpreter with the builtins and the external launcher.
    pub fn new(config: ShellConfig) -> Self {
        use crate::builtin::*;
        use crate::external::ExternalCommand;
        Self::with_commands(
            config,
            vec![
                Box::new(Factory::<Exit>::default()),
                Box::new(Factory::<Pwd>::default()),
                Box::new(Factory::<Cd>::default()),
                Box::new(Factory::<Help>::default()),
                Box::new(Factory::<History>::default()),
                Box::new(Factory::<ExternalCommand>::default()),
            ],
        )
    }

    /// Create an interpreter with a custom set of command factories.
    ///
    /// Factories are asked in order; the first to claim a line runs it.
    pub fn with_commands(config: ShellConfig, commands: Vec<Box<dyn CommandFactory>>) -> Self {
        Self {
            env: Environment::new(),
            history: HistoryStore::with_capacity(config.history_capacity()),
            jobs: BackgroundJobs::default(),
            config,
            commands,
        }
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn jobs(&self) -> &BackgroundJobs {
        &self.jobs
    }

    pub fn should_exit(&self) -> bool {
        self.env.should_exit
    }

    /// Read-eval loop on the terminal, until `exit` or end of input.
    pub fn repl(&mut self) -> Result<(), ShellError> {
        let mut source = RustylineSource::new()?;
        self.run_loop(&mut source, &mut io::stdout(), &mut io::stderr())
    }

    /// Read-eval loop over an arbitrary line source.
    ///
    /// Returns on `exit`, on end of input, or with the first fatal error.
    pub fn run_loop(
        &mut self,
        source: &mut dyn LineSource,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Result<(), ShellError> {
        let listing = help_listing(self.history.capacity());
        while !self.env.should_exit {
            signals::install(&listing).map_err(ShellError::Signal)?;
            let reaped = self.jobs.reap();
            if reaped > 0 {
                debug!(reaped, "swept finished background jobs");
            }

            let prompt = format!("{}$ ", self.prompt_dir().display());
            match source.read_line(&prompt) {
                Ok(Input::Line(line)) => self.handle_line(&line, stdout, stderr)?,
                Ok(Input::Interrupted) => write!(stdout, "\n{listing}")?,
                Ok(Input::Eof) => break,
                Err(err) => report(err, stdout, stderr)?,
            }
            stdout.flush()?;
        }
        Ok(())
    }

    /// Handle one line of input as if it had been typed at the prompt.
    ///
    /// Recoverable errors are printed and swallowed; fatal ones are returned.
    pub fn handle_line(
        &mut self,
        line: &str,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Result<(), ShellError> {
        let max = self.config.max_input_bytes();
        if line.len() > max {
            return report(ShellError::InputTooLong { max }, stdout, stderr);
        }

        let cmd = lexer::split_into_tokens(line);
        if cmd.name().is_some_and(|name| name.starts_with('!')) {
            let resolved = match self.expand(&cmd) {
                Ok(text) => text,
                Err(err) => return report(err, stdout, stderr),
            };
            writeln!(stdout, "{resolved}")?;
            return self.handle_line(&resolved, stdout, stderr);
        }

        let seq = self.history.record(line.trim_end_matches('\n'));
        trace!(seq, line, "recorded");
        if cmd.is_empty() {
            return Ok(());
        }

        match self.dispatch(&cmd, stdout) {
            Ok(code) => {
                debug!(seq, code, "command finished");
                Ok(())
            }
            Err(err) => report(err, stdout, stderr),
        }
    }

    /// Resolve a line whose first token starts with `!`.
    fn expand(&self, cmd: &CommandLine<'_>) -> Result<String, ShellError> {
        if !cmd.args().is_empty() {
            return Err(ShellError::Argument);
        }
        let token = cmd.name().unwrap_or_default();
        let reference = BangRef::parse(token).ok_or_else(|| self.history.index_error())?;
        debug!(?reference, "expanding history reference");
        self.history.resolve(reference)
    }

    /// Run a tokenized line through the first factory that claims it.
    fn dispatch(
        &mut self,
        cmd: &CommandLine<'_>,
        stdout: &mut dyn Write,
    ) -> Result<ExitCode, ShellError> {
        let command = match self.commands.iter().find_map(|factory| factory.try_create(cmd)) {
            Some(created) => created?,
            None => {
                let name = cmd.name().unwrap_or_default().to_string();
                return Err(ShellError::Spawn {
                    name,
                    source: io::Error::new(io::ErrorKind::NotFound, "command not found"),
                });
            }
        };
        let mut ctx = Context {
            env: &mut self.env,
            history: &self.history,
            jobs: &mut self.jobs,
            stdout,
        };
        command.execute(&mut ctx)
    }

    fn prompt_dir(&self) -> PathBuf {
        stdenv::current_dir().unwrap_or_else(|_| self.env.current_dir.clone())
    }
}

/// Print a recoverable error where it belongs, or hand a fatal one back.
fn report(
    err: ShellError,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> Result<(), ShellError> {
    if err.is_fatal() {
        return Err(err);
    }
    debug!(error = ?err, "command failed");
    if err.goes_to_stderr() {
        stdout.flush()?;
        writeln!(stderr, "{err}")?;
    } else {
        writeln!(stdout, "{err}")?;
    }
    Ok(())
}
