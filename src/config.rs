//! Startup configuration, parsed from the command line with [`argh`].

use anyhow::{Result, ensure};
use argh::FromArgs;

use crate::history::DEFAULT_CAPACITY;

/// Size of the input buffer, terminator included. Lines must fit in one
/// byte less than this.
pub const DEFAULT_MAX_LINE_LEN: usize = 1024;

#[derive(FromArgs, Debug)]
/// An interactive shell with `!`-addressable command history.
pub struct CliArgs {
    #[argh(option, default = "DEFAULT_CAPACITY")]
    /// number of commands kept in history (default 10).
    pub history_size: usize,

    #[argh(switch, short = 'v')]
    /// log launches and reaped jobs to stderr.
    pub verbose: bool,
}

/// Knobs the interpreter is built with.
///
/// Only constructed through [`Default`], [`ShellConfig::with_history_capacity`]
/// or the command line, so the history capacity is never zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    history_capacity: usize,
    max_line_len: usize,
}

impl ShellConfig {
    /// Default limits, keeping `history_capacity` commands.
    pub fn with_history_capacity(history_capacity: usize) -> Result<Self> {
        ensure!(history_capacity > 0, "--history-size must be at least 1");
        Ok(Self {
            history_capacity,
            ..Self::default()
        })
    }

    pub fn history_capacity(&self) -> usize {
        self.history_capacity
    }

    /// Longest line, in bytes, the shell accepts.
    pub fn max_input_bytes(&self) -> usize {
        self.max_line_len.saturating_sub(1)
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_CAPACITY,
            max_line_len: DEFAULT_MAX_LINE_LEN,
        }
    }
}

impl TryFrom<&CliArgs> for ShellConfig {
    type Error = anyhow::Error;

    fn try_from(args: &CliArgs) -> Result<Self> {
        Self::with_history_capacity(args.history_size)
    }
}
