use std::io;

use rustyline::error::ReadlineError;
use thiserror::Error;

/// Everything that can go wrong while handling one line of input.
///
/// Most variants are recoverable: the interpreter prints them and reads the
/// next line. Only the ones reported by [`ShellError::is_fatal`] end the
/// shell.
#[derive(Debug, Error)]
pub enum ShellError {
    /// A builtin was given more arguments than it accepts.
    #[error("ERROR: More arguments were provided than expected.")]
    Argument,

    /// A `!` reference does not name a command that is still in history.
    #[error(
        "ERROR: The given command index is either not recognized or does not match one of the {capacity} most recent commands."
    )]
    Index { capacity: usize },

    /// `cd` could not enter the requested directory.
    #[error("ERROR: Invalid filepath '{path}'.")]
    Path {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("ERROR: cd: previous directory not set.")]
    PreviousDirUnset,

    /// The invoking user has no entry (or no home) in the user database.
    #[error("ERROR: cd: unable to resolve home directory.")]
    HomeDir,

    #[error("ERROR: Input exceeds the maximum command length of {max} bytes.")]
    InputTooLong { max: usize },

    /// The line read was not UTF-8. Only that line is lost.
    #[error("ERROR: Input is not valid UTF-8 and was ignored.")]
    InvalidInput(#[source] io::Error),

    /// The external program could not be started. Printed on stderr.
    #[error("ERROR: Unable to execute '{name}': {source}")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },

    /// The OS refused to create another process.
    #[error("ERROR: Unable to fork: {0}")]
    Fork(#[source] io::Error),

    #[error("ERROR: Unable to read command: {0}")]
    ReadFailure(#[source] ReadlineError),

    #[error("ERROR: Unable to install interrupt handler: {0}")]
    Signal(#[source] nix::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ShellError {
    /// Whether the error must terminate the main loop.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ShellError::Fork(_)
                | ShellError::ReadFailure(_)
                | ShellError::Signal(_)
                | ShellError::Io(_)
        )
    }

    /// Whether the message belongs on stderr rather than stdout.
    pub fn goes_to_stderr(&self) -> bool {
        matches!(self, ShellError::Spawn { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_and_fatal_split() {
        assert!(!ShellError::Argument.is_fatal());
        assert!(!ShellError::Index { capacity: 10 }.is_fatal());
        assert!(!ShellError::PreviousDirUnset.is_fatal());
        assert!(!ShellError::InputTooLong { max: 1023 }.is_fatal());
        assert!(!ShellError::InvalidInput(io::Error::from(io::ErrorKind::InvalidData)).is_fatal());
        let spawn = ShellError::Spawn {
            name: "nope".into(),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(!spawn.is_fatal());
        assert!(spawn.goes_to_stderr());

        assert!(ShellError::Fork(io::Error::from(io::ErrorKind::WouldBlock)).is_fatal());
        assert!(ShellError::ReadFailure(ReadlineError::Eof).is_fatal());
    }

    #[test]
    fn test_index_message_names_capacity() {
        let msg = ShellError::Index { capacity: 10 }.to_string();
        assert_eq!(
            msg,
            "ERROR: The given command index is either not recognized or does not match one of the 10 most recent commands."
        );
    }
}
