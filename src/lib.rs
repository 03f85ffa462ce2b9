//! A small interactive shell with bounded, `!`-addressable command history.
//!
//! Each line read from the user is split into words, checked for a history
//! reference (`!!`, `!N`), recorded, and then handed to a chain of command
//! factories: the builtins (`exit`, `pwd`, `cd`, `help`, `history`) first,
//! and the external program launcher last.
//!
//! The main entry point is [`Interpreter`]. The public modules [`command`]
//! and [`env`] expose the traits and the state that commands operate on.

mod builtin;
pub mod command;
pub mod config;
pub mod env;
pub mod error;
mod external;
pub mod history;
mod interpreter;
mod lexer;
mod signals;

pub use builtin::help_listing;
pub use config::{CliArgs, ShellConfig};
pub use error::ShellError;
pub use external::BackgroundJobs;
pub use interpreter::{Input, Interpreter, LineSource, RustylineSource};
pub use lexer::{CommandLine, split_into_tokens};
