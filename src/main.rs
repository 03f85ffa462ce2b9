use std::env;
use std::io;
use std::process::ExitCode;

use anyhow::Result;
use bangsh::{CliArgs, Interpreter, ShellConfig};
use tracing::debug;

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let env_filter = env::var("RUST_LOG").unwrap_or_else(|_| level.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from(env_filter))
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn run(args: &CliArgs) -> Result<()> {
    let config = ShellConfig::try_from(args)?;
    debug!(?config, "starting shell");
    Interpreter::new(config).repl()?;
    Ok(())
}

fn main() -> ExitCode {
    let args: CliArgs = argh::from_env();
    init_tracing(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // ShellError messages already carry their cause.
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
