//! Ctrl-C handling: print the builtin help instead of dying.

use std::os::fd::BorrowedFd;
use std::sync::OnceLock;

use nix::libc;
use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet, Signal, sigaction};
use nix::unistd::write;

/// Bytes the handler writes. Set once, before the handler is first installed.
static INTERRUPT_TEXT: OnceLock<Box<[u8]>> = OnceLock::new();

extern "C" fn handle_sigint(_signal: libc::c_int) {
    // Only async-signal-safe work here: an atomic load and write(2).
    if let Some(text) = INTERRUPT_TEXT.get() {
        let stdout = unsafe { BorrowedFd::borrow_raw(libc::STDOUT_FILENO) };
        let _ = write(stdout, text);
    }
}

/// Install the SIGINT handler, which writes a newline followed by `listing`.
///
/// Safe to call repeatedly; the text from the first call is kept.
pub(crate) fn install(listing: &str) -> nix::Result<()> {
    INTERRUPT_TEXT.get_or_init(|| format!("\n{listing}").into_bytes().into_boxed_slice());
    let action = SigAction::new(
        SigHandler::Handler(handle_sigint),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    // The handler only touches INTERRUPT_TEXT, which is initialised above.
    unsafe { sigaction(Signal::SIGINT, &action) }?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sys::signal::raise;

    #[test]
    fn test_interrupt_does_not_terminate() {
        install("help text\n").unwrap();
        install("help text\n").unwrap();
        raise(Signal::SIGINT).unwrap();
        let text = INTERRUPT_TEXT.get().expect("text set by install");
        assert!(text.starts_with(b"\n"));
    }
}
