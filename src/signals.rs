use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};

extern "C" fn on_interrupt(_: std::ffi::c_int) {
    // SAFETY: write(2) is async-signal-safe.
    unsafe {
        libc::write(libc::STDOUT_FILENO, b"\n".as_ptr().cast(), 1);
    }
}

/// Absorb SIGINT in the interpreter so Ctrl-C only reaches the foreground
/// children.
///
/// `SA_RESTART` is left off: blocking reads and waits return `EINTR`, and
/// their callers retry.
pub fn install_interrupt_handler() -> nix::Result<()> {
    let action = SigAction::new(
        SigHandler::Handler(on_interrupt),
        SaFlags::empty(),
        SigSet::empty(),
    );
    // SAFETY: the handler touches no shared state.
    unsafe { signal::sigaction(Signal::SIGINT, &action) }?;
    Ok(())
}
