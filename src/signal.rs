use std::sync::atomic::{AtomicBool,Ordering};

use libc::c_int;
use nix::sys::signal::{self,SaFlags,SigAction,SigHandler,SigSet,Signal};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

extern "C" fn on_sigint(_: c_int) {
	INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Catches SIGINT without SA_RESTART, so a blocked read at the prompt returns
/// EINTR instead of the interpreter dying.
pub fn install() -> nix::Result<()> {
	let action = SigAction::new(SigHandler::Handler(on_sigint), SaFlags::empty(), SigSet::empty());
	unsafe { signal::sigaction(Signal::SIGINT, &action) }?;
	Ok(())
}

/// Clears and returns the pending-interrupt flag.
pub fn take_interrupt() -> bool {
	INTERRUPTED.swap(false, Ordering::SeqCst)
}

/// For freshly forked children, before exec.
pub fn reset_in_child(ignore: bool) -> nix::Result<()> {
	let handler = if ignore { SigHandler::SigIgn } else { SigHandler::SigDfl };
	unsafe { signal::signal(Signal::SIGINT, handler) }?;
	Ok(())
}
