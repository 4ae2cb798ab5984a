use crate::builtin::{self,Flow};
use crate::global;
use crate::job::WaitStatusExt;
use crate::parser;
use crate::signal;
use crate::types::{Invocation,Mode,Status};

use std::{error,ffi,fmt,fs,io};
use std::ffi::{CStr,CString};
use std::io::Write;
use std::os::unix::io::{AsRawFd,RawFd};
use nix::errno::Errno;
use nix::fcntl::{self,OFlag};
use nix::sys::stat::Mode as FileMode;
use nix::sys::wait;
use nix::unistd::{self,ForkResult,Pid};
use tracing::{debug,warn};

pub const EXIT_REDIRECT_FAILED: i32 = 1;
pub const EXIT_EXEC_FAILED: i32 = 126;
pub const EXIT_NOT_FOUND: i32 = 127;

const DEV_NULL: &CStr = c"/dev/null";

/// Errors the interpreter cannot recover from.
#[derive(Debug)]
pub enum EvalError {
	Fork(nix::Error),
	Io(io::Error),
}
impl From<io::Error> for EvalError {
	fn from(e: io::Error) -> EvalError {
		EvalError::Io(e)
	}
}
impl fmt::Display for EvalError {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match *self {
			EvalError::Fork(ref e) => write!(f, "failed to create process: {}", e),
			EvalError::Io(ref e) => write!(f, "IO error: {}", e),
		}
	}
}
impl error::Error for EvalError {
	fn source(&self) -> Option<&(dyn error::Error + 'static)> {
		match *self {
			EvalError::Fork(ref e) => Some(e),
			EvalError::Io(ref e) => Some(e),
		}
	}
}

/// Stream wiring for a child, prepared in the parent before forking.
#[derive(Debug)]
enum ChildIo {
	Inherit,
	Input(fs::File),
	Output(CString),
	Discard,
}

#[derive(Debug)]
enum ExecError {
	NixError(nix::Error),
	Redirect(CString, nix::Error),
}
impl From<nix::Error> for ExecError {
	fn from(e: nix::Error) -> ExecError {
		ExecError::NixError(e)
	}
}

fn redirect_to(path: &CStr, oflag: OFlag, targets: &[RawFd]) -> Result<(), ExecError> {
	let fd = fcntl::open(path, oflag, FileMode::S_IRUSR | FileMode::S_IWUSR)
		.map_err(|e| ExecError::Redirect(path.to_owned(), e))?;
	for &target in targets {
		unistd::dup2(fd, target)?;
	}
	unistd::close(fd)?;
	Ok(())
}

fn do_exec_command(argv: &[CString], child_io: &ChildIo) -> Result<(), ExecError> {
	match *child_io {
		ChildIo::Inherit => {
			signal::reset_in_child(false)?;
		},
		ChildIo::Input(ref file) => {
			signal::reset_in_child(false)?;
			unistd::dup2(file.as_raw_fd(), libc::STDIN_FILENO)?;
		},
		ChildIo::Output(ref path) => {
			signal::reset_in_child(false)?;
			redirect_to(path, OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
			            &[libc::STDOUT_FILENO, libc::STDERR_FILENO])?;
		},
		ChildIo::Discard => {
			signal::reset_in_child(true)?;
			redirect_to(DEV_NULL, OFlag::O_RDWR,
			            &[libc::STDIN_FILENO, libc::STDOUT_FILENO, libc::STDERR_FILENO])?;
		},
	}
	unistd::execvp(&argv[0], argv)?;
	Ok(())
}

// Bypasses the std stderr lock, which another thread may have held at fork time.
fn child_message(msg: String) {
	let _ = unistd::write(io::stderr(), msg.as_bytes());
}

fn exec_command(argv: &[CString], child_io: &ChildIo) -> ! {
	let name = argv[0].to_string_lossy();
	let code = match do_exec_command(argv, child_io) {
		Err(ExecError::NixError(Errno::ENOENT)) => {
			child_message(format!("command not found: {}\n", name));
			EXIT_NOT_FOUND
		},
		Err(ExecError::NixError(e)) => {
			child_message(format!("{}: {}\n", name, e));
			EXIT_EXEC_FAILED
		},
		Err(ExecError::Redirect(path, e)) => {
			child_message(format!("cannot open \"{}\" for output: {}\n", path.to_string_lossy(), e));
			EXIT_REDIRECT_FAILED
		},
		Ok(()) => EXIT_EXEC_FAILED,
	};
	unsafe { libc::_exit(code) }
}

fn spawn(argv: &[CString], child_io: &ChildIo, out: &mut dyn Write) -> Result<Pid, EvalError> {
	out.flush()?;
	io::stdout().flush()?;
	// The child only rewires descriptors and execs.
	match unsafe { unistd::fork() } {
		Ok(ForkResult::Parent { child }) => {
			debug!(pid = child.as_raw(), program = %argv[0].to_string_lossy(), "forked");
			Ok(child)
		},
		Ok(ForkResult::Child) => exec_command(argv, child_io),
		Err(e) => Err(EvalError::Fork(e)),
	}
}

fn wait_foreground(pid: Pid) -> nix::Result<Status> {
	loop {
		match wait::waitpid(pid, None) {
			Ok(ws) => if let Some(status) = ws.status() {
				return Ok(status);
			},
			Err(Errno::EINTR) => {},
			Err(e) => return Err(e),
		}
	}
}

fn run_foreground(state: &mut global::State, argv: &[CString], child_io: ChildIo, out: &mut dyn Write) -> Result<(), EvalError> {
	let pid = spawn(argv, &child_io, out)?;
	drop(child_io);
	match wait_foreground(pid) {
		Ok(status) => {
			debug!(pid = pid.as_raw(), ?status, "foreground job finished");
			if let Status::Signaled(_) = status {
				writeln!(out, "{}", status)?;
			}
			state.status = status;
		},
		Err(e) => {
			warn!(pid = pid.as_raw(), error = %e, "waiting for foreground job failed");
			writeln!(out, "wait: {}", e)?;
			state.status = Status::FAILURE;
		},
	}
	// An interrupt during the wait belongs to the child, not to the prompt.
	signal::take_interrupt();
	Ok(())
}

fn run_background(state: &mut global::State, argv: &[CString], out: &mut dyn Write) -> Result<(), EvalError> {
	let pid = spawn(argv, &ChildIo::Discard, out)?;
	if !state.job_set.push(pid) {
		warn!(pid = pid.as_raw(), "pid already tracked as a background job");
	}
	writeln!(out, "Background Process ID: {}", pid)?;
	out.flush()?;
	Ok(())
}

/// Runs an external program in the mode the invocation asks for.
pub fn launch(state: &mut global::State, invocation: &Invocation, out: &mut dyn Write) -> Result<(), EvalError> {
	let argv: Result<Vec<CString>, ffi::NulError> = invocation.arguments.iter().map(|s| CString::new(s.as_bytes())).collect();
	let argv = match argv {
		Ok(argv) => argv,
		Err(e) => {
			writeln!(out, "{}: {}", invocation.name(), e)?;
			state.status = Status::FAILURE;
			return Ok(());
		},
	};

	match invocation.mode() {
		Mode::Foreground => run_foreground(state, &argv, ChildIo::Inherit, out),
		Mode::InputRedirect(path) => match fs::File::open(path) {
			Ok(file) => run_foreground(state, &argv, ChildIo::Input(file), out),
			Err(e) => {
				debug!(path = path, error = %e, "input redirect unavailable");
				writeln!(out, "cannot open \"{}\" for input", path)?;
				state.status = Status::FAILURE;
				Ok(())
			},
		},
		Mode::OutputRedirect(path) => match CString::new(path) {
			Ok(path) => run_foreground(state, &argv, ChildIo::Output(path), out),
			Err(e) => {
				writeln!(out, "{}: {}", invocation.name(), e)?;
				state.status = Status::FAILURE;
				Ok(())
			},
		},
		Mode::Background => run_background(state, &argv, out),
	}
}

/// Parses and dispatches one input line.
pub fn eval(state: &mut global::State, line: &str, out: &mut dyn Write) -> Result<Flow, EvalError> {
	let invocation = match parser::parse(line) {
		Ok(Some(invocation)) => invocation,
		Ok(None) => return Ok(Flow::Continue),
		Err(e) => {
			writeln!(out, "{}", e)?;
			state.status = Status::FAILURE;
			return Ok(Flow::Continue);
		},
	};
	debug!(?invocation, "parsed");

	if let Some(builtin) = builtin::match_builtin(invocation.name()) {
		if invocation.redirect.is_some() || invocation.is_background {
			debug!(name = invocation.name(), "builtins ignore redirection and '&'");
		}
		return builtin(state, &invocation.arguments[1 ..], out).map_err(EvalError::from);
	}

	launch(state, &invocation, out)?;
	Ok(Flow::Continue)
}
