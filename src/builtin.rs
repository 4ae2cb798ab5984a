use std::{env,fs};
use std::io::{self,Write};
use std::path::{Path,PathBuf};

use tracing::debug;

use crate::global;
use crate::types::Status;

/// What the read loop does after a command.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Flow { Continue, Exit }

pub type Builtin = fn(&mut global::State, &[String], &mut dyn Write) -> io::Result<Flow>;

fn change_dir(target: &Path) -> io::Result<()> {
	fs::read_dir(target)?;
	env::set_current_dir(target)
}

/// Operands after the first are ignored; every operand is a path, never an option.
pub fn builtin_cd(state: &mut global::State, args: &[String], out: &mut dyn Write) -> io::Result<Flow> {
	let target = match args.first() {
		Some(t) => PathBuf::from(t),
		None => match env::var_os("HOME") {
			Some(home) => PathBuf::from(home),
			None => {
				writeln!(out, "cd: HOME not set")?;
				state.status = Status::FAILURE;
				return Ok(Flow::Continue);
			},
		},
	};

	match change_dir(&target) {
		Ok(()) => {
			debug!(dir = %target.display(), "changed directory");
			state.status = Status::SUCCESS;
		},
		Err(e) => {
			debug!(dir = %target.display(), error = %e, "cd failed");
			writeln!(out, "cd: {}: directory not found", target.display())?;
			state.status = Status::FAILURE;
		},
	}
	Ok(Flow::Continue)
}

pub fn builtin_status(state: &mut global::State, _: &[String], out: &mut dyn Write) -> io::Result<Flow> {
	writeln!(out, "{}", state.status)?;
	Ok(Flow::Continue)
}

pub fn builtin_exit(_: &mut global::State, _: &[String], _: &mut dyn Write) -> io::Result<Flow> {
	Ok(Flow::Exit)
}

pub fn match_builtin(name: &str) -> Option<Builtin> {
	match name {
		"cd" => Some(builtin_cd),
		"status" => Some(builtin_status),
		"exit" => Some(builtin_exit),
		_ => None,
	}
}
