use std::io;
use io::Write;

use anyhow::Context;
use argh::FromArgs;
use tracing_subscriber::EnvFilter;

use smallsh::builtin::Flow;
use smallsh::input::{Input,LineReader};
use smallsh::{eval,global,signal};

const PROMPT: &'static str = ": ";
const LOG_ENV: &'static str = "SMALLSH_LOG";
const INTERRUPT_NOTICE: &'static str = "Interrupted. Type \"exit\" to leave.";

#[derive(FromArgs)]
/// a small interactive shell with built-in cd, status and exit.
struct Args {
	/// prompt printed before each line (default ": ")
	#[argh(option, default = "PROMPT.to_owned()")]
	prompt: String,

	/// tracing filter directive, overriding $SMALLSH_LOG (default "warn")
	#[argh(option)]
	log: Option<String>,
}

fn init_tracing(directive: Option<&str>) {
	let filter = match directive {
		Some(d) => EnvFilter::new(d),
		None => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
	};
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(io::stderr)
		.with_target(false)
		.init();
}

fn main() -> anyhow::Result<()> {
	let args: Args = argh::from_env();
	init_tracing(args.log.as_deref());
	signal::install().context("installing SIGINT handler")?;

	let mut state = global::State::new();
	let stdout = io::stdout();
	let mut stdout_locked = stdout.lock();
	let mut reader = LineReader::new(io::stdin());
	loop {
		if signal::take_interrupt() {
			writeln!(stdout_locked, "\n{}", INTERRUPT_NOTICE)?;
		}
		write!(stdout_locked, "{}", args.prompt)?;
		stdout_locked.flush()?;
		// Narrows, but cannot close, the gap before read() where SIGINT yields no EINTR.
		if signal::take_interrupt() {
			writeln!(stdout_locked, "\n{}", INTERRUPT_NOTICE)?;
			state.reap(&mut stdout_locked)?;
			continue;
		}
		match reader.read_line().context("reading input")? {
			Input::Line(line) => {
				if eval::eval(&mut state, &line, &mut stdout_locked)? == Flow::Exit {
					break;
				}
			},
			Input::Interrupted => {
				signal::take_interrupt();
				writeln!(stdout_locked, "\n{}", INTERRUPT_NOTICE)?;
			},
			Input::Eof => { break; },
		}
		state.reap(&mut stdout_locked)?;
	}
	Ok(())
}
