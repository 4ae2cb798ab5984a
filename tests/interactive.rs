use std::{env,fs,io,process};
use std::io::prelude::*;
use std::path::{Path,PathBuf};

use nix::sys::signal::{self,Signal};
use nix::unistd::Pid;
use pretty_assertions::assert_eq;

/// Runs the shell binary over pipes, feeding it a whole session at once.
struct ShellHandler {
	cmd: process::Command,
}

struct Session {
	stdout: String,
	code: Option<i32>,
}

impl ShellHandler {
	pub fn new() -> ShellHandler {
		let mut cmd = process::Command::new(env!("CARGO_BIN_EXE_smallsh"));
		cmd.stdin(process::Stdio::piped())
			.stdout(process::Stdio::piped())
			.stderr(process::Stdio::piped())
			.env_remove("SMALLSH_LOG");
		ShellHandler { cmd: cmd }
	}

	pub fn env(mut self, key: &str, value: &Path) -> ShellHandler {
		self.cmd.env(key, value);
		self
	}

	pub fn run(mut self, input: &str) -> io::Result<Session> {
		let mut child = self.cmd.spawn()?;
		{
			let mut stdin = child.stdin.take().expect("piped stdin");
			stdin.write_all(input.as_bytes())?;
		}
		let output = child.wait_with_output()?;
		Ok(Session {
			stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
			code: output.status.code(),
		})
	}
}

fn scratch_dir(name: &str) -> PathBuf {
	let dir = env::temp_dir().join(format!("smallsh_it_{}_{}", process::id(), name));
	let _ = fs::remove_dir_all(&dir);
	fs::create_dir_all(&dir).unwrap();
	fs::canonicalize(&dir).unwrap()
}

#[test]
fn prompt() {
	let session = ShellHandler::new().run("").unwrap();
	assert_eq!(session.stdout, ": ");
	assert_eq!(session.code, Some(0));
}

#[test]
fn blank_and_comment_lines_reprompt() {
	let session = ShellHandler::new().run("\n# echo hidden\necho shown\n").unwrap();
	assert_eq!(session.stdout, ": : : shown\n: ");
}

#[test]
fn status_after_failure_is_stable() {
	let session = ShellHandler::new().run("false\nstatus\nstatus\n").unwrap();
	assert_eq!(session.stdout, ": : Exit Status: 1\n: Exit Status: 1\n: ");
}

#[test]
fn status_starts_successful() {
	let session = ShellHandler::new().run("status\n").unwrap();
	assert_eq!(session.stdout, ": Exit Status: 0\n: ");
}

#[test]
fn exit_ends_session() {
	let session = ShellHandler::new().run("exit\necho after\n").unwrap();
	assert_eq!(session.stdout, ": ");
	assert_eq!(session.code, Some(0));
}

#[test]
fn cd_without_argument_goes_home() {
	let home = scratch_dir("home");
	let other = scratch_dir("other");
	let input = format!("cd {}\npwd\ncd\npwd\n", other.display());
	let session = ShellHandler::new().env("HOME", &home).run(&input).unwrap();
	assert_eq!(session.stdout, format!(": : {}\n: : {}\n: ", other.display(), home.display()));
	fs::remove_dir_all(&home).unwrap();
	fs::remove_dir_all(&other).unwrap();
}

#[test]
fn cd_failure_keeps_directory() {
	let start = scratch_dir("start");
	let input = format!("cd {}\ncd {}/missing\nstatus\npwd\n", start.display(), start.display());
	let session = ShellHandler::new().run(&input).unwrap();
	assert_eq!(session.stdout, format!(
		": : cd: {}/missing: directory not found\n: Exit Status: 1\n: {}\n: ",
		start.display(), start.display()));
	fs::remove_dir_all(&start).unwrap();
}

#[test]
fn output_then_input_redirect() {
	let dir = scratch_dir("redirect");
	let file = dir.join("words.txt");
	let input = format!("echo one two three > {}\nwc -w < {}\n", file.display(), file.display());
	let session = ShellHandler::new().run(&input).unwrap();
	assert_eq!(session.stdout.replace(' ', ""), "::3\n:");
	fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn missing_input_is_reported() {
	let session = ShellHandler::new().run("cat < /definitely/not/here.txt\nstatus\n").unwrap();
	assert_eq!(session.stdout,
		": cannot open \"/definitely/not/here.txt\" for input\n: Exit Status: 1\n: ");
}

#[test]
fn background_job_is_reported_when_done() {
	let session = ShellHandler::new().run("sleep 0 &\nsleep 1\n").unwrap();
	let stdout = session.stdout;
	let pid: String = stdout
		.split("Background Process ID: ").nth(1).expect("pid line")
		.chars().take_while(|c| c.is_ascii_digit()).collect();
	assert!(!pid.is_empty());
	assert!(stdout.contains(&format!("BG Process ID {} Done\nExit Status: 0\n", pid)), "{}", stdout);
}

#[test]
fn syntax_error_does_not_stop_the_shell() {
	let session = ShellHandler::new().run("echo >\necho still here\n").unwrap();
	assert_eq!(session.stdout, ": syntax error: '>' needs a file name\n: still here\n: ");
}

#[test]
fn sigint_at_prompt_prints_notice() {
	let mut child = process::Command::new(env!("CARGO_BIN_EXE_smallsh"))
		.stdin(process::Stdio::piped())
		.stdout(process::Stdio::piped())
		.stderr(process::Stdio::null())
		.env_remove("SMALLSH_LOG")
		.spawn().unwrap();

	// The handler is installed before the first prompt is written.
	let mut prompt = [0u8; 2];
	child.stdout.as_mut().unwrap().read_exact(&mut prompt).unwrap();
	assert_eq!(&prompt, b": ");
	std::thread::sleep(std::time::Duration::from_millis(200));
	signal::kill(Pid::from_raw(child.id() as i32), Signal::SIGINT).unwrap();
	std::thread::sleep(std::time::Duration::from_millis(200));

	child.stdin.take().unwrap().write_all(b"status\nexit\n").unwrap();
	let output = child.wait_with_output().unwrap();
	assert_eq!(String::from_utf8_lossy(&output.stdout),
		"\nInterrupted. Type \"exit\" to leave.\n: Exit Status: 0\n: ");
	assert_eq!(output.status.code(), Some(0));
}
