use std::io::{self,Write};

use crate::job;
use crate::types::Status;

/// Interpreter state threaded through every dispatch.
#[derive(Debug, Default)]
pub struct State {
	pub status: Status,
	pub job_set: job::JobSet,
}

impl State {
	pub fn new() -> State {
		State { status: Status::default(), job_set: job::JobSet::new() }
	}

	/// Reports finished background jobs in launch order; the last one becomes
	/// the recorded status.
	pub fn reap(&mut self, out: &mut dyn Write) -> io::Result<usize> {
		let completions = self.job_set.poll();
		for completion in &completions {
			writeln!(out, "BG Process ID {} Done", completion.pid)?;
			writeln!(out, "{}", completion.status)?;
			self.status = completion.status;
		}
		out.flush()?;
		Ok(completions.len())
	}
}
