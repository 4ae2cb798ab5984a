use nix::errno::Errno;
use nix::sys::wait::{self,WaitPidFlag,WaitStatus};
use nix::unistd::Pid;
use tracing::{debug,warn};

use crate::types::Status;

pub trait WaitStatusExt {
	/// `None` while the process has not terminated.
	fn status(self) -> Option<Status>;
}

impl WaitStatusExt for WaitStatus {
	fn status(self) -> Option<Status> {
		match self {
			WaitStatus::Exited(_, code) => Some(Status::Exited(code)),
			WaitStatus::Signaled(_, signal, _) => Some(Status::Signaled(signal as i32)),
			_ => None,
		}
	}
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Job {
	pub pid: Pid,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Completion {
	pub pid: Pid,
	pub status: Status,
}

/// Outstanding background processes in launch order.
#[derive(Debug, Default)]
pub struct JobSet {
	jobs: Vec<Job>,
}

impl JobSet {
	pub fn new() -> JobSet {
		JobSet { jobs: vec![] }
	}

	/// Returns false if `pid` is already tracked.
	pub fn push(&mut self, pid: Pid) -> bool {
		if self.contains(pid) {
			return false;
		}
		self.jobs.push(Job { pid: pid });
		true
	}

	pub fn contains(&self, pid: Pid) -> bool {
		self.jobs.iter().any(|job| job.pid == pid)
	}

	pub fn len(&self) -> usize {
		self.jobs.len()
	}

	pub fn is_empty(&self) -> bool {
		self.jobs.is_empty()
	}

	pub fn pids(&self) -> Vec<Pid> {
		self.jobs.iter().map(|job| job.pid).collect()
	}

	/// Polls every job without blocking and drops the finished ones, keeping
	/// the survivors in order.
	pub fn poll(&mut self) -> Vec<Completion> {
		let mut completions = vec![];
		self.jobs.retain(|job| {
			match wait::waitpid(job.pid, Some(WaitPidFlag::WNOHANG)) {
				Ok(ws) => match ws.status() {
					Some(status) => {
						debug!(pid = job.pid.as_raw(), ?status, "background job finished");
						completions.push(Completion { pid: job.pid, status: status });
						false
					},
					None => true,
				},
				Err(Errno::ECHILD) => {
					warn!(pid = job.pid.as_raw(), "background job is no longer a child; dropping it");
					false
				},
				Err(e) => {
					warn!(pid = job.pid.as_raw(), error = %e, "polling background job failed");
					true
				},
			}
		});
		completions
	}
}
