use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectType { Input, Output }

impl RedirectType {
	pub fn operator(self) -> &'static str {
		match self {
			RedirectType::Input => "<",
			RedirectType::Output => ">",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
	pub target: String,
	pub typ: RedirectType,
}

/// One parsed command line. `arguments` is never empty and holds neither the
/// redirection operators and their targets nor the trailing `&`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
	pub arguments: Vec<String>,
	pub redirect: Option<Redirect>,
	pub is_background: bool,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Mode<'a> {
	Foreground,
	InputRedirect(&'a str),
	OutputRedirect(&'a str),
	Background,
}

impl Invocation {
	pub fn name(&self) -> &str {
		&self.arguments[0]
	}

	/// Background wins over any parsed redirection.
	pub fn mode(&self) -> Mode {
		if self.is_background {
			return Mode::Background;
		}
		match self.redirect {
			None => Mode::Foreground,
			Some(Redirect { ref target, typ: RedirectType::Input }) => Mode::InputRedirect(target),
			Some(Redirect { ref target, typ: RedirectType::Output }) => Mode::OutputRedirect(target),
		}
	}
}

/// Outcome of the last foreground command or reaped background job.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Status {
	Exited(i32),
	Signaled(i32),
}

impl Status {
	pub const SUCCESS: Status = Status::Exited(0);
	pub const FAILURE: Status = Status::Exited(1);

	pub fn is_success(self) -> bool {
		self == Status::SUCCESS
	}
}

impl Default for Status {
	fn default() -> Status {
		Status::SUCCESS
	}
}

impl fmt::Display for Status {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match *self {
			Status::Exited(0) => write!(f, "Exit Status: 0"),
			Status::Exited(_) => write!(f, "Exit Status: 1"),
			Status::Signaled(signo) => write!(f, "Killed by signal: {}", signo),
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use pretty_assertions::assert_eq;

	fn invocation(redirect: Option<Redirect>, is_background: bool) -> Invocation {
		Invocation { arguments: vec!["cat".to_owned()], redirect: redirect, is_background: is_background }
	}

	#[test]
	fn status_normalises_exit_codes() {
		assert_eq!(Status::Exited(0).to_string(), "Exit Status: 0");
		assert_eq!(Status::Exited(1).to_string(), "Exit Status: 1");
		assert_eq!(Status::Exited(127).to_string(), "Exit Status: 1");
		assert_eq!(Status::Signaled(15).to_string(), "Killed by signal: 15");
	}

	#[test]
	fn mode_follows_redirect_and_background() {
		let input = Redirect { target: "in.txt".to_owned(), typ: RedirectType::Input };
		let output = Redirect { target: "out.txt".to_owned(), typ: RedirectType::Output };
		assert_eq!(invocation(None, false).mode(), Mode::Foreground);
		assert_eq!(invocation(Some(input.clone()), false).mode(), Mode::InputRedirect("in.txt"));
		assert_eq!(invocation(Some(output.clone()), false).mode(), Mode::OutputRedirect("out.txt"));
		assert_eq!(invocation(None, true).mode(), Mode::Background);
		assert_eq!(invocation(Some(output), true).mode(), Mode::Background);
	}
}
