use std::io::{self,ErrorKind,Read};

#[derive(Debug, PartialEq, Eq)]
pub enum Input {
	Line(String),
	/// The read was cut short by a signal; nothing was consumed.
	Interrupted,
	Eof,
}

/// Line reader that surfaces EINTR instead of retrying, unlike `BufRead::read_line`.
pub struct LineReader<R> {
	inner: R,
	buf: Vec<u8>,
	eof: bool,
}

const CHUNK: usize = 1024;

impl<R: Read> LineReader<R> {
	pub fn new(inner: R) -> LineReader<R> {
		LineReader { inner: inner, buf: vec![], eof: false }
	}

	fn take_line(&mut self, len: usize) -> Input {
		let rest = self.buf.split_off(len);
		let line = std::mem::replace(&mut self.buf, rest);
		Input::Line(String::from_utf8_lossy(&line).into_owned())
	}

	pub fn read_line(&mut self) -> io::Result<Input> {
		loop {
			if let Some(i) = self.buf.iter().position(|&c| c == b'\n') {
				return Ok(self.take_line(i + 1));
			}
			if self.eof {
				if self.buf.is_empty() {
					return Ok(Input::Eof);
				}
				let len = self.buf.len();
				return Ok(self.take_line(len));
			}
			let mut chunk = [0u8; CHUNK];
			match self.inner.read(&mut chunk) {
				Ok(0) => self.eof = true,
				Ok(n) => self.buf.extend_from_slice(&chunk[.. n]),
				Err(ref e) if e.kind() == ErrorKind::Interrupted => {
					self.buf.clear();
					return Ok(Input::Interrupted);
				},
				Err(e) => return Err(e),
			}
		}
	}
}
