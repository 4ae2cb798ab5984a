use std::{error,fmt};

use crate::types::*;

#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
	MissingTarget(RedirectType),
	MissingCommand,
}

impl fmt::Display for ParseError {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match *self {
			ParseError::MissingTarget(typ) => write!(f, "syntax error: '{}' needs a file name", typ.operator()),
			ParseError::MissingCommand => write!(f, "syntax error: no command to run"),
		}
	}
}

impl error::Error for ParseError {}

pub type ParseResult<T> = Result<T, ParseError>;

/// Whitespace-delimited words of one input line.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
	line: &'a str,
	i: usize,
}

impl<'a> Tokens<'a> {
	fn proceed_while<F>(&mut self, f: F) where F: Fn(u8) -> bool {
		while let Some(&c) = self.line.as_bytes().get(self.i) {
			if !f(c) { break; }
			self.i += 1;
		}
	}

	fn is_whitespace(c: u8) -> bool {
		match c {
			b' ' | b'\t' | b'\r' | b'\n' => true,
			_ => false,
		}
	}

	fn skip_whitespaces(&mut self) {
		self.proceed_while(Tokens::is_whitespace);
	}

	fn read_word(&mut self) -> &'a str {
		let orig = self.i;
		self.proceed_while(|c| !Tokens::is_whitespace(c));
		&self.line[orig .. self.i]
	}
}

impl<'a> Iterator for Tokens<'a> {
	type Item = &'a str;

	fn next(&mut self) -> Option<&'a str> {
		self.skip_whitespaces();
		let word = self.read_word();
		if word.is_empty() { None } else { Some(word) }
	}
}

pub fn tokenize(line: &str) -> Tokens {
	Tokens { line: line, i: 0 }
}

fn redirect_type(token: &str) -> Option<RedirectType> {
	match token {
		"<" => Some(RedirectType::Input),
		">" => Some(RedirectType::Output),
		_ => None,
	}
}

/// Classifies tokens into an invocation. Later redirections overwrite earlier
/// ones whatever their direction.
pub fn build<'a, I>(tokens: I) -> ParseResult<Invocation> where I: IntoIterator<Item = &'a str> {
	let mut words: Vec<&'a str> = tokens.into_iter().collect();

	let is_background = words.last() == Some(&"&");
	if is_background {
		words.pop();
	}

	let mut arguments: Vec<String> = Vec::with_capacity(words.len());
	let mut redirect: Option<Redirect> = None;
	let mut words = words.into_iter();
	while let Some(word) = words.next() {
		match redirect_type(word) {
			Some(typ) => {
				let target = match words.next() {
					Some(t) => t,
					None => { return Err(ParseError::MissingTarget(typ)); },
				};
				redirect = Some(Redirect { target: target.to_owned(), typ: typ });
			},
			None => arguments.push(word.to_owned()),
		}
	}

	if arguments.is_empty() {
		return Err(ParseError::MissingCommand);
	}
	Ok(Invocation { arguments: arguments, redirect: redirect, is_background: is_background })
}

/// `Ok(None)` for blank and comment lines, which are never dispatched.
pub fn parse(line: &str) -> ParseResult<Option<Invocation>> {
	match tokenize(line).next() {
		None => Ok(None),
		Some(first) if first.starts_with('#') => Ok(None),
		Some(_) => build(tokenize(line)).map(Some),
	}
}
