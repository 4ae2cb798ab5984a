//! Command dispatch and process-lifecycle engine of a small interactive shell.
//!
//! A line is split by [`parser`] into an [`types::Invocation`], then
//! [`eval::eval`] runs it as a built-in or forks an external program in the
//! foreground, with a redirected stdin/stdout, or as a background job. Finished
//! background jobs are reported by [`global::State::reap`] once per prompt.

pub mod builtin;
pub mod eval;
pub mod global;
pub mod input;
pub mod job;
pub mod parser;
pub mod signal;
pub mod types;
