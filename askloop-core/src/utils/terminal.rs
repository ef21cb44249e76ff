//! # Terminal Input Helper
//!
//! Ready-made prompters, readers and constructors for [`ValidatedRead`].
//!
//! - [`prompt`] reads one whitespace-delimited token and parses it with
//!   [`FromStr`]. Leftovers on the line are flushed after a failure.
//! - [`read_line`] reads a whole line. The line is consumed by the read
//!   itself, so nothing is flushed after a failure.
//! - [`Terminal::ask`] runs a line read against stdin/stdout and returns the
//!   trimmed answer.
//!
//! ## Usage
//!
//! ### Example 1: Number with a range
//! ```rust,no_run
//! use askloop_core::utils::{between, prompt, Input};
//!
//! let mut port = 0u16;
//! let mut stdin = Input::new(std::io::stdin().lock());
//!
//! if prompt("Port: ", &mut port)
//!     .validate_with(between(1u16, 1024))
//!     .retries(3)
//!     .execute(&mut stdin)
//!     .is_ok()
//! {
//!     println!("Scanning port {port}");
//! }
//! ```
//!
//! ### Example 2: Restricted string input
//! ```rust,no_run
//! use askloop_core::utils::{Rule, Terminal};
//!
//! let input = Terminal::ask(
//!     "Do you like Rust? Y/N ",
//!     &[Rule::MatchStrings(vec![
//!         String::from("Y"),
//!         String::from("N"),
//!         String::from("y"),
//!         String::from("n"),
//!     ])],
//! )
//! .expect("stdin closed");
//!
//! println!("The input: {}", input.answer);
//! ```
use std::fmt::Display;
use std::io::{self, Write};
use std::str::FromStr;

use crate::utils::checked::{ReadError, ValidatedRead};
use crate::utils::sanitize::Rule;
use crate::utils::source::{Input, InputSource};

/// Reads one token and parses it into `dest`.
///
/// A token that does not parse raises the source's fail flag; `dest` is only
/// written on success.
pub fn parse_token<T: FromStr>(source: &mut dyn InputSource, dest: &mut T) -> bool {
    if let Some(token) = source.read_token() {
        match token.parse() {
            Ok(value) => *dest = value,
            Err(_) => {
                log::debug!("token {token:?} does not parse");
                source.set_fail();
            }
        }
    }
    !source.fail()
}

/// Reads one line into `dest`.
pub fn parse_line(source: &mut dyn InputSource, dest: &mut String) -> bool {
    if let Some(line) = source.read_line() {
        *dest = line;
    }
    !source.fail()
}

/// A prompter that writes `msg` as-is.
pub fn prompt_text<M: Display>(msg: M) -> impl FnMut(&mut dyn Write) {
    move |out: &mut dyn Write| {
        if let Err(e) = write!(out, "{msg}") {
            log::warn!("failed to write prompt: {e}");
        }
    }
}

/// Asks for one whitespace-delimited value of type `T`.
pub fn prompt<'a, M, T>(
    msg: M,
    dest: &'a mut T,
) -> ValidatedRead<'a, T, impl FnMut(&mut dyn Write), impl FnMut(&mut dyn InputSource, &mut T) -> bool>
where
    M: Display,
    T: FromStr,
{
    ValidatedRead::new(prompt_text(msg), dest, parse_token::<T>)
}

/// Asks for a whole line.
pub fn read_line<'a, M>(
    msg: M,
    dest: &'a mut String,
) -> ValidatedRead<'a, String, impl FnMut(&mut dyn Write), impl FnMut(&mut dyn InputSource, &mut String) -> bool>
where
    M: Display,
{
    ValidatedRead::new(prompt_text(msg), dest, parse_line).flush_on_error(false)
}

/// The accepted answer of [`Terminal::ask`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Terminal {
    pub answer: String,
}

impl Terminal {
    /// Prints `question` and keeps reading lines from stdin until one passes
    /// every rule. Rules see the line with surrounding whitespace trimmed.
    pub fn ask(question: &str, rules: &[Rule]) -> Result<Terminal, ReadError> {
        let mut input = Input::new(io::stdin().lock());
        Terminal::ask_from(question, rules, &mut input, io::stdout())
    }

    /// [`Terminal::ask`] over any source and sink.
    pub fn ask_from<S, W>(
        question: &str,
        rules: &[Rule],
        source: &mut S,
        out: W,
    ) -> Result<Terminal, ReadError>
    where
        S: InputSource,
        W: Write,
    {
        let mut answer = String::new();
        let read = ValidatedRead::new(
            prompt_text(question),
            &mut answer,
            |src: &mut dyn InputSource, dest: &mut String| {
                let ok = parse_line(src, dest);
                *dest = dest.trim().to_string();
                ok
            },
        )
        .flush_on_error(false)
        .output(out);

        rules
            .iter()
            .cloned()
            .fold(read, |read, rule| read.rule(rule))
            .execute(source)?;

        Ok(Terminal { answer })
    }
}
