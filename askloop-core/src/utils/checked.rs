//! # Validated Read
//!
//! [`ValidatedRead`] prompts for a value, reads it from an [`InputSource`],
//! runs it through a chain of [`Validator`]s and keeps asking until the value
//! is accepted or the attempt budget runs out.
//!
//! Two kinds of failure are *soft*: the reader could not parse the input
//! (format error) or a validator rejected the parsed value. Both write a
//! diagnostic to the output sink, spend one attempt and go through the same
//! recovery: clear the source and, with `flush_on_error`, skip the rest of the
//! offending line. Running out of attempts or input ends the loop; the caller
//! sees it in the source state and in the returned [`ReadError`].
//!
//! ```rust
//! use askloop_core::utils::{prompt, Input, InputSource};
//!
//! let mut input = Input::new("abc\n-4\n7\n".as_bytes());
//! let mut out = Vec::new();
//! let mut threads = 0u8;
//!
//! let attempts = prompt("Threads: ", &mut threads)
//!     .validate(|n: &u8| *n > 0, "Must be positive")
//!     .output(&mut out)
//!     .execute(&mut input)
//!     .unwrap();
//!
//! assert_eq!(attempts, 3);
//! assert_eq!(threads, 7);
//! assert!(!input.fail());
//! ```
use std::io::{self, Write};
use thiserror::Error;

use crate::utils::config::{DiagnosticMode, FailMark, ReadConfig, Retries};
use crate::utils::sanitize::{Rule, Validator};
use crate::utils::source::InputSource;

/// Number of attempts a read took.
pub type Attempts = u32;

/// How a read ended without an accepted value.
///
/// Mirrors the final source state: in both cases the source is left failed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ReadError {
    #[error("no acceptable value after {attempts} attempt(s)")]
    RetriesExhausted { attempts: Attempts },
    #[error("input ended after {attempts} attempt(s)")]
    EndOfInput { attempts: Attempts },
}

impl ReadError {
    pub fn attempts(&self) -> Attempts {
        match self {
            ReadError::RetriesExhausted { attempts } | ReadError::EndOfInput { attempts } => {
                *attempts
            }
        }
    }
}

/// One configured read of a `T` into a caller-owned destination.
///
/// - `P`: the prompter, called with the output sink before every attempt.
/// - `R`: the reader, which parses one value into the destination and returns
///   whether the source is still usable.
///
/// Built with [`ValidatedRead::new`] (or the [`prompt`](crate::utils::prompt) /
/// [`read_line`](crate::utils::read_line) helpers), configured fluently and
/// consumed by [`execute`](ValidatedRead::execute).
pub struct ValidatedRead<'a, T, P, R> {
    destination: &'a mut T,
    prompter: P,
    reader: R,
    validators: Vec<Box<dyn Validator<T> + 'a>>,
    retries: Retries,
    flush_on_error: bool,
    flush_limit: usize,
    format_error: String,
    out: Box<dyn Write + 'a>,
    diagnostics: DiagnosticMode,
    fail_mark: FailMark,
}

impl<'a, T, P, R> ValidatedRead<'a, T, P, R>
where
    P: FnMut(&mut dyn Write),
    R: FnMut(&mut dyn InputSource, &mut T) -> bool,
{
    pub fn new(prompter: P, destination: &'a mut T, reader: R) -> Self {
        let defaults = ReadConfig::default();
        ValidatedRead {
            destination,
            prompter,
            reader,
            validators: Vec::new(),
            retries: defaults.retries,
            flush_on_error: defaults.flush_on_error,
            flush_limit: defaults.flush_limit,
            format_error: defaults.format_error,
            out: Box::new(io::stdout()),
            diagnostics: defaults.diagnostics,
            fail_mark: defaults.fail_mark,
        }
    }

    /// Runs the prompt/read/validate loop against `source`.
    ///
    /// Returns the number of attempts on success. On failure the source's fail
    /// flag is set and the destination holds whatever the last attempt left in it.
    pub fn execute<S: InputSource>(mut self, source: &mut S) -> Result<Attempts, ReadError> {
        let mut attempts: Attempts = 0;

        while self.retries.remaining() {
            self.retries.consume();
            attempts += 1;
            log::debug!("attempt {attempts}: prompting ({:?} left)", self.retries);

            (self.prompter)(&mut *self.out);
            if let Err(e) = self.out.flush() {
                log::warn!("failed to flush prompt: {e}");
            }

            if (self.reader)(source, &mut *self.destination) {
                if self.run_validators(source) {
                    log::debug!("attempt {attempts}: value accepted");
                    return Ok(attempts);
                }
                log::debug!("attempt {attempts}: value rejected");
            } else {
                log::debug!("attempt {attempts}: format error");
                if !source.fail() {
                    source.set_fail();
                }
                emit(&mut *self.out, &self.format_error);
            }

            if self.retries.remaining() {
                if source.eof() {
                    log::debug!("attempt {attempts}: end of input, giving up");
                    break;
                }
                source.clear();
                if self.flush_on_error {
                    source.ignore_line(self.flush_limit);
                }
            }
        }

        source.set_fail();
        let err = if source.eof() {
            ReadError::EndOfInput { attempts }
        } else {
            ReadError::RetriesExhausted { attempts }
        };
        log::debug!("read failed: {err}");
        Err(err)
    }

    /// Checks the destination against every validator in insertion order.
    ///
    /// Each failure's message is written before moving on; with
    /// [`DiagnosticMode::Single`] evaluation stops at the first one.
    fn run_validators<S: InputSource>(&mut self, source: &mut S) -> bool {
        let mut ok = true;

        for validator in &self.validators {
            let Some(msg) = validator.check(&*self.destination) else {
                continue;
            };

            if ok && self.fail_mark == FailMark::BeforeDiagnostics {
                source.set_fail();
            }
            emit(&mut *self.out, &msg);
            ok = false;

            if self.diagnostics == DiagnosticMode::Single {
                break;
            }
        }

        if !ok && self.fail_mark == FailMark::AfterDiagnostics {
            source.set_fail();
        }
        ok
    }
}

impl<'a, T, P, R> ValidatedRead<'a, T, P, R> {
    /// Skip the rest of the line after a failed attempt.
    pub fn flush_on_error(mut self, flush: bool) -> Self {
        self.flush_on_error = flush;
        self
    }

    /// Maximum number of bytes skipped when flushing a line.
    pub fn flush_limit(mut self, bound: usize) -> Self {
        self.flush_limit = bound;
        self
    }

    /// Allows at most `n` attempts. Replaces any earlier budget.
    pub fn retries(mut self, n: u32) -> Self {
        self.retries = Retries::Limited(n);
        self
    }

    /// Keeps asking until a value is accepted or the input ends.
    pub fn unlimited(mut self) -> Self {
        self.retries = Retries::Unlimited;
        self
    }

    /// Message written when the reader cannot parse the input.
    pub fn format_error(mut self, msg: impl Into<String>) -> Self {
        self.format_error = msg.into();
        self
    }

    /// Sends prompts and diagnostics to `sink` instead of stdout.
    pub fn output<W: Write + 'a>(mut self, sink: W) -> Self {
        self.out = Box::new(sink);
        self
    }

    pub fn multiple_diagnostics(mut self) -> Self {
        self.diagnostics = DiagnosticMode::Multiple;
        self
    }

    pub fn single_diagnostic(mut self) -> Self {
        self.diagnostics = DiagnosticMode::Single;
        self
    }

    pub fn fail_mark(mut self, mark: FailMark) -> Self {
        self.fail_mark = mark;
        self
    }

    /// Applies every field of `config`. Later setters still override it.
    pub fn configure(mut self, config: &ReadConfig) -> Self {
        self.flush_on_error = config.flush_on_error;
        self.flush_limit = config.flush_limit;
        self.retries = config.retries;
        self.format_error = config.format_error.clone();
        self.diagnostics = config.diagnostics;
        self.fail_mark = config.fail_mark;
        self
    }

    /// Appends a validator that fails with `msg` whenever `check` returns `false`.
    pub fn validate<F>(mut self, check: F, msg: impl Into<String>) -> Self
    where
        F: Fn(&T) -> bool + 'a,
    {
        let msg = msg.into();
        self.validators
            .push(Box::new(move |v: &T| if check(v) { None } else { Some(msg.clone()) }));
        self
    }

    /// Appends any [`Validator`], e.g. one producing a message from the value.
    pub fn validate_with<V>(mut self, validator: V) -> Self
    where
        V: Validator<T> + 'a,
    {
        self.validators.push(Box::new(validator));
        self
    }
}

impl<'a, P, R> ValidatedRead<'a, String, P, R> {
    /// Appends a built-in string [`Rule`].
    pub fn rule(mut self, rule: Rule) -> Self {
        self.validators.push(Box::new(rule));
        self
    }
}

/// Writes one diagnostic line. Sink errors are logged, never propagated.
fn emit(out: &mut dyn Write, msg: &str) {
    if let Err(e) = writeln!(out, "{msg}").and_then(|()| out.flush()) {
        log::warn!("failed to write diagnostic {msg:?}: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::source::Input;
    use crate::utils::terminal::{parse_line, parse_token, prompt, read_line};
    use std::cell::{Cell, RefCell};
    use std::io::Cursor;
    use std::rc::Rc;

    fn input(text: &str) -> Input<Cursor<Vec<u8>>> {
        Input::new(Cursor::new(text.as_bytes().to_vec()))
    }

    fn lines(out: &[u8]) -> Vec<String> {
        String::from_utf8_lossy(out).lines().map(str::to_string).collect()
    }

    #[test]
    fn test_valid_first_attempt() {
        let prompts = Cell::new(0);
        let mut value = 0i32;
        let mut out = Vec::new();
        let mut src = input("42\n");

        let res = ValidatedRead::new(
            |_: &mut dyn Write| prompts.set(prompts.get() + 1),
            &mut value,
            parse_token::<i32>,
        )
        .validate(|v: &i32| *v > 0, "must be positive")
        .output(&mut out)
        .execute(&mut src);

        assert_eq!(res, Ok(1));
        assert_eq!(value, 42);
        assert_eq!(prompts.get(), 1);
        assert!(out.is_empty());
        assert!(!src.fail());
    }

    #[test]
    fn test_malformed_tokens_then_valid() {
        let prompts = Cell::new(0);
        let reads = Cell::new(0);
        let mut value = 0i32;
        let mut out = Vec::new();
        let mut src = input("x\ny\nz\n5\n");

        let res = ValidatedRead::new(
            |_: &mut dyn Write| prompts.set(prompts.get() + 1),
            &mut value,
            |s: &mut dyn InputSource, v: &mut i32| {
                reads.set(reads.get() + 1);
                parse_token(s, v)
            },
        )
        .output(&mut out)
        .execute(&mut src);

        assert_eq!(res, Ok(4));
        assert_eq!(reads.get(), 4);
        assert_eq!(prompts.get(), 4);
        assert_eq!(lines(&out), vec!["Invalid input format"; 3]);
        assert_eq!(value, 5);
        assert!(!src.fail());
    }

    #[test]
    fn test_limited_retries_all_invalid() {
        let prompts = Cell::new(0);
        let reads = Cell::new(0);
        let mut value = 0i32;
        let mut out = Vec::new();
        let mut src = input("1\n2\n3\n4\n");

        let res = ValidatedRead::new(
            |_: &mut dyn Write| prompts.set(prompts.get() + 1),
            &mut value,
            |s: &mut dyn InputSource, v: &mut i32| {
                reads.set(reads.get() + 1);
                parse_token(s, v)
            },
        )
        .retries(3)
        .validate(|v: &i32| *v > 10, "too small")
        .output(&mut out)
        .execute(&mut src);

        assert_eq!(res, Err(ReadError::RetriesExhausted { attempts: 3 }));
        assert_eq!(prompts.get(), 3);
        assert_eq!(reads.get(), 3);
        assert_eq!(value, 3);
        assert_eq!(lines(&out), vec!["too small"; 3]);
        assert!(src.fail());
    }

    #[test]
    fn test_validator_order_multiple_diagnostics() {
        let mut value = 0i32;
        let mut out = Vec::new();

        let res = ValidatedRead::new(|_: &mut dyn Write| {}, &mut value, parse_token::<i32>)
            .retries(1)
            .validate(|_: &i32| false, "A")
            .validate(|_: &i32| true, "B")
            .validate(|_: &i32| false, "C")
            .output(&mut out)
            .execute(&mut input("7\n"));

        assert!(res.is_err());
        assert_eq!(lines(&out), vec!["A", "C"]);
    }

    #[test]
    fn test_validator_order_single_diagnostic() {
        let mut value = 0i32;
        let mut out = Vec::new();

        let res = ValidatedRead::new(|_: &mut dyn Write| {}, &mut value, parse_token::<i32>)
            .retries(1)
            .single_diagnostic()
            .validate(|_: &i32| false, "A")
            .validate(|_: &i32| true, "B")
            .validate(|_: &i32| false, "C")
            .output(&mut out)
            .execute(&mut input("7\n"));

        assert!(res.is_err());
        assert_eq!(lines(&out), vec!["A"]);
    }

    #[test]
    fn test_format_error_skips_validators() {
        let checked = Cell::new(false);
        let mut value = 0i32;
        let mut out = Vec::new();

        let res = ValidatedRead::new(|_: &mut dyn Write| {}, &mut value, parse_token::<i32>)
            .retries(1)
            .format_error("numbers only")
            .validate(
                |_: &i32| {
                    checked.set(true);
                    true
                },
                "never",
            )
            .output(&mut out)
            .execute(&mut input("abc\n"));

        assert_eq!(res, Err(ReadError::RetriesExhausted { attempts: 1 }));
        assert!(!checked.get());
        assert_eq!(lines(&out), vec!["numbers only"]);
    }

    #[test]
    fn test_end_of_input_stops_before_next_prompt() {
        let prompts = Cell::new(0);
        let mut value = 0i32;
        let mut out = Vec::new();
        let mut src = input("nope");

        let res = ValidatedRead::new(
            |_: &mut dyn Write| prompts.set(prompts.get() + 1),
            &mut value,
            parse_token::<i32>,
        )
        .retries(10)
        .output(&mut out)
        .execute(&mut src);

        assert_eq!(res, Err(ReadError::EndOfInput { attempts: 1 }));
        assert_eq!(prompts.get(), 1);
        assert!(src.fail());
        assert!(src.eof());
    }

    #[test]
    fn test_end_of_input_with_unlimited_retries() {
        let mut value = 0i32;
        let mut out = Vec::new();

        let res = ValidatedRead::new(|_: &mut dyn Write| {}, &mut value, parse_token::<i32>)
            .output(&mut out)
            .execute(&mut input("a\nb\n"));

        // the third attempt finds no token at all
        assert_eq!(res, Err(ReadError::EndOfInput { attempts: 3 }));
        assert_eq!(lines(&out).len(), 3);
    }

    #[test]
    fn test_retries_setter_overwrites() {
        let prompts = Cell::new(0);
        let mut value = 0i32;
        let mut out = Vec::new();

        let res = ValidatedRead::new(
            |_: &mut dyn Write| prompts.set(prompts.get() + 1),
            &mut value,
            parse_token::<i32>,
        )
        .retries(3)
        .retries(5)
        .validate(|_: &i32| false, "no")
        .output(&mut out)
        .execute(&mut input("1\n2\n3\n4\n5\n6\n7\n8\n9\n"));

        assert_eq!(res, Err(ReadError::RetriesExhausted { attempts: 5 }));
        assert_eq!(prompts.get(), 5);
    }

    #[test]
    fn test_zero_retries_never_prompts() {
        let prompts = Cell::new(0);
        let mut value = 9i32;
        let mut src = input("1\n");

        let res = ValidatedRead::new(
            |_: &mut dyn Write| prompts.set(prompts.get() + 1),
            &mut value,
            parse_token::<i32>,
        )
        .retries(0)
        .output(Vec::new())
        .execute(&mut src);

        assert_eq!(res, Err(ReadError::RetriesExhausted { attempts: 0 }));
        assert_eq!(prompts.get(), 0);
        assert_eq!(value, 9);
        assert!(src.fail());
    }

    #[test]
    fn test_flush_on_error_discards_rest_of_line() {
        let mut value = 0i32;
        let mut out = Vec::new();

        let res = ValidatedRead::new(|_: &mut dyn Write| {}, &mut value, parse_token::<i32>)
            .output(&mut out)
            .execute(&mut input("bad 99\n7\n"));

        assert_eq!(res, Ok(2));
        assert_eq!(value, 7);
    }

    #[test]
    fn test_without_flush_retry_reads_same_line() {
        let mut value = 0i32;
        let mut out = Vec::new();

        let res = ValidatedRead::new(|_: &mut dyn Write| {}, &mut value, parse_token::<i32>)
            .flush_on_error(false)
            .validate(|v: &i32| *v > 50, "too small")
            .output(&mut out)
            .execute(&mut input("3 99\n7\n"));

        assert_eq!(res, Ok(2));
        assert_eq!(value, 99);
        assert_eq!(lines(&out), vec!["too small"]);
    }

    #[test]
    fn test_prompt_is_written_to_sink() {
        let mut value = String::new();
        let mut out = Vec::new();

        let res = read_line("Name: ", &mut value)
            .output(&mut out)
            .execute(&mut input("Ada\n"));

        assert_eq!(res, Ok(1));
        assert_eq!(String::from_utf8(out).unwrap(), "Name: ");
    }

    #[test]
    fn test_lastname_scenario_single_diagnostic() {
        let mut lname = String::new();
        let mut out = Vec::new();
        let mut src = input("Bob 2\n\nBob  Jones\nBobby\n");

        let res = read_line("Input customer's lastname: ", &mut lname)
            .single_diagnostic()
            .rule(Rule::AlphaOnly)
            .rule(Rule::NonEmpty)
            .rule(Rule::NoDoubleSpace)
            .output(&mut out)
            .execute(&mut src);

        assert_eq!(res, Ok(4));
        assert_eq!(lname, "Bobby");
        assert!(!src.fail());

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("Input customer's lastname: ").count(), 4);
        assert_eq!(text.lines().count(), 4);
        assert!(text.contains("You can only input alpha here!"));
        assert!(text.contains("The value can not be empty, try again!"));
    }

    #[test]
    fn test_lastname_scenario_multiple_diagnostics() {
        let mut lname = String::new();
        let mut out = Vec::new();

        let res = ValidatedRead::new(|_: &mut dyn Write| {}, &mut lname, parse_line)
            .flush_on_error(false)
            .rule(Rule::AlphaOnly)
            .rule(Rule::NonEmpty)
            .rule(Rule::NoDoubleSpace)
            .output(&mut out)
            .execute(&mut input("Bob 2\n\nBob  Jones\nBobby\n"));

        assert_eq!(res, Ok(4));
        assert_eq!(
            lines(&out),
            vec![
                "You can only input alpha here!",
                "The value can not be empty, try again!",
                "You can only input alpha here!",
                "Cannot have spaces there, try again!",
            ]
        );
    }

    /// Source wrapper that records `set_fail` calls into a shared event log.
    struct Recording<S> {
        inner: S,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl<S: InputSource> InputSource for Recording<S> {
        fn read_token(&mut self) -> Option<String> {
            self.inner.read_token()
        }
        fn read_line(&mut self) -> Option<String> {
            self.inner.read_line()
        }
        fn fail(&self) -> bool {
            self.inner.fail()
        }
        fn eof(&self) -> bool {
            self.inner.eof()
        }
        fn set_fail(&mut self) {
            self.log.borrow_mut().push("set_fail".to_string());
            self.inner.set_fail();
        }
        fn clear(&mut self) {
            self.inner.clear();
        }
        fn ignore_line(&mut self, bound: usize) {
            self.inner.ignore_line(bound);
        }
    }

    struct SharedSink(Rc<RefCell<Vec<String>>>);

    impl Write for SharedSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let text = String::from_utf8_lossy(buf).trim_end().to_string();
            if !text.is_empty() {
                self.0.borrow_mut().push(text);
            }
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn fail_mark_events(mark: FailMark) -> Vec<String> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut src = Recording {
            inner: input("1\n"),
            log: Rc::clone(&log),
        };
        let mut value = 0i32;

        let res = ValidatedRead::new(|_: &mut dyn Write| {}, &mut value, parse_token::<i32>)
            .retries(1)
            .fail_mark(mark)
            .validate(|_: &i32| false, "first")
            .validate(|_: &i32| false, "second")
            .output(SharedSink(Rc::clone(&log)))
            .execute(&mut src);
        assert!(res.is_err());

        let events = log.borrow().clone();
        events
    }

    #[test]
    fn test_fail_mark_after_diagnostics() {
        let events = fail_mark_events(FailMark::AfterDiagnostics);
        assert_eq!(events[..3], ["first", "second", "set_fail"]);
    }

    #[test]
    fn test_fail_mark_before_diagnostics() {
        let events = fail_mark_events(FailMark::BeforeDiagnostics);
        assert_eq!(events[..3], ["set_fail", "first", "second"]);
    }

    #[test]
    fn test_configure_then_override() {
        let config = ReadConfig {
            retries: Retries::Limited(2),
            format_error: "bad number".to_string(),
            ..ReadConfig::default()
        };
        let mut value = 0i32;
        let mut out = Vec::new();

        let res = ValidatedRead::new(|_: &mut dyn Write| {}, &mut value, parse_token::<i32>)
            .configure(&config)
            .retries(1)
            .output(&mut out)
            .execute(&mut input("x\ny\n"));

        assert_eq!(res, Err(ReadError::RetriesExhausted { attempts: 1 }));
        assert_eq!(lines(&out), vec!["bad number"]);
    }

    #[test]
    fn test_validate_with_message_from_value() {
        let mut value = 0u32;
        let mut out = Vec::new();

        let res = ValidatedRead::new(|_: &mut dyn Write| {}, &mut value, parse_token::<u32>)
            .validate_with(|v: &u32| (*v % 2 == 1).then(|| format!("{v} is odd")))
            .output(&mut out)
            .execute(&mut input("3\n4\n"));

        assert_eq!(res, Ok(2));
        assert_eq!(lines(&out), vec!["3 is odd"]);
    }

    #[test]
    fn test_dead_source_ends_unlimited_read() {
        struct Unplugged;
        impl io::Read for Unplugged {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::other("unplugged"))
            }
        }

        let prompts = Cell::new(0);
        let mut value = 0i32;
        let mut out = Vec::new();
        let mut src = Input::new(io::BufReader::new(Unplugged));

        let res = ValidatedRead::new(
            |_: &mut dyn Write| prompts.set(prompts.get() + 1),
            &mut value,
            parse_token::<i32>,
        )
        .output(&mut out)
        .execute(&mut src);

        assert_eq!(res, Err(ReadError::EndOfInput { attempts: 1 }));
        assert_eq!(prompts.get(), 1);
        assert_eq!(lines(&out), vec!["Invalid input format"]);
        assert!(src.fail());
    }

    #[test]
    fn test_failing_sink_does_not_abort_read() {
        struct Full;
        impl Write for Full {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::other("disk full"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Err(io::Error::other("disk full"))
            }
        }

        let mut value = 0i32;
        let res = prompt("> ", &mut value)
            .output(Full)
            .execute(&mut input("x\n8\n"));

        assert_eq!(res, Ok(2));
        assert_eq!(value, 8);
    }
}
