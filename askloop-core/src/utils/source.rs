//! # Input Sources
//!
//! A validated read never talks to `stdin` directly. It drives an
//! [`InputSource`]: something that can hand out whitespace-delimited tokens or
//! whole lines and that remembers, like a classic input stream, whether the
//! last read *failed* and whether the end of the input was *reached*.
//!
//! [`Input`] is the implementation over any [`BufRead`], so the same loop works
//! against the locked terminal, a file or an in-memory buffer:
//!
//! ```rust
//! use askloop_core::utils::{Input, InputSource};
//!
//! let mut input = Input::new("42 rest\nnext line\n".as_bytes());
//!
//! assert_eq!(input.read_token().as_deref(), Some("42"));
//! assert_eq!(input.read_line().as_deref(), Some(" rest"));
//! assert_eq!(input.read_line().as_deref(), Some("next line"));
//! assert!(input.read_line().is_none());
//! assert!(input.fail() && input.eof());
//! ```
use std::io::{self, BufRead};

/// Default number of bytes discarded by [`InputSource::ignore_line`] during recovery.
pub const FLUSH_LIMIT: usize = 1024;

/// The capability set a validated read needs from its input.
///
/// Reads report failure through the source's own state instead of a
/// `Result`, so a caller can inspect the source after the whole read loop and
/// branch on it, regardless of how many attempts happened in between.
pub trait InputSource {
    /// Skips leading whitespace and reads the next whitespace-delimited token.
    ///
    /// Sets the fail flag and returns `None` if no token could be read. Sets
    /// the eof flag if the input ended while scanning.
    fn read_token(&mut self) -> Option<String>;

    /// Reads everything up to the next `\n`, consuming but not returning it.
    ///
    /// Sets the eof flag if the input ended before a newline, and the fail
    /// flag only if nothing at all could be extracted.
    fn read_line(&mut self) -> Option<String>;

    /// `true` if the last read failed or the underlying reader errored.
    fn fail(&self) -> bool;

    /// `true` once the end of the input has been observed.
    fn eof(&self) -> bool;

    /// Raises the fail flag.
    fn set_fail(&mut self);

    /// Resets every state flag so the source can be read again.
    fn clear(&mut self);

    /// Discards up to `bound` bytes, stopping right after the next `\n`.
    fn ignore_line(&mut self, bound: usize);

    /// Neither failed nor at the end of the input.
    fn good(&self) -> bool {
        !self.fail() && !self.eof()
    }
}

/// Stream state bits kept by [`Input`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct State {
    fail: bool,
    eof: bool,
    bad: bool,
}

/// An [`InputSource`] over any buffered reader.
#[derive(Debug)]
pub struct Input<R> {
    inner: R,
    state: State,
}

impl<R: BufRead> Input<R> {
    pub fn new(inner: R) -> Self {
        Input {
            inner,
            state: State::default(),
        }
    }

    /// Returns the next byte without consuming it, or `None` at end of input.
    ///
    /// Hitting the end raises the eof flag. An I/O error raises the bad flag
    /// and also ends the input, since nothing more can be read from it.
    fn peek(&mut self) -> Option<u8> {
        loop {
            match self.inner.fill_buf() {
                Ok([]) => {
                    self.state.eof = true;
                    return None;
                }
                Ok(buf) => return Some(buf[0]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    log::warn!("input source read error: {e}");
                    self.state.bad = true;
                    self.state.eof = true;
                    return None;
                }
            }
        }
    }

    fn bump(&mut self) {
        self.inner.consume(1);
    }

    fn decode(&mut self, bytes: Vec<u8>) -> Option<String> {
        match String::from_utf8(bytes) {
            Ok(s) => Some(s),
            Err(_) => {
                self.state.fail = true;
                None
            }
        }
    }
}

impl<R: BufRead> InputSource for Input<R> {
    fn read_token(&mut self) -> Option<String> {
        if self.fail() {
            return None;
        }

        while let Some(b) = self.peek() {
            if !b.is_ascii_whitespace() {
                break;
            }
            self.bump();
        }

        let mut token = Vec::new();
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() {
                break;
            }
            token.push(b);
            self.bump();
        }

        if token.is_empty() {
            self.state.fail = true;
            return None;
        }
        self.decode(token)
    }

    fn read_line(&mut self) -> Option<String> {
        if self.fail() {
            return None;
        }

        let mut line = Vec::new();
        let mut extracted = false;
        while let Some(b) = self.peek() {
            self.bump();
            extracted = true;
            if b == b'\n' {
                break;
            }
            line.push(b);
        }

        if !extracted {
            self.state.fail = true;
            return None;
        }
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        self.decode(line)
    }

    fn fail(&self) -> bool {
        self.state.fail || self.state.bad
    }

    fn eof(&self) -> bool {
        self.state.eof
    }

    fn set_fail(&mut self) {
        self.state.fail = true;
    }

    fn clear(&mut self) {
        self.state = State::default();
    }

    fn ignore_line(&mut self, bound: usize) {
        let mut discarded = 0;
        while discarded < bound {
            match self.peek() {
                Some(b) => {
                    self.bump();
                    discarded += 1;
                    if b == b'\n' {
                        break;
                    }
                }
                None => break,
            }
        }
    }
}
