//! # askloop
//!
//! A small library for interactive CLI input: prompt for a single typed value,
//! validate it against a chain of rules and keep asking until it is accepted.
//!
//! ## Features
//! - Typed reads for anything implementing [`FromStr`](std::str::FromStr).
//! - Whole-line reads with built-in string rules ([`utils::Rule`]).
//! - Ordered validator chains reporting one or all diagnostics per attempt.
//! - Finite or unlimited attempt budgets, with recovery from malformed input.
//! - Works against any [`BufRead`](std::io::BufRead) and any
//!   [`Write`](std::io::Write) sink, so reads are easy to test.
//!
//! ## Example
//! ```rust,no_run
//! use askloop_core::utils::{read_line, Input, InputSource, Rule};
//!
//! let mut lname = String::new();
//! let mut stdin = Input::new(std::io::stdin().lock());
//!
//! let _ = read_line("Input customer's lastname: ", &mut lname)
//!     .rule(Rule::AlphaOnly)
//!     .rule(Rule::NonEmpty)
//!     .rule(Rule::NoDoubleSpace)
//!     .execute(&mut stdin);
//!
//! if !stdin.fail() {
//!     println!("Success: {lname}");
//! }
//! ```
//!
//! ## Logging
//!
//! Attempts, rejections and sink errors are reported through the [`log`]
//! facade. Install any logger (e.g. `env_logger`) to see them.

pub mod utils;
