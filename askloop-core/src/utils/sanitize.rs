//! # Validators & Sanitize Rules
//!
//! A validated read checks every successfully parsed value against an ordered
//! chain of [`Validator`]s. A validator looks at the value and either accepts
//! it (`None`) or returns the diagnostic that is shown to the user.
//!
//! Any `Fn(&T) -> Option<String>` closure is a validator. For string input the
//! module also ships a set of ready-made [`Rule`]s.
//!
//! ## Examples
//!
//! ### Closures
//! ```rust
//! use askloop_core::utils::Validator;
//!
//! let even = |v: &i32| (v % 2 != 0).then(|| format!("{v} is odd, try again!"));
//! assert_eq!(even.check(&4), None);
//! assert_eq!(even.check(&3).as_deref(), Some("3 is odd, try again!"));
//! ```
//!
//! ### Rules
//! ```rust
//! use askloop_core::utils::{Rule, Validator};
//!
//! let yn = Rule::MatchStrings(vec!["y".to_string(), "n".to_string()]);
//! assert!(yn.check(&"y".to_string()).is_none());
//! assert_eq!(
//!     yn.check(&"maybe".to_string()).as_deref(),
//!     Some("The value doesn't match with the options: y, n, try again!"),
//! );
//! ```
use std::fmt::Display;
use thiserror::Error;

/// A single check applied to a parsed value.
///
/// Returns `None` if the value is acceptable, or the message to report.
pub trait Validator<T> {
    fn check(&self, value: &T) -> Option<String>;
}

impl<T, F> Validator<T> for F
where
    F: Fn(&T) -> Option<String>,
{
    fn check(&self, value: &T) -> Option<String> {
        self(value)
    }
}

/// Ready-made validation rules for string input.
///
/// - `MatchString`: the input equals a specific string.
/// - `MatchStrings`: the input equals one of the given options.
/// - `IsBetween`: the input is an integer within the inclusive range `[min, max]`.
/// - `AlphaOnly`: every character is an ASCII letter (an empty input passes).
/// - `NonEmpty`: the input has at least one character.
/// - `NoDoubleSpace`: the input neither starts with a space nor contains two in a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    MatchString(String),
    MatchStrings(Vec<String>),
    IsBetween(isize, isize),
    AlphaOnly,
    NonEmpty,
    NoDoubleSpace,
}

/// Why a [`Rule`] rejected its input. The `Display` text is the diagnostic.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleViolation {
    #[error("The value doesn't match with {0}, try again!")]
    MatchString(String),
    #[error("The value doesn't match with the options: {}, try again!", .0.join(", "))]
    MatchStrings(Vec<String>),
    #[error("The value is not a number, try again!")]
    Number,
    #[error("The value is not between {0} and {1}, try again!")]
    Between(isize, isize),
    #[error("You can only input alpha here!")]
    AlphaOnly,
    #[error("The value can not be empty, try again!")]
    Empty,
    #[error("Cannot have spaces there, try again!")]
    Spacing,
}

impl Rule {
    /// Applies the rule to `input`, returning the violation on failure.
    pub fn apply(&self, input: &str) -> Result<(), RuleViolation> {
        match self {
            Rule::MatchString(s) => {
                if input == s {
                    Ok(())
                } else {
                    Err(RuleViolation::MatchString(s.clone()))
                }
            }
            Rule::MatchStrings(options) => {
                if options.iter().any(|o| o == input) {
                    Ok(())
                } else {
                    Err(RuleViolation::MatchStrings(options.clone()))
                }
            }
            Rule::IsBetween(min, max) => {
                let n: isize = input.parse().map_err(|_| RuleViolation::Number)?;
                if n >= *min && n <= *max {
                    Ok(())
                } else {
                    Err(RuleViolation::Between(*min, *max))
                }
            }
            Rule::AlphaOnly => {
                if input.chars().all(|c| c.is_ascii_alphabetic()) {
                    Ok(())
                } else {
                    Err(RuleViolation::AlphaOnly)
                }
            }
            Rule::NonEmpty => {
                if input.is_empty() {
                    Err(RuleViolation::Empty)
                } else {
                    Ok(())
                }
            }
            Rule::NoDoubleSpace => {
                if input.starts_with(' ') || input.contains("  ") {
                    Err(RuleViolation::Spacing)
                } else {
                    Ok(())
                }
            }
        }
    }
}

impl Validator<String> for Rule {
    fn check(&self, value: &String) -> Option<String> {
        self.apply(value).err().map(|e| e.to_string())
    }
}

/// Builds a validator accepting values in the inclusive range `[min, max]`.
///
/// ```rust
/// use askloop_core::utils::{between, Validator};
///
/// let age = between(0u8, 150);
/// assert!(age.check(&42).is_none());
/// assert_eq!(age.check(&200).as_deref(), Some("The value is not between 0 and 150, try again!"));
/// ```
pub fn between<T>(min: T, max: T) -> impl Fn(&T) -> Option<String>
where
    T: PartialOrd + Display,
{
    move |v: &T| {
        if *v >= min && *v <= max {
            None
        } else {
            Some(format!("The value is not between {min} and {max}, try again!"))
        }
    }
}
