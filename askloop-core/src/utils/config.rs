//! Plain-data configuration for a validated read.
//!
//! Every knob of [`ValidatedRead`](crate::utils::ValidatedRead) has a fluent
//! setter; [`ReadConfig`] gathers the same knobs in one value so they can be
//! shared between reads or loaded from a file (`serde` feature).
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::utils::source::FLUSH_LIMIT;

/// Message written when the reader cannot parse the input.
pub const DEFAULT_FORMAT_ERROR: &str = "Invalid input format";

/// Attempt budget of a read.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Retries {
    #[default]
    Unlimited,
    Limited(u32),
}

impl Retries {
    /// `true` while at least one more attempt may start.
    pub fn remaining(&self) -> bool {
        match self {
            Retries::Unlimited => true,
            Retries::Limited(n) => *n > 0,
        }
    }

    /// Spends one attempt. Unlimited budgets are left untouched.
    pub fn consume(&mut self) {
        if let Retries::Limited(n) = self {
            *n = n.saturating_sub(1);
        }
    }
}

/// How many failing validators are reported per attempt.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DiagnosticMode {
    /// Run the whole chain and report every failure.
    #[default]
    Multiple,
    /// Stop at the first failing validator.
    Single,
}

/// When the source's fail flag is raised after a rejected value.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FailMark {
    /// Once every diagnostic of the attempt has been written.
    #[default]
    AfterDiagnostics,
    /// As soon as the first validator fails, before its message is written.
    BeforeDiagnostics,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ReadConfig {
    pub flush_on_error: bool,
    pub flush_limit: usize,
    pub retries: Retries,
    pub format_error: String,
    pub diagnostics: DiagnosticMode,
    pub fail_mark: FailMark,
}

impl Default for ReadConfig {
    fn default() -> Self {
        ReadConfig {
            flush_on_error: true,
            flush_limit: FLUSH_LIMIT,
            retries: Retries::Unlimited,
            format_error: DEFAULT_FORMAT_ERROR.to_string(),
            diagnostics: DiagnosticMode::Multiple,
            fail_mark: FailMark::AfterDiagnostics,
        }
    }
}
