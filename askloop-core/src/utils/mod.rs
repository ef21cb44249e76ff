pub mod checked;
pub use checked::{Attempts, ReadError, ValidatedRead};

pub mod config;
pub use config::{DiagnosticMode, FailMark, ReadConfig, Retries};

pub mod sanitize;
pub use sanitize::{Rule, RuleViolation, Validator, between};

pub mod source;
pub use source::{Input, InputSource};

pub mod terminal;
pub use terminal::{Terminal, parse_line, parse_token, prompt, prompt_text, read_line};
