//! Error types for dump parsing and root discovery

use std::fmt;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// The line shape a state required when parsing stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    /// A call line (or the unavailable marker) right after a task header
    FunctionAfterHeader,
    /// A source location right after a call line
    FileAfterFunction,
    /// A source location right after a `created by` line
    FileAfterCreated,
    /// A blank line (or `created by`) after an unavailable stack
    BlankAfterUnavailable,
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Expectation::FunctionAfterHeader => "a function after a goroutine header",
            Expectation::FileAfterFunction => "a file after a function",
            Expectation::FileAfterCreated => "a file after a created line",
            Expectation::BlankAfterUnavailable => "empty line after unavailable stack",
        };
        f.write_str(text)
    }
}

/// Error kinds surfaced by the parser and its configuration
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ─────────────────────────────────────────────────────────────
    // Parse Errors
    // ─────────────────────────────────────────────────────────────
    /// A line matched a known shape but a numeric field did not parse
    #[error("failed to parse int on line: {line:?}")]
    MalformedField { line: String },

    /// The current state required a specific continuation and got something else
    #[error("expected {expected}, got: {line:?}")]
    UnexpectedLine { expected: Expectation, line: String },

    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    /// Build a [`Error::MalformedField`], trimming the offending line.
    pub fn malformed_field(line: &str) -> Self {
        Self::MalformedField {
            line: line.trim().to_string(),
        }
    }

    /// Build a [`Error::UnexpectedLine`], trimming the offending line.
    pub fn unexpected_line(expected: Expectation, line: &str) -> Self {
        Self::UnexpectedLine {
            expected,
            line: line.trim().to_string(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn logging_init(message: impl Into<String>) -> Self {
        Self::LoggingInit(message.into())
    }

    /// True for errors that stop structured parsing of a dump
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Error::MalformedField { .. } | Error::UnexpectedLine { .. }
        )
    }
}
