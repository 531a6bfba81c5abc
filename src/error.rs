use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;

use crate::object::Object;
use crate::token::Token;

// Both flags are monotonic within a run (false -> true); the REPL resets
// them between lines.
static HAD_ERROR: AtomicBool = AtomicBool::new(false);
static HAD_RUNTIME_ERROR: AtomicBool = AtomicBool::new(false);

/// Checks if an error occurred during scanning, parsing or resolving.
pub fn had_error() -> bool {
    HAD_ERROR.load(Ordering::Relaxed)
}

/// Checks if an error occurred during runtime.
pub fn had_runtime_error() -> bool {
    HAD_RUNTIME_ERROR.load(Ordering::Relaxed)
}

/// Resets the error flags.
/// This is used to reset the interpreter after an error occurs when running prompts.
pub fn reset() {
    HAD_ERROR.store(false, Ordering::Relaxed);
    HAD_RUNTIME_ERROR.store(false, Ordering::Relaxed);
}

/// Every diagnostic type must implement this trait.
pub trait Throw {
    /// Prints the diagnostic to stderr and raises the matching error flag.
    fn throw(&self);
}

/// Represents an error that occurs during scanning.
#[derive(Debug, Clone, Error)]
#[error("[Line {line}] Error: {message}")]
pub struct ScanError {
    pub line: usize,
    pub message: String,
}

impl Throw for ScanError {
    fn throw(&self) {
        eprintln!("{self}");
        HAD_ERROR.store(true, Ordering::Relaxed);
    }
}

/// Represents an error that occurs during parsing.
#[derive(Debug, Clone, Error)]
#[error("[Line {}] Error{}: {}", .token.line, .token.locus(), .message)]
pub struct ParseError {
    pub token: Token,
    pub message: String,
}

impl Throw for ParseError {
    fn throw(&self) {
        eprintln!("{self}");
        HAD_ERROR.store(true, Ordering::Relaxed);
    }
}

/// Represents an error that occurs during resolution.
#[derive(Debug, Clone, Error)]
#[error("[Line {line}] Error: {message}")]
pub struct ResolveError {
    pub line: usize,
    pub message: String,
}

impl Throw for ResolveError {
    fn throw(&self) {
        eprintln!("{self}");
        HAD_ERROR.store(true, Ordering::Relaxed);
    }
}

/// Represents an error that occurs during runtime.
#[derive(Debug, Clone, Error)]
#[error("[Line {}] {}", .token.line, .message)]
pub struct RuntimeError {
    pub token: Token,
    pub message: String,
}

impl RuntimeError {
    pub fn new(token: &Token, message: impl Into<String>) -> Self {
        RuntimeError { token: token.clone(), message: message.into() }
    }
}

impl Throw for RuntimeError {
    fn throw(&self) {
        eprintln!("{self}");
        HAD_RUNTIME_ERROR.store(true, Ordering::Relaxed);
    }
}

/// Non-local exits threaded through evaluation as the `Err` arm.
///
/// A `return` statement unwinds to the enclosing function call; a runtime
/// error unwinds all the way to the interpreter entry point. The two must
/// never be confused: function calls catch only `Return`.
#[derive(Debug)]
pub enum Unwind {
    Return(Object),
    Error(RuntimeError),
}

impl From<RuntimeError> for Unwind {
    fn from(error: RuntimeError) -> Self {
        Unwind::Error(error)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::token::Kind;

    #[test]
    fn scan_error_format() {
        let error = ScanError { line: 4, message: String::from("Unexpected character.") };
        assert_eq!(error.to_string(), "[Line 4] Error: Unexpected character.");
    }

    #[test]
    fn parse_error_format_at_lexeme() {
        let error = ParseError {
            token: Token::new(Kind::Semicolon, String::from(";"), None, 2),
            message: String::from("Expect variable name."),
        };
        assert_eq!(error.to_string(), "[Line 2] Error at ';': Expect variable name.");
    }

    #[test]
    fn parse_error_format_at_end() {
        let error = ParseError {
            token: Token::new(Kind::Eof, String::new(), None, 7),
            message: String::from("Expect ';' after value."),
        };
        assert_eq!(error.to_string(), "[Line 7] Error at end: Expect ';' after value.");
    }

    #[test]
    fn runtime_error_format() {
        let error = RuntimeError::new(
            &Token::new(Kind::Plus, String::from("+"), None, 1),
            "Args must be either Number or String.",
        );
        assert_eq!(error.to_string(), "[Line 1] Args must be either Number or String.");
    }
}
