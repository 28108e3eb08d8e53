//! Error types for interpretation

use thiserror::Error;

use daoscript_dsl::ParseError;

use crate::arity::Arity;
use crate::resolver::ResolverError;

/// Error types for an interpretation run.
///
/// Every variant except `Parse` aborts the run; no partial action list is
/// ever returned alongside an error.
#[derive(Error, Debug)]
pub enum InterpreterError {
    #[error("Parse error: {}", join_parse_errors(.0))]
    Parse(Vec<ParseError>),

    #[error("Arity error: `{name}` expects {expected}, got {actual}")]
    Arity {
        name: String,
        expected: Arity,
        actual: usize,
    },

    #[error("Binding error: {0}")]
    Binding(String),

    #[error("Command error: {command}: {message}")]
    Command { command: String, message: String },

    #[error("Resolution error: {0}")]
    Resolution(#[from] ResolverError),

    #[error("Invalid literal: {0}")]
    InvalidLiteral(String),
}

impl InterpreterError {
    /// Domain rule violation raised by `command`
    pub fn command(command: impl Into<String>, message: impl ToString) -> Self {
        InterpreterError::Command {
            command: command.into(),
            message: message.to_string(),
        }
    }

    pub fn binding<S: Into<String>>(msg: S) -> Self {
        InterpreterError::Binding(msg.into())
    }
}

fn join_parse_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|e| format!("line {}:{}: {}", e.line, e.column, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for interpretation
pub type Result<T> = std::result::Result<T, InterpreterError>;
