//! Parse errors

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A syntax error with its position in the whole script.
///
/// Parse errors never abort parsing; they are collected next to the
/// best-effort syntax tree.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("Parse error at line {line}:{column}: {message}")]
pub struct ParseError {
    pub message: String,
    /// Byte offset in the script
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, source: &str, offset: usize) -> Self {
        let (line, column) = line_col(source, offset);
        Self {
            message: message.into(),
            offset,
            line,
            column,
        }
    }
}

/// 1-based line and column of a byte offset
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col() {
        let source = "load aragonos\nar:connect x (\n  grant\n)";
        assert_eq!(line_col(source, 0), (1, 1));
        assert_eq!(line_col(source, 14), (2, 1));
        assert_eq!(line_col(source, 31), (3, 3));
    }
}
