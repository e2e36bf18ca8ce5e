//! MIDL parser errors

use thiserror::Error;

/// Source location for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn at(pos: usize) -> Self {
        Self { start: pos, end: pos }
    }
}

/// Errors raised while turning MIDL text into an AST
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MidlError {
    /// Lexer error
    #[error("lexer error at {line}:{column} (byte {position}): {message}")]
    LexerError {
        position: usize,
        line: usize,
        column: usize,
        message: String,
    },

    /// Grammar error: the input at `position` did not match what was expected
    #[error("parse error at {line}:{column} (byte {position}): expected {expected}, found {found}")]
    ParseError {
        position: usize,
        line: usize,
        column: usize,
        expected: String,
        found: String,
    },
}

/// Result type for MIDL operations
pub type Result<T> = std::result::Result<T, MidlError>;

impl MidlError {
    pub fn lexer(input: &str, position: usize, message: impl Into<String>) -> Self {
        let (line, column) = line_col(input, position);
        Self::LexerError {
            position,
            line,
            column,
            message: message.into(),
        }
    }

    pub fn parse(
        input: &str,
        position: usize,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        let (line, column) = line_col(input, position);
        Self::ParseError {
            position,
            line,
            column,
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Byte offset of the failure
    pub fn position(&self) -> usize {
        match self {
            Self::LexerError { position, .. } | Self::ParseError { position, .. } => *position,
        }
    }
}

/// 1-based line and column of a byte offset
pub fn line_col(input: &str, position: usize) -> (usize, usize) {
    let end = position.min(input.len());
    let before = &input.as_bytes()[..end];
    let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
    let line_start = before
        .iter()
        .rposition(|&b| b == b'\n')
        .map(|i| i + 1)
        .unwrap_or(0);
    (line, end - line_start + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col() {
        let input = "abc\ndef\nghi";
        assert_eq!(line_col(input, 0), (1, 1));
        assert_eq!(line_col(input, 5), (2, 2));
        assert_eq!(line_col(input, 8), (3, 1));
        assert_eq!(line_col(input, 100), (3, 4));
    }

    #[test]
    fn test_parse_error_message() {
        let err = MidlError::parse("a\nbc", 3, "`;`", "`}`");
        assert_eq!(
            err.to_string(),
            "parse error at 2:2 (byte 3): expected `;`, found `}`"
        );
        assert_eq!(err.position(), 3);
    }
}
