//! Error types for all compilation phases.

use crate::span::Span;
use thiserror::Error;

/// Lexer errors.
#[derive(Debug, Error)]
pub enum LexerError {
    #[error("Unexpected character '{0}' at {1}")]
    UnexpectedChar(char, Span),

    #[error("Unterminated string at {0}")]
    UnterminatedString(Span),

    #[error("Unterminated block comment starting at {0}")]
    UnterminatedComment(Span),

    #[error("Invalid integer constant '{0}' at {1}")]
    InvalidNumber(String, Span),

    /// A string literal character whose code point does not fit a VM constant.
    #[error("Character '{0}' cannot appear in a string constant at {1}")]
    InvalidStringChar(char, Span),

    #[error("String constant longer than {max} characters at {span}")]
    StringTooLong { max: u16, span: Span },
}

impl LexerError {
    pub fn unexpected_char(c: char, span: Span) -> Self {
        Self::UnexpectedChar(c, span)
    }

    pub fn unterminated_string(span: Span) -> Self {
        Self::UnterminatedString(span)
    }

    pub fn unterminated_comment(span: Span) -> Self {
        Self::UnterminatedComment(span)
    }

    pub fn invalid_number(s: String, span: Span) -> Self {
        Self::InvalidNumber(s, span)
    }

    pub fn invalid_string_char(c: char, span: Span) -> Self {
        Self::InvalidStringChar(c, span)
    }

    pub fn string_too_long(max: u16, span: Span) -> Self {
        Self::StringTooLong { max, span }
    }
}

/// Errors raised while walking the grammar and emitting VM code.
#[derive(Debug, Error)]
pub enum CompileError {
    /// An accessor was called for a token class the cursor is not positioned on.
    #[error("Token type mismatch: expected {expected}, found '{found}' at {span}")]
    TokenTypeMismatch {
        expected: String,
        found: String,
        span: Span,
    },

    /// A required keyword or symbol is absent.
    #[error("Syntax error: expected {expected}, found '{found}' at {span}")]
    Syntax {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("Unexpected end of file at {0}")]
    UnexpectedEof(Span),

    /// A name that must denote storage (assignment target, array base or
    /// variable read) is in neither scope.
    #[error("Undefined variable '{name}' at {span}")]
    UndefinedVariable { name: String, span: Span },

    /// A count or index no longer fits the 16-bit VM operand.
    #[error("Too many {what} at {span}")]
    LimitExceeded { what: String, span: Span },

    /// The sink rejected an instruction.
    #[error("Failed to write VM code: {0}")]
    Io(#[from] std::io::Error),
}

impl CompileError {
    pub fn token_type_mismatch(
        expected: impl Into<String>,
        found: impl Into<String>,
        span: Span,
    ) -> Self {
        Self::TokenTypeMismatch {
            expected: expected.into(),
            found: found.into(),
            span,
        }
    }

    pub fn syntax(expected: impl Into<String>, found: impl Into<String>, span: Span) -> Self {
        Self::Syntax {
            expected: expected.into(),
            found: found.into(),
            span,
        }
    }

    pub fn unexpected_eof(span: Span) -> Self {
        Self::UnexpectedEof(span)
    }

    pub fn undefined_variable(name: impl Into<String>, span: Span) -> Self {
        Self::UndefinedVariable {
            name: name.into(),
            span,
        }
    }

    pub fn limit_exceeded(what: impl Into<String>, span: Span) -> Self {
        Self::LimitExceeded {
            what: what.into(),
            span,
        }
    }
}

/// A unified error type for all phases.
#[derive(Debug, Error)]
pub enum JackError {
    #[error("Lexer error: {0}")]
    Lexer(#[from] LexerError),

    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
