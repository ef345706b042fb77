//! Forward-only cursor over a scanned token sequence.

use crate::error::{CompileError, LexerError};
use crate::lexer::scanner::Scanner;
use crate::lexer::token::{Keyword, Token, TokenKind, TokenType};
use crate::span::Span;

/// Typed accessor result for the current token.
pub type TokenResult<T> = Result<T, CompileError>;

/// Holds the complete token sequence of one source file and a cursor into it.
///
/// The whole input is scanned up front. The cursor starts on the first token
/// and only ever moves forward.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    tokens: Vec<Token>,
    current: usize,
    eof_span: Span,
}

impl Tokenizer {
    /// Scan `source` and position the cursor on its first token.
    pub fn new(source: &str) -> Result<Self, LexerError> {
        let tokens = Scanner::new(source).scan_tokens()?;
        let end = source.len();
        let last_line = source.rfind('\n').map_or(source, |nl| &source[nl + 1..]);
        let line = source.matches('\n').count() + 1;
        let column = last_line.chars().count() + 1;
        let mut tokenizer = Self::from_tokens(tokens);
        tokenizer.eof_span = Span::new(end, end, line, column);
        Ok(tokenizer)
    }

    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        let eof_span = tokens
            .last()
            .map(|t| Span::new(t.span.end, t.span.end, t.span.line, t.span.column + 1))
            .unwrap_or_default();
        Self {
            tokens,
            current: 0,
            eof_span,
        }
    }

    pub fn has_more_tokens(&self) -> bool {
        self.current < self.tokens.len()
    }

    /// Move to the next token. Advancing past the end leaves the cursor there;
    /// every accessor then reports an unexpected end of file.
    pub fn advance(&mut self) {
        if self.has_more_tokens() {
            self.current += 1;
        }
    }

    pub fn current(&self) -> Option<&Token> {
        self.tokens.get(self.current)
    }

    pub fn current_span(&self) -> Span {
        self.current().map_or(self.eof_span, |t| t.span)
    }

    fn current_kind(&self) -> TokenResult<&TokenKind> {
        self.current()
            .map(|t| &t.kind)
            .ok_or_else(|| CompileError::unexpected_eof(self.eof_span))
    }

    pub fn token_type(&self) -> TokenResult<TokenType> {
        Ok(self.current_kind()?.token_type())
    }

    fn mismatch(&self, expected: TokenType) -> CompileError {
        match self.current() {
            Some(token) => CompileError::token_type_mismatch(
                expected.to_string(),
                token.kind.to_string(),
                token.span,
            ),
            None => CompileError::unexpected_eof(self.eof_span),
        }
    }

    pub fn keyword(&self) -> TokenResult<Keyword> {
        match self.current_kind() {
            Ok(TokenKind::Keyword(k)) => Ok(*k),
            _ => Err(self.mismatch(TokenType::Keyword)),
        }
    }

    pub fn symbol(&self) -> TokenResult<char> {
        match self.current_kind() {
            Ok(TokenKind::Symbol(c)) => Ok(*c),
            _ => Err(self.mismatch(TokenType::Symbol)),
        }
    }

    pub fn identifier(&self) -> TokenResult<&str> {
        match self.current_kind() {
            Ok(TokenKind::Identifier(name)) => Ok(name.as_str()),
            _ => Err(self.mismatch(TokenType::Identifier)),
        }
    }

    pub fn int_value(&self) -> TokenResult<u16> {
        match self.current_kind() {
            Ok(TokenKind::IntConst(n)) => Ok(*n),
            _ => Err(self.mismatch(TokenType::IntConst)),
        }
    }

    pub fn string_value(&self) -> TokenResult<&str> {
        match self.current_kind() {
            Ok(TokenKind::StringConst(s)) => Ok(s.as_str()),
            _ => Err(self.mismatch(TokenType::StringConst)),
        }
    }

    /// Whether the current token is the given symbol.
    pub fn is_symbol(&self, c: char) -> bool {
        matches!(self.current_kind(), Ok(TokenKind::Symbol(s)) if *s == c)
    }

    /// Whether the current token is the given keyword.
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        matches!(self.current_kind(), Ok(TokenKind::Keyword(k)) if *k == keyword)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_walk() {
        let mut tokenizer = Tokenizer::new("let x = 7;").unwrap();
        assert_eq!(tokenizer.keyword().unwrap(), Keyword::Let);
        tokenizer.advance();
        assert_eq!(tokenizer.token_type().unwrap(), TokenType::Identifier);
        assert_eq!(tokenizer.identifier().unwrap(), "x");
        tokenizer.advance();
        assert_eq!(tokenizer.symbol().unwrap(), '=');
        tokenizer.advance();
        assert_eq!(tokenizer.int_value().unwrap(), 7);
        tokenizer.advance();
        assert!(tokenizer.is_symbol(';'));
        tokenizer.advance();
        assert!(!tokenizer.has_more_tokens());
    }

    #[test]
    fn test_wrong_accessor_is_type_mismatch() {
        let tokenizer = Tokenizer::new("\"hi\"").unwrap();
        assert_eq!(tokenizer.string_value().unwrap(), "hi");
        let err = tokenizer.identifier().unwrap_err();
        assert!(matches!(err, CompileError::TokenTypeMismatch { .. }));
    }

    #[test]
    fn test_accessor_past_end() {
        let mut tokenizer = Tokenizer::new("x").unwrap();
        tokenizer.advance();
        tokenizer.advance();
        assert!(matches!(
            tokenizer.symbol().unwrap_err(),
            CompileError::UnexpectedEof(_)
        ));
    }

    #[test]
    fn test_eof_position_follows_trailing_newline() {
        let tokenizer = Tokenizer::new("class A {\n}\n").unwrap();
        assert_eq!(tokenizer.eof_span.line, 3);
        assert_eq!(tokenizer.eof_span.column, 1);

        let tokenizer = Tokenizer::new("class A {\n}").unwrap();
        assert_eq!(tokenizer.eof_span.line, 2);
        assert_eq!(tokenizer.eof_span.column, 2);

        let tokenizer = Tokenizer::new("").unwrap();
        assert_eq!(tokenizer.eof_span, Span::new(0, 0, 1, 1));
    }

    #[test]
    fn test_lex_error_surfaces_before_parsing() {
        assert!(Tokenizer::new("class A { /* open").is_err());
    }
}
