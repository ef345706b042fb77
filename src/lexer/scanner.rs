//! Lexer/Scanner for Jack source code.

use crate::error::LexerError;
use crate::lexer::token::{is_symbol, Keyword, Token, TokenKind};
use crate::span::Span;

/// Largest value an integer constant may take.
pub const MAX_INT_CONST: u16 = 32767;

/// The lexer transforms source code into a flat sequence of tokens.
pub struct Scanner<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    current_pos: usize,
    line: usize,
    column: usize,
    start_pos: usize,
    start_line: usize,
    start_column: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            current_pos: 0,
            line: 1,
            column: 1,
            start_pos: 0,
            start_line: 1,
            start_column: 1,
        }
    }

    /// Scan all tokens from the source.
    pub fn scan_tokens(&mut self) -> Result<Vec<Token>, LexerError> {
        let mut tokens = Vec::new();

        while let Some(token) = self.scan_token()? {
            tokens.push(token);
        }

        Ok(tokens)
    }

    /// Scan the next token, or `None` once the input is exhausted.
    pub fn scan_token(&mut self) -> Result<Option<Token>, LexerError> {
        self.skip_whitespace_and_comments()?;
        self.mark_start();

        let Some((_, c)) = self.advance() else {
            return Ok(None);
        };

        let token = match c {
            '"' => self.scan_string()?,
            c if c.is_ascii_digit() => self.scan_number(c)?,
            c if c.is_ascii_alphabetic() || c == '_' => self.scan_identifier(c),
            c if is_symbol(c) => self.make_token(TokenKind::Symbol(c)),
            _ => return Err(LexerError::unexpected_char(c, self.current_span())),
        };

        Ok(Some(token))
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexerError> {
        loop {
            match self.peek() {
                Some('\n') => {
                    self.advance();
                    self.line += 1;
                    self.column = 1;
                }
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') => {
                    if self.peek_next() == Some('/') {
                        // Line comment
                        while self.peek().is_some() && self.peek() != Some('\n') {
                            self.advance();
                        }
                    } else if self.peek_next() == Some('*') {
                        self.skip_block_comment()?;
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Block comments do not nest: the first `*/` closes the comment.
    fn skip_block_comment(&mut self) -> Result<(), LexerError> {
        self.mark_start();
        self.advance(); // consume /
        self.advance(); // consume *
        loop {
            match self.peek() {
                None => return Err(LexerError::unterminated_comment(self.current_span())),
                Some('*') if self.peek_next() == Some('/') => {
                    self.advance();
                    self.advance();
                    return Ok(());
                }
                Some('\n') => {
                    self.advance();
                    self.line += 1;
                    self.column = 1;
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Every character becomes one `push constant <code point>` at run time,
    /// so both the code points and the length are capped at `MAX_INT_CONST`.
    fn scan_string(&mut self) -> Result<Token, LexerError> {
        let mut value = String::new();
        let mut length: u16 = 0;

        loop {
            match self.peek() {
                None | Some('\n') => {
                    return Err(LexerError::unterminated_string(self.current_span()));
                }
                Some('"') => {
                    self.advance();
                    break;
                }
                Some(c) => {
                    let (line, column) = (self.line, self.column);
                    let start = self.current_pos;
                    self.advance();
                    if c as u32 > u32::from(MAX_INT_CONST) {
                        let span = Span::new(start, self.current_pos, line, column);
                        return Err(LexerError::invalid_string_char(c, span));
                    }
                    if length == MAX_INT_CONST {
                        return Err(LexerError::string_too_long(
                            MAX_INT_CONST,
                            self.current_span(),
                        ));
                    }
                    length += 1;
                    value.push(c);
                }
            }
        }

        Ok(self.make_token(TokenKind::StringConst(value)))
    }

    fn scan_number(&mut self, first: char) -> Result<Token, LexerError> {
        let mut value = String::from(first);

        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                value.push(c);
                self.advance();
            } else {
                break;
            }
        }

        let n: u16 = value
            .parse()
            .ok()
            .filter(|n| *n <= MAX_INT_CONST)
            .ok_or_else(|| LexerError::invalid_number(value.clone(), self.current_span()))?;
        Ok(self.make_token(TokenKind::IntConst(n)))
    }

    fn scan_identifier(&mut self, first: char) -> Token {
        let mut value = String::from(first);

        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                value.push(c);
                self.advance();
            } else {
                break;
            }
        }

        let kind = match Keyword::from_ident(&value) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Identifier(value),
        };
        self.make_token(kind)
    }

    fn advance(&mut self) -> Option<(usize, char)> {
        if let Some((pos, c)) = self.chars.next() {
            self.current_pos = pos + c.len_utf8();
            self.column += 1;
            Some((pos, c))
        } else {
            None
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn peek_next(&self) -> Option<char> {
        let mut iter = self.source[self.current_pos..].chars();
        iter.next();
        iter.next()
    }

    fn mark_start(&mut self) {
        self.start_pos = self.current_pos;
        self.start_line = self.line;
        self.start_column = self.column;
    }

    fn current_span(&self) -> Span {
        Span::new(
            self.start_pos,
            self.current_pos,
            self.start_line,
            self.start_column,
        )
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.current_span())
    }
}
