//! Token definitions for the Jack lexer.

use crate::span::Span;

/// The reserved words of the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Class,
    Constructor,
    Function,
    Method,
    Field,
    Static,
    Var,
    Int,
    Char,
    Boolean,
    Void,
    True,
    False,
    Null,
    This,
    Let,
    Do,
    If,
    Else,
    While,
    Return,
}

impl Keyword {
    /// Look up a reserved word by its exact spelling.
    pub fn from_ident(ident: &str) -> Option<Keyword> {
        match ident {
            "class" => Some(Keyword::Class),
            "constructor" => Some(Keyword::Constructor),
            "function" => Some(Keyword::Function),
            "method" => Some(Keyword::Method),
            "field" => Some(Keyword::Field),
            "static" => Some(Keyword::Static),
            "var" => Some(Keyword::Var),
            "int" => Some(Keyword::Int),
            "char" => Some(Keyword::Char),
            "boolean" => Some(Keyword::Boolean),
            "void" => Some(Keyword::Void),
            "true" => Some(Keyword::True),
            "false" => Some(Keyword::False),
            "null" => Some(Keyword::Null),
            "this" => Some(Keyword::This),
            "let" => Some(Keyword::Let),
            "do" => Some(Keyword::Do),
            "if" => Some(Keyword::If),
            "else" => Some(Keyword::Else),
            "while" => Some(Keyword::While),
            "return" => Some(Keyword::Return),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Class => "class",
            Keyword::Constructor => "constructor",
            Keyword::Function => "function",
            Keyword::Method => "method",
            Keyword::Field => "field",
            Keyword::Static => "static",
            Keyword::Var => "var",
            Keyword::Int => "int",
            Keyword::Char => "char",
            Keyword::Boolean => "boolean",
            Keyword::Void => "void",
            Keyword::True => "true",
            Keyword::False => "false",
            Keyword::Null => "null",
            Keyword::This => "this",
            Keyword::Let => "let",
            Keyword::Do => "do",
            Keyword::If => "if",
            Keyword::Else => "else",
            Keyword::While => "while",
            Keyword::Return => "return",
        }
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single-character operators and punctuation.
pub const SYMBOLS: &str = "{}()[].,;+-*/&|<>=~";

pub fn is_symbol(c: char) -> bool {
    SYMBOLS.contains(c)
}

/// The lexical class of a token, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Keyword,
    Symbol,
    IntConst,
    StringConst,
    Identifier,
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenType::Keyword => write!(f, "keyword"),
            TokenType::Symbol => write!(f, "symbol"),
            TokenType::IntConst => write!(f, "integer constant"),
            TokenType::StringConst => write!(f, "string constant"),
            TokenType::Identifier => write!(f, "identifier"),
        }
    }
}

/// A classified token with its payload resolved once during scanning.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Keyword(Keyword),
    Symbol(char),
    IntConst(u16),
    StringConst(String),
    Identifier(String),
}

impl TokenKind {
    pub fn token_type(&self) -> TokenType {
        match self {
            TokenKind::Keyword(_) => TokenType::Keyword,
            TokenKind::Symbol(_) => TokenType::Symbol,
            TokenKind::IntConst(_) => TokenType::IntConst,
            TokenKind::StringConst(_) => TokenType::StringConst,
            TokenKind::Identifier(_) => TokenType::Identifier,
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Keyword(k) => write!(f, "{}", k),
            TokenKind::Symbol(c) => write!(f, "{}", c),
            TokenKind::IntConst(n) => write!(f, "{}", n),
            TokenKind::StringConst(s) => write!(f, "\"{}\"", s),
            TokenKind::Identifier(s) => write!(f, "{}", s),
        }
    }
}

/// A token with its kind and source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}
