//! Lexer module for Jack.

pub mod scanner;
pub mod token;
pub mod tokenizer;

pub use scanner::Scanner;
pub use token::{Keyword, Token, TokenKind, TokenType};
pub use tokenizer::Tokenizer;
