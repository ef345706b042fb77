//! Core compiler struct and token helper methods.

use std::io::Write;

use crate::error::CompileError;
use crate::lexer::{Keyword, Tokenizer};
use crate::span::Span;
use crate::symbol_table::{Kind, Symbol, SymbolTable};
use crate::vm::VmWriter;

pub type CompileResult<T> = Result<T, CompileError>;

/// Compiles one class, emitting VM code as each construct is recognized.
///
/// Owns the tokenizer, symbol table and writer for exactly one compilation
/// unit. Construct a fresh value per source file.
pub struct Compiler<W: Write> {
    pub(crate) tokenizer: Tokenizer,
    pub(crate) symbols: SymbolTable,
    pub(crate) writer: VmWriter<W>,
    /// Name of the class being compiled; qualifies subroutines and labels.
    pub(crate) class_name: String,
    /// Shared by every subroutine of the class.
    pub(crate) label_index: usize,
}

impl<W: Write> Compiler<W> {
    pub fn new(tokenizer: Tokenizer, out: W) -> Self {
        Self {
            tokenizer,
            symbols: SymbolTable::new(),
            writer: VmWriter::new(out),
            class_name: String::new(),
            label_index: 0,
        }
    }

    /// Compile the whole class and hand back the output destination.
    pub fn compile(mut self) -> CompileResult<W> {
        self.compile_class()?;
        Ok(self.writer.into_inner()?)
    }

    // ===== Token helpers =====

    pub(crate) fn current_keyword(&self) -> Option<Keyword> {
        self.tokenizer.keyword().ok()
    }

    pub(crate) fn current_symbol(&self) -> Option<char> {
        self.tokenizer.symbol().ok()
    }

    pub(crate) fn expect_keyword(&mut self, keyword: Keyword) -> CompileResult<()> {
        if self.tokenizer.is_keyword(keyword) {
            self.tokenizer.advance();
            Ok(())
        } else {
            Err(self.syntax_error(&format!("'{}'", keyword)))
        }
    }

    pub(crate) fn expect_symbol(&mut self, symbol: char) -> CompileResult<()> {
        if self.tokenizer.is_symbol(symbol) {
            self.tokenizer.advance();
            Ok(())
        } else {
            Err(self.syntax_error(&format!("'{}'", symbol)))
        }
    }

    pub(crate) fn expect_identifier(&mut self) -> CompileResult<String> {
        let name = self.tokenizer.identifier()?.to_string();
        self.tokenizer.advance();
        Ok(name)
    }

    pub(crate) fn syntax_error(&self, expected: &str) -> CompileError {
        match self.tokenizer.current() {
            Some(token) => CompileError::syntax(expected, token.kind.to_string(), token.span),
            None => CompileError::unexpected_eof(self.tokenizer.current_span()),
        }
    }

    /// Resolve a name that must denote storage: an assignment target, an array
    /// base or a plain variable read. Call sites that may name a class or a
    /// subroutine use `SymbolTable::lookup` directly instead.
    pub(crate) fn resolve_variable(&self, name: &str, span: Span) -> CompileResult<Symbol> {
        self.symbols
            .lookup(name)
            .cloned()
            .ok_or_else(|| CompileError::undefined_variable(name, span))
    }

    /// Define a name, failing once its kind has used up every 16-bit index.
    pub(crate) fn define(
        &mut self,
        name: &str,
        ty: &str,
        kind: Kind,
        span: Span,
    ) -> CompileResult<u16> {
        self.symbols
            .define(name, ty, kind)
            .ok_or_else(|| CompileError::limit_exceeded(format!("{} variables", kind), span))
    }

    /// A fresh `ClassName.L<n>` label, never handed out twice in one class.
    pub(crate) fn new_label(&mut self) -> String {
        let label = format!("{}.L{}", self.class_name, self.label_index);
        self.label_index += 1;
        label
    }
}
