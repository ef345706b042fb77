//! Statement compilation: let, if, while, do, return.

use std::io::Write;

use crate::lexer::Keyword;
use crate::vm::{Command, Segment};

use super::core::{CompileResult, Compiler};

impl<W: Write> Compiler<W> {
    /// Zero or more statements, up to (not including) the closing `}`.
    pub(crate) fn compile_statements(&mut self) -> CompileResult<()> {
        loop {
            match self.current_keyword() {
                Some(Keyword::Let) => self.compile_let()?,
                Some(Keyword::If) => self.compile_if()?,
                Some(Keyword::While) => self.compile_while()?,
                Some(Keyword::Do) => self.compile_do()?,
                Some(Keyword::Return) => self.compile_return()?,
                _ => return Ok(()),
            }
        }
    }

    /// `let name ([ expr ])? = expr ;`
    fn compile_let(&mut self) -> CompileResult<()> {
        self.expect_keyword(Keyword::Let)?;
        let span = self.tokenizer.current_span();
        let name = self.expect_identifier()?;
        let target = self.resolve_variable(&name, span)?;

        if self.tokenizer.is_symbol('[') {
            self.tokenizer.advance();
            self.writer.write_push(target.kind.segment(), target.index)?;
            self.compile_expression()?;
            self.expect_symbol(']')?;
            self.writer.write_arithmetic(Command::Add)?;

            self.expect_symbol('=')?;
            self.compile_expression()?;
            self.expect_symbol(';')?;

            // The right-hand side may use `that` too; bind the target address last.
            self.writer.write_pop(Segment::Temp, 0)?;
            self.writer.write_pop(Segment::Pointer, 1)?;
            self.writer.write_push(Segment::Temp, 0)?;
            self.writer.write_pop(Segment::That, 0)?;
        } else {
            self.expect_symbol('=')?;
            self.compile_expression()?;
            self.expect_symbol(';')?;
            self.writer.write_pop(target.kind.segment(), target.index)?;
        }
        Ok(())
    }

    /// `if ( expr ) { statements } (else { statements })?`
    fn compile_if(&mut self) -> CompileResult<()> {
        let else_label = self.new_label();
        let end_label = self.new_label();

        self.expect_keyword(Keyword::If)?;
        self.expect_symbol('(')?;
        self.compile_expression()?;
        self.expect_symbol(')')?;
        self.writer.write_arithmetic(Command::Not)?;
        self.writer.write_if(&else_label)?;

        self.expect_symbol('{')?;
        self.compile_statements()?;
        self.expect_symbol('}')?;
        self.writer.write_goto(&end_label)?;

        self.writer.write_label(&else_label)?;
        if self.tokenizer.is_keyword(Keyword::Else) {
            self.tokenizer.advance();
            self.expect_symbol('{')?;
            self.compile_statements()?;
            self.expect_symbol('}')?;
        }
        self.writer.write_label(&end_label)?;
        Ok(())
    }

    /// `while ( expr ) { statements }`
    fn compile_while(&mut self) -> CompileResult<()> {
        let top_label = self.new_label();
        let exit_label = self.new_label();

        self.expect_keyword(Keyword::While)?;
        self.writer.write_label(&top_label)?;
        self.expect_symbol('(')?;
        self.compile_expression()?;
        self.expect_symbol(')')?;
        self.writer.write_arithmetic(Command::Not)?;
        self.writer.write_if(&exit_label)?;

        self.expect_symbol('{')?;
        self.compile_statements()?;
        self.expect_symbol('}')?;
        self.writer.write_goto(&top_label)?;
        self.writer.write_label(&exit_label)?;
        Ok(())
    }

    /// `do subroutineCall ;` with the returned value discarded.
    fn compile_do(&mut self) -> CompileResult<()> {
        self.expect_keyword(Keyword::Do)?;
        let name = self.expect_identifier()?;
        self.compile_subroutine_call(&name)?;
        self.expect_symbol(';')?;
        self.writer.write_pop(Segment::Temp, 0)?;
        Ok(())
    }

    /// `return expr? ;` where a bare return yields 0.
    fn compile_return(&mut self) -> CompileResult<()> {
        self.expect_keyword(Keyword::Return)?;
        if self.tokenizer.is_symbol(';') {
            self.writer.write_push(Segment::Constant, 0)?;
        } else {
            self.compile_expression()?;
        }
        self.expect_symbol(';')?;
        self.writer.write_return()?;
        Ok(())
    }
}
