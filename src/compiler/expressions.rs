//! Expression compilation: terms, operator chains, calls, expression lists.
//!
//! Expressions have a single precedence level. Each binary operator is applied
//! to the running result and the next term as soon as that term is compiled,
//! so `a + b * c` evaluates as `(a + b) * c`.

use std::io::Write;

use crate::error::CompileError;
use crate::lexer::scanner::MAX_INT_CONST;
use crate::lexer::{Keyword, TokenKind};
use crate::span::Span;
use crate::vm::{Command, Segment};

use super::core::{CompileResult, Compiler};

/// How a binary operator is lowered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryOp {
    Primitive(Command),
    /// No VM primitive exists; call a two-argument library routine.
    Library(&'static str),
}

impl BinaryOp {
    fn from_symbol(c: char) -> Option<BinaryOp> {
        let op = match c {
            '+' => BinaryOp::Primitive(Command::Add),
            '-' => BinaryOp::Primitive(Command::Sub),
            '&' => BinaryOp::Primitive(Command::And),
            '|' => BinaryOp::Primitive(Command::Or),
            '<' => BinaryOp::Primitive(Command::Lt),
            '>' => BinaryOp::Primitive(Command::Gt),
            '=' => BinaryOp::Primitive(Command::Eq),
            '*' => BinaryOp::Library("Math.multiply"),
            '/' => BinaryOp::Library("Math.divide"),
            _ => return None,
        };
        Some(op)
    }
}

impl<W: Write> Compiler<W> {
    /// `term (op term)*`
    pub(crate) fn compile_expression(&mut self) -> CompileResult<()> {
        self.compile_term()?;

        while let Some(op) = self.current_symbol().and_then(BinaryOp::from_symbol) {
            self.tokenizer.advance();
            self.compile_term()?;
            match op {
                BinaryOp::Primitive(command) => self.writer.write_arithmetic(command)?,
                BinaryOp::Library(routine) => self.writer.write_call(routine, 2)?,
            }
        }
        Ok(())
    }

    pub(crate) fn compile_term(&mut self) -> CompileResult<()> {
        let Some(token) = self.tokenizer.current().cloned() else {
            return Err(self.syntax_error("term"));
        };

        match token.kind {
            TokenKind::IntConst(n) => {
                self.tokenizer.advance();
                self.writer.write_push(Segment::Constant, n)?;
            }
            TokenKind::StringConst(s) => {
                self.tokenizer.advance();
                self.compile_string_literal(&s, token.span)?;
            }
            TokenKind::Keyword(keyword) => {
                match keyword {
                    Keyword::This => self.writer.write_push(Segment::Pointer, 0)?,
                    Keyword::Null | Keyword::False => self.writer.write_push(Segment::Constant, 0)?,
                    Keyword::True => {
                        self.writer.write_push(Segment::Constant, 0)?;
                        self.writer.write_arithmetic(Command::Not)?;
                    }
                    _ => return Err(self.syntax_error("term")),
                }
                self.tokenizer.advance();
            }
            TokenKind::Identifier(name) => {
                self.tokenizer.advance();
                match self.current_symbol() {
                    Some('(' | '.') => self.compile_subroutine_call(&name)?,
                    Some('[') => {
                        let base = self.resolve_variable(&name, token.span)?;
                        self.tokenizer.advance();
                        self.writer.write_push(base.kind.segment(), base.index)?;
                        self.compile_expression()?;
                        self.expect_symbol(']')?;
                        self.writer.write_arithmetic(Command::Add)?;
                        self.writer.write_pop(Segment::Pointer, 1)?;
                        self.writer.write_push(Segment::That, 0)?;
                    }
                    _ => {
                        let var = self.resolve_variable(&name, token.span)?;
                        self.writer.write_push(var.kind.segment(), var.index)?;
                    }
                }
            }
            TokenKind::Symbol('(') => {
                self.tokenizer.advance();
                self.compile_expression()?;
                self.expect_symbol(')')?;
            }
            TokenKind::Symbol(op @ ('-' | '~')) => {
                self.tokenizer.advance();
                self.compile_term()?;
                let command = if op == '-' { Command::Neg } else { Command::Not };
                self.writer.write_arithmetic(command)?;
            }
            TokenKind::Symbol(_) => return Err(self.syntax_error("term")),
        }
        Ok(())
    }

    /// Rebuild the literal at run time: `String.new(len)` followed by one
    /// `appendChar` per character, pushing its code point.
    fn compile_string_literal(&mut self, value: &str, span: Span) -> CompileResult<()> {
        let constant = |n: u32| {
            u16::try_from(n)
                .ok()
                .filter(|n| *n <= MAX_INT_CONST)
                .ok_or_else(|| CompileError::limit_exceeded("characters in string constant", span))
        };
        let codes = value
            .chars()
            .map(|c| constant(u32::from(c)))
            .collect::<CompileResult<Vec<u16>>>()?;
        let length = constant(u32::try_from(codes.len()).unwrap_or(u32::MAX))?;

        self.writer.write_push(Segment::Constant, length)?;
        self.writer.write_call("String.new", 1)?;
        for code in codes {
            self.writer.write_push(Segment::Constant, code)?;
            self.writer.write_call("String.appendChar", 2)?;
        }
        Ok(())
    }

    /// Compile a call whose leading identifier `name` has just been consumed.
    ///
    /// - `name(args)`: a method on the current object; `this` is passed first.
    /// - `var.sub(args)`: a method on the object held by `var`, dispatched on
    ///   the variable's declared type; the object is passed first.
    /// - `Class.sub(args)`: a function or constructor; no implicit argument.
    pub(crate) fn compile_subroutine_call(&mut self, name: &str) -> CompileResult<()> {
        let span = self.tokenizer.current_span();
        let (callee, implicit_args) = if self.tokenizer.is_symbol('.') {
            self.tokenizer.advance();
            let subroutine = self.expect_identifier()?;
            match self.symbols.lookup(name).cloned() {
                Some(receiver) => {
                    self.writer.write_push(receiver.kind.segment(), receiver.index)?;
                    (format!("{}.{}", receiver.ty, subroutine), 1)
                }
                None => (format!("{}.{}", name, subroutine), 0),
            }
        } else {
            self.writer.write_push(Segment::Pointer, 0)?;
            (format!("{}.{}", self.class_name, name), 1)
        };

        self.expect_symbol('(')?;
        let n_args = self.compile_expression_list()?;
        self.expect_symbol(')')?;
        let n_args = n_args
            .checked_add(implicit_args)
            .ok_or_else(|| CompileError::limit_exceeded("call arguments", span))?;
        self.writer.write_call(&callee, n_args)?;
        Ok(())
    }

    /// `(expr (, expr)*)?`, returning how many expressions were compiled.
    pub(crate) fn compile_expression_list(&mut self) -> CompileResult<u16> {
        if self.tokenizer.is_symbol(')') {
            return Ok(0);
        }
        let mut count: u16 = 0;
        loop {
            let span = self.tokenizer.current_span();
            self.compile_expression()?;
            count = count
                .checked_add(1)
                .ok_or_else(|| CompileError::limit_exceeded("call arguments", span))?;
            if self.tokenizer.is_symbol(',') {
                self.tokenizer.advance();
            } else {
                return Ok(count);
            }
        }
    }
}
