//! Class, class-variable and subroutine declarations.

use std::io::Write;

use crate::lexer::Keyword;
use crate::symbol_table::Kind;
use crate::vm::Segment;

use super::core::{CompileResult, Compiler};

impl<W: Write> Compiler<W> {
    /// `class Name { classVarDec* subroutineDec* }`
    ///
    /// Declarations are handled strictly in file order. A field declared after
    /// a subroutine is not visible inside that subroutine.
    pub(crate) fn compile_class(&mut self) -> CompileResult<()> {
        self.expect_keyword(Keyword::Class)?;
        self.class_name = self.expect_identifier()?;
        self.expect_symbol('{')?;

        loop {
            match self.current_keyword() {
                Some(Keyword::Static | Keyword::Field) => self.compile_class_var_dec()?,
                Some(Keyword::Constructor | Keyword::Function | Keyword::Method) => {
                    self.compile_subroutine()?
                }
                _ => break,
            }
        }

        self.expect_symbol('}')?;
        if self.tokenizer.has_more_tokens() {
            return Err(self.syntax_error("end of file"));
        }
        Ok(())
    }

    /// `(static | field) type name (, name)* ;`
    fn compile_class_var_dec(&mut self) -> CompileResult<()> {
        let kind = match self.current_keyword() {
            Some(Keyword::Static) => Kind::Static,
            Some(Keyword::Field) => Kind::Field,
            _ => return Err(self.syntax_error("'static' or 'field'")),
        };
        self.tokenizer.advance();
        self.compile_names(kind)
    }

    /// `var type name (, name)* ;`
    fn compile_var_dec(&mut self) -> CompileResult<()> {
        self.expect_keyword(Keyword::Var)?;
        self.compile_names(Kind::Local)
    }

    fn compile_names(&mut self, kind: Kind) -> CompileResult<()> {
        let ty = self.compile_type(false)?;
        loop {
            let span = self.tokenizer.current_span();
            let name = self.expect_identifier()?;
            self.define(&name, &ty, kind, span)?;
            if self.tokenizer.is_symbol(',') {
                self.tokenizer.advance();
            } else {
                break;
            }
        }
        self.expect_symbol(';')
    }

    /// `int | char | boolean | ClassName`, plus `void` for return types.
    fn compile_type(&mut self, allow_void: bool) -> CompileResult<String> {
        let ty = match self.current_keyword() {
            Some(k @ (Keyword::Int | Keyword::Char | Keyword::Boolean)) => k.as_str().to_string(),
            Some(Keyword::Void) if allow_void => Keyword::Void.as_str().to_string(),
            Some(_) => return Err(self.syntax_error("type")),
            None => self.tokenizer.identifier()?.to_string(),
        };
        self.tokenizer.advance();
        Ok(ty)
    }

    /// `(constructor | function | method) type name ( parameterList ) body`
    fn compile_subroutine(&mut self) -> CompileResult<()> {
        self.symbols.start_subroutine();

        let subroutine_kind = self.tokenizer.keyword()?;
        self.tokenizer.advance();
        self.compile_type(true)?;
        let span = self.tokenizer.current_span();
        let name = self.expect_identifier()?;

        if subroutine_kind == Keyword::Method {
            let class_name = self.class_name.clone();
            self.define("this", &class_name, Kind::Argument, span)?;
        }

        self.expect_symbol('(')?;
        self.compile_parameter_list()?;
        self.expect_symbol(')')?;

        self.expect_symbol('{')?;
        while self.tokenizer.is_keyword(Keyword::Var) {
            self.compile_var_dec()?;
        }

        let full_name = format!("{}.{}", self.class_name, name);
        let n_locals = self.symbols.var_count(Kind::Local);
        self.writer.write_function(&full_name, n_locals)?;

        match subroutine_kind {
            Keyword::Constructor => {
                let n_fields = self.symbols.var_count(Kind::Field);
                self.writer.write_push(Segment::Constant, n_fields)?;
                self.writer.write_call("Memory.alloc", 1)?;
                self.writer.write_pop(Segment::Pointer, 0)?;
            }
            Keyword::Method => {
                self.writer.write_push(Segment::Argument, 0)?;
                self.writer.write_pop(Segment::Pointer, 0)?;
            }
            _ => {}
        }

        self.compile_statements()?;
        self.expect_symbol('}')
    }

    /// `((type name) (, type name)*)?`
    fn compile_parameter_list(&mut self) -> CompileResult<()> {
        if self.tokenizer.is_symbol(')') {
            return Ok(());
        }
        loop {
            let ty = self.compile_type(false)?;
            let span = self.tokenizer.current_span();
            let name = self.expect_identifier()?;
            self.define(&name, &ty, Kind::Argument, span)?;
            if self.tokenizer.is_symbol(',') {
                self.tokenizer.advance();
            } else {
                return Ok(());
            }
        }
    }
}
