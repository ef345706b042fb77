//! Jackc: a single-pass compiler from the Jack object-oriented language to
//! stack-based VM code.
//!
//! This is the library root that exports all modules.
//!
//! # Pipeline
//!
//! - `lexer`: source text to a complete token sequence with a forward cursor
//! - `symbol_table`: class-scope and subroutine-scope name resolution
//! - `compiler`: recursive descent that emits VM instructions while parsing
//! - `vm`: the instruction set and the text writer
//! - `driver`: compiling many files in parallel, one independent unit each

#![allow(clippy::new_without_default)]

pub mod compiler;
pub mod driver;
pub mod error;
pub mod lexer;
pub mod span;
pub mod symbol_table;
pub mod vm;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use error::JackError;

/// Extension of Jack source files.
pub const SOURCE_EXTENSION: &str = "jack";
/// Extension of generated VM files.
pub const OUTPUT_EXTENSION: &str = "vm";

/// Compile one class from `source`, writing VM code to `out`.
///
/// Fails on the first lexical or syntax error; anything already written to
/// `out` at that point is incomplete.
pub fn compile_class<W: Write>(source: &str, out: W) -> Result<W, JackError> {
    let tokenizer = lexer::Tokenizer::new(source)?;
    let out = compiler::Compiler::new(tokenizer, out).compile()?;
    Ok(out)
}

/// Compile one class and return the VM code as text.
pub fn compile_to_string(source: &str) -> Result<String, JackError> {
    let bytes = compile_class(source, Vec::new())?;
    let text =
        String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(text)
}

/// The `.vm` path written for a given `.jack` source.
pub fn output_path(source: &Path) -> PathBuf {
    source.with_extension(OUTPUT_EXTENSION)
}

/// Compile `path` and write the result next to it with a `.vm` extension.
///
/// The output file is only created once the whole class has compiled.
pub fn compile_file(path: &Path) -> Result<PathBuf, JackError> {
    let source = std::fs::read_to_string(path)?;
    let code = compile_class(&source, Vec::new())?;
    let out_path = output_path(path);
    std::fs::write(&out_path, code)?;
    Ok(out_path)
}
