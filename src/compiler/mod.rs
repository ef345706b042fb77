//! Single-pass compiler from Jack source to VM code.
//!
//! There is no syntax tree: each grammar rule emits its VM instructions as
//! soon as it recognizes its construct.

mod core;
mod declarations;
mod expressions;
mod statements;

#[cfg(test)]
mod tests;

pub use self::core::{CompileResult, Compiler};
