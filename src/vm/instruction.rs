//! VM instruction set and its canonical text form.

use std::fmt;

/// A named memory region of the target VM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    Constant,
    Argument,
    Local,
    Static,
    This,
    That,
    Pointer,
    Temp,
}

impl Segment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::Constant => "constant",
            Segment::Argument => "argument",
            Segment::Local => "local",
            Segment::Static => "static",
            Segment::This => "this",
            Segment::That => "that",
            Segment::Pointer => "pointer",
            Segment::Temp => "temp",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arithmetic and logical primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Add => "add",
            Command::Sub => "sub",
            Command::Neg => "neg",
            Command::Eq => "eq",
            Command::Gt => "gt",
            Command::Lt => "lt",
            Command::And => "and",
            Command::Or => "or",
            Command::Not => "not",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single VM instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Push(Segment, u16),
    Pop(Segment, u16),
    Arithmetic(Command),
    Label(String),
    Goto(String),
    IfGoto(String),
    /// Call a function with N arguments already pushed.
    Call(String, u16),
    /// Function entry with its number of local variables.
    Function(String, u16),
    Return,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Push(segment, index) => write!(f, "push {} {}", segment, index),
            Instruction::Pop(segment, index) => write!(f, "pop {} {}", segment, index),
            Instruction::Arithmetic(command) => write!(f, "{}", command),
            Instruction::Label(label) => write!(f, "label {}", label),
            Instruction::Goto(label) => write!(f, "goto {}", label),
            Instruction::IfGoto(label) => write!(f, "if-goto {}", label),
            Instruction::Call(name, n_args) => write!(f, "call {} {}", name, n_args),
            Instruction::Function(name, n_locals) => write!(f, "function {} {}", name, n_locals),
            Instruction::Return => write!(f, "return"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_text() {
        let cases = [
            (Instruction::Push(Segment::Constant, 7), "push constant 7"),
            (Instruction::Pop(Segment::Pointer, 1), "pop pointer 1"),
            (Instruction::Arithmetic(Command::Neg), "neg"),
            (Instruction::Label("Main.L0".into()), "label Main.L0"),
            (Instruction::Goto("Main.L1".into()), "goto Main.L1"),
            (Instruction::IfGoto("Main.L1".into()), "if-goto Main.L1"),
            (Instruction::Call("Math.multiply".into(), 2), "call Math.multiply 2"),
            (Instruction::Function("Main.main".into(), 3), "function Main.main 3"),
            (Instruction::Return, "return"),
        ];
        for (instruction, text) in cases {
            assert_eq!(instruction.to_string(), text);
        }
    }
}
