//! Instruction sink: appends one canonical text line per instruction.

use std::io::{self, Write};

use super::instruction::{Command, Instruction, Segment};

/// Writes VM instructions to any byte destination, in emission order.
///
/// No buffering beyond what `W` does and no validation of operands.
pub struct VmWriter<W: Write> {
    out: W,
}

impl<W: Write> VmWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn write(&mut self, instruction: &Instruction) -> io::Result<()> {
        writeln!(self.out, "{}", instruction)
    }

    pub fn write_push(&mut self, segment: Segment, index: u16) -> io::Result<()> {
        self.write(&Instruction::Push(segment, index))
    }

    pub fn write_pop(&mut self, segment: Segment, index: u16) -> io::Result<()> {
        self.write(&Instruction::Pop(segment, index))
    }

    pub fn write_arithmetic(&mut self, command: Command) -> io::Result<()> {
        self.write(&Instruction::Arithmetic(command))
    }

    pub fn write_label(&mut self, label: &str) -> io::Result<()> {
        self.write(&Instruction::Label(label.to_string()))
    }

    pub fn write_goto(&mut self, label: &str) -> io::Result<()> {
        self.write(&Instruction::Goto(label.to_string()))
    }

    pub fn write_if(&mut self, label: &str) -> io::Result<()> {
        self.write(&Instruction::IfGoto(label.to_string()))
    }

    pub fn write_call(&mut self, name: &str, n_args: u16) -> io::Result<()> {
        self.write(&Instruction::Call(name.to_string(), n_args))
    }

    pub fn write_function(&mut self, name: &str, n_locals: u16) -> io::Result<()> {
        self.write(&Instruction::Function(name.to_string(), n_locals))
    }

    pub fn write_return(&mut self) -> io::Result<()> {
        self.write(&Instruction::Return)
    }

    /// Flush and hand back the destination.
    pub fn into_inner(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}
