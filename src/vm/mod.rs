//! Target VM instruction set and the text emitter that writes it.

pub mod instruction;
pub mod writer;

pub use instruction::{Command, Instruction, Segment};
pub use writer::VmWriter;
