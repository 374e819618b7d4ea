//! Bytecode types for the Tern backend.
//!
//! - [`Instruction`] - the abstract instruction set handed to the writer
//! - [`Label`] and [`Condition`] - branch targets and branch tests
//! - [`MethodRef`] - symbolic reference to an invoked member

mod instruction;

pub use instruction::{Condition, Instruction, Label, MethodRef};
