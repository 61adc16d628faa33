//! Microcode assembler and control-ROM builder for the MOS 8501/8502.
//!
//! The 8502 re-implementation executes every opcode as up to eight
//! microcode cycles; each cycle is three 16-bit control words driving the
//! datapath muxes, register load enables, ALU, memory strobes and the
//! sequencer. This crate turns the symbolic per-opcode cycle lists into
//! the 24 ROM bank images the synthesised CPU consumes, plus a CSV trace
//! of every compiled word.

pub mod instructions;
pub mod parser;
pub mod rom;
pub mod signals;
pub mod trace;
pub mod validate;
pub mod word;

pub use parser::{ParsedCycle, parse_micro_op};
pub use signals::{AddrSource, AluOp, RegOut, SignalSet};
pub use validate::{InstructionTable, TableError};
pub use word::ControlWord;

/// Compile one symbolic cycle to its three control words.
#[must_use]
pub fn compile(source: &str) -> ControlWord {
    ControlWord::encode(&parse_micro_op(source).signals)
}
