//! Instruction-table validation ahead of ROM emission.

use std::collections::BTreeMap;
use std::fmt;

use crate::instructions::InstructionEntry;

/// Hard sequencer limit: eight cycle slots per opcode.
pub const MAX_CYCLES: usize = 8;

/// The validated table, keyed and iterated by opcode.
pub type InstructionTable = BTreeMap<u8, InstructionEntry>;

#[derive(Debug)]
pub enum TableError {
    DuplicateOpcode(u8),
    CycleBudgetExceeded {
        opcode: u8,
        mnemonic: String,
        cycles: usize,
    },
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateOpcode(opcode) => {
                write!(f, "opcode ${opcode:02X} defined more than once")
            }
            Self::CycleBudgetExceeded {
                opcode,
                mnemonic,
                cycles,
            } => write!(
                f,
                "opcode ${opcode:02X} ({mnemonic}) takes {cycles} cycles, hardware allows {MAX_CYCLES}"
            ),
        }
    }
}

impl std::error::Error for TableError {}

/// Check every entry against the hardware limits and build the opcode
/// map. All offending opcodes are reported, not just the first.
pub fn validate(entries: Vec<(u8, InstructionEntry)>) -> Result<InstructionTable, Vec<TableError>> {
    let mut errors = Vec::new();
    let mut table = InstructionTable::new();
    for (opcode, entry) in entries {
        if entry.cycles.len() > MAX_CYCLES {
            errors.push(TableError::CycleBudgetExceeded {
                opcode,
                mnemonic: entry.mnemonic.to_string(),
                cycles: entry.cycles.len(),
            });
        }
        if table.insert(opcode, entry).is_some() {
            errors.push(TableError::DuplicateOpcode(opcode));
        }
    }
    if errors.is_empty() { Ok(table) } else { Err(errors) }
}

/// Opcodes whose cycle list is empty. Legal (their ROM slots stay zero)
/// but almost always an authoring mistake, so the build warns.
#[must_use]
pub fn empty_entries(table: &InstructionTable) -> Vec<u8> {
    table
        .iter()
        .filter(|(_, entry)| entry.cycles.is_empty())
        .map(|(&opcode, _)| opcode)
        .collect()
}
