//! ROM bank images for the three control-word planes.
//!
//! The sequencer addresses eight banks per plane, one per cycle slot;
//! each bank holds one 16-bit word per opcode. Opcodes shorter than
//! eight cycles leave their trailing banks zero-filled — the hardware
//! never reaches them because the END word resets the cycle counter.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::parser::parse_micro_op;
use crate::validate::InstructionTable;
use crate::word::ControlWord;

/// Control-word planes (w0, w1, w2).
pub const PLANES: usize = 3;
/// Cycle-slot banks per plane.
pub const BANKS: usize = 8;
/// Words per bank, one per opcode.
pub const BANK_WORDS: usize = 256;

/// Chip label for one ROM bank, as the schematic names it.
#[must_use]
pub fn bank_label(plane: usize, bank: usize) -> String {
    format!("w{plane}b{bank}")
}

/// The 24 compiled ROM banks.
pub struct RomImages {
    /// `planes[w][bank][opcode]`; the plane index is the word number.
    planes: [[[u16; BANK_WORDS]; BANKS]; PLANES],
}

impl RomImages {
    /// Compile every cycle of every opcode into its bank slot.
    ///
    /// Returns the images together with any parser diagnostics, tagged
    /// with the opcode and cycle they came from. Cycles past the bank
    /// count never reach this point (the validator rejects them).
    #[must_use]
    pub fn build(table: &InstructionTable) -> (Self, Vec<String>) {
        let mut images = Self {
            planes: [[[0; BANK_WORDS]; BANKS]; PLANES],
        };
        let mut warnings = Vec::new();

        for (&opcode, entry) in table {
            for (slot, cycle) in entry.cycles.iter().take(BANKS).enumerate() {
                let parsed = parse_micro_op(cycle);
                for warning in parsed.warnings {
                    warnings.push(format!(
                        "opcode ${opcode:02X} ({}) cycle {slot}: {warning}",
                        entry.mnemonic
                    ));
                }
                let word = ControlWord::encode(&parsed.signals);
                images.planes[0][slot][opcode as usize] = word.w0;
                images.planes[1][slot][opcode as usize] = word.w1;
                images.planes[2][slot][opcode as usize] = word.w2;
            }
        }

        (images, warnings)
    }

    /// One compiled word.
    #[must_use]
    pub fn word(&self, plane: usize, bank: usize, opcode: u8) -> u16 {
        self.planes[plane][bank][opcode as usize]
    }

    /// One full bank, opcode-indexed.
    #[must_use]
    pub fn bank(&self, plane: usize, bank: usize) -> &[u16; BANK_WORDS] {
        &self.planes[plane][bank]
    }

    /// Write all 24 banks as `w<p>_bank<c>.txt`, 256 four-digit
    /// uppercase hex lines each.
    pub fn write_text_files(&self, dir: &Path) -> io::Result<()> {
        fs::create_dir_all(dir)?;
        for plane in 0..PLANES {
            for bank in 0..BANKS {
                let path = dir.join(format!("w{plane}_bank{bank}.txt"));
                let mut out = BufWriter::new(File::create(path)?);
                for word in self.bank(plane, bank) {
                    writeln!(out, "{word:04X}")?;
                }
                out.flush()?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile;
    use crate::instructions::InstructionEntry;
    use crate::validate::validate;

    fn table_of(entries: Vec<(u8, InstructionEntry)>) -> InstructionTable {
        validate(entries).expect("valid table")
    }

    fn entry(cycles: &[&str]) -> InstructionEntry {
        InstructionEntry {
            mnemonic: "TST",
            addressing: "impl",
            cycles: cycles.iter().map(|c| (*c).to_string()).collect(),
        }
    }

    #[test]
    fn compiled_words_land_in_their_slots() {
        let table = table_of(vec![(
            0xEA,
            entry(&["IR := *PC; PC += 1", "SETF(C); END"]),
        )]);
        let (images, warnings) = RomImages::build(&table);
        assert!(warnings.is_empty());

        let fetch = compile("IR := *PC; PC += 1");
        assert_eq!(images.word(2, 0, 0xEA), fetch.w2);
        assert_eq!(images.word(1, 0, 0xEA), fetch.w1);
        assert_eq!(images.word(0, 0, 0xEA), fetch.w0);
        assert_eq!(images.word(0, 1, 0xEA), compile("SETF(C); END").w0);
    }

    #[test]
    fn unused_slots_stay_zero() {
        let table = table_of(vec![(0x80, entry(&["END"]))]);
        let (images, _) = RomImages::build(&table);
        for plane in 0..PLANES {
            for bank in 1..BANKS {
                assert_eq!(images.word(plane, bank, 0x80), 0);
            }
            for opcode in (0u8..=255).filter(|&o| o != 0x80) {
                assert_eq!(images.word(plane, 0, opcode), 0);
            }
        }
    }

    #[test]
    fn parser_diagnostics_carry_their_origin() {
        let table = table_of(vec![(0x42, entry(&["A := FROB; END"]))]);
        let (_, warnings) = RomImages::build(&table);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("opcode $42 (TST) cycle 0:"));
    }

    #[test]
    fn bank_labels_follow_the_schematic_convention() {
        assert_eq!(bank_label(0, 0), "w0b0");
        assert_eq!(bank_label(2, 7), "w2b7");
    }
}
