//! Human-readable compilation log.
//!
//! One CSV row per (opcode, cycle): the symbolic source next to the three
//! hex words it compiled to. This is the file to stare at when the
//! simulated CPU wedges on a bad bus.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::compile;
use crate::validate::InstructionTable;

/// Write the trace log to `path`, one row per (opcode, cycle), opcodes
/// ascending.
pub fn write_csv(table: &InstructionTable, path: &Path) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_rows(table, &mut out)?;
    out.flush()
}

fn write_rows<W: Write>(table: &InstructionTable, out: &mut W) -> io::Result<()> {
    writeln!(out, "Opcode,Mnemonic,Addressing,Cycle,Symbolic Code,W2,W1,W0")?;
    for (&opcode, entry) in table {
        for (slot, cycle) in entry.cycles.iter().enumerate() {
            let word = compile(cycle);
            let source = if cycle.trim().is_empty() { "NO-OP" } else { cycle };
            writeln!(
                out,
                "{opcode:02X},{},{},{slot},{},{:04X},{:04X},{:04X}",
                field(entry.mnemonic),
                field(entry.addressing),
                field(source),
                word.w2,
                word.w1,
                word.w0,
            )?;
        }
    }
    Ok(())
}

/// Quote a field when it carries CSV metacharacters (`ADC(A, DL)` and
/// `abs,X` both do).
fn field(raw: &str) -> String {
    if raw.contains(',') || raw.contains('"') || raw.contains('\n') {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}
