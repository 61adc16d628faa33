//! Microcode build binary.
//!
//! Validates the instruction table, compiles every (opcode, cycle) into
//! control words, and writes the 24 ROM bank files plus the CSV trace
//! into `build/`. Takes no arguments; exits 0 on success, 1 when the
//! table is rejected, 2 on I/O failure.

use std::path::Path;
use std::process;

use mos_8502_ucode::rom::{self, RomImages};
use mos_8502_ucode::{instructions, trace, validate};

/// Output directory for ROM banks and the trace log.
const BUILD_DIR: &str = "build";
const LOG_NAME: &str = "microcode_log.csv";

fn main() {
    let table = match validate::validate(instructions::entries()) {
        Ok(table) => table,
        Err(errors) => {
            for error in &errors {
                eprintln!("error: {error}");
            }
            eprintln!("instruction table rejected: {} error(s)", errors.len());
            process::exit(1);
        }
    };
    println!("instruction table OK: {} opcodes", table.len());

    for opcode in validate::empty_entries(&table) {
        eprintln!("warning: opcode ${opcode:02X} has no cycles; its ROM slots stay zero");
    }

    let (images, warnings) = RomImages::build(&table);
    for warning in &warnings {
        eprintln!("warning: {warning}");
    }

    let dir = Path::new(BUILD_DIR);
    if let Err(e) = images.write_text_files(dir) {
        eprintln!("error: writing ROM banks to {}: {e}", dir.display());
        process::exit(2);
    }

    let log = dir.join(LOG_NAME);
    if let Err(e) = trace::write_csv(&table, &log) {
        eprintln!("error: writing {}: {e}", log.display());
        process::exit(2);
    }

    println!(
        "wrote {} ROM banks and {LOG_NAME} to {BUILD_DIR}/",
        rom::PLANES * rom::BANKS
    );
}
