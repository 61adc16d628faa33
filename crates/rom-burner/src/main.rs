//! Burns compiled microcode ROM banks into the logic-simulator schematic.
//!
//! The schematic is a JSON document whose `SubChips` array carries one
//! pre-burned ROM chip per (word, bank) pair, labelled `w0b0`..`w2b7`.
//! Each chip's `InternalData` is replaced with the contents of the
//! matching `w<p>b<c>.rom` file from the ROM directory; every other key
//! in the document is preserved as-is. Takes no arguments.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;

use mos_8502_ucode::rom;
use serde_json::Value;

/// The simulator's save file for the CPU board.
const SCHEMATIC_PATH: &str = "schematic/MOS_8502.json";
/// Where `ucode-rom-gen` output lands after the `.rom` hand-off rename.
const ROM_DIR: &str = "build";

fn main() {
    let schematic_path = Path::new(SCHEMATIC_PATH);
    let text = match fs::read_to_string(schematic_path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("error: cannot read schematic {}: {e}", schematic_path.display());
            process::exit(2);
        }
    };
    let mut schematic: Value = match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(e) => {
            eprintln!("error: schematic {} is not valid JSON: {e}", schematic_path.display());
            process::exit(2);
        }
    };

    let rom_dir = Path::new(ROM_DIR);
    let files = match rom_files(rom_dir) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("error: cannot scan ROM directory {}: {e}", rom_dir.display());
            process::exit(2);
        }
    };

    let mut injected = BTreeSet::new();
    for (label, path) in files {
        let words = match read_rom_hex(&path) {
            Ok(words) => words,
            Err(e) => {
                eprintln!("warning: skipping {}: {e}", path.display());
                continue;
            }
        };
        if inject(&mut schematic, &label, &words) {
            println!("burned {label} ({} words)", words.len());
            injected.insert(label);
        } else {
            eprintln!("warning: no sub-chip labelled `{label}` in schematic");
        }
    }

    let missing: Vec<String> = expected_labels()
        .into_iter()
        .filter(|label| !injected.contains(label))
        .collect();
    if !missing.is_empty() {
        eprintln!(
            "warning: {} bank(s) not burned: {}",
            missing.len(),
            missing.join(", ")
        );
    }

    if injected.is_empty() {
        eprintln!("nothing burned; schematic left untouched");
        process::exit(1);
    }

    let mut pretty = match serde_json::to_string_pretty(&schematic) {
        Ok(pretty) => pretty,
        Err(e) => {
            eprintln!("error: cannot serialise schematic: {e}");
            process::exit(2);
        }
    };
    pretty.push('\n');
    if let Err(e) = fs::write(schematic_path, pretty) {
        eprintln!("error: writing {}: {e}", schematic_path.display());
        process::exit(2);
    }

    println!(
        "schematic updated: {}/{} banks burned",
        injected.len(),
        rom::PLANES * rom::BANKS
    );
}

/// The full label set we expect to burn: w0b0 .. w2b7.
fn expected_labels() -> Vec<String> {
    let mut labels = Vec::with_capacity(rom::PLANES * rom::BANKS);
    for plane in 0..rom::PLANES {
        for bank in 0..rom::BANKS {
            labels.push(rom::bank_label(plane, bank));
        }
    }
    labels
}

/// ROM files in the directory whose names match `w<p>b<c>.rom`, with the
/// chip label each one feeds. Non-matching files are ignored.
fn rom_files(dir: &Path) -> io::Result<Vec<(String, PathBuf)>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if let Some(label) = bank_label_for(name) {
            files.push((label, entry.path()));
        }
    }
    files.sort();
    Ok(files)
}

/// Parse a `w<p>b<c>.rom` filename into its chip label.
fn bank_label_for(file_name: &str) -> Option<String> {
    let stem = file_name.strip_suffix(".rom")?;
    let rest = stem.strip_prefix('w')?;
    let (plane, bank) = rest.split_once('b')?;
    let plane: usize = plane.parse().ok()?;
    let bank: usize = bank.parse().ok()?;
    if plane < rom::PLANES && bank < rom::BANKS {
        Some(rom::bank_label(plane, bank))
    } else {
        None
    }
}

/// One hexadecimal word per non-empty line.
fn read_rom_hex(path: &Path) -> Result<Vec<u64>, String> {
    let text = fs::read_to_string(path).map_err(|e| e.to_string())?;
    let mut words = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let word = u64::from_str_radix(line, 16)
            .map_err(|e| format!("line {}: `{line}`: {e}", lineno + 1))?;
        words.push(word);
    }
    Ok(words)
}

/// Replace the `InternalData` of the sub-chip with the given label.
/// Returns false when no such chip exists.
fn inject(schematic: &mut Value, label: &str, words: &[u64]) -> bool {
    let Some(chip) = chip_by_label(schematic, label) else {
        return false;
    };
    chip["InternalData"] = Value::from(words.to_vec());
    true
}

fn chip_by_label<'a>(schematic: &'a mut Value, label: &str) -> Option<&'a mut Value> {
    schematic
        .get_mut("SubChips")?
        .as_array_mut()?
        .iter_mut()
        .find(|chip| chip.get("Label").and_then(Value::as_str) == Some(label))
}
