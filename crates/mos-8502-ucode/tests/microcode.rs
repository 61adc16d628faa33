//! End-to-end tests: the shipped instruction table through the parser,
//! packer and ROM builder.

use std::fs;

use mos_8502_ucode::rom::{BANKS, BANK_WORDS, PLANES, RomImages};
use mos_8502_ucode::{ControlWord, compile, instructions, validate};

fn built_table() -> validate::InstructionTable {
    validate::validate(instructions::entries()).expect("shipped table is valid")
}

#[test]
fn the_shipped_table_passes_validation() {
    let table = built_table();
    assert_eq!(table.len(), 256);
    assert_eq!(validate::empty_entries(&table), Vec::<u8>::new());
}

#[test]
fn the_shipped_table_compiles_without_diagnostics() {
    let (_, warnings) = RomImages::build(&built_table());
    assert_eq!(warnings, Vec::<String>::new());
}

#[test]
fn compilation_is_deterministic() {
    for cycle in &built_table()[&0x00].cycles {
        assert_eq!(compile(cycle), compile(cycle));
    }
}

#[test]
fn case_does_not_change_a_single_bit() {
    for (_, entry) in built_table() {
        for cycle in &entry.cycles {
            let reference = compile(cycle);
            assert_eq!(reference, compile(&cycle.to_uppercase()));
            assert_eq!(reference, compile(&cycle.to_lowercase()));
        }
    }
}

#[test]
fn empty_source_compiles_to_zero_words() {
    assert_eq!(compile(""), ControlWord::ZERO);
}

#[test]
fn end_alone_sets_only_the_cycle_counter_reset() {
    assert_eq!(compile("END"), ControlWord { w2: 0, w1: 0, w0: 0x0002 });
}

// Known-good words, worked out by hand from the bit layout.

#[test]
fn opcode_fetch_word() {
    let word = compile("IR := *PC; PC += 1");
    assert_eq!(word.w2, 0x0004, "pc increment");
    assert_eq!(word.w1, 0x100A, "pc onto mux, read, data-bus in");
    assert_eq!(word.w0, 0x0011, "address out, IR load");
}

#[test]
fn sec_execute_word() {
    assert_eq!(
        compile("SETF(C); END"),
        ControlWord { w2: 0, w1: 0, w0: 0x4002 }
    );
}

#[test]
fn clc_execute_word() {
    assert_eq!(
        compile("CLRF(C); END"),
        ControlWord { w2: 0, w1: 0, w0: 0x2002 }
    );
}

#[test]
fn adc_immediate_execute_word() {
    let word = compile("ADC(A, DL); A := ALU_RESULT; ALU_FLAGS_LD; END");
    // flags load + ADC code + A load + A on the register mux
    assert_eq!(word.w2, 0x8C28);
    assert_eq!(word.w1, 0x0000);
    assert_eq!(word.w0, 0x0002);
}

#[test]
fn branch_offset_word() {
    let word = compile("ADL := *PC; PC += 1; TEST_BRANCH_EN; END");
    assert_eq!(word.w2, 0x0004);
    assert_eq!(word.w1, 0x140A, "pc source, ADL load, read, data-bus in");
    assert_eq!(word.w0, 0x001A, "address out, branch test, counter reset");
}

#[test]
fn rom_slots_match_their_cycles_and_the_rest_stay_zero() {
    let table = built_table();
    let (images, _) = RomImages::build(&table);

    for (&opcode, entry) in &table {
        for bank in 0..BANKS {
            let expected = entry
                .cycles
                .get(bank)
                .map_or(ControlWord::ZERO, |cycle| compile(cycle));
            assert_eq!(images.word(0, bank, opcode), expected.w0, "w0 {opcode:02X}/{bank}");
            assert_eq!(images.word(1, bank, opcode), expected.w1, "w1 {opcode:02X}/{bank}");
            assert_eq!(images.word(2, bank, opcode), expected.w2, "w2 {opcode:02X}/{bank}");
        }
    }
}

#[test]
fn every_opcode_terminates_with_the_counter_reset() {
    let table = built_table();
    for (opcode, entry) in table {
        let last = entry.cycles.last().expect("no empty entries shipped");
        assert_eq!(
            compile(last).w0 & 0x0002,
            0x0002,
            "{} {opcode:#04X} final cycle `{last}`",
            entry.mnemonic
        );
    }
}

#[test]
fn an_overlong_entry_fails_validation_before_any_output() {
    let mut entries = instructions::entries();
    for (opcode, entry) in &mut entries {
        if *opcode == 0xEA {
            entry.cycles = vec!["END".to_string(); 9];
        }
    }
    let errors = validate::validate(entries).expect_err("nine cycles");
    assert!(errors.iter().any(|e| matches!(
        e,
        validate::TableError::CycleBudgetExceeded { opcode: 0xEA, cycles: 9, .. }
    )));
}

#[test]
fn bank_files_hold_256_hex_lines_each() {
    let table = built_table();
    let (images, _) = RomImages::build(&table);

    let dir = std::env::temp_dir().join(format!("ucode-banks-{}", std::process::id()));
    images.write_text_files(&dir).expect("write banks");

    for plane in 0..PLANES {
        for bank in 0..BANKS {
            let path = dir.join(format!("w{plane}_bank{bank}.txt"));
            let text = fs::read_to_string(&path).expect("bank file");
            let lines: Vec<&str> = text.lines().collect();
            assert_eq!(lines.len(), BANK_WORDS, "{}", path.display());
            for (opcode, line) in lines.iter().enumerate() {
                assert_eq!(line.len(), 4);
                let word = u16::from_str_radix(line, 16).expect("hex line");
                assert_eq!(word, images.word(plane, bank, opcode as u8));
                assert_eq!(*line, format!("{word:04X}"), "uppercase, zero-padded");
            }
        }
    }

    fs::remove_dir_all(&dir).expect("cleanup");
}
