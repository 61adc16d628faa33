//! Microcode instruction table for the 8501/8502.
//!
//! Pure data: every opcode maps to a mnemonic, an addressing tag and the
//! ordered cycle strings the compiler turns into ROM words. The common
//! addressing shapes are synthesised by the builder helpers below;
//! control-flow and stack sequences are written out by hand.
//!
//! Authoring conventions: cycle 0 of every opcode is the overlap fetch
//! (the next opcode lands in IR while the current one finishes), operands
//! travel through DL or the ADL/ADH latch pair, and read-modify-write
//! sequences rely on the effective address latched by the read cycle, so
//! the write-back never re-asserts the index adders.

/// One opcode's worth of table data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionEntry {
    pub mnemonic: &'static str,
    pub addressing: &'static str,
    pub cycles: Vec<String>,
}

/// Overlap fetch executed as cycle 0 of every opcode.
pub const FETCH: &str = "IR := *PC; PC += 1";

const OPERAND_TO_DL: &str = "DL := *PC; PC += 1";
const OPERAND_TO_ADL: &str = "ADL := *PC; PC += 1";
const OPERAND_TO_ADH: &str = "ADH := *PC; PC += 1";

// Address-source keys as they appear in micro-op text.
const ZP: &str = "{ZEROPAGE}";
const LATCH: &str = "{LATCH}";
const LATCH_INC: &str = "{LATCH_INC}";
const ZP_IND: &str = "{ZEROPAGE_INDIRECT}";
const ZP_IND_INC: &str = "{ZEROPAGE_INDIRECT_INC}";
const ZP_X_PTR: &str = "{CALCULATE_ZP_X_POINTER}";
const IRQ_LSB: &str = "{IRQ_LSB}";
const IRQ_MSB: &str = "{IRQ_MSB}";

/// Memory addressing shapes shared by the read/store/RMW builders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Zp,
    ZpX,
    ZpY,
    Abs,
    AbsX,
    AbsY,
    IndX,
    IndY,
}

impl Mode {
    /// Cycles from the fetch up to a resolved effective address.
    fn prefix(self) -> Vec<String> {
        match self {
            Self::Zp | Self::ZpX | Self::ZpY => strings(&[FETCH, OPERAND_TO_ADL]),
            Self::Abs | Self::AbsX | Self::AbsY => {
                strings(&[FETCH, OPERAND_TO_ADL, OPERAND_TO_ADH])
            }
            Self::IndX => vec![
                FETCH.into(),
                OPERAND_TO_DL.into(),
                format!("ADL := *{ZP_X_PTR}"),
                format!("ADH := *{ZP_IND_INC}"),
            ],
            Self::IndY => vec![
                FETCH.into(),
                OPERAND_TO_DL.into(),
                format!("ADL := *{ZP_IND}"),
                format!("ADH := *{ZP_IND_INC}"),
            ],
        }
    }

    /// Address-source key for the data access.
    fn source(self) -> &'static str {
        match self {
            Self::Zp | Self::ZpX | Self::ZpY => ZP,
            _ => LATCH,
        }
    }

    /// Index-adder suffix on the data access.
    fn index(self) -> &'static str {
        match self {
            Self::ZpX | Self::AbsX => "+X",
            Self::ZpY | Self::AbsY | Self::IndY => "+Y",
            _ => "",
        }
    }
}

fn strings(cycles: &[&str]) -> Vec<String> {
    cycles.iter().map(|c| (*c).to_string()).collect()
}

/// Fetch plus one execute cycle (implied operations).
fn implied(exec: &str) -> Vec<String> {
    strings(&[FETCH, exec])
}

/// Immediate operand into DL, then execute.
fn imm(exec: &str) -> Vec<String> {
    strings(&[FETCH, OPERAND_TO_DL, exec])
}

/// Memory read into DL, then execute.
fn read(mode: Mode, exec: &str) -> Vec<String> {
    let mut cycles = mode.prefix();
    cycles.push(format!("DL := *{}{}", mode.source(), mode.index()));
    cycles.push(exec.into());
    cycles
}

/// Memory read whose value is discarded (the multi-byte NOPs).
fn read_discard(mode: Mode) -> Vec<String> {
    let mut cycles = mode.prefix();
    cycles.push(format!("DL := *{}{}; END", mode.source(), mode.index()));
    cycles
}

/// Store a register (or other producer) to memory.
fn store(mode: Mode, rhs: &str) -> Vec<String> {
    let mut cycles = mode.prefix();
    cycles.push(format!("*{}{} := {rhs}; END", mode.source(), mode.index()));
    cycles
}

/// Store A AND X (the SAX/SHA family, stable form).
fn store_a_and_x(mode: Mode) -> Vec<String> {
    let mut cycles = mode.prefix();
    cycles.push(format!(
        "AND(A, X); *{}{} := ALU_RESULT; END",
        mode.source(),
        mode.index()
    ));
    cycles
}

/// Read-modify-write: read, run the ALU, write back to the latched
/// effective address.
fn rmw(mode: Mode, alu: &str) -> Vec<String> {
    let mut cycles = mode.prefix();
    cycles.push(format!("DL := *{}{}", mode.source(), mode.index()));
    cycles.push(format!("{alu}(DL); ALU_FLAGS_LD"));
    cycles.push(format!("*{} := ALU_RESULT; END", mode.source()));
    cycles
}

/// Undocumented RMW combo: modify memory, then fold the result into A.
/// Worst case (indirect modes) lands exactly on the 8-cycle budget.
fn rmw_combo(mode: Mode, alu: &str, exec: &str) -> Vec<String> {
    let mut cycles = mode.prefix();
    cycles.push(format!("DL := *{}{}", mode.source(), mode.index()));
    cycles.push(format!("{alu}(DL); ALU_FLAGS_LD"));
    cycles.push(format!("*{} := ALU_RESULT", mode.source()));
    cycles.push(exec.into());
    cycles
}

/// Two-cycle conditional branch; the taken path is fetched only when the
/// branch test fires, because the not-taken word already carries END.
fn branch() -> Vec<String> {
    vec![
        FETCH.into(),
        "ADL := *PC; PC += 1; TEST_BRANCH_EN; END".into(),
        "PC := {PC_PLUS_OFFSET}; END".into(),
    ]
}

// Execute-cycle shapes.

/// Binary ALU operation against A with write-back and flags.
fn exec_a(alu: &str) -> String {
    format!("{alu}(A, DL); A := ALU_RESULT; ALU_FLAGS_LD; END")
}

/// Route DL through the ALU into a register, setting N/Z.
fn load(reg: &str) -> String {
    format!("PASS(DL); {reg} := ALU_RESULT; ALU_FLAGS_LD; END")
}

/// Compare a register against DL; flags only.
fn compare(reg: &str) -> String {
    format!("CMP({reg}, DL); ALU_FLAGS_LD; END")
}

/// Shift/rotate the accumulator in place.
fn shift_a(alu: &str) -> String {
    format!("{alu}(A); A := ALU_RESULT; ALU_FLAGS_LD; END")
}

/// Increment/decrement a register in place.
fn step(reg: &str, alu: &str) -> String {
    format!("{alu}({reg}); {reg} := ALU_RESULT; ALU_FLAGS_LD; END")
}

/// Register-to-register transfer through the ALU (sets N/Z).
fn transfer(dst: &str, src: &str) -> String {
    format!("PASS({src}); {dst} := ALU_RESULT; ALU_FLAGS_LD; END")
}

/// The complete 256-opcode table, in raw form (validation happens in
/// `validate`). Every slot of the opcode matrix is populated, including
/// the undocumented column.
#[must_use]
pub fn entries() -> Vec<(u8, InstructionEntry)> {
    let mut table: Vec<(u8, InstructionEntry)> = Vec::with_capacity(256);
    {
        let add = &mut |opcode: u8,
                        mnemonic: &'static str,
                        addressing: &'static str,
                        cycles: Vec<String>| {
            table.push((
                opcode,
                InstructionEntry {
                    mnemonic,
                    addressing,
                    cycles,
                },
            ));
        };

        // === ALU column (cc=01): ORA AND EOR ADC LDA CMP SBC + STA ===

        for (base, mnemonic, exec) in [
            (0x00, "ORA", exec_a("ORA")),
            (0x20, "AND", exec_a("AND")),
            (0x40, "EOR", exec_a("XOR")),
            (0x60, "ADC", exec_a("ADC")),
            (0xA0, "LDA", load("A")),
            (0xC0, "CMP", compare("A")),
            (0xE0, "SBC", exec_a("SBC")),
        ] {
            add(base + 0x01, mnemonic, "(zp,X)", read(Mode::IndX, &exec));
            add(base + 0x05, mnemonic, "zp", read(Mode::Zp, &exec));
            add(base + 0x09, mnemonic, "#imm", imm(&exec));
            add(base + 0x0D, mnemonic, "abs", read(Mode::Abs, &exec));
            add(base + 0x11, mnemonic, "(zp),Y", read(Mode::IndY, &exec));
            add(base + 0x15, mnemonic, "zp,X", read(Mode::ZpX, &exec));
            add(base + 0x19, mnemonic, "abs,Y", read(Mode::AbsY, &exec));
            add(base + 0x1D, mnemonic, "abs,X", read(Mode::AbsX, &exec));
        }

        add(0x81, "STA", "(zp,X)", store(Mode::IndX, "A"));
        add(0x85, "STA", "zp", store(Mode::Zp, "A"));
        add(0x8D, "STA", "abs", store(Mode::Abs, "A"));
        add(0x91, "STA", "(zp),Y", store(Mode::IndY, "A"));
        add(0x95, "STA", "zp,X", store(Mode::ZpX, "A"));
        add(0x99, "STA", "abs,Y", store(Mode::AbsY, "A"));
        add(0x9D, "STA", "abs,X", store(Mode::AbsX, "A"));

        // === Shift column (cc=10): ASL ROL LSR ROR ===

        for (base, mnemonic, alu) in [
            (0x00, "ASL", "ASL"),
            (0x20, "ROL", "ROL"),
            (0x40, "LSR", "LSR"),
            (0x60, "ROR", "ROR"),
        ] {
            add(base + 0x06, mnemonic, "zp", rmw(Mode::Zp, alu));
            add(base + 0x0A, mnemonic, "A", implied(&shift_a(alu)));
            add(base + 0x0E, mnemonic, "abs", rmw(Mode::Abs, alu));
            add(base + 0x16, mnemonic, "zp,X", rmw(Mode::ZpX, alu));
            add(base + 0x1E, mnemonic, "abs,X", rmw(Mode::AbsX, alu));
        }

        // === Memory increment/decrement ===

        for (mnemonic, alu, in_zp, in_abs, in_zpx, in_absx) in [
            ("DEC", "DEC", 0xC6, 0xCE, 0xD6, 0xDE),
            ("INC", "INC", 0xE6, 0xEE, 0xF6, 0xFE),
        ] {
            add(in_zp, mnemonic, "zp", rmw(Mode::Zp, alu));
            add(in_abs, mnemonic, "abs", rmw(Mode::Abs, alu));
            add(in_zpx, mnemonic, "zp,X", rmw(Mode::ZpX, alu));
            add(in_absx, mnemonic, "abs,X", rmw(Mode::AbsX, alu));
        }

        // === Index register loads, stores, compares ===

        add(0xA2, "LDX", "#imm", imm(&load("X")));
        add(0xA6, "LDX", "zp", read(Mode::Zp, &load("X")));
        add(0xAE, "LDX", "abs", read(Mode::Abs, &load("X")));
        add(0xB6, "LDX", "zp,Y", read(Mode::ZpY, &load("X")));
        add(0xBE, "LDX", "abs,Y", read(Mode::AbsY, &load("X")));

        add(0xA0, "LDY", "#imm", imm(&load("Y")));
        add(0xA4, "LDY", "zp", read(Mode::Zp, &load("Y")));
        add(0xAC, "LDY", "abs", read(Mode::Abs, &load("Y")));
        add(0xB4, "LDY", "zp,X", read(Mode::ZpX, &load("Y")));
        add(0xBC, "LDY", "abs,X", read(Mode::AbsX, &load("Y")));

        add(0x86, "STX", "zp", store(Mode::Zp, "X"));
        add(0x8E, "STX", "abs", store(Mode::Abs, "X"));
        add(0x96, "STX", "zp,Y", store(Mode::ZpY, "X"));

        add(0x84, "STY", "zp", store(Mode::Zp, "Y"));
        add(0x8C, "STY", "abs", store(Mode::Abs, "Y"));
        add(0x94, "STY", "zp,X", store(Mode::ZpX, "Y"));

        add(0xE0, "CPX", "#imm", imm(&compare("X")));
        add(0xE4, "CPX", "zp", read(Mode::Zp, &compare("X")));
        add(0xEC, "CPX", "abs", read(Mode::Abs, &compare("X")));

        add(0xC0, "CPY", "#imm", imm(&compare("Y")));
        add(0xC4, "CPY", "zp", read(Mode::Zp, &compare("Y")));
        add(0xCC, "CPY", "abs", read(Mode::Abs, &compare("Y")));

        add(0x24, "BIT", "zp", read(Mode::Zp, &compare_bit()));
        add(0x2C, "BIT", "abs", read(Mode::Abs, &compare_bit()));

        // === Register-only operations ===

        add(0xAA, "TAX", "impl", implied(&transfer("X", "A")));
        add(0x8A, "TXA", "impl", implied(&transfer("A", "X")));
        add(0xA8, "TAY", "impl", implied(&transfer("Y", "A")));
        add(0x98, "TYA", "impl", implied(&transfer("A", "Y")));
        add(0xBA, "TSX", "impl", implied(&transfer("X", "SP")));
        // TXS is the one transfer that leaves the flags alone.
        add(0x9A, "TXS", "impl", implied("SP := X; END"));

        add(0xE8, "INX", "impl", implied(&step("X", "INC")));
        add(0xC8, "INY", "impl", implied(&step("Y", "INC")));
        add(0xCA, "DEX", "impl", implied(&step("X", "DEC")));
        add(0x88, "DEY", "impl", implied(&step("Y", "DEC")));

        // === Flag operations ===

        add(0x18, "CLC", "impl", implied("CLRF(C); END"));
        add(0x38, "SEC", "impl", implied("SETF(C); END"));
        add(0x58, "CLI", "impl", implied("CLRF(I); END"));
        add(0x78, "SEI", "impl", implied("SETF(I); END"));
        add(0xB8, "CLV", "impl", implied("CLRF(V); END"));
        add(0xD8, "CLD", "impl", implied("CLRF(D); END"));
        add(0xF8, "SED", "impl", implied("SETF(D); END"));

        // === Stack ===

        add(0x48, "PHA", "impl", implied("*SP := A; SP -= 1; END"));
        // PHP pushes P with the break bit forced high.
        add(0x08, "PHP", "impl", implied("SETF(B); *SP := P; SP -= 1; END"));
        add(
            0x68,
            "PLA",
            "impl",
            vec![
                FETCH.into(),
                "SP += 1".into(),
                "DL := *SP".into(),
                load("A"),
            ],
        );
        add(
            0x28,
            "PLP",
            "impl",
            strings(&[FETCH, "SP += 1", "P := *SP; END"]),
        );

        // === Control flow ===

        for (opcode, mnemonic) in [
            (0x10, "BPL"),
            (0x30, "BMI"),
            (0x50, "BVC"),
            (0x70, "BVS"),
            (0x90, "BCC"),
            (0xB0, "BCS"),
            (0xD0, "BNE"),
            (0xF0, "BEQ"),
        ] {
            add(opcode, mnemonic, "rel", branch());
        }

        add(
            0x4C,
            "JMP",
            "abs",
            strings(&[FETCH, OPERAND_TO_ADL, "ADH := *PC", "PC := {LATCH}; END"]),
        );
        add(
            0x6C,
            "JMP",
            "ind",
            vec![
                FETCH.into(),
                OPERAND_TO_ADL.into(),
                OPERAND_TO_ADH.into(),
                format!("TMP := *{LATCH}"),
                format!("ADH := *{LATCH_INC}"),
                "ADL := TMP".into(),
                "PC := {LATCH}; END".into(),
            ],
        );
        add(
            0x20,
            "JSR",
            "abs",
            strings(&[
                FETCH,
                OPERAND_TO_ADL,
                "*SP := PCH; SP -= 1",
                "*SP := PCL; SP -= 1",
                "ADH := *PC",
                "PC := {LATCH}; END",
            ]),
        );
        add(
            0x60,
            "RTS",
            "impl",
            strings(&[
                FETCH,
                "SP += 1",
                "ADL := *SP; SP += 1",
                "ADH := *SP",
                "PC := {LATCH}",
                "PC += 1; END",
            ]),
        );
        add(
            0x40,
            "RTI",
            "impl",
            strings(&[
                FETCH,
                "SP += 1",
                "P := *SP; SP += 1",
                "ADL := *SP; SP += 1",
                "ADH := *SP",
                "PC := {LATCH}; END",
            ]),
        );
        // Software interrupt: push PC+2 and P (break bit high), mask IRQs,
        // vector through $FFFE/$FFFF. Exactly the 8-cycle budget.
        add(
            0x00,
            "BRK",
            "impl",
            vec![
                FETCH.into(),
                "PC += 1".into(),
                "*SP := PCH; SP -= 1".into(),
                "*SP := PCL; SP -= 1".into(),
                "SETF(B); *SP := P; SP -= 1; SETF(I)".into(),
                format!("ADL := *{IRQ_LSB}"),
                format!("ADH := *{IRQ_MSB}"),
                "PC := {LATCH}; END".into(),
            ],
        );

        // === NOPs, documented and otherwise ===

        const NOP_CYCLE: &str = "IR := *PC; PC += 1; END";
        add(0xEA, "NOP", "impl", vec![NOP_CYCLE.into()]);
        for opcode in [0x1A, 0x3A, 0x5A, 0x7A, 0xDA, 0xFA] {
            add(opcode, "NOP", "impl", vec![NOP_CYCLE.into()]);
        }
        for opcode in [0x80, 0x82, 0x89, 0xC2, 0xE2] {
            add(
                opcode,
                "NOP",
                "#imm",
                strings(&[FETCH, "DL := *PC; PC += 1; END"]),
            );
        }
        for opcode in [0x04, 0x44, 0x64] {
            add(opcode, "NOP", "zp", read_discard(Mode::Zp));
        }
        for opcode in [0x14, 0x34, 0x54, 0x74, 0xD4, 0xF4] {
            add(opcode, "NOP", "zp,X", read_discard(Mode::ZpX));
        }
        add(0x0C, "NOP", "abs", read_discard(Mode::Abs));
        for opcode in [0x1C, 0x3C, 0x5C, 0x7C, 0xDC, 0xFC] {
            add(opcode, "NOP", "abs,X", read_discard(Mode::AbsX));
        }

        // === Jams: refetch the same opcode forever without advancing PC ===

        for opcode in [
            0x02, 0x12, 0x22, 0x32, 0x42, 0x52, 0x62, 0x72, 0x92, 0xB2, 0xD2, 0xF2,
        ] {
            add(opcode, "KIL", "impl", vec!["IR := *PC; END".into()]);
        }

        // === Undocumented RMW combos (cc=11) ===

        for (base, mnemonic, alu, exec) in [
            (0x00, "SLO", "ASL", exec_a("ORA")),
            (0x20, "RLA", "ROL", exec_a("AND")),
            (0x40, "SRE", "LSR", exec_a("XOR")),
            (0x60, "RRA", "ROR", exec_a("ADC")),
            (0xC0, "DCP", "DEC", compare("A")),
            (0xE0, "ISC", "INC", exec_a("SBC")),
        ] {
            add(base + 0x03, mnemonic, "(zp,X)", rmw_combo(Mode::IndX, alu, &exec));
            add(base + 0x07, mnemonic, "zp", rmw_combo(Mode::Zp, alu, &exec));
            add(base + 0x0F, mnemonic, "abs", rmw_combo(Mode::Abs, alu, &exec));
            add(base + 0x13, mnemonic, "(zp),Y", rmw_combo(Mode::IndY, alu, &exec));
            add(base + 0x17, mnemonic, "zp,X", rmw_combo(Mode::ZpX, alu, &exec));
            add(base + 0x1B, mnemonic, "abs,Y", rmw_combo(Mode::AbsY, alu, &exec));
            add(base + 0x1F, mnemonic, "abs,X", rmw_combo(Mode::AbsX, alu, &exec));
        }

        // === Undocumented loads and stores ===

        let lax = "PASS(DL); A := ALU_RESULT; X := ALU_RESULT; ALU_FLAGS_LD; END";
        add(0xA3, "LAX", "(zp,X)", read(Mode::IndX, lax));
        add(0xA7, "LAX", "zp", read(Mode::Zp, lax));
        add(0xAF, "LAX", "abs", read(Mode::Abs, lax));
        add(0xB3, "LAX", "(zp),Y", read(Mode::IndY, lax));
        add(0xB7, "LAX", "zp,Y", read(Mode::ZpY, lax));
        add(0xBF, "LAX", "abs,Y", read(Mode::AbsY, lax));

        add(0x83, "SAX", "(zp,X)", store_a_and_x(Mode::IndX));
        add(0x87, "SAX", "zp", store_a_and_x(Mode::Zp));
        add(0x8F, "SAX", "abs", store_a_and_x(Mode::Abs));
        add(0x97, "SAX", "zp,Y", store_a_and_x(Mode::ZpY));

        // The unstable high-byte stores, in their stable simplified form.
        add(0x93, "SHA", "(zp),Y", store_a_and_x(Mode::IndY));
        add(0x9F, "SHA", "abs,Y", store_a_and_x(Mode::AbsY));
        add(0x9C, "SHY", "abs,X", store(Mode::AbsX, "Y"));
        add(0x9E, "SHX", "abs,Y", store(Mode::AbsY, "X"));
        add(0x9B, "TAS", "abs,Y", {
            let mut cycles = Mode::AbsY.prefix();
            cycles.push("AND(A, X); SP := ALU_RESULT".into());
            cycles.push(format!("*{LATCH}+Y := SP; END"));
            cycles
        });
        add(
            0xBB,
            "LAS",
            "abs,Y",
            read(
                Mode::AbsY,
                "AND(SP, DL); A := ALU_RESULT; X := ALU_RESULT; SP := ALU_RESULT; \
                 ALU_FLAGS_LD; END",
            ),
        );

        // === Undocumented immediates ===

        add(0x0B, "ANC", "#imm", imm(&exec_a("AND")));
        add(0x2B, "ANC", "#imm", imm(&exec_a("AND")));
        add(
            0x4B,
            "ALR",
            "#imm",
            vec![
                FETCH.into(),
                OPERAND_TO_DL.into(),
                "AND(A, DL); A := ALU_RESULT".into(),
                shift_a("LSR"),
            ],
        );
        add(
            0x6B,
            "ARR",
            "#imm",
            vec![
                FETCH.into(),
                OPERAND_TO_DL.into(),
                "AND(A, DL); A := ALU_RESULT".into(),
                shift_a("ROR"),
            ],
        );
        add(
            0x8B,
            "ANE",
            "#imm",
            imm("AND(X, DL); A := ALU_RESULT; ALU_FLAGS_LD; END"),
        );
        add(
            0xAB,
            "LXA",
            "#imm",
            imm("AND(A, DL); A := ALU_RESULT; X := ALU_RESULT; ALU_FLAGS_LD; END"),
        );
        add(
            0xCB,
            "SBX",
            "#imm",
            vec![
                FETCH.into(),
                OPERAND_TO_DL.into(),
                "AND(A, X); TMP := ALU_RESULT".into(),
                "CMP(TMP, DL); X := ALU_RESULT; ALU_FLAGS_LD; END".into(),
            ],
        );
        add(0xEB, "SBC", "#imm", imm(&exec_a("SBC")));
    }
    table
}

/// BIT reads memory against A without a write-back.
fn compare_bit() -> String {
    "BIT(A, DL); ALU_FLAGS_LD; END".to_string()
}
