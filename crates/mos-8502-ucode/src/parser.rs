//! Micro-op parser: one symbolic cycle string into control-line assertions.
//!
//! A cycle is a `;`-separated list of statements that all execute in the
//! same clock. Each statement is one of:
//!
//! - a sequencer primitive (`PC += 1`, `END`, `ALU_FLAGS_LD`, ...),
//! - a flag strobe (`SETF(C)`, `CLRF(I)`),
//! - an assignment `dest := source`, or
//! - a bare ALU call (`ADC(A, DL)`) whose result is consumed later.
//!
//! Parsing is pure and per-cycle; there is no cross-cycle state. Case and
//! whitespace are insignificant. Unrecognised tokens surface as warnings
//! and contribute no bits, so a typo shows up as a stuck bus in the
//! simulator rather than a random strobe.

use crate::signals::{AddrSource, AluOp, RegOut, SignalSet};

/// Result of parsing one micro-op string.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParsedCycle {
    pub signals: SignalSet,
    /// Non-fatal diagnostics; the offending token's signals stay low.
    pub warnings: Vec<String>,
}

/// Parse one symbolic cycle. Empty input is the idle cycle.
#[must_use]
pub fn parse_micro_op(source: &str) -> ParsedCycle {
    let mut out = ParsedCycle::default();
    for stmt in source.split(';') {
        let stmt = canonical(stmt);
        if stmt.is_empty() {
            continue;
        }
        parse_statement(&stmt, &mut out);
    }
    out
}

/// Lowercase and drop all whitespace. No micro-op token contains a
/// meaningful space, so `{0x00, ADL}` and `{0x00,adl}` are the same key.
fn canonical(stmt: &str) -> String {
    stmt.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn parse_statement(stmt: &str, out: &mut ParsedCycle) {
    // Whole-statement sequencer primitives.
    let s = &mut out.signals;
    match stmt {
        "sp+=1" => {
            s.sp_int_inc = true;
            return;
        }
        "sp-=1" => {
            s.sp_int_dec = true;
            return;
        }
        "pc+=1" => {
            s.pc_inc = true;
            return;
        }
        "end" => {
            s.reset_cycle_counter = true;
            return;
        }
        "alu_flags_ld" => {
            s.alu_flags_ld = true;
            return;
        }
        "test_branch_en" => {
            s.test_branch = true;
            return;
        }
        "cpu_master_reset" => {
            s.cpu_master_reset = true;
            return;
        }
        _ => {}
    }

    if let Some(flag) = call_args(stmt, "setf") {
        flag_strobe(flag, true, out);
        return;
    }
    if let Some(flag) = call_args(stmt, "clrf") {
        flag_strobe(flag, false, out);
        return;
    }

    if let Some((dest, source)) = stmt.split_once(":=") {
        parse_assignment(dest, source, out);
        return;
    }

    // A bare call leaves its result in the ALU latch for a later cycle.
    if let Some((name, args)) = split_call(stmt) {
        if let Some(op) = AluOp::from_key(name) {
            alu_call(op, args, out);
            return;
        }
    }

    out.warnings.push(format!("unrecognised statement `{stmt}`"));
}

/// `dest := source`, with `+X`/`+Y` index suffixes stripped from the
/// source (and from a memory destination) into the address adders.
fn parse_assignment(dest: &str, source: &str, out: &mut ParsedCycle) {
    let source = strip_index(source, &mut out.signals);
    let dest = if dest.starts_with('*') {
        strip_index(dest, &mut out.signals)
    } else {
        dest
    };

    if let Some((name, args)) = split_call(source) {
        match AluOp::from_key(name) {
            Some(op) => alu_call(op, args, out),
            None => out
                .warnings
                .push(format!("unrecognised operation `{name}` in `{source}`")),
        }
    } else {
        parse_producer(source, out);
    }
    parse_sink(dest, out);
}

/// ALU call `OP(first)` or `OP(first, second)`.
///
/// The first operand drives the register-output mux (a memory operand is
/// routed through DL instead). The ALU B input is hardwired from DL, so a
/// literal `DL` second operand asserts nothing; anything else is an
/// ordinary value producer.
fn alu_call(op: AluOp, args: &str, out: &mut ParsedCycle) {
    out.signals.alu_op = op;
    let (first, second) = split_operands(args);
    if let Some(reg) = RegOut::from_key(first) {
        out.signals.reg_out = reg;
    } else {
        parse_producer(first, out);
    }
    if let Some(second) = second {
        if second != "dl" {
            parse_producer(second, out);
        }
    }
}

/// Right-hand-side value producers.
fn parse_producer(term: &str, out: &mut ParsedCycle) {
    let s = &mut out.signals;

    // The latched ALU result is gated out as-is, but only when the cycle
    // has not asserted a fresh operation of its own.
    if term == "alu_result" {
        if s.alu_op == AluOp::None {
            s.alu_op = AluOp::Out;
        }
        return;
    }

    if let Some(reg) = RegOut::from_key(term) {
        s.reg_out = reg;
        return;
    }

    match term {
        "pch" => {
            s.pch_out = true;
            return;
        }
        "pcl" => {
            s.pcl_out = true;
            return;
        }
        _ => {}
    }

    // `*X` — memory read through the address-source mux.
    if let Some(key) = term.strip_prefix('*') {
        if let Some(source) = deref_source(key) {
            s.mem_read = true;
            s.data_bus_in = true;
            s.addr_out_bus = true;
            s.addr_source = source;
        } else {
            out.warnings
                .push(format!("unrecognised memory source `{term}`"));
        }
        return;
    }

    // `{k}` — an address emitted on the address bus as a value.
    if let Some(key) = brace_key(term) {
        if let Some(source) = AddrSource::from_key(key) {
            s.addr_source = source;
            s.addr_out_bus = true;
        } else {
            out.warnings
                .push(format!("unrecognised address key `{term}`"));
        }
        return;
    }

    out.warnings.push(format!("unrecognised source `{term}`"));
}

/// Left-hand-side value sinks.
fn parse_sink(term: &str, out: &mut ParsedCycle) {
    let s = &mut out.signals;
    match term {
        "a" => s.reg_a_load = true,
        "x" => s.reg_x_load = true,
        "y" => s.reg_y_load = true,
        "sp" => s.reg_sp_load = true,
        "p" => s.reg_p_load = true,
        "tmp" => s.tmp_load = true,
        "ir" => s.load_ir = true,
        "adh" => s.adh_load = true,
        "adl" => s.adl_load = true,
        "pc" => s.pc_load = true,
        // The data-in latch fills whenever `data_bus_in` is asserted;
        // naming it as a target adds no signal of its own.
        "dl" => {}
        _ => {
            if let Some(key) = term.strip_prefix('*') {
                if let Some(source) = deref_source(key) {
                    s.mem_write = true;
                    s.data_bus_out = true;
                    s.addr_out_bus = true;
                    s.addr_source = source;
                } else {
                    out.warnings
                        .push(format!("unrecognised memory target `{term}`"));
                }
            } else {
                out.warnings.push(format!("unrecognised target `{term}`"));
            }
        }
    }
}

/// Flag strobes. V has no set line and B can only be forced high.
fn flag_strobe(flag: &str, set: bool, out: &mut ParsedCycle) {
    let s = &mut out.signals;
    match (flag, set) {
        ("c", true) => s.p_c_set = true,
        ("c", false) => s.p_c_clr = true,
        ("d", true) => s.p_d_set = true,
        ("d", false) => s.p_d_clr = true,
        ("i", true) => s.p_i_set = true,
        ("i", false) => s.p_i_clr = true,
        ("v", false) => s.p_v_clr = true,
        ("b", true) => s.p_b_force_one = true,
        _ => out.warnings.push(format!(
            "flag `{flag}` has no {} strobe",
            if set { "set" } else { "clear" }
        )),
    }
}

/// Strip a trailing `+x`/`+y` index, asserting the matching address adder.
fn strip_index<'a>(term: &'a str, s: &mut SignalSet) -> &'a str {
    if let Some(base) = term.strip_suffix("+x") {
        s.x_add_to_addr = true;
        base
    } else if let Some(base) = term.strip_suffix("+y") {
        s.y_add_to_addr = true;
        base
    } else {
        term
    }
}

/// Address key of a dereference: bare `pc`/`sp` or a brace-wrapped key.
fn deref_source(key: &str) -> Option<AddrSource> {
    match key {
        "pc" => Some(AddrSource::Pc),
        "sp" => Some(AddrSource::Stack),
        _ => AddrSource::from_key(brace_key(key)?),
    }
}

fn brace_key(term: &str) -> Option<&str> {
    term.strip_prefix('{')?.strip_suffix('}')
}

/// Split `name(args)`; the statement must end at the closing paren.
fn split_call(stmt: &str) -> Option<(&str, &str)> {
    let open = stmt.find('(')?;
    let args = stmt[open..].strip_prefix('(')?.strip_suffix(')')?;
    Some((&stmt[..open], args))
}

/// Split call arguments at the first comma outside braces (brace keys
/// such as `{0x00,adl}` carry commas of their own).
fn split_operands(args: &str) -> (&str, Option<&str>) {
    let mut depth = 0usize;
    for (i, c) in args.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => return (&args[..i], Some(&args[i + 1..])),
            _ => {}
        }
    }
    (args, None)
}

/// Match `name(args)` for a specific statement-level call such as `setf`.
fn call_args<'a>(stmt: &'a str, name: &str) -> Option<&'a str> {
    stmt.strip_prefix(name)?
        .strip_prefix('(')?
        .strip_suffix(')')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals(source: &str) -> SignalSet {
        let parsed = parse_micro_op(source);
        assert_eq!(parsed.warnings, Vec::<String>::new(), "in `{source}`");
        parsed.signals
    }

    #[test]
    fn empty_cycle_is_idle() {
        assert_eq!(parse_micro_op("").signals, SignalSet::default());
        assert_eq!(parse_micro_op(" ; ;  ").signals, SignalSet::default());
    }

    #[test]
    fn sequencer_primitives() {
        assert!(signals("END").reset_cycle_counter);
        assert!(signals("PC += 1").pc_inc);
        assert!(signals("SP += 1").sp_int_inc);
        assert!(signals("SP -= 1").sp_int_dec);
        assert!(signals("ALU_FLAGS_LD").alu_flags_ld);
        assert!(signals("TEST_BRANCH_EN").test_branch);
        assert!(signals("CPU_MASTER_RESET").cpu_master_reset);
    }

    #[test]
    fn case_and_spacing_are_insignificant() {
        assert_eq!(
            parse_micro_op("ir := *pc ; pc += 1"),
            parse_micro_op("IR:=*PC;PC+=1")
        );
        assert_eq!(
            parse_micro_op("AdC(a, Dl); End"),
            parse_micro_op("ADC(A,DL);END")
        );
    }

    #[test]
    fn flag_strobes() {
        assert!(signals("SETF(C)").p_c_set);
        assert!(signals("CLRF(C)").p_c_clr);
        assert!(signals("SETF(D)").p_d_set);
        assert!(signals("CLRF(D)").p_d_clr);
        assert!(signals("SETF(I)").p_i_set);
        assert!(signals("CLRF(I)").p_i_clr);
        assert!(signals("CLRF(V)").p_v_clr);
        assert!(signals("SETF(B)").p_b_force_one);
    }

    #[test]
    fn missing_flag_strobes_warn() {
        assert_eq!(parse_micro_op("SETF(V)").warnings.len(), 1);
        assert_eq!(parse_micro_op("CLRF(B)").warnings.len(), 1);
    }

    #[test]
    fn fetch_assignment() {
        let s = signals("IR := *PC; PC += 1");
        assert!(s.load_ir && s.pc_inc);
        assert!(s.mem_read && s.data_bus_in && s.addr_out_bus);
        assert_eq!(s.addr_source, AddrSource::Pc);
    }

    #[test]
    fn register_sinks_and_sources() {
        let s = signals("SP := X");
        assert!(s.reg_sp_load);
        assert_eq!(s.reg_out, RegOut::X);

        let s = signals("ADL := TMP");
        assert!(s.adl_load);
        assert_eq!(s.reg_out, RegOut::Tmp);
    }

    #[test]
    fn pch_pcl_producers() {
        let s = signals("*SP := PCH; SP -= 1");
        assert!(s.pch_out && s.mem_write && s.data_bus_out && s.sp_int_dec);
        assert_eq!(s.addr_source, AddrSource::Stack);
        assert!(signals("*SP := PCL").pcl_out);
    }

    #[test]
    fn memory_read_with_index() {
        let s = signals("DL := *{LATCH}+Y");
        assert!(s.mem_read && s.data_bus_in && s.addr_out_bus && s.y_add_to_addr);
        assert_eq!(s.addr_source, AddrSource::Latch);
        // Nothing loads: DL is the data-in latch itself.
        assert!(!s.tmp_load && !s.reg_a_load && !s.adl_load);
    }

    #[test]
    fn memory_store_with_index_on_target() {
        let s = signals("*{LATCH}+X := A");
        assert!(s.mem_write && s.data_bus_out && s.addr_out_bus && s.x_add_to_addr);
        assert_eq!(s.addr_source, AddrSource::Latch);
        assert_eq!(s.reg_out, RegOut::A);
    }

    #[test]
    fn brace_aliases_match_their_canonical_keys() {
        assert_eq!(
            signals("DL := *{ADH, ADL}"),
            signals("DL := *{LATCH}")
        );
        assert_eq!(
            signals("DL := *{0x00, ADL}"),
            signals("DL := *{ZEROPAGE}")
        );
    }

    #[test]
    fn address_as_value_producer() {
        let s = signals("PC := {PC_PLUS_OFFSET}");
        assert!(s.pc_load && s.addr_out_bus);
        assert_eq!(s.addr_source, AddrSource::PcPlusOffset);
        assert!(!s.mem_read && !s.data_bus_in);
    }

    #[test]
    fn alu_call_with_hardwired_dl_operand() {
        let s = signals("ADC(A, DL)");
        assert_eq!(s.alu_op, AluOp::Adc);
        assert_eq!(s.reg_out, RegOut::A);
        assert!(!s.mem_read);
    }

    #[test]
    fn alu_call_second_register_operand_wins_the_mux() {
        // Both operands name registers: the mux can only carry one, and
        // the last setter wins.
        let s = signals("AND(A, X)");
        assert_eq!(s.alu_op, AluOp::And);
        assert_eq!(s.reg_out, RegOut::X);
    }

    #[test]
    fn alu_single_operand_drives_the_mux() {
        let s = signals("ASL(DL)");
        assert_eq!(s.alu_op, AluOp::Asl);
        assert_eq!(s.reg_out, RegOut::Dl);
    }

    #[test]
    fn alu_result_consumes_the_latch_without_a_fresh_op() {
        let s = signals("A := ALU_RESULT");
        assert_eq!(s.alu_op, AluOp::Out);
        assert!(s.reg_a_load);

        // A fresh operation in the same cycle keeps its own code.
        let s = signals("ADC(A, DL); A := ALU_RESULT; ALU_FLAGS_LD; END");
        assert_eq!(s.alu_op, AluOp::Adc);
        assert!(s.reg_a_load && s.alu_flags_ld && s.reset_cycle_counter);
    }

    #[test]
    fn rmw_write_back_reuses_the_latched_address() {
        let read = signals("DL := *{ZEROPAGE}+X");
        assert!(read.x_add_to_addr);
        let write = signals("*{ZEROPAGE} := ALU_RESULT; END");
        assert!(!write.x_add_to_addr);
        assert!(write.mem_write && write.data_bus_out);
        assert_eq!(write.alu_op, AluOp::Out);
        assert_eq!(write.addr_source, AddrSource::Zeropage);
    }

    #[test]
    fn unknown_tokens_warn_and_assert_nothing() {
        let parsed = parse_micro_op("A := FROB");
        assert_eq!(parsed.warnings.len(), 1);
        assert!(parsed.signals.reg_a_load);
        assert_eq!(parsed.signals.reg_out, RegOut::None);

        let parsed = parse_micro_op("GLORP");
        assert_eq!(parsed.warnings.len(), 1);
        assert_eq!(parsed.signals, SignalSet::default());

        let parsed = parse_micro_op("*{NOWHERE} := A");
        assert_eq!(parsed.warnings.len(), 1);
        assert!(!parsed.signals.mem_write);
    }

    #[test]
    fn parsing_is_deterministic() {
        let src = "SETF(B); *SP := P; SP -= 1; SETF(I)";
        assert_eq!(parse_micro_op(src), parse_micro_op(src));
    }
}
