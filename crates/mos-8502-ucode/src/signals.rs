//! Control-line model for the 8502 microcode ROMs.
//!
//! Names every hardware control line the three 16-bit control words carry,
//! plus the enumerated code tables decoded by the datapath multiplexers.
//! The parser fills a [`SignalSet`]; the bit positions themselves live in
//! `word.rs`.

/// ALU operation codes (4-bit field in w2).
///
/// `None` is the idle code. `Out` gates the previously latched ALU result
/// onto the internal bus without starting a new operation; it is never a
/// call target in micro-op source, only the implicit consumer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AluOp {
    #[default]
    None = 0,
    Adc = 1,
    Sbc = 2,
    And = 3,
    Ora = 4,
    Xor = 5,
    Bit = 6,
    Cmp = 7,
    Asl = 8,
    Lsr = 9,
    Rol = 10,
    Ror = 11,
    Inc = 12,
    Dec = 13,
    Pass = 14,
    Out = 15,
}

impl AluOp {
    /// The 4-bit hardware code.
    #[must_use]
    pub const fn code(self) -> u16 {
        self as u16
    }

    /// Look up an operation key as it appears in micro-op call position.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Some(match key {
            "adc" => Self::Adc,
            "sbc" => Self::Sbc,
            "and" => Self::And,
            "ora" => Self::Ora,
            "xor" => Self::Xor,
            "bit" => Self::Bit,
            "cmp" => Self::Cmp,
            "asl" => Self::Asl,
            "lsr" => Self::Lsr,
            "rol" => Self::Rol,
            "ror" => Self::Ror,
            "inc" => Self::Inc,
            "dec" => Self::Dec,
            "pass" => Self::Pass,
            _ => return None,
        })
    }
}

/// Register-output mux select (3-bit field in w2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegOut {
    #[default]
    None = 0,
    P = 1,
    Sp = 2,
    Y = 3,
    X = 4,
    A = 5,
    Tmp = 6,
    Dl = 7,
}

impl RegOut {
    /// The 3-bit hardware code.
    #[must_use]
    pub const fn code(self) -> u16 {
        self as u16
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Some(match key {
            "p" => Self::P,
            "sp" => Self::Sp,
            "y" => Self::Y,
            "x" => Self::X,
            "a" => Self::A,
            "tmp" => Self::Tmp,
            "dl" => Self::Dl,
            _ => return None,
        })
    }
}

/// Address-source mux select (4-bit field in w1).
///
/// `Zeropage` and `PcPlusOffset` share code 8: both drive the same
/// physical mux input and are told apart by the other signals in the
/// cycle. `{adh, adl}` and `{0x00, adl}` are surface aliases for `Latch`
/// and `Zeropage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddrSource {
    #[default]
    None,
    Pc,
    Stack,
    Latch,
    IrqLsb,
    IrqMsb,
    Zeropage,
    PcPlusOffset,
    ZeropageIndirect,
    ZeropageIndirectInc,
    CalculateZpXPointer,
    LatchInc,
}

impl AddrSource {
    /// The 4-bit hardware code.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::None => 0,
            Self::Pc => 1,
            Self::Stack => 2,
            Self::Latch => 3,
            Self::IrqLsb => 6,
            Self::IrqMsb => 7,
            Self::Zeropage | Self::PcPlusOffset => 8,
            Self::ZeropageIndirect => 9,
            Self::ZeropageIndirectInc => 10,
            Self::CalculateZpXPointer => 11,
            Self::LatchInc => 12,
        }
    }

    /// Look up a brace-key (whitespace already stripped by the parser).
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Some(match key {
            "pc" => Self::Pc,
            "stack" => Self::Stack,
            "latch" | "adh,adl" => Self::Latch,
            "irq_lsb" => Self::IrqLsb,
            "irq_msb" => Self::IrqMsb,
            "zeropage" | "0x00,adl" => Self::Zeropage,
            "pc_plus_offset" => Self::PcPlusOffset,
            "zeropage_indirect" => Self::ZeropageIndirect,
            "zeropage_indirect_inc" => Self::ZeropageIndirectInc,
            "calculate_zp_x_pointer" => Self::CalculateZpXPointer,
            "latch_inc" => Self::LatchInc,
            _ => return None,
        })
    }
}

/// One cycle's worth of asserted control lines.
///
/// Fields mirror the ROM bit layout one-to-one; the default value is the
/// idle cycle (every enable low, every enumerated field at its `none`
/// code), which packs to three zero words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SignalSet {
    // w2 — datapath/ALU plane
    pub alu_flags_ld: bool,
    pub alu_op: AluOp,
    pub reg_a_load: bool,
    pub reg_x_load: bool,
    pub reg_y_load: bool,
    pub reg_sp_load: bool,
    pub reg_p_load: bool,
    pub reg_out: RegOut,
    pub pc_inc: bool,
    pub pc_load: bool,
    pub pc_out_addr: bool,

    // w1 — address/bus plane
    pub addr_source: AddrSource,
    pub adh_load: bool,
    pub adl_load: bool,
    pub x_add_to_addr: bool,
    pub y_add_to_addr: bool,
    pub pch_out: bool,
    pub pcl_out: bool,
    pub sp_int_inc: bool,
    pub sp_int_dec: bool,
    pub mem_read: bool,
    pub mem_write: bool,
    pub data_bus_in: bool,
    pub data_bus_out: bool,

    // w0 — flag/sequencer plane
    pub p_b_force_one: bool,
    pub p_c_set: bool,
    pub p_c_clr: bool,
    pub p_d_set: bool,
    pub p_d_clr: bool,
    pub p_i_set: bool,
    pub p_i_clr: bool,
    pub p_v_clr: bool,
    pub tmp_load: bool,
    pub addr_out_bus: bool,
    pub test_branch: bool,
    pub cpu_master_reset: bool,
    pub reset_cycle_counter: bool,
    pub load_ir: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alu_codes_match_hardware_table() {
        assert_eq!(AluOp::None.code(), 0);
        assert_eq!(AluOp::Adc.code(), 1);
        assert_eq!(AluOp::Cmp.code(), 7);
        assert_eq!(AluOp::Pass.code(), 14);
        assert_eq!(AluOp::Out.code(), 15);
    }

    #[test]
    fn out_is_not_a_call_target() {
        assert_eq!(AluOp::from_key("out"), None);
        assert_eq!(AluOp::from_key("none"), None);
        assert_eq!(AluOp::from_key("pass"), Some(AluOp::Pass));
    }

    #[test]
    fn reg_out_codes_match_hardware_table() {
        assert_eq!(RegOut::None.code(), 0);
        assert_eq!(RegOut::P.code(), 1);
        assert_eq!(RegOut::A.code(), 5);
        assert_eq!(RegOut::Dl.code(), 7);
    }

    #[test]
    fn zeropage_and_pc_plus_offset_share_a_mux_input() {
        assert_eq!(AddrSource::Zeropage.code(), 8);
        assert_eq!(AddrSource::PcPlusOffset.code(), 8);
        assert_ne!(AddrSource::Zeropage, AddrSource::PcPlusOffset);
    }

    #[test]
    fn latch_and_zeropage_aliases_resolve() {
        assert_eq!(AddrSource::from_key("adh,adl"), Some(AddrSource::Latch));
        assert_eq!(AddrSource::from_key("0x00,adl"), Some(AddrSource::Zeropage));
        assert_eq!(AddrSource::from_key("latch_inc"), Some(AddrSource::LatchInc));
        assert_eq!(AddrSource::from_key("absolute"), None);
    }

    #[test]
    fn default_signal_set_is_idle() {
        let s = SignalSet::default();
        assert_eq!(s.alu_op, AluOp::None);
        assert_eq!(s.reg_out, RegOut::None);
        assert_eq!(s.addr_source, AddrSource::None);
        assert!(!s.mem_read && !s.mem_write && !s.reset_cycle_counter);
    }
}
