//! Control-word packing.
//!
//! The bit positions here are the contract with the synthesised CPU and
//! must match the ROM decoder nets exactly. Bits not listed are reserved
//! and always emitted as 0.

use crate::signals::SignalSet;

// w2 — datapath/ALU plane
const W2_ALU_FLAGS_LD: u32 = 15;
const W2_ALU_OP: u32 = 11; // 4-bit field, bits 14..11
const W2_REG_A_LOAD: u32 = 10;
const W2_REG_X_LOAD: u32 = 9;
const W2_REG_Y_LOAD: u32 = 8;
const W2_REG_SP_LOAD: u32 = 7;
const W2_REG_P_LOAD: u32 = 6;
const W2_REG_OUT: u32 = 3; // 3-bit field, bits 5..3
const W2_PC_INC: u32 = 2;
const W2_PC_LOAD: u32 = 1;
const W2_PC_OUT_ADDR: u32 = 0;

// w1 — address/bus plane
const W1_ADDR_SOURCE: u32 = 12; // 4-bit field, bits 15..12
const W1_ADH_LOAD: u32 = 11;
const W1_ADL_LOAD: u32 = 10;
const W1_X_ADD_TO_ADDR: u32 = 9;
const W1_Y_ADD_TO_ADDR: u32 = 8;
const W1_PCH_OUT: u32 = 7;
const W1_PCL_OUT: u32 = 6;
const W1_SP_INT_INC: u32 = 5;
const W1_SP_INT_DEC: u32 = 4;
const W1_MEM_READ: u32 = 3;
const W1_MEM_WRITE: u32 = 2;
const W1_DATA_BUS_IN: u32 = 1;
const W1_DATA_BUS_OUT: u32 = 0;

// w0 — flag/sequencer plane
const W0_P_B_FORCE_ONE: u32 = 15;
const W0_P_C_SET: u32 = 14;
const W0_P_C_CLR: u32 = 13;
const W0_P_D_SET: u32 = 12;
const W0_P_D_CLR: u32 = 11;
const W0_P_I_SET: u32 = 10;
const W0_P_I_CLR: u32 = 9;
const W0_P_V_CLR: u32 = 8;
const W0_TMP_LOAD: u32 = 7;
const W0_ADDR_OUT_BUS: u32 = 4;
const W0_TEST_BRANCH: u32 = 3;
const W0_CPU_MASTER_RESET: u32 = 2;
const W0_RESET_CYCLE_COUNTER: u32 = 1;
const W0_LOAD_IR: u32 = 0;

const fn bit(asserted: bool, position: u32) -> u16 {
    (asserted as u16) << position
}

/// The three 16-bit control words for one microcode cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlWord {
    pub w2: u16,
    pub w1: u16,
    pub w0: u16,
}

impl ControlWord {
    pub const ZERO: Self = Self { w2: 0, w1: 0, w0: 0 };

    /// Pack a signal set into the three planes.
    #[must_use]
    pub const fn encode(s: &SignalSet) -> Self {
        let w2 = bit(s.alu_flags_ld, W2_ALU_FLAGS_LD)
            | s.alu_op.code() << W2_ALU_OP
            | bit(s.reg_a_load, W2_REG_A_LOAD)
            | bit(s.reg_x_load, W2_REG_X_LOAD)
            | bit(s.reg_y_load, W2_REG_Y_LOAD)
            | bit(s.reg_sp_load, W2_REG_SP_LOAD)
            | bit(s.reg_p_load, W2_REG_P_LOAD)
            | s.reg_out.code() << W2_REG_OUT
            | bit(s.pc_inc, W2_PC_INC)
            | bit(s.pc_load, W2_PC_LOAD)
            | bit(s.pc_out_addr, W2_PC_OUT_ADDR);

        let w1 = s.addr_source.code() << W1_ADDR_SOURCE
            | bit(s.adh_load, W1_ADH_LOAD)
            | bit(s.adl_load, W1_ADL_LOAD)
            | bit(s.x_add_to_addr, W1_X_ADD_TO_ADDR)
            | bit(s.y_add_to_addr, W1_Y_ADD_TO_ADDR)
            | bit(s.pch_out, W1_PCH_OUT)
            | bit(s.pcl_out, W1_PCL_OUT)
            | bit(s.sp_int_inc, W1_SP_INT_INC)
            | bit(s.sp_int_dec, W1_SP_INT_DEC)
            | bit(s.mem_read, W1_MEM_READ)
            | bit(s.mem_write, W1_MEM_WRITE)
            | bit(s.data_bus_in, W1_DATA_BUS_IN)
            | bit(s.data_bus_out, W1_DATA_BUS_OUT);

        let w0 = bit(s.p_b_force_one, W0_P_B_FORCE_ONE)
            | bit(s.p_c_set, W0_P_C_SET)
            | bit(s.p_c_clr, W0_P_C_CLR)
            | bit(s.p_d_set, W0_P_D_SET)
            | bit(s.p_d_clr, W0_P_D_CLR)
            | bit(s.p_i_set, W0_P_I_SET)
            | bit(s.p_i_clr, W0_P_I_CLR)
            | bit(s.p_v_clr, W0_P_V_CLR)
            | bit(s.tmp_load, W0_TMP_LOAD)
            | bit(s.addr_out_bus, W0_ADDR_OUT_BUS)
            | bit(s.test_branch, W0_TEST_BRANCH)
            | bit(s.cpu_master_reset, W0_CPU_MASTER_RESET)
            | bit(s.reset_cycle_counter, W0_RESET_CYCLE_COUNTER)
            | bit(s.load_ir, W0_LOAD_IR);

        Self { w2, w1, w0 }
    }
}
