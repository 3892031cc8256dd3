//! Native 32-bit opcode and funct constants.
//!
//! Mirrors the classic MIPS-I encoding. Named by field: `OP_*` is the
//! bits[31:26] primary opcode, `FUNCT_*` is bits[5:0] under `OP_SPECIAL`,
//! `RT_*` is the bits[20:16] sub-selector under `OP_BCOND` (`BLTZ`/`BGEZ`
//! family), and `RS_*` is the bits[25:21] sub-selector under `OP_COP0`.

pub const OP_SPECIAL: u8 = 0x00;
pub const OP_BCOND: u8 = 0x01;
pub const OP_J: u8 = 0x02;
pub const OP_JAL: u8 = 0x03;
pub const OP_BEQ: u8 = 0x04;
pub const OP_BNE: u8 = 0x05;
pub const OP_BLEZ: u8 = 0x06;
pub const OP_BGTZ: u8 = 0x07;
pub const OP_ADDI: u8 = 0x08;
pub const OP_ADDIU: u8 = 0x09;
pub const OP_SLTI: u8 = 0x0A;
pub const OP_SLTIU: u8 = 0x0B;
pub const OP_ANDI: u8 = 0x0C;
pub const OP_ORI: u8 = 0x0D;
pub const OP_XORI: u8 = 0x0E;
pub const OP_LUI: u8 = 0x0F;
pub const OP_COP0: u8 = 0x10;
pub const OP_LB: u8 = 0x20;
pub const OP_LH: u8 = 0x21;
pub const OP_LW: u8 = 0x23;
pub const OP_LBU: u8 = 0x24;
pub const OP_LHU: u8 = 0x25;
pub const OP_SB: u8 = 0x28;
pub const OP_SH: u8 = 0x29;
pub const OP_SW: u8 = 0x2B;

pub const FUNCT_SLL: u8 = 0x00;
pub const FUNCT_SRL: u8 = 0x02;
pub const FUNCT_SRA: u8 = 0x03;
pub const FUNCT_SLLV: u8 = 0x04;
pub const FUNCT_SRLV: u8 = 0x06;
pub const FUNCT_SRAV: u8 = 0x07;
pub const FUNCT_JR: u8 = 0x08;
pub const FUNCT_JALR: u8 = 0x09;
pub const FUNCT_ADD: u8 = 0x20;
pub const FUNCT_ADDU: u8 = 0x21;
pub const FUNCT_SUB: u8 = 0x22;
pub const FUNCT_SUBU: u8 = 0x23;
pub const FUNCT_AND: u8 = 0x24;
pub const FUNCT_OR: u8 = 0x25;
pub const FUNCT_XOR: u8 = 0x26;
pub const FUNCT_NOR: u8 = 0x27;
pub const FUNCT_SLT: u8 = 0x2A;
pub const FUNCT_SLTU: u8 = 0x2B;

pub const RT_BLTZ: u8 = 0x00;
pub const RT_BGEZ: u8 = 0x01;
pub const RT_BLTZAL: u8 = 0x10;
pub const RT_BGEZAL: u8 = 0x11;

pub const RS_MFC0: u8 = 0x00;
pub const RS_MTC0: u8 = 0x04;

/// Short (compressed) opcode assignments, 5 bits each.
pub mod short {
    pub const C_MOV: u8 = 0;
    pub const C_ADDU: u8 = 1;
    pub const C_SUBU: u8 = 2;
    pub const C_OR: u8 = 3;
    pub const C_XOR: u8 = 4;
    pub const C_NEG: u8 = 5;
    pub const C_NOT: u8 = 6;
    pub const C_SLTU: u8 = 7;
    pub const C_ADDIU: u8 = 8;
    pub const C_ANDI: u8 = 9;
    pub const C_SLL: u8 = 10;
    pub const C_SRL: u8 = 11;
    pub const C_SRA: u8 = 12;
    pub const C_LSI: u8 = 13;
    pub const C_B: u8 = 14;
    pub const C_BAL: u8 = 15;
    pub const C_BEQZ: u8 = 16;
    pub const C_BNEZ: u8 = 17;
    pub const C_JALR: u8 = 18;
    pub const C_LWS: u8 = 19;
    pub const C_SWS: u8 = 20;
}

/// Long-form (32-bit payload inside the compressed stream) opcode
/// remapping for loads/stores; all other long opcodes pass through
/// the native opcode unchanged.
pub mod long {
    pub const OP_LB: u8 = 0x18;
    pub const OP_LH: u8 = 0x19;
    pub const OP_LW: u8 = 0x1A;
    pub const OP_LBU: u8 = 0x1B;
    pub const OP_LHU: u8 = 0x1C;
    pub const OP_SB: u8 = 0x1D;
    pub const OP_SH: u8 = 0x1E;
    pub const OP_SW: u8 = 0x1F;
}
