//! Native Codec (NC): decode/encode 32-bit native instruction words.
//!
//! Field extraction is fixed by the ISA: opcode = bits\[31:26\], rs =
//! \[25:21\], rt = \[20:16\], rd = \[15:11\], shamt = \[10:6\], funct =
//! \[5:0\], imm16 = \[15:0\], addr26 = \[25:0\]. Branch and jump
//! displacements are normalized to byte units immediately after
//! classification (invariant I5) and denormalized (divided back down)
//! on encode.

use crate::error::{DecodeError, EncodeError};
use crate::instr::{Instr, Op};
use crate::opcodes::*;
use crate::utils::extract_field;

fn opcode(word: u32) -> u8 {
    extract_field(word, 31, 26) as u8
}
fn field_rs(word: u32) -> u8 {
    extract_field(word, 25, 21) as u8
}
fn field_rt(word: u32) -> u8 {
    extract_field(word, 20, 16) as u8
}
fn field_rd(word: u32) -> u8 {
    extract_field(word, 15, 11) as u8
}
fn field_shamt(word: u32) -> u8 {
    extract_field(word, 10, 6) as u8
}
fn funct(word: u32) -> u8 {
    extract_field(word, 5, 0) as u8
}
fn imm16(word: u32) -> u16 {
    extract_field(word, 15, 0) as u16
}
fn addr26(word: u32) -> u32 {
    extract_field(word, 25, 0)
}

/// Decode one native word. Never fails: an unrecognized opcode/funct
/// combination decodes to [`Op::Invalid`], per the "NC returns
/// INVALID; the caller decides" policy (section 7 of the spec).
pub fn decode(word: u32) -> Instr {
    decode_scaled(word, 4)
}

/// Decode a 32-bit word whose branch/jump displacements are word-scaled
/// by `scale` rather than the native 4. The compressed codec's long
/// form reuses this with `scale = 2`; [`decode`] is `decode_scaled(word, 4)`.
pub(crate) fn decode_scaled(word: u32, scale: u32) -> Instr {
    let op_bits = opcode(word);
    let rs = field_rs(word);
    let rt = field_rt(word);
    let rd = field_rd(word);
    let shamt = field_shamt(word);
    let imm = imm16(word);
    let simm = imm as i16;

    let mut instr = match op_bits {
        OP_SPECIAL => match funct(word) {
            FUNCT_SLL => Instr::sh(Op::Sll, rt, rd, shamt),
            FUNCT_SRL => Instr::sh(Op::Srl, rt, rd, shamt),
            FUNCT_SRA => Instr::sh(Op::Sra, rt, rd, shamt),
            FUNCT_SLLV => Instr::r(Op::Sllv, rs, rt, rd),
            FUNCT_SRLV => Instr::r(Op::Srlv, rs, rt, rd),
            FUNCT_SRAV => Instr::r(Op::Srav, rs, rt, rd),
            FUNCT_JR => Instr::r(Op::Jr, rs, 0, 0),
            FUNCT_JALR => Instr::r(Op::Jalr, rs, 0, rd),
            FUNCT_ADD => Instr::r(Op::Add, rs, rt, rd),
            FUNCT_ADDU => Instr::r(Op::Addu, rs, rt, rd),
            FUNCT_SUB => Instr::r(Op::Sub, rs, rt, rd),
            FUNCT_SUBU => Instr::r(Op::Subu, rs, rt, rd),
            FUNCT_AND => Instr::r(Op::And, rs, rt, rd),
            FUNCT_OR => Instr::r(Op::Or, rs, rt, rd),
            FUNCT_XOR => Instr::r(Op::Xor, rs, rt, rd),
            FUNCT_NOR => Instr::r(Op::Nor, rs, rt, rd),
            FUNCT_SLT => Instr::r(Op::Slt, rs, rt, rd),
            FUNCT_SLTU => Instr::r(Op::Sltu, rs, rt, rd),
            _ => Instr::invalid(),
        },
        OP_BCOND => match rt {
            RT_BLTZ => Instr::branch(Op::Bltz, rs, 0, simm),
            RT_BGEZ => Instr::branch(Op::Bgez, rs, 0, simm),
            RT_BLTZAL => Instr::branch(Op::Bltzal, rs, 0, simm),
            RT_BGEZAL => Instr::branch(Op::Bgezal, rs, 0, simm),
            _ => Instr::invalid(),
        },
        OP_J => Instr::jump(Op::J, addr26(word)),
        OP_JAL => Instr::jump(Op::Jal, addr26(word)),
        OP_BEQ => Instr::branch(Op::Beq, rs, rt, simm),
        OP_BNE => Instr::branch(Op::Bne, rs, rt, simm),
        OP_BLEZ => Instr::branch(Op::Blez, rs, 0, simm),
        OP_BGTZ => Instr::branch(Op::Bgtz, rs, 0, simm),
        OP_ADDI => Instr::i(Op::Addi, rs, rt, simm),
        OP_ADDIU => Instr::i(Op::Addiu, rs, rt, simm),
        OP_SLTI => Instr::i(Op::Slti, rs, rt, simm),
        OP_SLTIU => Instr::i(Op::Sltiu, rs, rt, simm),
        OP_ANDI => with_unsigned_imm(Instr::i(Op::Andi, rs, rt, simm), imm),
        OP_ORI => with_unsigned_imm(Instr::i(Op::Ori, rs, rt, simm), imm),
        OP_XORI => with_unsigned_imm(Instr::i(Op::Xori, rs, rt, simm), imm),
        OP_LUI => with_unsigned_imm(Instr::i(Op::Lui, 0, rt, simm), imm),
        OP_COP0 => match rs {
            RS_MFC0 => Instr::r(Op::Mfc0, 0, rt, rd),
            RS_MTC0 => Instr::r(Op::Mtc0, 0, rt, rd),
            _ => Instr::invalid(),
        },
        OP_LB => Instr::i(Op::Lb, rs, rt, simm),
        OP_LH => Instr::i(Op::Lh, rs, rt, simm),
        OP_LW => Instr::i(Op::Lw, rs, rt, simm),
        OP_LBU => Instr::i(Op::Lbu, rs, rt, simm),
        OP_LHU => Instr::i(Op::Lhu, rs, rt, simm),
        OP_SB => Instr::i(Op::Sb, rs, rt, simm),
        OP_SH => Instr::i(Op::Sh, rs, rt, simm),
        OP_SW => Instr::i(Op::Sw, rs, rt, simm),
        _ => Instr::invalid(),
    };

    // Byte-address normalization (I5): branches and jumps are
    // word-scaled on the wire but stored in bytes in the IM.
    match instr.op {
        Op::Bltz | Op::Bgez | Op::Bltzal | Op::Bgezal | Op::Beq | Op::Bne | Op::Blez
        | Op::Bgtz => {
            instr.simm = instr.simm.wrapping_mul(scale as i16);
        }
        Op::J | Op::Jal => {
            instr.addr = instr.addr.wrapping_mul(scale);
        }
        _ => {}
    }

    instr
}

fn with_unsigned_imm(mut instr: Instr, imm: u16) -> Instr {
    instr.imm = imm;
    instr
}

/// Decode a word, turning [`Op::Invalid`] into an error. Used by
/// callers for which a bad opcode is fatal (the converter, the
/// simulator); the disassembler and analyzer call [`decode`] directly
/// and tolerate [`Op::Invalid`].
pub fn decode_checked(word: u32) -> Result<Instr, DecodeError> {
    let instr = decode(word);
    if instr.op == Op::Invalid {
        let op_bits = opcode(word);
        return Err(classify_decode_error(op_bits, word));
    }
    Ok(instr)
}

fn classify_decode_error(op_bits: u8, word: u32) -> DecodeError {
    match op_bits {
        OP_SPECIAL => DecodeError::ReservedFunct(funct(word)),
        OP_COP0 => DecodeError::UnsupportedCop0(field_rs(word)),
        _ => DecodeError::UnknownOpcode(op_bits),
    }
}

/// Encode a native-expressible instruction back into a 32-bit word.
/// Fails with [`EncodeError::PseudoNotNative`] if `instr.op` is a
/// pseudo-op -- the caller must run [`crate::pseudo::to_native`]
/// first.
pub fn encode(instr: &Instr) -> Result<u32, EncodeError> {
    encode_scaled(instr, 4)
}

/// Encode a native-expressible instruction whose branch/jump
/// displacements are word-scaled by `scale` on the wire. The compressed
/// codec's long form reuses this with `scale = 2`.
pub(crate) fn encode_scaled(instr: &Instr, scale: u32) -> Result<u32, EncodeError> {
    if !instr.op.is_native() {
        return Err(EncodeError::PseudoNotNative(instr.op));
    }
    check_register(instr.rs)?;
    check_register(instr.rt)?;
    check_register(instr.rd)?;

    use Op::*;
    let word = match instr.op {
        Sll => itype_shift(OP_SPECIAL, FUNCT_SLL, instr.rt, instr.rd, instr.shamt)?,
        Srl => itype_shift(OP_SPECIAL, FUNCT_SRL, instr.rt, instr.rd, instr.shamt)?,
        Sra => itype_shift(OP_SPECIAL, FUNCT_SRA, instr.rt, instr.rd, instr.shamt)?,
        Sllv => rtype(FUNCT_SLLV, instr.rs, instr.rt, instr.rd),
        Srlv => rtype(FUNCT_SRLV, instr.rs, instr.rt, instr.rd),
        Srav => rtype(FUNCT_SRAV, instr.rs, instr.rt, instr.rd),
        Add => rtype(FUNCT_ADD, instr.rs, instr.rt, instr.rd),
        Addu => rtype(FUNCT_ADDU, instr.rs, instr.rt, instr.rd),
        Sub => rtype(FUNCT_SUB, instr.rs, instr.rt, instr.rd),
        Subu => rtype(FUNCT_SUBU, instr.rs, instr.rt, instr.rd),
        And => rtype(FUNCT_AND, instr.rs, instr.rt, instr.rd),
        Or => rtype(FUNCT_OR, instr.rs, instr.rt, instr.rd),
        Xor => rtype(FUNCT_XOR, instr.rs, instr.rt, instr.rd),
        Nor => rtype(FUNCT_NOR, instr.rs, instr.rt, instr.rd),
        Slt => rtype(FUNCT_SLT, instr.rs, instr.rt, instr.rd),
        Sltu => rtype(FUNCT_SLTU, instr.rs, instr.rt, instr.rd),
        Addi => itype_imm(OP_ADDI, instr.rs, instr.rt, instr.simm)?,
        Addiu => itype_imm(OP_ADDIU, instr.rs, instr.rt, instr.simm)?,
        Andi => itype_uimm(OP_ANDI, instr.rs, instr.rt, instr.imm)?,
        Ori => itype_uimm(OP_ORI, instr.rs, instr.rt, instr.imm)?,
        Xori => itype_uimm(OP_XORI, instr.rs, instr.rt, instr.imm)?,
        Slti => itype_imm(OP_SLTI, instr.rs, instr.rt, instr.simm)?,
        Sltiu => itype_imm(OP_SLTIU, instr.rs, instr.rt, instr.simm)?,
        Lui => itype_uimm(OP_LUI, 0, instr.rt, instr.imm)?,
        Lb => itype_imm(OP_LB, instr.rs, instr.rt, instr.simm)?,
        Lh => itype_imm(OP_LH, instr.rs, instr.rt, instr.simm)?,
        Lw => itype_imm(OP_LW, instr.rs, instr.rt, instr.simm)?,
        Lbu => itype_imm(OP_LBU, instr.rs, instr.rt, instr.simm)?,
        Lhu => itype_imm(OP_LHU, instr.rs, instr.rt, instr.simm)?,
        Sb => itype_imm(OP_SB, instr.rs, instr.rt, instr.simm)?,
        Sh => itype_imm(OP_SH, instr.rs, instr.rt, instr.simm)?,
        Sw => itype_imm(OP_SW, instr.rs, instr.rt, instr.simm)?,
        Bltz => branch_word(OP_BCOND, instr.rs, RT_BLTZ, instr.simm, scale)?,
        Bgez => branch_word(OP_BCOND, instr.rs, RT_BGEZ, instr.simm, scale)?,
        Bltzal => branch_word(OP_BCOND, instr.rs, RT_BLTZAL, instr.simm, scale)?,
        Bgezal => branch_word(OP_BCOND, instr.rs, RT_BGEZAL, instr.simm, scale)?,
        Beq => branch_word(OP_BEQ, instr.rs, instr.rt, instr.simm, scale)?,
        Bne => branch_word(OP_BNE, instr.rs, instr.rt, instr.simm, scale)?,
        Blez => branch_word(OP_BLEZ, instr.rs, 0, instr.simm, scale)?,
        Bgtz => branch_word(OP_BGTZ, instr.rs, 0, instr.simm, scale)?,
        J => jump_word(OP_J, instr.addr, scale)?,
        Jal => jump_word(OP_JAL, instr.addr, scale)?,
        Jr => rtype(FUNCT_JR, instr.rs, 0, 0),
        Jalr => rtype(FUNCT_JALR, instr.rs, 0, instr.rd),
        Mfc0 => rs_type(RS_MFC0, instr.rt, instr.rd),
        Mtc0 => rs_type(RS_MTC0, instr.rt, instr.rd),
        Nop | Mov | Clear | Not | Neg | B | Bal | Beqz | Bnez | Seqz | Snez | Sltz | Lsi
        | Invalid => unreachable!("excluded above by is_native()"),
    };
    Ok(word)
}

fn check_register(r: u8) -> Result<(), EncodeError> {
    if r >= 32 {
        Err(EncodeError::FieldOverflow {
            field: "register",
            value: r as i64,
        })
    } else {
        Ok(())
    }
}

fn rtype(funct: u8, rs: u8, rt: u8, rd: u8) -> u32 {
    ((OP_SPECIAL as u32) << 26)
        | ((rs as u32) << 21)
        | ((rt as u32) << 16)
        | ((rd as u32) << 11)
        | (funct as u32)
}

fn rs_type(rs: u8, rt: u8, rd: u8) -> u32 {
    ((OP_COP0 as u32) << 26) | ((rs as u32) << 21) | ((rt as u32) << 16) | ((rd as u32) << 11)
}

fn itype_shift(op: u8, funct: u8, rt: u8, rd: u8, shamt: u8) -> Result<u32, EncodeError> {
    if shamt >= 32 {
        return Err(EncodeError::FieldOverflow {
            field: "shamt",
            value: shamt as i64,
        });
    }
    Ok(((op as u32) << 26)
        | ((rt as u32) << 16)
        | ((rd as u32) << 11)
        | ((shamt as u32) << 6)
        | (funct as u32))
}

fn itype_imm(op: u8, rs: u8, rt: u8, simm: i16) -> Result<u32, EncodeError> {
    Ok(((op as u32) << 26) | ((rs as u32) << 21) | ((rt as u32) << 16) | (simm as u16 as u32))
}

fn itype_uimm(op: u8, rs: u8, rt: u8, imm: u16) -> Result<u32, EncodeError> {
    if imm as u32 > crate::utils::mask(16u32) {
        return Err(EncodeError::FieldOverflow {
            field: "imm",
            value: imm as i64,
        });
    }
    Ok(((op as u32) << 26) | ((rs as u32) << 21) | ((rt as u32) << 16) | (imm as u32))
}

fn branch_word(
    op: u8,
    rs: u8,
    rt_or_sub: u8,
    byte_simm: i16,
    scale: u32,
) -> Result<u32, EncodeError> {
    let scale = scale as i16;
    if byte_simm % scale != 0 {
        return Err(EncodeError::FieldOverflow {
            field: "branch displacement",
            value: byte_simm as i64,
        });
    }
    let word_simm = byte_simm / scale;
    if !(i16::MIN / scale..=i16::MAX / scale).contains(&word_simm) {
        return Err(EncodeError::FieldOverflow {
            field: "branch displacement",
            value: byte_simm as i64,
        });
    }
    Ok(((op as u32) << 26) | ((rs as u32) << 21) | ((rt_or_sub as u32) << 16) | (word_simm as u16 as u32))
}

fn jump_word(op: u8, byte_addr: u32, scale: u32) -> Result<u32, EncodeError> {
    if byte_addr % scale != 0 {
        return Err(EncodeError::FieldOverflow {
            field: "jump target",
            value: byte_addr as i64,
        });
    }
    let word_addr = byte_addr / scale;
    if word_addr > crate::utils::mask(26u32) {
        return Err(EncodeError::FieldOverflow {
            field: "jump target",
            value: byte_addr as i64,
        });
    }
    Ok(((op as u32) << 26) | word_addr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_addu() {
        // addu r3, r0, r5
        let word = 0x00051821;
        let instr = decode(word);
        assert_eq!(instr.op, Op::Addu);
        assert_eq!(instr.rs, 0);
        assert_eq!(instr.rt, 5);
        assert_eq!(instr.rd, 3);
    }

    #[test]
    fn decode_sll_zero_is_nop_shaped() {
        let instr = decode(0x0000_0000);
        assert_eq!(instr.op, Op::Sll);
        assert_eq!(instr.shamt, 0);
        assert_eq!(instr.rd, 0);
    }

    #[test]
    fn branch_is_byte_scaled() {
        // beq r1, r2, 3 (word units) -> bytes
        let word = ((OP_BEQ as u32) << 26) | (1 << 21) | (2 << 16) | 3;
        let instr = decode(word);
        assert_eq!(instr.simm, 12);
    }

    #[test]
    fn r1_round_trip() {
        let word = 0x00051821u32; // addu r3, r0, r5
        let decoded = decode(word);
        let encoded = encode(&decoded).unwrap();
        assert_eq!(encoded, word);
    }

    #[test]
    fn reserved_funct_is_invalid() {
        // opcode 0x00, funct 0x18 (MULT) is reserved per section 4.1
        let word = 0x0000_0018u32;
        assert_eq!(decode(word).op, Op::Invalid);
        assert!(matches!(
            decode_checked(word),
            Err(DecodeError::ReservedFunct(0x18))
        ));
    }

    #[test]
    fn encode_rejects_pseudo() {
        let instr = Instr::r(Op::Mov, 0, 5, 3);
        assert_eq!(
            encode(&instr),
            Err(EncodeError::PseudoNotNative(Op::Mov))
        );
    }

    #[test]
    fn jump_byte_address_round_trips() {
        let instr = Instr::jump(Op::J, 0x1000);
        let word = encode(&instr).unwrap();
        let back = decode(word);
        assert_eq!(back.addr, 0x1000);
    }
}
