//! Compressibility predicate (CP) and compressed codec (CC) for the
//! variable-length v2 re-encoding.
//!
//! A compressed unit is 2 bytes (short form, MSB of the first byte set)
//! or 4 bytes (long form, MSB clear: a native-shaped word whose
//! branch/jump displacements are word-scaled by 2 instead of 4, and
//! whose load/store opcodes are remapped into 0x18..0x1F). [`decode_v2`]
//! always hands back a fully native-shaped [`Instr`] (it runs
//! [`crate::pseudo::to_native`] internally) with `compressed` set to
//! say which form produced it; [`encode_v2`] re-derives the canonical
//! pseudo shape with [`crate::pseudo::to_pseudo`] before packing short,
//! so the two are exact inverses of each other.

use crate::error::{DecodeError, EncodeError};
use crate::instr::{Instr, Op};
use crate::native;
use crate::opcodes::{long, short};
use crate::pseudo;
use crate::utils::{extract_field, sign_extend_to_i32};

/// Either half of the variable-length wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressedWord {
    Short(u16),
    Long(u32),
}

impl CompressedWord {
    /// Big-endian bytes for this unit, as written to a v2 binary.
    pub fn to_be_bytes(self) -> Vec<u8> {
        match self {
            CompressedWord::Short(hw) => hw.to_be_bytes().to_vec(),
            CompressedWord::Long(w) => w.to_be_bytes().to_vec(),
        }
    }
}

/// True exactly when [`encode_v2`] can pack `instr` as a 2-byte short
/// instruction. Pure; does not consult or mutate `instr.compressed`.
pub fn is_compressible(instr: &Instr) -> bool {
    use Op::*;
    match instr.op {
        Nop | Mov | Clear | Not | Neg | Lsi | Jr | Jalr => true,
        Sll | Srl | Sra => instr.rd == instr.rt,
        Addu | Or | Xor => instr.rd == instr.rs || instr.rd == instr.rt,
        Subu | Sltu => instr.rd == instr.rs,
        Addiu => instr.rs == instr.rt && (-16..=15).contains(&instr.simm),
        Andi => instr.rs == instr.rt && instr.imm <= 31,
        Sw | Lw => instr.rs == 29 && instr.simm % 4 == 0 && instr.simm < 128,
        B | Bal => (-1024..=1022).contains(&instr.simm),
        Beqz | Bnez => (-32..=30).contains(&instr.simm),
        _ => false,
    }
}

/// Decode one compressed unit from the front of `bytes`. Returns the
/// decoded (native-shaped) instruction and the number of bytes
/// consumed (2 or 4).
pub fn decode_v2(bytes: &[u8]) -> Result<(Instr, usize), DecodeError> {
    if bytes.len() < 2 {
        return Err(DecodeError::Truncated {
            expected: 2 - bytes.len(),
        });
    }
    let hw0 = u16::from_be_bytes([bytes[0], bytes[1]]);

    if hw0 & 0x8000 != 0 {
        let decoded = decode_short(hw0)?;
        let mut instr = pseudo::to_native(decoded);
        instr.compressed = true;
        Ok((instr, 2))
    } else {
        if bytes.len() < 4 {
            return Err(DecodeError::Truncated {
                expected: 4 - bytes.len(),
            });
        }
        let hw1 = u16::from_be_bytes([bytes[2], bytes[3]]);
        let word = ((hw0 as u32) << 16) | hw1 as u32;
        let mut instr = native::decode_scaled(remap_long_word(word), 2);
        instr.compressed = false;
        Ok((instr, 4))
    }
}

/// Pack `instr` into the compressed wire format. If `instr.compressed`
/// is false, packs the long (4-byte) form via [`crate::pseudo::to_native`]
/// and the native codec's displacement-scaled-by-2 encoder. If true,
/// canonicalizes with [`crate::pseudo::to_pseudo`] and packs a short
/// form, failing with [`EncodeError::UncompressibleShort`] if the
/// canonical op is not one [`is_compressible`] accepts.
pub fn encode_v2(instr: &Instr) -> Result<CompressedWord, EncodeError> {
    if !instr.compressed {
        let native = pseudo::to_native(*instr);
        let word = native::encode_scaled(&native, 2)?;
        return Ok(CompressedWord::Long(remap_long_opcode_for_encode(word)));
    }

    let canonical = pseudo::to_pseudo(*instr);
    if !is_compressible(&canonical) {
        return Err(EncodeError::UncompressibleShort(instr.op));
    }
    encode_short(&canonical).map(CompressedWord::Short)
}

fn short_word(opcode: u8, rds: u8, operand: u8) -> u16 {
    0x8000 | ((opcode as u16) << 10) | ((rds as u16) << 5) | (operand as u16 & 0x1F)
}

fn short_word_b(opcode: u8, disp10: u16) -> u16 {
    0x8000 | ((opcode as u16) << 10) | (disp10 & 0x03FF)
}

fn encode_short(instr: &Instr) -> Result<u16, EncodeError> {
    use Op::*;
    let word = match instr.op {
        Nop => short_word(short::C_MOV, 0, 0),
        Mov => short_word(short::C_MOV, instr.rd, instr.rt),
        Clear => short_word(short::C_MOV, instr.rd, 0),
        Addu => {
            let other = if instr.rd == instr.rs { instr.rt } else { instr.rs };
            short_word(short::C_ADDU, instr.rd, other)
        }
        Subu => short_word(short::C_SUBU, instr.rd, instr.rt),
        Or => {
            let other = if instr.rd == instr.rs { instr.rt } else { instr.rs };
            short_word(short::C_OR, instr.rd, other)
        }
        Xor => {
            let other = if instr.rd == instr.rs { instr.rt } else { instr.rs };
            short_word(short::C_XOR, instr.rd, other)
        }
        Neg => short_word(short::C_NEG, instr.rd, instr.rt),
        Not => short_word(short::C_NOT, instr.rd, instr.rt),
        Sltu => short_word(short::C_SLTU, instr.rd, instr.rt),
        Addiu => short_word(short::C_ADDIU, instr.rt, small_simm(instr.simm)?),
        Andi => short_word(short::C_ANDI, instr.rt, small_uimm(instr.imm)?),
        Sll => short_word(short::C_SLL, instr.rd, instr.shamt),
        Srl => short_word(short::C_SRL, instr.rd, instr.shamt),
        Sra => short_word(short::C_SRA, instr.rd, instr.shamt),
        Lsi => short_word(short::C_LSI, instr.rd, small_simm(instr.simm)?),
        B => short_word_b(short::C_B, word_scaled10(instr.simm)?),
        Bal => short_word_b(short::C_BAL, word_scaled10(instr.simm)?),
        Beqz => short_word(short::C_BEQZ, instr.rs, small_word_simm(instr.simm)?),
        Bnez => short_word(short::C_BNEZ, instr.rs, small_word_simm(instr.simm)?),
        Jr => short_word(short::C_JALR, 0, instr.rs),
        Jalr => short_word(short::C_JALR, instr.rd, instr.rs),
        Lw if instr.rs == 29 => short_word(short::C_LWS, instr.rt, stack_uimm(instr.simm)?),
        Sw if instr.rs == 29 => short_word(short::C_SWS, instr.rt, stack_uimm(instr.simm)?),
        _ => return Err(EncodeError::UncompressibleShort(instr.op)),
    };
    Ok(word)
}

fn small_simm(simm: i16) -> Result<u8, EncodeError> {
    if !(-16..=15).contains(&simm) {
        return Err(EncodeError::FieldOverflow {
            field: "short immediate",
            value: simm as i64,
        });
    }
    Ok((simm as i8 as u8) & 0x1F)
}

fn small_uimm(imm: u16) -> Result<u8, EncodeError> {
    if imm > 31 {
        return Err(EncodeError::FieldOverflow {
            field: "short unsigned immediate",
            value: imm as i64,
        });
    }
    Ok(imm as u8)
}

fn small_word_simm(byte_simm: i16) -> Result<u8, EncodeError> {
    if byte_simm % 2 != 0 {
        return Err(EncodeError::FieldOverflow {
            field: "short branch displacement",
            value: byte_simm as i64,
        });
    }
    small_simm(byte_simm / 2)
}

fn word_scaled10(byte_simm: i16) -> Result<u16, EncodeError> {
    if byte_simm % 2 != 0 {
        return Err(EncodeError::FieldOverflow {
            field: "short branch displacement",
            value: byte_simm as i64,
        });
    }
    let word_simm = byte_simm / 2;
    if !(-512..=511).contains(&word_simm) {
        return Err(EncodeError::FieldOverflow {
            field: "short branch displacement",
            value: byte_simm as i64,
        });
    }
    Ok((word_simm as i16 as u16) & 0x03FF)
}

fn stack_uimm(byte_simm: i16) -> Result<u8, EncodeError> {
    if byte_simm % 4 != 0 || !(0..128).contains(&byte_simm) {
        return Err(EncodeError::FieldOverflow {
            field: "stack offset",
            value: byte_simm as i64,
        });
    }
    Ok((byte_simm / 4) as u8)
}

fn decode_short(hw0: u16) -> Result<Instr, DecodeError> {
    let opcode5 = ((hw0 >> 10) & 0x1F) as u8;
    let rds = ((hw0 >> 5) & 0x1F) as u8;
    let operand5 = (hw0 & 0x1F) as u8;
    let disp10 = hw0 & 0x03FF;
    let simm5 = sign_extend_to_i32(operand5 as u32, 5) as i16;
    let disp10_simm = sign_extend_to_i32(disp10 as u32, 10) as i16;

    let instr = match opcode5 {
        short::C_MOV if operand5 == 0 => Instr {
            op: Op::Clear,
            rd: rds,
            ..Instr::invalid()
        },
        short::C_MOV => Instr {
            op: Op::Mov,
            rd: rds,
            rt: operand5,
            ..Instr::invalid()
        },
        short::C_ADDU => Instr::r(Op::Addu, rds, operand5, rds),
        short::C_SUBU => Instr::r(Op::Subu, rds, operand5, rds),
        short::C_OR => Instr::r(Op::Or, rds, operand5, rds),
        short::C_XOR => Instr::r(Op::Xor, rds, operand5, rds),
        short::C_NEG => Instr {
            op: Op::Neg,
            rd: rds,
            rt: operand5,
            ..Instr::invalid()
        },
        short::C_NOT => Instr {
            op: Op::Not,
            rd: rds,
            rt: operand5,
            ..Instr::invalid()
        },
        short::C_SLTU => Instr::r(Op::Sltu, rds, operand5, rds),
        short::C_ADDIU => Instr::i(Op::Addiu, rds, rds, simm5),
        short::C_ANDI => Instr {
            op: Op::Andi,
            rs: rds,
            rt: rds,
            imm: operand5 as u16,
            simm: operand5 as i16,
            ..Instr::invalid()
        },
        short::C_SLL => Instr::sh(Op::Sll, rds, rds, operand5),
        short::C_SRL => Instr::sh(Op::Srl, rds, rds, operand5),
        short::C_SRA => Instr::sh(Op::Sra, rds, rds, operand5),
        short::C_LSI => Instr {
            op: Op::Lsi,
            rd: rds,
            simm: simm5,
            ..Instr::invalid()
        },
        short::C_B => Instr {
            op: Op::B,
            simm: disp10_simm.wrapping_mul(2),
            ..Instr::invalid()
        },
        short::C_BAL => Instr {
            op: Op::Bal,
            simm: disp10_simm.wrapping_mul(2),
            ..Instr::invalid()
        },
        short::C_BEQZ => Instr {
            op: Op::Beqz,
            rs: rds,
            simm: simm5.wrapping_mul(2),
            ..Instr::invalid()
        },
        short::C_BNEZ => Instr {
            op: Op::Bnez,
            rs: rds,
            simm: simm5.wrapping_mul(2),
            ..Instr::invalid()
        },
        short::C_JALR if rds == 0 => Instr::r(Op::Jr, operand5, 0, 0),
        short::C_JALR => Instr::r(Op::Jalr, operand5, 0, rds),
        short::C_LWS => Instr::i(Op::Lw, 29, rds, (operand5 as i16) * 4),
        short::C_SWS => Instr::i(Op::Sw, 29, rds, (operand5 as i16) * 4),
        _ => return Err(DecodeError::InvalidCompressed(hw0)),
    };
    Ok(instr)
}

fn remap_long_opcode(op_bits: u8) -> u8 {
    match op_bits {
        long::OP_LB => crate::opcodes::OP_LB,
        long::OP_LH => crate::opcodes::OP_LH,
        long::OP_LW => crate::opcodes::OP_LW,
        long::OP_LBU => crate::opcodes::OP_LBU,
        long::OP_LHU => crate::opcodes::OP_LHU,
        long::OP_SB => crate::opcodes::OP_SB,
        long::OP_SH => crate::opcodes::OP_SH,
        long::OP_SW => crate::opcodes::OP_SW,
        other => other,
    }
}

fn remap_native_opcode_to_long(op_bits: u8) -> u8 {
    match op_bits {
        x if x == crate::opcodes::OP_LB => long::OP_LB,
        x if x == crate::opcodes::OP_LH => long::OP_LH,
        x if x == crate::opcodes::OP_LW => long::OP_LW,
        x if x == crate::opcodes::OP_LBU => long::OP_LBU,
        x if x == crate::opcodes::OP_LHU => long::OP_LHU,
        x if x == crate::opcodes::OP_SB => long::OP_SB,
        x if x == crate::opcodes::OP_SH => long::OP_SH,
        x if x == crate::opcodes::OP_SW => long::OP_SW,
        other => other,
    }
}

fn remap_long_word(word: u32) -> u32 {
    let op_bits = extract_field(word, 31, 26) as u8;
    (word & 0x03FF_FFFF) | ((remap_long_opcode(op_bits) as u32) << 26)
}

fn remap_long_opcode_for_encode(word: u32) -> u32 {
    let op_bits = extract_field(word, 31, 26) as u8;
    (word & 0x03FF_FFFF) | ((remap_native_opcode_to_long(op_bits) as u32) << 26)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_is_compressible() {
        let clear = Instr {
            op: Op::Clear,
            rd: 4,
            ..Instr::invalid()
        };
        assert!(is_compressible(&clear));
    }

    #[test]
    fn addu_needs_shared_operand() {
        let shared = Instr::r(Op::Addu, 4, 5, 4);
        let not_shared = Instr::r(Op::Addu, 4, 5, 6);
        assert!(is_compressible(&shared));
        assert!(!is_compressible(&not_shared));
    }

    #[test]
    fn short_round_trip_mov() {
        let mov = Instr {
            op: Op::Mov,
            rd: 4,
            rt: 7,
            compressed: true,
            ..Instr::invalid()
        };
        let packed = encode_v2(&mov).unwrap();
        let bytes = packed.to_be_bytes();
        let (decoded, consumed) = decode_v2(&bytes).unwrap();
        assert_eq!(consumed, 2);
        assert_eq!(decoded.op, Op::Addu);
        assert_eq!(decoded.rt, 7);
        assert_eq!(decoded.rd, 4);
        assert!(decoded.compressed);
    }

    #[test]
    fn short_round_trip_b() {
        let b = Instr {
            op: Op::B,
            simm: 20,
            compressed: true,
            ..Instr::invalid()
        };
        let packed = encode_v2(&b).unwrap();
        let (decoded, consumed) = decode_v2(&packed.to_be_bytes()).unwrap();
        assert_eq!(consumed, 2);
        assert_eq!(decoded.simm, 20);
    }

    #[test]
    fn long_round_trip_addu_nonshared() {
        let instr = Instr::r(Op::Addu, 4, 5, 6);
        let packed = encode_v2(&instr).unwrap();
        assert!(matches!(packed, CompressedWord::Long(_)));
        let (decoded, consumed) = decode_v2(&packed.to_be_bytes()).unwrap();
        assert_eq!(consumed, 4);
        assert_eq!(decoded.op, Op::Addu);
        assert_eq!(decoded.rs, 4);
        assert_eq!(decoded.rt, 5);
        assert_eq!(decoded.rd, 6);
    }

    #[test]
    fn long_branch_is_scaled_by_two() {
        let instr = Instr::branch(Op::Beq, 1, 2, 40);
        let packed = encode_v2(&instr).unwrap();
        let (decoded, _) = decode_v2(&packed.to_be_bytes()).unwrap();
        assert_eq!(decoded.simm, 40);
    }

    #[test]
    fn uncompressible_short_is_rejected() {
        let instr = Instr {
            op: Op::Add,
            rs: 1,
            rt: 2,
            rd: 3,
            compressed: true,
            ..Instr::invalid()
        };
        assert!(matches!(
            encode_v2(&instr),
            Err(EncodeError::UncompressibleShort(Op::Add))
        ));
    }

    #[test]
    fn truncated_stream_reports_expected_bytes() {
        assert!(matches!(
            decode_v2(&[0x80]),
            Err(DecodeError::Truncated { expected: 1 })
        ));
    }
}
