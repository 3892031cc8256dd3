//! The pseudo canonicalizer (PC): rewrites instructions that only use
//! the zero register and/or a zero immediate into the shorter pseudo-op
//! they're identities of, and back.
//!
//! `to_pseudo` is a total function: anything already pseudo (or
//! `Invalid`) passes through unchanged, which gives idempotence (I7)
//! for free. `to_native` is the strict inverse of the rewrite table,
//! not of `to_pseudo` itself -- feeding it an already-native op is a
//! no-op.
//!
//! Canonical operand slots for the pseudo ops (how `to_pseudo` packs
//! them and `to_native` reads them back):
//!
//! | op    | fields used              |
//! |-------|---------------------------|
//! | Nop   | none                      |
//! | Mov   | rd = dest, rt = source    |
//! | Clear | rd = dest                 |
//! | Not   | rd = dest, rt = source    |
//! | Neg   | rd = dest, rt = source    |
//! | B     | simm = displacement       |
//! | Bal   | simm = displacement       |
//! | Beqz  | rs = tested, simm = disp  |
//! | Bnez  | rs = tested, simm = disp  |
//! | Seqz  | rd = dest, rs = source    |
//! | Snez  | rd = dest, rt = source    |
//! | Sltz  | rd = dest, rs = source    |
//! | Lsi   | rd = dest, simm = value   |

use crate::instr::{Instr, Op};

/// Rewrite a native instruction into its pseudo form when it matches one
/// of the zero-register/zero-immediate identities. Instructions that
/// are already pseudo, or that match none of the identities, are
/// returned unchanged.
pub fn to_pseudo(instr: Instr) -> Instr {
    if !instr.op.is_native() {
        return instr;
    }

    match instr.op {
        Op::Sll | Op::Srl | Op::Sra => shift_to_pseudo(instr),
        Op::Sllv | Op::Srlv | Op::Srav => shiftv_to_pseudo(instr),
        Op::Addu => addu_to_pseudo(instr),
        Op::Subu => subu_to_pseudo(instr),
        Op::And => and_to_pseudo(instr),
        Op::Or | Op::Xor => or_xor_to_pseudo(instr),
        Op::Nor => nor_to_pseudo(instr),
        Op::Addiu => addiu_to_pseudo(instr),
        Op::Andi => andi_to_pseudo(instr),
        Op::Ori | Op::Xori => ori_xori_to_pseudo(instr),
        Op::Lui => lui_to_pseudo(instr),
        Op::Slt => slt_to_pseudo(instr),
        Op::Sltu => sltu_to_pseudo(instr),
        Op::Slti => slti_to_pseudo(instr),
        Op::Sltiu => sltiu_to_pseudo(instr),
        Op::Bgez | Op::Bgezal => bgez_family_to_pseudo(instr),
        Op::Beq => beq_to_pseudo(instr),
        Op::Bne => bne_to_pseudo(instr),
        Op::Blez => blez_to_pseudo(instr),
        Op::Jalr => jalr_to_pseudo(instr),
        _ => instr,
    }
}

/// Rewrite a pseudo-op back into the native instruction it is an
/// identity of. Instructions that are already native are returned
/// unchanged.
pub fn to_native(instr: Instr) -> Instr {
    if !instr.op.is_pseudo() {
        return instr;
    }

    match instr.op {
        Op::Nop => Instr::r(Op::Addu, 0, 0, 0),
        Op::Mov => Instr::r(Op::Addu, 0, instr.rt, instr.rd),
        Op::Clear => Instr::r(Op::Addu, 0, 0, instr.rd),
        Op::Not => Instr::r(Op::Nor, 0, instr.rt, instr.rd),
        Op::Neg => Instr::r(Op::Subu, 0, instr.rt, instr.rd),
        Op::B => Instr::branch(Op::Bgez, 0, 0, instr.simm),
        Op::Bal => Instr::branch(Op::Bgezal, 0, 0, instr.simm),
        Op::Beqz => Instr::branch(Op::Beq, instr.rs, 0, instr.simm),
        Op::Bnez => Instr::branch(Op::Bne, instr.rs, 0, instr.simm),
        Op::Seqz => Instr::i(Op::Sltiu, instr.rs, instr.rd, 1),
        Op::Snez => Instr::r(Op::Sltu, 0, instr.rt, instr.rd),
        Op::Sltz => Instr::r(Op::Slt, instr.rs, 0, instr.rd),
        Op::Lsi => Instr::i(Op::Addiu, 0, instr.rd, instr.simm),
        _ => instr,
    }
}

fn shift_to_pseudo(instr: Instr) -> Instr {
    if instr.rd == 0 {
        return Instr {
            op: Op::Nop,
            ..Instr::invalid()
        };
    }
    if instr.op == Op::Srl && instr.shamt == 31 {
        return Instr {
            op: Op::Sltz,
            rd: instr.rd,
            rs: instr.rt,
            ..Instr::invalid()
        };
    }
    if instr.shamt == 0 {
        if instr.op == Op::Sll && instr.rt == 0 {
            return Instr {
                op: Op::Clear,
                rd: instr.rd,
                ..Instr::invalid()
            };
        }
        return Instr {
            op: Op::Mov,
            rd: instr.rd,
            rt: instr.rt,
            ..Instr::invalid()
        };
    }
    instr
}

fn shiftv_to_pseudo(instr: Instr) -> Instr {
    if instr.rd == 0 {
        return Instr {
            op: Op::Nop,
            ..Instr::invalid()
        };
    }
    if instr.rs == 0 {
        return Instr {
            op: Op::Clear,
            rd: instr.rd,
            ..Instr::invalid()
        };
    }
    if instr.rt == 0 {
        return Instr {
            op: Op::Mov,
            rd: instr.rd,
            rt: instr.rs,
            ..Instr::invalid()
        };
    }
    instr
}

fn addu_to_pseudo(instr: Instr) -> Instr {
    if instr.rd == 0 {
        return Instr {
            op: Op::Nop,
            ..Instr::invalid()
        };
    }
    match (instr.rs == 0, instr.rt == 0) {
        (true, true) => Instr {
            op: Op::Clear,
            rd: instr.rd,
            ..Instr::invalid()
        },
        (true, false) => Instr {
            op: Op::Mov,
            rd: instr.rd,
            rt: instr.rt,
            ..Instr::invalid()
        },
        (false, true) => Instr {
            op: Op::Mov,
            rd: instr.rd,
            rt: instr.rs,
            ..Instr::invalid()
        },
        (false, false) => instr,
    }
}

fn subu_to_pseudo(instr: Instr) -> Instr {
    if instr.rd == 0 {
        return Instr {
            op: Op::Nop,
            ..Instr::invalid()
        };
    }
    match (instr.rs == 0, instr.rt == 0) {
        (true, true) => Instr {
            op: Op::Clear,
            rd: instr.rd,
            ..Instr::invalid()
        },
        (true, false) => Instr {
            op: Op::Neg,
            rd: instr.rd,
            rt: instr.rt,
            ..Instr::invalid()
        },
        (false, true) => Instr {
            op: Op::Mov,
            rd: instr.rd,
            rt: instr.rs,
            ..Instr::invalid()
        },
        (false, false) => instr,
    }
}

fn and_to_pseudo(instr: Instr) -> Instr {
    if instr.rd == 0 {
        return Instr {
            op: Op::Nop,
            ..Instr::invalid()
        };
    }
    if instr.rs == 0 || instr.rt == 0 {
        return Instr {
            op: Op::Clear,
            rd: instr.rd,
            ..Instr::invalid()
        };
    }
    instr
}

fn or_xor_to_pseudo(instr: Instr) -> Instr {
    if instr.rd == 0 {
        return Instr {
            op: Op::Nop,
            ..Instr::invalid()
        };
    }
    match (instr.rs == 0, instr.rt == 0) {
        (true, true) => Instr {
            op: Op::Clear,
            rd: instr.rd,
            ..Instr::invalid()
        },
        (true, false) => Instr {
            op: Op::Mov,
            rd: instr.rd,
            rt: instr.rt,
            ..Instr::invalid()
        },
        (false, true) => Instr {
            op: Op::Mov,
            rd: instr.rd,
            rt: instr.rs,
            ..Instr::invalid()
        },
        (false, false) => instr,
    }
}

fn nor_to_pseudo(instr: Instr) -> Instr {
    if instr.rd == 0 {
        return Instr {
            op: Op::Nop,
            ..Instr::invalid()
        };
    }
    match (instr.rs == 0, instr.rt == 0) {
        (true, false) => Instr {
            op: Op::Not,
            rd: instr.rd,
            rt: instr.rt,
            ..Instr::invalid()
        },
        (false, true) => Instr {
            op: Op::Not,
            rd: instr.rd,
            rt: instr.rs,
            ..Instr::invalid()
        },
        _ => instr,
    }
}

fn addiu_to_pseudo(instr: Instr) -> Instr {
    if instr.rt == 0 {
        return Instr {
            op: Op::Nop,
            ..Instr::invalid()
        };
    }
    if instr.rs == 0 && instr.simm == 0 {
        return Instr {
            op: Op::Clear,
            rd: instr.rt,
            ..Instr::invalid()
        };
    }
    if instr.simm == 0 {
        return Instr {
            op: Op::Mov,
            rd: instr.rt,
            rt: instr.rs,
            ..Instr::invalid()
        };
    }
    if instr.rs == 0 && (-16..=15).contains(&instr.simm) {
        return Instr {
            op: Op::Lsi,
            rd: instr.rt,
            simm: instr.simm,
            ..Instr::invalid()
        };
    }
    instr
}

fn andi_to_pseudo(instr: Instr) -> Instr {
    if instr.rt == 0 {
        return Instr {
            op: Op::Nop,
            ..Instr::invalid()
        };
    }
    if instr.rs == 0 || instr.imm == 0 {
        return Instr {
            op: Op::Clear,
            rd: instr.rt,
            ..Instr::invalid()
        };
    }
    instr
}

fn ori_xori_to_pseudo(instr: Instr) -> Instr {
    if instr.rt == 0 {
        return Instr {
            op: Op::Nop,
            ..Instr::invalid()
        };
    }
    if instr.rs == 0 && instr.imm == 0 {
        return Instr {
            op: Op::Clear,
            rd: instr.rt,
            ..Instr::invalid()
        };
    }
    if instr.imm == 0 {
        return Instr {
            op: Op::Mov,
            rd: instr.rt,
            rt: instr.rs,
            ..Instr::invalid()
        };
    }
    instr
}

fn lui_to_pseudo(instr: Instr) -> Instr {
    if instr.imm == 0 {
        return Instr {
            op: Op::Clear,
            rd: instr.rt,
            ..Instr::invalid()
        };
    }
    instr
}

fn slt_to_pseudo(instr: Instr) -> Instr {
    if instr.rt == 0 {
        return Instr {
            op: Op::Sltz,
            rd: instr.rd,
            rs: instr.rs,
            ..Instr::invalid()
        };
    }
    instr
}

fn sltu_to_pseudo(instr: Instr) -> Instr {
    if instr.rs == 0 {
        return Instr {
            op: Op::Snez,
            rd: instr.rd,
            rt: instr.rt,
            ..Instr::invalid()
        };
    }
    instr
}

fn slti_to_pseudo(instr: Instr) -> Instr {
    if instr.simm == 0 {
        return Instr {
            op: Op::Sltz,
            rd: instr.rt,
            rs: instr.rs,
            ..Instr::invalid()
        };
    }
    instr
}

fn sltiu_to_pseudo(instr: Instr) -> Instr {
    if instr.simm == 1 {
        return Instr {
            op: Op::Seqz,
            rd: instr.rt,
            rs: instr.rs,
            ..Instr::invalid()
        };
    }
    instr
}

fn bgez_family_to_pseudo(instr: Instr) -> Instr {
    if instr.rs == 0 {
        let op = if instr.op == Op::Bgezal { Op::Bal } else { Op::B };
        return Instr {
            op,
            simm: instr.simm,
            ..Instr::invalid()
        };
    }
    instr
}

fn beq_to_pseudo(instr: Instr) -> Instr {
    if instr.rs == instr.rt {
        return Instr {
            op: Op::B,
            simm: instr.simm,
            ..Instr::invalid()
        };
    }
    match (instr.rs == 0, instr.rt == 0) {
        (true, false) => Instr {
            op: Op::Beqz,
            rs: instr.rt,
            simm: instr.simm,
            ..Instr::invalid()
        },
        (false, true) => Instr {
            op: Op::Beqz,
            rs: instr.rs,
            simm: instr.simm,
            ..Instr::invalid()
        },
        _ => instr,
    }
}

fn bne_to_pseudo(instr: Instr) -> Instr {
    match (instr.rs == 0, instr.rt == 0) {
        (true, false) => Instr {
            op: Op::Bnez,
            rs: instr.rt,
            simm: instr.simm,
            ..Instr::invalid()
        },
        (false, true) => Instr {
            op: Op::Bnez,
            rs: instr.rs,
            simm: instr.simm,
            ..Instr::invalid()
        },
        _ => instr,
    }
}

fn blez_to_pseudo(instr: Instr) -> Instr {
    if instr.rs == 0 {
        return Instr {
            op: Op::B,
            simm: instr.simm,
            ..Instr::invalid()
        };
    }
    instr
}

fn jalr_to_pseudo(instr: Instr) -> Instr {
    if instr.rd == 0 {
        return Instr {
            op: Op::Jr,
            rs: instr.rs,
            ..Instr::invalid()
        };
    }
    instr
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addu_zero_zero_is_clear() {
        let native = Instr::r(Op::Addu, 0, 0, 3);
        let pseudo = to_pseudo(native);
        assert_eq!(pseudo.op, Op::Clear);
        assert_eq!(pseudo.rd, 3);
    }

    #[test]
    fn addu_one_zero_is_mov() {
        let native = Instr::r(Op::Addu, 0, 5, 3);
        let pseudo = to_pseudo(native);
        assert_eq!(pseudo.op, Op::Mov);
        assert_eq!(pseudo.rd, 3);
        assert_eq!(pseudo.rt, 5);
    }

    #[test]
    fn addu_nonzero_both_unchanged() {
        let native = Instr::r(Op::Addu, 4, 5, 3);
        assert_eq!(to_pseudo(native), native);
    }

    #[test]
    fn rd_zero_is_always_nop() {
        let native = Instr::r(Op::Addu, 4, 5, 0);
        assert_eq!(to_pseudo(native).op, Op::Nop);
    }

    #[test]
    fn srl_shamt_31_is_sltz() {
        let native = Instr::sh(Op::Srl, 7, 3, 31);
        let pseudo = to_pseudo(native);
        assert_eq!(pseudo.op, Op::Sltz);
        assert_eq!(pseudo.rd, 3);
        assert_eq!(pseudo.rs, 7);
    }

    #[test]
    fn addiu_small_const_is_lsi() {
        let native = Instr::i(Op::Addiu, 0, 4, 7);
        let pseudo = to_pseudo(native);
        assert_eq!(pseudo.op, Op::Lsi);
        assert_eq!(pseudo.rd, 4);
        assert_eq!(pseudo.simm, 7);
    }

    #[test]
    fn addiu_out_of_lsi_range_unchanged() {
        let native = Instr::i(Op::Addiu, 0, 4, 100);
        assert_eq!(to_pseudo(native), native);
    }

    #[test]
    fn beq_equal_regs_is_b() {
        let native = Instr::branch(Op::Beq, 2, 2, 8);
        let pseudo = to_pseudo(native);
        assert_eq!(pseudo.op, Op::B);
        assert_eq!(pseudo.simm, 8);
    }

    #[test]
    fn beq_one_zero_is_beqz() {
        let native = Instr::branch(Op::Beq, 0, 6, 8);
        let pseudo = to_pseudo(native);
        assert_eq!(pseudo.op, Op::Beqz);
        assert_eq!(pseudo.rs, 6);
    }

    #[test]
    fn to_pseudo_is_idempotent() {
        let native = Instr::r(Op::Addu, 0, 5, 3);
        let once = to_pseudo(native);
        let twice = to_pseudo(once);
        assert_eq!(once, twice);
    }

    #[test]
    fn mov_round_trips_through_native() {
        let native = Instr::r(Op::Addu, 0, 5, 3);
        let pseudo = to_pseudo(native);
        let back = to_native(pseudo);
        assert_eq!(back.op, Op::Addu);
        assert_eq!(back.rs, 0);
        assert_eq!(back.rt, 5);
        assert_eq!(back.rd, 3);
    }

    #[test]
    fn lsi_round_trips_through_native() {
        let pseudo = Instr {
            op: Op::Lsi,
            rd: 4,
            simm: -3,
            ..Instr::invalid()
        };
        let native = to_native(pseudo);
        assert_eq!(native.op, Op::Addiu);
        assert_eq!(native.rs, 0);
        assert_eq!(native.rt, 4);
        assert_eq!(native.simm, -3);
    }

    #[test]
    fn to_native_passes_through_already_native() {
        let native = Instr::r(Op::Addu, 1, 2, 3);
        assert_eq!(to_native(native), native);
    }

    #[test]
    fn jalr_rd_zero_is_jr() {
        let native = Instr::r(Op::Jalr, 5, 0, 0);
        let pseudo = to_pseudo(native);
        assert_eq!(pseudo.op, Op::Jr);
        assert_eq!(pseudo.rs, 5);
    }
}
