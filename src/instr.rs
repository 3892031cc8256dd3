//! The shared instruction model (IM): a closed, totally-ordered
//! operation tag plus a flat bag of decoded operand fields.
//!
//! Every other component -- the native codec, the pseudo
//! canonicalizer, the compressed codec, the layout solver and the
//! simulator -- reads and writes this one type. Values are plain data
//! (`Copy`); there is no aliasing and no component mutates another's
//! copy.

use std::fmt;

/// Operation tag. Declaration order *is* the total order required by
/// invariant I5/section 3: everything before [`Op::Nop`] is
/// native-expressible, everything from `Nop` onward is pseudo-only.
/// [`Op::Invalid`] is a reserved sentinel past the boundary; it is
/// never produced by the pseudo canonicalizer and never accepted by
/// the native encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Op {
    // --- ALU-R ---
    Sll,
    Srl,
    Sra,
    Sllv,
    Srlv,
    Srav,
    Add,
    Addu,
    Sub,
    Subu,
    And,
    Or,
    Xor,
    Nor,
    Slt,
    Sltu,

    // --- ALU-I ---
    Addi,
    Addiu,
    Andi,
    Ori,
    Xori,
    Slti,
    Sltiu,
    Lui,

    // --- Memory ---
    Lb,
    Lh,
    Lw,
    Lbu,
    Lhu,
    Sb,
    Sh,
    Sw,

    // --- Control ---
    Bltz,
    Bgez,
    Bltzal,
    Bgezal,
    Beq,
    Bne,
    Blez,
    Bgtz,
    J,
    Jal,
    Jr,
    Jalr,

    // --- COP0 ---
    Mfc0,
    Mtc0,

    /// First pseudo-op; see the boundary note on this enum.
    Nop,
    Mov,
    Clear,
    Not,
    Neg,
    B,
    Bal,
    Beqz,
    Bnez,
    Seqz,
    Snez,
    Sltz,
    /// Load Small Immediate: `rd <- simm`, see invariant I6.
    Lsi,

    /// Reserved sentinel for a word/half-word that decoded to no
    /// supported operation.
    Invalid,
}

impl Op {
    /// `true` for every op strictly before [`Op::Nop`] (the native
    /// codec can encode it without going through the pseudo
    /// canonicalizer's inverse mapping first).
    pub fn is_native(self) -> bool {
        self < Op::Nop
    }

    pub fn is_pseudo(self) -> bool {
        self >= Op::Nop && self != Op::Invalid
    }
}

/// A fully decoded instruction.
///
/// `imm`/`simm` are two views of the same 16-bit ALU-I/memory
/// immediate (unsigned and sign-extended); `addr` holds a jump target
/// and is always byte-addressed per invariant I5, regardless of
/// whether it came from a native (word-scaled by 4) or compressed
/// (word-scaled by 2) encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instr {
    pub op: Op,
    pub rs: u8,
    pub rt: u8,
    pub rd: u8,
    pub shamt: u8,
    pub imm: u16,
    pub simm: i16,
    pub addr: u32,
    /// Set by the compressibility predicate at decode/seed time, and
    /// flipped by the layout solver while converging; read by the
    /// compressed encoder to choose short vs. long packing.
    pub compressed: bool,
}

impl Instr {
    /// An all-zero instruction tagged `Invalid`; a safe placeholder
    /// before a decoder has run.
    pub const INVALID: Instr = Instr {
        op: Op::Invalid,
        rs: 0,
        rt: 0,
        rd: 0,
        shamt: 0,
        imm: 0,
        simm: 0,
        addr: 0,
        compressed: false,
    };

    pub fn invalid() -> Self {
        Self::INVALID
    }

    /// Construct a bare R-type-shaped instruction (rs/rt/rd only).
    pub fn r(op: Op, rs: u8, rt: u8, rd: u8) -> Self {
        Self {
            op,
            rs,
            rt,
            rd,
            ..Self::INVALID
        }
    }

    /// Construct a bare shift-shaped instruction (rt/rd/shamt).
    pub fn sh(op: Op, rt: u8, rd: u8, shamt: u8) -> Self {
        Self {
            op,
            rt,
            rd,
            shamt,
            ..Self::INVALID
        }
    }

    /// Construct a bare I-type-shaped instruction (rs/rt/simm).
    pub fn i(op: Op, rs: u8, rt: u8, simm: i16) -> Self {
        Self {
            op,
            rs,
            rt,
            imm: simm as u16,
            simm,
            ..Self::INVALID
        }
    }

    /// Construct a bare branch-shaped instruction (rs/rt/simm, byte units).
    pub fn branch(op: Op, rs: u8, rt: u8, simm: i16) -> Self {
        Self {
            op,
            rs,
            rt,
            simm,
            ..Self::INVALID
        }
    }

    /// Construct a bare jump-shaped instruction (addr, byte units).
    pub fn jump(op: Op, addr: u32) -> Self {
        Self {
            op,
            addr,
            ..Self::INVALID
        }
    }
}

fn reg(n: u8) -> String {
    format!("r{n}")
}

impl fmt::Display for Instr {
    /// Render the instruction in a MIPS-assembler-like textual form,
    /// used directly by the disassembler binary.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Op::*;
        match self.op {
            Sll | Srl | Sra => write!(
                f,
                "{} {}, {}, {}",
                mnemonic(self.op),
                reg(self.rd),
                reg(self.rt),
                self.shamt
            ),
            Sllv | Srlv | Srav | Add | Addu | Sub | Subu | And | Or | Xor | Nor | Slt | Sltu => {
                write!(
                    f,
                    "{} {}, {}, {}",
                    mnemonic(self.op),
                    reg(self.rd),
                    reg(self.rs),
                    reg(self.rt)
                )
            }
            Addi | Addiu | Slti | Sltiu => write!(
                f,
                "{} {}, {}, {}",
                mnemonic(self.op),
                reg(self.rt),
                reg(self.rs),
                self.simm
            ),
            Andi | Ori | Xori => write!(
                f,
                "{} {}, {}, {}",
                mnemonic(self.op),
                reg(self.rt),
                reg(self.rs),
                self.imm
            ),
            Lui => write!(f, "lui {}, {}", reg(self.rt), self.imm),
            Lb | Lh | Lw | Lbu | Lhu | Sb | Sh | Sw => write!(
                f,
                "{} {}, {}({})",
                mnemonic(self.op),
                reg(self.rt),
                self.simm,
                reg(self.rs)
            ),
            Bltz | Bgez | Bltzal | Bgezal => {
                write!(f, "{} {}, {}", mnemonic(self.op), reg(self.rs), self.simm)
            }
            Beq | Bne => write!(
                f,
                "{} {}, {}, {}",
                mnemonic(self.op),
                reg(self.rs),
                reg(self.rt),
                self.simm
            ),
            Blez | Bgtz => write!(f, "{} {}, {}", mnemonic(self.op), reg(self.rs), self.simm),
            J | Jal => write!(f, "{} 0x{:x}", mnemonic(self.op), self.addr),
            Jr => write!(f, "jr {}", reg(self.rs)),
            Jalr => write!(f, "jalr {}, {}", reg(self.rd), reg(self.rs)),
            Mfc0 => write!(f, "mfc0 {}, ${}", reg(self.rt), self.rd),
            Mtc0 => write!(f, "mtc0 {}, ${}", reg(self.rt), self.rd),
            Nop => write!(f, "nop"),
            Mov => write!(f, "mov {}, {}", reg(self.rd), reg(self.rt)),
            Clear => write!(f, "clear {}", reg(self.rd)),
            Not => write!(f, "not {}, {}", reg(self.rd), reg(self.rt)),
            Neg => write!(f, "neg {}, {}", reg(self.rd), reg(self.rt)),
            B => write!(f, "b {}", self.simm),
            Bal => write!(f, "bal {}", self.simm),
            Beqz => write!(f, "beqz {}, {}", reg(self.rs), self.simm),
            Bnez => write!(f, "bnez {}, {}", reg(self.rs), self.simm),
            Seqz => write!(f, "seqz {}, {}", reg(self.rd), reg(self.rs)),
            Snez => write!(f, "snez {}, {}", reg(self.rd), reg(self.rt)),
            Sltz => write!(f, "sltz {}, {}", reg(self.rd), reg(self.rs)),
            Lsi => write!(f, "lsi {}, {}", reg(self.rt), self.simm),
            Invalid => write!(f, "<invalid>"),
        }
    }
}

fn mnemonic(op: Op) -> &'static str {
    use Op::*;
    match op {
        Sll => "sll",
        Srl => "srl",
        Sra => "sra",
        Sllv => "sllv",
        Srlv => "srlv",
        Srav => "srav",
        Add => "add",
        Addu => "addu",
        Sub => "sub",
        Subu => "subu",
        And => "and",
        Or => "or",
        Xor => "xor",
        Nor => "nor",
        Slt => "slt",
        Sltu => "sltu",
        Addi => "addi",
        Addiu => "addiu",
        Andi => "andi",
        Ori => "ori",
        Xori => "xori",
        Slti => "slti",
        Sltiu => "sltiu",
        Lui => "lui",
        Lb => "lb",
        Lh => "lh",
        Lw => "lw",
        Lbu => "lbu",
        Lhu => "lhu",
        Sb => "sb",
        Sh => "sh",
        Sw => "sw",
        Bltz => "bltz",
        Bgez => "bgez",
        Bltzal => "bltzal",
        Bgezal => "bgezal",
        Beq => "beq",
        Bne => "bne",
        Blez => "blez",
        Bgtz => "bgtz",
        J => "j",
        Jal => "jal",
        Jr => "jr",
        Jalr => "jalr",
        Mfc0 => "mfc0",
        Mtc0 => "mtc0",
        Nop => "nop",
        Mov => "mov",
        Clear => "clear",
        Not => "not",
        Neg => "neg",
        B => "b",
        Bal => "bal",
        Beqz => "beqz",
        Bnez => "bnez",
        Seqz => "seqz",
        Snez => "snez",
        Sltz => "sltz",
        Lsi => "lsi",
        Invalid => "<invalid>",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_is_nop() {
        assert!(Op::Jalr.is_native());
        assert!(!Op::Jalr.is_pseudo());
        assert!(Op::Nop.is_pseudo());
        assert!(!Op::Nop.is_native());
        assert!(!Op::Invalid.is_native());
        assert!(!Op::Invalid.is_pseudo());
    }

    #[test]
    fn display_smoke() {
        let mov = Instr::r(Op::Mov, 0, 5, 3);
        assert_eq!(mov.to_string(), "mov r3, r5");
        let nop = Instr {
            op: Op::Nop,
            ..Instr::invalid()
        };
        assert_eq!(nop.to_string(), "nop");
    }
}
