//! Analysis context (`src/analysis.rs`): the value type the analyzer
//! binary builds up while walking a program, and prints at the end.
//!
//! Bundles the histograms named by the CLI surface -- opcode
//! frequency, register usage, branch offsets, stack-relative memory
//! offsets, immediate values, delay-slot NOPs -- plus a compression
//! ratio estimate. No process-wide statics: a caller builds one of
//! these per run and throws it away.

use std::collections::BTreeMap;

use crate::compressed::is_compressible;
use crate::histogram::Histogram;
use crate::instr::{Instr, Op};

#[derive(Debug, Clone, Default)]
pub struct AnalysisContext {
    pub opcode_freq: BTreeMap<Op, u64>,
    pub registers: Histogram,
    pub branch_offsets: Histogram,
    pub stack_offsets: Histogram,
    pub immediates: Histogram,
    pub nop_count: u64,
    instructions_seen: u64,
    compressible_count: u64,
}

impl AnalysisContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one decoded instruction into the running statistics.
    pub fn observe(&mut self, instr: &Instr) {
        self.instructions_seen += 1;
        *self.opcode_freq.entry(instr.op).or_insert(0) += 1;

        if instr.op == Op::Nop {
            self.nop_count += 1;
        }

        self.registers.record(instr.rs as i64);
        self.registers.record(instr.rt as i64);
        self.registers.record(instr.rd as i64);

        match instr.op {
            Op::Bltz
            | Op::Bgez
            | Op::Bltzal
            | Op::Bgezal
            | Op::Beq
            | Op::Bne
            | Op::Blez
            | Op::Bgtz
            | Op::B
            | Op::Bal
            | Op::Beqz
            | Op::Bnez => self.branch_offsets.record(instr.simm as i64),
            Op::Lw | Op::Sw if instr.rs == 29 => self.stack_offsets.record(instr.simm as i64),
            Op::Addi | Op::Addiu | Op::Slti | Op::Sltiu | Op::Lsi => {
                self.immediates.record(instr.simm as i64)
            }
            Op::Andi | Op::Ori | Op::Xori | Op::Lui => self.immediates.record(instr.imm as i64),
            _ => {}
        }

        if is_compressible(instr) {
            self.compressible_count += 1;
        }
    }

    pub fn observe_all<'a>(&mut self, program: impl IntoIterator<Item = &'a Instr>) {
        for instr in program {
            self.observe(instr);
        }
    }

    pub fn instructions_seen(&self) -> u64 {
        self.instructions_seen
    }

    /// Fraction of instructions that could be short-encoded, used as a
    /// rough estimate of the achievable compression ratio (bytes after
    /// / bytes before, assuming every compressible instruction stays
    /// short -- the layout solver may widen some of these in practice).
    pub fn estimated_compression_ratio(&self) -> f64 {
        if self.instructions_seen == 0 {
            return 1.0;
        }
        let native_bytes = self.instructions_seen * 4;
        let compressed_bytes =
            self.compressible_count * 2 + (self.instructions_seen - self.compressible_count) * 4;
        compressed_bytes as f64 / native_bytes as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_opcodes_and_nops() {
        let mut ctx = AnalysisContext::new();
        let program = vec![
            Instr {
                op: Op::Nop,
                ..Instr::invalid()
            },
            Instr::r(Op::Addu, 1, 2, 3),
        ];
        ctx.observe_all(&program);
        assert_eq!(ctx.nop_count, 1);
        assert_eq!(ctx.instructions_seen(), 2);
        assert_eq!(*ctx.opcode_freq.get(&Op::Addu).unwrap(), 1);
    }

    #[test]
    fn records_branch_and_stack_offsets() {
        let mut ctx = AnalysisContext::new();
        ctx.observe(&Instr::branch(Op::Beq, 1, 2, 16));
        ctx.observe(&Instr::i(Op::Lw, 29, 4, 12));
        assert_eq!(ctx.branch_offsets.total(), 1);
        assert_eq!(ctx.stack_offsets.total(), 1);
    }

    #[test]
    fn compression_ratio_is_one_when_nothing_compresses() {
        let mut ctx = AnalysisContext::new();
        ctx.observe(&Instr::r(Op::Add, 1, 2, 3));
        assert_eq!(ctx.estimated_compression_ratio(), 1.0);
    }

    #[test]
    fn compression_ratio_under_one_when_everything_compresses() {
        let mut ctx = AnalysisContext::new();
        ctx.observe(&Instr {
            op: Op::Nop,
            ..Instr::invalid()
        });
        assert!(ctx.estimated_compression_ratio() < 1.0);
    }
}
