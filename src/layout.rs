//! Layout solver (RL): the converter's fixed-point pass that decides,
//! for every instruction in a program, whether it can keep its short
//! (compressed) encoding once branch displacements are recomputed
//! against the new, possibly-shorter addresses of everything else.
//!
//! The loop is monotone -- a flip only ever widens an instruction from
//! short to long, never the reverse -- so it always terminates, and in
//! practice after very few passes.

use crate::error::LayoutError;
use crate::instr::{Instr, Op};

/// One instruction's position bookkeeping during layout.
#[derive(Debug, Clone, Copy)]
struct Slot {
    compressed: bool,
    new_addr: u32,
    target_index: Option<usize>,
}

/// Per-instruction layout result: the address it ends up at in the
/// output stream, and whether it is encoded short.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub new_addr: u32,
    pub compressed: bool,
}

fn is_control_flow(op: Op) -> bool {
    matches!(
        op,
        Op::Bltz
            | Op::Bgez
            | Op::Bltzal
            | Op::Bgezal
            | Op::Beq
            | Op::Bne
            | Op::Blez
            | Op::Bgtz
            | Op::J
            | Op::Jal
            | Op::B
            | Op::Bal
            | Op::Beqz
            | Op::Bnez
    )
}

fn is_short_branch(op: Op) -> bool {
    matches!(op, Op::B | Op::Bal)
}

fn is_short_branchz(op: Op) -> bool {
    matches!(op, Op::Beqz | Op::Bnez)
}

/// Resolve `simm`/`addr` (stored in byte units, per I5) to the index of
/// the destination instruction in `program`, given the original byte
/// offsets the decoder produced.
fn target_index(
    i: usize,
    instr: &Instr,
    original_addr: &[u32],
) -> Result<Option<usize>, LayoutError> {
    let dest_byte = match instr.op {
        Op::Bltz | Op::Bgez | Op::Bltzal | Op::Bgezal | Op::Beq | Op::Bne | Op::Blez | Op::Bgtz
        | Op::B | Op::Bal | Op::Beqz | Op::Bnez => {
            let next = original_addr
                .get(i + 1)
                .copied()
                .unwrap_or(original_addr[i] + size_of(instr.compressed));
            (next as i64 + instr.simm as i64) as u32
        }
        Op::J | Op::Jal => instr.addr,
        _ => return Ok(None),
    };
    match original_addr.binary_search(&dest_byte) {
        Ok(idx) => Ok(Some(idx)),
        Err(_) => Err(LayoutError::TargetOutOfBounds {
            index: i,
            target: dest_byte as usize,
        }),
    }
}

/// Run the fixed-point layout algorithm over a decoded program.
/// `program[i].compressed` is read as CP's initial seed. Returns the
/// final per-instruction placement and an updated copy of `program`
/// with `simm`/`addr`/`compressed` finalized for the emitter.
pub fn solve(program: &[Instr]) -> Result<(Vec<Placement>, Vec<Instr>), LayoutError> {
    let n = program.len();
    let mut work: Vec<Instr> = program.to_vec();

    let mut original_addr = Vec::with_capacity(n);
    let mut addr = 0u32;
    for instr in &work {
        original_addr.push(addr);
        addr += if instr.compressed { 2 } else { 4 };
    }

    let mut slots: Vec<Slot> = Vec::with_capacity(n);
    for (i, instr) in work.iter().enumerate() {
        slots.push(Slot {
            compressed: instr.compressed,
            new_addr: 0,
            target_index: target_index(i, instr, &original_addr)?,
        });
    }

    seed_addresses(&mut slots);
    downgrade_long_jumps(&mut work, &mut slots);
    seed_addresses(&mut slots);

    loop {
        let mut dirty = false;
        for i in 0..n {
            let instr = &work[i];
            if let Some(target) = slots[i].target_index {
                let next_addr = slots
                    .get(i + 1)
                    .map(|s| s.new_addr)
                    .unwrap_or(slots[i].new_addr + size_of(slots[i].compressed));
                let simm64 = slots[target].new_addr as i64 - next_addr as i64;
                if simm64 < i64::from(i16::MIN) || simm64 > i64::from(i16::MAX) {
                    return Err(LayoutError::DisplacementOutOfRange {
                        index: i,
                        simm: simm64 as i32,
                    });
                }
                let simm = simm64 as i16;

                if is_short_branch(instr.op) {
                    let still = (-1024..=1022).contains(&simm);
                    if slots[i].compressed && !still {
                        slots[i].compressed = false;
                        dirty = true;
                    }
                } else if is_short_branchz(instr.op) {
                    let still = (-32..=30).contains(&simm);
                    if slots[i].compressed && !still {
                        slots[i].compressed = false;
                        dirty = true;
                    }
                }
            }
        }
        if !dirty {
            break;
        }
        seed_addresses(&mut slots);
    }

    let mut out = work;
    let placements: Vec<Placement> = slots
        .iter()
        .enumerate()
        .map(|(i, slot)| {
            out[i].compressed = slot.compressed;
            Placement {
                new_addr: slot.new_addr,
                compressed: slot.compressed,
            }
        })
        .collect();

    finalize_targets(&mut out, &slots)?;

    Ok((placements, out))
}

fn size_of(compressed: bool) -> u32 {
    if compressed {
        2
    } else {
        4
    }
}

fn seed_addresses(slots: &mut [Slot]) {
    let mut addr = 0u32;
    for slot in slots.iter_mut() {
        slot.new_addr = addr;
        addr += size_of(slot.compressed);
    }
}

/// One-shot pre-pass: rewrite a long J/JAL into B/BAL when the
/// resulting signed displacement fits the short branch range. Run once
/// before the fixed-point loop, on addresses seeded from the initial
/// CP choices. This actually changes `instr.op` (not just the
/// `compressed` flag) since B/BAL are branch-shaped pseudo ops with a
/// `simm` displacement, while J/JAL carry an absolute `addr` -- the
/// rest of the solver and the compressed encoder only know how to
/// treat an instruction as a short branch if its op says so.
fn downgrade_long_jumps(program: &mut [Instr], slots: &mut [Slot]) {
    for i in 0..program.len() {
        if !matches!(program[i].op, Op::J | Op::Jal) {
            continue;
        }
        let Some(target) = slots[i].target_index else {
            continue;
        };
        let next_addr = slots
            .get(i + 1)
            .map(|s| s.new_addr)
            .unwrap_or(slots[i].new_addr + 4);
        let simm = slots[target].new_addr as i64 - next_addr as i64;
        if (-1024..=1022).contains(&simm) {
            let op = if program[i].op == Op::Jal {
                Op::Bal
            } else {
                Op::B
            };
            program[i] = Instr::branch(op, 0, 0, simm as i16);
            program[i].compressed = true;
            slots[i].compressed = true;
        }
    }
}

fn finalize_targets(program: &mut [Instr], slots: &[Slot]) -> Result<(), LayoutError> {
    for (i, instr) in program.iter_mut().enumerate() {
        let Some(target) = slots[i].target_index else {
            continue;
        };
        match instr.op {
            Op::J | Op::Jal => {
                instr.addr = slots[target].new_addr;
            }
            Op::Bltz | Op::Bgez | Op::Bltzal | Op::Bgezal | Op::Beq | Op::Bne | Op::Blez
            | Op::Bgtz | Op::B | Op::Bal | Op::Beqz | Op::Bnez => {
                let next_addr = slots
                    .get(i + 1)
                    .map(|s| s.new_addr)
                    .unwrap_or(slots[i].new_addr + size_of(slots[i].compressed));
                let simm = slots[target].new_addr as i64 - next_addr as i64;
                if simm < i64::from(i16::MIN) || simm > i64::from(i16::MAX) {
                    return Err(LayoutError::DisplacementOutOfRange {
                        index: i,
                        simm: simm as i32,
                    });
                }
                instr.simm = simm as i16;
            }
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beqz(rs: u8, simm: i16, compressed: bool) -> Instr {
        Instr {
            op: Op::Beqz,
            rs,
            simm,
            compressed,
            ..Instr::invalid()
        }
    }

    fn nop(compressed: bool) -> Instr {
        Instr {
            op: Op::Nop,
            compressed,
            ..Instr::invalid()
        }
    }

    #[test]
    fn self_branch_is_trivially_compressible() {
        let program = vec![beqz(3, -2, true)];
        let (placements, out) = solve(&program).unwrap();
        assert!(placements[0].compressed);
        assert_eq!(out[0].simm, -2);
    }

    #[test]
    fn branch_to_next_instruction_has_zero_displacement() {
        let program = vec![beqz(3, 0, true), nop(true)];
        let (placements, out) = solve(&program).unwrap();
        assert!(placements[0].compressed);
        assert_eq!(out[0].simm, 0);
    }

    #[test]
    fn widening_is_monotone_and_converges() {
        // A beqz whose target is far enough away (in long-instruction
        // units) that the compressed guess from CP no longer fits once
        // every intervening NOP is forced long.
        let mut program = vec![beqz(3, 80, true)];
        for _ in 0..40 {
            program.push(nop(false));
        }
        let (placements, out) = solve(&program).unwrap();
        assert!(!placements[0].compressed);
        assert!(out[0].simm > 30);
    }

    #[test]
    fn out_of_bounds_target_is_an_error() {
        let program = vec![beqz(3, 1000, true)];
        assert!(matches!(
            solve(&program),
            Err(LayoutError::TargetOutOfBounds { .. })
        ));
    }
}
