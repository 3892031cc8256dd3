//! Cross-module property tests: the round-trip, idempotence and
//! layout laws that no single unit test file owns on its own.

use cmips::compressed::{self, is_compressible, CompressedWord};
use cmips::instr::{Instr, Op};
use cmips::layout;
use cmips::native;
use cmips::pseudo;

/// R2: every native-expressible IM value survives an encode/decode
/// round trip unchanged.
#[test]
fn native_round_trip_preserves_native_instructions() {
    let samples = vec![
        Instr::r(Op::Addu, 1, 2, 3),
        Instr::r(Op::Nor, 4, 5, 6),
        Instr::sh(Op::Sll, 7, 8, 9),
        Instr::i(Op::Addiu, 10, 11, -12),
        Instr::branch(Op::Beq, 1, 2, 16),
        Instr::jump(Op::J, 0x100),
    ];
    for instr in samples {
        let word = native::encode(&instr).unwrap();
        let back = native::decode(word);
        assert_eq!(back.op, instr.op);
        assert_eq!(back.rs, instr.rs);
        assert_eq!(back.rt, instr.rt);
        assert_eq!(back.rd, instr.rd);
    }
}

/// I1: `to_pseudo` is idempotent.
#[test]
fn to_pseudo_is_idempotent_across_the_corpus() {
    let samples = vec![
        Instr::r(Op::Addu, 0, 0, 3),
        Instr::r(Op::Addu, 0, 5, 3),
        Instr::r(Op::Nor, 0, 5, 3),
        Instr::i(Op::Addiu, 0, 3, 7),
        Instr::branch(Op::Beq, 0, 0, 12),
        Instr::branch(Op::Beq, 1, 0, 12),
    ];
    for instr in samples {
        let once = pseudo::to_pseudo(instr);
        let twice = pseudo::to_pseudo(once);
        assert_eq!(once, twice);
    }
}

/// I2: canonicalizing to pseudo and back to native preserves the
/// operation's dynamic semantics (here: the encoded word is identical).
#[test]
fn to_native_after_to_pseudo_round_trips_to_the_same_word() {
    let samples = vec![
        Instr::r(Op::Addu, 0, 5, 3),   // -> Mov
        Instr::r(Op::Addu, 0, 0, 4),   // -> Clear
        Instr::r(Op::Nor, 0, 5, 3),    // -> Not
        Instr::r(Op::Subu, 0, 5, 3),   // -> Neg
        Instr::i(Op::Addiu, 0, 3, 7),  // -> Lsi
        Instr::i(Op::Sltiu, 4, 3, 1),  // -> Seqz
    ];
    for instr in samples {
        let expected = native::encode(&instr).unwrap();
        let pseudo_form = pseudo::to_pseudo(instr);
        let native_form = pseudo::to_native(pseudo_form);
        let actual = native::encode(&native_form).unwrap();
        assert_eq!(actual, expected);
    }
}

/// R3/R4: CC's short and long forms both round-trip through decode_v2
/// (modulo the `compressed` flag, which the caller sets explicitly).
#[test]
fn compressed_codec_round_trips_short_and_long() {
    let short_candidate = Instr {
        op: Op::Clear,
        rd: 4,
        compressed: true,
        ..Instr::invalid()
    };
    assert!(is_compressible(&pseudo::to_pseudo(short_candidate)));
    let CompressedWord::Short(word) = compressed::encode_v2(&short_candidate).unwrap() else {
        panic!("expected a short encoding");
    };
    let bytes = word.to_be_bytes();
    let (decoded, consumed) = compressed::decode_v2(&bytes).unwrap();
    assert_eq!(consumed, 2);
    // decode_v2 always hands back a native-shaped instruction: Clear's
    // native expansion is `addu rd, r0, r0`.
    assert_eq!(decoded.op, Op::Addu);
    assert_eq!(decoded.rd, 4);
    assert_eq!(decoded.rs, 0);
    assert_eq!(decoded.rt, 0);

    let long_candidate = Instr::r(Op::Addu, 1, 2, 3); // rd shares neither rs nor rt
    let CompressedWord::Long(word) = compressed::encode_v2(&long_candidate).unwrap() else {
        panic!("expected a long encoding");
    };
    let bytes = word.to_be_bytes();
    let (decoded, consumed) = compressed::decode_v2(&bytes).unwrap();
    assert_eq!(consumed, 4);
    assert_eq!(decoded.op, Op::Addu);
    assert_eq!(decoded.rs, 1);
    assert_eq!(decoded.rt, 2);
    assert_eq!(decoded.rd, 3);
}

/// L3: the total emitted byte length equals the sum of each
/// instruction's chosen size.
#[test]
fn layout_output_length_matches_chosen_sizes() {
    let program = vec![
        Instr::r(Op::Addu, 0, 5, 3), // compressible (Mov)
        Instr::r(Op::Addu, 1, 2, 3), // not compressible, no shared operand
    ];
    let seeded: Vec<_> = program
        .into_iter()
        .map(pseudo::to_pseudo)
        .map(|mut i| {
            i.compressed = is_compressible(&i);
            i
        })
        .collect();
    let (placements, out) = layout::solve(&seeded).unwrap();
    let total: u32 = placements
        .iter()
        .map(|p| if p.compressed { 2 } else { 4 })
        .sum();
    assert_eq!(total, 2 + 4);
    assert_eq!(out.len(), 2);
}

/// L1/S3: a short forward branch whose displacement still fits after
/// layout stays short.
#[test]
fn short_branch_stays_short_when_it_fits() {
    let program = vec![
        Instr::r(Op::Add, 1, 2, 3),
        Instr {
            op: Op::Bnez,
            rs: 1,
            simm: 4,
            compressed: true,
            ..Instr::invalid()
        },
        Instr::r(Op::Add, 1, 2, 3),
        Instr::r(Op::Add, 1, 2, 3),
    ];
    let (placements, out) = layout::solve(&program).unwrap();
    assert!(placements[1].compressed);
    assert_eq!(out[1].simm, 4);
}

/// S4/widening: a branch whose target sits far enough away widens from
/// short to long and the solver still converges to a consistent result.
#[test]
fn long_branch_target_widens_and_converges() {
    let mut program = vec![Instr {
        op: Op::Bnez,
        rs: 1,
        simm: 100,
        compressed: true,
        ..Instr::invalid()
    }];
    for _ in 0..30 {
        program.push(Instr::r(Op::Add, 1, 2, 3));
    }
    let (placements, out) = layout::solve(&program).unwrap();
    assert!(!placements[0].compressed);
    assert!(out[0].simm > 30);
}

/// S6: a JAL whose target lands close enough after layout is rewritten
/// by RL's pre-pass into a short BAL, and the result actually encodes
/// (the op itself must change, not just the `compressed` flag, or the
/// compressed encoder rejects it as an uncompressible J/JAL).
#[test]
fn jal_downgrades_to_short_bal_and_encodes() {
    let program = vec![
        Instr::jump(Op::Jal, 12), // targets the fourth instruction, at byte 12
        Instr::r(Op::Add, 1, 2, 3),
        Instr::r(Op::Add, 1, 2, 3),
        Instr::r(Op::Add, 1, 2, 3),
    ];
    let (placements, out) = layout::solve(&program).unwrap();

    assert_eq!(out[0].op, Op::Bal);
    assert!(placements[0].compressed);
    assert_eq!(out[0].rs, 0);
    assert_eq!(out[0].rt, 0);

    let CompressedWord::Short(word) = compressed::encode_v2(&out[0]).unwrap() else {
        panic!("expected a short encoding for the downgraded jal");
    };
    let bytes = word.to_be_bytes();
    let (decoded, consumed) = compressed::decode_v2(&bytes).unwrap();
    assert_eq!(consumed, 2);
    assert_eq!(decoded.op, Op::Bgezal);
    assert_eq!(decoded.simm, out[0].simm);
}
