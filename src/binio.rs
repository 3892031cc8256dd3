//! Binary I/O (`src/binio.rs`): turn a byte buffer into a program
//! (`Vec<Instr>`) and back, for both the native and v2 formats
//! described in the external-interfaces section.
//!
//! This is the narrow seam the core plugs into; the actual file
//! reading/writing is left to each binary's `main`, which just reads
//! a `Vec<u8>` with `std::fs::read` and hands it here.

use crate::compressed::{self, CompressedWord};
use crate::error::DecodeError;
use crate::instr::Instr;
use crate::native;

/// Decode a native binary: a packed sequence of 4-byte big-endian
/// words, no header, no alignment beyond 4. Tolerant: unrecognized
/// words decode to `Op::Invalid` rather than stopping the read.
pub fn read_native(bytes: &[u8]) -> Vec<Instr> {
    bytes
        .chunks_exact(4)
        .map(|chunk| {
            let word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            native::decode(word)
        })
        .collect()
}

/// Decode a native binary, failing fatally on the first unrecognized
/// word (the converter's and simulator's policy).
pub fn read_native_checked(bytes: &[u8]) -> Result<Vec<Instr>, DecodeError> {
    bytes
        .chunks_exact(4)
        .map(|chunk| {
            let word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            native::decode_checked(word)
        })
        .collect()
}

/// Encode a program back to the native binary format.
pub fn write_native(program: &[Instr]) -> Result<Vec<u8>, crate::error::EncodeError> {
    let mut out = Vec::with_capacity(program.len() * 4);
    for instr in program {
        let native_instr = crate::pseudo::to_native(*instr);
        out.extend_from_slice(&native::encode(&native_instr)?.to_be_bytes());
    }
    Ok(out)
}

/// Decode a v2 (compressed) binary stream in full. Tolerant: an
/// unrecognized half-word decodes that one unit to `Op::Invalid` and
/// advances by 2 bytes so the scan can keep going; a truncated tail is
/// reported once at the end of the stream.
pub fn read_v2(bytes: &[u8]) -> Vec<Instr> {
    let mut out = Vec::new();
    let mut offset = 0;
    while offset < bytes.len() {
        match compressed::decode_v2(&bytes[offset..]) {
            Ok((instr, consumed)) => {
                out.push(instr);
                offset += consumed;
            }
            Err(DecodeError::InvalidCompressed(_)) => {
                out.push(Instr::invalid());
                offset += 2;
            }
            Err(_) => break,
        }
    }
    out
}

/// Decode a v2 binary stream, failing fatally on the first decode
/// error (the converter's and simulator's policy).
pub fn read_v2_checked(bytes: &[u8]) -> Result<Vec<Instr>, DecodeError> {
    let mut out = Vec::new();
    let mut offset = 0;
    while offset < bytes.len() {
        let (instr, consumed) = compressed::decode_v2(&bytes[offset..])?;
        out.push(instr);
        offset += consumed;
    }
    Ok(out)
}

/// Encode a program to the v2 binary format, honoring each
/// instruction's `compressed` flag (normally set by the layout solver).
pub fn write_v2(program: &[Instr]) -> Result<Vec<u8>, crate::error::EncodeError> {
    let mut out = Vec::new();
    for instr in program {
        let word = compressed::encode_v2(instr)?;
        out.extend(word_bytes(word));
    }
    Ok(out)
}

fn word_bytes(word: CompressedWord) -> Vec<u8> {
    word.to_be_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instr::Op;

    #[test]
    fn native_round_trips_through_bytes() {
        let program = vec![Instr::r(Op::Addu, 0, 5, 3), Instr::i(Op::Addiu, 1, 2, 7)];
        let bytes = write_native(&program).unwrap();
        let back = read_native(&bytes);
        assert_eq!(back.len(), 2);
        assert_eq!(back[0].op, Op::Addu);
        assert_eq!(back[1].op, Op::Addiu);
    }

    #[test]
    fn v2_round_trips_mixed_short_and_long() {
        let program = vec![
            Instr {
                op: Op::Clear,
                rd: 4,
                compressed: true,
                ..Instr::invalid()
            },
            Instr::r(Op::Addu, 4, 5, 6),
        ];
        let bytes = write_v2(&program).unwrap();
        assert_eq!(bytes.len(), 2 + 4);
        let back = read_v2(&bytes);
        assert_eq!(back.len(), 2);
        assert!(back[0].compressed);
        assert!(!back[1].compressed);
    }

    #[test]
    fn read_native_tolerates_invalid_words() {
        let bytes = [0x00, 0x00, 0x00, 0x18]; // funct 0x18 is reserved
        let program = read_native(&bytes);
        assert_eq!(program[0].op, Op::Invalid);
    }
}
