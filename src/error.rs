//! Error types for every layer of the toolchain.
//!
//! Each layer gets its own enum, matching the "one enum per concern,
//! `#[error(...)]` per variant" shape used throughout the teacher
//! lineage's `TraceFileError`. [`ToolError`] is the umbrella type each
//! `main` returns.

use std::fmt;

use thiserror::Error;

use crate::instr::Op;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unknown opcode 0x{0:02x}")]
    UnknownOpcode(u8),
    #[error("reserved or unimplemented funct 0x{0:02x} under opcode 0x00")]
    ReservedFunct(u8),
    #[error("unsupported coprocessor-0 selector (rs=0x{0:02x})")]
    UnsupportedCop0(u8),
    #[error("half-word 0x{0:04x} does not begin a valid compressed instruction")]
    InvalidCompressed(u16),
    #[error("truncated instruction stream: expected {expected} more byte(s)")]
    Truncated { expected: usize },
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    #[error("cannot encode pseudo-op {0:?} directly; call to_native first")]
    PseudoNotNative(Op),
    #[error("field {field} value {value} overflows its encoding width")]
    FieldOverflow { field: &'static str, value: i64 },
    #[error("op {0:?} is not compressible but a short encoding was requested")]
    UncompressibleShort(Op),
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LayoutError {
    #[error("control-flow instruction {index} targets out-of-bounds index {target}")]
    TargetOutOfBounds { index: usize, target: usize },
    #[error("displacement for instruction {index} ({simm}) is out of range for any encoding")]
    DisplacementOutOfRange { index: usize, simm: i32 },
}

/// Umbrella error returned by every binary's `main`.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Decode(#[from] DecodeError),
    #[error("{0}")]
    Encode(#[from] EncodeError),
    #[error("{0}")]
    Layout(#[from] LayoutError),
    #[error("{0}")]
    Message(String),
}

impl ToolError {
    pub fn message(msg: impl fmt::Display) -> Self {
        Self::Message(msg.to_string())
    }
}
