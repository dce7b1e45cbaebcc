//! Wire helpers for the protocol-minimal probes.
//!
//! Nothing here performs IO: the probes in `reachr-core` own the sockets and
//! hand raw bytes to these functions.

pub mod ber;
pub mod snmp;
pub mod ssh;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PacketError {
    #[error("packet truncated: needed {needed} more bytes")]
    Truncated { needed: usize },

    #[error("unexpected tag 0x{found:02x}, expected 0x{expected:02x}")]
    UnexpectedTag { expected: u8, found: u8 },

    #[error("unsupported length encoding")]
    BadLength,

    #[error("integer does not fit in 32 bits")]
    IntegerOverflow,

    #[error("unsupported SNMP version field {0}")]
    UnsupportedVersion(i32),

    #[error("reply id {got} does not match request id {expected}")]
    RequestIdMismatch { expected: i32, got: i32 },

    #[error("not an SSH identification line")]
    NotSsh,
}
