use thiserror::Error;

/// Error type for bit-level decoding failures.
///
/// All variants carry enough position information for a caller to report
/// where in the input buffer the decode ran aground.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A read ran past the end of the buffer.
    #[error("insufficient bits at byte {offset}: needed {needed}, available {available}")]
    InsufficientBits {
        /// Byte offset of the cursor when the read started.
        offset: usize,
        /// Bits the read required.
        needed: usize,
        /// Bits that were actually left.
        available: usize,
    },

    /// A numeric extraction spans more than 64 bits.
    #[error("bit range {to}..={from} is wider than 64 bits")]
    RangeTooWide { from: u32, to: u32 },

    /// A whole-byte read was requested while the cursor sat mid-byte.
    #[error("byte read at bit offset {bit_pos} is not byte-aligned")]
    Misaligned { bit_pos: usize },

    /// A specification bit index does not fit the field it refers to.
    #[error("bit index {bit} is invalid for a {len}-byte field")]
    BadBitIndex { bit: u32, len: usize },
}
