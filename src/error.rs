//! Error types.

use thiserror::Error;

/// Errors raised by bitmap mutation and the N-ary operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A bit index beyond the largest index the bitmap can address.
    #[error("bit index {index} is out of range (largest settable index is {max})")]
    IndexOutOfRange {
        /// The rejected index.
        index: usize,
        /// The largest accepted index.
        max: usize,
    },

    /// A resize that would leave the last word.
    #[error("size of {requested} bits does not end in the last word of a {current}-bit bitmap")]
    SizeOutsideLastWord {
        /// Size before the call.
        current: usize,
        /// Requested size.
        requested: usize,
    },

    /// A partial word append that does not fit a word, or that would leave
    /// a partial word in the middle of the bitmap.
    #[error("cannot append a word carrying {bits} bits to a {size_in_bits}-bit bitmap")]
    InvalidWordAppend {
        /// Bits the word was meant to carry.
        bits: usize,
        /// Size before the call.
        size_in_bits: usize,
    },

    /// An N-ary operation called with too few operands.
    #[error("{operation} needs at least {min} bitmaps, got {actual}")]
    NotEnoughBitmaps {
        /// Name of the operation.
        operation: &'static str,
        /// Smallest accepted operand count.
        min: usize,
        /// Operand count supplied.
        actual: usize,
    },

    /// A header field does not fit the 32-bit serialized layout.
    #[error("{field} of {value} does not fit in a 32-bit header field")]
    TooLargeToEncode {
        /// Name of the field.
        field: &'static str,
        /// The value that overflowed.
        value: usize,
    },
}

/// Errors raised while decoding the binary layout.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The input ended early.
    #[error("input truncated: needed {needed} bytes, {available} available")]
    Truncated {
        /// Bytes required to continue.
        needed: usize,
        /// Bytes remaining.
        available: usize,
    },

    /// A header field holds a negative value.
    #[error("header field {field} is negative ({value})")]
    NegativeField {
        /// Name of the field.
        field: &'static str,
        /// The decoded value.
        value: i32,
    },

    /// The words do not form a valid compressed bitmap.
    #[error("corrupt bitmap: {0}")]
    Corrupt(&'static str),

    /// The underlying reader failed.
    #[cfg(feature = "std")]
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for fallible bitmap operations.
pub type Result<T, E = Error> = core::result::Result<T, E>;
