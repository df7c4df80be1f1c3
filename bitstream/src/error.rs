//! Error types for bitstream operations.

use thiserror::Error;

/// Result type for bitstream operations.
pub type BitResult<T> = Result<T, BitError>;

/// Errors that can occur during bit-level encoding/decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum BitError {
    /// Attempted to read past the end of the buffer.
    #[error("attempted to read {requested} bits but only {available} bits available")]
    UnexpectedEof {
        /// Number of bits requested.
        requested: usize,
        /// Number of bits available.
        available: usize,
    },

    /// Invalid bit count for the operation.
    #[error("invalid bit count {bits}, maximum allowed is {max_bits}")]
    InvalidBitCount {
        /// The invalid bit count provided.
        bits: u8,
        /// Maximum allowed bits for this operation.
        max_bits: u8,
    },

    /// Value exceeds the range representable by the specified number of bits.
    #[error("value {value} cannot be represented in {bits} bits")]
    ValueOutOfRange {
        /// The value that was out of range.
        value: u64,
        /// Number of bits available.
        bits: u8,
    },

    /// A byte-aligned operation was attempted mid-byte.
    #[error("byte-aligned access at bit position {bit_position}")]
    MisalignedAccess {
        /// Bit position at the time of the call.
        bit_position: usize,
    },

    /// A delimited run was not terminated before the end of the buffer.
    #[error("delimiter 0x{delimiter:02X} not found in the remaining {available} bytes")]
    MissingDelimiter {
        /// The delimiter that was searched for.
        delimiter: u8,
        /// Bytes scanned without finding it.
        available: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_unexpected_eof() {
        let err = BitError::UnexpectedEof {
            requested: 8,
            available: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("8 bits"), "should mention requested bits");
        assert!(msg.contains("3 bits"), "should mention available bits");
        assert!(msg.contains("read"), "should mention read operation");
    }

    #[test]
    fn error_display_invalid_bit_count() {
        let err = BitError::InvalidBitCount {
            bits: 128,
            max_bits: 64,
        };
        let msg = err.to_string();
        assert!(msg.contains("128"));
        assert!(msg.contains("64"));
    }

    #[test]
    fn error_display_value_out_of_range() {
        let err = BitError::ValueOutOfRange {
            value: 0x0100_0000,
            bits: 24,
        };
        let msg = err.to_string();
        assert!(msg.contains("16777216"));
        assert!(msg.contains("24 bits"));
    }

    #[test]
    fn error_display_missing_delimiter() {
        let err = BitError::MissingDelimiter {
            delimiter: 0,
            available: 5,
        };
        let msg = err.to_string();
        assert!(msg.contains("0x00"));
        assert!(msg.contains('5'));
    }

    #[test]
    fn error_equality() {
        let err1 = BitError::UnexpectedEof {
            requested: 8,
            available: 3,
        };
        let err2 = err1.clone();
        let err3 = BitError::UnexpectedEof {
            requested: 8,
            available: 4,
        };
        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
    }

    #[test]
    fn error_is_std_error() {
        fn assert_error<E: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<BitError>();
    }
}
