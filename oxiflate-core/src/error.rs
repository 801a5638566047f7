//! Error types for oxiflate operations.
//!
//! Every fallible operation in the workspace returns [`Result`]. Errors
//! are plain values: the first error returned by a streaming session
//! leaves that session in a terminal state, and callers rebuild the
//! session to retry.

use thiserror::Error;

/// The main error type for oxiflate operations.
#[derive(Debug, Error)]
pub enum OxiflateError {
    /// Compression level outside 0..=9.
    #[error("invalid compression level: {level} (expected 0..=9)")]
    InvalidLevel {
        /// The rejected level.
        level: u8,
    },

    /// Window bits outside 8..=15.
    #[error("invalid window bits: {wbits} (expected 8..=15)")]
    InvalidWbits {
        /// The rejected wbits value.
        wbits: u8,
    },

    /// A block header carried the reserved BTYPE value 11.
    #[error("invalid kind of block")]
    InvalidBlockKind,

    /// A stored block's NLEN field was not the one's complement of LEN.
    #[error("invalid complement of length")]
    InvalidComplementOfLength,

    /// A dynamic block header describes an unusable code dictionary.
    #[error("invalid dictionary: {message}")]
    InvalidDictionary {
        /// What was wrong with the dictionary.
        message: String,
    },

    /// A distance symbol outside the valid 0..=29 range was decoded.
    #[error("invalid distance code: {code}")]
    InvalidDistanceCode {
        /// The decoded distance symbol.
        code: u16,
    },

    /// A back-reference pointed beyond the bytes available in the window.
    #[error("invalid distance: {distance} exceeds window fill {max}")]
    InvalidDistance {
        /// The requested distance.
        distance: usize,
        /// Bytes actually recoverable from the window.
        max: usize,
    },

    /// A zlib or gzip stream header failed validation.
    #[error("invalid header: {message}")]
    InvalidHeader {
        /// What was wrong with the header.
        message: String,
    },

    /// The stream trailer checksum did not match the decoded data.
    #[error("invalid checksum: stream has {have:#010x}, expected {expect:#010x}")]
    InvalidChecksum {
        /// Checksum value found in the stream trailer.
        have: u32,
        /// Checksum computed over the decoded output.
        expect: u32,
    },

    /// The gzip header CRC16 did not match the header bytes.
    #[error("invalid header checksum: stream has {have:#06x}, expected {expect:#06x}")]
    InvalidHeaderChecksum {
        /// CRC16 value found in the header.
        have: u16,
        /// CRC16 computed over the header bytes.
        expect: u16,
    },

    /// The gzip ISIZE field did not match the decoded length mod 2^32.
    #[error("invalid size: stream has {have}, expected {expect}")]
    InvalidSize {
        /// ISIZE value found in the trailer.
        have: u32,
        /// Decoded length mod 2^32.
        expect: u32,
    },

    /// Imported frequencies miss a symbol present in the pending block.
    #[error("imported frequencies assign no weight to pending symbol {symbol}")]
    InvalidFrequencies {
        /// The symbol with a zero frequency.
        symbol: u16,
    },

    /// A one-shot driver ran out of input before the stream ended.
    #[error("unexpected end of stream")]
    UnexpectedEof,
}

/// Result type alias for oxiflate operations.
pub type Result<T> = std::result::Result<T, OxiflateError>;

impl OxiflateError {
    /// Create an invalid level error.
    pub fn invalid_level(level: u8) -> Self {
        Self::InvalidLevel { level }
    }

    /// Create an invalid wbits error.
    pub fn invalid_wbits(wbits: u8) -> Self {
        Self::InvalidWbits { wbits }
    }

    /// Create an invalid dictionary error.
    pub fn invalid_dictionary(message: impl Into<String>) -> Self {
        Self::InvalidDictionary {
            message: message.into(),
        }
    }

    /// Create an invalid distance code error.
    pub fn invalid_distance_code(code: u16) -> Self {
        Self::InvalidDistanceCode { code }
    }

    /// Create an invalid distance error.
    pub fn invalid_distance(distance: usize, max: usize) -> Self {
        Self::InvalidDistance { distance, max }
    }

    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Create a checksum mismatch error.
    pub fn invalid_checksum(have: u32, expect: u32) -> Self {
        Self::InvalidChecksum { have, expect }
    }

    /// Create a header checksum mismatch error.
    pub fn invalid_header_checksum(have: u16, expect: u16) -> Self {
        Self::InvalidHeaderChecksum { have, expect }
    }

    /// Create a size mismatch error.
    pub fn invalid_size(have: u32, expect: u32) -> Self {
        Self::InvalidSize { have, expect }
    }
}
