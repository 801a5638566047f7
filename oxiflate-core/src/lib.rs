//! # Oxiflate Core
//!
//! Foundation layer for the oxiflate streaming DEFLATE codec.
//!
//! This crate provides the building blocks the codec is assembled from:
//!
//! - [`bitstream`]: push-style LSB-first bit accumulators
//! - [`checksum`]: Adler-32 and CRC-32 incremental digests
//! - [`window`]: the sliding history buffer for back-references
//! - [`traits`]: the streaming `Compressor`/`Decompressor` contract
//! - [`error`]: the error taxonomy
//!
//! ## Architecture
//!
//! The workspace is a layered stack:
//!
//! ```text
//! ┌────────────────────────────────────────────────────┐
//! │ oxiflate-cli: stdin → stdout pipe driver           │
//! ├────────────────────────────────────────────────────┤
//! │ oxiflate: framing (zlib, gzip)                     │
//! │           codec   (LZ77, Huffman, Deflater,        │
//! │                    Inflater)                       │
//! ├────────────────────────────────────────────────────┤
//! │ oxiflate-core (this crate):                        │
//! │           BitReader/BitWriter, Window, checksums,  │
//! │           streaming traits, errors                 │
//! └────────────────────────────────────────────────────┘
//! ```
//!
//! Everything is caller-driven: sessions never block on I/O, they
//! suspend when the lent input slice is exhausted (`NeedsInput`) or the
//! lent output slice is full (`NeedsOutput`).
//!
//! ## Example
//!
//! ```rust
//! use oxiflate_core::checksum::{Adler32, Crc32};
//!
//! assert_eq!(Adler32::checksum(b"Hello"), 0x058C01F5);
//! assert_eq!(Crc32::compute(b"123456789"), 0xCBF43926);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod checksum;
pub mod error;
pub mod traits;
pub mod window;

// Re-exports for convenience
pub use bitstream::{BitReader, BitWriter};
pub use checksum::{Adler32, Checksum, Crc32};
pub use error::{OxiflateError, Result};
pub use traits::{CompressStatus, Compressor, DecompressStatus, Decompressor, FlushMode};
pub use window::Window;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bitstream::{BitReader, BitWriter};
    pub use crate::checksum::{Adler32, Checksum, Crc32};
    pub use crate::error::{OxiflateError, Result};
    pub use crate::traits::{
        CompressStatus, Compressor, DecompressStatus, Decompressor, FlushMode,
    };
    pub use crate::window::Window;
}
