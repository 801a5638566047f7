//! # Oxiflate
//!
//! Streaming, non-blocking DEFLATE (RFC 1951) with zlib (RFC 1950) and
//! gzip (RFC 1952) framings, in pure Rust.
//!
//! Encoders and decoders are push-style sessions: the caller lends one
//! bounded input slice and one bounded output slice per step and the
//! session suspends at buffer boundaries — `NeedsInput` when the input
//! runs dry, `NeedsOutput` when the output fills. That makes the codec
//! usable from event loops, pipelines, and memory-constrained
//! environments without ever allocating whole-stream buffers.
//!
//! ## One-shot usage
//!
//! ```rust
//! use oxiflate::zlib::{zlib_compress, zlib_decompress};
//!
//! let data = b"Hello, World! Hello, World!";
//! let compressed = zlib_compress(data, 6).unwrap();
//! let decompressed = zlib_decompress(&compressed).unwrap();
//! assert_eq!(&decompressed, data);
//! ```
//!
//! ## Streaming usage
//!
//! ```rust
//! use oxiflate::deflate::Deflater;
//! use oxiflate::inflate::Inflater;
//! use oxiflate_core::traits::{Compressor, Decompressor, FlushMode};
//!
//! let mut deflater = Deflater::with_level(6).unwrap();
//! let mut compressed = Vec::new();
//! let mut buf = [0u8; 64];
//! let mut done = false;
//! while !done {
//!     let (_, produced, status) = deflater
//!         .compress(b"", &mut buf, FlushMode::Finish)
//!         .unwrap();
//!     compressed.extend_from_slice(&buf[..produced]);
//!     done = status == oxiflate_core::traits::CompressStatus::Done;
//! }
//!
//! let mut inflater = Inflater::new();
//! let decompressed = inflater.decompress_all(&compressed).unwrap();
//! assert!(decompressed.is_empty());
//! ```
//!
//! ## Compression levels
//!
//! - Level 0: no compression (stored blocks)
//! - Levels 1-3: greedy matching, short hash chains
//! - Levels 4-6: lazy matching (default is 4)
//! - Levels 7-9: lazy matching, deep chains

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod deflate;
pub mod gzip;
pub mod huffman;
pub mod inflate;
pub mod lz77;
pub mod tables;
pub mod zlib;

// Re-exports
pub use deflate::{deflate, Deflater};
pub use gzip::{gzip_compress, gzip_decompress, GzipCompressor, GzipDecompressor, GzipHeader, Os};
pub use huffman::{build_lengths, CodeTable, DecodeTable};
pub use inflate::{inflate, Inflater};
pub use lz77::{Lz77, Token};
pub use zlib::{zlib_compress, zlib_decompress, ZlibCompressor, ZlibDecompressor};
pub use oxiflate_core::{
    CompressStatus, Compressor, DecompressStatus, Decompressor, FlushMode, OxiflateError, Result,
};
