//! Streaming traits for the codec.
//!
//! Sessions are push-style: the caller lends one bounded input slice and
//! one bounded output slice per step, the session runs until it needs
//! more input, runs out of output room, or finishes, and reports how far
//! it got. Between steps the caller may rebind both slices freely; all
//! unfinished work (pending bits, running matches, staged bytes) lives
//! inside the session.

use crate::error::{OxiflateError, Result};

/// Status of one streaming decompression step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecompressStatus {
    /// The input slice is exhausted; supply more input.
    NeedsInput,
    /// The output slice is full; drain it and supply more room.
    NeedsOutput,
    /// The stream is complete.
    Done,
}

/// Status of one streaming compression step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressStatus {
    /// The input slice is exhausted; supply more input.
    NeedsInput,
    /// The output slice is full; drain it and supply more room.
    NeedsOutput,
    /// The stream is complete.
    Done,
}

/// Flush directive for compression.
///
/// A directive applies once the supplied input slice has been fully
/// consumed; directives are honored in the order the caller issues them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlushMode {
    /// Accumulate; emit a block only when internal buffers fill.
    #[default]
    None,
    /// Close the current block and emit an empty fixed-Huffman block.
    ///
    /// Nonstandard but understood by every inflater; the stream is not
    /// byte-aligned afterwards. Frequencies are preserved.
    Partial,
    /// Close the current block and emit an empty stored block, leaving
    /// the stream byte-aligned (the `00 00 FF FF` marker). Frequencies
    /// are preserved.
    Sync,
    /// Like [`FlushMode::Sync`], then reset the frequency statistics so
    /// the next block is built from scratch.
    Full,
    /// Emit the last block with the final bit set, pad to a byte
    /// boundary, and append the framing trailer.
    Finish,
}

/// A streaming compressor (encoder).
pub trait Compressor {
    /// Run one bounded step.
    ///
    /// Consumes bytes from `input`, produces bytes into `output`, and
    /// applies `flush` once the input is fully consumed.
    ///
    /// Returns `(consumed, produced, status)`.
    fn compress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> Result<(usize, usize, CompressStatus)>;

    /// Reset the session to its initial state.
    fn reset(&mut self);

    /// Whether the stream has been finished.
    fn is_finished(&self) -> bool;

    /// Compress all of `input` in one call (convenience driver).
    fn compress_all(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut buffer = vec![0u8; 32768];
        let mut pos = 0;

        loop {
            let flush = if pos == input.len() {
                FlushMode::Finish
            } else {
                FlushMode::None
            };
            let (consumed, produced, status) =
                self.compress(&input[pos..], &mut buffer, flush)?;
            pos += consumed;
            out.extend_from_slice(&buffer[..produced]);
            if status == CompressStatus::Done {
                break;
            }
        }

        Ok(out)
    }
}

/// A streaming decompressor (decoder).
pub trait Decompressor {
    /// Run one bounded step.
    ///
    /// Returns `(consumed, produced, status)`.
    fn decompress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<(usize, usize, DecompressStatus)>;

    /// Reset the session to its initial state.
    fn reset(&mut self);

    /// Whether the stream has been fully decoded.
    fn is_finished(&self) -> bool;

    /// Decompress all of `input` in one call (convenience driver).
    ///
    /// Fails with [`OxiflateError::UnexpectedEof`] when the stream is
    /// truncated.
    fn decompress_all(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut buffer = vec![0u8; 32768];
        let mut pos = 0;

        loop {
            let (consumed, produced, status) = self.decompress(&input[pos..], &mut buffer)?;
            pos += consumed;
            out.extend_from_slice(&buffer[..produced]);
            match status {
                DecompressStatus::Done => break,
                DecompressStatus::NeedsInput if pos >= input.len() => {
                    return Err(OxiflateError::UnexpectedEof);
                }
                DecompressStatus::NeedsInput | DecompressStatus::NeedsOutput => {}
            }
        }

        Ok(out)
    }
}
