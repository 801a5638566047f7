//! zlib framing (RFC 1950) over the raw DEFLATE codec.
//!
//! # Format
//!
//! ```text
//! +---+---+============+---+---+---+---+
//! |CMF|FLG| compressed |    ADLER32    |
//! +---+---+============+---+---+---+---+
//! ```
//!
//! - CMF: CM (low nibble, must be 8) and CINFO (window bits − 8)
//! - FLG: FCHECK so that `(CMF * 256 + FLG) % 31 == 0`, FDICT (preset
//!   dictionary, rejected here), FLEVEL (advisory compression level)
//! - ADLER32: big-endian Adler-32 of the uncompressed stream

use crate::deflate::{Deflater, DEFAULT_WBITS};
use crate::inflate::Inflater;
use oxiflate_core::checksum::{Adler32, Checksum};
use oxiflate_core::error::{OxiflateError, Result};
use oxiflate_core::traits::{
    CompressStatus, Compressor, DecompressStatus, Decompressor, FlushMode,
};

/// Advisory compression-level field in the zlib header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
enum ZlibLevel {
    Fastest = 0,
    Fast = 1,
    Default = 2,
    Maximum = 3,
}

impl ZlibLevel {
    fn from_level(level: u8) -> Self {
        match level {
            0..=2 => Self::Fastest,
            3..=5 => Self::Fast,
            6 => Self::Default,
            _ => Self::Maximum,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Header,
    Body,
    Trailer,
    Done,
}

/// Streaming zlib compressor.
#[derive(Debug)]
pub struct ZlibCompressor {
    inner: Deflater,
    adler: Adler32,
    stage: Stage,
    /// Header or trailer bytes waiting to be drained.
    extra: Vec<u8>,
    extra_pos: usize,
}

impl ZlibCompressor {
    /// Create a zlib compressor at `level` with the default window.
    pub fn new(level: u8) -> Result<Self> {
        Self::with_wbits(DEFAULT_WBITS, level)
    }

    /// Create a zlib compressor with explicit window bits (8..=15).
    pub fn with_wbits(wbits: u8, level: u8) -> Result<Self> {
        Ok(Self {
            inner: Deflater::new(wbits, level)?,
            adler: Adler32::new(),
            stage: Stage::Header,
            extra: Vec::new(),
            extra_pos: 0,
        })
    }

    /// Total bytes consumed over the session.
    pub fn total_in(&self) -> u64 {
        self.inner.total_in()
    }

    fn drain_extra(&mut self, output: &mut [u8], produced: &mut usize) {
        let n = (self.extra.len() - self.extra_pos).min(output.len() - *produced);
        output[*produced..*produced + n]
            .copy_from_slice(&self.extra[self.extra_pos..self.extra_pos + n]);
        self.extra_pos += n;
        *produced += n;
        if self.extra_pos == self.extra.len() {
            self.extra.clear();
            self.extra_pos = 0;
        }
    }

    fn push_header(&mut self) {
        let cmf = ((self.inner.wbits() - 8) << 4) | 8;
        let flevel = ZlibLevel::from_level(self.inner.level()) as u8;
        let flg_bits = flevel << 6;
        let fcheck = {
            let base = u16::from(cmf) * 256 + u16::from(flg_bits);
            let rem = base % 31;
            if rem == 0 { 0 } else { (31 - rem) as u8 }
        };
        self.extra.push(cmf);
        self.extra.push(flg_bits | fcheck);
    }
}

impl Compressor for ZlibCompressor {
    fn compress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> Result<(usize, usize, CompressStatus)> {
        let mut consumed = 0usize;
        let mut produced = 0usize;

        loop {
            self.drain_extra(output, &mut produced);
            if self.extra_pos < self.extra.len() {
                return Ok((consumed, produced, CompressStatus::NeedsOutput));
            }

            match self.stage {
                Stage::Header => {
                    self.push_header();
                    self.stage = Stage::Body;
                }
                Stage::Body => {
                    let (c, p, status) =
                        self.inner
                            .compress(&input[consumed..], &mut output[produced..], flush)?;
                    self.adler.update(&input[consumed..consumed + c]);
                    consumed += c;
                    produced += p;
                    match status {
                        CompressStatus::Done => self.stage = Stage::Trailer,
                        CompressStatus::NeedsOutput => {
                            return Ok((consumed, produced, CompressStatus::NeedsOutput));
                        }
                        CompressStatus::NeedsInput => {
                            return Ok((consumed, produced, CompressStatus::NeedsInput));
                        }
                    }
                }
                Stage::Trailer => {
                    let digest = self.adler.finish();
                    self.extra.extend_from_slice(&digest.to_be_bytes());
                    self.stage = Stage::Done;
                }
                Stage::Done => {
                    return Ok((consumed, produced, CompressStatus::Done));
                }
            }
        }
    }

    fn reset(&mut self) {
        self.inner.reset();
        self.adler.reset();
        self.stage = Stage::Header;
        self.extra.clear();
        self.extra_pos = 0;
    }

    fn is_finished(&self) -> bool {
        self.stage == Stage::Done && self.extra_pos == self.extra.len()
    }
}

/// Streaming zlib decompressor.
#[derive(Debug)]
pub struct ZlibDecompressor {
    inner: Inflater,
    stage: Stage,
    /// Maximum window bits this session accepts.
    wbits: u8,
    /// Header or trailer bytes collected so far.
    hold: [u8; 4],
    held: usize,
}

impl ZlibDecompressor {
    /// Create a zlib decompressor accepting up to the default window.
    pub fn new() -> Self {
        Self::with_wbits(DEFAULT_WBITS).expect("default window bits are always valid")
    }

    /// Create a zlib decompressor accepting streams whose window is at
    /// most `1 << wbits` (8..=15).
    pub fn with_wbits(wbits: u8) -> Result<Self> {
        Ok(Self {
            inner: Inflater::with_checksum(wbits, Checksum::adler32())?,
            stage: Stage::Header,
            wbits,
            hold: [0; 4],
            held: 0,
        })
    }

    /// Total bytes written over the session (the decoded length).
    pub fn total_out(&self) -> u64 {
        self.inner.total_out()
    }

    fn check_header(&self) -> Result<()> {
        let cmf = self.hold[0];
        let flg = self.hold[1];

        if cmf & 0x0F != 8 {
            return Err(OxiflateError::invalid_header(
                "unsupported compression method",
            ));
        }
        let cinfo = cmf >> 4;
        if cinfo > 7 {
            return Err(OxiflateError::invalid_header("invalid window size"));
        }
        if cinfo + 8 > self.wbits {
            return Err(OxiflateError::invalid_header(
                "window size exceeds the configured limit",
            ));
        }
        if (u16::from(cmf) * 256 + u16::from(flg)) % 31 != 0 {
            return Err(OxiflateError::invalid_header("header check failed"));
        }
        if flg & 0x20 != 0 {
            return Err(OxiflateError::invalid_header(
                "preset dictionaries are not supported",
            ));
        }
        Ok(())
    }
}

impl Default for ZlibDecompressor {
    fn default() -> Self {
        Self::new()
    }
}

impl Decompressor for ZlibDecompressor {
    fn decompress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<(usize, usize, DecompressStatus)> {
        let mut consumed = 0usize;
        let mut produced = 0usize;

        loop {
            match self.stage {
                Stage::Header => {
                    while self.held < 2 {
                        if consumed == input.len() {
                            return Ok((consumed, produced, DecompressStatus::NeedsInput));
                        }
                        self.hold[self.held] = input[consumed];
                        self.held += 1;
                        consumed += 1;
                    }
                    self.check_header()?;
                    self.held = 0;
                    self.stage = Stage::Body;
                }
                Stage::Body => {
                    let (c, p, status) = self
                        .inner
                        .decompress(&input[consumed..], &mut output[produced..])?;
                    consumed += c;
                    produced += p;
                    match status {
                        DecompressStatus::Done => self.stage = Stage::Trailer,
                        DecompressStatus::NeedsInput => {
                            return Ok((consumed, produced, DecompressStatus::NeedsInput));
                        }
                        DecompressStatus::NeedsOutput => {
                            return Ok((consumed, produced, DecompressStatus::NeedsOutput));
                        }
                    }
                }
                Stage::Trailer => {
                    while self.held < 4 {
                        if consumed == input.len() {
                            return Ok((consumed, produced, DecompressStatus::NeedsInput));
                        }
                        self.hold[self.held] = input[consumed];
                        self.held += 1;
                        consumed += 1;
                    }
                    let have = u32::from_be_bytes(self.hold);
                    let expect = self.inner.checksum();
                    if have != expect {
                        return Err(OxiflateError::invalid_checksum(have, expect));
                    }
                    self.stage = Stage::Done;
                }
                Stage::Done => {
                    return Ok((consumed, produced, DecompressStatus::Done));
                }
            }
        }
    }

    fn reset(&mut self) {
        self.inner.reset_with(Checksum::adler32());
        self.stage = Stage::Header;
        self.held = 0;
    }

    fn is_finished(&self) -> bool {
        self.stage == Stage::Done
    }
}

/// Compress `data` into a zlib stream.
pub fn zlib_compress(input: &[u8], level: u8) -> Result<Vec<u8>> {
    ZlibCompressor::new(level)?.compress_all(input)
}

/// Decompress a zlib stream.
pub fn zlib_decompress(input: &[u8]) -> Result<Vec<u8>> {
    ZlibDecompressor::new().decompress_all(input)
}
