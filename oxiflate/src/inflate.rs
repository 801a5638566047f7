//! Streaming DEFLATE decompression (RFC 1951).
//!
//! [`Inflater`] is an explicit state machine. Each call to
//! [`Decompressor::decompress`] runs the machine until the input slice
//! is exhausted (`NeedsInput`), the output slice fills (`NeedsOutput`),
//! or the final block ends (`Done`). All partial work — buffered bits,
//! half-parsed dynamic headers, the remainder of a long match copy —
//! lives in the session, so the caller may rebind both slices freely
//! between calls.
//!
//! Bit reads are atomic with respect to suspension: a multi-bit field is
//! only consumed from the accumulator once all of its bits are present,
//! and Huffman lookups are pure peeks until a whole code resolves.

use crate::huffman::{DecodeTable, Decoded};
use crate::tables::{
    decode_distance, decode_length, fixed_distance_table, fixed_litlen_table, CODE_LENGTH_ORDER,
    DISTANCE_EXTRA_BITS, LENGTH_EXTRA_BITS,
};
use oxiflate_core::bitstream::BitReader;
use oxiflate_core::checksum::Checksum;
use oxiflate_core::error::{OxiflateError, Result};
use oxiflate_core::traits::{DecompressStatus, Decompressor};
use oxiflate_core::window::Window;

/// Default window bits.
pub const DEFAULT_WBITS: u8 = 15;

/// Largest combined code-length vector in a dynamic header.
const MAX_LENS: usize = 286 + 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    BlockHeader,
    StoredLen,
    StoredCopy,
    TableHeader,
    TableClen,
    TableLens,
    Block,
    LengthExtra { sym: u16 },
    DistSym { length: usize },
    DistExtra { length: usize, sym: u16 },
    Copy,
    Done,
}

/// The decode tables the current block uses.
#[derive(Debug)]
enum Tables {
    Fixed,
    Dynamic { litlen: DecodeTable, dist: DecodeTable },
}

/// Streaming DEFLATE decompressor.
#[derive(Debug)]
pub struct Inflater {
    bits: BitReader,
    state: State,
    window: Window,
    tables: Tables,
    final_block: bool,
    // Dynamic header progress.
    hlit: usize,
    hdist: usize,
    hclen: usize,
    cl_idx: usize,
    cl_lens: [u8; 19],
    cl_table: DecodeTable,
    lens: [u8; MAX_LENS],
    len_idx: usize,
    // Running work.
    stored_remaining: usize,
    match_length: usize,
    match_distance: usize,
    total_in: u64,
    total_out: u64,
}

impl Inflater {
    /// Create a decompressor with the default 32 KiB window and no
    /// checksum.
    pub fn new() -> Self {
        Self::with_checksum(DEFAULT_WBITS, Checksum::None)
            .expect("default window bits are always valid")
    }

    /// Create a decompressor with a `1 << wbits` window (8..=15).
    pub fn with_wbits(wbits: u8) -> Result<Self> {
        Self::with_checksum(wbits, Checksum::None)
    }

    /// Create a decompressor whose window carries `checksum`; the
    /// framing layer verifies the digest against the stream trailer.
    pub fn with_checksum(wbits: u8, checksum: Checksum) -> Result<Self> {
        Ok(Self {
            bits: BitReader::new(),
            state: State::BlockHeader,
            window: Window::new(wbits, checksum)?,
            tables: Tables::Fixed,
            final_block: false,
            hlit: 0,
            hdist: 0,
            hclen: 0,
            cl_idx: 0,
            cl_lens: [0; 19],
            cl_table: DecodeTable::build(&[0u8; 19])
                .expect("an all-zero length vector always builds"),
            lens: [0; MAX_LENS],
            len_idx: 0,
            stored_remaining: 0,
            match_length: 0,
            match_distance: 0,
            total_in: 0,
            total_out: 0,
        })
    }

    /// Reset the session, reusing the window and table allocations.
    pub fn reset(&mut self) {
        self.bits.reset();
        self.state = State::BlockHeader;
        self.window.reset();
        self.tables = Tables::Fixed;
        self.final_block = false;
        self.stored_remaining = 0;
        self.match_length = 0;
        self.match_distance = 0;
        self.total_in = 0;
        self.total_out = 0;
    }

    /// Reset and install a fresh checksum handle.
    pub fn reset_with(&mut self, checksum: Checksum) {
        self.window.reset_with(checksum);
        self.reset();
    }

    /// The running checksum digest of all decoded output.
    pub fn checksum(&self) -> u32 {
        self.window.checksum()
    }

    /// Total bytes consumed over the session.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    /// Total bytes written over the session.
    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    /// Bits buffered in the accumulator but not yet decoded.
    pub fn pending_bits(&self) -> u8 {
        self.bits.available()
    }

    fn end_of_block(&mut self) {
        if self.final_block {
            // Trailing framing data, if any, starts at the next byte.
            self.bits.align();
            self.state = State::Done;
        } else {
            self.state = State::BlockHeader;
        }
    }

    fn step(&mut self, input: &[u8], output: &mut [u8]) -> Result<(usize, usize, DecompressStatus)> {
        let mut pos = 0usize;
        let mut opos = 0usize;

        // Top up the accumulator or suspend; fed bytes are consumed from
        // the caller's slice but nothing is committed until a whole
        // field is present.
        macro_rules! need {
            ($n:expr) => {
                while self.bits.available() < $n {
                    if pos == input.len() {
                        return Ok((pos, opos, DecompressStatus::NeedsInput));
                    }
                    self.bits.feed(input[pos]);
                    pos += 1;
                }
            };
        }

        // Resolve one Huffman code without consuming it.
        macro_rules! decode_sym {
            ($table:expr, $invalid:expr) => {
                loop {
                    match $table.decode(self.bits.hold(), self.bits.available()) {
                        Decoded::Symbol { symbol, len } => break (symbol, len),
                        Decoded::NeedMore => {
                            if pos == input.len() {
                                return Ok((pos, opos, DecompressStatus::NeedsInput));
                            }
                            self.bits.feed(input[pos]);
                            pos += 1;
                        }
                        Decoded::Invalid => return Err($invalid),
                    }
                }
            };
        }

        loop {
            match self.state {
                State::BlockHeader => {
                    need!(3);
                    let header = self.bits.peek(3);
                    self.bits.consume(3);
                    self.final_block = header & 1 == 1;
                    match header >> 1 {
                        0 => self.state = State::StoredLen,
                        1 => {
                            self.tables = Tables::Fixed;
                            self.state = State::Block;
                        }
                        2 => self.state = State::TableHeader,
                        _ => return Err(OxiflateError::InvalidBlockKind),
                    }
                }

                State::StoredLen => {
                    self.bits.align();
                    need!(32);
                    let len = self.bits.peek(16);
                    self.bits.consume(16);
                    let nlen = self.bits.peek(16);
                    self.bits.consume(16);
                    if len != !nlen {
                        return Err(OxiflateError::InvalidComplementOfLength);
                    }
                    self.stored_remaining = len as usize;
                    self.state = State::StoredCopy;
                }

                State::StoredCopy => {
                    // Bytes already in the accumulator come first.
                    while self.stored_remaining > 0 && self.bits.available() >= 8 {
                        if opos == output.len() {
                            return Ok((pos, opos, DecompressStatus::NeedsOutput));
                        }
                        let byte = self.bits.peek(8) as u8;
                        self.bits.consume(8);
                        output[opos] = byte;
                        opos += 1;
                        self.window.push(byte);
                        self.stored_remaining -= 1;
                    }
                    while self.stored_remaining > 0 {
                        if pos == input.len() {
                            return Ok((pos, opos, DecompressStatus::NeedsInput));
                        }
                        if opos == output.len() {
                            return Ok((pos, opos, DecompressStatus::NeedsOutput));
                        }
                        let n = self
                            .stored_remaining
                            .min(input.len() - pos)
                            .min(output.len() - opos);
                        output[opos..opos + n].copy_from_slice(&input[pos..pos + n]);
                        self.window.extend(&input[pos..pos + n]);
                        pos += n;
                        opos += n;
                        self.stored_remaining -= n;
                    }
                    self.end_of_block();
                }

                State::TableHeader => {
                    need!(14);
                    let hlit = self.bits.peek(5) as usize + 257;
                    self.bits.consume(5);
                    let hdist = self.bits.peek(5) as usize + 1;
                    self.bits.consume(5);
                    let hclen = self.bits.peek(4) as usize + 4;
                    self.bits.consume(4);
                    if hlit > 286 || hdist > 30 {
                        return Err(OxiflateError::invalid_dictionary(
                            "too many literal/length or distance codes",
                        ));
                    }
                    self.hlit = hlit;
                    self.hdist = hdist;
                    self.hclen = hclen;
                    self.cl_idx = 0;
                    self.cl_lens = [0; 19];
                    self.state = State::TableClen;
                }

                State::TableClen => {
                    while self.cl_idx < self.hclen {
                        need!(3);
                        self.cl_lens[CODE_LENGTH_ORDER[self.cl_idx]] = self.bits.peek(3) as u8;
                        self.bits.consume(3);
                        self.cl_idx += 1;
                    }
                    self.cl_table = DecodeTable::build(&self.cl_lens)?;
                    self.lens = [0; MAX_LENS];
                    self.len_idx = 0;
                    self.state = State::TableLens;
                }

                State::TableLens => {
                    let total = self.hlit + self.hdist;
                    while self.len_idx < total {
                        let (sym, len) = decode_sym!(
                            self.cl_table,
                            OxiflateError::invalid_dictionary("invalid code length code")
                        );
                        match sym {
                            0..=15 => {
                                self.bits.consume(len);
                                self.lens[self.len_idx] = sym as u8;
                                self.len_idx += 1;
                            }
                            16 => {
                                if self.len_idx == 0 {
                                    return Err(OxiflateError::invalid_dictionary(
                                        "length repeat with no previous length",
                                    ));
                                }
                                need!(len + 2);
                                let repeat = 3 + ((self.bits.hold() >> len) & 0b11) as usize;
                                self.bits.consume(len + 2);
                                if self.len_idx + repeat > total {
                                    return Err(OxiflateError::invalid_dictionary(
                                        "code length repeat overruns the table",
                                    ));
                                }
                                let prev = self.lens[self.len_idx - 1];
                                for _ in 0..repeat {
                                    self.lens[self.len_idx] = prev;
                                    self.len_idx += 1;
                                }
                            }
                            17 | 18 => {
                                let (extra_bits, base) = if sym == 17 { (3u8, 3) } else { (7u8, 11) };
                                need!(len + extra_bits);
                                let mask = (1u32 << extra_bits) - 1;
                                let repeat = base + ((self.bits.hold() >> len) & mask) as usize;
                                self.bits.consume(len + extra_bits);
                                if self.len_idx + repeat > total {
                                    return Err(OxiflateError::invalid_dictionary(
                                        "code length repeat overruns the table",
                                    ));
                                }
                                for _ in 0..repeat {
                                    self.lens[self.len_idx] = 0;
                                    self.len_idx += 1;
                                }
                            }
                            _ => {
                                return Err(OxiflateError::invalid_dictionary(
                                    "invalid code length symbol",
                                ));
                            }
                        }
                    }

                    if self.lens[256] == 0 {
                        return Err(OxiflateError::invalid_dictionary(
                            "missing end-of-block code",
                        ));
                    }
                    let litlen = DecodeTable::build(&self.lens[..self.hlit])?;
                    let dist = DecodeTable::build(&self.lens[self.hlit..self.hlit + self.hdist])?;
                    self.tables = Tables::Dynamic { litlen, dist };
                    self.state = State::Block;
                }

                State::Block => {
                    let table = match &self.tables {
                        Tables::Fixed => fixed_litlen_table(),
                        Tables::Dynamic { litlen, .. } => litlen,
                    };
                    let (symbol, len) = decode_sym!(
                        table,
                        OxiflateError::invalid_dictionary("invalid literal/length code")
                    );
                    if symbol < 256 {
                        if opos == output.len() {
                            return Ok((pos, opos, DecompressStatus::NeedsOutput));
                        }
                        self.bits.consume(len);
                        output[opos] = symbol as u8;
                        opos += 1;
                        self.window.push(symbol as u8);
                    } else if symbol == 256 {
                        self.bits.consume(len);
                        self.end_of_block();
                    } else if symbol <= 285 {
                        self.bits.consume(len);
                        self.state = State::LengthExtra { sym: symbol };
                    } else {
                        return Err(OxiflateError::invalid_dictionary(
                            "invalid literal/length symbol",
                        ));
                    }
                }

                State::LengthExtra { sym } => {
                    let extra_bits = LENGTH_EXTRA_BITS[(sym - 257) as usize];
                    need!(extra_bits);
                    let extra = self.bits.peek(extra_bits);
                    self.bits.consume(extra_bits);
                    self.state = State::DistSym {
                        length: decode_length(sym, extra) as usize,
                    };
                }

                State::DistSym { length } => {
                    let table = match &self.tables {
                        Tables::Fixed => fixed_distance_table(),
                        Tables::Dynamic { dist, .. } => dist,
                    };
                    let (symbol, len) = decode_sym!(
                        table,
                        OxiflateError::invalid_dictionary("invalid distance code")
                    );
                    if symbol >= 30 {
                        return Err(OxiflateError::invalid_distance_code(symbol));
                    }
                    self.bits.consume(len);
                    self.state = State::DistExtra {
                        length,
                        sym: symbol,
                    };
                }

                State::DistExtra { length, sym } => {
                    let extra_bits = DISTANCE_EXTRA_BITS[sym as usize];
                    need!(extra_bits);
                    let extra = self.bits.peek(extra_bits);
                    self.bits.consume(extra_bits);
                    self.match_length = length;
                    self.match_distance = decode_distance(sym, extra) as usize;
                    self.state = State::Copy;
                }

                State::Copy => {
                    if self.match_length > 0 && opos == output.len() {
                        return Ok((pos, opos, DecompressStatus::NeedsOutput));
                    }
                    let n =
                        self.window
                            .copy(self.match_distance, self.match_length, &mut output[opos..])?;
                    opos += n;
                    self.match_length -= n;
                    if self.match_length > 0 {
                        return Ok((pos, opos, DecompressStatus::NeedsOutput));
                    }
                    self.state = State::Block;
                }

                State::Done => {
                    return Ok((pos, opos, DecompressStatus::Done));
                }
            }
        }
    }
}

impl Default for Inflater {
    fn default() -> Self {
        Self::new()
    }
}

impl Decompressor for Inflater {
    fn decompress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<(usize, usize, DecompressStatus)> {
        let (consumed, produced, status) = self.step(input, output)?;
        self.total_in += consumed as u64;
        self.total_out += produced as u64;
        Ok((consumed, produced, status))
    }

    fn reset(&mut self) {
        Inflater::reset(self);
    }

    fn is_finished(&self) -> bool {
        self.state == State::Done
    }
}

/// Decompress one raw DEFLATE stream.
pub fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    Inflater::new().decompress_all(data)
}
