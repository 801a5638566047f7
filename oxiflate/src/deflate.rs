//! Streaming DEFLATE compression (RFC 1951).
//!
//! [`Deflater`] consumes input through the LZ77 match finder into a
//! bounded token buffer, closes a block whenever that buffer fills or a
//! flush directive arrives, and picks the cheapest of the three block
//! encodings for each block:
//!
//! - **Stored** (BTYPE 00): byte-aligned literal copy, for very small or
//!   incompressible blocks
//! - **Fixed Huffman** (BTYPE 01): the preset code of RFC 1951 §3.2.6
//! - **Dynamic Huffman** (BTYPE 10): per-block canonical trees whose code
//!   lengths are themselves RLE-coded with symbols 16/17/18
//!
//! Encoded bytes are staged in the bit writer and drained into the
//! caller's bounded output slice; the session suspends with
//! `NeedsOutput` when the slice fills and resumes where it left off.

use crate::huffman::{build_lengths, CodeTable, END_OF_BLOCK};
use crate::lz77::{Lz77, Token};
use crate::tables::{
    distance_to_code, fixed_distance_codes, fixed_distance_lengths, fixed_litlen_codes,
    fixed_litlen_lengths, length_to_code, CODE_LENGTH_ORDER,
};
use oxiflate_core::bitstream::BitWriter;
use oxiflate_core::error::{OxiflateError, Result};
use oxiflate_core::traits::{CompressStatus, Compressor, FlushMode};

/// Default compression level.
pub const DEFAULT_LEVEL: u8 = 4;

/// Default window bits.
pub const DEFAULT_WBITS: u8 = 15;

/// Tokens buffered before a block is closed.
const TOKEN_BUFFER: usize = 16384;

/// Largest payload of one stored block.
const MAX_STORED: usize = 65535;

/// How a block is encoded on the wire.
enum BlockKind {
    Stored,
    Fixed,
    Dynamic(Box<DynPlan>),
}

/// Everything needed to emit one dynamic block header.
struct DynPlan {
    lit_lens: Vec<u8>,
    dist_lens: Vec<u8>,
    cl_lens: Vec<u8>,
    /// RLE of the combined code lengths: (symbol, extra value, extra bits).
    cl_syms: Vec<(u8, u8, u8)>,
    /// Literal/length codes transmitted (>= 257).
    hlit: usize,
    /// Distance codes transmitted (>= 1).
    hdist: usize,
    /// Code-length codes transmitted (>= 4).
    hclen: usize,
}

/// Streaming DEFLATE compressor.
#[derive(Debug)]
pub struct Deflater {
    lz77: Lz77,
    level: u8,
    wbits: u8,
    /// Pending tokens of the current block.
    tokens: Vec<Token>,
    /// Tokens already folded into the frequency pair.
    counted: usize,
    freq_litlen: [u32; 286],
    freq_dist: [u32; 30],
    /// Raw bytes covered by the pending tokens, for the stored option.
    block_raw: Vec<u8>,
    /// Whether `block_raw` is intact and small enough to store.
    stored_ok: bool,
    writer: BitWriter,
    finished: bool,
    /// Nothing has been consumed since the last flush emission.
    flushed: bool,
    total_in: u64,
    total_out: u64,
}

impl Deflater {
    /// Create a compressor with the given window bits (8..=15) and
    /// level (0..=9).
    pub fn new(wbits: u8, level: u8) -> Result<Self> {
        Ok(Self {
            lz77: Lz77::new(wbits, level)?,
            level,
            wbits,
            tokens: Vec::with_capacity(TOKEN_BUFFER),
            counted: 0,
            freq_litlen: [0; 286],
            freq_dist: [0; 30],
            block_raw: Vec::new(),
            stored_ok: true,
            writer: BitWriter::new(),
            finished: false,
            flushed: false,
            total_in: 0,
            total_out: 0,
        })
    }

    /// Create a compressor with the default 32 KiB window.
    pub fn with_level(level: u8) -> Result<Self> {
        Self::new(DEFAULT_WBITS, level)
    }

    /// The configured compression level.
    pub fn level(&self) -> u8 {
        self.level
    }

    /// The configured window bits.
    pub fn wbits(&self) -> u8 {
        self.wbits
    }

    /// Total bytes consumed over the session.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    /// Total bytes produced over the session.
    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    /// Bits held in the accumulator that have not formed a full byte.
    pub fn pending_bits(&self) -> u8 {
        self.writer.pending_bits()
    }

    /// Export the tree-building statistics.
    pub fn frequencies(&self) -> ([u32; 286], [u32; 30]) {
        (self.freq_litlen, self.freq_dist)
    }

    /// Import tree-building statistics.
    ///
    /// With `paranoid` set, every symbol present in the pending token
    /// buffer must have a strictly positive frequency; otherwise the
    /// import is rejected with [`OxiflateError::InvalidFrequencies`],
    /// since such a table could not encode the pending block. Without
    /// `paranoid` the caller is trusted.
    pub fn set_frequencies(
        &mut self,
        litlen: &[u32; 286],
        dist: &[u32; 30],
        paranoid: bool,
    ) -> Result<()> {
        if paranoid {
            for token in &self.tokens {
                match token {
                    Token::Literal(byte) => {
                        if litlen[*byte as usize] == 0 {
                            return Err(OxiflateError::InvalidFrequencies {
                                symbol: u16::from(*byte),
                            });
                        }
                    }
                    Token::Match { length, distance } => {
                        let (lc, _, _) = length_to_code(*length);
                        if litlen[lc as usize] == 0 {
                            return Err(OxiflateError::InvalidFrequencies { symbol: lc });
                        }
                        let (dc, _, _) = distance_to_code(*distance);
                        if dist[dc as usize] == 0 {
                            return Err(OxiflateError::InvalidFrequencies { symbol: dc });
                        }
                    }
                }
            }
        }
        self.freq_litlen = *litlen;
        self.freq_dist = *dist;
        Ok(())
    }

    /// Reset the session to its initial state, keeping the allocations.
    pub fn reset(&mut self) {
        self.lz77.reset();
        self.tokens.clear();
        self.counted = 0;
        self.freq_litlen = [0; 286];
        self.freq_dist = [0; 30];
        self.block_raw.clear();
        self.stored_ok = true;
        self.writer.reset();
        self.finished = false;
        self.flushed = false;
        self.total_in = 0;
        self.total_out = 0;
    }

    /// Fold newly produced tokens into the frequency pair.
    fn account_new_tokens(&mut self) {
        for token in &self.tokens[self.counted..] {
            match token {
                Token::Literal(byte) => self.freq_litlen[*byte as usize] += 1,
                Token::Match { length, distance } => {
                    let (lc, _, _) = length_to_code(*length);
                    self.freq_litlen[lc as usize] += 1;
                    let (dc, _, _) = distance_to_code(*distance);
                    self.freq_dist[dc as usize] += 1;
                }
            }
        }
        self.counted = self.tokens.len();
    }

    fn after_tokenize(&mut self) {
        self.account_new_tokens();
        if self.block_raw.len() > MAX_STORED {
            self.stored_ok = false;
        }
        if !self.stored_ok {
            self.block_raw.clear();
        }
    }

    /// Tokenize everything the match finder still buffers. Returns
    /// `false` when a full block was closed instead and the caller
    /// should drain the writer before retrying.
    fn drain_lz77(&mut self) -> bool {
        if self.level == 0 {
            return true;
        }
        let done = self
            .lz77
            .flush_tail(&mut self.tokens, TOKEN_BUFFER, &mut self.block_raw);
        self.after_tokenize();
        if !done {
            self.emit_block(false);
            return false;
        }
        true
    }

    fn step(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> (usize, usize, CompressStatus) {
        let mut consumed = 0usize;
        let mut produced = 0usize;
        let mut flush_done = false;

        loop {
            produced += self.writer.drain_into(&mut output[produced..]);
            if self.writer.has_staged() {
                return (consumed, produced, CompressStatus::NeedsOutput);
            }
            if self.finished {
                return (consumed, produced, CompressStatus::Done);
            }

            if consumed < input.len() {
                if self.level == 0 {
                    let room = MAX_STORED - self.block_raw.len();
                    let take = room.min(input.len() - consumed);
                    self.block_raw
                        .extend_from_slice(&input[consumed..consumed + take]);
                    consumed += take;
                    self.flushed = false;
                    if self.block_raw.len() == MAX_STORED {
                        self.emit_block(false);
                    }
                } else {
                    let n = self.lz77.push(
                        &input[consumed..],
                        &mut self.tokens,
                        TOKEN_BUFFER,
                        &mut self.block_raw,
                    );
                    consumed += n;
                    if n > 0 {
                        self.flushed = false;
                    }
                    self.after_tokenize();
                    if self.tokens.len() >= TOKEN_BUFFER {
                        self.emit_block(false);
                    }
                }
                continue;
            }

            match flush {
                FlushMode::None => {
                    return (consumed, produced, CompressStatus::NeedsInput);
                }
                FlushMode::Partial | FlushMode::Sync | FlushMode::Full => {
                    if flush_done || self.flushed {
                        return (consumed, produced, CompressStatus::NeedsInput);
                    }
                    if !self.drain_lz77() {
                        continue;
                    }
                    if !self.tokens.is_empty() || !self.block_raw.is_empty() {
                        self.emit_block(false);
                    }
                    match flush {
                        FlushMode::Partial => self.emit_empty_fixed_block(),
                        FlushMode::Sync => self.emit_empty_stored_block(),
                        FlushMode::Full => {
                            self.emit_empty_stored_block();
                            self.freq_litlen = [0; 286];
                            self.freq_dist = [0; 30];
                        }
                        _ => unreachable!(),
                    }
                    self.flushed = true;
                    flush_done = true;
                }
                FlushMode::Finish => {
                    if !self.drain_lz77() {
                        continue;
                    }
                    self.emit_block(true);
                    self.writer.align();
                    self.finished = true;
                }
            }
        }
    }

    /// Close the pending block, choosing the cheapest encoding.
    fn emit_block(&mut self, last: bool) {
        self.freq_litlen[END_OF_BLOCK as usize] += 1;

        let kind = if self.level == 0 {
            BlockKind::Stored
        } else {
            self.choose_block_kind()
        };

        match kind {
            BlockKind::Stored => self.write_stored_block(last),
            BlockKind::Fixed => {
                self.writer.write_bits(u16::from(last), 1);
                self.writer.write_bits(0b01, 2);
                write_tokens(
                    &mut self.writer,
                    &self.tokens,
                    fixed_litlen_codes(),
                    fixed_distance_codes(),
                );
            }
            BlockKind::Dynamic(plan) => self.write_dynamic_block(last, &plan),
        }

        self.tokens.clear();
        self.counted = 0;
        self.block_raw.clear();
        self.stored_ok = true;
    }

    fn choose_block_kind(&self) -> BlockKind {
        let fixed_cost = self.coded_cost(&fixed_litlen_lengths(), &fixed_distance_lengths());

        let plan = self.plan_dynamic();
        let mut header = 14u64 + 3 * plan.hclen as u64;
        for &(sym, _, extra_bits) in &plan.cl_syms {
            header += u64::from(plan.cl_lens[sym as usize]) + u64::from(extra_bits);
        }
        let dynamic_cost = self.coded_cost(&plan.lit_lens, &plan.dist_lens) + header;

        // Worst-case alignment padding counts against the stored option.
        let stored_cost = if self.stored_ok {
            Some(3 + 7 + 32 + 8 * self.block_raw.len() as u64)
        } else {
            None
        };

        if let Some(stored) = stored_cost {
            if stored <= fixed_cost && stored <= dynamic_cost {
                return BlockKind::Stored;
            }
        }
        if fixed_cost <= dynamic_cost {
            BlockKind::Fixed
        } else {
            BlockKind::Dynamic(Box::new(plan))
        }
    }

    /// Bit cost of coding the pending tokens with the given lengths,
    /// including the 3-bit block header and the end-of-block symbol.
    fn coded_cost(&self, lit_lens: &[u8], dist_lens: &[u8]) -> u64 {
        let mut bits = 3u64;
        for token in &self.tokens {
            match token {
                Token::Literal(byte) => bits += u64::from(lit_lens[*byte as usize]),
                Token::Match { length, distance } => {
                    let (lc, le, _) = length_to_code(*length);
                    bits += u64::from(lit_lens[lc as usize]) + u64::from(le);
                    let (dc, de, _) = distance_to_code(*distance);
                    bits += u64::from(dist_lens[dc as usize]) + u64::from(de);
                }
            }
        }
        bits + u64::from(lit_lens[END_OF_BLOCK as usize])
    }

    fn plan_dynamic(&self) -> DynPlan {
        let lit_lens = build_lengths(&self.freq_litlen, 15);
        let dist_lens = build_lengths(&self.freq_dist, 15);

        let hlit = code_count(&lit_lens, 257);
        let hdist = code_count(&dist_lens, 1);

        let mut combined = Vec::with_capacity(hlit + hdist);
        combined.extend_from_slice(&lit_lens[..hlit]);
        combined.extend_from_slice(&dist_lens[..hdist]);

        let (cl_syms, cl_freqs) = rle_code_lengths(&combined);
        let cl_lens = build_lengths(&cl_freqs, 7);

        let mut hclen = 19;
        while hclen > 4 && cl_lens[CODE_LENGTH_ORDER[hclen - 1]] == 0 {
            hclen -= 1;
        }

        DynPlan {
            lit_lens,
            dist_lens,
            cl_lens,
            cl_syms,
            hlit,
            hdist,
            hclen,
        }
    }

    fn write_stored_block(&mut self, last: bool) {
        debug_assert!(self.block_raw.len() <= MAX_STORED);
        let w = &mut self.writer;
        w.write_bits(u16::from(last), 1);
        w.write_bits(0b00, 2);
        w.align();
        let len = self.block_raw.len() as u16;
        w.write_u16_le(len);
        w.write_u16_le(!len);
        w.write_bytes(&self.block_raw);
    }

    fn write_dynamic_block(&mut self, last: bool, plan: &DynPlan) {
        let w = &mut self.writer;
        w.write_bits(u16::from(last), 1);
        w.write_bits(0b10, 2);
        w.write_bits((plan.hlit - 257) as u16, 5);
        w.write_bits((plan.hdist - 1) as u16, 5);
        w.write_bits((plan.hclen - 4) as u16, 4);
        for &order in CODE_LENGTH_ORDER.iter().take(plan.hclen) {
            w.write_bits(u16::from(plan.cl_lens[order]), 3);
        }

        let cl_codes = CodeTable::from_lengths(&plan.cl_lens);
        for &(sym, extra, extra_bits) in &plan.cl_syms {
            let (code, len) = cl_codes.code(u16::from(sym));
            w.write_bits(code, len);
            if extra_bits > 0 {
                w.write_bits(u16::from(extra), extra_bits);
            }
        }

        let lit_codes = CodeTable::from_lengths(&plan.lit_lens);
        let dist_codes = CodeTable::from_lengths(&plan.dist_lens);
        write_tokens(&mut self.writer, &self.tokens, &lit_codes, &dist_codes);
    }

    /// The nonstandard partial-flush marker: an empty fixed block. Not
    /// byte-aligned — its ten bits push every data symbol into a fully
    /// emitted byte.
    fn emit_empty_fixed_block(&mut self) {
        self.writer.write_bits(0, 1);
        self.writer.write_bits(0b01, 2);
        let (code, len) = fixed_litlen_codes().code(END_OF_BLOCK);
        self.writer.write_bits(code, len);
    }

    /// The sync-flush marker: an empty stored block, byte-aligned.
    fn emit_empty_stored_block(&mut self) {
        self.writer.write_bits(0, 1);
        self.writer.write_bits(0b00, 2);
        self.writer.align();
        self.writer.write_u16_le(0);
        self.writer.write_u16_le(0xFFFF);
    }
}

/// Emit the token stream plus end-of-block with the given code tables.
fn write_tokens(writer: &mut BitWriter, tokens: &[Token], lit: &CodeTable, dist: &CodeTable) {
    for token in tokens {
        match token {
            Token::Literal(byte) => {
                let (code, len) = lit.code(u16::from(*byte));
                writer.write_bits(code, len);
            }
            Token::Match { length, distance } => {
                let (lc, le, lv) = length_to_code(*length);
                let (code, len) = lit.code(lc);
                writer.write_bits(code, len);
                if le > 0 {
                    writer.write_bits(lv, le);
                }
                let (dc, de, dv) = distance_to_code(*distance);
                let (code, len) = dist.code(dc);
                writer.write_bits(code, len);
                if de > 0 {
                    writer.write_bits(dv, de);
                }
            }
        }
    }
    let (code, len) = lit.code(END_OF_BLOCK);
    writer.write_bits(code, len);
}

/// Number of codes to transmit: index of the last nonzero length plus
/// one, at least `min`.
fn code_count(lengths: &[u8], min: usize) -> usize {
    let mut count = min;
    for (i, &len) in lengths.iter().enumerate() {
        if len > 0 {
            count = count.max(i + 1);
        }
    }
    count
}

/// RLE-encode code lengths with symbols 16 (repeat previous 3-6), 17
/// (zeros 3-10), and 18 (zeros 11-138). Returns the symbol stream and
/// the code-length alphabet frequencies.
fn rle_code_lengths(lengths: &[u8]) -> (Vec<(u8, u8, u8)>, [u32; 19]) {
    let mut syms: Vec<(u8, u8, u8)> = Vec::new();
    let mut freqs = [0u32; 19];
    let mut push = |syms: &mut Vec<(u8, u8, u8)>, s: u8, v: u8, b: u8| {
        syms.push((s, v, b));
        freqs[s as usize] += 1;
    };

    let mut i = 0;
    while i < lengths.len() {
        let value = lengths[i];
        let mut run = 1;
        while i + run < lengths.len() && lengths[i + run] == value {
            run += 1;
        }

        if value == 0 {
            let mut r = run;
            while r >= 11 {
                let take = r.min(138);
                push(&mut syms, 18, (take - 11) as u8, 7);
                r -= take;
            }
            if r >= 3 {
                push(&mut syms, 17, (r - 3) as u8, 3);
                r = 0;
            }
            while r > 0 {
                push(&mut syms, 0, 0, 0);
                r -= 1;
            }
        } else {
            push(&mut syms, value, 0, 0);
            let mut r = run - 1;
            while r >= 3 {
                let take = r.min(6);
                push(&mut syms, 16, (take - 3) as u8, 2);
                r -= take;
            }
            while r > 0 {
                push(&mut syms, value, 0, 0);
                r -= 1;
            }
        }

        i += run;
    }

    (syms, freqs)
}

impl Compressor for Deflater {
    fn compress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> Result<(usize, usize, CompressStatus)> {
        let (consumed, produced, status) = self.step(input, output, flush);
        self.total_in += consumed as u64;
        self.total_out += produced as u64;
        Ok((consumed, produced, status))
    }

    fn reset(&mut self) {
        Deflater::reset(self);
    }

    fn is_finished(&self) -> bool {
        self.finished
    }
}

/// Compress `data` as one raw DEFLATE stream.
pub fn deflate(data: &[u8], level: u8) -> Result<Vec<u8>> {
    let mut deflater = Deflater::with_level(level)?;
    deflater.compress_all(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inflate::inflate;

    #[test]
    fn test_deflate_stored() {
        let input = b"Hello, World!";
        let compressed = deflate(input, 0).unwrap();
        assert_eq!(inflate(&compressed).unwrap(), input);
    }

    #[test]
    fn test_deflate_empty_is_one_fixed_block() {
        let compressed = deflate(b"", 6).unwrap();
        // BFINAL=1, BTYPE=01, seven-bit end-of-block, zero padding.
        assert_eq!(compressed, vec![0x03, 0x00]);
    }

    #[test]
    fn test_deflate_compressed() {
        let input = b"AAAAAAAAAABBBBBBBBBBCCCCCCCCCC";
        let compressed = deflate(input, 6).unwrap();
        assert!(compressed.len() < input.len());
        assert_eq!(inflate(&compressed).unwrap(), input);
    }

    #[test]
    fn test_deflate_roundtrip() {
        let inputs = [
            b"Hello".to_vec(),
            b"The quick brown fox jumps over the lazy dog".to_vec(),
            vec![0u8; 1000],
            (0..=255).collect::<Vec<u8>>(),
        ];

        for input in &inputs {
            for level in [0, 1, 4, 6, 9] {
                let compressed = deflate(input, level).unwrap();
                let decompressed = inflate(&compressed).unwrap();
                assert_eq!(
                    &decompressed,
                    input,
                    "roundtrip failed at level {level} with {} bytes",
                    input.len()
                );
            }
        }
    }

    #[test]
    fn test_deflate_dynamic_beats_fixed_on_skewed_data() {
        // A long skewed stream where per-block trees clearly win.
        let mut input = Vec::new();
        for i in 0..6000u32 {
            input.push(if i % 10 == 0 { 0xE7 } else { 0x20 });
        }

        let compressed = deflate(&input, 9).unwrap();
        assert!(compressed.len() < input.len() / 4);
        assert_eq!(inflate(&compressed).unwrap(), input);
    }

    #[test]
    fn test_deflate_incompressible_stays_near_input_size() {
        // Deterministic xorshift noise does not compress; stored blocks
        // keep the expansion to the framing overhead.
        let mut state = 0x2545F4914F6CDD1Du64;
        let mut input = Vec::with_capacity(1 << 16);
        for _ in 0..(1 << 16) {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            input.push((state >> 56) as u8);
        }

        let compressed = deflate(&input, 9).unwrap();
        assert!(compressed.len() <= input.len() + 64);
        assert_eq!(inflate(&compressed).unwrap(), input);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(Deflater::with_level(10).is_err());
        assert!(Deflater::new(7, 6).is_err());
        assert!(Deflater::new(16, 6).is_err());
    }

    #[test]
    fn test_frequencies_export_import() {
        // Enough input that tokens are pending beyond the lookahead
        // margin when no flush is requested.
        let input: Vec<u8> = (0..1000u32).map(|i| (i % 7) as u8 + b'a').collect();
        let mut deflater = Deflater::with_level(6).unwrap();
        let mut sink = [0u8; 4096];
        deflater
            .compress(&input, &mut sink, FlushMode::None)
            .unwrap();
        assert!(!deflater.tokens.is_empty());

        let (lit, dist) = deflater.frequencies();
        assert!(deflater.set_frequencies(&lit, &dist, true).is_ok());

        // Zeroed statistics cannot describe the pending tokens.
        let zero_lit = [0u32; 286];
        let zero_dist = [0u32; 30];
        assert!(matches!(
            deflater.set_frequencies(&zero_lit, &zero_dist, true),
            Err(OxiflateError::InvalidFrequencies { .. })
        ));
        // Unless the caller opts out of the check.
        assert!(deflater
            .set_frequencies(&zero_lit, &zero_dist, false)
            .is_ok());
    }

    #[test]
    fn test_pending_bits_after_partial_flush() {
        let mut deflater = Deflater::with_level(6).unwrap();
        let mut out = vec![0u8; 256];
        let (_, _, status) = deflater
            .compress(b"hello world", &mut out, FlushMode::Partial)
            .unwrap();
        assert_eq!(status, CompressStatus::NeedsInput);
        // Partial flush leaves the stream unaligned.
        assert!(deflater.pending_bits() > 0);

        let (_, _, status) = deflater.compress(b"", &mut out, FlushMode::Sync).unwrap();
        assert_eq!(status, CompressStatus::NeedsInput);
    }

    #[test]
    fn test_rle_code_lengths() {
        // 1, then 15 zeros, then 3,3,3,3,3.
        let mut lengths = vec![1u8];
        lengths.extend(std::iter::repeat(0).take(15));
        lengths.extend(std::iter::repeat(3).take(5));

        let (syms, freqs) = rle_code_lengths(&lengths);
        assert_eq!(syms[0], (1, 0, 0));
        assert_eq!(syms[1], (18, 4, 7)); // 15 zeros = 11 + 4
        assert_eq!(syms[2], (3, 0, 0));
        assert_eq!(syms[3], (16, 1, 2)); // repeat 3 four times
        assert_eq!(freqs[18], 1);
        assert_eq!(freqs[16], 1);

        // Expansion must reproduce the original vector.
        let mut expanded: Vec<u8> = Vec::new();
        for &(sym, extra, _) in &syms {
            match sym {
                16 => {
                    let prev = *expanded.last().unwrap();
                    expanded.extend(std::iter::repeat(prev).take(3 + extra as usize));
                }
                17 => expanded.extend(std::iter::repeat(0).take(3 + extra as usize)),
                18 => expanded.extend(std::iter::repeat(0).take(11 + extra as usize)),
                v => expanded.push(v),
            }
        }
        assert_eq!(expanded, lengths);
    }

    #[test]
    fn test_code_count() {
        let mut lit = vec![0u8; 286];
        lit[0] = 8;
        lit[256] = 7;
        assert_eq!(code_count(&lit, 257), 257);
        lit[280] = 9;
        assert_eq!(code_count(&lit, 257), 281);

        let dist = vec![0u8; 30];
        assert_eq!(code_count(&dist, 1), 1);
    }
}
