//! LZ77 match finding for DEFLATE.
//!
//! The finder scans input for repeats of earlier data within the sliding
//! window and emits a token stream of literals and (length, distance)
//! back-references. A rolling 3-byte multiplicative hash indexes chains
//! of earlier positions; each position walks its chain up to a per-level
//! budget and keeps the longest match, preferring the nearer one on a
//! tie.
//!
//! The finder is streaming: input arrives in arbitrary chunks and is
//! staged in an internal buffer. Positions are only tokenized once at
//! least [`MIN_LOOKAHEAD`] bytes follow them (or the stream is being
//! flushed), so match decisions — and therefore the emitted byte stream —
//! do not depend on how the caller chunks its input.

use oxiflate_core::error::{OxiflateError, Result};
use oxiflate_core::window::WBITS_RANGE;

/// Minimum match length.
pub const MIN_MATCH: usize = 3;

/// Maximum match length.
pub const MAX_MATCH: usize = 258;

/// Bytes of lookahead required before a position may be tokenized
/// outside of a flush.
pub const MIN_LOOKAHEAD: usize = MAX_MATCH + MIN_MATCH + 1;

/// Staging room past the window, comfortably above the lookahead.
const STAGING: usize = 512;

const HASH_BITS: usize = 15;
const HASH_SIZE: usize = 1 << HASH_BITS;
const HASH_MASK: usize = HASH_SIZE - 1;

/// Chain terminator in the hash tables.
const NIL: u32 = u32::MAX;

/// A token produced by the match finder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// A literal byte.
    Literal(u8),
    /// A back-reference to earlier data.
    Match {
        /// Bytes to copy (3..=258).
        length: u16,
        /// Distance back into the window (1..=32768).
        distance: u16,
    },
}

/// Streaming LZ77 match finder.
#[derive(Debug)]
pub struct Lz77 {
    /// Staging buffer: one window of history plus room for new input.
    buf: Vec<u8>,
    wsize: usize,
    /// Hash head: most recent buffer position per hash bucket.
    head: Vec<u32>,
    /// Hash chain: previous position with the same hash, indexed by
    /// buffer position.
    prev: Vec<u32>,
    /// Next position to tokenize.
    strstart: usize,
    /// Bytes valid in `buf`.
    avail: usize,
    /// Positions below this are in the hash tables.
    inserted: usize,
    max_chain: usize,
    lazy: bool,
    level: u8,
}

impl Lz77 {
    /// Create a match finder for a `1 << wbits` window at `level`.
    pub fn new(wbits: u8, level: u8) -> Result<Self> {
        if !WBITS_RANGE.contains(&wbits) {
            return Err(OxiflateError::invalid_wbits(wbits));
        }
        if level > 9 {
            return Err(OxiflateError::invalid_level(level));
        }

        let wsize = 1usize << wbits;
        let (max_chain, lazy) = match level {
            0 => (0, false),
            1 => (4, false),
            2 => (8, false),
            3 => (16, false),
            4 => (32, true),
            5 => (64, true),
            6 => (128, true),
            7 => (256, true),
            8 => (1024, true),
            _ => (4096, true),
        };

        let buf_len = 2 * wsize + STAGING;
        Ok(Self {
            buf: vec![0; buf_len],
            wsize,
            head: vec![NIL; HASH_SIZE],
            prev: vec![NIL; buf_len],
            strstart: 0,
            avail: 0,
            inserted: 0,
            max_chain,
            lazy,
            level,
        })
    }

    /// Reset all state, reusing the allocations.
    pub fn reset(&mut self) {
        self.head.fill(NIL);
        self.prev.fill(NIL);
        self.strstart = 0;
        self.avail = 0;
        self.inserted = 0;
    }

    /// Bytes buffered but not yet tokenized.
    pub fn pending(&self) -> usize {
        self.avail - self.strstart
    }

    #[inline(always)]
    fn hash(b0: u8, b1: u8, b2: u8) -> usize {
        let h = (b0 as usize).wrapping_mul(506832829)
            ^ ((b1 as usize).wrapping_mul(2654435761) << 8)
            ^ ((b2 as usize).wrapping_mul(374761393) << 16);
        (h ^ (h >> 15)) & HASH_MASK
    }

    #[inline]
    fn insert(&mut self, pos: usize) {
        let h = Self::hash(self.buf[pos], self.buf[pos + 1], self.buf[pos + 2]);
        self.prev[pos] = self.head[h];
        self.head[h] = pos as u32;
    }

    /// Index every position below `upto` that has a full 3-byte hash.
    fn insert_upto(&mut self, upto: usize) {
        let limit = upto.min(self.avail.saturating_sub(MIN_MATCH - 1));
        while self.inserted < limit {
            self.insert(self.inserted);
            self.inserted += 1;
        }
    }

    /// Walk the hash chain at `pos` and return the longest match of at
    /// most `max_len` bytes, or `None` below the minimum length. Ties go
    /// to the nearer candidate because chains run nearest-first.
    fn longest_match(&self, pos: usize, max_len: usize) -> Option<(u16, u16)> {
        let h = Self::hash(self.buf[pos], self.buf[pos + 1], self.buf[pos + 2]);
        let min_pos = pos.saturating_sub(self.wsize);

        let mut cand = self.head[h];
        let mut best_len = MIN_MATCH - 1;
        let mut best_dist = 0usize;
        let mut budget = self.max_chain;

        while cand != NIL && budget > 0 {
            let c = cand as usize;
            if c < min_pos || c >= pos {
                break;
            }
            // A candidate can only beat best_len if it matches there.
            if self.buf[c + best_len] == self.buf[pos + best_len]
                && self.buf[c] == self.buf[pos]
            {
                let mut len = 0;
                while len < max_len && self.buf[c + len] == self.buf[pos + len] {
                    len += 1;
                }
                if len > best_len {
                    best_len = len;
                    best_dist = pos - c;
                    if len >= max_len {
                        break;
                    }
                }
            }
            cand = self.prev[c];
            budget -= 1;
        }

        if best_len >= MIN_MATCH && best_dist > 0 {
            Some((best_len as u16, best_dist as u16))
        } else {
            None
        }
    }

    fn tokenize(&mut self, sink: &mut Vec<Token>, cap: usize, raw: &mut Vec<u8>, flushing: bool) {
        loop {
            if sink.len() >= cap {
                return;
            }
            let look = self.avail - self.strstart;
            if flushing {
                if look == 0 {
                    return;
                }
            } else if look < MIN_LOOKAHEAD {
                return;
            }

            let pos = self.strstart;

            // Residue shorter than a match hashes nothing.
            if look < MIN_MATCH {
                let byte = self.buf[pos];
                sink.push(Token::Literal(byte));
                raw.push(byte);
                self.strstart += 1;
                continue;
            }

            self.insert_upto(pos);
            let max_len = MAX_MATCH.min(look);
            let found = if self.level == 0 {
                None
            } else {
                self.longest_match(pos, max_len)
            };

            match found {
                Some((length, distance)) => {
                    let mut take = true;
                    // Lazy matching: a strictly longer match one byte
                    // ahead demotes this one to a literal.
                    if self.lazy && look > MIN_MATCH {
                        self.insert_upto(pos + 1);
                        let probe_max = MAX_MATCH.min(look - 1);
                        if probe_max >= MIN_MATCH {
                            if let Some((probe_len, _)) = self.longest_match(pos + 1, probe_max) {
                                if probe_len > length {
                                    take = false;
                                }
                            }
                        }
                    }

                    if take {
                        sink.push(Token::Match { length, distance });
                        raw.extend_from_slice(&self.buf[pos..pos + length as usize]);
                        self.strstart += length as usize;
                    } else {
                        let byte = self.buf[pos];
                        sink.push(Token::Literal(byte));
                        raw.push(byte);
                        self.strstart += 1;
                    }
                }
                None => {
                    let byte = self.buf[pos];
                    sink.push(Token::Literal(byte));
                    raw.push(byte);
                    self.strstart += 1;
                }
            }
        }
    }

    /// Feed input, tokenizing everything that has enough lookahead.
    ///
    /// Tokens go to `sink` until it reaches `cap`; the bytes each token
    /// covers are appended to `raw`. Returns the number of input bytes
    /// consumed (staged), which may be less than `input.len()` when the
    /// sink fills.
    pub fn push(
        &mut self,
        input: &[u8],
        sink: &mut Vec<Token>,
        cap: usize,
        raw: &mut Vec<u8>,
    ) -> usize {
        let mut consumed = 0;
        loop {
            let space = self.buf.len() - self.avail;
            let take = space.min(input.len() - consumed);
            let start = self.avail;
            self.buf[start..start + take].copy_from_slice(&input[consumed..consumed + take]);
            self.avail += take;
            consumed += take;

            self.tokenize(sink, cap, raw, false);

            if sink.len() >= cap || consumed == input.len() {
                return consumed;
            }
            self.slide();
        }
    }

    /// Tokenize everything still buffered, for a flush or finish.
    ///
    /// Returns `true` once no bytes remain pending; a `false` return
    /// means the sink filled and the caller should drain it and call
    /// again.
    pub fn flush_tail(&mut self, sink: &mut Vec<Token>, cap: usize, raw: &mut Vec<u8>) -> bool {
        self.tokenize(sink, cap, raw, true);
        self.strstart == self.avail
    }

    /// Drop the oldest bytes, keeping one window of history before
    /// `strstart`, and rebase the hash tables. Dropped positions are
    /// farther than one window behind every future position, so chains
    /// lose nothing a later match could use.
    fn slide(&mut self) {
        debug_assert!(self.strstart > self.wsize);
        let shift = self.strstart - self.wsize;
        self.buf.copy_within(shift..self.avail, 0);
        self.avail -= shift;
        self.strstart = self.wsize;
        self.inserted = self.inserted.saturating_sub(shift);

        let rebase = |v: u32| {
            if v != NIL && v as usize >= shift {
                v - shift as u32
            } else {
                NIL
            }
        };
        for entry in self.head.iter_mut() {
            *entry = rebase(*entry);
        }
        // The chain table is indexed by position, so its slots move
        // together with the bytes.
        for i in 0..self.avail {
            self.prev[i] = rebase(self.prev[i + shift]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize_all(input: &[u8], level: u8) -> Vec<Token> {
        let mut lz = Lz77::new(15, level).unwrap();
        let mut sink = Vec::new();
        let mut raw = Vec::new();
        let consumed = lz.push(input, &mut sink, usize::MAX, &mut raw);
        assert_eq!(consumed, input.len());
        assert!(lz.flush_tail(&mut sink, usize::MAX, &mut raw));
        assert_eq!(raw, input);
        sink
    }

    fn reconstruct(tokens: &[Token]) -> Vec<u8> {
        let mut out = Vec::new();
        for token in tokens {
            match token {
                Token::Literal(b) => out.push(*b),
                Token::Match { length, distance } => {
                    for _ in 0..*length {
                        let pos = out.len() - *distance as usize;
                        out.push(out[pos]);
                    }
                }
            }
        }
        out
    }

    #[test]
    fn test_parameter_validation() {
        assert!(Lz77::new(7, 6).is_err());
        assert!(Lz77::new(16, 6).is_err());
        assert!(Lz77::new(15, 10).is_err());
        assert!(Lz77::new(8, 0).is_ok());
    }

    #[test]
    fn test_literals_only() {
        let tokens = tokenize_all(b"abcdefgh", 6);
        assert_eq!(tokens.len(), 8);
        assert!(tokens.iter().all(|t| matches!(t, Token::Literal(_))));
    }

    #[test]
    fn test_simple_match() {
        let tokens = tokenize_all(b"abcabcabc", 6);
        assert!(
            tokens.iter().any(|t| matches!(t, Token::Match { .. })),
            "expected at least one match in {tokens:?}"
        );
        assert_eq!(reconstruct(&tokens), b"abcabcabc");
    }

    #[test]
    fn test_max_match_length() {
        let input = vec![b'a'; 600];
        let tokens = tokenize_all(&input, 6);
        assert!(
            tokens
                .iter()
                .any(|t| matches!(t, Token::Match { length: 258, distance: 1 })),
            "expected a maximum-length run match in {tokens:?}"
        );
        assert_eq!(reconstruct(&tokens), input);
    }

    #[test]
    fn test_level_0_emits_no_matches() {
        let tokens = tokenize_all(b"test data test data", 0);
        assert!(tokens.iter().all(|t| matches!(t, Token::Literal(_))));
    }

    #[test]
    fn test_roundtrip_mixed_data() {
        let mut input = Vec::new();
        for i in 0..4000u32 {
            input.push((i * 31 % 7) as u8 + b'a');
        }
        input.extend_from_slice(&input.clone()[..1000]);

        for level in [1, 4, 6, 9] {
            let tokens = tokenize_all(&input, level);
            assert_eq!(reconstruct(&tokens), input, "level {level}");
        }
    }

    #[test]
    fn test_small_window_bounds_distances() {
        // With a 256-byte window every distance stays within it, even
        // after many slides.
        let mut input = Vec::new();
        for i in 0..30_000u32 {
            input.push((i % 11) as u8 + b'0');
        }

        let mut lz = Lz77::new(8, 6).unwrap();
        let mut sink = Vec::new();
        let mut raw = Vec::new();
        let consumed = lz.push(&input, &mut sink, usize::MAX, &mut raw);
        assert_eq!(consumed, input.len());
        assert!(lz.flush_tail(&mut sink, usize::MAX, &mut raw));

        for token in &sink {
            if let Token::Match { distance, .. } = token {
                assert!(*distance as usize <= 256, "distance {distance} too far");
            }
        }
        assert_eq!(reconstruct(&sink), input);
    }

    #[test]
    fn test_chunked_tokens_match_single_shot() {
        let mut input = Vec::new();
        for i in 0..50_000u32 {
            input.push(((i / 3) % 251) as u8 ^ (i % 17) as u8);
        }

        let single = tokenize_all(&input, 6);

        for chunk in [1usize, 7, 1024, 4093] {
            let mut lz = Lz77::new(15, 6).unwrap();
            let mut sink = Vec::new();
            let mut raw = Vec::new();
            for piece in input.chunks(chunk) {
                let consumed = lz.push(piece, &mut sink, usize::MAX, &mut raw);
                assert_eq!(consumed, piece.len());
            }
            assert!(lz.flush_tail(&mut sink, usize::MAX, &mut raw));
            assert_eq!(sink, single, "chunk size {chunk}");
        }
    }

    #[test]
    fn test_sink_cap_pauses_and_resumes() {
        let input = vec![b'x'; 10_000];
        let mut lz = Lz77::new(15, 6).unwrap();
        let mut sink = Vec::new();
        let mut raw = Vec::new();

        let mut consumed = 0;
        let mut all = Vec::new();
        while consumed < input.len() {
            consumed += lz.push(&input[consumed..], &mut sink, 4, &mut raw);
            all.append(&mut sink);
        }
        while !lz.flush_tail(&mut sink, 4, &mut raw) {
            all.append(&mut sink);
        }
        all.append(&mut sink);

        assert_eq!(reconstruct(&all), input);
    }

    #[test]
    fn test_matches_across_chunk_boundary() {
        // The repeat of "abcdef" starts in the second chunk; deferred
        // tokenization must still find it.
        let mut lz = Lz77::new(15, 6).unwrap();
        let mut sink = Vec::new();
        let mut raw = Vec::new();

        lz.push(b"abcdefabc", &mut sink, usize::MAX, &mut raw);
        lz.push(b"defabcdef", &mut sink, usize::MAX, &mut raw);
        assert!(lz.flush_tail(&mut sink, usize::MAX, &mut raw));

        assert!(sink.iter().any(|t| matches!(t, Token::Match { .. })));
        assert_eq!(reconstruct(&sink), b"abcdefabcdefabcdef");
    }

    #[test]
    fn test_hash_is_deterministic() {
        assert_eq!(Lz77::hash(b'a', b'b', b'c'), Lz77::hash(b'a', b'b', b'c'));
    }
}
