//! Streaming-contract tests: chunk invariance, flush semantics, and
//! suspension behavior.

use oxiflate::deflate::Deflater;
use oxiflate::inflate::Inflater;
use oxiflate::zlib::{zlib_compress, ZlibCompressor, ZlibDecompressor};
use oxiflate_core::traits::{
    CompressStatus, Compressor, DecompressStatus, Decompressor, FlushMode,
};

fn noise(len: usize, mut seed: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;
        out.push((seed >> 56) as u8);
    }
    out
}

/// Mildly compressible data: noise with embedded repeats.
fn mixed_data(len: usize) -> Vec<u8> {
    let mut data = noise(len / 2, 42);
    let repeat = data[..len / 4].to_vec();
    data.extend_from_slice(&repeat);
    data.extend_from_slice(&noise(len - data.len(), 7));
    data
}

/// Compress with the given input chunking and output buffer size.
fn compress_chunked(
    session: &mut dyn Compressor,
    input: &[u8],
    in_chunk: usize,
    out_chunk: usize,
) -> Vec<u8> {
    let mut compressed = Vec::new();
    let mut out = vec![0u8; out_chunk];

    let mut pos = 0;
    while pos < input.len() {
        let end = (pos + in_chunk).min(input.len());
        loop {
            let (consumed, produced, status) = session
                .compress(&input[pos..end], &mut out, FlushMode::None)
                .unwrap();
            pos += consumed;
            compressed.extend_from_slice(&out[..produced]);
            if status != CompressStatus::NeedsOutput {
                break;
            }
        }
    }
    loop {
        let (_, produced, status) = session.compress(b"", &mut out, FlushMode::Finish).unwrap();
        compressed.extend_from_slice(&out[..produced]);
        if status == CompressStatus::Done {
            break;
        }
    }

    compressed
}

fn decompress_chunked(
    session: &mut dyn Decompressor,
    input: &[u8],
    in_chunk: usize,
    out_chunk: usize,
) -> Vec<u8> {
    let mut result = Vec::new();
    let mut out = vec![0u8; out_chunk];
    let mut pos = 0;

    loop {
        let end = (pos + in_chunk).min(input.len());
        let (consumed, produced, status) =
            session.decompress(&input[pos..end], &mut out).unwrap();
        pos += consumed;
        result.extend_from_slice(&out[..produced]);
        if status == DecompressStatus::Done {
            break;
        }
    }

    result
}

#[test]
fn test_compress_chunk_invariance() {
    let input = mixed_data(120_000);

    let mut reference_session = ZlibCompressor::new(6).unwrap();
    let reference = reference_session.compress_all(&input).unwrap();

    for (in_chunk, out_chunk) in [(1, 2), (7, 3), (4096, 17), (65536, 65536), (3, 100_000)] {
        let mut session = ZlibCompressor::new(6).unwrap();
        let chunked = compress_chunked(&mut session, &input, in_chunk, out_chunk);
        assert_eq!(
            chunked, reference,
            "chunking ({in_chunk}, {out_chunk}) changed the byte stream"
        );
    }
}

#[test]
fn test_decompress_chunk_invariance() {
    let input = mixed_data(60_000);
    let compressed = zlib_compress(&input, 6).unwrap();

    for (in_chunk, out_chunk) in [(1, 2), (2, 2), (13, 64), (65536, 65536)] {
        let mut session = ZlibDecompressor::new();
        let result = decompress_chunked(&mut session, &compressed, in_chunk, out_chunk);
        assert_eq!(result, input, "chunking ({in_chunk}, {out_chunk})");
    }
}

#[test]
fn test_truncated_input_always_awaits() {
    // Compressible data so the stream carries a dynamic block.
    let input: Vec<u8> = b"abcdefgh".iter().cycle().take(4000).copied().collect();
    let compressed = zlib_compress(&input, 9).unwrap();

    for cut in 0..compressed.len() {
        let mut session = ZlibDecompressor::new();
        let mut result = Vec::new();
        let mut out = vec![0u8; 8192];
        let mut pos = 0;
        let mut status = DecompressStatus::NeedsInput;
        while pos < cut {
            let (consumed, produced, s) =
                session.decompress(&compressed[pos..cut], &mut out).unwrap();
            pos += consumed;
            result.extend_from_slice(&out[..produced]);
            status = s;
            if s != DecompressStatus::NeedsOutput {
                break;
            }
        }
        assert_eq!(
            status,
            DecompressStatus::NeedsInput,
            "prefix of {cut} bytes must suspend, not finish"
        );

        // Supplying the remainder completes the stream.
        loop {
            let (consumed, produced, s) =
                session.decompress(&compressed[pos..], &mut out).unwrap();
            pos += consumed;
            result.extend_from_slice(&out[..produced]);
            if s == DecompressStatus::Done {
                break;
            }
        }
        assert_eq!(result, input, "resume after prefix {cut}");
    }
}

/// Drive a raw sync/partial/full flush and decode the emitted prefix.
fn flush_prefix_roundtrip(flush: FlushMode) {
    let first = b"the first span of data, flushed mid-stream";
    let second = b" and the rest follows after the marker";

    let mut deflater = Deflater::with_level(6).unwrap();
    let mut out = vec![0u8; 4096];

    let (consumed, produced, status) = deflater.compress(first, &mut out, flush).unwrap();
    assert_eq!(consumed, first.len());
    assert_eq!(status, CompressStatus::NeedsInput);
    let prefix = out[..produced].to_vec();

    // The bytes emitted so far must decode to exactly the flushed span.
    let mut inflater = Inflater::new();
    let mut decoded = vec![0u8; 4096];
    let (_, decoded_len, status) = inflater.decompress(&prefix, &mut decoded).unwrap();
    assert_eq!(status, DecompressStatus::NeedsInput);
    assert_eq!(&decoded[..decoded_len], first.as_slice());

    // The stream stays valid across the flush point.
    let (consumed, produced2, status) = deflater
        .compress(second, &mut out, FlushMode::Finish)
        .unwrap();
    assert_eq!(consumed, second.len());
    assert_eq!(status, CompressStatus::Done);

    let mut full = prefix;
    full.extend_from_slice(&out[..produced2]);

    let mut inflater = Inflater::new();
    let result = inflater.decompress_all(&full).unwrap();
    let mut expected = first.to_vec();
    expected.extend_from_slice(second);
    assert_eq!(result, expected);
}

#[test]
fn test_sync_flush_prefix_decodes() {
    flush_prefix_roundtrip(FlushMode::Sync);
}

#[test]
fn test_partial_flush_prefix_decodes() {
    flush_prefix_roundtrip(FlushMode::Partial);
}

#[test]
fn test_full_flush_prefix_decodes() {
    flush_prefix_roundtrip(FlushMode::Full);
}

#[test]
fn test_sync_flush_emits_stored_marker() {
    let mut deflater = Deflater::with_level(6).unwrap();
    let mut out = vec![0u8; 512];
    let (_, produced, _) = deflater
        .compress(b"data before marker", &mut out, FlushMode::Sync)
        .unwrap();

    // The stream is byte-aligned and ends with the empty stored block.
    assert_eq!(deflater.pending_bits(), 0);
    assert_eq!(&out[produced - 4..produced], &[0x00, 0x00, 0xFF, 0xFF]);
}

#[test]
fn test_repeated_flush_without_input_is_idempotent() {
    let mut deflater = Deflater::with_level(6).unwrap();
    let mut out = vec![0u8; 512];

    let (_, first, _) = deflater
        .compress(b"some data", &mut out, FlushMode::Sync)
        .unwrap();
    assert!(first > 0);

    let (_, second, status) = deflater.compress(b"", &mut out, FlushMode::Sync).unwrap();
    assert_eq!(second, 0);
    assert_eq!(status, CompressStatus::NeedsInput);
}

#[test]
fn test_full_flush_resets_statistics() {
    let mut deflater = Deflater::with_level(9).unwrap();
    let mut out = vec![0u8; 4096];

    deflater
        .compress(&vec![b'q'; 2000], &mut out, FlushMode::Full)
        .unwrap();
    let (lit, dist) = deflater.frequencies();
    assert!(lit.iter().all(|&f| f == 0), "literal stats must reset");
    assert!(dist.iter().all(|&f| f == 0), "distance stats must reset");
}

#[test]
fn test_sync_flush_preserves_statistics() {
    let mut deflater = Deflater::with_level(9).unwrap();
    let mut out = vec![0u8; 4096];

    deflater
        .compress(&vec![b'q'; 2000], &mut out, FlushMode::Sync)
        .unwrap();
    let (lit, _) = deflater.frequencies();
    assert!(lit[b'q' as usize] > 0, "literal stats must survive a sync flush");
}

#[test]
fn test_interleaved_flushes_roundtrip() {
    let spans: &[&[u8]] = &[
        b"span one ",
        b"span two is a bit longer ",
        b"three ",
        b"and the final span to finish the stream",
    ];
    let flushes = [
        FlushMode::Sync,
        FlushMode::Partial,
        FlushMode::Full,
        FlushMode::Finish,
    ];

    let mut deflater = Deflater::with_level(6).unwrap();
    let mut compressed = Vec::new();
    let mut out = vec![0u8; 4096];
    for (span, &flush) in spans.iter().zip(&flushes) {
        let (consumed, produced, _) = deflater.compress(span, &mut out, flush).unwrap();
        assert_eq!(consumed, span.len());
        compressed.extend_from_slice(&out[..produced]);
    }

    let expected: Vec<u8> = spans.concat();
    let mut inflater = Inflater::new();
    assert_eq!(inflater.decompress_all(&compressed).unwrap(), expected);
}

#[test]
fn test_minimum_output_buffer() {
    // The contract requires progress with output buffers as small as
    // two bytes.
    let input = mixed_data(10_000);
    let compressed = zlib_compress(&input, 6).unwrap();

    let mut session = ZlibDecompressor::new();
    let result = decompress_chunked(&mut session, &compressed, compressed.len(), 2);
    assert_eq!(result, input);
}

#[test]
fn test_encoder_suspends_on_tiny_output() {
    let input = noise(50_000, 3);
    let mut session = ZlibCompressor::new(1).unwrap();
    let compressed = compress_chunked(&mut session, &input, 50_000, 2);

    let mut decompressor = ZlibDecompressor::new();
    assert_eq!(decompressor.decompress_all(&compressed).unwrap(), input);
}
