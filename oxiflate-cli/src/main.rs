//! Oxiflate CLI - streaming DEFLATE pipe driver.
//!
//! Pipes standard input to standard output through the streaming codec,
//! exercising the suspend/resume loop with bounded buffers:
//!
//! ```text
//! oxiflate --mode deflate --algo zlib --level 9 < input > output.z
//! oxiflate --mode inflate --algo zlib < output.z > roundtrip
//! oxiflate --mode deflate --algo gzip -i 512 -o 512 < input > output.gz
//! ```

use clap::{Parser, ValueEnum};
use oxiflate::gzip::{GzipCompressor, GzipDecompressor};
use oxiflate::zlib::{ZlibCompressor, ZlibDecompressor};
use oxiflate_core::traits::{
    CompressStatus, Compressor, DecompressStatus, Decompressor, FlushMode,
};
use std::io::{Read, Write};
use std::process::ExitCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Compress stdin to stdout.
    Deflate,
    /// Decompress stdin to stdout.
    Inflate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Algo {
    /// zlib framing (RFC 1950).
    Zlib,
    /// gzip framing (RFC 1952).
    Gzip,
}

#[derive(Parser)]
#[command(name = "oxiflate")]
#[command(version, about = "Streaming DEFLATE codec - pipes stdin to stdout")]
struct Cli {
    /// Direction of the pipe.
    #[arg(long, value_enum)]
    mode: Mode,

    /// Stream framing.
    #[arg(long, value_enum, default_value_t = Algo::Zlib)]
    algo: Algo,

    /// Window bits (8..=15, zlib only).
    #[arg(long, default_value_t = 15)]
    wbits: u8,

    /// Compression level (0..=9).
    #[arg(long, default_value_t = 4)]
    level: u8,

    /// Input chunk size in bytes (at least 2).
    #[arg(short = 'i', default_value_t = 65536)]
    input_chunk: usize,

    /// Output chunk size in bytes (at least 2).
    #[arg(short = 'o', default_value_t = 65536)]
    output_chunk: usize,
}

fn run_compress(
    session: &mut dyn Compressor,
    input_chunk: usize,
    output_chunk: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut reader = stdin.lock();
    let mut writer = stdout.lock();

    let mut in_buf = vec![0u8; input_chunk];
    let mut out_buf = vec![0u8; output_chunk];
    let mut filled = 0usize;
    let mut pos = 0usize;
    let mut eof = false;

    loop {
        if pos == filled && !eof {
            filled = reader.read(&mut in_buf)?;
            pos = 0;
            eof = filled == 0;
        }
        let flush = if eof { FlushMode::Finish } else { FlushMode::None };
        let (consumed, produced, status) =
            session.compress(&in_buf[pos..filled], &mut out_buf, flush)?;
        pos += consumed;
        writer.write_all(&out_buf[..produced])?;
        if status == CompressStatus::Done {
            break;
        }
    }

    writer.flush()?;
    Ok(())
}

fn run_decompress(
    session: &mut dyn Decompressor,
    input_chunk: usize,
    output_chunk: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut reader = stdin.lock();
    let mut writer = stdout.lock();

    let mut in_buf = vec![0u8; input_chunk];
    let mut out_buf = vec![0u8; output_chunk];
    let mut filled = 0usize;
    let mut pos = 0usize;

    loop {
        if pos == filled {
            filled = reader.read(&mut in_buf)?;
            pos = 0;
            if filled == 0 {
                return Err("truncated stream".into());
            }
        }
        let (consumed, produced, status) =
            session.decompress(&in_buf[pos..filled], &mut out_buf)?;
        pos += consumed;
        writer.write_all(&out_buf[..produced])?;
        if status == DecompressStatus::Done {
            break;
        }
    }

    writer.flush()?;
    Ok(())
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.input_chunk < 2 || cli.output_chunk < 2 {
        return Err("chunk sizes must be at least 2 bytes".into());
    }

    match (cli.mode, cli.algo) {
        (Mode::Deflate, Algo::Zlib) => {
            let mut session = ZlibCompressor::with_wbits(cli.wbits, cli.level)?;
            run_compress(&mut session, cli.input_chunk, cli.output_chunk)
        }
        (Mode::Deflate, Algo::Gzip) => {
            let mut session = GzipCompressor::new(cli.level)?;
            run_compress(&mut session, cli.input_chunk, cli.output_chunk)
        }
        (Mode::Inflate, Algo::Zlib) => {
            let mut session = ZlibDecompressor::with_wbits(cli.wbits)?;
            run_decompress(&mut session, cli.input_chunk, cli.output_chunk)
        }
        (Mode::Inflate, Algo::Gzip) => {
            let mut session = GzipDecompressor::new();
            run_decompress(&mut session, cli.input_chunk, cli.output_chunk)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("oxiflate: {err}");
            ExitCode::FAILURE
        }
    }
}
