//! gzip framing (RFC 1952) over the raw DEFLATE codec.
//!
//! # Format
//!
//! ```text
//! +---+---+---+---+---+---+---+---+---+---+=========+---+---+---+---+---+---+---+---+
//! |x1F|x8B| CM|FLG|     MTIME     |XFL| OS| deflate |     CRC32     |     ISIZE     |
//! +---+---+---+---+---+---+---+---+---+---+=========+---+---+---+---+---+---+---+---+
//! ```
//!
//! Optional fields follow the fixed header in this order when their FLG
//! bit is set: EXTRA (2-byte LE length plus payload), NAME
//! (NUL-terminated), COMMENT (NUL-terminated), HCRC16 (low 16 bits of
//! the CRC-32 of all preceding header bytes). The trailer carries the
//! CRC-32 of the uncompressed data and its length mod 2^32, both
//! little-endian.

use crate::deflate::{Deflater, DEFAULT_WBITS};
use crate::inflate::Inflater;
use oxiflate_core::checksum::{Checksum, Crc32};
use oxiflate_core::error::{OxiflateError, Result};
use oxiflate_core::traits::{
    CompressStatus, Compressor, DecompressStatus, Decompressor, FlushMode,
};

/// gzip magic bytes.
pub const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// gzip compression method: DEFLATE.
pub const CM_DEFLATE: u8 = 8;

/// gzip header flags.
pub mod flags {
    /// Text file hint.
    pub const FTEXT: u8 = 0x01;
    /// Header CRC present.
    pub const FHCRC: u8 = 0x02;
    /// Extra field present.
    pub const FEXTRA: u8 = 0x04;
    /// Original filename present.
    pub const FNAME: u8 = 0x08;
    /// Comment present.
    pub const FCOMMENT: u8 = 0x10;
}

/// The operating system recorded in a gzip header (RFC 1952 §2.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Os {
    /// FAT filesystem (MS-DOS, OS/2, NT/Win32).
    Fat = 0,
    /// Amiga.
    Amiga = 1,
    /// VMS / OpenVMS.
    Vms = 2,
    /// Unix.
    Unix = 3,
    /// VM/CMS.
    VmCms = 4,
    /// Atari TOS.
    AtariTos = 5,
    /// HPFS filesystem (OS/2, NT).
    Hpfs = 6,
    /// Macintosh.
    Macintosh = 7,
    /// Z-System.
    ZSystem = 8,
    /// CP/M.
    CpM = 9,
    /// TOPS-20.
    Tops20 = 10,
    /// NTFS filesystem (NT).
    Ntfs = 11,
    /// QDOS.
    Qdos = 12,
    /// Acorn RISCOS.
    AcornRiscos = 13,
    /// Unknown.
    Unknown = 255,
}

impl Os {
    /// The `Os` for a header byte; `None` for values outside 0..=13
    /// other than 255.
    pub fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0 => Self::Fat,
            1 => Self::Amiga,
            2 => Self::Vms,
            3 => Self::Unix,
            4 => Self::VmCms,
            5 => Self::AtariTos,
            6 => Self::Hpfs,
            7 => Self::Macintosh,
            8 => Self::ZSystem,
            9 => Self::CpM,
            10 => Self::Tops20,
            11 => Self::Ntfs,
            12 => Self::Qdos,
            13 => Self::AcornRiscos,
            255 => Self::Unknown,
            _ => return None,
        })
    }

    /// The header byte for this `Os`.
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Encoder-side gzip header configuration.
#[derive(Debug, Clone)]
pub struct GzipHeader {
    /// FTEXT hint.
    pub text: bool,
    /// Emit the HCRC16 field.
    pub header_crc: bool,
    /// Modification time (Unix seconds); zero means unknown.
    pub mtime: u32,
    /// Operating system.
    pub os: Os,
    /// EXTRA field payload.
    pub extra: Option<Vec<u8>>,
    /// Original filename.
    pub name: Option<String>,
    /// Comment.
    pub comment: Option<String>,
}

impl Default for GzipHeader {
    fn default() -> Self {
        Self {
            text: false,
            header_crc: false,
            mtime: 0,
            os: Os::Unknown,
            extra: None,
            name: None,
            comment: None,
        }
    }
}

impl GzipHeader {
    /// A header with no optional fields, mtime zero, OS unknown.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the FTEXT hint.
    pub fn with_text(mut self, text: bool) -> Self {
        self.text = text;
        self
    }

    /// Emit the header CRC16 field.
    pub fn with_header_crc(mut self, header_crc: bool) -> Self {
        self.header_crc = header_crc;
        self
    }

    /// Set the modification time.
    pub fn with_mtime(mut self, mtime: u32) -> Self {
        self.mtime = mtime;
        self
    }

    /// Set the operating system.
    pub fn with_os(mut self, os: Os) -> Self {
        self.os = os;
        self
    }

    /// Set the EXTRA payload.
    pub fn with_extra(mut self, extra: impl Into<Vec<u8>>) -> Self {
        self.extra = Some(extra.into());
        self
    }

    /// Set the original filename.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Serialize the header, including the optional fields and, when
    /// requested, the HCRC16 of everything before it.
    fn encode(&self, level: u8) -> Vec<u8> {
        let mut flg = 0u8;
        if self.text {
            flg |= flags::FTEXT;
        }
        if self.header_crc {
            flg |= flags::FHCRC;
        }
        if self.extra.is_some() {
            flg |= flags::FEXTRA;
        }
        if self.name.is_some() {
            flg |= flags::FNAME;
        }
        if self.comment.is_some() {
            flg |= flags::FCOMMENT;
        }

        let xfl = match level {
            0 | 1 => 4,
            9 => 2,
            _ => 0,
        };

        let mut out = Vec::with_capacity(10);
        out.extend_from_slice(&GZIP_MAGIC);
        out.push(CM_DEFLATE);
        out.push(flg);
        out.extend_from_slice(&self.mtime.to_le_bytes());
        out.push(xfl);
        out.push(self.os.as_u8());

        if let Some(extra) = &self.extra {
            out.extend_from_slice(&(extra.len() as u16).to_le_bytes());
            out.extend_from_slice(extra);
        }
        if let Some(name) = &self.name {
            out.extend_from_slice(name.as_bytes());
            out.push(0);
        }
        if let Some(comment) = &self.comment {
            out.extend_from_slice(comment.as_bytes());
            out.push(0);
        }
        if self.header_crc {
            let crc = Crc32::compute(&out);
            out.extend_from_slice(&((crc & 0xFFFF) as u16).to_le_bytes());
        }

        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CStage {
    Header,
    Body,
    Trailer,
    Done,
}

/// Streaming gzip compressor.
#[derive(Debug)]
pub struct GzipCompressor {
    inner: Deflater,
    header: GzipHeader,
    crc: Crc32,
    stage: CStage,
    extra: Vec<u8>,
    extra_pos: usize,
}

impl GzipCompressor {
    /// Create a gzip compressor at `level` with a default header.
    pub fn new(level: u8) -> Result<Self> {
        Self::with_header(GzipHeader::new(), level)
    }

    /// Create a gzip compressor with an explicit header configuration.
    pub fn with_header(header: GzipHeader, level: u8) -> Result<Self> {
        Ok(Self {
            inner: Deflater::new(DEFAULT_WBITS, level)?,
            header,
            crc: Crc32::new(),
            stage: CStage::Header,
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
}

impl Compressor for GzipCompressor {
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
                CStage::Header => {
                    self.extra = self.header.encode(self.inner.level());
                    self.stage = CStage::Body;
                }
                CStage::Body => {
                    let (c, p, status) =
                        self.inner
                            .compress(&input[consumed..], &mut output[produced..], flush)?;
                    self.crc.update(&input[consumed..consumed + c]);
                    consumed += c;
                    produced += p;
                    match status {
                        CompressStatus::Done => self.stage = CStage::Trailer,
                        CompressStatus::NeedsOutput => {
                            return Ok((consumed, produced, CompressStatus::NeedsOutput));
                        }
                        CompressStatus::NeedsInput => {
                            return Ok((consumed, produced, CompressStatus::NeedsInput));
                        }
                    }
                }
                CStage::Trailer => {
                    let crc = self.crc.finish();
                    self.extra.extend_from_slice(&crc.to_le_bytes());
                    let isize_ = self.inner.total_in() as u32;
                    self.extra.extend_from_slice(&isize_.to_le_bytes());
                    self.stage = CStage::Done;
                }
                CStage::Done => {
                    return Ok((consumed, produced, CompressStatus::Done));
                }
            }
        }
    }

    fn reset(&mut self) {
        self.inner.reset();
        self.crc.reset();
        self.stage = CStage::Header;
        self.extra.clear();
        self.extra_pos = 0;
    }

    fn is_finished(&self) -> bool {
        self.stage == CStage::Done && self.extra_pos == self.extra.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DStage {
    Fixed,
    ExtraLen,
    ExtraData,
    Name,
    Comment,
    HeaderCrc,
    Body,
    Trailer,
    Done,
}

/// Streaming gzip decompressor.
///
/// Parsed header fields are available through the accessors once the
/// header has been consumed.
#[derive(Debug)]
pub struct GzipDecompressor {
    inner: Inflater,
    stage: DStage,
    buf: Vec<u8>,
    flg: u8,
    mtime: u32,
    xfl: u8,
    os_byte: u8,
    extra_len: usize,
    extra: Option<Vec<u8>>,
    name: Option<String>,
    comment: Option<String>,
    header_crc: Crc32,
}

impl GzipDecompressor {
    /// Create a gzip decompressor with the default 32 KiB window.
    pub fn new() -> Self {
        Self::with_wbits(DEFAULT_WBITS).expect("default window bits are always valid")
    }

    /// Create a gzip decompressor with a `1 << wbits` window (8..=15).
    pub fn with_wbits(wbits: u8) -> Result<Self> {
        Ok(Self {
            inner: Inflater::with_checksum(wbits, Checksum::crc32())?,
            stage: DStage::Fixed,
            buf: Vec::new(),
            flg: 0,
            mtime: 0,
            xfl: 0,
            os_byte: 255,
            extra_len: 0,
            extra: None,
            name: None,
            comment: None,
            header_crc: Crc32::new(),
        })
    }

    /// The modification time from the header.
    pub fn mtime(&self) -> u32 {
        self.mtime
    }

    /// The XFL byte from the header.
    pub fn xfl(&self) -> u8 {
        self.xfl
    }

    /// The operating system from the header; `None` for a value the
    /// RFC does not define.
    pub fn os(&self) -> Option<Os> {
        Os::from_u8(self.os_byte)
    }

    /// The raw OS byte from the header.
    pub fn os_byte(&self) -> u8 {
        self.os_byte
    }

    /// Whether the FTEXT hint was set.
    pub fn is_text(&self) -> bool {
        self.flg & flags::FTEXT != 0
    }

    /// The EXTRA payload, when present.
    pub fn extra(&self) -> Option<&[u8]> {
        self.extra.as_deref()
    }

    /// The original filename, when present.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The comment, when present.
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Total bytes written over the session (the decoded length).
    pub fn total_out(&self) -> u64 {
        self.inner.total_out()
    }

    /// The header stage that follows `current` given the FLG bits.
    fn stage_after(&self, current: DStage) -> DStage {
        match current {
            DStage::Fixed if self.flg & flags::FEXTRA != 0 => DStage::ExtraLen,
            DStage::Fixed | DStage::ExtraData if self.flg & flags::FNAME != 0 => DStage::Name,
            DStage::Fixed | DStage::ExtraData | DStage::Name
                if self.flg & flags::FCOMMENT != 0 =>
            {
                DStage::Comment
            }
            DStage::Fixed | DStage::ExtraData | DStage::Name | DStage::Comment
                if self.flg & flags::FHCRC != 0 =>
            {
                DStage::HeaderCrc
            }
            _ => DStage::Body,
        }
    }
}

impl Default for GzipDecompressor {
    fn default() -> Self {
        Self::new()
    }
}

impl Decompressor for GzipDecompressor {
    fn decompress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<(usize, usize, DecompressStatus)> {
        let mut consumed = 0usize;
        let mut produced = 0usize;

        // Collect header/trailer bytes into self.buf one at a time so
        // any byte boundary is a clean suspension point.
        macro_rules! collect {
            ($target:expr) => {
                while self.buf.len() < $target {
                    if consumed == input.len() {
                        return Ok((consumed, produced, DecompressStatus::NeedsInput));
                    }
                    self.buf.push(input[consumed]);
                    consumed += 1;
                }
            };
        }

        macro_rules! collect_until_nul {
            () => {{
                loop {
                    if self.buf.last() == Some(&0) {
                        break;
                    }
                    if consumed == input.len() {
                        return Ok((consumed, produced, DecompressStatus::NeedsInput));
                    }
                    self.buf.push(input[consumed]);
                    consumed += 1;
                }
            }};
        }

        loop {
            match self.stage {
                DStage::Fixed => {
                    collect!(10);
                    if self.buf[0..2] != GZIP_MAGIC {
                        return Err(OxiflateError::invalid_header("bad gzip magic"));
                    }
                    if self.buf[2] != CM_DEFLATE {
                        return Err(OxiflateError::invalid_header(
                            "unsupported compression method",
                        ));
                    }
                    self.flg = self.buf[3];
                    self.mtime =
                        u32::from_le_bytes([self.buf[4], self.buf[5], self.buf[6], self.buf[7]]);
                    self.xfl = self.buf[8];
                    self.os_byte = self.buf[9];
                    self.header_crc.update(&self.buf);
                    self.buf.clear();
                    self.stage = self.stage_after(DStage::Fixed);
                }

                DStage::ExtraLen => {
                    collect!(2);
                    self.extra_len = u16::from_le_bytes([self.buf[0], self.buf[1]]) as usize;
                    self.header_crc.update(&self.buf);
                    self.buf.clear();
                    self.stage = DStage::ExtraData;
                }

                DStage::ExtraData => {
                    collect!(self.extra_len);
                    self.header_crc.update(&self.buf);
                    self.extra = Some(std::mem::take(&mut self.buf));
                    self.stage = self.stage_after(DStage::ExtraData);
                }

                DStage::Name => {
                    collect_until_nul!();
                    self.header_crc.update(&self.buf);
                    let bytes = &self.buf[..self.buf.len() - 1];
                    self.name = Some(String::from_utf8_lossy(bytes).into_owned());
                    self.buf.clear();
                    self.stage = self.stage_after(DStage::Name);
                }

                DStage::Comment => {
                    collect_until_nul!();
                    self.header_crc.update(&self.buf);
                    let bytes = &self.buf[..self.buf.len() - 1];
                    self.comment = Some(String::from_utf8_lossy(bytes).into_owned());
                    self.buf.clear();
                    self.stage = self.stage_after(DStage::Comment);
                }

                DStage::HeaderCrc => {
                    collect!(2);
                    let have = u16::from_le_bytes([self.buf[0], self.buf[1]]);
                    let expect = (self.header_crc.finish() & 0xFFFF) as u16;
                    if have != expect {
                        return Err(OxiflateError::invalid_header_checksum(have, expect));
                    }
                    self.buf.clear();
                    self.stage = DStage::Body;
                }

                DStage::Body => {
                    let (c, p, status) = self
                        .inner
                        .decompress(&input[consumed..], &mut output[produced..])?;
                    consumed += c;
                    produced += p;
                    match status {
                        DecompressStatus::Done => self.stage = DStage::Trailer,
                        DecompressStatus::NeedsInput => {
                            return Ok((consumed, produced, DecompressStatus::NeedsInput));
                        }
                        DecompressStatus::NeedsOutput => {
                            return Ok((consumed, produced, DecompressStatus::NeedsOutput));
                        }
                    }
                }

                DStage::Trailer => {
                    collect!(8);
                    let have_crc = u32::from_le_bytes([
                        self.buf[0],
                        self.buf[1],
                        self.buf[2],
                        self.buf[3],
                    ]);
                    let expect_crc = self.inner.checksum();
                    if have_crc != expect_crc {
                        return Err(OxiflateError::invalid_checksum(have_crc, expect_crc));
                    }
                    let have_size = u32::from_le_bytes([
                        self.buf[4],
                        self.buf[5],
                        self.buf[6],
                        self.buf[7],
                    ]);
                    let expect_size = self.inner.total_out() as u32;
                    if have_size != expect_size {
                        return Err(OxiflateError::invalid_size(have_size, expect_size));
                    }
                    self.buf.clear();
                    self.stage = DStage::Done;
                }

                DStage::Done => {
                    return Ok((consumed, produced, DecompressStatus::Done));
                }
            }
        }
    }

    fn reset(&mut self) {
        self.inner.reset_with(Checksum::crc32());
        self.stage = DStage::Fixed;
        self.buf.clear();
        self.flg = 0;
        self.mtime = 0;
        self.xfl = 0;
        self.os_byte = 255;
        self.extra_len = 0;
        self.extra = None;
        self.name = None;
        self.comment = None;
        self.header_crc.reset();
    }

    fn is_finished(&self) -> bool {
        self.stage == DStage::Done
    }
}

/// Compress `data` into a gzip stream with a default header.
pub fn gzip_compress(input: &[u8], level: u8) -> Result<Vec<u8>> {
    GzipCompressor::new(level)?.compress_all(input)
}

/// Compress `data` into a gzip stream recording `name` as the original
/// filename.
pub fn gzip_compress_with_name(input: &[u8], name: &str, level: u8) -> Result<Vec<u8>> {
    GzipCompressor::with_header(GzipHeader::new().with_name(name), level)?.compress_all(input)
}

/// Decompress a gzip stream.
pub fn gzip_decompress(input: &[u8]) -> Result<Vec<u8>> {
    GzipDecompressor::new().decompress_all(input)
}
