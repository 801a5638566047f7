//! Incremental checksums for the zlib and gzip framings.
//!
//! - **Adler-32** (RFC 1950): the zlib trailer digest.
//! - **CRC-32** (ISO 3309, reflected polynomial `0xEDB88320`): the gzip
//!   trailer and header digest.
//!
//! Both expose identity / update / digest. [`Checksum`] is the
//! capability handle a [`crate::window::Window`] holds: the framing
//! layer picks the algorithm, the raw codec uses [`Checksum::None`],
//! which is a no-op digesting to zero.

/// Largest prime smaller than 65536.
const ADLER_MOD: u32 = 65521;

/// Bytes processable before the Adler pair must be reduced.
const NMAX: usize = 5552;

/// Adler-32 checksum calculator.
#[derive(Debug, Clone)]
pub struct Adler32 {
    a: u32,
    b: u32,
}

impl Adler32 {
    /// Create a new Adler-32 calculator.
    pub fn new() -> Self {
        Self { a: 1, b: 0 }
    }

    /// Update the checksum with more data.
    pub fn update(&mut self, data: &[u8]) {
        let mut a = self.a;
        let mut b = self.b;

        let mut remaining = data;
        while remaining.len() >= NMAX {
            let (chunk, rest) = remaining.split_at(NMAX);
            remaining = rest;

            for &byte in chunk {
                a += u32::from(byte);
                b += a;
            }
            a %= ADLER_MOD;
            b %= ADLER_MOD;
        }

        for &byte in remaining {
            a += u32::from(byte);
            b += a;
        }

        self.a = a % ADLER_MOD;
        self.b = b % ADLER_MOD;
    }

    /// Finalize and return the checksum.
    pub fn finish(&self) -> u32 {
        (self.b << 16) | self.a
    }

    /// Compute the Adler-32 of `data` in one shot.
    pub fn checksum(data: &[u8]) -> u32 {
        let mut adler = Self::new();
        adler.update(data);
        adler.finish()
    }

    /// Reset to the identity value.
    pub fn reset(&mut self) {
        self.a = 1;
        self.b = 0;
    }
}

impl Default for Adler32 {
    fn default() -> Self {
        Self::new()
    }
}

/// CRC-32 lookup table (polynomial 0xEDB88320, reflected).
const CRC32_TABLE: [u32; 256] = {
    let mut table = [0u32; 256];
    let mut i = 0usize;
    while i < 256 {
        let mut crc = i as u32;
        let mut j = 0;
        while j < 8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ 0xEDB88320;
            } else {
                crc >>= 1;
            }
            j += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
};

/// CRC-32 calculator (ISO 3309).
///
/// Initial value `0xFFFFFFFF`, final XOR `0xFFFFFFFF`, reflected input
/// and output. This is the CRC used by gzip, ZIP, and PNG.
#[derive(Debug, Clone)]
pub struct Crc32 {
    state: u32,
}

impl Crc32 {
    /// Create a new CRC-32 calculator.
    pub fn new() -> Self {
        Self { state: 0xFFFFFFFF }
    }

    /// Update the checksum with more data.
    pub fn update(&mut self, data: &[u8]) {
        let mut crc = self.state;
        for &byte in data {
            let index = ((crc ^ u32::from(byte)) & 0xFF) as usize;
            crc = CRC32_TABLE[index] ^ (crc >> 8);
        }
        self.state = crc;
    }

    /// Finalize and return the checksum.
    pub fn finish(&self) -> u32 {
        self.state ^ 0xFFFFFFFF
    }

    /// Compute the CRC-32 of `data` in one shot.
    pub fn compute(data: &[u8]) -> u32 {
        let mut crc = Self::new();
        crc.update(data);
        crc.finish()
    }

    /// Reset to the identity value.
    pub fn reset(&mut self) {
        self.state = 0xFFFFFFFF;
    }
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

/// The checksum capability a sliding window carries.
///
/// The framing layer selects the algorithm when a session is created;
/// the window updates it with every byte written.
#[derive(Debug, Clone)]
pub enum Checksum {
    /// No checksum; digests to zero.
    None,
    /// Adler-32, for zlib streams.
    Adler32(Adler32),
    /// CRC-32, for gzip streams.
    Crc32(Crc32),
}

impl Checksum {
    /// A fresh Adler-32 handle.
    pub fn adler32() -> Self {
        Self::Adler32(Adler32::new())
    }

    /// A fresh CRC-32 handle.
    pub fn crc32() -> Self {
        Self::Crc32(Crc32::new())
    }

    /// Update with more data.
    pub fn update(&mut self, data: &[u8]) {
        match self {
            Self::None => {}
            Self::Adler32(adler) => adler.update(data),
            Self::Crc32(crc) => crc.update(data),
        }
    }

    /// The current digest. [`Checksum::None`] digests to zero.
    pub fn digest(&self) -> u32 {
        match self {
            Self::None => 0,
            Self::Adler32(adler) => adler.finish(),
            Self::Crc32(crc) => crc.finish(),
        }
    }

    /// Reset to the algorithm's identity value.
    pub fn reset(&mut self) {
        match self {
            Self::None => {}
            Self::Adler32(adler) => adler.reset(),
            Self::Crc32(crc) => crc.reset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adler32_empty() {
        assert_eq!(Adler32::checksum(&[]), 1);
    }

    #[test]
    fn test_adler32_hello() {
        // Known value for "Hello".
        assert_eq!(Adler32::checksum(b"Hello"), 0x058C01F5);
    }

    #[test]
    fn test_adler32_repeated() {
        // Known value for eight 'a' bytes.
        assert_eq!(Adler32::checksum(b"aaaaaaaa"), 0x0C220205);
    }

    #[test]
    fn test_adler32_incremental() {
        let data = b"Hello, World!";
        let one_shot = Adler32::checksum(data);

        let mut adler = Adler32::new();
        adler.update(&data[..6]);
        adler.update(&data[6..]);
        assert_eq!(adler.finish(), one_shot);
    }

    #[test]
    fn test_adler32_large() {
        // Exercise the NMAX reduction path.
        let data = vec![0x42u8; 3 * NMAX + 17];
        let mut byte_at_a_time = Adler32::new();
        for &b in &data {
            byte_at_a_time.update(&[b]);
        }
        assert_eq!(Adler32::checksum(&data), byte_at_a_time.finish());
    }

    #[test]
    fn test_crc32_known_values() {
        assert_eq!(Crc32::compute(&[]), 0);
        // The canonical CRC-32 check value.
        assert_eq!(Crc32::compute(b"123456789"), 0xCBF43926);
    }

    #[test]
    fn test_crc32_incremental() {
        let data = b"The quick brown fox jumps over the lazy dog";
        let mut crc = Crc32::new();
        crc.update(&data[..10]);
        crc.update(&data[10..]);
        assert_eq!(crc.finish(), Crc32::compute(data));
    }

    #[test]
    fn test_checksum_handle() {
        let mut none = Checksum::None;
        none.update(b"ignored");
        assert_eq!(none.digest(), 0);

        let mut adler = Checksum::adler32();
        adler.update(b"Hello");
        assert_eq!(adler.digest(), Adler32::checksum(b"Hello"));

        let mut crc = Checksum::crc32();
        crc.update(b"123456789");
        assert_eq!(crc.digest(), 0xCBF43926);

        crc.reset();
        assert_eq!(crc.digest(), Crc32::compute(&[]));
    }
}
