// rust/ttlc-plan/src/layout.rs
// On-disk layout constants and the shared error type
// All integers little-endian; all sections 8-byte aligned

/// 8-byte ASCII signature at offset 0
pub const MAGIC: [u8; 8] = *b"TTLCPLAN";
pub const VERSION_MAJOR: u16 = 1;
pub const VERSION_MINOR: u16 = 0;
/// Endianness marker as written by a little-endian producer
pub const ENDIAN_MARKER: u16 = 0x1234;
/// Header flag: payload carries an xxh3 content hash
pub const FLAG_CHECKSUM: u16 = 1 << 0;

// Header field offsets
pub const OFF_MAGIC: usize = 0;
pub const OFF_VERSION_MAJOR: usize = 8;
pub const OFF_VERSION_MINOR: usize = 10;
pub const OFF_ENDIAN: usize = 12;
pub const OFF_FLAGS: usize = 14;
pub const OFF_NODE_COUNT: usize = 16;
pub const OFF_TRIPLE_COUNT: usize = 20;
pub const OFF_PREFIX_COUNT: usize = 24;
pub const OFF_NODE_OFF: usize = 32;
pub const OFF_NODE_LEN: usize = 40;
pub const OFF_TRIPLE_OFF: usize = 48;
pub const OFF_TRIPLE_LEN: usize = 56;
pub const OFF_PREFIX_OFF: usize = 64;
pub const OFF_PREFIX_LEN: usize = 72;
pub const OFF_POOL_OFF: usize = 80;
pub const OFF_POOL_LEN: usize = 88;
pub const OFF_CONTENT_HASH: usize = 96;
pub const HEADER_LEN: usize = 104;

/// Fixed record sizes
pub const NODE_REC_LEN: usize = 16;
pub const TRIPLE_REC_LEN: usize = 16;
pub const PREFIX_REC_LEN: usize = 16;

const _: () = assert!(HEADER_LEN % 8 == 0);

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("partial write: {written} of {expected} bytes")]
    PartialWrite { written: usize, expected: usize },
    #[error("image truncated")]
    Truncated,
    #[error("bad magic number")]
    BadMagic,
    #[error("unsupported format version {major}.{minor}")]
    UnsupportedVersion { major: u16, minor: u16 },
    #[error("endianness marker mismatch")]
    BadEndianness,
    #[error("content hash mismatch")]
    HashMismatch,
    #[error("string pool is not valid UTF-8")]
    BadUtf8,
    #[error("too many nodes for a 32-bit plan index")]
    TooManyNodes,
}

#[inline]
pub fn read_u16(buf: &[u8], off: usize) -> u16 {
    u16::from_le_bytes([buf[off], buf[off + 1]])
}

#[inline]
pub fn read_u32(buf: &[u8], off: usize) -> u32 {
    u32::from_le_bytes([buf[off], buf[off + 1], buf[off + 2], buf[off + 3]])
}

#[inline]
pub fn read_u64(buf: &[u8], off: usize) -> u64 {
    let mut b = [0u8; 8];
    b.copy_from_slice(&buf[off..off + 8]);
    u64::from_le_bytes(b)
}
