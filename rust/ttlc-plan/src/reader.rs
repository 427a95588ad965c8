// rust/ttlc-plan/src/reader.rs
// Memory-mapped plan accessor: validate once at open, then every
// accessor is pointer arithmetic into the mapping

use std::path::Path;

use memmap2::Mmap;
use xxhash_rust::xxh3::xxh3_64;

use crate::layout::*;

/// One node-table entry resolved against the string pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeView<'v> {
    pub kind: u8,
    /// Dense index of the refinement node (datatype / language)
    pub aux: Option<u32>,
    pub bytes: &'v [u8],
}

/// One triple record on dense node indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanTriple {
    pub s: u32,
    pub p: u32,
    pub o: u32,
    pub kind: u8,
    pub flags: u8,
}

/// Read-only view over a mapped plan image.
pub struct PlanView {
    map: Mmap,
    node_count: u32,
    triple_count: u32,
    prefix_count: u32,
    node_off: usize,
    triple_off: usize,
    prefix_off: usize,
    pool_off: usize,
    pool_len: usize,
}

impl PlanView {
    /// Map `path` read-only and validate magic, version, endianness,
    /// section bounds, content hash, and pool UTF-8.
    pub fn open(path: &Path) -> Result<PlanView, PlanError> {
        let file = std::fs::File::open(path)?;
        // SAFETY: the mapping is read-only and the file is not
        // modified through this process while mapped.
        let map = unsafe { Mmap::map(&file)? };
        let buf: &[u8] = &map;

        if buf.len() < HEADER_LEN {
            return Err(PlanError::Truncated);
        }
        if buf[OFF_MAGIC..OFF_MAGIC + 8] != MAGIC {
            return Err(PlanError::BadMagic);
        }
        let major = read_u16(buf, OFF_VERSION_MAJOR);
        let minor = read_u16(buf, OFF_VERSION_MINOR);
        if major != VERSION_MAJOR {
            return Err(PlanError::UnsupportedVersion { major, minor });
        }
        if read_u16(buf, OFF_ENDIAN) != ENDIAN_MARKER {
            return Err(PlanError::BadEndianness);
        }

        let node_count = read_u32(buf, OFF_NODE_COUNT);
        let triple_count = read_u32(buf, OFF_TRIPLE_COUNT);
        let prefix_count = read_u32(buf, OFF_PREFIX_COUNT);
        let node_off = read_u64(buf, OFF_NODE_OFF) as usize;
        let node_len = read_u64(buf, OFF_NODE_LEN) as usize;
        let triple_off = read_u64(buf, OFF_TRIPLE_OFF) as usize;
        let triple_len = read_u64(buf, OFF_TRIPLE_LEN) as usize;
        let prefix_off = read_u64(buf, OFF_PREFIX_OFF) as usize;
        let prefix_len = read_u64(buf, OFF_PREFIX_LEN) as usize;
        let pool_off = read_u64(buf, OFF_POOL_OFF) as usize;
        let pool_len = read_u64(buf, OFF_POOL_LEN) as usize;

        let fits = |off: usize, len: usize| off <= buf.len() && len <= buf.len() - off;
        if !fits(node_off, node_len)
            || !fits(triple_off, triple_len)
            || !fits(prefix_off, prefix_len)
            || !fits(pool_off, pool_len)
            || node_len < node_count as usize * NODE_REC_LEN
            || triple_len < triple_count as usize * TRIPLE_REC_LEN
            || prefix_len < prefix_count as usize * PREFIX_REC_LEN
        {
            return Err(PlanError::Truncated);
        }

        if read_u16(buf, OFF_FLAGS) & FLAG_CHECKSUM != 0 {
            let stored = read_u64(buf, OFF_CONTENT_HASH);
            if xxh3_64(&buf[HEADER_LEN..]) != stored {
                return Err(PlanError::HashMismatch);
            }
        }
        if std::str::from_utf8(&buf[pool_off..pool_off + pool_len]).is_err() {
            return Err(PlanError::BadUtf8);
        }

        // Validate every pool span and node reference once, so the
        // accessors below can index without checks.
        for i in 0..node_count as usize {
            let rec = node_off + i * NODE_REC_LEN;
            let off = read_u32(buf, rec) as usize;
            let len = read_u32(buf, rec + 4) as usize;
            let aux = read_u32(buf, rec + 12);
            if off + len > pool_len || (aux != 0 && aux - 1 >= node_count) {
                return Err(PlanError::Truncated);
            }
        }
        for i in 0..triple_count as usize {
            let rec = triple_off + i * TRIPLE_REC_LEN;
            if read_u32(buf, rec) >= node_count
                || read_u32(buf, rec + 4) >= node_count
                || read_u32(buf, rec + 8) >= node_count
            {
                return Err(PlanError::Truncated);
            }
        }
        for i in 0..prefix_count as usize {
            let rec = prefix_off + i * PREFIX_REC_LEN;
            let label_off = read_u32(buf, rec) as usize;
            let label_len = read_u32(buf, rec + 4) as usize;
            let iri_off = read_u32(buf, rec + 8) as usize;
            let iri_len = read_u32(buf, rec + 12) as usize;
            if label_off + label_len > pool_len || iri_off + iri_len > pool_len {
                return Err(PlanError::Truncated);
            }
        }

        Ok(PlanView {
            map,
            node_count,
            triple_count,
            prefix_count,
            node_off,
            triple_off,
            prefix_off,
            pool_off,
            pool_len,
        })
    }

    pub fn node_count(&self) -> u32 {
        self.node_count
    }

    pub fn triple_count(&self) -> u32 {
        self.triple_count
    }

    pub fn prefix_count(&self) -> u32 {
        self.prefix_count
    }

    /// Node-table entry `index`.
    pub fn node(&self, index: u32) -> NodeView<'_> {
        debug_assert!(index < self.node_count);
        let buf: &[u8] = &self.map;
        let rec = self.node_off + index as usize * NODE_REC_LEN;
        let off = read_u32(buf, rec) as usize;
        let len = read_u32(buf, rec + 4) as usize;
        let kind = buf[rec + 8];
        let aux = read_u32(buf, rec + 12);
        NodeView {
            kind,
            aux: aux.checked_sub(1),
            bytes: &buf[self.pool_off + off..self.pool_off + off + len],
        }
    }

    /// Lexeme of node `index`.
    pub fn node_string(&self, index: u32) -> &str {
        // SAFETY: the pool was UTF-8 validated at open, and node spans
        // never split the pool inside a lexeme.
        unsafe { std::str::from_utf8_unchecked(self.node(index).bytes) }
    }

    /// Triple record `index`.
    pub fn triple(&self, index: u32) -> PlanTriple {
        debug_assert!(index < self.triple_count);
        let buf: &[u8] = &self.map;
        let rec = self.triple_off + index as usize * TRIPLE_REC_LEN;
        PlanTriple {
            s: read_u32(buf, rec),
            p: read_u32(buf, rec + 4),
            o: read_u32(buf, rec + 8),
            kind: buf[rec + 12],
            flags: buf[rec + 13],
        }
    }

    pub fn triples(&self) -> impl Iterator<Item = PlanTriple> + '_ {
        (0..self.triple_count).map(|i| self.triple(i))
    }

    /// Namespace IRI bound to `label`, by linear scan of the prefix
    /// table.
    pub fn prefix(&self, label: &str) -> Option<&str> {
        self.prefixes().find(|(l, _)| *l == label).map(|(_, i)| i)
    }

    /// All prefix bindings in declaration order.
    pub fn prefixes(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        let buf: &[u8] = &self.map;
        (0..self.prefix_count).map(move |i| {
            let rec = self.prefix_off + i as usize * PREFIX_REC_LEN;
            let label_off = read_u32(buf, rec) as usize;
            let label_len = read_u32(buf, rec + 4) as usize;
            let iri_off = read_u32(buf, rec + 8) as usize;
            let iri_len = read_u32(buf, rec + 12) as usize;
            // SAFETY: pool UTF-8 validated at open; spans are whole
            // lexemes.
            let span = |off: usize, len: usize| unsafe {
                std::str::from_utf8_unchecked(&buf[self.pool_off + off..self.pool_off + off + len])
            };
            (span(label_off, label_len), span(iri_off, iri_len))
        })
    }

    /// Raw image bytes (diagnostics, re-hashing).
    pub fn bytes(&self) -> &[u8] {
        &self.map
    }

    pub fn pool_len(&self) -> usize {
        self.pool_len
    }
}
