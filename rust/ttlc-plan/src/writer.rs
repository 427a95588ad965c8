// rust/ttlc-plan/src/writer.rs
// Single-pass plan serializer: dense renumbering, sorted triples, one
// contiguous buffer, exactly one write syscall

use std::io::Write;
use std::path::Path;

use rustc_hash::FxHashMap;
use ttlc_rdf::{Graph, Interner, NodeId};
use xxhash_rust::xxh3::xxh3_64;

use crate::layout::*;

/// Serialize a frozen graph into a plan image.
///
/// Identifiers are renumbered into a dense range ordered by
/// `(kind, lexeme, aux-lexeme)`, and triples are sorted by `(s,p,o)`,
/// so the same graph produces the same bytes regardless of insertion
/// or interning order.
pub fn serialize(graph: &Graph, interner: &Interner) -> Result<Vec<u8>, PlanError> {
    // Collect every node the image must carry: triple terms and their
    // refinement nodes (datatype / language).
    let mut used: Vec<NodeId> = Vec::new();
    let mut seen: FxHashMap<NodeId, ()> = FxHashMap::default();
    let visit = |id: NodeId, used: &mut Vec<NodeId>, seen: &mut FxHashMap<NodeId, ()>| {
        if id.is_valid() && seen.insert(id, ()).is_none() {
            used.push(id);
        }
    };
    for t in graph.triples() {
        visit(t.s, &mut used, &mut seen);
        visit(t.p, &mut used, &mut seen);
        visit(t.o, &mut used, &mut seen);
        let aux = interner.aux_of(t.o);
        visit(aux, &mut used, &mut seen);
    }

    // Deterministic dense order.
    let sort_key = |id: NodeId| {
        let aux = interner.aux_of(id);
        let aux_bytes = if aux.is_valid() {
            interner.bytes_of(aux)
        } else {
            &[][..]
        };
        (id.kind().map(|k| k as u8).unwrap_or(0), interner.bytes_of(id), aux_bytes)
    };
    used.sort_by(|&a, &b| sort_key(a).cmp(&sort_key(b)));
    if used.len() > u32::MAX as usize {
        return Err(PlanError::TooManyNodes);
    }
    let mut dense: FxHashMap<NodeId, u32> = FxHashMap::default();
    for (i, &id) in used.iter().enumerate() {
        dense.insert(id, i as u32);
    }

    // Triple records on dense ids, sorted and deduplicated.
    let mut recs: Vec<(u32, u32, u32, u8, u8)> = graph
        .triples()
        .iter()
        .map(|t| (dense[&t.s], dense[&t.p], dense[&t.o], t.kind, t.flags))
        .collect();
    recs.sort_unstable();
    recs.dedup();

    // String pool: node lexemes in dense order, then prefix labels
    // and namespace IRIs in declaration order.
    let mut pool: Vec<u8> = Vec::new();
    let mut node_spans: Vec<(u32, u32)> = Vec::with_capacity(used.len());
    for &id in &used {
        let bytes = interner.bytes_of(id);
        node_spans.push((pool.len() as u32, bytes.len() as u32));
        pool.extend_from_slice(bytes);
    }
    let mut prefix_spans: Vec<(u32, u32, u32, u32)> = Vec::new();
    for (label, ns) in graph.prefixes().iter() {
        let label_off = pool.len() as u32;
        pool.extend_from_slice(label.as_bytes());
        let iri_bytes = interner.bytes_of(ns);
        let iri_off = pool.len() as u32;
        pool.extend_from_slice(iri_bytes);
        prefix_spans.push((
            label_off,
            label.len() as u32,
            iri_off,
            iri_bytes.len() as u32,
        ));
    }

    // Assemble the image.
    let mut buf = PlanBuf::new();
    buf.resize_header();

    let node_off = buf.len() as u64;
    for (i, &id) in used.iter().enumerate() {
        let (off, len) = node_spans[i];
        let aux = interner.aux_of(id);
        let aux_dense = if aux.is_valid() { dense[&aux] + 1 } else { 0 };
        buf.put_u32(off);
        buf.put_u32(len);
        buf.put_u8(id.kind().map(|k| k as u8).unwrap_or(0));
        buf.put_u8(0);
        buf.put_u16(0);
        buf.put_u32(aux_dense);
    }
    let node_len = buf.len() as u64 - node_off;
    buf.align8();

    let triple_off = buf.len() as u64;
    for &(s, p, o, k, f) in &recs {
        buf.put_u32(s);
        buf.put_u32(p);
        buf.put_u32(o);
        buf.put_u8(k);
        buf.put_u8(f);
        buf.put_u16(0);
    }
    let triple_len = buf.len() as u64 - triple_off;
    buf.align8();

    let prefix_off = buf.len() as u64;
    for &(label_off, label_len, iri_off, iri_len) in &prefix_spans {
        buf.put_u32(label_off);
        buf.put_u32(label_len);
        buf.put_u32(iri_off);
        buf.put_u32(iri_len);
    }
    let prefix_len = buf.len() as u64 - prefix_off;
    buf.align8();

    let pool_off = buf.len() as u64;
    buf.put_bytes(&pool);
    let pool_len = pool.len() as u64;
    buf.align8();

    // Header, then the payload hash over everything after it.
    let mut out = buf.into_inner();
    out[OFF_MAGIC..OFF_MAGIC + 8].copy_from_slice(&MAGIC);
    write_u16(&mut out, OFF_VERSION_MAJOR, VERSION_MAJOR);
    write_u16(&mut out, OFF_VERSION_MINOR, VERSION_MINOR);
    write_u16(&mut out, OFF_ENDIAN, ENDIAN_MARKER);
    write_u16(&mut out, OFF_FLAGS, FLAG_CHECKSUM);
    write_u32(&mut out, OFF_NODE_COUNT, used.len() as u32);
    write_u32(&mut out, OFF_TRIPLE_COUNT, recs.len() as u32);
    write_u32(&mut out, OFF_PREFIX_COUNT, prefix_spans.len() as u32);
    write_u64(&mut out, OFF_NODE_OFF, node_off);
    write_u64(&mut out, OFF_NODE_LEN, node_len);
    write_u64(&mut out, OFF_TRIPLE_OFF, triple_off);
    write_u64(&mut out, OFF_TRIPLE_LEN, triple_len);
    write_u64(&mut out, OFF_PREFIX_OFF, prefix_off);
    write_u64(&mut out, OFF_PREFIX_LEN, prefix_len);
    write_u64(&mut out, OFF_POOL_OFF, pool_off);
    write_u64(&mut out, OFF_POOL_LEN, pool_len);
    let hash = xxh3_64(&out[HEADER_LEN..]);
    write_u64(&mut out, OFF_CONTENT_HASH, hash);

    Ok(out)
}

/// Flush a serialized image with a single write call. A short write
/// aborts the operation; nothing is retried.
pub fn write_file(path: &Path, image: &[u8]) -> Result<(), PlanError> {
    let mut file = std::fs::File::create(path)?;
    let written = file.write(image)?;
    if written != image.len() {
        let _ = std::fs::remove_file(path);
        return Err(PlanError::PartialWrite {
            written,
            expected: image.len(),
        });
    }
    file.flush()?;
    Ok(())
}

/// Write buffer; growth is Vec's doubling.
struct PlanBuf {
    buf: Vec<u8>,
}

impl PlanBuf {
    fn new() -> PlanBuf {
        PlanBuf { buf: Vec::new() }
    }

    fn resize_header(&mut self) {
        self.buf.resize(HEADER_LEN, 0);
    }

    fn len(&self) -> usize {
        self.buf.len()
    }

    fn put_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn put_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn put_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn put_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    fn align8(&mut self) {
        while self.buf.len() % 8 != 0 {
            self.buf.push(0);
        }
    }

    fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

fn write_u16(buf: &mut [u8], off: usize, v: u16) {
    buf[off..off + 2].copy_from_slice(&v.to_le_bytes());
}

fn write_u32(buf: &mut [u8], off: usize, v: u32) {
    buf[off..off + 4].copy_from_slice(&v.to_le_bytes());
}

fn write_u64(buf: &mut [u8], off: usize, v: u64) {
    buf[off..off + 8].copy_from_slice(&v.to_le_bytes());
}
