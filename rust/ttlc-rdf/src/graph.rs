// rust/ttlc-rdf/src/graph.rs
// Insertion-ordered triple container with lazily extended indices
// Frozen before materialization; inserts are rejected afterwards

use rustc_hash::FxHashMap;

use crate::id::{NodeId, Triple};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("graph is frozen; no further inserts")]
    Frozen,
}

/// Prefix label -> namespace IRI node, in first-declaration order.
/// Redeclaring a label updates the binding in place so declaration
/// order stays stable for serialization.
#[derive(Debug, Default)]
pub struct PrefixTable {
    order: Vec<(String, NodeId)>,
    map: FxHashMap<String, usize>,
}

impl PrefixTable {
    pub fn declare(&mut self, label: &str, iri: NodeId) {
        if let Some(&i) = self.map.get(label) {
            self.order[i].1 = iri;
        } else {
            self.map.insert(label.to_string(), self.order.len());
            self.order.push((label.to_string(), iri));
        }
    }

    pub fn resolve(&self, label: &str) -> Option<NodeId> {
        self.map.get(label).map(|&i| self.order[i].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.order.iter().map(|(l, id)| (l.as_str(), *id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Interned triple graph.
///
/// Triples keep insertion order. Four derived indices (by subject,
/// by predicate, by object, and an `(s,p)` map) are extended lazily by
/// `index()`; queries combine the indexed prefix with a linear scan of
/// the unindexed tail, so they are correct at any point.
pub struct Graph {
    triples: Vec<Triple>,
    by_s: FxHashMap<NodeId, Vec<u32>>,
    by_p: FxHashMap<NodeId, Vec<u32>>,
    by_o: FxHashMap<NodeId, Vec<u32>>,
    sp: FxHashMap<(NodeId, NodeId), Vec<u32>>,
    indexed_upto: usize,
    frozen: bool,
    prefixes: PrefixTable,
    base: Option<NodeId>,
}

const EMPTY: &[u32] = &[];

impl Graph {
    pub fn new() -> Graph {
        Graph {
            triples: Vec::new(),
            by_s: FxHashMap::default(),
            by_p: FxHashMap::default(),
            by_o: FxHashMap::default(),
            sp: FxHashMap::default(),
            indexed_upto: 0,
            frozen: false,
            prefixes: PrefixTable::default(),
            base: None,
        }
    }

    pub fn insert(&mut self, t: Triple) -> Result<(), GraphError> {
        if self.frozen {
            return Err(GraphError::Frozen);
        }
        self.triples.push(t);
        Ok(())
    }

    /// Extend the indices over triples appended since the last call.
    pub fn index(&mut self) {
        for i in self.indexed_upto..self.triples.len() {
            let t = self.triples[i];
            let idx = i as u32;
            self.by_s.entry(t.s).or_default().push(idx);
            self.by_p.entry(t.p).or_default().push(idx);
            self.by_o.entry(t.o).or_default().push(idx);
            self.sp.entry((t.s, t.p)).or_default().push(idx);
        }
        self.indexed_upto = self.triples.len();
    }

    /// Index everything and reject further inserts.
    pub fn freeze(&mut self) {
        self.index();
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn prefixes(&self) -> &PrefixTable {
        &self.prefixes
    }

    pub fn prefixes_mut(&mut self) -> &mut PrefixTable {
        &mut self.prefixes
    }

    pub fn base(&self) -> Option<NodeId> {
        self.base
    }

    pub fn set_base(&mut self, base: NodeId) {
        self.base = Some(base);
    }

    /// Triples matching `(s, p, *)`.
    pub fn objects(&self, s: NodeId, p: NodeId) -> ObjectsIter<'_> {
        let posted = self.sp.get(&(s, p)).map(|v| v.as_slice()).unwrap_or(EMPTY);
        self.matching(posted, Some(s), Some(p), None)
    }

    /// Triples matching `(s, *, *)`.
    pub fn with_subject(&self, s: NodeId) -> ObjectsIter<'_> {
        let posted = self.by_s.get(&s).map(|v| v.as_slice()).unwrap_or(EMPTY);
        self.matching(posted, Some(s), None, None)
    }

    /// Triples matching `(*, p, *)`.
    pub fn with_predicate(&self, p: NodeId) -> ObjectsIter<'_> {
        let posted = self.by_p.get(&p).map(|v| v.as_slice()).unwrap_or(EMPTY);
        self.matching(posted, None, Some(p), None)
    }

    /// Triples matching `(*, *, o)`.
    pub fn with_object(&self, o: NodeId) -> ObjectsIter<'_> {
        let posted = self.by_o.get(&o).map(|v| v.as_slice()).unwrap_or(EMPTY);
        self.matching(posted, None, None, Some(o))
    }

    pub fn count_sp(&self, s: NodeId, p: NodeId) -> usize {
        self.objects(s, p).count()
    }

    pub fn ask(&self, s: NodeId, p: NodeId, o: NodeId) -> bool {
        self.matching(
            self.sp.get(&(s, p)).map(|v| v.as_slice()).unwrap_or(EMPTY),
            Some(s),
            Some(p),
            Some(o),
        )
        .next()
        .is_some()
    }

    fn matching<'g>(
        &'g self,
        posted: &'g [u32],
        s: Option<NodeId>,
        p: Option<NodeId>,
        o: Option<NodeId>,
    ) -> ObjectsIter<'g> {
        ObjectsIter {
            graph: self,
            posted: posted.iter(),
            tail: self.indexed_upto,
            s,
            p,
            o,
        }
    }
}

impl Default for Graph {
    fn default() -> Self {
        Graph::new()
    }
}

/// Iterator over triples matching a pattern: indexed postings first,
/// then a scan of the unindexed tail.
pub struct ObjectsIter<'g> {
    graph: &'g Graph,
    posted: std::slice::Iter<'g, u32>,
    tail: usize,
    s: Option<NodeId>,
    p: Option<NodeId>,
    o: Option<NodeId>,
}

impl<'g> Iterator for ObjectsIter<'g> {
    type Item = &'g Triple;

    fn next(&mut self) -> Option<&'g Triple> {
        let graph = self.graph;
        let s = self.s;
        let p = self.p;
        let o = self.o;
        let matches = |t: &Triple| {
            s.map_or(true, |s| t.s == s)
                && p.map_or(true, |p| t.p == p)
                && o.map_or(true, |o| t.o == o)
        };
        for &i in self.posted.by_ref() {
            let t = &graph.triples[i as usize];
            if matches(t) {
                return Some(t);
            }
        }
        while self.tail < graph.triples.len() {
            let t = &graph.triples[self.tail];
            self.tail += 1;
            if matches(t) {
                return Some(t);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{NodeKind, ObjectKind, TripleFlags};

    fn n(kind: NodeKind, i: u32) -> NodeId {
        NodeId::new(kind, i)
    }

    fn t(s: u32, p: u32, o: u32) -> Triple {
        Triple::new(
            n(NodeKind::Iri, s),
            n(NodeKind::Iri, p),
            n(NodeKind::Iri, o),
            ObjectKind::Iri,
            TripleFlags::empty(),
        )
    }

    #[test]
    fn test_queries_work_before_and_after_indexing() {
        let mut g = Graph::new();
        g.insert(t(1, 2, 3)).unwrap();
        g.insert(t(1, 2, 4)).unwrap();
        g.insert(t(5, 2, 3)).unwrap();

        // Unindexed: tail scan answers.
        assert_eq!(g.objects(n(NodeKind::Iri, 1), n(NodeKind::Iri, 2)).count(), 2);
        g.index();
        assert_eq!(g.objects(n(NodeKind::Iri, 1), n(NodeKind::Iri, 2)).count(), 2);
        assert_eq!(g.with_predicate(n(NodeKind::Iri, 2)).count(), 3);
        assert_eq!(g.with_object(n(NodeKind::Iri, 3)).count(), 2);
        assert!(g.ask(n(NodeKind::Iri, 5), n(NodeKind::Iri, 2), n(NodeKind::Iri, 3)));
        assert!(!g.ask(n(NodeKind::Iri, 5), n(NodeKind::Iri, 2), n(NodeKind::Iri, 4)));
    }

    #[test]
    fn test_mixed_indexed_and_tail() {
        let mut g = Graph::new();
        g.insert(t(1, 2, 3)).unwrap();
        g.index();
        g.insert(t(1, 2, 4)).unwrap();
        // One hit from the postings, one from the tail.
        assert_eq!(g.objects(n(NodeKind::Iri, 1), n(NodeKind::Iri, 2)).count(), 2);
    }

    #[test]
    fn test_freeze_rejects_inserts() {
        let mut g = Graph::new();
        g.insert(t(1, 2, 3)).unwrap();
        g.freeze();
        assert_eq!(g.insert(t(4, 5, 6)), Err(GraphError::Frozen));
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn test_prefix_table_order_stable_on_redeclare() {
        let mut p = PrefixTable::default();
        p.declare("ex", n(NodeKind::Iri, 1));
        p.declare("foaf", n(NodeKind::Iri, 2));
        p.declare("ex", n(NodeKind::Iri, 3));
        let order: Vec<_> = p.iter().collect();
        assert_eq!(order[0], ("ex", n(NodeKind::Iri, 3)));
        assert_eq!(order[1], ("foaf", n(NodeKind::Iri, 2)));
        assert_eq!(p.resolve("ex"), Some(n(NodeKind::Iri, 3)));
    }
}
