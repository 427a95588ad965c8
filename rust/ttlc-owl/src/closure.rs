// rust/ttlc-owl/src/closure.rs
// Materialized OWL closure over the interned graph
// Dense class/property indices, closed bit matrices, one masked-bit
// lookup per query

use bitflags::bitflags;
use rustc_hash::FxHashMap;
use ttlc_rdf::{Graph, NodeId, Vocab};

use crate::matrix::BitMatrix;

/// Hard cap on distinct classes/properties in one closure; keeps the
/// matrices within a sane memory budget.
const MAX_DENSE: usize = 1 << 20;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OwlError {
    #[error("too many named {kind}: {count} exceeds {max}", max = MAX_DENSE)]
    TooManyTerms { kind: &'static str, count: usize },
}

bitflags! {
    /// Property characteristics, one 4-bit row per property
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PropertyFlags: u8 {
        const TRANSITIVE = 1 << 0;
        const SYMMETRIC = 1 << 1;
        const FUNCTIONAL = 1 << 2;
        const INVERSE_FUNCTIONAL = 1 << 3;
    }
}

/// Dense [0..N) index assignment for a set of nodes.
#[derive(Debug, Default)]
pub struct DenseIndex {
    map: FxHashMap<NodeId, u32>,
    ids: Vec<NodeId>,
}

impl DenseIndex {
    pub fn insert(&mut self, id: NodeId) -> u32 {
        if let Some(&i) = self.map.get(&id) {
            return i;
        }
        let i = self.ids.len() as u32;
        self.map.insert(id, i);
        self.ids.push(id);
        i
    }

    pub fn get(&self, id: NodeId) -> Option<u32> {
        self.map.get(&id).copied()
    }

    pub fn node(&self, i: u32) -> NodeId {
        self.ids[i as usize]
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.ids.iter().copied()
    }
}

/// A detected disjointness conflict. `subject` is the offending
/// instance, or None when the class hierarchy itself is inconsistent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contradiction {
    pub subject: Option<NodeId>,
    pub a: NodeId,
    pub b: NodeId,
}

/// The closed class/property relation set.
pub struct Closure {
    classes: DenseIndex,
    subclass: BitMatrix,
    disjoint: BitMatrix,
    props: DenseIndex,
    subprop: BitMatrix,
    characteristics: Vec<PropertyFlags>,
    inverse: Vec<Option<u32>>,
    domain: Vec<Option<u32>>,
    range: Vec<Option<u32>>,
    contradictions: Vec<Contradiction>,
}

impl Closure {
    /// `a ⊑ b` after closure. Unindexed nodes are only subclasses of
    /// themselves.
    #[inline]
    pub fn is_subclass(&self, a: NodeId, b: NodeId) -> bool {
        if a == b {
            return true;
        }
        match (self.classes.get(a), self.classes.get(b)) {
            (Some(i), Some(j)) => self.subclass.test(i as usize, j as usize),
            _ => false,
        }
    }

    /// Mutual subclass relation (declared or implied equivalence).
    #[inline]
    pub fn is_equivalent(&self, a: NodeId, b: NodeId) -> bool {
        self.is_subclass(a, b) && self.is_subclass(b, a)
    }

    /// Disjointness, expanded down both hierarchies.
    #[inline]
    pub fn is_disjoint(&self, a: NodeId, b: NodeId) -> bool {
        match (self.classes.get(a), self.classes.get(b)) {
            (Some(i), Some(j)) => self.disjoint.test(i as usize, j as usize),
            _ => false,
        }
    }

    #[inline]
    pub fn has_characteristic(&self, p: NodeId, kind: PropertyFlags) -> bool {
        match self.props.get(p) {
            Some(i) => self.characteristics[i as usize].contains(kind),
            None => false,
        }
    }

    /// `a ⊑ b` over rdfs:subPropertyOf after closure.
    #[inline]
    pub fn is_subproperty(&self, a: NodeId, b: NodeId) -> bool {
        if a == b {
            return true;
        }
        match (self.props.get(a), self.props.get(b)) {
            (Some(i), Some(j)) => self.subprop.test(i as usize, j as usize),
            _ => false,
        }
    }

    pub fn inverse_of(&self, p: NodeId) -> Option<NodeId> {
        let i = self.props.get(p)?;
        self.inverse[i as usize].map(|j| self.props.node(j))
    }

    pub fn domain_of(&self, p: NodeId) -> Option<NodeId> {
        let i = self.props.get(p)?;
        self.domain[i as usize].map(|j| self.classes.node(j))
    }

    pub fn range_of(&self, p: NodeId) -> Option<NodeId> {
        let i = self.props.get(p)?;
        self.range[i as usize].map(|j| self.classes.node(j))
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn property_count(&self) -> usize {
        self.props.len()
    }

    pub fn classes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.classes.iter()
    }

    /// Disjointness conflicts found while building.
    pub fn contradictions(&self) -> &[Contradiction] {
        &self.contradictions
    }
}

/// Builds a Closure from the asserted axiom triples of a graph.
pub struct ClosureBuilder;

impl ClosureBuilder {
    pub fn build(graph: &Graph, vocab: &Vocab) -> Result<Closure, OwlError> {
        let mut classes = DenseIndex::default();
        let mut props = DenseIndex::default();

        // Pass 1: dense index assignment for every node in class or
        // property position.
        for t in graph.triples() {
            if t.p == vocab.rdfs_sub_class_of
                || t.p == vocab.owl_equivalent_class
                || t.p == vocab.owl_disjoint_with
            {
                classes.insert(t.s);
                classes.insert(t.o);
            } else if t.p == vocab.rdf_type {
                classes.insert(t.o);
                if t.o == vocab.owl_transitive
                    || t.o == vocab.owl_symmetric
                    || t.o == vocab.owl_functional
                    || t.o == vocab.owl_inverse_functional
                {
                    props.insert(t.s);
                }
            } else if t.p == vocab.rdfs_sub_property_of || t.p == vocab.owl_inverse_of {
                props.insert(t.s);
                props.insert(t.o);
            } else if t.p == vocab.rdfs_domain || t.p == vocab.rdfs_range {
                props.insert(t.s);
                classes.insert(t.o);
            }
        }
        if classes.len() > MAX_DENSE {
            return Err(OwlError::TooManyTerms {
                kind: "classes",
                count: classes.len(),
            });
        }
        if props.len() > MAX_DENSE {
            return Err(OwlError::TooManyTerms {
                kind: "properties",
                count: props.len(),
            });
        }

        let nc = classes.len();
        let np = props.len();
        let mut subclass = BitMatrix::new(nc);
        let mut subprop = BitMatrix::new(np);
        let mut characteristics = vec![PropertyFlags::empty(); np];
        let mut inverse = vec![None; np];
        let mut domain = vec![None; np];
        let mut range = vec![None; np];
        let mut disjoint_asserted: Vec<(u32, u32)> = Vec::new();

        // Reflexivity.
        for i in 0..nc {
            subclass.set(i, i);
        }
        for i in 0..np {
            subprop.set(i, i);
        }

        // Pass 2: asserted bits.
        for t in graph.triples() {
            if t.p == vocab.rdfs_sub_class_of {
                let (i, j) = (classes.insert(t.s), classes.insert(t.o));
                subclass.set(i as usize, j as usize);
            } else if t.p == vocab.owl_equivalent_class {
                let (i, j) = (classes.insert(t.s), classes.insert(t.o));
                subclass.set(i as usize, j as usize);
                subclass.set(j as usize, i as usize);
            } else if t.p == vocab.owl_disjoint_with {
                let (i, j) = (classes.insert(t.s), classes.insert(t.o));
                disjoint_asserted.push((i, j));
            } else if t.p == vocab.rdfs_sub_property_of {
                let (i, j) = (props.insert(t.s), props.insert(t.o));
                subprop.set(i as usize, j as usize);
            } else if t.p == vocab.owl_inverse_of {
                let (i, j) = (props.insert(t.s), props.insert(t.o));
                inverse[i as usize] = Some(j);
                inverse[j as usize] = Some(i);
            } else if t.p == vocab.rdfs_domain {
                let (i, j) = (props.insert(t.s), classes.insert(t.o));
                domain[i as usize] = Some(j);
            } else if t.p == vocab.rdfs_range {
                let (i, j) = (props.insert(t.s), classes.insert(t.o));
                range[i as usize] = Some(j);
            } else if t.p == vocab.rdf_type {
                if let Some(i) = props.get(t.s) {
                    let flag = if t.o == vocab.owl_transitive {
                        PropertyFlags::TRANSITIVE
                    } else if t.o == vocab.owl_symmetric {
                        PropertyFlags::SYMMETRIC
                    } else if t.o == vocab.owl_functional {
                        PropertyFlags::FUNCTIONAL
                    } else if t.o == vocab.owl_inverse_functional {
                        PropertyFlags::INVERSE_FUNCTIONAL
                    } else {
                        PropertyFlags::empty()
                    };
                    characteristics[i as usize] |= flag;
                }
            }
        }

        subclass.transitive_close();
        subprop.transitive_close();

        // Disjointness is checked, not closed. A pair that the closure
        // also orders is a hierarchy-level contradiction; otherwise it
        // is expanded down both subtrees into the disjoint plane.
        let mut disjoint = BitMatrix::new(nc);
        let mut contradictions = Vec::new();
        for &(a, b) in &disjoint_asserted {
            let (a, b) = (a as usize, b as usize);
            if subclass.test(a, b) || subclass.test(b, a) {
                contradictions.push(Contradiction {
                    subject: None,
                    a: classes.node(a as u32),
                    b: classes.node(b as u32),
                });
                continue;
            }
            for i in 0..nc {
                if !subclass.test(i, a) {
                    continue;
                }
                for j in 0..nc {
                    if subclass.test(j, b) {
                        disjoint.set(i, j);
                        disjoint.set(j, i);
                    }
                }
            }
        }

        // Instance-level check against rdf:type assertions.
        let mut types_by_subject: FxHashMap<NodeId, Vec<u32>> = FxHashMap::default();
        for t in graph.triples() {
            if t.p == vocab.rdf_type {
                if let Some(i) = classes.get(t.o) {
                    types_by_subject.entry(t.s).or_default().push(i);
                }
            }
        }
        for (subject, types) in &types_by_subject {
            for &(a, b) in &disjoint_asserted {
                let in_a = types.iter().any(|&t| subclass.test(t as usize, a as usize));
                let in_b = types.iter().any(|&t| subclass.test(t as usize, b as usize));
                if in_a && in_b {
                    contradictions.push(Contradiction {
                        subject: Some(*subject),
                        a: classes.node(a),
                        b: classes.node(b),
                    });
                }
            }
        }

        Ok(Closure {
            classes,
            subclass,
            disjoint,
            props,
            subprop,
            characteristics,
            inverse,
            domain,
            range,
            contradictions,
        })
    }
}
