// rust/ttlc-owl/tests/closure_props.rs
// Transitivity of the closed subclass relation over random chains

use proptest::prelude::*;
use ttlc_owl::ClosureBuilder;
use ttlc_rdf::{Graph, Interner, NodeId, NodeKind, ObjectKind, Triple, TripleFlags, Vocab};

proptest! {
    // Declaring c0 <= c1 <= ... <= cn makes every (ci, cj), i <= j,
    // a closed subclass pair, and no reverse pair appears.
    #[test]
    fn prop_chain_closes(len in 2usize..24) {
        let mut interner = Interner::new().unwrap();
        let vocab = Vocab::new(&mut interner).unwrap();
        let mut graph = Graph::new();

        let classes: Vec<NodeId> = (0..len)
            .map(|i| interner.intern(NodeKind::Iri, &format!("http://e/C{i}")).unwrap())
            .collect();
        for w in classes.windows(2) {
            graph
                .insert(Triple::new(
                    w[0],
                    vocab.rdfs_sub_class_of,
                    w[1],
                    ObjectKind::Iri,
                    TripleFlags::empty(),
                ))
                .unwrap();
        }
        graph.freeze();

        let closure = ClosureBuilder::build(&graph, &vocab).unwrap();
        for i in 0..len {
            for j in 0..len {
                prop_assert_eq!(closure.is_subclass(classes[i], classes[j]), i <= j);
            }
        }
    }

    // is_subclass is transitive over arbitrary edge sets.
    #[test]
    fn prop_closure_is_transitive(edges in proptest::collection::vec((0u8..12, 0u8..12), 0..40)) {
        let mut interner = Interner::new().unwrap();
        let vocab = Vocab::new(&mut interner).unwrap();
        let mut graph = Graph::new();

        let classes: Vec<NodeId> = (0..12)
            .map(|i| interner.intern(NodeKind::Iri, &format!("http://e/C{i}")).unwrap())
            .collect();
        for (a, b) in edges {
            graph
                .insert(Triple::new(
                    classes[a as usize],
                    vocab.rdfs_sub_class_of,
                    classes[b as usize],
                    ObjectKind::Iri,
                    TripleFlags::empty(),
                ))
                .unwrap();
        }
        graph.freeze();

        let closure = ClosureBuilder::build(&graph, &vocab).unwrap();
        for &a in &classes {
            for &b in &classes {
                for &c in &classes {
                    if closure.is_subclass(a, b) && closure.is_subclass(b, c) {
                        prop_assert!(closure.is_subclass(a, c));
                    }
                }
            }
        }
    }
}
