// rust/ttlc-rdf/tests/intern_props.rs
// Interner bijectivity under arbitrary lexeme sets

use proptest::prelude::*;
use ttlc_rdf::{Interner, NodeKind};

proptest! {
    // intern(x) == intern(y) exactly when x == y.
    #[test]
    fn prop_intern_is_injective(lexemes in proptest::collection::vec("[a-zA-Z0-9:/#._-]{1,40}", 1..64)) {
        let mut interner = Interner::new().unwrap();
        let ids: Vec<_> = lexemes
            .iter()
            .map(|l| interner.intern(NodeKind::Iri, l).unwrap())
            .collect();
        for (i, a) in lexemes.iter().enumerate() {
            for (j, b) in lexemes.iter().enumerate() {
                prop_assert_eq!(ids[i] == ids[j], a == b);
            }
        }
        // Resolution inverts interning.
        for (l, id) in lexemes.iter().zip(&ids) {
            prop_assert_eq!(interner.str_of(*id), l.as_str());
        }
    }

    // Re-interning after unrelated inserts returns the original id.
    #[test]
    fn prop_ids_stable_across_growth(
        first in "[a-z]{1,20}",
        noise in proptest::collection::vec("[a-z0-9]{1,30}", 0..512),
    ) {
        let mut interner = Interner::new().unwrap();
        let id = interner.intern(NodeKind::Literal, &first).unwrap();
        for n in &noise {
            interner.intern(NodeKind::Literal, n).unwrap();
        }
        prop_assert_eq!(interner.intern(NodeKind::Literal, &first).unwrap(), id);
    }
}
