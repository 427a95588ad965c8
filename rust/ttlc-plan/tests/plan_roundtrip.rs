// rust/ttlc-plan/tests/plan_roundtrip.rs
// Round-trip, determinism, and self-description checks on the image

use std::collections::BTreeSet;

use ttlc_plan::{serialize, write_file, PlanError, PlanView};
use ttlc_rdf::{Graph, Interner, Parser, ParserOptions, Vocab};

fn build(src: &str) -> (Interner, Graph) {
    let mut interner = Interner::new().unwrap();
    let vocab = Vocab::new(&mut interner).unwrap();
    let mut graph = Graph::new();
    Parser::new(
        src,
        &mut interner,
        &mut graph,
        &vocab,
        ParserOptions { strict: true },
    )
    .parse()
    .expect("parse");
    graph.freeze();
    (interner, graph)
}

/// Triple set as strings, for graph-to-view equality.
fn view_triples(view: &PlanView) -> BTreeSet<(String, String, String, u8)> {
    view.triples()
        .map(|t| {
            (
                view.node_string(t.s).to_string(),
                view.node_string(t.p).to_string(),
                view.node_string(t.o).to_string(),
                t.kind,
            )
        })
        .collect()
}

fn graph_triples(graph: &Graph, interner: &Interner) -> BTreeSet<(String, String, String, u8)> {
    graph
        .triples()
        .iter()
        .map(|t| {
            (
                interner.str_of(t.s).to_string(),
                interner.str_of(t.p).to_string(),
                interner.str_of(t.o).to_string(),
                t.kind,
            )
        })
        .collect()
}

#[test]
fn test_trivial_roundtrip() {
    let (interner, graph) = build("@prefix ex: <http://e/> . ex:a ex:p ex:b .");
    let image = serialize(&graph, &interner).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("t.plan.bin");
    write_file(&path, &image).unwrap();

    let view = PlanView::open(&path).unwrap();
    assert_eq!(view.triple_count(), 1);
    assert_eq!(view.node_count(), 3);
    assert_eq!(view.prefix_count(), 1);

    let t = view.triple(0);
    assert_eq!(view.node_string(t.s), "http://e/a");
    assert_eq!(view.node_string(t.p), "http://e/p");
    assert_eq!(view.node_string(t.o), "http://e/b");

    let ns = view.prefix("ex").expect("prefix bound");
    assert_eq!(ns, "http://e/");
}

#[test]
fn test_roundtrip_preserves_triple_set() {
    let src = r#"@prefix ex: <http://e/> .
ex:a ex:p ex:b , ex:c ; ex:q "lit" , 42 , "tag"@en .
ex:b ex:p ex:a .
"#;
    let (interner, graph) = build(src);
    let image = serialize(&graph, &interner).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("t.plan.bin");
    write_file(&path, &image).unwrap();
    let view = PlanView::open(&path).unwrap();

    assert_eq!(view_triples(&view), graph_triples(&graph, &interner));
}

#[test]
fn test_typed_literal_aux_survives() {
    let (interner, graph) = build("@prefix ex: <http://e/> . ex:a ex:p 42 .");
    let image = serialize(&graph, &interner).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("t.plan.bin");
    write_file(&path, &image).unwrap();
    let view = PlanView::open(&path).unwrap();

    let t = view.triple(0);
    let o = view.node(t.o);
    assert_eq!(o.bytes, b"42");
    let dt = o.aux.expect("datatype");
    assert_eq!(
        view.node_string(dt),
        "http://www.w3.org/2001/XMLSchema#integer"
    );
}

#[test]
fn test_serialization_is_deterministic() {
    let src = "@prefix ex: <http://e/> . ex:a ex:p ex:b . ex:c ex:q ex:d .";
    let (i1, g1) = build(src);
    let (i2, g2) = build(src);
    assert_eq!(serialize(&g1, &i1).unwrap(), serialize(&g2, &i2).unwrap());
}

#[test]
fn test_insertion_order_does_not_change_bytes() {
    // The same triple set declared in two orders.
    let (i1, g1) = build("@prefix ex: <http://e/> . ex:a ex:p ex:b . ex:c ex:q ex:d .");
    let (i2, g2) = build("@prefix ex: <http://e/> . ex:c ex:q ex:d . ex:a ex:p ex:b .");
    assert_eq!(serialize(&g1, &i1).unwrap(), serialize(&g2, &i2).unwrap());
}

#[test]
fn test_triples_are_sorted_by_spo() {
    let (interner, graph) =
        build("@prefix ex: <http://e/> . ex:z ex:p ex:b . ex:a ex:p ex:b . ex:a ex:a ex:a .");
    let image = serialize(&graph, &interner).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("t.plan.bin");
    write_file(&path, &image).unwrap();
    let view = PlanView::open(&path).unwrap();

    let recs: Vec<(u32, u32, u32)> = view.triples().map(|t| (t.s, t.p, t.o)).collect();
    let mut sorted = recs.clone();
    sorted.sort_unstable();
    assert_eq!(recs, sorted);
}

#[test]
fn test_version_mismatch_rejected() {
    let (interner, graph) = build("@prefix ex: <http://e/> . ex:a ex:p ex:b .");
    let mut image = serialize(&graph, &interner).unwrap();
    // Bump the major version field.
    image[8] = 0xEE;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("t.plan.bin");
    std::fs::write(&path, &image).unwrap();
    assert!(matches!(
        PlanView::open(&path),
        Err(PlanError::UnsupportedVersion { .. })
    ));
}

#[test]
fn test_corrupt_payload_rejected() {
    let (interner, graph) = build("@prefix ex: <http://e/> . ex:a ex:p ex:b .");
    let mut image = serialize(&graph, &interner).unwrap();
    let last = image.len() - 1;
    image[last] ^= 0xFF;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("t.plan.bin");
    std::fs::write(&path, &image).unwrap();
    assert!(matches!(PlanView::open(&path), Err(PlanError::HashMismatch)));
}

#[test]
fn test_bad_magic_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("t.plan.bin");
    std::fs::write(&path, vec![0u8; 256]).unwrap();
    assert!(matches!(PlanView::open(&path), Err(PlanError::BadMagic)));
}

#[test]
fn test_truncated_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("t.plan.bin");
    std::fs::write(&path, b"TTLCPLAN").unwrap();
    assert!(matches!(PlanView::open(&path), Err(PlanError::Truncated)));
}
