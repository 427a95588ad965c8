// rust/ttlc-rdf/tests/turtle_conformance.rs
// Broad Turtle 1.1 surface checks: one fixture per syntax family

use ttlc_rdf::{
    Graph, Interner, NodeId, NodeKind, ObjectKind, ParseErrorKind, Parser, ParserOptions, Vocab,
};

struct Parsed {
    interner: Interner,
    graph: Graph,
    vocab: Vocab,
}

fn parse_strict(src: &str) -> Parsed {
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
    Parsed {
        interner,
        graph,
        vocab,
    }
}

fn triples_as_strings(p: &Parsed) -> Vec<(String, String, String)> {
    p.graph
        .triples()
        .iter()
        .map(|t| {
            (
                p.interner.str_of(t.s).to_string(),
                p.interner.str_of(t.p).to_string(),
                p.interner.str_of(t.o).to_string(),
            )
        })
        .collect()
}

#[test]
fn test_semicolon_comma_mix() {
    let p = parse_strict(
        "@prefix ex: <http://e/> .\n\
         ex:s ex:p1 ex:a , ex:b ;\n\
              ex:p2 ex:c ;\n\
              ex:p3 ex:d , ex:e , ex:f .",
    );
    assert_eq!(p.graph.len(), 6);
    let ts = triples_as_strings(&p);
    assert!(ts.iter().all(|(s, _, _)| s == "http://e/s"));
}

#[test]
fn test_trailing_semicolon_before_dot() {
    let p = parse_strict("@prefix ex: <http://e/> . ex:s ex:p ex:o ; .");
    assert_eq!(p.graph.len(), 1);
}

#[test]
fn test_nested_blank_node_property_lists() {
    let p = parse_strict(
        "@prefix ex: <http://e/> .\n\
         ex:s ex:p [ ex:q [ ex:r ex:leaf ] ] .",
    );
    assert_eq!(p.graph.len(), 3);
    // Two generated blank nodes, one level each.
    let blanks: std::collections::HashSet<NodeId> = p
        .graph
        .triples()
        .iter()
        .flat_map(|t| [t.s, t.o])
        .filter(|id| id.kind() == Some(NodeKind::Blank))
        .collect();
    assert_eq!(blanks.len(), 2);
}

#[test]
fn test_nested_collections() {
    let p = parse_strict("@prefix ex: <http://e/> . ex:s ex:p (ex:a (ex:b) ()) .");
    // Outer list of three items; middle item is a single-element list,
    // last is rdf:nil directly.
    let firsts = p.graph.with_predicate(p.vocab.rdf_first).count();
    assert_eq!(firsts, 4);
    assert!(p.graph.len() >= 9);
}

#[test]
fn test_long_string_with_quotes_and_newlines() {
    let p = parse_strict(
        "@prefix ex: <http://e/> . ex:s ex:p \"\"\"line one\nline \"two\"\nend\"\"\" .",
    );
    let t = p.graph.triples()[0];
    assert_eq!(
        p.interner.str_of(t.o),
        "line one\nline \"two\"\nend"
    );
}

#[test]
fn test_single_quoted_literals() {
    let p = parse_strict("@prefix ex: <http://e/> . ex:s ex:p 'simple' , '''long ' quote''' .");
    assert_eq!(p.graph.len(), 2);
    assert_eq!(p.interner.str_of(p.graph.triples()[0].o), "simple");
    assert_eq!(p.interner.str_of(p.graph.triples()[1].o), "long ' quote");
}

#[test]
fn test_unicode_escapes() {
    let p = parse_strict(r#"@prefix ex: <http://e/> . ex:s ex:p "snow☃man" , "wide\U0001F600" ."#);
    assert_eq!(p.interner.str_of(p.graph.triples()[0].o), "snow\u{2603}man");
    assert_eq!(p.interner.str_of(p.graph.triples()[1].o), "wide\u{1F600}");
}

#[test]
fn test_raw_multibyte_literals() {
    let p = parse_strict("@prefix ex: <http://e/> . ex:s ex:p \"snow☃man\" .");
    assert_eq!(p.interner.str_of(p.graph.triples()[0].o), "snow☃man");
}

#[test]
fn test_unicode_in_pname_local() {
    let p = parse_strict("@prefix ex: <http://e/> . ex:søren ex:p ex:ø .");
    let ts = triples_as_strings(&p);
    assert_eq!(ts[0].0, "http://e/søren");
    assert_eq!(ts[0].2, "http://e/ø");
}

#[test]
fn test_percent_escapes_in_local_names() {
    let p = parse_strict("@prefix ex: <http://e/> . ex:a%20b ex:p ex:c .");
    assert_eq!(triples_as_strings(&p)[0].0, "http://e/a%20b");
}

#[test]
fn test_numeric_spread() {
    let p = parse_strict(
        "@prefix ex: <http://e/> . ex:s ex:p 0 , -1 , +2 , 3.25 , -0.5 , 1E0 , 2.5e-3 .",
    );
    let kinds: Vec<ObjectKind> = p
        .graph
        .triples()
        .iter()
        .map(|t| t.object_kind())
        .collect();
    assert_eq!(
        kinds,
        vec![
            ObjectKind::Integer,
            ObjectKind::Integer,
            ObjectKind::Integer,
            ObjectKind::Decimal,
            ObjectKind::Decimal,
            ObjectKind::Double,
            ObjectKind::Double,
        ]
    );
}

#[test]
fn test_datatype_on_pname_and_iri() {
    let p = parse_strict(
        "@prefix ex: <http://e/> .\n\
         @prefix xsd: <http://www.w3.org/2001/XMLSchema#> .\n\
         ex:s ex:p \"7\"^^xsd:byte , \"8\"^^<http://www.w3.org/2001/XMLSchema#short> .",
    );
    let dt0 = p.interner.aux_of(p.graph.triples()[0].o);
    let dt1 = p.interner.aux_of(p.graph.triples()[1].o);
    assert_eq!(p.interner.str_of(dt0), "http://www.w3.org/2001/XMLSchema#byte");
    assert_eq!(p.interner.str_of(dt1), "http://www.w3.org/2001/XMLSchema#short");
}

#[test]
fn test_shared_blank_labels_unify() {
    let p = parse_strict(
        "@prefix ex: <http://e/> .\n\
         _:n ex:p ex:a .\n\
         _:n ex:q ex:b .",
    );
    assert_eq!(p.graph.triples()[0].s, p.graph.triples()[1].s);
}

#[test]
fn test_base_change_mid_document() {
    let p = parse_strict(
        "@base <http://one/> . <a> <p> <b> .\n\
         @base <http://two/> . <a> <p> <b> .",
    );
    let ts = triples_as_strings(&p);
    assert_eq!(ts[0].0, "http://one/a");
    assert_eq!(ts[1].0, "http://two/a");
}

#[test]
fn test_prefix_redeclaration_uses_latest() {
    let p = parse_strict(
        "@prefix ex: <http://one/> . ex:a ex:p ex:b .\n\
         @prefix ex: <http://two/> . ex:a ex:p ex:b .",
    );
    let ts = triples_as_strings(&p);
    assert_eq!(ts[0].0, "http://one/a");
    assert_eq!(ts[1].0, "http://two/a");
    // One table entry, latest binding.
    assert_eq!(p.graph.prefixes().len(), 1);
}

#[test]
fn test_default_namespace_prefix() {
    let p = parse_strict("@prefix : <http://d/> . :a :p :b .");
    assert_eq!(triples_as_strings(&p)[0].0, "http://d/a");
}

#[test]
fn test_crlf_and_comments() {
    let p = parse_strict(
        "@prefix ex: <http://e/> .\r\n# comment line\r\nex:a ex:p ex:b . # trailing\r\n",
    );
    assert_eq!(p.graph.len(), 1);
}

#[test]
fn test_brace_is_rejected() {
    let mut interner = Interner::new().unwrap();
    let vocab = Vocab::new(&mut interner).unwrap();
    let mut graph = Graph::new();
    let err = Parser::new(
        "{ }",
        &mut interner,
        &mut graph,
        &vocab,
        ParserOptions { strict: true },
    )
    .parse()
    .unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::UnexpectedToken { .. }));
}

#[test]
fn test_error_position_is_exact() {
    let mut interner = Interner::new().unwrap();
    let vocab = Vocab::new(&mut interner).unwrap();
    let mut graph = Graph::new();
    let err = Parser::new(
        "@prefix ex: <http://e/> .\n\nex:a ex:p @@ .",
        &mut interner,
        &mut graph,
        &vocab,
        ParserOptions { strict: true },
    )
    .parse()
    .unwrap_err();
    assert_eq!((err.line, err.column), (3, 11));
}
