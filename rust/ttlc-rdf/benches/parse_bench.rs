// rust/ttlc-rdf/benches/parse_bench.rs
// Lexer and parser throughput over synthetic TTL

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use ttlc_rdf::{Graph, Interner, Lexer, Parser, ParserOptions, TokenKind, Vocab};

fn synthetic_ttl(triples: usize) -> String {
    let mut src = String::from("@prefix ex: <http://example.org/ns/> .\n");
    for i in 0..triples {
        src.push_str(&format!(
            "ex:subject{i} ex:predicate{} \"value {i}\" ; ex:count {i} .\n",
            i % 17
        ));
    }
    src
}

fn bench_lexer(c: &mut Criterion) {
    let src = synthetic_ttl(2000);
    let mut group = c.benchmark_group("lexer");
    group.throughput(Throughput::Bytes(src.len() as u64));
    group.bench_function("tokenize_2k_statements", |b| {
        b.iter(|| {
            let mut lexer = Lexer::new(&src);
            let mut count = 0usize;
            loop {
                let tok = lexer.consume().expect("lex");
                if tok.kind == TokenKind::Eof {
                    break;
                }
                count += 1;
            }
            black_box(count)
        })
    });
    group.finish();
}

fn bench_parser(c: &mut Criterion) {
    let src = synthetic_ttl(2000);
    let mut group = c.benchmark_group("parser");
    group.throughput(Throughput::Bytes(src.len() as u64));
    group.bench_function("parse_2k_statements", |b| {
        b.iter(|| {
            let mut interner = Interner::new().unwrap();
            let vocab = Vocab::new(&mut interner).unwrap();
            let mut graph = Graph::new();
            let stats = Parser::new(
                &src,
                &mut interner,
                &mut graph,
                &vocab,
                ParserOptions { strict: true },
            )
            .parse()
            .expect("parse");
            black_box(stats.triples)
        })
    });
    group.finish();
}

criterion_group!(benches, bench_lexer, bench_parser);
criterion_main!(benches);
