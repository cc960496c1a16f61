//! Parser throughput benchmarks over a handful of representative C99
//! snippets, run end to end from source text through the full
//! lex-then-parse pipeline.
//! Run with: `cargo bench --package cc-parse`

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use cc_hb::NodeBuffer;
use cc_store::{AStore, SStore, SymTab, TStore};

fn parse_source(source: &str) {
    let dir = tempfile::tempdir().unwrap();
    let mut sstore = SStore::init(dir.path().join("s.sstore")).unwrap();
    let mut tstore = TStore::init(dir.path().join("t.tstore")).unwrap();
    let mut sink = cc_diag::ErrorSink::new(cc_diag::ErrorConfig::default());
    cc_lex::lex(source, "bench.c", &mut sstore, &mut tstore, &mut sink).unwrap();
    sstore.close().unwrap();
    tstore.close().unwrap();

    let astore_path = dir.path().join("a.astore");
    let symtab_path = dir.path().join("s.symtab");
    AStore::init(&astore_path).unwrap().close().unwrap();
    SymTab::init(&symtab_path).unwrap().close().unwrap();
    let mut hb = NodeBuffer::init(&astore_path, &symtab_path, 256).unwrap();

    let mut sstore = SStore::open(dir.path().join("s.sstore")).unwrap();
    let mut tstore = TStore::open(dir.path().join("t.tstore")).unwrap();
    black_box(cc_parse::parse_translation_unit(&mut tstore, &mut sstore, &mut hb, &mut sink, "bench.c").unwrap());
}

fn bench_small_function(c: &mut Criterion) {
    let source = "int main(void) { return 0; }";
    let mut group = c.benchmark_group("parser_small_function");
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("return_statement", |b| b.iter(|| parse_source(black_box(source))));
    group.finish();
}

fn bench_expressions(c: &mut Criterion) {
    let source = r#"
        int compute(int a, int b) {
            int x = a + b * 2 - (a / b) + (a % b);
            int y = x << 2 | x & 1 ^ ~x;
            return x > y ? x : y;
        }
    "#;
    let mut group = c.benchmark_group("parser_expressions");
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("arithmetic_and_bitwise", |b| b.iter(|| parse_source(black_box(source))));
    group.finish();
}

fn bench_control_flow(c: &mut Criterion) {
    let source = r#"
        int fib(int n) {
            if (n <= 1) {
                return n;
            }
            int a = 0, b = 1;
            for (int i = 2; i <= n; i = i + 1) {
                int c = a + b;
                a = b;
                b = c;
            }
            return b;
        }
    "#;
    let mut group = c.benchmark_group("parser_control_flow");
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("loop_and_branch", |b| b.iter(|| parse_source(black_box(source))));
    group.finish();
}

fn bench_many_declarations(c: &mut Criterion) {
    let mut source = String::new();
    for i in 0..50 {
        source.push_str(&format!("int global_{i};\n"));
    }
    let mut group = c.benchmark_group("parser_many_declarations");
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("50_globals", |b| b.iter(|| parse_source(black_box(&source))));
    group.finish();
}

criterion_group!(benches, bench_small_function, bench_expressions, bench_control_flow, bench_many_declarations);
criterion_main!(benches);
