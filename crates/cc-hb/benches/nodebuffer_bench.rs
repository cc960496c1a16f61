//! Node-buffer get/new benchmarks, covering both the cache-hit path and
//! the demand-paged miss/eviction path.
//! Run with: `cargo bench --package cc-hb`

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use cc_hb::NodeBuffer;
use cc_store::AstNode;

fn temp_buffer(capacity: usize) -> (tempfile::TempDir, NodeBuffer) {
    let dir = tempfile::tempdir().unwrap();
    let hb = NodeBuffer::init(dir.path().join("a.astore"), dir.path().join("s.symtab"), capacity).unwrap();
    (dir, hb)
}

fn bench_new_ast(c: &mut Criterion) {
    let mut group = c.benchmark_group("new_ast");

    group.bench_function("within_capacity", |b| {
        let (_dir, mut hb) = temp_buffer(1024);
        b.iter(|| black_box(hb.new_ast().unwrap()))
    });

    group.bench_function("forces_eviction", |b| {
        let (_dir, mut hb) = temp_buffer(8);
        b.iter(|| black_box(hb.new_ast().unwrap()))
    });

    group.finish();
}

fn bench_get_ast(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_ast");

    group.bench_function("resident_hit", |b| {
        let (_dir, mut hb) = temp_buffer(1024);
        let (id, _slot) = hb.new_ast().unwrap();
        b.iter(|| black_box(hb.get_ast(id).unwrap()))
    });

    group.bench_function("demand_paged_miss", |b| {
        let (_dir, mut hb) = temp_buffer(4);
        let mut ids = Vec::new();
        for i in 0..64 {
            let (id, slot) = hb.new_ast().unwrap();
            hb.ast_mut(slot).unwrap().node = AstNode::IntLiteral { value: i };
            hb.touched(slot);
            ids.push(id);
        }
        let mut i = 0usize;
        b.iter(|| {
            let id = ids[i % ids.len()];
            i += 1;
            black_box(hb.get_ast(id).unwrap())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_new_ast, bench_get_ast);
criterion_main!(benches);
