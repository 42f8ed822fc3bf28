//! Indexing throughput benchmarks.
//!
//! Compares sequential and parallel jobs over a generated workspace, and
//! the in-memory store against SQLite.
//!
//! Run with: cargo bench --bench indexing_bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use symdex::{
    FilesystemFileListProvider, IndexQueryAgent, Indexer, InMemoryStore, RecordStore,
    SqliteStore,
};
use tempfile::TempDir;

/// Write `files` modules, each declaring an interface, two classes
/// implementing the previous module's interface, and a few functions.
fn generate_workspace(root: &Path, files: usize) {
    for i in 0..files {
        let mut source = format!("export interface Service{i} {{ start(): void; name: string }}\n");
        let parent = if i == 0 { i } else { i - 1 };
        for variant in ["Local", "Remote"] {
            source.push_str(&format!(
                "export class {variant}Service{i} implements Service{parent} {{\n  name = '{variant}';\n  start() {{}}\n}}\n"
            ));
        }
        for f in 0..4 {
            source.push_str(&format!("export function helper{i}_{f}() {{ return {f}; }}\n"));
        }
        fs::write(root.join(format!("module_{i:04}.ts")), source).unwrap();
    }
}

fn run_job(store: Arc<dyn RecordStore>, root: &Path, parallel: bool) {
    let provider = FilesystemFileListProvider::new(root).ignore_freshness();
    let indexer = Indexer::new(store, Box::new(provider));
    let report = indexer
        .get_job(None)
        .unwrap()
        .parallel(parallel)
        .run()
        .unwrap();
    black_box(report);
}

fn benchmark_index_job(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_job");
    group.sample_size(10);

    for files in [50usize, 200] {
        let temp_dir = TempDir::new().unwrap();
        generate_workspace(temp_dir.path(), files);

        group.bench_with_input(BenchmarkId::new("sequential", files), &files, |b, _| {
            b.iter(|| run_job(Arc::new(InMemoryStore::new()), temp_dir.path(), false))
        });

        group.bench_with_input(BenchmarkId::new("parallel", files), &files, |b, _| {
            b.iter(|| run_job(Arc::new(InMemoryStore::new()), temp_dir.path(), true))
        });

        group.bench_with_input(BenchmarkId::new("sqlite", files), &files, |b, _| {
            b.iter(|| {
                let db_dir = TempDir::new().unwrap();
                let store = SqliteStore::open(&db_dir.path().join("bench.db")).unwrap();
                run_job(Arc::new(store), temp_dir.path(), true)
            })
        });
    }

    group.finish();
}

fn benchmark_queries(c: &mut Criterion) {
    let temp_dir = TempDir::new().unwrap();
    generate_workspace(temp_dir.path(), 200);
    let store: Arc<dyn RecordStore> = Arc::new(InMemoryStore::new());
    run_job(Arc::clone(&store), temp_dir.path(), false);
    let agent = IndexQueryAgent::new(store);

    c.bench_function("all_implementations_chain", |b| {
        b.iter(|| black_box(agent.class().all_implementations("Service0").unwrap()))
    });

    c.bench_function("member_lookup", |b| {
        b.iter(|| black_box(agent.member("method#start").unwrap()))
    });
}

criterion_group!(benches, benchmark_index_job, benchmark_queries);
criterion_main!(benches);
