use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use fvmesh::algs::distribute::restrict;
use fvmesh::algs::meshgen::{StructuredCell, rectangle_mesh};
use fvmesh::algs::communicator::ParallelContext;
use fvmesh::partitioning::trivial_partition;
use fvmesh::topology::connectivity::build_topology;

fn bench_topology(c: &mut Criterion) {
    let mut group = c.benchmark_group("topology");

    for &n in &[32usize, 128, 256] {
        let mesh = rectangle_mesh(n, n, [0.0, 0.0], [1.0, 1.0], StructuredCell::Triangle).unwrap();
        group.bench_with_input(BenchmarkId::new("build_topology", n), &mesh, |b, mesh| {
            b.iter(|| build_topology(mesh).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("preprocess", n), &mesh, |b, mesh| {
            b.iter(|| {
                let mut m = mesh.clone();
                m.preprocess().unwrap();
                m
            });
        });
    }

    group.finish();
}

fn bench_restrict(c: &mut Criterion) {
    let mut group = c.benchmark_group("restrict");

    for &n_parts in &[2usize, 8, 32] {
        let mut global =
            rectangle_mesh(128, 128, [0.0, 0.0], [1.0, 1.0], StructuredCell::Quadrilateral).unwrap();
        global.preprocess().unwrap();
        let partition = trivial_partition(global.n_elems(), n_parts).unwrap();
        let ctx = ParallelContext::new(n_parts / 2, n_parts).unwrap();
        group.bench_with_input(
            BenchmarkId::new("middle_rank", n_parts),
            &(global, partition),
            |b, (global, partition)| {
                b.iter(|| restrict(global, partition, ctx).unwrap());
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_topology, bench_restrict);
criterion_main!(benches);
