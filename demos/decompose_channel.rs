// Decomposes a periodic channel into four local meshes, the way every rank
// of an SPMD run would, and prints what each rank ends up with.
//
// Run with `cargo run --example decompose_channel`.
use fvmesh::algs::meshgen::{BOUNDARY_X_MAX, BOUNDARY_X_MIN, StructuredCell, rectangle_mesh};
use fvmesh::partitioning::{edge_cut, imbalance, trivial_partition};
use fvmesh::prelude::*;

fn main() -> Result<(), MeshError> {
    let n_ranks = 4;
    let mut global = rectangle_mesh(16, 4, [0.0, 0.0], [4.0, 1.0], StructuredCell::Triangle)?;
    let config = DecompositionConfig {
        partitioner: PartitionStrategy::Trivial,
        periodic: Some(PeriodicConfig::new(BOUNDARY_X_MIN, Axis::X).with_partner(BOUNDARY_X_MAX)),
    };
    prepare_global(&mut global, &config)?;
    println!("global: {}", global.stats());

    let partition = trivial_partition(global.n_elems(), n_ranks)?;
    println!(
        "partition: edge cut {}, imbalance {:.3}",
        edge_cut(global.topology()?, &partition),
        imbalance(&partition)
    );

    let locals = decompose_all(&global, &partition)?;
    for local in &locals {
        println!(
            "rank {}: {} elements, {} points, {} boundary faces, {} connectivity faces to ranks {:?}, {} remote periodic faces",
            local.rank(),
            local.n_elems(),
            local.n_points(),
            local.n_bfaces(),
            local.n_conn_faces(),
            local.neighbor_ranks(),
            local.remote_periodic_faces().len()
        );
    }

    let consistent = check_partition_cover(&locals, &global)
        && check_cross_rank(&locals)
        && locals
            .iter()
            .all(|l| check_conn_faces(l, &global) && check_node_round_trip(l, &global));
    println!("consistent: {consistent}");
    Ok(())
}
