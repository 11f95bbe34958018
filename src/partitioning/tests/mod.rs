use super::*;
use crate::algs::meshgen::{StructuredCell, rectangle_mesh};
#[path = "partition_property_tests.rs"]
mod partition_property_tests;

fn strip(n: usize) -> Mesh2d {
    let mut mesh =
        rectangle_mesh(n, 1, [0.0, 0.0], [n as f64, 1.0], StructuredCell::Quadrilateral).unwrap();
    mesh.compute_topological().unwrap();
    mesh
}

#[test]
fn remainder_goes_to_last_rank() {
    let p = trivial_partition(11, 3).unwrap();
    assert_eq!(p.counts(), vec![3, 3, 5]);
    assert_eq!(p.elements_of(2).collect::<Vec<_>>(), (6..11).collect::<Vec<_>>());
}

#[test]
fn more_processes_than_elements_fails_before_assigning() {
    let mesh = rectangle_mesh(3, 1, [0.0, 0.0], [3.0, 1.0], StructuredCell::Quadrilateral).unwrap();
    let err = TrivialPartitioner.assign(&mesh, 5).unwrap_err();
    assert_eq!(err, MeshError::TooFewElements { n_elems: 3, n_parts: 5 });
    assert_eq!(err.kind(), crate::mesh_error::ErrorKind::Configuration);
    assert_eq!(trivial_partition(3, 0).unwrap_err(), MeshError::ZeroProcesses);
}

#[test]
fn out_of_range_rank_is_rejected() {
    let err = ElementPartition::new(vec![0, 1, 2], 2).unwrap_err();
    assert_eq!(
        err,
        MeshError::RankOutsidePartition { elem: 2, rank: 2, n_parts: 2 }
    );
}

#[test]
fn precomputed_backend_is_validated() {
    let mesh = strip(4);
    let ok = ExternalGraphPartitioner::new(PrecomputedPartition::new(vec![1, 1, 0, 0]));
    let p = ok.assign(&mesh, 2).unwrap();
    assert_eq!(p.ranks(), &[1, 1, 0, 0]);
    assert_eq!(edge_cut(mesh.topology().unwrap(), &p), 1);

    let short = ExternalGraphPartitioner::new(PrecomputedPartition::new(vec![0, 1]));
    assert_eq!(
        short.assign(&mesh, 2).unwrap_err(),
        MeshError::PartitionLengthMismatch { expected: 4, got: 2 }
    );

    let wide = ExternalGraphPartitioner::new(PrecomputedPartition::new(vec![0, 1, 2, 3]));
    assert!(matches!(
        wide.assign(&mesh, 2).unwrap_err(),
        MeshError::RankOutsidePartition { elem: 2, .. }
    ));
}

#[test]
fn external_graph_needs_topology() {
    let mesh = rectangle_mesh(4, 1, [0.0, 0.0], [4.0, 1.0], StructuredCell::Quadrilateral).unwrap();
    let p = ExternalGraphPartitioner::new(PrecomputedPartition::new(vec![0; 4]));
    assert!(matches!(p.assign(&mesh, 1), Err(MeshError::NotComputed(_))));
}

#[test]
fn strategy_dispatch() {
    let mesh = strip(6);
    let trivial = partitioner_for(PartitionStrategy::Trivial, None).unwrap();
    assert_eq!(trivial.assign(&mesh, 2).unwrap().ranks(), &[0, 0, 0, 1, 1, 1]);

    let backend: Box<dyn GraphPartitioner> =
        Box::new(PrecomputedPartition::new(vec![0, 1, 0, 1, 0, 1]));
    let external = partitioner_for(PartitionStrategy::ExternalGraph, Some(backend)).unwrap();
    let p = external.assign(&mesh, 2).unwrap();
    assert_eq!(edge_cut(mesh.topology().unwrap(), &p), 5);
    assert_eq!(imbalance(&p), 1.0);

    #[cfg(not(feature = "metis-support"))]
    assert_eq!(
        partitioner_for(PartitionStrategy::ExternalGraph, None).err(),
        Some(MeshError::MissingGraphPartitioner)
    );
}
