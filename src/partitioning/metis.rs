//! METIS backend for the external-graph strategy.

use super::GraphPartitioner;
use crate::algs::dual_graph::DualGraph;
use crate::mesh_error::MeshError;

/// k-way METIS partitioning of the element dual graph.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetisPartitioner;

fn to_idx(v: usize) -> Result<metis::Idx, MeshError> {
    metis::Idx::try_from(v)
        .map_err(|_| MeshError::Configuration(format!("{v} does not fit a METIS index")))
}

impl GraphPartitioner for MetisPartitioner {
    fn partition_graph(&self, graph: &DualGraph, n_parts: usize) -> Result<Vec<usize>, MeshError> {
        let n = graph.n_vertices();
        // METIS rejects a single part
        if n_parts == 1 {
            return Ok(vec![0; n]);
        }
        let xadj = graph
            .xadj
            .iter()
            .map(|&u| to_idx(u))
            .collect::<Result<Vec<_>, _>>()?;
        let adjncy = graph
            .adjncy
            .iter()
            .map(|&v| to_idx(v))
            .collect::<Result<Vec<_>, _>>()?;
        let vwgt: Vec<metis::Idx> = graph.vwgt.iter().map(|&w| metis::Idx::from(w)).collect();
        let mut part: Vec<metis::Idx> = vec![0; n];

        metis::Graph::new(1, to_idx(n_parts)?, &xadj, &adjncy)
            .map_err(|e| MeshError::Configuration(format!("METIS rejected the dual graph: {e}")))?
            .set_vwgt(&vwgt)
            .part_kway(&mut part)
            .map_err(|e| MeshError::Configuration(format!("METIS failed: {e}")))?;

        part.into_iter()
            .map(|p| {
                usize::try_from(p)
                    .map_err(|_| MeshError::Configuration(format!("METIS returned part {p}")))
            })
            .collect()
    }
}
