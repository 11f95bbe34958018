//! Build a CSR (compressed-sparse-row) *dual graph* of a mesh.
//
// Each element is a vertex; an undirected edge joins two elements sharing a
// face. The graph is read straight off `esuel`, so it is symmetric and has
// no loops whenever the topology is valid.
//
// Returned in METIS-ready CSR form:
//
// * `xadj[i] .. xadj[i+1]`   = neighbour list of element *i*
// * `adjncy`                 = concatenated neighbour elements
// * `vwgt[i]`                = vertex weight, default = 1

use serde::{Deserialize, Serialize};

use crate::mesh_error::MeshError;
use crate::topology::connectivity::Topology;
use crate::topology::mesh::Mesh2d;

/// CSR triple
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DualGraph {
    pub xadj: Vec<usize>,
    pub adjncy: Vec<usize>,
    pub vwgt: Vec<i32>, // METIS expects i32
}

impl DualGraph {
    pub fn n_vertices(&self) -> usize {
        self.xadj.len().saturating_sub(1)
    }

    /// Number of undirected edges.
    pub fn n_edges(&self) -> usize {
        self.adjncy.len() / 2
    }

    pub fn neighbors(&self, v: usize) -> &[usize] {
        &self.adjncy[self.xadj[v]..self.xadj[v + 1]]
    }

    pub fn degree(&self, v: usize) -> usize {
        self.xadj[v + 1] - self.xadj[v]
    }
}

/// Dual graph of a topology, neighbours in local-face order.
pub fn dual_graph(topology: &Topology) -> DualGraph {
    let n = topology.n_elems();
    let mut xadj = Vec::with_capacity(n + 1);
    let mut adjncy = Vec::with_capacity(2 * topology.n_interior_faces());
    xadj.push(0);
    for e in 0..n {
        adjncy.extend(topology.neighbors(e).iter().filter_map(|nb| nb.element()));
        xadj.push(adjncy.len());
    }
    DualGraph {
        xadj,
        adjncy,
        vwgt: vec![1; n],
    }
}

/// Dual graph of a mesh whose topology has been computed.
pub fn build_dual(mesh: &Mesh2d) -> Result<DualGraph, MeshError> {
    Ok(dual_graph(mesh.topology()?))
}
