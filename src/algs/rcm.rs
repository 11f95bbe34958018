//! Reverse Cuthill-McKee (RCM) cell reordering.
//!
//! Works on the element dual graph. Each connected component is started
//! from a pseudo-peripheral vertex (repeated BFS, George & Liu), levels
//! are visited with neighbours in increasing degree, and the final
//! Cuthill-McKee order is reversed.

use std::collections::VecDeque;

use crate::algs::dual_graph::{DualGraph, build_dual};
use crate::mesh_error::MeshError;
use crate::topology::mesh::Mesh2d;

/// BFS levels from `root` over unvisited vertices; the last level is the
/// farthest one.
fn level_structure(graph: &DualGraph, root: usize, visited: &[bool]) -> Vec<Vec<usize>> {
    let mut seen = visited.to_vec();
    seen[root] = true;
    let mut levels = vec![vec![root]];
    loop {
        let mut next = Vec::new();
        for &u in levels.last().map(Vec::as_slice).unwrap_or_default() {
            for &v in graph.neighbors(u) {
                if !seen[v] {
                    seen[v] = true;
                    next.push(v);
                }
            }
        }
        if next.is_empty() {
            return levels;
        }
        levels.push(next);
    }
}

fn pseudo_peripheral_root(graph: &DualGraph, start: usize, visited: &[bool]) -> usize {
    let mut root = start;
    let mut levels = level_structure(graph, root, visited);
    loop {
        let Some(candidate) = levels
            .last()
            .and_then(|last| last.iter().copied().min_by_key(|&v| (graph.degree(v), v)))
        else {
            return root;
        };
        let candidate_levels = level_structure(graph, candidate, visited);
        if candidate_levels.len() <= levels.len() {
            return root;
        }
        root = candidate;
        levels = candidate_levels;
    }
}

/// RCM permutation of the graph vertices: `perm[new] = old`.
pub fn rcm_ordering(graph: &DualGraph) -> Vec<usize> {
    let n = graph.n_vertices();
    let mut order = Vec::with_capacity(n);
    let mut visited = vec![false; n];
    let mut by_degree: Vec<usize> = (0..n).collect();
    by_degree.sort_by_key(|&v| (graph.degree(v), v));

    for &start in &by_degree {
        if visited[start] {
            continue;
        }
        let root = pseudo_peripheral_root(graph, start, &visited);
        visited[root] = true;
        let mut queue = VecDeque::from([root]);
        while let Some(u) = queue.pop_front() {
            order.push(u);
            let mut next: Vec<usize> = graph
                .neighbors(u)
                .iter()
                .copied()
                .filter(|&v| !visited[v])
                .collect();
            next.sort_by_key(|&v| (graph.degree(v), v));
            next.dedup();
            for v in next {
                visited[v] = true;
                queue.push_back(v);
            }
        }
    }
    order.reverse();
    order
}

/// Largest `|new(u) - new(v)|` over the graph edges under `perm`
/// (`perm[new] = old`).
pub fn bandwidth(graph: &DualGraph, perm: &[usize]) -> usize {
    let mut new_of = vec![0; perm.len()];
    for (new, &old) in perm.iter().enumerate() {
        new_of[old] = new;
    }
    (0..graph.n_vertices())
        .flat_map(|u| graph.neighbors(u).iter().map(move |&v| (u, v)))
        .map(|(u, v)| new_of[u].abs_diff(new_of[v]))
        .max()
        .unwrap_or(0)
}

/// Renumber the cells of `mesh` in RCM order and return the permutation.
pub fn reorder_rcm(mesh: &mut Mesh2d) -> Result<Vec<usize>, MeshError> {
    if !mesh.has_topology() {
        mesh.compute_topological()?;
    }
    let graph = build_dual(mesh)?;
    let perm = rcm_ordering(&graph);
    log::debug!(
        "RCM: bandwidth {} -> {}",
        bandwidth(&graph, &(0..perm.len()).collect::<Vec<_>>()),
        bandwidth(&graph, &perm)
    );
    mesh.reorder_cells(&perm)?;
    Ok(perm)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_graph(order: &[usize]) -> DualGraph {
        // vertices joined in the sequence given by `order`
        let n = order.len();
        let mut adj = vec![Vec::new(); n];
        for w in order.windows(2) {
            adj[w[0]].push(w[1]);
            adj[w[1]].push(w[0]);
        }
        let mut xadj = vec![0];
        let mut adjncy = Vec::new();
        for row in adj {
            adjncy.extend(row);
            xadj.push(adjncy.len());
        }
        DualGraph {
            xadj,
            adjncy,
            vwgt: vec![1; n],
        }
    }

    #[test]
    fn scrambled_path_gets_bandwidth_one() {
        let g = path_graph(&[3, 0, 5, 1, 4, 2]);
        let identity: Vec<usize> = (0..6).collect();
        assert!(bandwidth(&g, &identity) > 1);
        let perm = rcm_ordering(&g);
        assert_eq!(bandwidth(&g, &perm), 1);
    }

    #[test]
    fn disconnected_components_are_all_ordered() {
        let mut g = path_graph(&[0, 1, 2]);
        // isolated vertex 3
        g.xadj.push(g.adjncy.len());
        g.vwgt.push(1);
        let mut perm = rcm_ordering(&g);
        perm.sort_unstable();
        assert_eq!(perm, vec![0, 1, 2, 3]);
    }
}
