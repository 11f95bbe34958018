//! Cell type metadata for mesh elements.
//!
//! Only linear 2D cells are supported. The local numbering convention is the
//! one every other module relies on: local face `j` of a cell runs from local
//! node `j` to local node `(j + 1) % n_faces`.

use serde::{Deserialize, Serialize};

/// Largest number of nodes (and faces) of any supported cell.
pub const MAX_NODES: usize = 4;

/// Number of points defining a face.
pub const NODES_PER_FACE: usize = 2;

/// Linear 2D cell kinds.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum CellType {
    /// 3-node triangle.
    #[default]
    Triangle,
    /// 4-node quadrilateral.
    Quadrilateral,
}

impl CellType {
    /// Cell type for a node count, if supported.
    pub fn from_node_count(n: usize) -> Option<Self> {
        match n {
            3 => Some(CellType::Triangle),
            4 => Some(CellType::Quadrilateral),
            _ => None,
        }
    }

    /// Number of nodes of the cell.
    pub fn n_nodes(self) -> usize {
        match self {
            CellType::Triangle => 3,
            CellType::Quadrilateral => 4,
        }
    }

    /// Number of faces bounding the cell; equal to the node count for linear cells.
    pub fn n_faces(self) -> usize {
        self.n_nodes()
    }

    /// Local node indices of local face `face`.
    ///
    /// # Panics
    /// Panics if `face >= self.n_faces()`.
    pub fn face_nodes(self, face: usize) -> [usize; NODES_PER_FACE] {
        let n = self.n_faces();
        assert!(face < n, "face {face} out of range for {self:?}");
        [face, (face + 1) % n]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_nodes_wrap_around() {
        assert_eq!(CellType::Triangle.face_nodes(2), [2, 0]);
        assert_eq!(CellType::Quadrilateral.face_nodes(3), [3, 0]);
        assert_eq!(CellType::Quadrilateral.face_nodes(1), [1, 2]);
    }

    #[test]
    fn node_counts_round_trip() {
        for ct in [CellType::Triangle, CellType::Quadrilateral] {
            assert_eq!(CellType::from_node_count(ct.n_nodes()), Some(ct));
        }
        assert_eq!(CellType::from_node_count(5), None);
    }
}
