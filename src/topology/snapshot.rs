use std::collections::{BTreeMap, BTreeSet};

use super::vertex::VertexId;

/// A directed edge, used as the key of the orientation map.
pub type DirectedEdge = (VertexId, VertexId);

/// Left apexes of a directed edge and of its reverse.
///
/// The first element is the third vertex of the triangle on the left of
/// `from -> to`, the second the third vertex of the triangle on the left
/// of `to -> from`. Either side may be unoriented.
pub type ApexPair = (Option<VertexId>, Option<VertexId>);

/// One snapshot of the mesh connectivity.
///
/// Both maps are ordered so that every iteration over them (seed search,
/// diffs, export) is deterministic, which the bit-exact encoder/decoder
/// contract relies on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopologyState {
    /// Symmetric adjacency: `u ∈ adjacency[v]` iff `v ∈ adjacency[u]`.
    pub(crate) adjacency: BTreeMap<VertexId, BTreeSet<VertexId>>,
    /// Apex pair per directed edge. The entries for `(a, b)` and `(b, a)`
    /// always hold mutually swapped pairs.
    pub(crate) orientation: BTreeMap<DirectedEdge, ApexPair>,
}

/// The edit script turning a committed coarse state back into the finer
/// state committed before it.
///
/// Replayed by a decoder as a refinement step: retire the listed diagonal
/// edges, then reinsert the listed vertices with the adjacency they had.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefinementDiff {
    /// Vertices absent from the coarse state, with their finer adjacency.
    pub vertices_to_add: BTreeMap<VertexId, BTreeSet<VertexId>>,
    /// Directed edges present only in the coarse state (the diagonals the
    /// retriangulation introduced), one entry per undirected edge.
    pub edges_to_remove: BTreeMap<DirectedEdge, ApexPair>,
}

impl RefinementDiff {
    /// Whether the two states were identical.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices_to_add.is_empty() && self.edges_to_remove.is_empty()
    }
}

impl TopologyState {
    /// Structural difference against the previously committed state.
    ///
    /// Precondition (documented, not enforced): `self` is a decimated
    /// subset of `previous`. Under that assumption the vertices missing
    /// here are reinsertions and the edges present only here are
    /// retriangulation diagonals; called outside of it, the result is
    /// well-formed but meaningless for replay.
    #[must_use]
    pub fn refinement_difference(&self, previous: &TopologyState) -> RefinementDiff {
        let mut diff = RefinementDiff::default();

        for (v, adjacency) in &previous.adjacency {
            if !self.adjacency.contains_key(v) {
                diff.vertices_to_add.insert(*v, adjacency.clone());
            }
        }

        for (edge, apexes) in &self.orientation {
            if previous.orientation.contains_key(edge) {
                continue;
            }
            let reversed = (edge.1, edge.0);
            if !diff.edges_to_remove.contains_key(&reversed) {
                diff.edges_to_remove.insert(*edge, *apexes);
            }
        }

        diff
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use slotmap::SlotMap;

    use super::super::vertex::VertexData;
    use super::*;
    use crate::math::Point3;

    fn ids(n: usize) -> Vec<VertexId> {
        let mut arena: SlotMap<VertexId, VertexData> = SlotMap::with_key();
        (0..n)
            .map(|_| arena.insert(VertexData::new(Point3::origin())))
            .collect()
    }

    #[test]
    fn difference_reports_missing_vertices_and_new_edges() {
        let v = ids(3);

        let mut fine = TopologyState::default();
        for &id in &v {
            fine.adjacency.insert(id, BTreeSet::new());
        }
        fine.adjacency
            .get_mut(&v[0])
            .unwrap()
            .extend([v[1], v[2]]);

        let mut coarse = fine.clone();
        coarse.adjacency.remove(&v[2]);
        coarse
            .orientation
            .insert((v[0], v[1]), (Some(v[2]), None));
        coarse
            .orientation
            .insert((v[1], v[0]), (None, Some(v[2])));

        let diff = coarse.refinement_difference(&fine);
        assert_eq!(diff.vertices_to_add.len(), 1);
        assert!(diff.vertices_to_add.contains_key(&v[2]));
        // one entry per undirected edge
        assert_eq!(diff.edges_to_remove.len(), 1);
        assert!(!diff.is_empty());
    }

    #[test]
    fn difference_of_identical_states_is_empty() {
        let state = TopologyState::default();
        assert!(state.refinement_difference(&state).is_empty());
    }
}
