use std::collections::BTreeSet;

use crate::error::TopologyError;
use crate::topology::{Face, Gate, MeshTopology, VertexId};

/// The star of a vertex: the set of triangles incident to it.
///
/// A patch is derived data. It must be recomputed from the live topology
/// after every mutation and never cached across them.
#[derive(Debug, Clone)]
pub struct Patch {
    center: VertexId,
    faces: BTreeSet<Face>,
}

impl Patch {
    /// Collects the star of `center` from the current topology, or `None`
    /// when the vertex is not part of it.
    #[must_use]
    pub fn around(mesh: &MeshTopology, center: VertexId) -> Option<Self> {
        if !mesh.contains_vertex(center) {
            return None;
        }
        Some(Self {
            center,
            faces: mesh.faces_around(center),
        })
    }

    /// The vertex at the middle of the star.
    #[must_use]
    pub fn center(&self) -> VertexId {
        self.center
    }

    /// Number of faces in the star.
    #[must_use]
    pub fn valence(&self) -> usize {
        self.faces.len()
    }

    /// The faces of the star.
    #[must_use]
    pub fn faces(&self) -> &BTreeSet<Face> {
        &self.faces
    }

    /// The ordered boundary ring of the star, starting with the entry
    /// edge's endpoints and continuing in the direction of the ring.
    ///
    /// The walk consumes one face per step, always the face sharing the
    /// current boundary vertex and the center; it must end on the face
    /// that closes back onto the entry vertex. The returned ring has
    /// exactly `valence` entries.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::OpenStar`] when the star is not a simple
    /// closed fan: the entry face is missing, the walk dead-ends, a ring
    /// vertex repeats, or the last face does not close the loop. Callers
    /// treat this as a null patch, never as a crash.
    pub fn surrounding_vertices(
        &self,
        entry_edge: (VertexId, VertexId),
    ) -> Result<Vec<VertexId>, TopologyError> {
        let (left, right) = entry_edge;
        let entry_face = Face::new(left, right, self.center);
        if !self.faces.contains(&entry_face) {
            return Err(TopologyError::OpenStar);
        }

        let mut remaining = self.faces.clone();
        remaining.remove(&entry_face);

        let mut ring = vec![left, right];
        let mut current = right;
        while !remaining.is_empty() {
            let face = remaining
                .iter()
                .copied()
                .find(|f| f.contains(current) && f.contains(self.center))
                .ok_or(TopologyError::OpenStar)?;
            let next = face
                .apex((current, self.center))
                .ok_or(TopologyError::OpenStar)?;
            remaining.remove(&face);

            if remaining.is_empty() {
                // the last face must close the fan onto the entry vertex
                if next == left {
                    return Ok(ring);
                }
                return Err(TopologyError::OpenStar);
            }
            if ring.contains(&next) {
                return Err(TopologyError::OpenStar);
            }
            ring.push(next);
            current = next;
        }

        Err(TopologyError::OpenStar)
    }

    /// One gate per boundary ring edge other than the entry edge, each
    /// pointing at the apex of the face on the side away from the center:
    /// `valence - 1` gates for a closed star.
    ///
    /// `ring` must come from [`Self::surrounding_vertices`] on the same
    /// topology state.
    #[must_use]
    pub fn output_gates(&self, mesh: &MeshTopology, ring: &[VertexId]) -> Vec<Gate> {
        let mut gates = Vec::with_capacity(ring.len().saturating_sub(1));
        for i in 1..ring.len() {
            let a = ring[i];
            let b = ring[(i + 1) % ring.len()];
            if let Some(gate) = self.outward_gate(mesh, (a, b)) {
                gates.push(gate);
            }
        }
        gates
    }

    /// The gate across one ring edge, oriented so its front vertex is the
    /// left apex of the gate edge.
    fn outward_gate(&self, mesh: &MeshTopology, edge: (VertexId, VertexId)) -> Option<Gate> {
        let (left, right) = mesh.get_oriented_vertices(edge);
        if left == Some(self.center) {
            right.map(|apex| Gate::new((edge.1, edge.0), apex))
        } else if right == Some(self.center) {
            left.map(|apex| Gate::new(edge, apex))
        } else {
            None
        }
    }
}
