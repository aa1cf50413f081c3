use super::face::Face;
use super::vertex::VertexId;

/// The work item of the conquest traversal.
///
/// The edge is already conquered; `front` is the unconquered apex of the
/// one remaining triangle using it. By convention the front vertex is the
/// left apex of the directed edge `(left, right)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Gate {
    /// The conquered edge, as `(left, right)`.
    pub edge: (VertexId, VertexId),
    /// The unconquered apex in front of the edge.
    pub front: VertexId,
}

impl Gate {
    /// Creates a gate from an oriented edge and its front vertex.
    #[must_use]
    pub fn new(edge: (VertexId, VertexId), front: VertexId) -> Self {
        Self { edge, front }
    }

    /// The triangle spanned by the gate edge and its front vertex.
    #[must_use]
    pub fn face(&self) -> Face {
        Face::new(self.edge.0, self.edge.1, self.front)
    }
}
