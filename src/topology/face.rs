use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use super::vertex::VertexId;

/// An oriented triangle.
///
/// The stored vertex order records the winding, but equality, hashing and
/// ordering ignore it: two faces over the same vertex set are the same
/// face, whichever side they were reached from.
#[derive(Debug, Clone, Copy)]
pub struct Face {
    vertices: [VertexId; 3],
}

impl Face {
    /// Creates a face from three vertices in winding order.
    #[must_use]
    pub fn new(a: VertexId, b: VertexId, c: VertexId) -> Self {
        Self { vertices: [a, b, c] }
    }

    /// The vertices in winding order.
    #[must_use]
    pub fn vertices(&self) -> [VertexId; 3] {
        self.vertices
    }

    /// The three directed edges of the face, in winding order.
    #[must_use]
    pub fn edges(&self) -> [(VertexId, VertexId); 3] {
        let [a, b, c] = self.vertices;
        [(a, b), (b, c), (c, a)]
    }

    /// The vertex opposite the given edge, ignoring edge direction.
    ///
    /// Returns `None` if either endpoint does not belong to this face.
    #[must_use]
    pub fn apex(&self, edge: (VertexId, VertexId)) -> Option<VertexId> {
        if !self.contains(edge.0) || !self.contains(edge.1) || edge.0 == edge.1 {
            return None;
        }
        self.vertices
            .into_iter()
            .find(|&v| v != edge.0 && v != edge.1)
    }

    /// Whether the vertex belongs to this face.
    #[must_use]
    pub fn contains(&self, v: VertexId) -> bool {
        self.vertices.contains(&v)
    }

    fn sorted(&self) -> [VertexId; 3] {
        let mut sorted = self.vertices;
        sorted.sort_unstable();
        sorted
    }
}

impl PartialEq for Face {
    fn eq(&self, other: &Self) -> bool {
        self.sorted() == other.sorted()
    }
}

impl Eq for Face {}

impl Hash for Face {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sorted().hash(state);
    }
}

impl PartialOrd for Face {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Face {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sorted().cmp(&other.sorted())
    }
}
