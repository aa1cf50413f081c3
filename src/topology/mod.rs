pub mod face;
pub mod gate;
pub mod snapshot;
pub mod vertex;

pub use face::Face;
pub use gate::Gate;
pub use snapshot::{ApexPair, DirectedEdge, RefinementDiff, TopologyState};
pub use vertex::{VertexData, VertexId};

use std::collections::{BTreeSet, HashMap};

use slotmap::SlotMap;

use crate::error::TopologyError;
use crate::math::{lexicographic_order, position_key, Point3};

/// Oriented adjacency structure of a closed manifold triangle mesh.
///
/// Owns the vertex arena, the active connectivity state and a stack of
/// committed snapshots. Vertices reference each other via generational
/// IDs; all adjacency and orientation state lives here, never on the
/// vertices themselves.
///
/// A single traversal mutates one `MeshTopology` at a time; the structure
/// provides no internal locking.
#[derive(Debug)]
pub struct MeshTopology {
    vertices: SlotMap<VertexId, VertexData>,
    state: TopologyState,
    committed: Vec<TopologyState>,
}

impl Default for MeshTopology {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshTopology {
    /// Creates an empty mesh whose committed baseline is the empty state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            vertices: SlotMap::with_key(),
            state: TopologyState::default(),
            committed: vec![TopologyState::default()],
        }
    }

    /// Builds a mesh from vertex positions and triangle index triples,
    /// then re-baselines the snapshot stack on the loaded state.
    ///
    /// Positions with bit-identical coordinates unify to a single vertex.
    /// Each face contributes its three undirected edges and orients each
    /// directed edge toward the face's third vertex. Faces referencing
    /// out-of-range or repeated indices are skipped with a warning rather
    /// than rejecting the whole mesh.
    #[must_use]
    pub fn from_buffers(positions: &[Point3], faces: &[[usize; 3]]) -> Self {
        let mut mesh = Self::new();

        let mut by_position: HashMap<[u64; 3], VertexId> = HashMap::new();
        let mut ids = Vec::with_capacity(positions.len());
        for point in positions {
            let id = *by_position
                .entry(position_key(point))
                .or_insert_with(|| mesh.add_vertex(VertexData::new(*point)));
            ids.push(id);
        }

        for (n, face) in faces.iter().enumerate() {
            let [i, j, k] = *face;
            if i >= ids.len() || j >= ids.len() || k >= ids.len() {
                log::warn!("face {n} references a vertex index out of range, skipped");
                continue;
            }
            let (a, b, c) = (ids[i], ids[j], ids[k]);
            if a == b || b == c || c == a {
                log::warn!("face {n} is degenerate, skipped");
                continue;
            }
            mesh.add_edge(a, b);
            mesh.add_edge(b, c);
            mesh.add_edge(c, a);
            mesh.orient_triangle(a, b, c);
        }

        mesh.committed = vec![mesh.state.clone()];
        mesh
    }

    // --- Vertex operations ---

    /// Inserts a vertex and registers it in the adjacency map.
    pub fn add_vertex(&mut self, data: VertexData) -> VertexId {
        let id = self.vertices.insert(data);
        self.state.adjacency.insert(id, BTreeSet::new());
        id
    }

    /// Returns the vertex data, or an error if the ID was never allocated.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::VertexNotFound`] for an unknown ID.
    pub fn vertex(&self, id: VertexId) -> Result<&VertexData, TopologyError> {
        self.vertices.get(id).ok_or(TopologyError::VertexNotFound)
    }

    /// Whether the vertex is present in the active topology.
    ///
    /// A removed vertex keeps its arena data (a decoder needs the
    /// position to reinsert it) but drops out of the adjacency map.
    #[must_use]
    pub fn contains_vertex(&self, id: VertexId) -> bool {
        self.state.adjacency.contains_key(&id)
    }

    /// Number of vertices in the active topology.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.state.adjacency.len()
    }

    /// Number of edges incident to the vertex; 0 for an unknown vertex.
    #[must_use]
    pub fn valence(&self, id: VertexId) -> usize {
        self.state
            .adjacency
            .get(&id)
            .map_or(0, BTreeSet::len)
    }

    /// The vertices adjacent to `id`, in ID order.
    #[must_use]
    pub fn neighbors(&self, id: VertexId) -> Option<&BTreeSet<VertexId>> {
        self.state.adjacency.get(&id)
    }

    /// A vertex may be removed only while every neighbor has valence
    /// strictly above 3, so no neighbor drops below valence 3 afterwards.
    /// This is the sole manifold-safety predicate of the structure.
    #[must_use]
    pub fn can_remove_vertex(&self, id: VertexId) -> bool {
        match self.state.adjacency.get(&id) {
            Some(neighbors) => neighbors.iter().all(|&n| self.valence(n) > 3),
            None => false,
        }
    }

    /// Removes a vertex together with its incident edges and orientation
    /// entries. Refuses, returning `false`, unless
    /// [`Self::can_remove_vertex`] holds.
    pub fn remove_vertex(&mut self, id: VertexId) -> bool {
        if !self.can_remove_vertex(id) {
            return false;
        }
        self.remove_vertex_forced(id)
    }

    /// Unchecked removal, reserved for the retriangulator: the conquest
    /// engine has already validated the removal when this runs.
    pub(crate) fn remove_vertex_forced(&mut self, id: VertexId) -> bool {
        let Some(ring) = self.state.adjacency.remove(&id) else {
            return false;
        };

        for &n in &ring {
            if let Some(adjacency) = self.state.adjacency.get_mut(&n) {
                adjacency.remove(&id);
            }
            self.state.orientation.remove(&(id, n));
            self.state.orientation.remove(&(n, id));
        }

        // The removed vertex may linger as the apex of edges between its
        // former neighbors; clear those slots so no orientation entry
        // refers to a dead vertex.
        for &a in &ring {
            let Some(adjacency) = self.state.adjacency.get(&a) else {
                continue;
            };
            for &b in adjacency {
                if !ring.contains(&b) {
                    continue;
                }
                if let Some(pair) = self.state.orientation.get_mut(&(a, b)) {
                    if pair.0 == Some(id) {
                        pair.0 = None;
                    }
                    if pair.1 == Some(id) {
                        pair.1 = None;
                    }
                }
            }
        }

        true
    }

    /// Re-activates a vertex whose data still lives in the arena, with an
    /// empty adjacency. Used when replaying a refinement.
    pub(crate) fn restore_vertex(&mut self, id: VertexId) -> bool {
        if !self.vertices.contains_key(id) {
            return false;
        }
        self.state.adjacency.entry(id).or_default();
        true
    }

    // --- Edge operations ---

    /// Adds an undirected edge; silent no-op returning `false` when
    /// either endpoint is unknown. Orientation is set separately.
    pub fn add_edge(&mut self, a: VertexId, b: VertexId) -> bool {
        if !self.contains_vertex(a) || !self.contains_vertex(b) {
            return false;
        }
        if let Some(adjacency) = self.state.adjacency.get_mut(&a) {
            adjacency.insert(b);
        }
        if let Some(adjacency) = self.state.adjacency.get_mut(&b) {
            adjacency.insert(a);
        }
        true
    }

    /// Whether the undirected edge is present.
    #[must_use]
    pub fn has_edge(&self, a: VertexId, b: VertexId) -> bool {
        self.state
            .adjacency
            .get(&a)
            .is_some_and(|adjacency| adjacency.contains(&b))
    }

    /// An edge may be removed only while both endpoints keep valence
    /// strictly above 3.
    #[must_use]
    pub fn can_remove_edge(&self, a: VertexId, b: VertexId) -> bool {
        self.has_edge(a, b) && self.valence(a) > 3 && self.valence(b) > 3
    }

    /// Removes an undirected edge and its orientation entries. Refuses,
    /// returning `false`, unless [`Self::can_remove_edge`] holds.
    pub fn remove_edge(&mut self, a: VertexId, b: VertexId) -> bool {
        if !self.can_remove_edge(a, b) {
            return false;
        }
        self.remove_edge_forced(a, b)
    }

    /// Unchecked edge removal, used when replaying a refinement to retire
    /// the diagonals a retriangulation introduced.
    pub(crate) fn remove_edge_forced(&mut self, a: VertexId, b: VertexId) -> bool {
        if !self.has_edge(a, b) {
            return false;
        }
        self.state.orientation.remove(&(a, b));
        self.state.orientation.remove(&(b, a));
        if let Some(adjacency) = self.state.adjacency.get_mut(&a) {
            adjacency.remove(&b);
        }
        if let Some(adjacency) = self.state.adjacency.get_mut(&b) {
            adjacency.remove(&a);
        }
        true
    }

    // --- Orientation ---

    /// Establishes the triangle `(a, b, apex)` as the left face of the
    /// directed edge `(a, b)`, repairing the apex slots of all six
    /// directed edges of that triangle. The mirror face on the right of
    /// `(a, b)` keeps its apex. Returns `false` when any vertex is
    /// unknown.
    pub fn set_orientation(&mut self, edge: DirectedEdge, apex: VertexId) -> bool {
        let (a, b) = edge;
        if !self.contains_vertex(a) || !self.contains_vertex(b) || !self.contains_vertex(apex) {
            return false;
        }
        self.orient_triangle(a, b, apex);
        true
    }

    /// Records the triangle `(a, b, c)` in winding order: each of its
    /// three directed edges gets `c`/`a`/`b` as left apex, each reversed
    /// edge the same vertex as right apex. Opposite-side slots are
    /// preserved.
    fn orient_triangle(&mut self, a: VertexId, b: VertexId, c: VertexId) {
        let face = Face::new(a, b, c);
        for edge in face.edges() {
            if let Some(apex) = face.apex(edge) {
                self.set_left_apex(edge, apex);
            }
        }
    }

    fn set_left_apex(&mut self, edge: DirectedEdge, apex: VertexId) {
        self.state.orientation.entry(edge).or_default().0 = Some(apex);
        self.state
            .orientation
            .entry((edge.1, edge.0))
            .or_default()
            .1 = Some(apex);
    }

    /// Left and right apexes of a directed edge, `(None, None)` if the
    /// edge carries no orientation.
    #[must_use]
    pub fn get_oriented_vertices(&self, edge: DirectedEdge) -> ApexPair {
        self.state
            .orientation
            .get(&edge)
            .copied()
            .unwrap_or((None, None))
    }

    /// The faces on the left and right side of a directed edge, winding
    /// preserved.
    #[must_use]
    pub fn get_oriented_faces(&self, edge: DirectedEdge) -> (Option<Face>, Option<Face>) {
        let (left, right) = self.get_oriented_vertices(edge);
        (
            left.map(|apex| Face::new(edge.0, edge.1, apex)),
            right.map(|apex| Face::new(edge.1, edge.0, apex)),
        )
    }

    // --- Face / star queries ---

    /// All distinct faces incident to a vertex, recovered from the
    /// oriented edges toward its neighbors. Stops once `valence` faces
    /// are known.
    #[must_use]
    pub fn faces_around(&self, center: VertexId) -> BTreeSet<Face> {
        let Some(neighbors) = self.state.adjacency.get(&center) else {
            return BTreeSet::new();
        };
        let valence = neighbors.len();

        let mut faces = BTreeSet::new();
        for &n in neighbors {
            if faces.len() == valence {
                break;
            }
            let (left, right) = self.get_oriented_faces((center, n));
            if left.is_none() && right.is_none() {
                log::warn!("edge {:?} carries no orientation", (center, n));
                continue;
            }
            for face in [left, right].into_iter().flatten() {
                faces.insert(face);
            }
        }
        faces
    }

    // --- Seed selection ---

    /// First gate, in deterministic map order, whose front vertex is
    /// currently removable. `None` on an empty or unoriented mesh.
    #[must_use]
    pub fn find_seed_gate(&self) -> Option<Gate> {
        for (&v, neighbors) in &self.state.adjacency {
            for &n in neighbors {
                let (left, right) = self.get_oriented_vertices((v, n));
                if let Some(apex) = left {
                    if self.can_remove_vertex(apex) {
                        return Some(Gate::new((v, n), apex));
                    }
                }
                if let Some(apex) = right {
                    if self.can_remove_vertex(apex) {
                        return Some(Gate::new((n, v), apex));
                    }
                }
            }
        }
        None
    }

    // --- Transactions ---

    /// Commits the active state as a new snapshot and returns the edit
    /// script that replays the previous committed state from it.
    ///
    /// Snapshots are deep copies; a later [`Self::rollback`] never
    /// aliases the live state.
    pub fn commit(&mut self) -> RefinementDiff {
        let diff = match self.committed.last() {
            Some(previous) => self.state.refinement_difference(previous),
            None => RefinementDiff::default(),
        };
        self.committed.push(self.state.clone());
        diff
    }

    /// Restores the previously committed snapshot. Returns `false` when
    /// only the baseline remains; the baseline itself is never popped.
    pub fn rollback(&mut self) -> bool {
        if self.committed.len() <= 1 {
            return false;
        }
        self.committed.pop();
        if let Some(previous) = self.committed.last() {
            self.state = previous.clone();
        }
        true
    }

    // --- Export ---

    /// Vertex positions in lexicographic coordinate order plus faces as
    /// index triples into that order, winding preserved and deduplicated
    /// by unordered vertex set. This is the handoff format for the
    /// external file writer.
    #[must_use]
    pub fn export_vertices_and_faces(&self) -> (Vec<Point3>, Vec<[usize; 3]>) {
        let mut live: Vec<(Point3, VertexId)> = self
            .state
            .adjacency
            .keys()
            .filter_map(|&id| self.vertices.get(id).map(|data| (data.point, id)))
            .collect();
        live.sort_by(|(a, _), (b, _)| lexicographic_order(a, b));

        let index_of: HashMap<VertexId, usize> = live
            .iter()
            .enumerate()
            .map(|(i, &(_, id))| (id, i))
            .collect();

        let mut seen = BTreeSet::new();
        let mut faces = Vec::new();
        for &(_, id) in &live {
            for face in self.faces_around(id) {
                if !seen.insert(face) {
                    continue;
                }
                let [a, b, c] = face.vertices();
                if let (Some(&i), Some(&j), Some(&k)) =
                    (index_of.get(&a), index_of.get(&b), index_of.get(&c))
                {
                    faces.push([i, j, k]);
                }
            }
        }

        (live.into_iter().map(|(point, _)| point).collect(), faces)
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> &TopologyState {
        &self.state
    }
}
