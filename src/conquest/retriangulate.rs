use std::collections::BTreeMap;

use crate::error::ConquestError;
use crate::topology::{Gate, MeshTopology, VertexId};

/// Plus/Minus label carried by boundary vertices.
///
/// Assigned once a vertex enters the active boundary ring; it persists
/// for the lifetime of the pass's retriangulator. The labels make hole
/// retriangulation a pure function of the gate tags, the valence and the
/// ring order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum RetriangulationTag {
    /// Not yet tagged.
    #[default]
    Default,
    /// `+` tag.
    Plus,
    /// `-` tag.
    Minus,
}

impl RetriangulationTag {
    /// The alternate tag. `Default` has no opposite and maps to itself.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Plus => Self::Minus,
            Self::Minus => Self::Plus,
            Self::Default => Self::Default,
        }
    }
}

/// Closes the polygonal hole left by a vertex removal.
///
/// The triangulation is table-driven: the diagonal set depends only on
/// the gate tags, the valence and the ring order, never on vertex
/// positions, so an encoder and a decoder presented with the same inputs
/// produce bit-identical connectivity.
#[derive(Debug, Default)]
pub struct Retriangulator {
    tags: BTreeMap<VertexId, RetriangulationTag>,
}

impl Retriangulator {
    /// Creates a retriangulator with no tags assigned.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The tag currently carried by a vertex.
    #[must_use]
    pub fn tag(&self, v: VertexId) -> RetriangulationTag {
        self.tags.get(&v).copied().unwrap_or_default()
    }

    /// Assigns a tag, overwriting any previous one. Used to tag the seed
    /// gate's endpoints.
    pub fn set_tag(&mut self, v: VertexId, tag: RetriangulationTag) {
        self.tags.insert(v, tag);
    }

    /// All assigned tags, in vertex order.
    #[must_use]
    pub fn tags(&self) -> &BTreeMap<VertexId, RetriangulationTag> {
        &self.tags
    }

    /// Index pairs into the boundary ring of the diagonals the table adds
    /// for this tag pair and valence: `valence - 3` of them.
    ///
    /// Exposed separately from [`Self::retriangulate`] so the conquest
    /// engine can reject a removal whose diagonals would duplicate
    /// existing edges, and so refinement can retire exactly these edges.
    ///
    /// # Errors
    ///
    /// Returns [`ConquestError::ValenceOutOfRange`] outside `[3, 6]`.
    pub fn planned_diagonals(
        left_tag: RetriangulationTag,
        right_tag: RetriangulationTag,
        valence: u8,
    ) -> Result<Vec<(usize, usize)>, ConquestError> {
        if !(3..=6).contains(&valence) {
            return Err(ConquestError::ValenceOutOfRange(valence));
        }
        let v = usize::from(valence);
        let apex = fan_apex(left_tag, right_tag);
        Ok((2..v - 1).map(|k| (apex, (apex + k) % v)).collect())
    }

    /// Removes the gate's front vertex and closes the resulting hole.
    ///
    /// `ring` is the ordered boundary of the patch from
    /// [`super::Patch::surrounding_vertices`]; `ring[0]` and `ring[1]`
    /// are the gate's left and right edge vertices. Interior ring
    /// vertices still carrying the `Default` tag are tagged by
    /// alternation first, then the table adds `valence - 3` diagonals and
    /// orients the `valence - 2` new triangles consistently with the
    /// ring.
    ///
    /// # Errors
    ///
    /// Returns [`ConquestError::UntaggedGate`] when a gate edge vertex
    /// carries no tag, and [`ConquestError::ValenceOutOfRange`] when the
    /// ring length falls outside `[3, 6]`.
    pub fn retriangulate(
        &mut self,
        mesh: &mut MeshTopology,
        gate: Gate,
        ring: &[VertexId],
    ) -> Result<(), ConquestError> {
        let valence =
            u8::try_from(ring.len()).map_err(|_| ConquestError::ValenceOutOfRange(u8::MAX))?;
        if !(3..=6).contains(&valence) {
            return Err(ConquestError::ValenceOutOfRange(valence));
        }

        let left_tag = self.tag(gate.edge.0);
        let right_tag = self.tag(gate.edge.1);
        if left_tag == RetriangulationTag::Default || right_tag == RetriangulationTag::Default {
            return Err(ConquestError::UntaggedGate);
        }

        self.propagate_tags(ring, left_tag, right_tag, valence);

        mesh.remove_vertex_forced(gate.front);

        let v = usize::from(valence);
        let apex = fan_apex(left_tag, right_tag);
        for (i, j) in Self::planned_diagonals(left_tag, right_tag, valence)? {
            mesh.add_edge(ring[i], ring[j]);
        }
        for [a, b, c] in fan_triangles(v, apex) {
            mesh.set_orientation((ring[a], ring[b]), ring[c]);
        }
        Ok(())
    }

    /// Alternating tag assignment over the interior ring vertices.
    ///
    /// Alternation is seeded from the right tag. On odd valences (3, 5)
    /// with unequal gate tags, a computed `Plus` start flips to `Minus`;
    /// this parity correction keeps the Minus-priority rule independent
    /// of which endpoint the traversal entered from. Already-tagged
    /// vertices are never overwritten, so re-entering a ring from a
    /// neighboring patch is idempotent.
    fn propagate_tags(
        &mut self,
        ring: &[VertexId],
        left_tag: RetriangulationTag,
        right_tag: RetriangulationTag,
        valence: u8,
    ) {
        let mut current = right_tag;
        if matches!(valence, 3 | 5)
            && left_tag != right_tag
            && current == RetriangulationTag::Plus
        {
            current = RetriangulationTag::Minus;
        }
        for &v in &ring[2..] {
            current = current.opposite();
            if self.tag(v) == RetriangulationTag::Default {
                self.tags.insert(v, current);
            }
        }
    }
}

/// Ring index of the fan apex for a tag pair.
///
/// The Minus side wins the fan; a tie falls to the right side.
fn fan_apex(left_tag: RetriangulationTag, right_tag: RetriangulationTag) -> usize {
    use RetriangulationTag::{Default, Minus, Plus};
    match (left_tag, right_tag) {
        (Minus, Plus) => 0,
        (Plus, Minus) | (Plus, Plus) | (Minus, Minus) => 1,
        // untagged gates are rejected before the table is consulted
        (Default, _) | (_, Default) => 1,
    }
}

/// The `valence - 2` triangles of a fan over the ring, as ring indices in
/// cyclic (winding-preserving) order.
fn fan_triangles(valence: usize, apex: usize) -> Vec<[usize; 3]> {
    (1..valence - 1)
        .map(|k| [apex, (apex + k) % valence, (apex + k + 1) % valence])
        .collect()
}
