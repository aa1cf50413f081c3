use crate::error::{Result, TopologyError};
use crate::topology::MeshTopology;

use super::retriangulate::Retriangulator;
use super::RemovalEvent;

/// Reverses one recorded removal: retires the diagonals the table added,
/// reinserts the center vertex and rebuilds its star.
///
/// The diagonals are recomputed from the event's tags and valence through
/// the same table the encoder used, so no diagonal list needs to travel
/// with the event. Events must be replayed in reverse order of recording;
/// the center's position still lives in the mesh arena.
///
/// # Errors
///
/// Returns [`TopologyError::VertexNotFound`] when the center was never
/// part of this mesh, and propagates
/// [`crate::error::ConquestError::ValenceOutOfRange`] from the table.
pub fn reinsert(mesh: &mut MeshTopology, event: &RemovalEvent) -> Result<()> {
    let diagonals =
        Retriangulator::planned_diagonals(event.left_tag, event.right_tag, event.valence)?;
    for (i, j) in diagonals {
        mesh.remove_edge_forced(event.ring[i], event.ring[j]);
    }

    if !mesh.restore_vertex(event.center) {
        return Err(TopologyError::VertexNotFound.into());
    }
    for &v in &event.ring {
        mesh.add_edge(event.center, v);
    }
    for i in 0..event.ring.len() {
        let a = event.ring[i];
        let b = event.ring[(i + 1) % event.ring.len()];
        mesh.set_orientation((a, b), event.center);
    }
    Ok(())
}
