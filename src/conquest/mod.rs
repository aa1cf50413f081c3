pub mod patch;
pub mod refine;
pub mod retriangulate;

pub use patch::Patch;
pub use retriangulate::{RetriangulationTag, Retriangulator};

use std::collections::{BTreeMap, VecDeque};
use std::ops::RangeInclusive;

use crate::error::{ConquestError, Result};
use crate::topology::{Gate, MeshTopology, RefinementDiff, VertexId};

/// Valence range decimated by the first pass.
pub const DECIMATION_VALENCES: RangeInclusive<u8> = 3..=6;

/// Valence range decimated by the cleaning pass.
pub const CLEANING_VALENCES: RangeInclusive<u8> = 3..=3;

/// Per-vertex state during one conquest pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StateFlag {
    /// Not yet reached by the traversal.
    #[default]
    Free,
    /// Processed; part of the coarse mesh for this pass.
    Conquered,
}

/// One entry of the connectivity code stream.
///
/// The stream, replayed in order against the coarse mesh, is what lets a
/// decoder reproduce the traversal and reinsert every removed vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValenceCode {
    /// The gate's front vertex was removed; its patch had this valence.
    Valence(u8),
    /// Null patch: the frontier advanced without decimation.
    Null,
}

/// One vertex removal, in the form consumed by the external geometry
/// codec and by [`refine::reinsert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalEvent {
    /// The removed vertex.
    pub center: VertexId,
    /// Its boundary ring at removal time, gate edge first.
    pub ring: Vec<VertexId>,
    /// Ring length, 3 to 6.
    pub valence: u8,
    /// Tag of the gate's left edge vertex.
    pub left_tag: RetriangulationTag,
    /// Tag of the gate's right edge vertex.
    pub right_tag: RetriangulationTag,
}

/// Counters reported per pass, also on early termination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Gates popped from the queue.
    pub gates_processed: usize,
    /// Front vertices decimated.
    pub vertices_removed: usize,
    /// Gates that advanced the frontier without decimating.
    pub null_patches: usize,
}

/// Everything one conquest pass produces.
#[derive(Debug, Clone)]
pub struct PassOutcome {
    /// One code per popped gate, in traversal order.
    pub codes: Vec<ValenceCode>,
    /// The final tag assignment of the pass.
    pub tags: BTreeMap<VertexId, RetriangulationTag>,
    /// One event per removed vertex, in removal order.
    pub removals: Vec<RemovalEvent>,
    /// Pass counters.
    pub stats: PassStats,
}

/// Both passes of one decimation level plus the committed edit script.
#[derive(Debug, Clone)]
pub struct LevelOutcome {
    /// Outcome of the decimation pass (valences 3 to 6).
    pub decimation: PassOutcome,
    /// Outcome of the cleaning pass (valence 3 only).
    pub cleaning: PassOutcome,
    /// Edit script replaying the pre-level mesh from the coarse one.
    pub diff: RefinementDiff,
}

/// Mutable state scoped to a single conquest run. One context per pass;
/// nothing survives into the next pass.
#[derive(Debug, Default)]
struct ConquestContext {
    flags: BTreeMap<VertexId, StateFlag>,
    queue: VecDeque<Gate>,
    retriangulator: Retriangulator,
}

impl ConquestContext {
    fn flag(&self, v: VertexId) -> StateFlag {
        self.flags.get(&v).copied().unwrap_or_default()
    }

    fn conquer(&mut self, v: VertexId) {
        self.flags.insert(v, StateFlag::Conquered);
    }
}

/// Runs one conquest pass from `seed`, decimating front vertices whose
/// valence falls within `valences`.
///
/// The seed edge's vertices are tagged Minus (left) and Plus (right)
/// before the first gate is popped. Each popped gate emits exactly one
/// code: `Valence(v)` when its front vertex was removed and its hole
/// retriangulated, `Null` when the frontier advanced past it.
///
/// # Errors
///
/// Propagates retriangulation errors. A malformed star or a diagonal
/// conflict is not an error: both degrade to a null patch.
pub fn run_pass(
    mesh: &mut MeshTopology,
    seed: Gate,
    valences: &RangeInclusive<u8>,
) -> Result<PassOutcome> {
    let mut ctx = ConquestContext::default();
    ctx.retriangulator
        .set_tag(seed.edge.0, RetriangulationTag::Minus);
    ctx.retriangulator
        .set_tag(seed.edge.1, RetriangulationTag::Plus);
    ctx.queue.push_back(seed);

    let mut codes = Vec::new();
    let mut removals = Vec::new();
    let mut stats = PassStats::default();

    while let Some(gate) = ctx.queue.pop_front() {
        stats.gates_processed += 1;
        match try_decimate(mesh, &mut ctx, gate, valences)? {
            Some(event) => {
                codes.push(ValenceCode::Valence(event.valence));
                removals.push(event);
                stats.vertices_removed += 1;
            }
            None => {
                codes.push(ValenceCode::Null);
                stats.null_patches += 1;
                advance_frontier(mesh, &mut ctx, gate);
            }
        }
    }

    log::debug!(
        "conquest pass done: {} gates, {} removed, {} null patches",
        stats.gates_processed,
        stats.vertices_removed,
        stats.null_patches
    );

    Ok(PassOutcome {
        codes,
        tags: ctx.retriangulator.tags().clone(),
        removals,
        stats,
    })
}

/// Runs one full decimation level: a decimation pass followed by a
/// cleaning pass re-seeded from a surviving edge adjacent to the original
/// seed, then commits the coarse state.
///
/// Every `StateFlag` resets to Free between the passes by construction,
/// since each pass owns its context. RetriangulationTags are reset too:
/// the cleaning pass starts from a fresh tag state, keeping the two code
/// streams independent.
///
/// # Errors
///
/// Returns [`ConquestError::NoSeedGate`] when the mesh holds no removable
/// seed, and propagates pass errors.
pub fn run_level(mesh: &mut MeshTopology) -> Result<LevelOutcome> {
    let seed = mesh.find_seed_gate().ok_or(ConquestError::NoSeedGate)?;
    let decimation = run_pass(mesh, seed, &DECIMATION_VALENCES)?;

    let cleaning_seed = reseed_near(mesh, seed).ok_or(ConquestError::NoSeedGate)?;
    let cleaning = run_pass(mesh, cleaning_seed, &CLEANING_VALENCES)?;

    let diff = mesh.commit();
    Ok(LevelOutcome {
        decimation,
        cleaning,
        diff,
    })
}

/// Attempts to decimate the gate's front vertex. `None` means null patch.
fn try_decimate(
    mesh: &mut MeshTopology,
    ctx: &mut ConquestContext,
    gate: Gate,
    valences: &RangeInclusive<u8>,
) -> Result<Option<RemovalEvent>> {
    let front = gate.front;
    if ctx.flag(front) != StateFlag::Free {
        return Ok(None);
    }
    let Ok(valence) = u8::try_from(mesh.valence(front)) else {
        return Ok(None);
    };
    if !valences.contains(&valence) || !mesh.can_remove_vertex(front) {
        return Ok(None);
    }

    let Some(patch) = Patch::around(mesh, front) else {
        return Ok(None);
    };
    if patch.valence() != usize::from(valence) {
        // incomplete orientation information around the front vertex
        return Ok(None);
    }
    if !patch.faces().contains(&gate.face()) {
        // stale gate: an earlier removal destroyed its triangle
        return Ok(None);
    }
    let Ok(ring) = patch.surrounding_vertices(gate.edge) else {
        log::trace!("open star at {front:?}, null patch");
        return Ok(None);
    };

    let left_tag = ctx.retriangulator.tag(gate.edge.0);
    let right_tag = ctx.retriangulator.tag(gate.edge.1);
    if left_tag == RetriangulationTag::Default || right_tag == RetriangulationTag::Default {
        return Err(ConquestError::UntaggedGate.into());
    }

    // A diagonal that already exists as an edge would fold the hole onto
    // existing topology and break manifoldness; the valence predicate
    // alone does not catch this.
    let diagonals = Retriangulator::planned_diagonals(left_tag, right_tag, valence)?;
    if diagonals.iter().any(|&(i, j)| mesh.has_edge(ring[i], ring[j])) {
        log::trace!("diagonal conflict at {front:?}, null patch");
        return Ok(None);
    }

    // gates must be derived before the star is destroyed
    let gates = patch.output_gates(mesh, &ring);

    ctx.retriangulator.retriangulate(mesh, gate, &ring)?;

    for &v in &ring {
        ctx.conquer(v);
    }
    ctx.queue.extend(gates);

    Ok(Some(RemovalEvent {
        center: front,
        ring,
        valence,
        left_tag,
        right_tag,
    }))
}

/// Continues the frontier past a front vertex that was not decimated: the
/// vertex is conquered and one new gate opens across each gate-adjacent
/// edge whose outward apex is still free.
fn advance_frontier(mesh: &MeshTopology, ctx: &mut ConquestContext, gate: Gate) {
    ctx.conquer(gate.front);
    // the front vertex joins the conquered boundary; give it a tag so
    // gates leaning on it stay retriangulatable
    if ctx.retriangulator.tag(gate.front) == RetriangulationTag::Default {
        ctx.retriangulator
            .set_tag(gate.front, RetriangulationTag::Plus);
    }

    let (left, right) = gate.edge;
    for edge in [(left, gate.front), (gate.front, right)] {
        let (apex, _) = mesh.get_oriented_vertices(edge);
        if let Some(apex) = apex {
            if ctx.flag(apex) == StateFlag::Free {
                ctx.queue.push_back(Gate::new(edge, apex));
            }
        }
    }
}

/// A gate for the cleaning pass, preferring an edge that survived next to
/// the original seed.
fn reseed_near(mesh: &MeshTopology, seed: Gate) -> Option<Gate> {
    let (left, right) = seed.edge;

    for edge in [seed.edge, (right, left)] {
        if let (Some(apex), _) = mesh.get_oriented_vertices(edge) {
            return Some(Gate::new(edge, apex));
        }
    }
    for v in [left, right] {
        let Some(neighbors) = mesh.neighbors(v) else {
            continue;
        };
        for &n in neighbors {
            if let (Some(apex), _) = mesh.get_oriented_vertices((v, n)) {
                return Some(Gate::new((v, n), apex));
            }
        }
    }
    mesh.find_seed_gate()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_meshes::{icosahedron, octahedron, tetrahedron};

    fn assert_valence_invariant(mesh: &MeshTopology) {
        let (positions, _) = mesh.export_vertices_and_faces();
        assert!(!positions.is_empty());
        for (&v, neighbors) in &mesh.state().adjacency {
            assert_eq!(mesh.valence(v), neighbors.len());
            assert_eq!(mesh.valence(v), mesh.faces_around(v).len());
        }
    }

    #[test]
    fn octahedron_pass_removes_one_pole_and_nulls_the_rest() {
        let mut mesh = octahedron();
        let seed = mesh.find_seed_gate().unwrap();
        let outcome = run_pass(&mut mesh, seed, &DECIMATION_VALENCES).unwrap();

        assert_eq!(outcome.codes[0], ValenceCode::Valence(4));
        assert_eq!(outcome.stats.vertices_removed, 1);
        assert_eq!(
            outcome.stats.null_patches,
            outcome.stats.gates_processed - 1
        );

        // 5 vertices and 6 faces: a closed mesh again
        assert_eq!(mesh.vertex_count(), 5);
        let (_, faces) = mesh.export_vertices_and_faces();
        assert_eq!(faces.len(), 6);
        assert_valence_invariant(&mesh);
    }

    #[test]
    fn unremovable_fronts_emit_null_codes_only() {
        let mut mesh = tetrahedron();
        // every front vertex has neighbors of valence 3
        assert!(mesh.find_seed_gate().is_none());

        let (&edge, &(left, _)) = mesh.state().orientation.iter().next().unwrap();
        let seed = Gate::new(edge, left.unwrap());
        let outcome = run_pass(&mut mesh, seed, &DECIMATION_VALENCES).unwrap();

        assert_eq!(outcome.stats.vertices_removed, 0);
        assert!(outcome.codes.iter().all(|&c| c == ValenceCode::Null));
        assert_eq!(mesh.vertex_count(), 4);
        assert_valence_invariant(&mesh);
    }

    #[test]
    fn decimation_pass_keeps_the_mesh_manifold() {
        let mut mesh = icosahedron();
        let seed = mesh.find_seed_gate().unwrap();
        let outcome = run_pass(&mut mesh, seed, &DECIMATION_VALENCES).unwrap();

        assert!(outcome.stats.vertices_removed > 0);
        assert_eq!(
            mesh.vertex_count(),
            12 - outcome.stats.vertices_removed
        );
        assert_valence_invariant(&mesh);

        // Euler characteristic of a sphere: F = 2V - 4
        let (positions, faces) = mesh.export_vertices_and_faces();
        assert_eq!(faces.len(), 2 * positions.len() - 4);
    }

    #[test]
    fn reversing_the_removal_events_restores_the_original_mesh() {
        let mut mesh = icosahedron();
        let before = mesh.export_vertices_and_faces();

        let seed = mesh.find_seed_gate().unwrap();
        let outcome = run_pass(&mut mesh, seed, &DECIMATION_VALENCES).unwrap();
        assert!(outcome.stats.vertices_removed > 0);
        assert_ne!(mesh.export_vertices_and_faces(), before);

        for event in outcome.removals.iter().rev() {
            refine::reinsert(&mut mesh, event).unwrap();
        }
        assert_eq!(mesh.export_vertices_and_faces(), before);
    }

    #[test]
    fn a_preexisting_chord_degrades_the_gate_to_a_null_patch() {
        let mut mesh = icosahedron();
        let seed = mesh.find_seed_gate().unwrap();
        let patch = Patch::around(&mesh, seed.front).unwrap();
        let ring = patch.surrounding_vertices(seed.edge).unwrap();

        // pre-connect a chord the table would add as a diagonal; closing
        // the hole over it would duplicate the edge
        assert!(mesh.add_edge(ring[0], ring[2]));

        let outcome = run_pass(&mut mesh, seed, &DECIMATION_VALENCES).unwrap();
        assert_eq!(outcome.codes[0], ValenceCode::Null);
        assert!(mesh.contains_vertex(seed.front));
    }

    #[test]
    fn reversing_both_pass_event_streams_restores_the_level_input() {
        let mut mesh = icosahedron();
        let before = mesh.export_vertices_and_faces();

        let level = run_level(&mut mesh).unwrap();
        let mut events: Vec<&RemovalEvent> = level.decimation.removals.iter().collect();
        events.extend(level.cleaning.removals.iter());
        assert!(!events.is_empty());

        for event in events.into_iter().rev() {
            refine::reinsert(&mut mesh, event).unwrap();
        }
        assert_eq!(mesh.export_vertices_and_faces(), before);
    }

    #[test]
    fn code_stream_is_deterministic_across_runs() {
        let run = || {
            let mut mesh = icosahedron();
            let seed = mesh.find_seed_gate().unwrap();
            let outcome = run_pass(&mut mesh, seed, &DECIMATION_VALENCES).unwrap();
            (outcome.codes, mesh.export_vertices_and_faces())
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn run_level_commits_a_replayable_diff() {
        let mut mesh = icosahedron();
        let level = run_level(&mut mesh).unwrap();

        let removed = level.decimation.stats.vertices_removed
            + level.cleaning.stats.vertices_removed;
        assert!(removed > 0);
        assert_eq!(level.diff.vertices_to_add.len(), removed);
        assert_eq!(mesh.vertex_count(), 12 - removed);
        assert_valence_invariant(&mesh);

        // rolling back the committed level restores the baseline
        assert!(mesh.rollback());
        assert_eq!(mesh.vertex_count(), 12);
        assert!(!mesh.rollback(), "baseline is never popped");
    }

    #[test]
    fn run_level_without_a_seed_fails() {
        let mut mesh = tetrahedron();
        assert!(matches!(
            run_level(&mut mesh),
            Err(crate::PromeshError::Conquest(ConquestError::NoSeedGate))
        ));
    }
}
