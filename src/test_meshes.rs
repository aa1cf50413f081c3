//! Closed manifold meshes and star patches shared by the unit tests.

use crate::math::Point3;
use crate::topology::{MeshTopology, VertexData, VertexId};

/// Regular tetrahedron: 4 vertices, all of valence 3.
pub(crate) fn tetrahedron() -> MeshTopology {
    let positions = [
        Point3::new(1.0, 1.0, 1.0),
        Point3::new(1.0, -1.0, -1.0),
        Point3::new(-1.0, 1.0, -1.0),
        Point3::new(-1.0, -1.0, 1.0),
    ];
    let faces = [[0, 1, 2], [0, 3, 1], [0, 2, 3], [1, 3, 2]];
    MeshTopology::from_buffers(&positions, &faces)
}

/// Regular octahedron: 6 vertices, all of valence 4, outward winding.
pub(crate) fn octahedron() -> MeshTopology {
    let positions = [
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(-1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(0.0, -1.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
        Point3::new(0.0, 0.0, -1.0),
    ];
    let faces = [
        [0, 2, 4],
        [2, 1, 4],
        [1, 3, 4],
        [3, 0, 4],
        [2, 0, 5],
        [1, 2, 5],
        [3, 1, 5],
        [0, 3, 5],
    ];
    MeshTopology::from_buffers(&positions, &faces)
}

/// Regular icosahedron: 12 vertices, all of valence 5, outward winding.
pub(crate) fn icosahedron() -> MeshTopology {
    let phi = (1.0 + 5.0_f64.sqrt()) / 2.0;
    let positions = [
        Point3::new(-1.0, phi, 0.0),
        Point3::new(1.0, phi, 0.0),
        Point3::new(-1.0, -phi, 0.0),
        Point3::new(1.0, -phi, 0.0),
        Point3::new(0.0, -1.0, phi),
        Point3::new(0.0, 1.0, phi),
        Point3::new(0.0, -1.0, -phi),
        Point3::new(0.0, 1.0, -phi),
        Point3::new(phi, 0.0, -1.0),
        Point3::new(phi, 0.0, 1.0),
        Point3::new(-phi, 0.0, -1.0),
        Point3::new(-phi, 0.0, 1.0),
    ];
    let faces = [
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];
    MeshTopology::from_buffers(&positions, &faces)
}

/// An open fan: one center vertex surrounded by a counter-clockwise ring,
/// with the center as left apex of every ring edge. Returns the mesh, the
/// center and the ring in order.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn star_patch(valence: usize) -> (MeshTopology, VertexId, Vec<VertexId>) {
    let mut mesh = MeshTopology::new();
    let center = mesh.add_vertex(VertexData::new(Point3::origin()));
    let ring: Vec<VertexId> = (0..valence)
        .map(|i| {
            let angle = (i as f64) * std::f64::consts::TAU / (valence as f64);
            mesh.add_vertex(VertexData::new(Point3::new(angle.cos(), angle.sin(), 0.0)))
        })
        .collect();
    for i in 0..valence {
        let a = ring[i];
        let b = ring[(i + 1) % valence];
        mesh.add_edge(center, a);
        mesh.add_edge(a, b);
        mesh.set_orientation((a, b), center);
    }
    (mesh, center, ring)
}
