//! Boundary extrusion: side ribbon plus top and bottom caps.

use glam::{Vec2, Vec3};

use super::edges::{manifold_edges, Edge};
use super::weld::weld_vertices;
use super::{Mesh, MeshError};

/// Extrudes `mesh` along `edges` through the z offsets of `profile`.
///
/// The output holds, in order:
/// - a ribbon of two vertices per edge for every profile step, with
///   `uv = (source u, step / (steps - 1))`;
/// - a top cap copy of the source shifted by `profile[0]`;
/// - a bottom cap copy shifted by the last profile offset.
///
/// Ribbon quads are split into two triangles, the top cap keeps the source
/// winding and the bottom cap is reversed. `invert_faces` flips every
/// triangle afterwards. With no edges the result is the two caps alone.
pub fn extrude(
    mesh: &Mesh,
    profile: &[f32],
    edges: &[Edge],
    invert_faces: bool,
) -> Result<Mesh, MeshError> {
    let steps = profile.len();
    if steps < 2 {
        return Err(MeshError::ProfileTooShort(steps));
    }

    let source_count = mesh.vertex_count();
    for edge in edges {
        for &index in &edge.vertices {
            if index as usize >= source_count {
                return Err(MeshError::EdgeOutOfBounds {
                    index,
                    vertex_count: source_count,
                });
            }
        }
    }

    let ring = edges.len() * 2;
    let ribbon_count = ring * steps;
    let total = ribbon_count + source_count * 2;

    let mut out = Mesh {
        vertices: Vec::with_capacity(total),
        uvs: Vec::with_capacity(total),
        triangles: Vec::with_capacity(edges.len() * 2 * (steps - 1) + mesh.triangle_count() * 2),
        level: mesh.level,
        biome: mesh.biome,
        boundary: mesh.boundary.clone(),
    };

    let source_uv = |i: u32| mesh.uvs.get(i as usize).copied().unwrap_or(Vec2::ZERO);

    for (step, &offset) in profile.iter().enumerate() {
        let v = step as f32 / (steps - 1) as f32;
        let shift = Vec3::new(0.0, 0.0, offset);
        for edge in edges {
            for &index in &edge.vertices {
                out.vertices.push(mesh.vertices[index as usize] + shift);
                out.uvs.push(Vec2::new(source_uv(index).x, v));
            }
        }
    }

    for offset in [profile[0], profile[steps - 1]] {
        let shift = Vec3::new(0.0, 0.0, offset);
        for (i, vertex) in mesh.vertices.iter().enumerate() {
            out.vertices.push(*vertex + shift);
            out.uvs.push(source_uv(i as u32));
        }
    }

    for step in 0..steps - 1 {
        let base = (ring * step) as u32;
        let next = (ring * (step + 1)) as u32;
        for e in 0..edges.len() as u32 {
            let (b0, b1) = (base + e * 2, base + e * 2 + 1);
            let (n0, n1) = (next + e * 2, next + e * 2 + 1);
            out.triangles.push([b0, n0, b1]);
            out.triangles.push([n0, n1, b1]);
        }
    }

    let top = ribbon_count as u32;
    for t in &mesh.triangles {
        out.triangles.push([t[1] + top, t[2] + top, t[0] + top]);
    }

    let bottom = (ribbon_count + source_count) as u32;
    for t in &mesh.triangles {
        out.triangles.push([t[0] + bottom, t[2] + bottom, t[1] + bottom]);
    }

    if invert_faces {
        for t in &mut out.triangles {
            t.swap(0, 1);
        }
    }

    Ok(out)
}

/// Extrudes a terrace top surface into a closed block.
///
/// Finds the boundary edges, stores them in world space for fit testing,
/// extrudes through `profile` and welds coincident vertices.
pub fn perform_extrusion(
    mesh: &Mesh,
    profile: &[f32],
    global_scale: f32,
    weld_epsilon: f32,
    invert_faces: bool,
) -> Result<Mesh, MeshError> {
    let edges = manifold_edges(mesh);
    let mut source = mesh.clone();
    source.store_boundary(&edges, global_scale);

    let mut extruded = extrude(&source, profile, &edges, invert_faces)?;
    let merged = weld_vertices(&mut extruded, weld_epsilon);
    log::debug!(
        "Level {}: {} boundary edges, {} vertices after welding {} duplicates",
        mesh.level,
        edges.len(),
        extruded.vertex_count(),
        merged
    );

    Ok(extruded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_top_surface;
    use crate::terrain::Cluster;
    use glam::IVec2;

    fn quad() -> Mesh {
        let points = vec![IVec2::new(0, 0), IVec2::new(1, 0), IVec2::new(0, 1), IVec2::new(1, 1)];
        build_top_surface(&Cluster { level: 1, points }, 2, 10.0)
    }

    #[test]
    fn test_single_quad_extrusion_counts() {
        let mesh = quad();
        let edges = manifold_edges(&mesh);
        assert_eq!(edges.len(), 4);

        let out = extrude(&mesh, &[0.0, -10.0], &edges, false).unwrap();
        assert_eq!(out.vertex_count(), 4 * 2 * 2 + 4 * 2);
        // Two ribbon triangles per boundary edge, plus both caps.
        assert_eq!(out.triangle_count(), 4 * 2 + 2 * 2);
        assert!(out.indices_in_bounds());
    }

    #[test]
    fn test_ribbon_vertices_and_uvs() {
        let mesh = quad();
        let edges = manifold_edges(&mesh);
        let out = extrude(&mesh, &[0.0, -10.0], &edges, false).unwrap();

        let ring = edges.len() * 2;
        for i in 0..ring {
            assert_eq!(out.vertices[i].z, 10.0);
            assert_eq!(out.vertices[ring + i].z, 0.0);
            assert_eq!(out.uvs[i].y, 0.0);
            assert_eq!(out.uvs[ring + i].y, 1.0);
        }
    }

    #[test]
    fn test_cap_winding() {
        let mesh = quad();
        let out = extrude(&mesh, &[0.0, -10.0], &[], false).unwrap();
        let n = mesh.vertex_count() as u32;

        assert_eq!(out.triangles[0], [2, 1, 0]);
        assert_eq!(out.triangles[2], [n, n + 1, n + 2]);
    }

    #[test]
    fn test_zero_edges_yields_caps_only() {
        let mesh = quad();
        let out = extrude(&mesh, &[0.0, -10.0], &[], false).unwrap();
        assert_eq!(out.vertex_count(), 8);
        assert_eq!(out.triangle_count(), 4);
    }

    #[test]
    fn test_profile_too_short_is_rejected() {
        let mesh = quad();
        let edges = manifold_edges(&mesh);
        assert_eq!(extrude(&mesh, &[0.0], &edges, false), Err(MeshError::ProfileTooShort(1)));
        assert_eq!(extrude(&mesh, &[], &edges, false), Err(MeshError::ProfileTooShort(0)));
    }

    #[test]
    fn test_edge_out_of_bounds_is_rejected() {
        let mesh = quad();
        let bad = Edge {
            vertices: [0, 9],
            faces: [0, 0],
        };
        assert!(matches!(
            extrude(&mesh, &[0.0, -1.0], &[bad], false),
            Err(MeshError::EdgeOutOfBounds { index: 9, .. })
        ));
    }

    #[test]
    fn test_invert_faces() {
        let mesh = quad();
        let edges = manifold_edges(&mesh);
        let plain = extrude(&mesh, &[0.0, -10.0], &edges, false).unwrap();
        let inverted = extrude(&mesh, &[0.0, -10.0], &edges, true).unwrap();

        for (a, b) in plain.triangles.iter().zip(&inverted.triangles) {
            assert_eq!([a[1], a[0], a[2]], *b);
        }
    }

    #[test]
    fn test_perform_extrusion_welds_to_box() {
        let mesh = quad();
        let out = perform_extrusion(&mesh, &[0.0, -10.0], 2.0, 0.1, false).unwrap();

        assert_eq!(out.vertex_count(), 8);
        assert_eq!(out.triangle_count(), 12);
        assert!(out.indices_in_bounds(), "welding left dangling indices");
        assert_eq!(out.boundary.len(), 4);
        // Boundary stored in world space.
        for [a, b] in &out.boundary {
            assert_eq!(a.z, 20.0);
            assert_eq!(b.z, 20.0);
        }
    }

    #[test]
    fn test_perform_extrusion_single_point() {
        let cluster = Cluster {
            level: 2,
            points: vec![IVec2::new(3, 3)],
        };
        let mesh = build_top_surface(&cluster, 8, 10.0);
        let out = perform_extrusion(&mesh, &[0.0, -10.0], 1.0, 0.1, false).unwrap();

        assert_eq!(out.vertex_count(), 2);
        assert!(out.triangles.is_empty());
    }
}
