//! Flat top surface triangulation of a cluster.

use std::collections::HashMap;

use glam::{IVec2, Vec2, Vec3};

use super::Mesh;
use crate::terrain::Cluster;

/// Builds the flat top surface of a terrace from its cluster.
///
/// Every point becomes a vertex at `(x - c, y - c, level * height_scale)` with
/// `c = (size - 1) / 2`, and UV `(x / size, y / size)`. Each point emits up to
/// two triangles toward its `+y` neighbors:
///
/// - `(p, (x, y+1), (x+1, y))`, or failing that `(p, (x, y+1), (x+1, y+1))`;
/// - `(p, (x-1, y+1), (x, y+1))`, or failing that `(p, (x-1, y), (x, y+1))`.
///
/// This is not marching squares: concave corners can leave small gaps.
pub fn build_top_surface(cluster: &Cluster, size: u32, height_scale: f32) -> Mesh {
    let points = &cluster.points;
    let center = (size as f32 - 1.0) / 2.0;
    let z = cluster.level as f32 * height_scale;

    let mut index: HashMap<IVec2, u32> = HashMap::with_capacity(points.len());
    for (i, &p) in points.iter().enumerate() {
        index.entry(p).or_insert(i as u32);
    }
    let find = |x: i32, y: i32| index.get(&IVec2::new(x, y)).copied();

    let mut mesh = Mesh::new(cluster.level);
    mesh.vertices.reserve(points.len());
    mesh.uvs.reserve(points.len());

    for (i, p) in points.iter().enumerate() {
        let i = i as u32;
        let (x, y) = (p.x, p.y);

        mesh.vertices.push(Vec3::new(x as f32 - center, y as f32 - center, z));
        mesh.uvs.push(Vec2::new(x as f32 / size as f32, y as f32 / size as f32));

        let up = find(x, y + 1);

        if let (Some(j), Some(k)) = (up, find(x + 1, y)) {
            mesh.triangles.push([i, j, k]);
        } else if let (Some(k), Some(j)) = (find(x + 1, y + 1), up) {
            mesh.triangles.push([i, j, k]);
        }

        if let (Some(j), Some(k)) = (find(x - 1, y + 1), up) {
            mesh.triangles.push([i, j, k]);
        } else if let (Some(j), Some(k)) = (find(x - 1, y), up) {
            mesh.triangles.push([i, j, k]);
        }
    }

    mesh
}
