//! Terrace meshes.
//!
//! Each terrace level becomes one [`Mesh`]: a flat triangulated top surface
//! built from the level's cluster, whose boundary is extruded one terrace
//! down and welded so it stacks onto the level below.

mod edges;
mod extrude;
mod topology;
mod weld;

pub use edges::{build_edges, manifold_edges, Edge};
pub use extrude::{extrude, perform_extrusion};
pub use topology::build_top_surface;
pub use weld::{weld_vertices, DEFAULT_WELD_EPSILON};

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while building or editing meshes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    #[error("Extrusion profile needs at least 2 steps, got {0}")]
    ProfileTooShort(usize),
    #[error("Edge references vertex {index} but the mesh has {vertex_count} vertices")]
    EdgeOutOfBounds { index: u32, vertex_count: usize },
}

/// Mesh construction parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    /// Vertices closer than this are merged after extrusion.
    pub weld_epsilon: f32,
    /// Flip the winding of every extruded triangle.
    pub invert_faces: bool,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            weld_epsilon: DEFAULT_WELD_EPSILON,
            invert_faces: false,
        }
    }
}

/// Triangle mesh of one terrace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    /// Vertex positions.
    pub vertices: Vec<Vec3>,
    /// Texture coordinates, index-aligned with `vertices`.
    pub uvs: Vec<Vec2>,
    /// Triangles as indices into `vertices`.
    pub triangles: Vec<[u32; 3]>,
    /// Terrace level the top surface sits on.
    pub level: u32,
    /// Index of the mesh's biome in the run's biome table.
    pub biome: usize,
    /// Boundary edge endpoints in world space, used by [`Mesh::fits`].
    pub boundary: Vec<[Vec3; 2]>,
}

impl Mesh {
    /// Creates an empty mesh for the given level.
    pub fn new(level: u32) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Returns true if every triangle index points at an existing vertex.
    pub fn indices_in_bounds(&self) -> bool {
        let count = self.vertices.len();
        self.triangles
            .iter()
            .all(|tri| tri.iter().all(|&i| (i as usize) < count))
    }

    /// Multiplies every vertex position by `factor`.
    ///
    /// Boundary endpoints are already stored in world space and stay untouched.
    pub fn scale(&mut self, factor: f32) {
        for v in &mut self.vertices {
            *v *= factor;
        }
    }

    /// Records the endpoints of `edges`, scaled to world space, as the fit-test boundary.
    pub fn store_boundary(&mut self, edges: &[Edge], global_scale: f32) {
        self.boundary = edges
            .iter()
            .filter_map(|e| {
                let a = self.vertices.get(e.vertices[0] as usize)?;
                let b = self.vertices.get(e.vertices[1] as usize)?;
                Some([*a * global_scale, *b * global_scale])
            })
            .collect();
    }

    /// Returns true if a round object of XY `radius` centered at `position` stays
    /// clear of every boundary edge.
    ///
    /// An edge blocks the object when either endpoint is closer than `radius`,
    /// or when the perpendicular projection of `position` lands on the segment
    /// closer than `radius`.
    pub fn fits(&self, position: Vec2, radius: f32) -> bool {
        self.boundary.iter().all(|[a, b]| {
            let a = a.truncate();
            let b = b.truncate();
            if position.distance(a) < radius || position.distance(b) < radius {
                return false;
            }

            let length = a.distance(b);
            if length <= f32::EPSILON {
                return true;
            }
            let dir = (b - a) / length;
            let d = (position - a).dot(dir);
            let projection = a + dir * d;
            !(d > 0.0 && d < length && position.distance(projection) < radius)
        })
    }

    /// Deletes every vertex within `radius` of `center` in the XY plane, along with
    /// every triangle that touches one. Returns the number of vertices removed.
    pub fn remove_vertices_within(&mut self, center: Vec2, radius: f32) -> usize {
        let keep: Vec<bool> = self
            .vertices
            .iter()
            .map(|v| v.truncate().distance(center) > radius)
            .collect();
        let removed = keep.iter().filter(|&&k| !k).count();
        if removed == 0 {
            return 0;
        }

        self.compact(&keep);
        removed
    }

    /// Drops vertices whose `keep` flag is false, remaps the surviving triangles
    /// and discards triangles that referenced a dropped vertex.
    fn compact(&mut self, keep: &[bool]) {
        let mut remap = vec![None; self.vertices.len()];
        let mut next = 0u32;
        for (i, &k) in keep.iter().enumerate() {
            if k {
                remap[i] = Some(next);
                next += 1;
            }
        }

        let mut i = 0;
        self.vertices.retain(|_| {
            let k = keep[i];
            i += 1;
            k
        });
        let mut i = 0;
        self.uvs.retain(|_| {
            let k = keep.get(i).copied().unwrap_or(false);
            i += 1;
            k
        });

        self.triangles = self
            .triangles
            .iter()
            .filter_map(|tri| {
                let a = remap.get(tri[0] as usize).copied().flatten()?;
                let b = remap.get(tri[1] as usize).copied().flatten()?;
                let c = remap.get(tri[2] as usize).copied().flatten()?;
                Some([a, b, c])
            })
            .collect();
    }
}
