//! Vertex welding.

use std::collections::HashMap;

use glam::{IVec3, Vec3};

use super::Mesh;

/// Distance under which two vertices are considered the same point.
pub const DEFAULT_WELD_EPSILON: f32 = 0.1;

/// Merges vertices closer than `epsilon` into the lowest-index survivor.
///
/// Every later vertex within `epsilon` of a survivor is marked, triangles are
/// redirected to the survivor, and the vertex and UV arrays are compacted in
/// one pass. Survivors keep their own UV. Returns the number of vertices removed.
///
/// Survivors end up pairwise at least `epsilon` apart, so welding an already
/// welded mesh changes nothing.
///
/// Survivors are bucketed in a hash grid of `epsilon`-sized cells, so each
/// vertex is only compared against survivors in the 27 cells around it.
pub fn weld_vertices(mesh: &mut Mesh, epsilon: f32) -> usize {
    let count = mesh.vertices.len();
    if epsilon.is_nan() || epsilon <= 0.0 {
        return 0;
    }

    let mut target: Vec<Option<usize>> = vec![None; count];
    let mut cells: HashMap<IVec3, Vec<usize>> = HashMap::new();

    for j in 0..count {
        let v = mesh.vertices[j];
        let cell = cell_of(v, epsilon);
        target[j] = nearest_survivor(&cells, &mesh.vertices, cell, v, epsilon);
        if target[j].is_none() {
            cells.entry(cell).or_default().push(j);
        }
    }

    let merged = target.iter().filter(|t| t.is_some()).count();
    if merged == 0 {
        return 0;
    }

    // Compacted index of every survivor.
    let mut new_index = vec![0u32; count];
    let mut next = 0u32;
    for i in 0..count {
        if target[i].is_none() {
            new_index[i] = next;
            next += 1;
        }
    }
    let resolve = |i: u32| -> u32 {
        let i = i as usize;
        match target.get(i) {
            Some(Some(survivor)) => new_index[*survivor],
            Some(None) => new_index[i],
            None => i as u32,
        }
    };

    for tri in &mut mesh.triangles {
        *tri = [resolve(tri[0]), resolve(tri[1]), resolve(tri[2])];
    }

    let mut i = 0;
    mesh.vertices.retain(|_| {
        let keep = target[i].is_none();
        i += 1;
        keep
    });
    let mut i = 0;
    mesh.uvs.retain(|_| {
        let keep = target.get(i).map_or(false, |t| t.is_none());
        i += 1;
        keep
    });

    merged
}

fn cell_of(p: Vec3, epsilon: f32) -> IVec3 {
    (p / epsilon).floor().as_ivec3()
}

/// Lowest-index survivor within `epsilon` of `p`, searching the cells around `cell`.
fn nearest_survivor(
    cells: &HashMap<IVec3, Vec<usize>>,
    vertices: &[Vec3],
    cell: IVec3,
    p: Vec3,
    epsilon: f32,
) -> Option<usize> {
    let mut best: Option<usize> = None;
    for dz in -1..=1 {
        for dy in -1..=1 {
            for dx in -1..=1 {
                let Some(bucket) = cells.get(&(cell + IVec3::new(dx, dy, dz))) else {
                    continue;
                };
                for &i in bucket {
                    if p.distance(vertices[i]) < epsilon && best.map_or(true, |b| i < b) {
                        best = Some(i);
                    }
                }
            }
        }
    }
    best
}
