//! Shared-edge table of a triangle list.

use super::Mesh;

/// A mesh edge and the triangles on either side of it.
///
/// Boundary edges are bordered by a single triangle and store it twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    /// Vertex indices in the winding order of the first triangle.
    pub vertices: [u32; 2],
    /// Indices of the bordering triangles.
    pub faces: [u32; 2],
}

impl Edge {
    fn new(a: u32, b: u32, face: u32) -> Self {
        Self {
            vertices: [a, b],
            faces: [face, face],
        }
    }

    /// Returns true if only one triangle borders this edge.
    pub fn is_boundary(&self) -> bool {
        self.faces[0] == self.faces[1]
    }
}

/// Builds the edge table of a consistently wound triangle list.
///
/// The first pass records every edge whose first vertex index is lower than
/// the second, chained per lower vertex. The second pass matches each
/// reversed edge against the chain of its lower vertex and fills in the
/// second face; unmatched reversed edges are boundary edges and are appended.
pub fn build_edges(vertex_count: usize, triangles: &[[u32; 3]]) -> Vec<Edge> {
    let highest = triangles
        .iter()
        .flat_map(|t| t.iter())
        .map(|&i| i as usize + 1)
        .max()
        .unwrap_or(0);
    let vertex_count = vertex_count.max(highest);

    let mut edges: Vec<Edge> = Vec::with_capacity(triangles.len() * 3);
    // Head and tail of the edge chain starting at each vertex, and the link to the next edge.
    let mut first: Vec<Option<usize>> = vec![None; vertex_count];
    let mut last: Vec<Option<usize>> = vec![None; vertex_count];
    let mut next: Vec<Option<usize>> = Vec::with_capacity(triangles.len() * 3);

    for (face, tri) in triangles.iter().enumerate() {
        let mut i1 = tri[2];
        for &i2 in tri {
            if i1 < i2 {
                let id = edges.len();
                edges.push(Edge::new(i1, i2, face as u32));
                next.push(None);

                let v = i1 as usize;
                match last[v] {
                    Some(tail) => next[tail] = Some(id),
                    None => first[v] = Some(id),
                }
                last[v] = Some(id);
            }
            i1 = i2;
        }
    }

    for (face, tri) in triangles.iter().enumerate() {
        let mut i1 = tri[2];
        for &i2 in tri {
            if i1 > i2 {
                let mut cursor = first[i2 as usize];
                let mut matched = false;
                while let Some(id) = cursor {
                    let edge = &mut edges[id];
                    if edge.vertices[1] == i1 && edge.is_boundary() {
                        edge.faces[1] = face as u32;
                        matched = true;
                        break;
                    }
                    cursor = next.get(id).copied().flatten();
                }

                if !matched {
                    edges.push(Edge::new(i1, i2, face as u32));
                }
            }
            i1 = i2;
        }
    }

    edges
}

/// Edges of `mesh` bordered by exactly one triangle.
pub fn manifold_edges(mesh: &Mesh) -> Vec<Edge> {
    build_edges(mesh.vertex_count(), &mesh.triangles)
        .into_iter()
        .filter(Edge::is_boundary)
        .collect()
}
