//! Winding numbers and inner/outer contour classification.

use glam::IVec2;

use super::Contour;

/// Whether a contour bounds land or a hole in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContourClass {
    /// Outline of a region, possibly nested inside a hole.
    Outer,
    /// Outline of a hole, with the index of the innermost contour containing it.
    Inner { parent: usize },
}

/// Twice the signed area of the triangle `(p0, p1, p2)`.
///
/// Positive when `p2` lies left of the directed line `p0 -> p1`, negative
/// when right, zero when collinear.
pub fn is_left(p0: IVec2, p1: IVec2, p2: IVec2) -> i64 {
    let a = (p1 - p0).as_i64vec2();
    let b = (p2 - p0).as_i64vec2();
    a.x * b.y - b.x * a.y
}

/// Winding number of `contour` around `point`; zero means outside.
///
/// The contour is treated as closed: its last point connects to its first.
pub fn winding_number(point: IVec2, contour: &[IVec2]) -> i32 {
    let mut wn = 0;
    let n = contour.len();
    for i in 0..n {
        let a = contour[i];
        let b = contour[(i + 1) % n];
        if a.y <= point.y {
            if b.y > point.y && is_left(a, b, point) > 0 {
                wn += 1;
            }
        } else if b.y <= point.y && is_left(a, b, point) < 0 {
            wn -= 1;
        }
    }
    wn
}

/// Classifies each contour by how many other contours contain its first point.
///
/// A contour inside an odd number of others is a hole; inside an even number
/// (including none) it is an outline. The parent of a hole is the containing
/// contour that is itself nested deepest.
pub fn classify(contours: &[Contour]) -> Vec<ContourClass> {
    let containers: Vec<Vec<usize>> = contours
        .iter()
        .enumerate()
        .map(|(i, contour)| match contour.first() {
            Some(&first) => contours
                .iter()
                .enumerate()
                .filter(|&(j, other)| j != i && winding_number(first, other) != 0)
                .map(|(j, _)| j)
                .collect(),
            None => Vec::new(),
        })
        .collect();

    containers
        .iter()
        .map(|outer| {
            if outer.len() % 2 == 0 {
                return ContourClass::Outer;
            }
            let parent = outer
                .iter()
                .copied()
                .max_by_key(|&j| containers[j].len())
                .unwrap_or_default();
            ContourClass::Inner { parent }
        })
        .collect()
}

/// Keeps only the outlines, dropping holes.
pub fn outer_contours(contours: &[Contour]) -> Vec<Contour> {
    classify(contours)
        .into_iter()
        .zip(contours)
        .filter(|(class, _)| *class == ContourClass::Outer)
        .map(|(_, contour)| contour.clone())
        .collect()
}
