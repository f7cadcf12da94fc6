//! Boundary contour tracing of grid point sets.
//!
//! Best effort: the walk follows the first boundary neighbor it meets
//! turning counter-clockwise from its current heading and never re-enters a
//! contour that is already traced, so hole rings close on their own. It can
//! still dead-end on one cell wide spurs; such walks are reported as open
//! contours.

mod winding;

pub use winding::{classify, is_left, outer_contours, winding_number, ContourClass};

use std::collections::HashSet;

use glam::IVec2;
use thiserror::Error;

/// A closed boundary polygon; the last point connects back to the first.
pub type Contour = Vec<IVec2>;

/// Errors raised while tracing contours.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContourError {
    #[error("Contour starting at {start} does not close (stuck at {at})")]
    OpenContour { start: IVec2, at: IVec2 },
}

/// Compass headings in counter-clockwise order, starting east.
const HEADINGS: [IVec2; 8] = [
    IVec2::new(1, 0),
    IVec2::new(1, 1),
    IVec2::new(0, 1),
    IVec2::new(-1, 1),
    IVec2::new(-1, 0),
    IVec2::new(-1, -1),
    IVec2::new(0, -1),
    IVec2::new(1, -1),
];

/// Returns true if `p` is missing at least one of its four cardinal neighbors.
fn is_boundary(p: IVec2, set: &HashSet<IVec2>) -> bool {
    [IVec2::X, IVec2::NEG_X, IVec2::Y, IVec2::NEG_Y]
        .iter()
        .any(|&d| !set.contains(&(p + d)))
}

/// Traces every closed boundary of `points`.
///
/// Start points are taken in input order: the first boundary point not yet
/// claimed by a traced contour starts a new walk. From each point the walk
/// scans the eight neighbors counter-clockwise, beginning at its previous
/// heading, and steps to the first member that is itself a boundary point,
/// skipping the point it just came from and points of earlier contours. It
/// ends when the start point comes up as a candidate.
///
/// A walk that finds no candidate, or that runs longer than the point set
/// allows, fails the whole trace with [`ContourError::OpenContour`]; no
/// partial result is returned.
pub fn trace_contours(points: &[IVec2]) -> Result<Vec<Contour>, ContourError> {
    let set: HashSet<IVec2> = points.iter().copied().collect();
    let mut claimed: HashSet<IVec2> = HashSet::new();
    let mut contours = Vec::new();
    let max_steps = points.len() * 2 + 8;

    for &start in points {
        if claimed.contains(&start) || !is_boundary(start, &set) {
            continue;
        }

        let contour = walk(start, &set, &claimed, max_steps)?;
        claimed.extend(contour.iter().copied());
        contours.push(contour);
    }

    Ok(contours)
}

fn walk(
    start: IVec2,
    set: &HashSet<IVec2>,
    claimed: &HashSet<IVec2>,
    max_steps: usize,
) -> Result<Contour, ContourError> {
    let mut contour = vec![start];
    let mut current = start;
    let mut previous = start;
    let mut heading = 0usize;

    loop {
        let mut next = None;
        let mut closed = false;

        for turn in 0..HEADINGS.len() {
            let dir = (heading + turn) % HEADINGS.len();
            let candidate = current + HEADINGS[dir];
            if !set.contains(&candidate) || candidate == previous {
                continue;
            }
            if candidate == start {
                closed = true;
                break;
            }
            if !claimed.contains(&candidate) && is_boundary(candidate, set) {
                next = Some((candidate, dir));
                break;
            }
        }

        if closed {
            return Ok(contour);
        }

        match next {
            Some((candidate, dir)) if contour.len() < max_steps => {
                contour.push(candidate);
                previous = current;
                current = candidate;
                heading = dir;
            }
            _ => {
                return Err(ContourError::OpenContour { start, at: current });
            }
        }
    }
}
