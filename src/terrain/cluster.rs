//! Level clustering of the terraced grid and point-set morphology.

use std::collections::HashSet;

use glam::IVec2;

use super::grid::HeightGrid;

/// Grid cells at or above one terrace level.
///
/// Clusters are cumulative: the cluster of level `k` contains every cell of
/// level `k + 1` as well, so each terrace can be extruded down onto the one
/// below without gaps.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    /// Terrace level of this cluster.
    pub level: u32,
    /// Member cells in row-major order (`x` column, `y` row).
    pub points: Vec<IVec2>,
}

impl Cluster {
    /// Number of member cells.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if no cell reaches this level.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Members as a set for O(1) membership tests.
    pub fn point_set(&self) -> HashSet<IVec2> {
        self.points.iter().copied().collect()
    }
}

/// Partitions the grid into one cumulative cluster per level.
///
/// A cell of level `L` is appended to clusters `0..=L`. The result always
/// holds exactly `levels` clusters, some possibly empty.
pub fn cluster_levels(grid: &HeightGrid, levels: u32) -> Vec<Cluster> {
    let mut clusters: Vec<Cluster> = (0..levels)
        .map(|level| Cluster {
            level,
            points: Vec::new(),
        })
        .collect();

    let top = levels.saturating_sub(1);
    for (x, y) in grid.cell_coords() {
        let level = grid.level_at(x, y, levels).min(top);
        let point = IVec2::new(x as i32, y as i32);
        for cluster in clusters.iter_mut().take(level as usize + 1) {
            cluster.points.push(point);
        }
    }

    clusters
}

const CARDINALS: [IVec2; 4] = [IVec2::X, IVec2::NEG_X, IVec2::Y, IVec2::NEG_Y];

/// Grows a point set by one cell into 4-neighbors that are strictly lower on the grid.
///
/// Neighbors off the grid are never added.
pub fn inflate(points: &mut Vec<IVec2>, grid: &HeightGrid) {
    let members: HashSet<IVec2> = points.iter().copied().collect();
    let mut added: HashSet<IVec2> = HashSet::new();
    let mut buffer = Vec::new();

    for &point in points.iter() {
        let Some(height) = grid.try_get(point.x as i64, point.y as i64) else {
            continue;
        };
        for offset in CARDINALS {
            let neighbor = point + offset;
            if members.contains(&neighbor) || added.contains(&neighbor) {
                continue;
            }
            let Some(neighbor_height) = grid.try_get(neighbor.x as i64, neighbor.y as i64) else {
                continue;
            };
            if height > neighbor_height {
                added.insert(neighbor);
                buffer.push(neighbor);
            }
        }
    }

    points.extend(buffer);
}

/// Keeps only the points whose four cardinal neighbors are all members.
pub fn erode(points: &mut Vec<IVec2>) {
    let members: HashSet<IVec2> = points.iter().copied().collect();
    points.retain(|&p| CARDINALS.iter().all(|&offset| members.contains(&(p + offset))));
}

/// Drops points outside the `size x size` map.
pub fn clamp_to_map(points: &mut Vec<IVec2>, size: u32) {
    let max = size as i32 - 1;
    points.retain(|p| p.x >= 0 && p.y >= 0 && p.x <= max && p.y <= max);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::quantize::terrace;

    fn stepped_grid() -> HeightGrid {
        // 4x4 grid with levels 0..=3 increasing by column.
        let heights = (0..16).map(|i| (i % 4) as f32 / 3.0).collect();
        HeightGrid::from_heights(4, heights).unwrap()
    }

    #[test]
    fn test_one_cluster_per_level() {
        let clusters = cluster_levels(&stepped_grid(), 4);
        assert_eq!(clusters.len(), 4);
        for (i, c) in clusters.iter().enumerate() {
            assert_eq!(c.level, i as u32);
        }
        assert_eq!(clusters[0].len(), 16);
        assert_eq!(clusters[1].len(), 12);
        assert_eq!(clusters[2].len(), 8);
        assert_eq!(clusters[3].len(), 4);
    }

    #[test]
    fn test_clusters_are_cumulative() {
        let mut grid = HeightGrid::new(12);
        for (i, h) in grid.heights_mut().iter_mut().enumerate() {
            *h = ((i * 37) % 101) as f32 / 100.0;
        }
        terrace(&mut grid, 6);
        let clusters = cluster_levels(&grid, 6);

        for pair in clusters.windows(2) {
            let lower = pair[0].point_set();
            assert!(
                pair[1].points.iter().all(|p| lower.contains(p)),
                "cluster {} must contain cluster {}",
                pair[0].level,
                pair[1].level
            );
        }
    }

    #[test]
    fn test_cluster_points_are_row_major() {
        let clusters = cluster_levels(&stepped_grid(), 4);
        let top = &clusters[3].points;
        assert_eq!(top, &vec![IVec2::new(3, 0), IVec2::new(3, 1), IVec2::new(3, 2), IVec2::new(3, 3)]);
    }

    #[test]
    fn test_empty_upper_levels() {
        let grid = HeightGrid::new(3);
        let clusters = cluster_levels(&grid, 3);
        assert_eq!(clusters.len(), 3);
        assert_eq!(clusters[0].len(), 9);
        assert!(clusters[1].is_empty());
        assert!(clusters[2].is_empty());
    }

    #[test]
    fn test_inflate_grows_downhill_only() {
        let grid = stepped_grid();
        let mut points = cluster_levels(&grid, 4)[2].points.clone();
        inflate(&mut points, &grid);

        // Column 1 is lower than column 2 and gets added; nothing goes off-map.
        assert_eq!(points.len(), 12);
        for y in 0..4 {
            assert!(points.contains(&IVec2::new(1, y)));
        }
        assert!(!points.contains(&IVec2::new(0, 0)));
    }

    #[test]
    fn test_erode_removes_border() {
        let mut points: Vec<IVec2> = (0..5)
            .flat_map(|y| (0..5).map(move |x| IVec2::new(x, y)))
            .collect();
        erode(&mut points);
        assert_eq!(points.len(), 9);
        assert!(points.iter().all(|p| (1..=3).contains(&p.x) && (1..=3).contains(&p.y)));
    }

    #[test]
    fn test_clamp_to_map() {
        let mut points = vec![IVec2::new(-1, 0), IVec2::new(0, 0), IVec2::new(3, 3), IVec2::new(4, 1)];
        clamp_to_map(&mut points, 4);
        assert_eq!(points, vec![IVec2::new(0, 0), IVec2::new(3, 3)]);
    }
}
