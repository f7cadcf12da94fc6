//! Square height grid.

use serde::{Deserialize, Serialize};

/// Square `size x size` height field.
///
/// Stored row-major: `x` is the column, `y` the row. Values are normalized
/// heights in `[0, 1]` once the quantizer has run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeightGrid {
    size: u32,
    heights: Vec<f32>,
}

impl HeightGrid {
    /// Creates a grid of the given size with all heights at 0.0.
    pub fn new(size: u32) -> Self {
        let cells = (size as usize) * (size as usize);
        Self {
            size,
            heights: vec![0.0; cells],
        }
    }

    /// Builds a grid from row-major heights. Returns `None` if the length is not `size * size`.
    pub fn from_heights(size: u32, heights: Vec<f32>) -> Option<Self> {
        if heights.len() != (size as usize) * (size as usize) {
            return None;
        }
        Some(Self { size, heights })
    }

    /// Width (and height) of the grid.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Row-major height values.
    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    /// Mutable row-major height values.
    pub fn heights_mut(&mut self) -> &mut [f32] {
        &mut self.heights
    }

    /// Returns true if `(x, y)` lies on the grid.
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.size as i64 && y < self.size as i64
    }

    /// Returns the height at the given cell.
    ///
    /// # Panics
    /// Panics if x or y is out of bounds.
    pub fn get(&self, x: u32, y: u32) -> f32 {
        debug_assert!(x < self.size && y < self.size);
        self.heights[self.index(x, y)]
    }

    /// Sets the height at the given cell.
    ///
    /// # Panics
    /// Panics if x or y is out of bounds.
    pub fn set(&mut self, x: u32, y: u32, height: f32) {
        debug_assert!(x < self.size && y < self.size);
        let idx = self.index(x, y);
        self.heights[idx] = height;
    }

    /// Height at signed coordinates, or `None` off the grid.
    pub fn try_get(&self, x: i64, y: i64) -> Option<f32> {
        self.contains(x, y).then(|| self.get(x as u32, y as u32))
    }

    /// Terrace level of the cell at `(x, y)`.
    pub fn level_at(&self, x: u32, y: u32, levels: u32) -> u32 {
        level_of(self.get(x, y), levels)
    }

    /// Returns (min, max) height range.
    pub fn height_range(&self) -> (f32, f32) {
        let min = self.heights.iter().cloned().fold(f32::MAX, f32::min);
        let max = self.heights.iter().cloned().fold(f32::MIN, f32::max);
        (min, max)
    }

    /// Returns the total number of cells.
    pub fn cell_count(&self) -> usize {
        self.heights.len()
    }

    /// Returns an iterator over all (x, y) cell coordinates in row-major order.
    pub fn cell_coords(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let size = self.size;
        (0..size).flat_map(move |y| (0..size).map(move |x| (x, y)))
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.size as usize) + x as usize
    }
}

/// Terrace level for a normalized height: `floor(height * (levels - 1))`.
///
/// Negative inputs map to level 0. A height at or above the stored terrace
/// value `(k + 1) / (levels - 1)` counts as level `k + 1`, so terraced values
/// read back exactly even when the product rounds below `k + 1`.
pub fn level_of(height: f32, levels: u32) -> u32 {
    let steps = levels.saturating_sub(1) as f32;
    let level = (height * steps).floor().max(0.0) as u32;
    if level + 1 < levels && height >= (level + 1) as f32 / steps {
        level + 1
    } else {
        level
    }
}
