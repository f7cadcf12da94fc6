//! Height normalization, river carving and terrace quantization.

use super::grid::{level_of, HeightGrid};

/// Rescales every cell to `[0, 1]` using the grid's min/max, then raises it to `exponent`.
///
/// A flat grid has no range to stretch and normalizes to all zeros.
pub fn normalize(grid: &mut HeightGrid, exponent: i32) {
    let (min, max) = grid.height_range();
    let range = max - min;

    for h in grid.heights_mut() {
        let t = if range > 0.0 { ((*h - min) / range).clamp(0.0, 1.0) } else { 0.0 };
        *h = t.powi(exponent);
    }
}

/// Multiplies every cell by its horizontal distance to the vertical centerline.
///
/// The factor is 0 on the centerline and recovers linearly to 1 over
/// `size / (2 * width_factor)` cells on each side.
pub fn carve_river(grid: &mut HeightGrid, width_factor: f32) {
    let size = grid.size();
    let half = size as f32 / 2.0;
    if half <= 0.0 {
        return;
    }

    for y in 0..size {
        for x in 0..size {
            let falloff = (width_factor * (x as f32 - half).abs() / half).clamp(0.0, 1.0);
            let h = grid.get(x, y);
            grid.set(x, y, h * falloff);
        }
    }
}

/// Snaps every cell down to its terrace: `floor(h * (levels - 1)) / (levels - 1)`.
pub fn terrace(grid: &mut HeightGrid, levels: u32) {
    let steps = levels.saturating_sub(1).max(1) as f32;
    for h in grid.heights_mut() {
        *h = level_of(*h, levels) as f32 / steps;
    }
}
