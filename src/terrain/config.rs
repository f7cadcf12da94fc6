//! Terrain shaping configuration.

use serde::{Deserialize, Serialize};

/// Parameters for the map grid, terracing and world scaling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Width and height of the square map in grid cells.
    pub size: u32,
    /// Number of terraces.
    pub levels: u32,
    /// Uniform scale applied to every mesh vertex, landmark and prop position.
    pub global_scale: f32,
    /// Vertical distance between two terraces before global scaling.
    pub height_scale: f32,
    /// Exponent applied after normalization. Higher values flatten lowlands and steepen peaks.
    pub noise_exponent: i32,
    /// Carve a river along the vertical centerline of the map.
    pub add_river: bool,
    /// The higher the factor, the narrower the river falloff.
    pub river_width_factor: f32,
    /// Height fraction separating water from the first land biome.
    pub water_line: f32,
    /// Extra terraces above the top level where the player starts.
    pub start_height_margin: f32,
    /// Grow every cluster into strictly lower 4-neighbors before meshing.
    pub inflate_clusters: bool,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            size: 256,
            levels: 10,
            global_scale: 100.0,
            height_scale: 10.0,
            noise_exponent: 1,
            add_river: true,
            river_width_factor: 4.0,
            water_line: 0.2,
            start_height_margin: 40.0,
            inflate_clusters: false,
        }
    }
}

impl TerrainConfig {
    /// Height difference between two adjacent terraces in normalized units.
    pub fn terrace_step(&self) -> f32 {
        1.0 / self.levels.saturating_sub(1).max(1) as f32
    }

    /// Offset subtracted from grid coordinates so the map is centered on the origin.
    pub fn center_offset(&self) -> f32 {
        (self.size as f32 - 1.0) / 2.0
    }

    /// Extrusion profile used for terrace side walls: one terrace down.
    pub fn extrusion_profile(&self) -> [f32; 2] {
        [0.0, -self.height_scale]
    }
}
