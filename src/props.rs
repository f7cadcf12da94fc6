//! Resource prop and cloud scattering over a finished island.
//!
//! Props are only given a hover position above their cell; dropping them
//! onto the actual surface is left to the caller's physics.

use glam::{UVec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::biomes::ResourceKind;
use crate::terrain::Island;

/// Prop and cloud scattering parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PropConfig {
    /// Terraces above its own level at which a prop hovers before being dropped.
    pub hover_levels: f32,
    /// Average number of clouds. The actual count falls in `[amount / 2, amount * 3 / 2)`.
    pub cloud_amount: u32,
    /// Number of distinct cloud shapes to choose from. Zero disables clouds.
    pub cloud_kinds: u32,
}

impl Default for PropConfig {
    fn default() -> Self {
        Self {
            hover_levels: 5.0,
            cloud_amount: 20,
            cloud_kinds: 3,
        }
    }
}

/// A resource prop to spawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropSpawn {
    pub resource: ResourceKind,
    /// Index of the biome the prop was drawn from.
    pub biome: usize,
    /// Terrace level of the prop's cell.
    pub level: u32,
    /// Lower-left cell of the flat 2x2 block the prop stands on.
    pub grid_position: UVec2,
    /// Hover position in world space.
    pub world_position: Vec3,
}

/// A cloud to spawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudSpawn {
    /// Cloud shape index in `0..cloud_kinds`.
    pub kind: u32,
    pub world_position: Vec3,
}

/// Scatters resource props over flat ground away from landmarks.
///
/// Every 2x2 block of cells on a single terrace whose center lies outside
/// every landmark zone draws one resource from its terrace's biome.
pub fn scatter_props<R: Rng + ?Sized>(island: &Island, config: &PropConfig, rng: &mut R) -> Vec<PropSpawn> {
    let grid = &island.grid;
    let terrain = &island.config().terrain;
    let size = grid.size();
    let levels = terrain.levels;
    let center = terrain.center_offset();
    let mut spawns = Vec::new();

    for y in 0..size.saturating_sub(1) {
        for x in 0..size.saturating_sub(1) {
            let cx = x as f32 + 0.5;
            let cy = y as f32 + 0.5;
            if island.landmarks().iter().any(|l| l.covers(cx, cy)) {
                continue;
            }

            let level = grid.level_at(x, y, levels);
            let flat = grid.level_at(x + 1, y, levels) == level
                && grid.level_at(x, y + 1, levels) == level
                && grid.level_at(x + 1, y + 1, levels) == level;
            if !flat {
                continue;
            }

            let biome = island.biomes().index_for_level(level, levels);
            let Some(resource) = island.biomes().get(biome).and_then(|b| b.pick_resource(rng)) else {
                continue;
            };

            let world_position = Vec3::new(
                cx - center,
                cy - center,
                (level as f32 + config.hover_levels) * terrain.height_scale,
            ) * terrain.global_scale;

            spawns.push(PropSpawn {
                resource,
                biome,
                level,
                grid_position: UVec2::new(x, y),
                world_position,
            });
        }
    }

    spawns
}

/// Scatters clouds high above the map.
///
/// Clouds float ten terraces above the top level, jittered by up to one unit.
pub fn scatter_clouds<R: Rng + ?Sized>(
    size: u32,
    levels: u32,
    height_scale: f32,
    global_scale: f32,
    config: &PropConfig,
    rng: &mut R,
) -> Vec<CloudSpawn> {
    if config.cloud_kinds == 0 || config.cloud_amount == 0 || size == 0 {
        return Vec::new();
    }

    let amount = config.cloud_amount;
    let count = rng.random_range(amount / 2..amount + amount / 2);
    let half = size as f32 / 2.0;
    let altitude = (levels + 10) as f32 * height_scale;

    (0..count)
        .map(|_| {
            let kind = rng.random_range(0..config.cloud_kinds);
            let x = rng.random_range(0..size) as f32 - half;
            let y = rng.random_range(0..size) as f32 - half;
            let z = altitude + rng.random_range(0..2u32) as f32;
            CloudSpawn {
                kind,
                world_position: Vec3::new(x, y, z) * global_scale,
            }
        })
        .collect()
}
