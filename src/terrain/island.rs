//! Island generation state and result.

use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::cluster::Cluster;
use super::grid::HeightGrid;
use super::landmarks::{Landmark, LandmarkPlacement};
use crate::biomes::{Biome, BiomeTable};
use crate::config::IslandConfig;
use crate::contour::{Contour, ContourClass};
use crate::mesh::Mesh;
use crate::props::{scatter_clouds, scatter_props, CloudSpawn, PropSpawn};

/// Random streams derived from the master seed, one per consumer.
pub(crate) const LANDMARK_STREAM: u64 = 1;
pub(crate) const PROP_STREAM: u64 = 2;
pub(crate) const CLOUD_STREAM: u64 = 3;

/// Lattice resolution of the dig check along each axis.
const DIG_SAMPLES: u32 = 10;

/// A generated island.
///
/// Generation stages fill the fields in order; once the pipeline has run,
/// the grid holds terraced heights and `meshes` the terrace meshes.
#[derive(Debug, Clone)]
pub struct Island {
    config: IslandConfig,
    biomes: BiomeTable,
    /// Height field, normalized and then terraced by the pipeline.
    pub grid: HeightGrid,
    /// Landmark placement result (populated by the landmark stage).
    pub placement: Option<LandmarkPlacement>,
    /// Per-level clusters, taken by the mesh stage.
    pub clusters: Option<Vec<Cluster>>,
    /// Traced contours per level, when the experimental contour stage ran and succeeded.
    pub contours: Option<Vec<Vec<Contour>>>,
    /// Outline or hole class of every traced contour, parallel to `contours`.
    pub contour_classes: Option<Vec<Vec<ContourClass>>>,
    /// Terrace meshes (populated by the mesh stage).
    pub meshes: Vec<Mesh>,
}

impl Island {
    /// Creates an empty island for the given configuration.
    pub fn new(config: IslandConfig) -> Self {
        let biomes = BiomeTable::new(config.biomes.clone());
        let grid = HeightGrid::new(config.terrain.size);
        Self {
            config,
            biomes,
            grid,
            placement: None,
            clusters: None,
            contours: None,
            contour_classes: None,
            meshes: Vec::new(),
        }
    }

    pub fn config(&self) -> &IslandConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.config.seed
    }

    pub fn size(&self) -> u32 {
        self.config.terrain.size
    }

    pub fn levels(&self) -> u32 {
        self.config.terrain.levels
    }

    pub fn biomes(&self) -> &BiomeTable {
        &self.biomes
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    /// Landmarks placed on the map; empty before the landmark stage.
    pub fn landmarks(&self) -> &[Landmark] {
        self.placement
            .as_ref()
            .map(|p| p.landmarks.as_slice())
            .unwrap_or(&[])
    }

    /// True if fewer landmarks were placed than requested.
    pub fn landmark_shortfall(&self) -> bool {
        self.placement.as_ref().is_some_and(|p| p.is_partial())
    }

    /// Contours of every level, indexed by level.
    pub fn contours(&self) -> Option<&[Vec<Contour>]> {
        self.contours.as_deref()
    }

    /// Contour classes of every level, indexed like [`Island::contours`].
    pub fn contour_classes(&self) -> Option<&[Vec<ContourClass>]> {
        self.contour_classes.as_deref()
    }

    /// Deterministic random stream for one consumer of the master seed.
    pub fn rng(&self, stream: u64) -> ChaCha8Rng {
        stream_rng(self.config.seed, stream)
    }

    /// Height of the water plane: half a terrace above the water line's terrace.
    pub fn water_height(&self) -> f32 {
        let terrain = &self.config.terrain;
        let steps = terrain.levels.saturating_sub(1) as f32;
        ((steps * terrain.water_line).floor() + 0.5) * terrain.height_scale * terrain.global_scale
    }

    /// Player start height, well above the top terrace.
    pub fn start_height(&self) -> f32 {
        let terrain = &self.config.terrain;
        (terrain.levels as f32 + terrain.start_height_margin) * terrain.height_scale * terrain.global_scale
    }

    /// Terrace level of a cell, or `None` off the map.
    pub fn level_at(&self, x: u32, y: u32) -> Option<u32> {
        let levels = self.levels();
        self.grid
            .contains(x as i64, y as i64)
            .then(|| self.grid.level_at(x, y, levels))
    }

    /// Biome of a cell, or `None` off the map.
    pub fn biome_at(&self, x: u32, y: u32) -> Option<&Biome> {
        let level = self.level_at(x, y)?;
        self.biomes.for_level(level, self.levels())
    }

    /// Map color of a cell's biome, for rasterizing a 2D map.
    pub fn map_color(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        self.biome_at(x, y).map(|b| b.map_color)
    }

    /// Checks whether a hole of `hole_radius` can be dug at a world position.
    ///
    /// A 10x10 lattice reaching half the radius on each side of the center is
    /// sampled; every sample must lie on the map and on the same terrace as
    /// the center. Returns
    /// `None` unless `experimental.dig_check` is enabled.
    pub fn can_dig(&self, location: Vec2, hole_radius: f32) -> Option<bool> {
        if !self.config.experimental.dig_check {
            return None;
        }

        let terrain = &self.config.terrain;
        let center = location / terrain.global_scale + Vec2::splat(terrain.center_offset());
        let radius = hole_radius / terrain.global_scale;

        let Some(center_level) = self.level_at_point(center) else {
            return Some(false);
        };

        let step = radius / (DIG_SAMPLES - 1) as f32;
        let half = radius * 0.5;
        for i in 0..DIG_SAMPLES {
            for j in 0..DIG_SAMPLES {
                let sample = center + Vec2::new(i as f32 * step - half, j as f32 * step - half);
                if self.level_at_point(sample) != Some(center_level) {
                    return Some(false);
                }
            }
        }
        Some(true)
    }

    fn level_at_point(&self, p: Vec2) -> Option<u32> {
        let rounded = p.round();
        if !self.grid.contains(rounded.x as i64, rounded.y as i64) {
            return None;
        }
        self.level_at(rounded.x as u32, rounded.y as u32)
    }

    /// Resource props over the island, drawn from the prop random stream.
    pub fn scatter_props(&self) -> Vec<PropSpawn> {
        let mut rng = self.rng(PROP_STREAM);
        scatter_props(self, &self.config.props, &mut rng)
    }

    /// Clouds above the island, drawn from the cloud random stream.
    pub fn scatter_clouds(&self) -> Vec<CloudSpawn> {
        let terrain = &self.config.terrain;
        let mut rng = self.rng(CLOUD_STREAM);
        scatter_clouds(
            terrain.size,
            terrain.levels,
            terrain.height_scale,
            terrain.global_scale,
            &self.config.props,
            &mut rng,
        )
    }
}

/// Seeds a ChaCha stream from the master seed and a stream number.
pub fn stream_rng(seed: u64, stream: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed.wrapping_add(stream.wrapping_mul(0x9E37_79B9_7F4A_7C15)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{UVec2, Vec3};
    use rand::Rng;

    fn island_with(levels: u32, heights: &[f32]) -> Island {
        let size = (heights.len() as f64).sqrt() as u32;
        let mut config = IslandConfig::with_seed(1);
        config.terrain.size = size;
        config.terrain.levels = levels;
        config.terrain.global_scale = 1.0;
        let mut island = Island::new(config);
        island.grid = HeightGrid::from_heights(size, heights.to_vec()).unwrap();
        island
    }

    #[test]
    fn test_water_and_start_height() {
        let mut config = IslandConfig::default();
        config.terrain.levels = 10;
        config.terrain.water_line = 0.2;
        config.terrain.height_scale = 10.0;
        config.terrain.global_scale = 100.0;
        let island = Island::new(config);

        // floor(9 * 0.2) = 1
        assert_eq!(island.water_height(), 1.5 * 10.0 * 100.0);
        assert_eq!(island.start_height(), 50.0 * 10.0 * 100.0);
    }

    #[test]
    fn test_map_color_follows_level() {
        let island = island_with(10, &[0.0, 1.0, 0.0, 1.0]);
        let water = island.biomes().for_level(0, 10).unwrap().map_color;
        let snow = island.biomes().for_level(9, 10).unwrap().map_color;

        assert_eq!(island.map_color(0, 0), Some(water));
        assert_eq!(island.map_color(1, 0), Some(snow));
        assert_eq!(island.map_color(2, 0), None);
    }

    #[test]
    fn test_landmark_accessors_before_placement() {
        let island = Island::new(IslandConfig::small(1));
        assert!(island.landmarks().is_empty());
        assert!(!island.landmark_shortfall());
        assert!(island.contours().is_none());
    }

    #[test]
    fn test_landmark_shortfall() {
        let mut island = Island::new(IslandConfig::small(1));
        island.placement = Some(LandmarkPlacement {
            landmarks: vec![Landmark {
                name: "camp".into(),
                radius: 2,
                base_height: 0.4,
                grid_position: UVec2::new(5, 5),
                world_position: Vec3::ZERO,
            }],
            requested: 2,
            exhausted: true,
        });
        assert_eq!(island.landmarks().len(), 1);
        assert!(island.landmark_shortfall());
    }

    #[test]
    fn test_can_dig_disabled_by_default() {
        let island = island_with(2, &[0.0; 16]);
        assert_eq!(island.can_dig(Vec2::ZERO, 1.0), None);
    }

    #[test]
    fn test_can_dig() {
        // 8x8 map, left half level 0, right half level 1.
        let heights: Vec<f32> = (0..64).map(|i| if i % 8 < 4 { 0.0 } else { 1.0 }).collect();
        let mut island = island_with(2, &heights);
        island.config.experimental.dig_check = true;

        // Grid (1.5, 3.5) sits well inside the left half.
        let c = island.config().terrain.center_offset();
        let left = Vec2::new(1.5 - c, 3.5 - c);
        assert_eq!(island.can_dig(left, 1.0), Some(true));

        // Straddling the step at x = 3.5.
        let border = Vec2::new(3.4 - c, 3.5 - c);
        assert_eq!(island.can_dig(border, 1.0), Some(false));

        // Reaching off the map.
        let edge = Vec2::new(0.0 - c, 3.5 - c);
        assert_eq!(island.can_dig(edge, 2.0), Some(false));
    }

    #[test]
    fn test_can_dig_samples_half_radius() {
        // 16x16 map with a step between x = 7 and x = 8.
        let heights: Vec<f32> = (0..256).map(|i| if i % 16 < 8 { 0.0 } else { 1.0 }).collect();
        let mut island = island_with(2, &heights);
        island.config.experimental.dig_check = true;

        // Samples cover x in [3, 7], so the step at x = 8 is out of reach.
        let c = island.config().terrain.center_offset();
        let location = Vec2::new(5.0 - c, 8.0 - c);
        assert_eq!(island.can_dig(location, 4.0), Some(true));
        assert_eq!(island.can_dig(location, 6.0), Some(false));
    }

    #[test]
    fn test_stream_rng_is_deterministic_and_distinct() {
        let a: u64 = stream_rng(7, PROP_STREAM).random();
        let b: u64 = stream_rng(7, PROP_STREAM).random();
        let c: u64 = stream_rng(7, CLOUD_STREAM).random();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
