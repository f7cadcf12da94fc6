//! Pipeline module for orchestrating island generation stages.
//!
//! Provides a trait-based architecture for modular generation stages
//! that are composed into the standard island pipeline.

mod stage;

pub use stage::{
    ClusterStage, ContourStage, GenerationStage, LandmarkStage, MeshStage, NoiseStage, NormalizeStage, Pipeline,
    PipelineError, StageId, TerraceStage,
};

use crate::config::IslandConfig;
use crate::terrain::Island;

/// Validates `config` and runs the standard pipeline on a fresh island.
pub fn generate_island(config: &IslandConfig) -> Result<Island, PipelineError> {
    generate_island_with_callbacks(config, |_, _, _| {}, |_, _, _| {})
}

/// [`generate_island`] with per-stage progress callbacks.
pub fn generate_island_with_callbacks<F1, F2>(
    config: &IslandConfig,
    on_stage_start: F1,
    on_stage_complete: F2,
) -> Result<Island, PipelineError>
where
    F1: FnMut(&str, usize, usize),
    F2: FnMut(&str, usize, usize),
{
    config.validate()?;

    let mut island = Island::new(config.clone());
    Pipeline::standard().run_with_callbacks(&mut island, on_stage_start, on_stage_complete)?;

    log::info!(
        "Generated island (seed {}): {} meshes, {} landmarks",
        island.seed(),
        island.meshes().len(),
        island.landmarks().len()
    );
    Ok(island)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::noise::{fill_grid, NoiseError, NoiseField};
    use glam::UVec2;

    fn golden_config() -> IslandConfig {
        let mut config = IslandConfig::with_seed(7);
        config.terrain.size = 4;
        config.terrain.levels = 2;
        config.noise.octaves = 1;
        config.landmarks.count = 0;
        config
    }

    #[test]
    fn test_golden_noise() {
        let config = golden_config();
        let field = NoiseField::new(4, &config.noise_config()).unwrap();
        let grid = fill_grid(&field, 4);

        let expected = [
            0.54289234, 0.48359662, 0.39998490, 0.38250855,
            0.58023089, 0.52021021, 0.41621178, 0.36701092,
            0.53553718, 0.49894750, 0.40503335, 0.34119564,
            0.47819600, 0.47565374, 0.41497231, 0.35964608,
        ];
        for (i, (&got, &want)) in grid.heights().iter().zip(expected.iter()).enumerate() {
            assert!((got - want).abs() < 1e-5, "cell {i}: got {got}, expected {want}");
        }
    }

    #[test]
    fn test_golden_island() {
        let island = generate_island(&golden_config()).unwrap();

        // The noise peaks at (0, 1); only that cell reaches the upper terrace.
        let mut expected = [0.0f32; 16];
        expected[4] = 1.0;
        assert_eq!(island.grid.heights(), &expected);

        let meshes = island.meshes();
        assert_eq!(meshes.len(), 2);

        // Level 0 is the flat base, never extruded: a 4x4 vertex sheet.
        assert_eq!(meshes[0].vertex_count(), 16);
        assert_eq!(meshes[0].triangle_count(), 18);
        assert!(meshes[0].vertices.iter().all(|v| v.z == 0.0));

        // A lone point has no triangles, so only its two caps remain.
        assert_eq!(meshes[1].vertex_count(), 2);
        assert_eq!(meshes[1].triangle_count(), 0);
        let scale = island.config().terrain.global_scale;
        let height = island.config().terrain.height_scale;
        let mut zs: Vec<f32> = meshes[1].vertices.iter().map(|v| v.z).collect();
        zs.sort_by(f32::total_cmp);
        assert_eq!(zs, vec![0.0, height * scale]);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let config = IslandConfig::small(11);
        let a = generate_island(&config).unwrap();
        let b = generate_island(&config).unwrap();

        assert_eq!(a.grid, b.grid);
        assert_eq!(a.meshes(), b.meshes());
        assert_eq!(a.landmarks(), b.landmarks());
        assert_eq!(a.scatter_props(), b.scatter_props());
        assert_eq!(a.scatter_clouds(), b.scatter_clouds());
    }

    #[test]
    fn test_invalid_config_rejected_before_any_stage() {
        let mut config = golden_config();
        config.terrain.levels = 1;

        let mut started = 0;
        let result = generate_island_with_callbacks(&config, |_, _, _| started += 1, |_, _, _| {});
        assert!(matches!(result, Err(PipelineError::InvalidConfig(_))));
        assert_eq!(started, 0);
    }

    #[test]
    fn test_gradient_overflow_rejected_before_any_stage() {
        let mut config = golden_config();
        config.terrain.size = 16;
        config.noise.base_frequency = 0.5;

        let mut started = 0;
        let result = generate_island_with_callbacks(&config, |_, _, _| started += 1, |_, _, _| {});
        assert!(matches!(
            result,
            Err(PipelineError::InvalidConfig(ConfigError::Noise(NoiseError::GradientOverflow { .. })))
        ));
        assert_eq!(started, 0);
    }

    #[test]
    fn test_landmarks_sit_on_flat_ground() {
        let island = generate_island(&IslandConfig::small(21)).unwrap();
        let levels = island.levels();

        for landmark in island.landmarks() {
            let expected = crate::terrain::level_of(landmark.base_height, levels);
            let center = landmark.grid_position;
            assert_eq!(island.level_at(center.x, center.y), Some(expected));
        }
        for pair in island.landmarks().windows(2) {
            assert!(pair[0].grid_distance(&pair[1]) >= (pair[0].radius + pair[1].radius) as f32);
        }
    }

    #[test]
    fn test_props_avoid_landmarks_and_slopes() {
        let island = generate_island(&IslandConfig::small(4)).unwrap();
        let levels = island.levels();

        for prop in island.scatter_props() {
            let UVec2 { x, y } = prop.grid_position;
            let level = island.level_at(x, y).unwrap();
            assert_eq!(prop.level, level);
            assert_eq!(island.level_at(x + 1, y + 1), Some(level));
            assert!(island
                .landmarks()
                .iter()
                .all(|l| !l.covers(x as f32 + 0.5, y as f32 + 0.5)));
            assert_eq!(prop.biome, island.biomes().index_for_level(level, levels));
        }
    }

    #[test]
    fn test_meshes_carry_biomes_and_boundaries() {
        let island = generate_island(&IslandConfig::small(8)).unwrap();
        let levels = island.levels();

        for mesh in island.meshes() {
            assert_eq!(mesh.biome, island.biomes().index_for_level(mesh.level, levels));
            assert!(mesh.indices_in_bounds());
            if mesh.level == 0 {
                assert!(mesh.boundary.is_empty());
            }
        }
    }
}
