//! Top-level island configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::biomes::{default_biomes, Biome};
use crate::mesh::MeshConfig;
use crate::noise::{lattice_width, NoiseError, PerlinNoiseConfig};
use crate::props::PropConfig;
use crate::terrain::{LandmarkConfig, TerrainConfig};

/// Errors raised by configuration validation and loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Map size must be at least 2, got {0}")]
    InvalidSize(u32),
    #[error("At least 2 terrace levels are required, got {0}")]
    InvalidLevels(u32),
    #[error("Octave count must be at least 1")]
    ZeroOctaves,
    #[error("Base frequency must be positive and finite, got {0}")]
    InvalidFrequency(f32),
    #[error("Persistence must be finite, got {0}")]
    InvalidPersistence(f32),
    #[error("Noise exponent must be at least 1, got {0}")]
    InvalidExponent(i32),
    #[error("{name} must be positive and finite, got {value}")]
    InvalidScale { name: &'static str, value: f32 },
    #[error("Water line must lie in [0, 1], got {0}")]
    InvalidWaterLine(f32),
    #[error("At least one biome is required")]
    NoBiomes,
    #[error("Biome '{name}' separation must lie in [0, 1], got {value}")]
    InvalidSeparation { name: String, value: f32 },
    #[error("Biome '{name}' has a negative or non-finite resource weight")]
    InvalidResourceWeight { name: String },
    #[error("Landmark type '{name}' must have a radius above 0")]
    InvalidLandmarkRadius { name: String },
    #[error("Landmark type '{name}' base height must lie in [0, 1), got {value}")]
    InvalidLandmarkHeight { name: String, value: f32 },
    #[error("Weld epsilon must be finite and not negative, got {0}")]
    InvalidWeldEpsilon(f32),
    #[error("Noise error: {0}")]
    Noise(#[from] NoiseError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Optional features whose results are not reliable enough to enable by default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentalFeatures {
    /// Trace and classify cluster contours after clustering.
    pub contours: bool,
    /// Answer [`crate::Island::can_dig`] queries.
    pub dig_check: bool,
}

/// Everything needed to generate one island.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IslandConfig {
    /// Master seed. Overrides `noise.seed` and seeds landmark and prop placement.
    pub seed: u64,
    pub noise: PerlinNoiseConfig,
    pub terrain: TerrainConfig,
    pub landmarks: LandmarkConfig,
    /// Biome bands; sorted by separation when the island is built.
    pub biomes: Vec<Biome>,
    pub props: PropConfig,
    pub mesh: MeshConfig,
    pub experimental: ExperimentalFeatures,
}

impl Default for IslandConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            noise: PerlinNoiseConfig::default(),
            terrain: TerrainConfig::default(),
            landmarks: LandmarkConfig::default(),
            biomes: default_biomes(),
            props: PropConfig::default(),
            mesh: MeshConfig::default(),
            experimental: ExperimentalFeatures::default(),
        }
    }
}

impl IslandConfig {
    /// Default configuration with the given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    /// Small map preset, quick enough for previews and tests.
    pub fn small(seed: u64) -> Self {
        let mut config = Self::with_seed(seed);
        config.terrain.size = 64;
        config.terrain.levels = 6;
        config.noise.base_frequency = 8.0;
        config.landmarks.count = 2;
        config
    }

    /// Noise parameters with the master seed applied.
    pub fn noise_config(&self) -> PerlinNoiseConfig {
        PerlinNoiseConfig {
            seed: self.seed,
            ..self.noise.clone()
        }
    }

    /// Reads a configuration from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks every parameter the generator relies on, including whether the
    /// noise octaves fit the gradient lattice for this map size.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let terrain = &self.terrain;
        if terrain.size < 2 {
            return Err(ConfigError::InvalidSize(terrain.size));
        }
        if terrain.levels < 2 {
            return Err(ConfigError::InvalidLevels(terrain.levels));
        }
        if self.noise.octaves == 0 {
            return Err(ConfigError::ZeroOctaves);
        }
        let frequency = self.noise.base_frequency;
        if !(frequency.is_finite() && frequency > 0.0) {
            return Err(ConfigError::InvalidFrequency(frequency));
        }
        if !self.noise.persistence.is_finite() {
            return Err(ConfigError::InvalidPersistence(self.noise.persistence));
        }
        if terrain.noise_exponent < 1 {
            return Err(ConfigError::InvalidExponent(terrain.noise_exponent));
        }
        lattice_width(terrain.size, &self.noise_config())?;
        for (name, value) in [
            ("global_scale", terrain.global_scale),
            ("height_scale", terrain.height_scale),
            ("river_width_factor", terrain.river_width_factor),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidScale { name, value });
            }
        }
        if !(0.0..=1.0).contains(&terrain.water_line) {
            return Err(ConfigError::InvalidWaterLine(terrain.water_line));
        }

        if self.biomes.is_empty() {
            return Err(ConfigError::NoBiomes);
        }
        for biome in &self.biomes {
            if !(0.0..=1.0).contains(&biome.separation) {
                return Err(ConfigError::InvalidSeparation {
                    name: biome.name.clone(),
                    value: biome.separation,
                });
            }
            if biome.resources.iter().any(|r| !(r.weight.is_finite() && r.weight >= 0.0)) {
                return Err(ConfigError::InvalidResourceWeight {
                    name: biome.name.clone(),
                });
            }
        }

        for kind in &self.landmarks.types {
            if kind.radius == 0 {
                return Err(ConfigError::InvalidLandmarkRadius {
                    name: kind.name.clone(),
                });
            }
            if !(0.0..1.0).contains(&kind.base_height) {
                return Err(ConfigError::InvalidLandmarkHeight {
                    name: kind.name.clone(),
                    value: kind.base_height,
                });
            }
        }

        let epsilon = self.mesh.weld_epsilon;
        if !(epsilon.is_finite() && epsilon >= 0.0) {
            return Err(ConfigError::InvalidWeldEpsilon(epsilon));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::LandmarkType;

    #[test]
    fn test_default_is_valid() {
        IslandConfig::default().validate().unwrap();
        IslandConfig::small(3).validate().unwrap();
    }

    #[test]
    fn test_noise_config_uses_master_seed() {
        let mut config = IslandConfig::with_seed(99);
        config.noise.seed = 5;
        assert_eq!(config.noise_config().seed, 99);
    }

    #[test]
    fn test_rejects_bad_parameters() {
        let mut config = IslandConfig::default();
        config.terrain.size = 1;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidSize(1))));

        let mut config = IslandConfig::default();
        config.terrain.levels = 1;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidLevels(1))));

        let mut config = IslandConfig::default();
        config.noise.octaves = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroOctaves)));

        let mut config = IslandConfig::default();
        config.noise.base_frequency = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidFrequency(_))));

        let mut config = IslandConfig::default();
        config.terrain.height_scale = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidScale { name: "height_scale", .. })
        ));

        let mut config = IslandConfig::default();
        config.biomes.clear();
        assert!(matches!(config.validate(), Err(ConfigError::NoBiomes)));

        let mut config = IslandConfig::default();
        config.landmarks.types.push(LandmarkType::new("peak", 3, 1.0));
        assert!(matches!(config.validate(), Err(ConfigError::InvalidLandmarkHeight { .. })));

        let mut config = IslandConfig::default();
        config.landmarks.types.push(LandmarkType::new("dot", 0, 0.5));
        assert!(matches!(config.validate(), Err(ConfigError::InvalidLandmarkRadius { .. })));

        let mut config = IslandConfig::default();
        config.mesh.weld_epsilon = -0.5;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidWeldEpsilon(_))));
    }

    #[test]
    fn test_rejects_gradient_overflow() {
        let mut config = IslandConfig::default();
        config.terrain.size = 16;
        config.noise.octaves = 1;
        config.noise.base_frequency = 0.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Noise(NoiseError::GradientOverflow { .. }))
        ));
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config = IslandConfig::from_json(r#"{ "seed": 12, "terrain": { "size": 32 } }"#).unwrap();
        assert_eq!(config.seed, 12);
        assert_eq!(config.terrain.size, 32);
        assert_eq!(config.terrain.levels, TerrainConfig::default().levels);
        assert_eq!(config.biomes.len(), default_biomes().len());
    }

    #[test]
    fn test_json_round_trip() {
        let config = IslandConfig::small(7);
        let json = config.to_json().unwrap();
        let back = IslandConfig::from_json(&json).unwrap();
        assert_eq!(back.seed, 7);
        assert_eq!(back.terrain.size, 64);
        assert_eq!(back.biomes, config.biomes);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("island.json");
        std::fs::write(&path, r#"{ "seed": 4 }"#).unwrap();
        assert_eq!(IslandConfig::load(&path).unwrap().seed, 4);

        assert!(matches!(
            IslandConfig::load(&dir.path().join("missing.json")),
            Err(ConfigError::Io(_))
        ));
    }
}
