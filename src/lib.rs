//! Procedural terraced island generator.
//!
//! This crate turns multi-octave gradient noise into a stepped island:
//! the height field is quantized into terraces, flattened around landmark
//! zones, grouped into cumulative per-level clusters and meshed into one
//! extruded block per terrace.

pub mod biomes;
pub mod config;
pub mod contour;
pub mod export;
pub mod mesh;
pub mod noise;
pub mod pipeline;
pub mod props;
pub mod terrain;

pub use biomes::{Biome, BiomeTable, ResourceKind};
pub use config::{ConfigError, ExperimentalFeatures, IslandConfig};
pub use mesh::{Mesh, MeshError};
pub use noise::{NoiseField, PerlinNoiseConfig};
pub use pipeline::{generate_island, GenerationStage, Pipeline, PipelineError};
pub use props::{CloudSpawn, PropConfig, PropSpawn};
pub use terrain::{HeightGrid, Island, Landmark, TerrainConfig};
