//! Terrain module.
//!
//! Holds the height grid, its quantization into terraces, landmark
//! placement, per-level clustering and the [`Island`] generation state.

mod cluster;
mod config;
mod grid;
mod island;
mod landmarks;
mod quantize;

pub use cluster::{clamp_to_map, cluster_levels, erode, inflate, Cluster};
pub use config::TerrainConfig;
pub use grid::{level_of, HeightGrid};
pub use island::{stream_rng, Island};
pub(crate) use island::LANDMARK_STREAM;
pub use landmarks::{
    flatten_around_landmarks, place_landmarks, Landmark, LandmarkConfig, LandmarkPlacement, LandmarkType,
};
pub use quantize::{carve_river, normalize, terrace};
