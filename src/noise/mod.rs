//! Noise generation module for terrain synthesis.
//!
//! Classic lattice gradient (Perlin) noise over a precomputed gradient field,
//! summed over octaves.

mod perlin;

pub use perlin::{fill_grid, lattice_width, NoiseError, NoiseField, PerlinNoiseConfig};
