//! Multi-octave Perlin noise over a seeded gradient lattice.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::terrain::HeightGrid;

/// Configuration for multi-octave Perlin noise generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerlinNoiseConfig {
    /// Seed of the gradient lattice.
    pub seed: u64,
    /// Number of octaves (1-4 typical). Octave `i` samples at `2^i` times the base frequency.
    pub octaves: u8,
    /// Amplitude decay per octave. Higher values keep more small-scale detail.
    pub persistence: f32,
    /// Lattice cell size in grid cells. Larger values give broader, smoother features.
    pub base_frequency: f32,
}

impl Default for PerlinNoiseConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            octaves: 3,
            persistence: 0.5,
            base_frequency: 5.0,
        }
    }
}

impl PerlinNoiseConfig {
    /// Creates a new noise configuration with the given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }
}

/// Errors raised while building a noise field.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NoiseError {
    #[error("Map size must be positive")]
    ZeroSize,
    #[error("Octave count must be at least 1")]
    ZeroOctaves,
    #[error("Base frequency must be a positive finite number, got {0}")]
    InvalidFrequency(f32),
    #[error("Gradient field overflow: octave {octaves} needs lattice index {needed} but the field is {width} wide")]
    GradientOverflow { octaves: u8, needed: i64, width: u32 },
}

/// Width of the gradient lattice a `size x size` map needs under `config`.
///
/// Fails if the parameters are degenerate or if the highest octave would
/// sample past the end of the `size * octaves` lattice anywhere on the map.
pub fn lattice_width(size: u32, config: &PerlinNoiseConfig) -> Result<u32, NoiseError> {
    if size == 0 {
        return Err(NoiseError::ZeroSize);
    }
    if config.octaves == 0 {
        return Err(NoiseError::ZeroOctaves);
    }
    if !(config.base_frequency.is_finite() && config.base_frequency > 0.0) {
        return Err(NoiseError::InvalidFrequency(config.base_frequency));
    }

    let width = size
        .checked_mul(config.octaves as u32)
        .ok_or(NoiseError::GradientOverflow {
            octaves: config.octaves,
            needed: i64::MAX,
            width: u32::MAX,
        })?;

    // Far corner of the map at the highest octave.
    let top_frequency = 2f32.powi(config.octaves as i32 - 1);
    let far = (size - 1) as f32 * top_frequency;
    let lattice = far / config.base_frequency + 1.0 / (2.0 * config.base_frequency);
    let needed = lattice.floor() as i64 + 1;
    if needed >= width as i64 {
        return Err(NoiseError::GradientOverflow {
            octaves: config.octaves,
            needed,
            width,
        });
    }
    Ok(width)
}

/// Linear congruential stream used to seed the gradient lattice.
///
/// Produces 15-bit outputs, so gradient components are drawn from `r % 10000`.
struct Lcg {
    state: u32,
}

impl Lcg {
    fn new(seed: u64) -> Self {
        Self { state: seed as u32 }
    }

    fn next(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(214_013).wrapping_add(2_531_011);
        (self.state >> 16) & 0x7fff
    }

    fn next_unit(&mut self) -> f32 {
        (self.next() % 10_000) as f32 / 10_000.0
    }
}

/// Immutable gradient lattice plus octave parameters.
///
/// The lattice is `(size * octaves)` cells wide; every cell holds a unit
/// direction vector.
#[derive(Debug, Clone)]
pub struct NoiseField {
    width: u32,
    gradients: Vec<[f32; 2]>,
    octaves: u8,
    persistence: f32,
    base_frequency: f32,
}

impl NoiseField {
    /// Builds the gradient field for a `size x size` map.
    ///
    /// Fails fast with the errors of [`lattice_width`].
    pub fn new(size: u32, config: &PerlinNoiseConfig) -> Result<Self, NoiseError> {
        let width = lattice_width(size, config)?;

        let mut rng = Lcg::new(config.seed);
        let cells = (width as usize) * (width as usize);
        let mut gradients = Vec::with_capacity(cells);
        for _ in 0..cells {
            let mut a = rng.next_unit();
            let b = rng.next_unit();
            if a == 0.0 && b == 0.0 {
                a = 1.0;
            }
            let len = (a * a + b * b).sqrt();
            gradients.push([a / len, b / len]);
        }

        Ok(Self {
            width,
            gradients,
            octaves: config.octaves,
            persistence: config.persistence,
            base_frequency: config.base_frequency,
        })
    }

    /// Width of the gradient lattice in cells.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Gradient vector at a lattice cell. Indices wrap around the lattice.
    pub fn gradient(&self, ix: i32, iy: i32) -> [f32; 2] {
        let w = self.width as i32;
        let idx = ix.rem_euclid(w) as usize * self.width as usize + iy.rem_euclid(w) as usize;
        self.gradients[idx]
    }

    /// Multi-octave noise at `(x, y)` in grid coordinates, remapped to `[0, 1]`.
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        let mut noise = 0.0f32;
        let mut amplitude = 1.0f32;
        let mut frequency = 1.0f32;
        let mut total_amplitude = 0.0f32;

        for _ in 0..self.octaves {
            noise += amplitude * self.perlin(x * frequency, y * frequency);
            total_amplitude += amplitude;
            amplitude *= self.persistence;
            frequency *= 2.0;
        }

        (noise / total_amplitude + 1.0) * 0.5
    }

    /// Single-octave Perlin noise, roughly in `[-1, 1]`.
    ///
    /// Coordinates are shifted by half a lattice cell so integer grid samples
    /// never land exactly on a lattice point, where the noise is always 0.
    pub fn perlin(&self, x: f32, y: f32) -> f32 {
        let shift = 1.0 / (2.0 * self.base_frequency);
        let px = x / self.base_frequency + shift;
        let py = y / self.base_frequency + shift;

        let x0 = px.floor() as i32;
        let x1 = x0 + 1;
        let y0 = py.floor() as i32;
        let y1 = y0 + 1;

        let sx = fade(px - x0 as f32);
        let sy = fade(py - y0 as f32);

        let n0 = self.dot_grid_gradient(x0, y0, px, py);
        let n1 = self.dot_grid_gradient(x1, y0, px, py);
        let ix0 = lerp(n0, n1, sx);

        let n0 = self.dot_grid_gradient(x0, y1, px, py);
        let n1 = self.dot_grid_gradient(x1, y1, px, py);
        let ix1 = lerp(n0, n1, sx);

        lerp(ix0, ix1, sy)
    }

    fn dot_grid_gradient(&self, ix: i32, iy: i32, x: f32, y: f32) -> f32 {
        let dx = x - ix as f32;
        let dy = y - iy as f32;
        let [gx, gy] = self.gradient(ix, iy);
        dx * gx + dy * gy
    }
}

/// 6t^5 - 15t^4 + 10t^3: zero first and second derivative at both ends.
fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    (1.0 - t) * a + b * t
}

/// Samples the noise field at every cell of a `size x size` grid.
pub fn fill_grid(field: &NoiseField, size: u32) -> HeightGrid {
    let mut grid = HeightGrid::new(size);
    for y in 0..size {
        for x in 0..size {
            grid.set(x, y, field.sample(x as f32, y as f32));
        }
    }
    grid
}
