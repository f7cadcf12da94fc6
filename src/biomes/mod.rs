//! Biome bands over terrace height.
//!
//! Each biome covers the terraces up to its separation threshold and carries
//! a weighted resource table used when scattering props.

mod config;

pub use config::default_biomes;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::terrain::level_of;

/// Harvestable resource kinds a prop can provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Wood,
    Stone,
    Fish,
    Flower,
    Fruit,
}

impl ResourceKind {
    pub fn name(&self) -> &'static str {
        match self {
            ResourceKind::Wood => "wood",
            ResourceKind::Stone => "stone",
            ResourceKind::Fish => "fish",
            ResourceKind::Flower => "flower",
            ResourceKind::Fruit => "fruit",
        }
    }
}

/// Spawn probability of one resource.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceWeight {
    pub resource: ResourceKind,
    pub weight: f32,
}

impl ResourceWeight {
    pub fn new(resource: ResourceKind, weight: f32) -> Self {
        Self { resource, weight }
    }
}

/// A height band of the island.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Biome {
    pub name: String,
    /// Upper height fraction of the band, in `[0, 1]`.
    pub separation: f32,
    /// RGB color of the biome's meshes.
    pub color: [u8; 3],
    /// RGB color of the biome on the 2D map.
    pub map_color: [u8; 3],
    /// Resources that may spawn on this biome.
    #[serde(default)]
    pub resources: Vec<ResourceWeight>,
}

impl Biome {
    /// Draws a resource from the weighted table, or `None` for no spawn.
    ///
    /// Weights summing past 1 are scaled down to sum to exactly 1. Whatever
    /// probability mass the weights leave below 1 means nothing spawns.
    pub fn pick_resource<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<ResourceKind> {
        if self.resources.is_empty() {
            return None;
        }

        let total: f32 = self.resources.iter().map(|r| r.weight).sum();
        let scale = if total > 1.0 { 1.0 / total } else { 1.0 };

        let draw: f32 = rng.random();
        let mut cumulative = 0.0;
        for entry in &self.resources {
            cumulative += entry.weight * scale;
            if draw < cumulative {
                return Some(entry.resource);
            }
        }
        None
    }
}

/// Biomes of a run, sorted by separation threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiomeTable {
    biomes: Vec<Biome>,
}

impl BiomeTable {
    /// Sorts the biomes by separation, keeping the input order among equal thresholds.
    pub fn new(mut biomes: Vec<Biome>) -> Self {
        biomes.sort_by(|a, b| a.separation.total_cmp(&b.separation));
        Self { biomes }
    }

    pub fn len(&self) -> usize {
        self.biomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.biomes.is_empty()
    }

    pub fn biomes(&self) -> &[Biome] {
        &self.biomes
    }

    pub fn get(&self, index: usize) -> Option<&Biome> {
        self.biomes.get(index)
    }

    /// Index of the biome covering terrace `level`.
    ///
    /// That is the first biome whose separation, converted to a terrace,
    /// reaches `level`. Levels above every band fall to the last biome.
    pub fn index_for_level(&self, level: u32, levels: u32) -> usize {
        self.biomes
            .iter()
            .position(|b| level_of(b.separation, levels) >= level)
            .unwrap_or(self.biomes.len().saturating_sub(1))
    }

    /// Biome covering terrace `level`, or `None` for an empty table.
    pub fn for_level(&self, level: u32, levels: u32) -> Option<&Biome> {
        self.biomes.get(self.index_for_level(level, levels))
    }
}

impl Default for BiomeTable {
    fn default() -> Self {
        Self::new(default_biomes())
    }
}
