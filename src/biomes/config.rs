//! Default biome bands.

use super::{Biome, ResourceKind, ResourceWeight};

fn band(
    name: &str,
    separation: f32,
    color: [u8; 3],
    map_color: [u8; 3],
    resources: &[(ResourceKind, f32)],
) -> Biome {
    Biome {
        name: name.to_string(),
        separation,
        color,
        map_color,
        resources: resources
            .iter()
            .map(|&(resource, weight)| ResourceWeight::new(resource, weight))
            .collect(),
    }
}

/// Water up to the default water line, then sand, grassland, forest, rock and snow.
pub fn default_biomes() -> Vec<Biome> {
    use ResourceKind::*;

    vec![
        band("water", 0.2, [38, 92, 160], [70, 130, 200], &[(Fish, 0.04)]),
        band("sand", 0.3, [222, 204, 150], [240, 225, 170], &[(Stone, 0.02), (Wood, 0.01)]),
        band(
            "grassland",
            0.55,
            [110, 170, 70],
            [140, 195, 95],
            &[(Flower, 0.05), (Fruit, 0.02), (Wood, 0.02)],
        ),
        band("forest", 0.75, [50, 115, 50], [70, 140, 70], &[(Wood, 0.15), (Fruit, 0.03)]),
        band("rock", 0.9, [120, 115, 110], [150, 145, 140], &[(Stone, 0.08)]),
        band("snow", 1.0, [240, 245, 250], [255, 255, 255], &[]),
    ]
}
