//! Biome map texture export.
//!
//! The map starts as one pixel per grid cell colored by the cell's biome,
//! with grid row 0 at the bottom of the image. It is then optionally
//! resampled and either box blurred or contour highlighted.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ImageBuffer, ImageEncoder, Rgb, RgbImage};
use thiserror::Error;

use crate::terrain::Island;

/// Errors that can occur during map export.
#[derive(Error, Debug)]
pub enum MapExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Map resolution must be above 0")]
    ZeroResolution,
}

/// Options for the biome map texture.
#[derive(Debug, Clone)]
pub struct MapTextureOptions {
    /// Output width and height. `None` keeps one pixel per cell.
    pub resolution: Option<u32>,
    /// Apply a 3x3 box blur after resampling.
    pub smooth: bool,
    /// Highlight color changes with `contour_color`. Ignored when `smooth` is set.
    pub contour: bool,
    /// Keep the map colors under the contour lines instead of a white background.
    pub overlay_contour: bool,
    pub contour_color: [u8; 3],
    pub compression: CompressionType,
    pub filter: FilterType,
}

impl Default for MapTextureOptions {
    fn default() -> Self {
        Self {
            resolution: None,
            smooth: false,
            contour: false,
            overlay_contour: true,
            contour_color: [40, 30, 20],
            compression: CompressionType::Default,
            filter: FilterType::Adaptive,
        }
    }
}

/// Rasterizes the island's biome map colors, one pixel per cell.
///
/// Image rows run top down while grid `y` runs up, so cell `(x, y)` lands on
/// pixel `(x, size - 1 - y)`.
pub fn render_map(island: &Island) -> RgbImage {
    let size = island.size();
    ImageBuffer::from_fn(size, size, |x, row| {
        Rgb(island.map_color(x, size - 1 - row).unwrap_or([0, 0, 0]))
    })
}

/// Nearest-neighbor resample to `resolution x resolution`.
pub fn resample(img: &RgbImage, resolution: u32) -> RgbImage {
    let (width, height) = img.dimensions();
    let rx = width as f32 / resolution as f32;
    let ry = height as f32 / resolution as f32;

    ImageBuffer::from_fn(resolution, resolution, |x, y| {
        let sx = ((x as f32 * rx) as u32).min(width.saturating_sub(1));
        let sy = ((y as f32 * ry) as u32).min(height.saturating_sub(1));
        *img.get_pixel(sx, sy)
    })
}

/// 3x3 box blur. Border pixels are copied unchanged.
pub fn smooth(img: &RgbImage) -> RgbImage {
    let (width, height) = img.dimensions();
    let mut out = img.clone();
    if width < 3 || height < 3 {
        return out;
    }

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let mut sum = [0u32; 3];
            for ny in y - 1..=y + 1 {
                for nx in x - 1..=x + 1 {
                    let p = img.get_pixel(nx, ny);
                    for c in 0..3 {
                        sum[c] += p[c] as u32;
                    }
                }
            }
            out.put_pixel(x, y, Rgb(sum.map(|s| (s / 9) as u8)));
        }
    }
    out
}

/// Paints `color` on every pixel whose 3x3 neighborhood holds a different color.
///
/// Other pixels keep their color when `overlay` is set and turn white otherwise.
pub fn highlight_contours(img: &RgbImage, color: [u8; 3], overlay: bool) -> RgbImage {
    let (width, height) = img.dimensions();

    ImageBuffer::from_fn(width, height, |x, y| {
        let center = img.get_pixel(x, y);
        let mut edge = false;
        for ny in y.saturating_sub(1)..=(y + 1).min(height - 1) {
            for nx in x.saturating_sub(1)..=(x + 1).min(width - 1) {
                edge |= img.get_pixel(nx, ny) != center;
            }
        }

        if edge {
            Rgb(color)
        } else if overlay {
            *center
        } else {
            Rgb([255, 255, 255])
        }
    })
}

/// Builds the map texture. Smoothing and contour highlighting are exclusive;
/// smoothing wins when both are set.
pub fn build_map_texture(island: &Island, options: &MapTextureOptions) -> Result<RgbImage, MapExportError> {
    let mut img = render_map(island);

    if let Some(resolution) = options.resolution {
        if resolution == 0 {
            return Err(MapExportError::ZeroResolution);
        }
        img = resample(&img, resolution);
    }
    if options.smooth {
        img = smooth(&img);
    } else if options.contour {
        img = highlight_contours(&img, options.contour_color, options.overlay_contour);
    }
    Ok(img)
}

/// Exports the biome map texture as an RGB PNG.
pub fn export_map_png(island: &Island, path: &Path, options: &MapTextureOptions) -> Result<(), MapExportError> {
    let img = build_map_texture(island, options)?;
    let (width, height) = img.dimensions();

    let writer = BufWriter::new(File::create(path)?);
    let encoder = PngEncoder::new_with_quality(writer, options.compression, options.filter);
    encoder.write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)?;

    Ok(())
}
