//! JSON run report: landmarks, mesh statistics and optional spawns.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::contour::ContourClass;
use crate::props::{CloudSpawn, PropSpawn};
use crate::terrain::{Island, Landmark};

/// Errors that can occur while writing the report.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Per-level mesh statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshSummary {
    pub level: u32,
    pub biome: String,
    pub vertices: usize,
    pub triangles: usize,
}

/// Summary of one generated island.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IslandReport {
    pub seed: u64,
    pub size: u32,
    pub levels: u32,
    pub water_height: f32,
    pub start_height: f32,
    pub landmarks: Vec<Landmark>,
    pub landmark_shortfall: bool,
    pub meshes: Vec<MeshSummary>,
    /// Contour count per level, if contours were traced.
    pub contours: Option<Vec<usize>>,
    /// Hole count per level, if contours were traced.
    pub contour_holes: Option<Vec<usize>>,
    pub props: Vec<PropSpawn>,
    pub clouds: Vec<CloudSpawn>,
}

impl IslandReport {
    /// Collects the report. Props and clouds are scattered only when `with_props` is set.
    pub fn from_island(island: &Island, with_props: bool) -> Self {
        let meshes = island
            .meshes()
            .iter()
            .map(|mesh| MeshSummary {
                level: mesh.level,
                biome: island
                    .biomes()
                    .get(mesh.biome)
                    .map(|b| b.name.clone())
                    .unwrap_or_default(),
                vertices: mesh.vertex_count(),
                triangles: mesh.triangle_count(),
            })
            .collect();

        let (props, clouds) = if with_props {
            (island.scatter_props(), island.scatter_clouds())
        } else {
            (Vec::new(), Vec::new())
        };

        Self {
            seed: island.seed(),
            size: island.size(),
            levels: island.levels(),
            water_height: island.water_height(),
            start_height: island.start_height(),
            landmarks: island.landmarks().to_vec(),
            landmark_shortfall: island.landmark_shortfall(),
            meshes,
            contours: island.contours().map(|levels| levels.iter().map(Vec::len).collect()),
            contour_holes: island.contour_classes().map(|levels| {
                levels
                    .iter()
                    .map(|classes| classes.iter().filter(|c| **c != ContourClass::Outer).count())
                    .collect()
            }),
            props,
            clouds,
        }
    }
}

/// Writes the report as pretty-printed JSON.
pub fn export_report(report: &IslandReport, path: &Path) -> Result<(), ReportError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.flush()?;
    Ok(())
}
