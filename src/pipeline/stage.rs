//! Generation stage trait and pipeline orchestration.

use thiserror::Error;

use crate::config::ConfigError;
use crate::contour::{classify, trace_contours, ContourClass, ContourError};
use crate::mesh::{build_top_surface, perform_extrusion, Mesh};
use crate::noise::{fill_grid, NoiseError, NoiseField};
use crate::terrain::{
    carve_river, clamp_to_map, cluster_levels, flatten_around_landmarks, inflate, normalize, place_landmarks,
    terrace, Island, LANDMARK_STREAM,
};

/// Unique identifier for generation stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageId {
    /// Gradient noise sampled into the height grid.
    Noise,
    /// Normalization, exponent shaping and river carving.
    Normalize,
    /// Landmark placement and flattening.
    Landmarks,
    /// Terrace quantization.
    Terrace,
    /// Cumulative per-level clustering.
    Clusters,
    /// Contour tracing (experimental).
    Contours,
    /// Top surfaces, extrusion and welding.
    Meshes,
}

impl StageId {
    /// Returns the name of the stage.
    pub fn name(&self) -> &'static str {
        match self {
            StageId::Noise => "noise",
            StageId::Normalize => "normalize",
            StageId::Landmarks => "landmarks",
            StageId::Terrace => "terrace",
            StageId::Clusters => "clusters",
            StageId::Contours => "contours",
            StageId::Meshes => "meshes",
        }
    }
}

/// Errors that can occur during pipeline execution.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Stage '{0}' failed: {1}")]
    StageFailed(String, String),
    #[error("Missing dependency: stage '{0}' requires '{1}'")]
    MissingDependency(String, String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
    #[error("Noise field: {0}")]
    Noise(#[from] NoiseError),
}

/// Trait for implementing generation stages.
///
/// Each stage transforms the island in place, building upon the stages
/// listed in [`GenerationStage::dependencies`].
pub trait GenerationStage: Send + Sync {
    /// Returns the unique identifier for this stage.
    fn id(&self) -> StageId;

    /// Returns a human-readable name for the stage.
    fn name(&self) -> &str;

    /// Returns the stage IDs that must be executed before this stage.
    fn dependencies(&self) -> &[StageId] {
        &[]
    }

    /// Executes the generation stage, modifying the island in place.
    fn execute(&self, island: &mut Island) -> Result<(), PipelineError>;
}

/// Orchestrates multiple generation stages into a complete pipeline.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn GenerationStage>>,
}

impl Pipeline {
    /// Creates a new empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pipeline with every island stage in order.
    pub fn standard() -> Self {
        let mut pipeline = Self::new();
        pipeline
            .add_stage(NoiseStage)
            .add_stage(NormalizeStage)
            .add_stage(LandmarkStage)
            .add_stage(TerraceStage)
            .add_stage(ClusterStage)
            .add_stage(ContourStage)
            .add_stage(MeshStage);
        pipeline
    }

    /// Adds a stage to the pipeline.
    pub fn add_stage<S: GenerationStage + 'static>(&mut self, stage: S) -> &mut Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Returns the number of stages in the pipeline.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Executes all stages in order on the given island.
    pub fn run(&self, island: &mut Island) -> Result<(), PipelineError> {
        self.run_with_callbacks(island, |_, _, _| {}, |_, _, _| {})
    }

    /// Executes all stages with progress callbacks.
    ///
    /// # Arguments
    /// * `island` - The island to generate
    /// * `on_stage_start` - Called when each stage begins
    /// * `on_stage_complete` - Called when each stage finishes
    pub fn run_with_callbacks<F1, F2>(
        &self,
        island: &mut Island,
        mut on_stage_start: F1,
        mut on_stage_complete: F2,
    ) -> Result<(), PipelineError>
    where
        F1: FnMut(&str, usize, usize),
        F2: FnMut(&str, usize, usize),
    {
        let total = self.stages.len();
        let mut completed: Vec<StageId> = Vec::new();

        for (i, stage) in self.stages.iter().enumerate() {
            on_stage_start(stage.name(), i, total);

            for dep in stage.dependencies() {
                if !completed.contains(dep) {
                    return Err(PipelineError::MissingDependency(
                        stage.name().to_string(),
                        dep.name().to_string(),
                    ));
                }
            }

            log::info!("Running stage '{}' ({}/{})", stage.name(), i + 1, total);
            stage.execute(island)?;
            completed.push(stage.id());

            on_stage_complete(stage.name(), i, total);
        }

        Ok(())
    }
}

/// Samples multi-octave gradient noise into the height grid.
pub struct NoiseStage;

impl GenerationStage for NoiseStage {
    fn id(&self) -> StageId {
        StageId::Noise
    }

    fn name(&self) -> &str {
        "Noise Field"
    }

    fn execute(&self, island: &mut Island) -> Result<(), PipelineError> {
        let size = island.size();
        let field = NoiseField::new(size, &island.config().noise_config())?;
        island.grid = fill_grid(&field, size);

        let (min, max) = island.grid.height_range();
        log::debug!("Noise range [{min:.4}, {max:.4}] on a {size}x{size} grid");
        Ok(())
    }
}

/// Rescales heights to `[0, 1]`, applies the exponent and carves the river.
pub struct NormalizeStage;

impl GenerationStage for NormalizeStage {
    fn id(&self) -> StageId {
        StageId::Normalize
    }

    fn name(&self) -> &str {
        "Normalization"
    }

    fn dependencies(&self) -> &[StageId] {
        &[StageId::Noise]
    }

    fn execute(&self, island: &mut Island) -> Result<(), PipelineError> {
        let terrain = island.config().terrain.clone();
        normalize(&mut island.grid, terrain.noise_exponent);
        if terrain.add_river {
            carve_river(&mut island.grid, terrain.river_width_factor);
        }
        Ok(())
    }
}

/// Places landmarks and flattens the terrain around them.
pub struct LandmarkStage;

impl GenerationStage for LandmarkStage {
    fn id(&self) -> StageId {
        StageId::Landmarks
    }

    fn name(&self) -> &str {
        "Landmark Placement"
    }

    fn dependencies(&self) -> &[StageId] {
        &[StageId::Normalize]
    }

    fn execute(&self, island: &mut Island) -> Result<(), PipelineError> {
        let mut rng = island.rng(LANDMARK_STREAM);
        let config = island.config();
        let placement = place_landmarks(&config.terrain, &config.landmarks, &mut rng);
        let levels = config.terrain.levels;

        flatten_around_landmarks(&mut island.grid, &placement.landmarks, levels);
        log::debug!(
            "Placed {}/{} landmarks",
            placement.landmarks.len(),
            placement.requested
        );
        island.placement = Some(placement);
        Ok(())
    }
}

/// Snaps heights onto terrace plateaus.
pub struct TerraceStage;

impl GenerationStage for TerraceStage {
    fn id(&self) -> StageId {
        StageId::Terrace
    }

    fn name(&self) -> &str {
        "Terracing"
    }

    fn dependencies(&self) -> &[StageId] {
        &[StageId::Landmarks]
    }

    fn execute(&self, island: &mut Island) -> Result<(), PipelineError> {
        let levels = island.levels();
        terrace(&mut island.grid, levels);
        Ok(())
    }
}

/// Groups grid points into cumulative per-level clusters.
pub struct ClusterStage;

impl GenerationStage for ClusterStage {
    fn id(&self) -> StageId {
        StageId::Clusters
    }

    fn name(&self) -> &str {
        "Level Clustering"
    }

    fn dependencies(&self) -> &[StageId] {
        &[StageId::Terrace]
    }

    fn execute(&self, island: &mut Island) -> Result<(), PipelineError> {
        let clusters = cluster_levels(&island.grid, island.levels());
        for cluster in &clusters {
            log::debug!("Level {}: {} points", cluster.level, cluster.len());
        }
        island.clusters = Some(clusters);
        Ok(())
    }
}

/// Traces the boundary of every cluster when `experimental.contours` is set.
///
/// Tracing is best-effort: if any level fails, the island keeps no contours.
pub struct ContourStage;

impl GenerationStage for ContourStage {
    fn id(&self) -> StageId {
        StageId::Contours
    }

    fn name(&self) -> &str {
        "Contour Tracing"
    }

    fn dependencies(&self) -> &[StageId] {
        &[StageId::Clusters]
    }

    fn execute(&self, island: &mut Island) -> Result<(), PipelineError> {
        if !island.config().experimental.contours {
            log::debug!("Contour tracing disabled");
            return Ok(());
        }

        let Some(clusters) = island.clusters.as_ref() else {
            return Err(PipelineError::StageFailed(
                self.name().to_string(),
                "clusters already consumed".to_string(),
            ));
        };

        let traced: Result<Vec<_>, ContourError> =
            clusters.iter().map(|cluster| trace_contours(&cluster.points)).collect();

        match traced {
            Ok(levels) => {
                let classes: Vec<Vec<ContourClass>> = levels.iter().map(|contours| classify(contours)).collect();
                for (level, (contours, classes)) in levels.iter().zip(&classes).enumerate() {
                    let outer = classes.iter().filter(|c| **c == ContourClass::Outer).count();
                    log::debug!("Level {level}: {} contours, {outer} outer", contours.len());
                }
                island.contours = Some(levels);
                island.contour_classes = Some(classes);
            }
            Err(e) => {
                log::warn!("Contour tracing failed, continuing without contours: {e}");
                island.contours = None;
                island.contour_classes = None;
            }
        }
        Ok(())
    }
}

/// Builds one mesh per level from the clusters.
///
/// Every level above the lowest is extruded one terrace down and welded; a
/// level whose extrusion fails keeps its flat top surface. Meshes are scaled
/// to world space last.
pub struct MeshStage;

impl GenerationStage for MeshStage {
    fn id(&self) -> StageId {
        StageId::Meshes
    }

    fn name(&self) -> &str {
        "Mesh Construction"
    }

    fn dependencies(&self) -> &[StageId] {
        &[StageId::Clusters]
    }

    fn execute(&self, island: &mut Island) -> Result<(), PipelineError> {
        let Some(clusters) = island.clusters.take() else {
            return Err(PipelineError::StageFailed(
                self.name().to_string(),
                "no clusters to mesh".to_string(),
            ));
        };

        let config = island.config();
        let terrain = &config.terrain;
        let profile = terrain.extrusion_profile();
        let mut meshes: Vec<Mesh> = Vec::with_capacity(clusters.len());

        for mut cluster in clusters {
            if terrain.inflate_clusters {
                inflate(&mut cluster.points, &island.grid);
                clamp_to_map(&mut cluster.points, terrain.size);
            }

            let mut mesh = build_top_surface(&cluster, terrain.size, terrain.height_scale);
            mesh.biome = island.biomes().index_for_level(cluster.level, terrain.levels);

            if cluster.level > 0 && !mesh.is_empty() {
                match perform_extrusion(
                    &mesh,
                    &profile,
                    terrain.global_scale,
                    config.mesh.weld_epsilon,
                    config.mesh.invert_faces,
                ) {
                    Ok(extruded) => mesh = extruded,
                    Err(e) => log::warn!("Level {}: extrusion failed, keeping top surface: {e}", cluster.level),
                }
            }

            mesh.scale(terrain.global_scale);
            log::debug!(
                "Level {}: {} vertices, {} triangles",
                mesh.level,
                mesh.vertex_count(),
                mesh.triangle_count()
            );
            meshes.push(mesh);
        }

        island.meshes = meshes;
        Ok(())
    }
}
