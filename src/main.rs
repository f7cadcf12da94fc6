//! Islandgen CLI - procedural terraced island generator.
//!
//! Generates a terraced island from gradient noise and writes its height
//! map, biome map texture, terrace meshes and a JSON report.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;

use islandgen::config::IslandConfig;
use islandgen::contour::ContourClass;
use islandgen::export::{
    export_height_png, export_map_png, export_obj, export_report, IslandReport, MapTextureOptions,
    PngExportOptions,
};
use islandgen::pipeline::generate_island_with_callbacks;

/// Procedural terraced island generator.
#[derive(Parser)]
#[command(name = "islandgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new island.
    Generate(GenerateArgs),
    /// Print the default configuration as JSON.
    Config,
}

#[derive(Args)]
struct GenerateArgs {
    /// JSON configuration file. Flags below override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Random seed for reproducible generation.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Map width and height in grid cells.
    #[arg(long)]
    size: Option<u32>,

    /// Number of terraces.
    #[arg(short, long)]
    levels: Option<u32>,

    /// Number of noise octaves.
    #[arg(long)]
    octaves: Option<u8>,

    /// Amplitude decay per octave.
    #[arg(long)]
    persistence: Option<f32>,

    /// Base noise frequency (cells per lattice cell).
    #[arg(long)]
    frequency: Option<f32>,

    /// Exponent applied to normalized heights.
    #[arg(long)]
    noise_exponent: Option<i32>,

    /// Do not carve the river.
    #[arg(long)]
    no_river: bool,

    /// River width factor. Higher is narrower.
    #[arg(long)]
    river_width: Option<f32>,

    /// Number of landmarks to place.
    #[arg(long)]
    landmarks: Option<usize>,

    /// Trace cluster contours (experimental).
    #[arg(long)]
    contours: bool,

    /// Scatter props and clouds into the report.
    #[arg(long)]
    props: bool,

    /// Output directory for generated files.
    #[arg(short, long, default_value = "./output")]
    output: PathBuf,

    /// Base name for output files.
    #[arg(short, long, default_value = "island")]
    name: String,

    /// Map texture resolution. Defaults to one pixel per cell.
    #[arg(long)]
    map_resolution: Option<u32>,

    /// Blur the map texture.
    #[arg(long)]
    smooth_map: bool,

    /// Highlight biome borders on the map texture.
    #[arg(long)]
    contour_map: bool,

    /// Skip the OBJ mesh export.
    #[arg(long)]
    no_obj: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => run_generate(args),
        Commands::Config => match IslandConfig::default().to_json() {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing configuration: {}", e);
                std::process::exit(1);
            }
        },
    }
}

fn build_config(args: &GenerateArgs) -> IslandConfig {
    let mut config = match &args.config {
        Some(path) => match IslandConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => IslandConfig::default(),
    };

    apply_overrides(&mut config, args);
    config
}

/// Picks the run seed: the flag wins, then the config file's seed, then the clock.
fn resolve_seed(flag: Option<u64>, file_seed: Option<u64>) -> u64 {
    flag.or(file_seed).unwrap_or_else(|| {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    })
}

fn apply_overrides(config: &mut IslandConfig, args: &GenerateArgs) {
    let file_seed = args.config.as_ref().map(|_| config.seed);
    config.seed = resolve_seed(args.seed, file_seed);

    if let Some(size) = args.size {
        config.terrain.size = size;
    }
    if let Some(levels) = args.levels {
        config.terrain.levels = levels;
    }
    if let Some(octaves) = args.octaves {
        config.noise.octaves = octaves;
    }
    if let Some(persistence) = args.persistence {
        config.noise.persistence = persistence;
    }
    if let Some(frequency) = args.frequency {
        config.noise.base_frequency = frequency;
    }
    if let Some(exponent) = args.noise_exponent {
        config.terrain.noise_exponent = exponent;
    }
    if args.no_river {
        config.terrain.add_river = false;
    }
    if let Some(width) = args.river_width {
        config.terrain.river_width_factor = width;
    }
    if let Some(count) = args.landmarks {
        config.landmarks.count = count;
    }
    if args.contours {
        config.experimental.contours = true;
    }
}

fn run_generate(args: GenerateArgs) {
    let config = build_config(&args);

    println!("Islandgen - Terraced Island Generator");
    println!("=====================================");
    println!("Size: {}x{}", config.terrain.size, config.terrain.size);
    println!("Levels: {}", config.terrain.levels);
    println!("Seed: {}", config.seed);
    println!("Output: {}", args.output.display());

    let start = Instant::now();
    println!("\nRunning generation pipeline...");
    let island = match generate_island_with_callbacks(
        &config,
        |name, i, total| println!("  [{}/{}] Starting: {}", i + 1, total, name),
        |name, i, total| println!("  [{}/{}] Completed: {}", i + 1, total, name),
    ) {
        Ok(island) => island,
        Err(e) => {
            eprintln!("Error during generation: {}", e);
            std::process::exit(1);
        }
    };
    println!("Generation completed in {:.2?}", start.elapsed());

    let vertices: usize = island.meshes().iter().map(|m| m.vertex_count()).sum();
    let triangles: usize = island.meshes().iter().map(|m| m.triangle_count()).sum();
    println!("Meshes: {} ({} vertices, {} triangles)", island.meshes().len(), vertices, triangles);
    println!("Landmarks: {}", island.landmarks().len());
    for landmark in island.landmarks() {
        println!(
            "  {} at ({}, {}), radius {}",
            landmark.name, landmark.grid_position.x, landmark.grid_position.y, landmark.radius
        );
    }
    if island.landmark_shortfall() {
        println!("  Warning: fewer landmarks placed than requested");
    }
    println!("Water height: {:.1}", island.water_height());
    println!("Start height: {:.1}", island.start_height());
    if let Some(contours) = island.contours() {
        let total: usize = contours.iter().map(Vec::len).sum();
        let holes = island
            .contour_classes()
            .map(|levels| levels.iter().flatten().filter(|c| **c != ContourClass::Outer).count())
            .unwrap_or(0);
        println!("Contours: {} ({} holes)", total, holes);
    }

    println!("\nExporting...");
    let export_start = Instant::now();
    if let Err(e) = std::fs::create_dir_all(&args.output) {
        eprintln!("Error creating output directory: {}", e);
        std::process::exit(1);
    }

    let height_path = args.output.join(format!("{}_height.png", args.name));
    if let Err(e) = export_height_png(&island.grid, &height_path, &PngExportOptions::default()) {
        eprintln!("Error exporting height map: {}", e);
        std::process::exit(1);
    }
    println!("  Exported height map: {}", height_path.display());

    let map_path = args.output.join(format!("{}_map.png", args.name));
    let map_options = MapTextureOptions {
        resolution: args.map_resolution,
        smooth: args.smooth_map,
        contour: args.contour_map,
        ..Default::default()
    };
    if let Err(e) = export_map_png(&island, &map_path, &map_options) {
        eprintln!("Error exporting map texture: {}", e);
        std::process::exit(1);
    }
    println!("  Exported map texture: {}", map_path.display());

    if !args.no_obj {
        let obj_path = args.output.join(format!("{}.obj", args.name));
        if let Err(e) = export_obj(island.meshes(), island.biomes(), &obj_path) {
            eprintln!("Error exporting meshes: {}", e);
            std::process::exit(1);
        }
        println!("  Exported meshes: {}", obj_path.display());
    }

    let report = IslandReport::from_island(&island, args.props);
    if args.props {
        println!("Props: {}, clouds: {}", report.props.len(), report.clouds.len());
    }
    let report_path = args.output.join(format!("{}_report.json", args.name));
    if let Err(e) = export_report(&report, &report_path) {
        eprintln!("Error exporting report: {}", e);
        std::process::exit(1);
    }
    println!("  Exported report: {}", report_path.display());

    println!("Export completed in {:.2?}", export_start.elapsed());
    println!("\nDone!");
}
