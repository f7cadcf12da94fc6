//! Export module for saving island data to files.
//!
//! Supports 16-bit PNG height maps, RGB biome map textures, Wavefront
//! OBJ meshes and a JSON run report.

mod map;
mod obj;
mod png;
mod report;

pub use map::{
    build_map_texture, export_map_png, highlight_contours, render_map, resample, smooth, MapExportError,
    MapTextureOptions,
};
pub use obj::{export_obj, write_obj, ObjExportError};
pub use png::{export_height_png, PngExportError, PngExportOptions};
pub use report::{export_report, IslandReport, MeshSummary, ReportError};
