//! Wavefront OBJ export of terrace meshes.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use crate::biomes::BiomeTable;
use crate::mesh::Mesh;

/// Errors that can occur during OBJ export.
#[derive(Error, Debug)]
pub enum ObjExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Mesh for level {0} references a missing vertex")]
    IndexOutOfBounds(u32),
}

/// Writes every mesh as its own object, named after its level and biome.
///
/// Vertices are written z-up as generated. Faces reference both the
/// position and texture coordinate of each corner.
pub fn write_obj<W: Write>(writer: &mut W, meshes: &[Mesh], biomes: &BiomeTable) -> Result<(), ObjExportError> {
    writeln!(writer, "# islandgen terrace meshes")?;

    let mut offset = 1u32;
    for mesh in meshes {
        if !mesh.indices_in_bounds() {
            return Err(ObjExportError::IndexOutOfBounds(mesh.level));
        }

        let biome = biomes.get(mesh.biome).map(|b| b.name.as_str()).unwrap_or("none");
        writeln!(writer, "o level_{}_{}", mesh.level, biome)?;
        for v in &mesh.vertices {
            writeln!(writer, "v {} {} {}", v.x, v.y, v.z)?;
        }
        for i in 0..mesh.vertices.len() {
            let uv = mesh.uvs.get(i).copied().unwrap_or_default();
            writeln!(writer, "vt {} {}", uv.x, uv.y)?;
        }
        for t in &mesh.triangles {
            let [a, b, c] = t.map(|i| i + offset);
            writeln!(writer, "f {a}/{a} {b}/{b} {c}/{c}")?;
        }

        offset += mesh.vertices.len() as u32;
    }

    Ok(())
}

/// Exports meshes to an OBJ file.
pub fn export_obj(meshes: &[Mesh], biomes: &BiomeTable, path: &Path) -> Result<(), ObjExportError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_obj(&mut writer, meshes, biomes)?;
    writer.flush()?;
    Ok(())
}
