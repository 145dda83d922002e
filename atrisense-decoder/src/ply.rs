//! ASCII PLY export.

use crate::error::{DecoderError, Result};
use atrisense_data::CartesianPoint;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const PLY_VERTEX_PROPERTIES: [&str; 4] = [
    "property float x",
    "property float y",
    "property float z",
    "property ushort intensity",
];

fn write_header<W: Write>(writer: &mut W, n_vertices: usize) -> std::io::Result<()> {
    writeln!(writer, "ply")?;
    writeln!(writer, "format ascii 1.0")?;
    writeln!(writer, "element vertex {}", n_vertices)?;
    for property in PLY_VERTEX_PROPERTIES {
        writeln!(writer, "{}", property)?;
    }
    writeln!(writer, "end_header")
}

fn write_vertex<W: Write>(writer: &mut W, point: &CartesianPoint) -> std::io::Result<()> {
    writeln!(
        writer,
        "{:.6} {:.6} {:.6} {}",
        point.x, point.y, point.z, point.intensity
    )
}

/// Writes the header followed by one line per point.
pub fn write_ply<W: Write>(points: &[CartesianPoint], mut writer: W) -> Result<()> {
    if points.is_empty() {
        return Err(DecoderError::NoPoints("export"));
    }
    write_header(&mut writer, points.len())?;
    for point in points {
        write_vertex(&mut writer, point)?;
    }
    Ok(())
}

/// Creates (or truncates) `path` and writes the point cloud into it.
pub fn export_ply<P: AsRef<Path>>(points: &[CartesianPoint], path: P) -> Result<()> {
    if points.is_empty() {
        return Err(DecoderError::NoPoints("export"));
    }
    let mut writer = BufWriter::new(File::create(path)?);
    write_ply(points, &mut writer)?;
    writer.flush()?;
    Ok(())
}
