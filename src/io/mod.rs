//! Mesh file I/O.
//!
//! This module provides functions for loading and saving meshes in various formats.
//!
//! # Supported Formats
//!
//! | Format | Extension | Load | Save | Notes |
//! |--------|-----------|------|------|-------|
//! | STL | `.stl` | ✓ | ✓ | Binary and ASCII; one record per triangle |
//! | PLY | `.ply` | ✓ | ✓ | Stanford polygon format, arbitrary polygons |
//!
//! # Welding
//!
//! By default coincident corners become one vertex and faces are linked
//! through their shared edges. Loading with [`LoadOptions::soup`] keeps every
//! face on its own instead, which is what stitching starts from:
//!
//! ```no_run
//! use seamweld::algo::stitch::stitch_mesh;
//! use seamweld::io::{load_with, save, LoadOptions};
//! use seamweld::mesh::HalfEdgeMesh;
//!
//! let mut mesh: HalfEdgeMesh = load_with("scan.stl", &LoadOptions::soup()).unwrap();
//! stitch_mesh(&mut mesh);
//! mesh.garbage_collection();
//! save(&mesh, "scan.ply").unwrap();
//! ```

pub mod ply;
pub mod stl;

use std::path::Path;

use nalgebra::Point3;

use crate::error::{MeshError, Result};
use crate::mesh::{HalfEdgeMesh, MeshIndex};

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// STL (stereolithography) format.
    Stl,
    /// PLY (Stanford polygon) format.
    Ply,
}

impl Format {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_lowercase().as_str() {
            "stl" => Some(Format::Stl),
            "ply" => Some(Format::Ply),
            _ => None,
        }
    }

    /// Detect format from file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }
}

/// Options for loading meshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Merge corners at identical positions into one vertex and link the
    /// faces around them (default: true). When false, every face gets its
    /// own vertices and all edges are border edges.
    pub weld_vertices: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            weld_vertices: true,
        }
    }
}

impl LoadOptions {
    /// Options that load every face on its own.
    pub fn soup() -> Self {
        Self {
            weld_vertices: false,
        }
    }

    /// Set whether coincident corners are welded.
    pub fn with_weld_vertices(mut self, weld_vertices: bool) -> Self {
        self.weld_vertices = weld_vertices;
        self
    }
}

fn detect_format(path: &Path) -> Result<Format> {
    Format::from_path(path).ok_or_else(|| MeshError::UnsupportedFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })
}

/// Load a mesh from a file with automatic format detection, welding
/// coincident vertices.
///
/// The format is determined by the file extension.
///
/// # Example
///
/// ```no_run
/// use seamweld::io::load;
/// use seamweld::mesh::HalfEdgeMesh;
///
/// let mesh: HalfEdgeMesh = load("model.stl").unwrap();
/// ```
pub fn load<P: AsRef<Path>, I: MeshIndex>(path: P) -> Result<HalfEdgeMesh<I>> {
    load_with(path, &LoadOptions::default())
}

/// Load a mesh from a file with automatic format detection.
pub fn load_with<P: AsRef<Path>, I: MeshIndex>(
    path: P,
    options: &LoadOptions,
) -> Result<HalfEdgeMesh<I>> {
    let path = path.as_ref();
    match detect_format(path)? {
        Format::Stl => stl::load_with(path, options),
        Format::Ply => ply::load_with(path, options),
    }
}

/// Save a mesh to a file with automatic format detection.
///
/// The format is determined by the file extension. Removed elements are
/// skipped, so the mesh does not need to be compacted first.
///
/// # Example
///
/// ```no_run
/// use seamweld::io::save;
/// use seamweld::mesh::HalfEdgeMesh;
///
/// let mesh: HalfEdgeMesh = HalfEdgeMesh::new();
/// save(&mesh, "output.ply").unwrap();
/// ```
pub fn save<P: AsRef<Path>, I: MeshIndex>(mesh: &HalfEdgeMesh<I>, path: P) -> Result<()> {
    let path = path.as_ref();
    match detect_format(path)? {
        Format::Stl => stl::save(mesh, path),
        Format::Ply => ply::save(mesh, path),
    }
}

/// Exact identity of a position, with `-0.0` and `0.0` treated alike.
pub(crate) fn position_key(p: &Point3<f64>) -> [u64; 3] {
    [
        (p.x + 0.0).to_bits(),
        (p.y + 0.0).to_bits(),
        (p.z + 0.0).to_bits(),
    ]
}
