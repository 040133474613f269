//! PLY (Stanford polygon) format support.
//!
//! This module provides loading and saving of meshes in the PLY format,
//! also known as the Polygon File Format or Stanford Triangle Format.
//! Faces keep their polygon size in both directions.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use log::debug;
use nalgebra::Point3;
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};

use super::LoadOptions;
use crate::error::{MeshError, Result};
use crate::mesh::{
    build_from_polygons, build_polygon_soup, to_face_vertex_polygons, HalfEdgeMesh, MeshIndex,
};

/// Load a mesh from a PLY file.
///
/// # Example
///
/// ```no_run
/// use seamweld::io::ply;
/// use seamweld::mesh::HalfEdgeMesh;
///
/// let mesh: HalfEdgeMesh = ply::load("model.ply").unwrap();
/// ```
pub fn load<P: AsRef<Path>, I: MeshIndex>(path: P) -> Result<HalfEdgeMesh<I>> {
    load_with(path, &LoadOptions::default())
}

/// Load a mesh from a PLY file.
///
/// With [`LoadOptions::weld_vertices`] the face indices are used as they are,
/// so faces sharing an index share the vertex. Without it every face corner
/// becomes its own vertex.
pub fn load_with<P: AsRef<Path>, I: MeshIndex>(
    path: P,
    options: &LoadOptions,
) -> Result<HalfEdgeMesh<I>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let load_error = |message: &str| MeshError::LoadError {
        path: path.to_path_buf(),
        message: message.to_string(),
    };

    let parser = Parser::<DefaultElement>::new();
    let ply = parser.read_ply(&mut reader).map_err(|e| MeshError::LoadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let vertex_element = ply
        .payload
        .get("vertex")
        .ok_or_else(|| load_error("PLY file has no vertex element"))?;

    let mut vertices: Vec<Point3<f64>> = Vec::with_capacity(vertex_element.len());
    for vertex in vertex_element {
        let x = get_float_property(vertex, "x")
            .ok_or_else(|| load_error("vertex missing x coordinate"))?;
        let y = get_float_property(vertex, "y")
            .ok_or_else(|| load_error("vertex missing y coordinate"))?;
        let z = get_float_property(vertex, "z")
            .ok_or_else(|| load_error("vertex missing z coordinate"))?;
        vertices.push(Point3::new(x, y, z));
    }

    let face_element = ply
        .payload
        .get("face")
        .ok_or_else(|| load_error("PLY file has no face element"))?;

    let mut faces: Vec<Vec<usize>> = Vec::with_capacity(face_element.len());
    let mut short = 0;
    for face in face_element {
        let indices = get_list_property(face, "vertex_indices")
            .or_else(|| get_list_property(face, "vertex_index"))
            .ok_or_else(|| load_error("face missing vertex_indices property"))?;

        if indices.len() < 3 {
            short += 1;
            continue;
        }
        faces.push(indices);
    }

    if short > 0 {
        debug!("{}: skipped {} faces with fewer than 3 corners", path.display(), short);
    }

    if faces.is_empty() {
        return Err(load_error("PLY file contains no faces"));
    }

    if options.weld_vertices {
        build_from_polygons(&vertices, &faces)
    } else {
        build_polygon_soup(&vertices, &faces)
    }
}

fn get_float_property(element: &DefaultElement, name: &str) -> Option<f64> {
    match element.get(name)? {
        Property::Float(v) => Some(*v as f64),
        Property::Double(v) => Some(*v),
        Property::Int(v) => Some(*v as f64),
        Property::UInt(v) => Some(*v as f64),
        Property::Short(v) => Some(*v as f64),
        Property::UShort(v) => Some(*v as f64),
        Property::Char(v) => Some(*v as f64),
        Property::UChar(v) => Some(*v as f64),
        _ => None,
    }
}

fn get_list_property(element: &DefaultElement, name: &str) -> Option<Vec<usize>> {
    match element.get(name)? {
        Property::ListInt(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUInt(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListShort(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUShort(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListChar(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUChar(v) => Some(v.iter().map(|&x| x as usize).collect()),
        _ => None,
    }
}

/// Save a mesh to a PLY file (ASCII format, double precision).
///
/// # Example
///
/// ```no_run
/// use seamweld::io::ply;
/// use seamweld::mesh::HalfEdgeMesh;
///
/// let mesh: HalfEdgeMesh = HalfEdgeMesh::new();
/// ply::save(&mesh, "output.ply").unwrap();
/// ```
pub fn save<P: AsRef<Path>, I: MeshIndex>(mesh: &HalfEdgeMesh<I>, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let (vertices, faces) = to_face_vertex_polygons(mesh);

    writeln!(writer, "ply")?;
    writeln!(writer, "format ascii 1.0")?;
    writeln!(writer, "comment Generated by seamweld")?;
    writeln!(writer, "element vertex {}", vertices.len())?;
    writeln!(writer, "property double x")?;
    writeln!(writer, "property double y")?;
    writeln!(writer, "property double z")?;
    writeln!(writer, "element face {}", faces.len())?;
    writeln!(writer, "property list uchar int vertex_indices")?;
    writeln!(writer, "end_header")?;

    for v in &vertices {
        writeln!(writer, "{} {} {}", v.x, v.y, v.z)?;
    }

    for f in &faces {
        write!(writer, "{}", f.len())?;
        for i in f {
            write!(writer, " {}", i)?;
        }
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::stitch::stitch_mesh;
    use tempfile::NamedTempFile;

    fn two_quads() -> HalfEdgeMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
        ];
        build_from_polygons(&vertices, &[[0, 1, 4, 3], [1, 2, 5, 4]]).unwrap()
    }

    #[test]
    fn test_polygons_round_trip() {
        let file = NamedTempFile::with_suffix(".ply").unwrap();
        save(&two_quads(), file.path()).unwrap();

        let mesh: HalfEdgeMesh = load(file.path()).unwrap();

        assert_eq!(mesh.num_vertices(), 6);
        assert_eq!(mesh.num_faces(), 2);
        assert_eq!(mesh.num_edges(), 7);
        assert_eq!(mesh.num_interior_edges(), 1);
        assert!((mesh.surface_area() - 2.0).abs() < 1e-12);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_soup_load_then_stitch() {
        let file = NamedTempFile::with_suffix(".ply").unwrap();
        save(&two_quads(), file.path()).unwrap();

        let mut mesh: HalfEdgeMesh = load_with(file.path(), &LoadOptions::soup()).unwrap();

        assert_eq!(mesh.num_vertices(), 8);
        assert_eq!(mesh.num_interior_edges(), 0);

        let report = stitch_mesh(&mut mesh);
        assert_eq!(report.pairs_stitched, 1);
        assert_eq!(mesh.num_vertices(), 6);
        assert_eq!(mesh.num_interior_edges(), 1);
        assert_eq!(mesh.border_loops().len(), 1);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_header_without_faces() {
        let mut file = NamedTempFile::with_suffix(".ply").unwrap();
        write!(
            file,
            "ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\nproperty float y\nproperty float z\nend_header\n0 0 0\n"
        )
        .unwrap();
        file.flush().unwrap();

        let err = load::<_, u32>(file.path()).unwrap_err();
        assert!(matches!(err, MeshError::LoadError { .. }));
    }
}
