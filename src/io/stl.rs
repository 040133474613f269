//! STL (stereolithography) format support.
//!
//! STL stores every triangle with its own three corners, so a file read as-is
//! is a triangle soup. Loading welds corners at identical positions unless
//! [`LoadOptions::weld_vertices`] is off. Both binary and ASCII files are read;
//! files are written as binary.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use log::debug;
use nalgebra::Point3;

use super::{position_key, LoadOptions};
use crate::error::{MeshError, Result};
use crate::mesh::{build_from_triangles, to_face_vertex, HalfEdgeMesh, MeshIndex};

/// Load a mesh from an STL file, welding coincident corners.
///
/// # Example
///
/// ```no_run
/// use seamweld::io::stl;
/// use seamweld::mesh::HalfEdgeMesh;
///
/// let mesh: HalfEdgeMesh = stl::load("model.stl").unwrap();
/// ```
pub fn load<P: AsRef<Path>, I: MeshIndex>(path: P) -> Result<HalfEdgeMesh<I>> {
    load_with(path, &LoadOptions::default())
}

/// Load a mesh from an STL file.
///
/// Triangles with two corners at the same position are dropped.
pub fn load_with<P: AsRef<Path>, I: MeshIndex>(
    path: P,
    options: &LoadOptions,
) -> Result<HalfEdgeMesh<I>> {
    let path = path.as_ref();
    let mut file = File::open(path)?;

    let stl = stl_io::read_stl(&mut file).map_err(|e| MeshError::LoadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut vertices: Vec<Point3<f64>> = Vec::new();
    let mut faces: Vec<[usize; 3]> = Vec::with_capacity(stl.faces.len());
    let mut welded: HashMap<[u64; 3], usize> = HashMap::new();
    let mut degenerate = 0;

    for tri in &stl.faces {
        let corners = tri.vertices.map(|i| {
            let v = &stl.vertices[i];
            Point3::new(v[0] as f64, v[1] as f64, v[2] as f64)
        });
        let keys = corners.map(|p| position_key(&p));
        if keys[0] == keys[1] || keys[1] == keys[2] || keys[0] == keys[2] {
            degenerate += 1;
            continue;
        }

        let mut face = [0; 3];
        for k in 0..3 {
            face[k] = if options.weld_vertices {
                *welded.entry(keys[k]).or_insert_with(|| {
                    vertices.push(corners[k]);
                    vertices.len() - 1
                })
            } else {
                vertices.push(corners[k]);
                vertices.len() - 1
            };
        }
        faces.push(face);
    }

    if degenerate > 0 {
        debug!("{}: skipped {} degenerate triangles", path.display(), degenerate);
    }

    if faces.is_empty() {
        return Err(MeshError::LoadError {
            path: path.to_path_buf(),
            message: "STL file contains no valid triangles".to_string(),
        });
    }

    build_from_triangles(&vertices, &faces)
}

/// Save a mesh to a binary STL file.
///
/// Polygons are split into fans of triangles.
///
/// # Example
///
/// ```no_run
/// use seamweld::io::stl;
/// use seamweld::mesh::HalfEdgeMesh;
///
/// let mesh: HalfEdgeMesh = HalfEdgeMesh::new();
/// stl::save(&mesh, "output.stl").unwrap();
/// ```
pub fn save<P: AsRef<Path>, I: MeshIndex>(mesh: &HalfEdgeMesh<I>, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let (vertices, faces) = to_face_vertex(mesh);

    let triangles: Vec<stl_io::Triangle> = faces
        .iter()
        .map(|f| {
            let p0 = &vertices[f[0]];
            let p1 = &vertices[f[1]];
            let p2 = &vertices[f[2]];

            let n = (p1 - p0).cross(&(p2 - p0)).normalize();

            stl_io::Triangle {
                normal: stl_io::Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                vertices: [
                    stl_io::Vertex::new([p0.x as f32, p0.y as f32, p0.z as f32]),
                    stl_io::Vertex::new([p1.x as f32, p1.y as f32, p1.z as f32]),
                    stl_io::Vertex::new([p2.x as f32, p2.y as f32, p2.z as f32]),
                ],
            }
        })
        .collect();

    stl_io::write_stl(&mut writer, triangles.iter()).map_err(|e| MeshError::SaveError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::stitch::stitch_mesh;
    use crate::mesh::build_polygon_soup;
    use tempfile::{tempdir, NamedTempFile};

    fn cube_soup() -> HalfEdgeMesh {
        let corners = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ];
        let faces = [
            [0, 3, 2],
            [0, 2, 1],
            [4, 5, 6],
            [4, 6, 7],
            [0, 1, 5],
            [0, 5, 4],
            [3, 7, 6],
            [3, 6, 2],
            [0, 4, 7],
            [0, 7, 3],
            [1, 2, 6],
            [1, 6, 5],
        ];
        build_polygon_soup(&corners, &faces).unwrap()
    }

    #[test]
    fn test_soup_round_trip_then_stitch() {
        let file = NamedTempFile::with_suffix(".stl").unwrap();
        save(&cube_soup(), file.path()).unwrap();

        let mut mesh: HalfEdgeMesh = load_with(file.path(), &LoadOptions::soup()).unwrap();

        assert_eq!(mesh.num_faces(), 12);
        assert_eq!(mesh.num_vertices(), 36);

        stitch_mesh(&mut mesh);
        assert_eq!(mesh.num_vertices(), 8);
        assert_eq!(mesh.num_border_halfedges(), 0);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_welded_load_links_faces() {
        let file = NamedTempFile::with_suffix(".stl").unwrap();
        save(&cube_soup(), file.path()).unwrap();

        let mesh: HalfEdgeMesh = load(file.path()).unwrap();

        assert_eq!(mesh.num_vertices(), 8);
        assert_eq!(mesh.num_edges(), 18);
        assert_eq!(mesh.euler_characteristic(), 2);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let err = load::<_, u32>(dir.path().join("does_not_exist.stl")).unwrap_err();
        assert!(matches!(err, MeshError::Io(_)));
    }
}
