//! Mesh construction utilities.
//!
//! Builds half-edge meshes from face-vertex lists and converts them back.
//! Numbering is deterministic: face half-edges come first in face order,
//! border half-edges are appended in the order their interior twins were
//! created. Border detection scans in index order, so identical input always
//! produces identical stitch pairs.

use std::collections::HashMap;

use nalgebra::Point3;

use super::halfedge::HalfEdgeMesh;
use super::index::{HalfEdgeId, MeshIndex, VertexId};
use crate::error::{MeshError, Result};

/// Build a half-edge mesh from vertices and polygonal faces.
///
/// Each face lists at least three distinct vertex indices in counter-clockwise
/// order. Shared edges are linked as twins; every unmatched edge gets a border
/// half-edge and the border half-edges are chained into loops.
///
/// # Errors
/// - [`MeshError::EmptyMesh`] if there are no faces
/// - [`MeshError::InvalidVertexIndex`] for out-of-range indices
/// - [`MeshError::DegenerateFace`] for faces with fewer than three distinct vertices
/// - [`MeshError::NonManifoldEdge`] if two faces use the same directed edge
///
/// # Example
/// ```
/// use seamweld::mesh::{build_from_polygons, HalfEdgeMesh};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(0.5, 1.5, 0.0),
/// ];
/// let faces = vec![vec![0, 1, 2, 3], vec![3, 2, 4]];
///
/// let mesh: HalfEdgeMesh = build_from_polygons(&vertices, &faces).unwrap();
/// assert_eq!(mesh.num_faces(), 2);
/// assert_eq!(mesh.num_interior_edges(), 1);
/// ```
pub fn build_from_polygons<I: MeshIndex, F: AsRef<[usize]>>(
    vertices: &[Point3<f64>],
    faces: &[F],
) -> Result<HalfEdgeMesh<I>> {
    if faces.is_empty() {
        return Err(MeshError::EmptyMesh);
    }

    let mut corner_count = 0;
    for (fi, face) in faces.iter().enumerate() {
        let face = face.as_ref();
        if face.len() < 3 {
            return Err(MeshError::DegenerateFace { face: fi });
        }
        for (k, &vi) in face.iter().enumerate() {
            if vi >= vertices.len() {
                return Err(MeshError::InvalidVertexIndex { face: fi, vertex: vi });
            }
            if face[..k].contains(&vi) {
                return Err(MeshError::DegenerateFace { face: fi });
            }
        }
        corner_count += face.len();
    }

    // Interior half-edges plus a generous allowance for the border.
    let mut mesh = HalfEdgeMesh::with_capacity(vertices.len(), corner_count * 2, faces.len());

    let vertex_ids: Vec<VertexId<I>> = vertices.iter().map(|&p| mesh.add_vertex(p)).collect();

    // Directed edge (v0, v1) -> half-edge running v0 -> v1.
    let mut edge_map: HashMap<(usize, usize), HalfEdgeId<I>> = HashMap::with_capacity(corner_count);
    // Face half-edges in creation order, with their endpoints.
    let mut face_edges: Vec<(HalfEdgeId<I>, usize, usize)> = Vec::with_capacity(corner_count);

    // First pass: face cycles
    for face in faces {
        let face = face.as_ref();
        let n = face.len();
        let first = HalfEdgeId::<I>::new(mesh.halfedges.len());
        for _ in 0..n {
            mesh.add_halfedge();
        }
        let face_id = mesh.add_face(first);

        for k in 0..n {
            let he = HalfEdgeId::<I>::new(first.index() + k);
            let next = HalfEdgeId::<I>::new(first.index() + (k + 1) % n);
            let prev = HalfEdgeId::<I>::new(first.index() + (k + n - 1) % n);
            let (v0, v1) = (face[k], face[(k + 1) % n]);

            let h = mesh.halfedge_mut(he);
            h.origin = vertex_ids[v0];
            h.next = next;
            h.prev = prev;
            h.face = face_id;
            mesh.set_vertex_halfedge(vertex_ids[v0], he);

            if edge_map.insert((v0, v1), he).is_some() {
                return Err(MeshError::NonManifoldEdge { v0, v1 });
            }
            face_edges.push((he, v0, v1));
        }
    }

    // Second pass: twins, creating border half-edges for unmatched edges
    for &(he, v0, v1) in &face_edges {
        if mesh.twin(he).is_valid() {
            continue;
        }
        let twin = match edge_map.get(&(v1, v0)) {
            Some(&twin) => twin,
            None => {
                let border = mesh.add_halfedge();
                mesh.set_origin(border, vertex_ids[v1]);
                border
            }
        };
        mesh.halfedge_mut(he).twin = twin;
        mesh.halfedge_mut(twin).twin = he;
    }

    // Third pass: chain border half-edges into loops
    link_border_loops(&mut mesh)?;

    // Fourth pass: boundary vertices point at border half-edges
    mesh.normalize_border();

    Ok(mesh)
}

/// Chain every border half-edge to the border half-edge leaving its
/// destination, found by rotating through the faces around that vertex.
///
/// Rotating rather than looking up "the" outgoing border half-edge picks the
/// right wedge when several border loops meet at one vertex.
fn link_border_loops<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) -> Result<()> {
    let border: Vec<HalfEdgeId<I>> = mesh.border_halfedge_ids().collect();
    let limit = mesh.halfedges.len();

    for b in border {
        let mut h = mesh.twin(b);
        let mut steps = 0;
        while !mesh.is_boundary_halfedge(h) {
            h = mesh.twin(mesh.prev(h));
            steps += 1;
            if steps > limit {
                return Err(MeshError::NonManifold {
                    details: format!("could not close the border loop through {:?}", b),
                });
            }
        }
        mesh.set_next(b, h);
        mesh.set_prev(h, b);
    }

    Ok(())
}

/// Build a half-edge mesh from vertices and triangle faces.
///
/// # Example
/// ```
/// use seamweld::mesh::{build_from_triangles, HalfEdgeMesh};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
/// assert_eq!(mesh.num_vertices(), 3);
/// assert_eq!(mesh.num_border_halfedges(), 3);
/// ```
pub fn build_from_triangles<I: MeshIndex>(
    vertices: &[Point3<f64>],
    faces: &[[usize; 3]],
) -> Result<HalfEdgeMesh<I>> {
    build_from_polygons(vertices, faces)
}

/// Build a half-edge mesh from vertices and quad faces (counter-clockwise).
pub fn build_from_quads<I: MeshIndex>(
    vertices: &[Point3<f64>],
    faces: &[[usize; 4]],
) -> Result<HalfEdgeMesh<I>> {
    build_from_polygons(vertices, faces)
}

/// Build a mesh in which no two faces share a vertex.
///
/// Every face corner gets its own copy of the referenced position, which is
/// what an unwelded STL file or a set of independently triangulated patches
/// looks like. The result has only border edges between faces; stitching
/// recovers the connectivity.
pub fn build_polygon_soup<I: MeshIndex, F: AsRef<[usize]>>(
    vertices: &[Point3<f64>],
    faces: &[F],
) -> Result<HalfEdgeMesh<I>> {
    let mut soup_vertices = Vec::new();
    let mut soup_faces = Vec::with_capacity(faces.len());

    for (fi, face) in faces.iter().enumerate() {
        let face = face.as_ref();
        let mut soup_face = Vec::with_capacity(face.len());
        for &vi in face {
            let p = vertices
                .get(vi)
                .ok_or(MeshError::InvalidVertexIndex { face: fi, vertex: vi })?;
            soup_face.push(soup_vertices.len());
            soup_vertices.push(*p);
        }
        soup_faces.push(soup_face);
    }

    build_from_polygons(&soup_vertices, &soup_faces)
}

/// Convert a mesh to a face-vertex representation with arbitrary polygons.
///
/// Only live vertices are exported; indices are compacted.
pub fn to_face_vertex_polygons<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
) -> (Vec<Point3<f64>>, Vec<Vec<usize>>) {
    let mut remap = vec![usize::MAX; mesh.vertices.len()];
    let mut vertices = Vec::with_capacity(mesh.num_vertices());
    for v in mesh.vertex_ids() {
        remap[v.index()] = vertices.len();
        vertices.push(*mesh.position(v));
    }

    let faces = mesh
        .face_ids()
        .map(|f| mesh.face_vertices(f).map(|v| remap[v.index()]).collect())
        .collect();

    (vertices, faces)
}

/// Convert a mesh to a triangle list, fanning polygons from their first corner.
pub fn to_face_vertex<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let (vertices, polygons) = to_face_vertex_polygons(mesh);

    let mut faces = Vec::with_capacity(polygons.len());
    for polygon in &polygons {
        for i in 1..polygon.len().saturating_sub(1) {
            faces.push([polygon[0], polygon[i], polygon[i + 1]]);
        }
    }

    (vertices, faces)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_triangle() -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
        ];
        (vertices, vec![[0, 1, 2]])
    }

    fn two_triangles() -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, -1.0, 0.0),
        ];
        (vertices, vec![[0, 1, 2], [1, 0, 3]])
    }

    #[test]
    fn test_single_triangle() {
        let (vertices, faces) = single_triangle();
        let mesh: HalfEdgeMesh<u32> = build_from_triangles(&vertices, &faces).unwrap();

        assert_eq!(mesh.num_vertices(), 3);
        assert_eq!(mesh.num_faces(), 1);
        // 3 interior half-edges + 3 border half-edges
        assert_eq!(mesh.num_halfedges(), 6);
        assert!(mesh.is_valid());
        assert_eq!(mesh.border_loops().len(), 1);

        for v in mesh.vertex_ids() {
            assert!(mesh.is_boundary_vertex(v));
            assert!(mesh.is_boundary_halfedge(mesh.vertex(v).halfedge));
        }
    }

    #[test]
    fn test_two_triangles() {
        let (vertices, faces) = two_triangles();
        let mesh: HalfEdgeMesh<u32> = build_from_triangles(&vertices, &faces).unwrap();

        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_faces(), 2);
        assert_eq!(mesh.num_halfedges(), 10);
        assert_eq!(mesh.num_interior_edges(), 1);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_border_halfedges_follow_face_halfedges() {
        let (vertices, faces) = two_triangles();
        let mesh: HalfEdgeMesh<u32> = build_from_triangles(&vertices, &faces).unwrap();

        let border: Vec<usize> = mesh.border_halfedge_ids().map(|he| he.index()).collect();
        assert_eq!(border, vec![6, 7, 8, 9]);
        // First border half-edge is the twin of 1 -> 2, running 2 -> 1.
        let first = HalfEdgeId::<u32>::new(6);
        assert_eq!(mesh.origin(first).index(), 2);
        assert_eq!(mesh.dest(first).index(), 1);
    }

    #[test]
    fn test_polygon_soup() {
        let (vertices, faces) = two_triangles();
        let mesh: HalfEdgeMesh<u32> = build_polygon_soup(&vertices, &faces).unwrap();

        assert_eq!(mesh.num_vertices(), 6);
        assert_eq!(mesh.num_border_halfedges(), 6);
        assert_eq!(mesh.num_interior_edges(), 0);
        assert_eq!(mesh.border_loops().len(), 2);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_bowtie_vertex_loops() {
        // Two triangles touching at vertex 0 only.
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(-1.0, -1.0, 0.0),
        ];
        let mesh: HalfEdgeMesh<u32> =
            build_from_triangles(&vertices, &[[0, 1, 2], [0, 3, 4]]).unwrap();

        assert!(mesh.is_valid());
        assert_eq!(mesh.border_loops().len(), 2);
        for start in mesh.border_loops() {
            let mut he = start;
            let mut len = 0;
            loop {
                he = mesh.next(he);
                len += 1;
                if he == start {
                    break;
                }
            }
            assert_eq!(len, 3);
        }
    }

    #[test]
    fn test_roundtrip() {
        let (vertices, faces) = two_triangles();
        let mesh: HalfEdgeMesh<u32> = build_from_triangles(&vertices, &faces).unwrap();

        let (out_verts, out_faces) = to_face_vertex(&mesh);

        assert_eq!(vertices.len(), out_verts.len());
        assert_eq!(out_faces, faces);
    }

    #[test]
    fn test_invalid_vertex_index() {
        let vertices = vec![Point3::new(0.0, 0.0, 0.0)];
        let result: Result<HalfEdgeMesh<u32>> = build_from_triangles(&vertices, &[[0, 1, 2]]);
        assert!(matches!(result, Err(MeshError::InvalidVertexIndex { face: 0, vertex: 1 })));

        let result: Result<HalfEdgeMesh<u32>> = build_polygon_soup(&vertices, &[[0, 1, 2]]);
        assert!(matches!(result, Err(MeshError::InvalidVertexIndex { .. })));
    }

    #[test]
    fn test_degenerate_face() {
        let (vertices, _) = single_triangle();
        let result: Result<HalfEdgeMesh<u32>> = build_from_triangles(&vertices, &[[0, 0, 2]]);
        assert!(matches!(result, Err(MeshError::DegenerateFace { face: 0 })));

        let result: Result<HalfEdgeMesh<u32>> = build_from_polygons(&vertices, &[vec![0, 1]]);
        assert!(matches!(result, Err(MeshError::DegenerateFace { face: 0 })));
    }

    #[test]
    fn test_duplicate_directed_edge() {
        let (vertices, _) = two_triangles();
        // Both faces run 0 -> 1.
        let result: Result<HalfEdgeMesh<u32>> =
            build_from_triangles(&vertices, &[[0, 1, 2], [0, 1, 3]]);
        assert!(matches!(result, Err(MeshError::NonManifoldEdge { v0: 0, v1: 1 })));
    }

    #[test]
    fn test_quads() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
        ];
        let faces = [[0, 1, 2, 3], [1, 4, 5, 2]];
        let mesh: HalfEdgeMesh<u32> = build_from_quads(&vertices, &faces).unwrap();

        // 8 interior half-edges + 6 border half-edges
        assert_eq!(mesh.num_halfedges(), 14);
        assert!(mesh.is_valid());

        let (_, polygons) = to_face_vertex_polygons(&mesh);
        assert_eq!(polygons, vec![vec![0, 1, 2, 3], vec![1, 4, 5, 2]]);
        let (_, triangles) = to_face_vertex(&mesh);
        assert_eq!(triangles.len(), 4);
    }
}
