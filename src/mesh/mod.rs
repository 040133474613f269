//! Core mesh data structures.
//!
//! This module provides the half-edge mesh representation used by the
//! stitching algorithms, together with builders from face-vertex lists.
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe index wrappers:
//! - [`VertexId`] - Identifies a vertex
//! - [`HalfEdgeId`] - Identifies a half-edge
//! - [`FaceId`] - Identifies a face
//!
//! These indices are generic over the underlying integer type ([`MeshIndex`] trait),
//! allowing you to choose `u16`, `u32`, or `u64` based on mesh size.
//!
//! # Construction
//!
//! ```
//! use seamweld::mesh::{build_polygon_soup, HalfEdgeMesh};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! // Two triangles that do not share any vertex yet.
//! let faces = vec![[0, 1, 2], [0, 2, 3]];
//!
//! let mesh: HalfEdgeMesh = build_polygon_soup(&vertices, &faces).unwrap();
//! assert_eq!(mesh.num_vertices(), 6);
//! ```

mod builder;
mod halfedge;
mod index;

pub use builder::{
    build_from_polygons, build_from_quads, build_from_triangles, build_polygon_soup,
    to_face_vertex, to_face_vertex_polygons,
};
pub use halfedge::{Face, FaceHalfEdgeIter, HalfEdge, HalfEdgeMesh, Vertex, VertexHalfEdgeIter};
pub use index::{FaceId, HalfEdgeId, MeshIndex, VertexId};
