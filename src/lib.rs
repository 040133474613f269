//! # Seamweld
//!
//! Border stitching for half-edge polygon meshes.
//!
//! Meshes built from independently triangulated patches, or read from formats
//! that store every facet on its own, contain the same edge several times as
//! unconnected border half-edges. Seamweld finds those duplicates and welds
//! them into shared interior edges, merging the coincident vertices, so the
//! result is a connected surface.
//!
//! ## Features
//!
//! - **Half-edge data structure**: arena storage with type-safe indices and
//!   deferred deletion
//! - **Flexible indexing**: Support for 16-bit, 32-bit, and 64-bit indices
//! - **Border detection**: pairing of coincident border half-edges by endpoint
//!   positions, a custom key, or a comparator
//! - **Stitching**: vertex merging and relinking, generic over the mesh
//!   through [`algo::stitch::StitchTopology`]
//! - **File formats**: STL and PLY, welded or as polygon soups
//!
//! ## Quick Start
//!
//! ```no_run
//! use seamweld::io::{self, LoadOptions};
//! use seamweld::prelude::*;
//!
//! // Every triangle of an STL file on its own
//! let mut mesh: HalfEdgeMesh = io::load_with("model.stl", &LoadOptions::soup()).unwrap();
//!
//! let report = stitch_mesh(&mut mesh);
//! println!("Stitched {} edges", report.pairs_stitched);
//!
//! mesh.garbage_collection();
//! io::save(&mesh, "welded.ply").unwrap();
//! ```
//!
//! ## Stitching by Hand
//!
//! Detection and stitching are separate steps; pairs can also come from
//! elsewhere.
//!
//! ```
//! use seamweld::prelude::*;
//! use nalgebra::Point3;
//!
//! // Two unit squares side by side, each triangulated on its own
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(2.0, 0.0, 0.0),
//!     Point3::new(2.0, 1.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//! ];
//! let faces = vec![[0, 1, 2], [0, 2, 3], [4, 5, 6], [4, 6, 7]];
//! let mut mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
//!
//! let pairs = detect_duplicate_border_edges(&mut mesh);
//! assert_eq!(pairs.len(), 1);
//!
//! stitch_borders(&mut mesh, &pairs);
//! assert_eq!(mesh.num_vertices(), 6);
//! assert_eq!(mesh.border_loops().len(), 1);
//! assert!(mesh.is_valid());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod io;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use seamweld::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::stitch::{
        detect_duplicate_border_edges, stitch_borders, stitch_mesh, stitch_mesh_with,
        try_stitch_borders, StitchOptions, StitchReport, StitchTopology,
    };
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        build_from_polygons, build_from_triangles, build_polygon_soup, to_face_vertex, Face,
        FaceId, HalfEdge, HalfEdgeId, HalfEdgeMesh, MeshIndex, Vertex, VertexId,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use nalgebra::Point3;

    #[test]
    fn test_tetrahedron_soup() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];

        let faces = vec![
            [0, 2, 1], // bottom
            [0, 1, 3], // front
            [1, 2, 3], // right
            [2, 0, 3], // left
        ];

        let mut mesh: HalfEdgeMesh = build_polygon_soup(&vertices, &faces).unwrap();
        assert_eq!(mesh.num_vertices(), 12);
        // 12 face half-edges, each with a border twin
        assert_eq!(mesh.num_halfedges(), 24);

        let report = stitch_mesh(&mut mesh);
        assert_eq!(report.pairs_stitched, 6);

        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_halfedges(), 12);
        assert!(mesh.is_valid());

        // Closed again: no boundary vertices
        for v in mesh.vertex_ids() {
            assert!(!mesh.is_boundary_vertex(v), "vertex {:?} should not be on boundary", v);
        }
    }
}
