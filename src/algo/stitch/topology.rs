//! The connectivity operations stitching needs from a mesh.
//!
//! The interface speaks in terms of half-edge *targets*: a half-edge points at
//! the vertex it ends in, and a vertex representative is a half-edge ending
//! at it. [`HalfEdgeMesh`] stores origins and outgoing representatives, so its
//! implementation goes through the opposite half-edge for both.

use std::fmt::Debug;
use std::hash::Hash;

use nalgebra::Point3;

use super::kernel::KernelPoint;
use crate::error::Result;
use crate::mesh::{FaceId, HalfEdgeId, HalfEdgeMesh, MeshIndex, VertexId};

/// Mesh capabilities used by border detection and stitching.
///
/// Link setters are raw: `set_next` does not touch `prev` of the new
/// successor and vice versa. Erasing must keep the slot addressable until the
/// stitching pass ends, since later pairs may still look at the links of
/// erased half-edges.
pub trait StitchTopology {
    /// Half-edge handle.
    type HalfEdge: Copy + Eq + Hash + Debug;
    /// Vertex handle.
    type Vertex: Copy + Eq + Hash + Debug;
    /// Face handle.
    type Face: Copy + Eq + Debug;
    /// Vertex position type.
    type Point: KernelPoint;

    /// All live border half-edges, in a stable order.
    fn border_halfedges(&self) -> impl Iterator<Item = Self::HalfEdge> + '_;

    /// Whether `h` refers to a live half-edge of this mesh.
    fn contains_halfedge(&self, h: Self::HalfEdge) -> bool;

    /// Upper bound on the number of half-edges around any vertex.
    fn halfedge_capacity(&self) -> usize;

    /// Whether `h` has no face.
    fn is_border(&self, h: Self::HalfEdge) -> bool;

    /// The opposite half-edge.
    fn opposite(&self, h: Self::HalfEdge) -> Self::HalfEdge;

    /// Successor around the face or border loop.
    fn next(&self, h: Self::HalfEdge) -> Self::HalfEdge;

    /// Predecessor around the face or border loop.
    fn prev(&self, h: Self::HalfEdge) -> Self::HalfEdge;

    /// The vertex `h` ends at.
    fn target(&self, h: Self::HalfEdge) -> Self::Vertex;

    /// The face of `h`, `None` on the border.
    fn face(&self, h: Self::HalfEdge) -> Option<Self::Face>;

    /// Position of `v`.
    fn point(&self, v: Self::Vertex) -> &Self::Point;

    /// Set the successor of `h`.
    fn set_next(&mut self, h: Self::HalfEdge, next: Self::HalfEdge);

    /// Set the predecessor of `h`.
    fn set_prev(&mut self, h: Self::HalfEdge, prev: Self::HalfEdge);

    /// Make `h` end at `v`.
    fn set_target(&mut self, h: Self::HalfEdge, v: Self::Vertex);

    /// Assign `h` to a face, or to the border with `None`.
    fn set_face(&mut self, h: Self::HalfEdge, f: Option<Self::Face>);

    /// Make `h`, which ends at `v`, the representative of `v`.
    fn set_vertex_halfedge(&mut self, v: Self::Vertex, h: Self::HalfEdge);

    /// Make `h` the representative of `f`.
    fn set_face_halfedge(&mut self, f: Self::Face, h: Self::HalfEdge);

    /// Remove `h` and its opposite.
    fn erase_edge(&mut self, h: Self::HalfEdge);

    /// Remove `v`.
    fn erase_vertex(&mut self, v: Self::Vertex);

    /// Re-establish the border bookkeeping border detection depends on.
    fn normalize_border(&mut self);

    /// Check the connectivity of the live elements after a stitching pass.
    ///
    /// [`try_stitch_borders`](super::try_stitch_borders) rejects a stitched
    /// copy that fails this check. The default accepts everything.
    fn check_integrity(&self) -> Result<()> {
        Ok(())
    }
}

impl<I: MeshIndex> StitchTopology for HalfEdgeMesh<I> {
    type HalfEdge = HalfEdgeId<I>;
    type Vertex = VertexId<I>;
    type Face = FaceId<I>;
    type Point = Point3<f64>;

    fn border_halfedges(&self) -> impl Iterator<Item = HalfEdgeId<I>> + '_ {
        self.border_halfedge_ids()
    }

    fn contains_halfedge(&self, h: HalfEdgeId<I>) -> bool {
        h.is_valid() && h.index() < self.halfedges.len() && !self.is_removed_halfedge(h)
    }

    fn halfedge_capacity(&self) -> usize {
        self.halfedges.len()
    }

    fn is_border(&self, h: HalfEdgeId<I>) -> bool {
        self.is_boundary_halfedge(h)
    }

    fn opposite(&self, h: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.twin(h)
    }

    fn next(&self, h: HalfEdgeId<I>) -> HalfEdgeId<I> {
        HalfEdgeMesh::next(self, h)
    }

    fn prev(&self, h: HalfEdgeId<I>) -> HalfEdgeId<I> {
        HalfEdgeMesh::prev(self, h)
    }

    fn target(&self, h: HalfEdgeId<I>) -> VertexId<I> {
        self.dest(h)
    }

    fn face(&self, h: HalfEdgeId<I>) -> Option<FaceId<I>> {
        let f = self.face_of(h);
        f.is_valid().then_some(f)
    }

    fn point(&self, v: VertexId<I>) -> &Point3<f64> {
        self.position(v)
    }

    fn set_next(&mut self, h: HalfEdgeId<I>, next: HalfEdgeId<I>) {
        HalfEdgeMesh::set_next(self, h, next);
    }

    fn set_prev(&mut self, h: HalfEdgeId<I>, prev: HalfEdgeId<I>) {
        HalfEdgeMesh::set_prev(self, h, prev);
    }

    fn set_target(&mut self, h: HalfEdgeId<I>, v: VertexId<I>) {
        let twin = self.twin(h);
        self.set_origin(twin, v);
    }

    fn set_face(&mut self, h: HalfEdgeId<I>, f: Option<FaceId<I>>) {
        HalfEdgeMesh::set_face(self, h, f.unwrap_or_default());
    }

    fn set_vertex_halfedge(&mut self, v: VertexId<I>, h: HalfEdgeId<I>) {
        let outgoing = self.twin(h);
        HalfEdgeMesh::set_vertex_halfedge(self, v, outgoing);
    }

    fn set_face_halfedge(&mut self, f: FaceId<I>, h: HalfEdgeId<I>) {
        HalfEdgeMesh::set_face_halfedge(self, f, h);
    }

    fn erase_edge(&mut self, h: HalfEdgeId<I>) {
        HalfEdgeMesh::erase_edge(self, h);
    }

    fn erase_vertex(&mut self, v: VertexId<I>) {
        HalfEdgeMesh::erase_vertex(self, v);
    }

    fn normalize_border(&mut self) {
        HalfEdgeMesh::normalize_border(self);
    }

    fn check_integrity(&self) -> Result<()> {
        HalfEdgeMesh::check_integrity(self)
    }
}
