//! Half-edge mesh data structure.
//!
//! Every edge is stored as two opposite **half-edges**. A half-edge knows its
//! **twin**, the **next** and **prev** half-edges around its face (or border
//! loop), its **origin** vertex and its **face**. Each vertex keeps one
//! outgoing half-edge and each face one half-edge of its cycle.
//!
//! # Boundary Handling
//!
//! Border half-edges carry an invalid face ID and are chained into closed
//! border loops through `next`/`prev`, so walking around any vertex with
//! `next(twin(he))` visits the whole fan. After [`HalfEdgeMesh::normalize_border`]
//! every boundary vertex points at one of its outgoing border half-edges.
//!
//! # Removal
//!
//! Removing elements only marks their slot. Indices stay stable until
//! [`HalfEdgeMesh::garbage_collection`] compacts the arena; counts and
//! iterators only report live elements.

use nalgebra::{Point3, Vector3};

use super::index::{FaceId, HalfEdgeId, MeshIndex, VertexId};
use crate::error::{MeshError, Result};

/// A vertex in the half-edge mesh.
#[derive(Debug, Clone)]
pub struct Vertex<I: MeshIndex = u32> {
    /// The 3D position of this vertex.
    pub position: Point3<f64>,

    /// One outgoing half-edge from this vertex.
    pub halfedge: HalfEdgeId<I>,

    pub(crate) removed: bool,
}

impl<I: MeshIndex> Vertex<I> {
    /// Create a new isolated vertex at the given position.
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            halfedge: HalfEdgeId::invalid(),
            removed: false,
        }
    }

    /// Whether this vertex has been removed from the mesh.
    #[inline]
    pub fn is_removed(&self) -> bool {
        self.removed
    }
}

/// A half-edge in the mesh.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge<I: MeshIndex = u32> {
    /// The vertex this half-edge starts at.
    pub origin: VertexId<I>,

    /// The opposite half-edge.
    pub twin: HalfEdgeId<I>,

    /// The next half-edge around the face or border loop.
    pub next: HalfEdgeId<I>,

    /// The previous half-edge around the face or border loop.
    pub prev: HalfEdgeId<I>,

    /// The face this half-edge belongs to; invalid on the border.
    pub face: FaceId<I>,

    pub(crate) removed: bool,
}

impl<I: MeshIndex> HalfEdge<I> {
    /// Create a new unlinked half-edge.
    pub fn new() -> Self {
        Self {
            origin: VertexId::invalid(),
            twin: HalfEdgeId::invalid(),
            next: HalfEdgeId::invalid(),
            prev: HalfEdgeId::invalid(),
            face: FaceId::invalid(),
            removed: false,
        }
    }

    /// Whether this half-edge lies on the border (has no face).
    #[inline]
    pub fn is_boundary(&self) -> bool {
        !self.face.is_valid()
    }

    /// Whether this half-edge has been removed from the mesh.
    #[inline]
    pub fn is_removed(&self) -> bool {
        self.removed
    }
}

impl<I: MeshIndex> Default for HalfEdge<I> {
    fn default() -> Self {
        Self::new()
    }
}

/// A face in the half-edge mesh.
#[derive(Debug, Clone, Copy)]
pub struct Face<I: MeshIndex = u32> {
    /// One half-edge on the boundary cycle of this face.
    pub halfedge: HalfEdgeId<I>,
}

impl<I: MeshIndex> Face<I> {
    /// Create a new face anchored at the given half-edge.
    pub fn new(halfedge: HalfEdgeId<I>) -> Self {
        Self { halfedge }
    }
}

impl<I: MeshIndex> Default for Face<I> {
    fn default() -> Self {
        Self {
            halfedge: HalfEdgeId::invalid(),
        }
    }
}

/// A half-edge polygon mesh.
#[derive(Debug, Clone)]
pub struct HalfEdgeMesh<I: MeshIndex = u32> {
    pub(crate) vertices: Vec<Vertex<I>>,
    pub(crate) halfedges: Vec<HalfEdge<I>>,
    pub(crate) faces: Vec<Face<I>>,
    removed_vertices: usize,
    removed_halfedges: usize,
}

impl<I: MeshIndex> Default for HalfEdgeMesh<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self::with_capacity(0, 0, 0)
    }

    /// Create a mesh with pre-allocated storage.
    pub fn with_capacity(num_vertices: usize, num_halfedges: usize, num_faces: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(num_vertices),
            halfedges: Vec::with_capacity(num_halfedges),
            faces: Vec::with_capacity(num_faces),
            removed_vertices: 0,
            removed_halfedges: 0,
        }
    }

    // ==================== Counts ====================

    /// Number of live vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len() - self.removed_vertices
    }

    /// Number of live half-edges.
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len() - self.removed_halfedges
    }

    /// Number of live edges (half-edge pairs).
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.num_halfedges() / 2
    }

    /// Number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Number of live border half-edges.
    pub fn num_border_halfedges(&self) -> usize {
        self.border_halfedge_ids().count()
    }

    /// Number of live edges with a face on both sides.
    pub fn num_interior_edges(&self) -> usize {
        self.halfedge_ids()
            .filter(|&he| he < self.twin(he) && !self.is_boundary_edge(he))
            .count()
    }

    /// Whether any slot is currently marked as removed.
    #[inline]
    pub fn has_garbage(&self) -> bool {
        self.removed_vertices > 0 || self.removed_halfedges > 0
    }

    // ==================== Accessors ====================

    /// Get a vertex by ID.
    #[inline]
    pub fn vertex(&self, id: VertexId<I>) -> &Vertex<I> {
        &self.vertices[id.index()]
    }

    /// Get a mutable vertex by ID.
    #[inline]
    pub fn vertex_mut(&mut self, id: VertexId<I>) -> &mut Vertex<I> {
        &mut self.vertices[id.index()]
    }

    /// Get a half-edge by ID.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId<I>) -> &HalfEdge<I> {
        &self.halfedges[id.index()]
    }

    /// Get a mutable half-edge by ID.
    #[inline]
    pub fn halfedge_mut(&mut self, id: HalfEdgeId<I>) -> &mut HalfEdge<I> {
        &mut self.halfedges[id.index()]
    }

    /// Get a face by ID.
    #[inline]
    pub fn face(&self, id: FaceId<I>) -> &Face<I> {
        &self.faces[id.index()]
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId<I>) -> &Point3<f64> {
        &self.vertex(v).position
    }

    /// Whether the vertex slot has been removed.
    #[inline]
    pub fn is_removed_vertex(&self, v: VertexId<I>) -> bool {
        self.vertex(v).removed
    }

    /// Whether the half-edge slot has been removed.
    #[inline]
    pub fn is_removed_halfedge(&self, he: HalfEdgeId<I>) -> bool {
        self.halfedge(he).removed
    }

    // ==================== Topology Queries ====================

    /// Get the twin (opposite) half-edge.
    #[inline]
    pub fn twin(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).twin
    }

    /// Get the next half-edge around the face or border loop.
    #[inline]
    pub fn next(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).next
    }

    /// Get the previous half-edge around the face or border loop.
    #[inline]
    pub fn prev(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).prev
    }

    /// Get the origin vertex of a half-edge.
    #[inline]
    pub fn origin(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.halfedge(he).origin
    }

    /// Get the destination vertex of a half-edge.
    #[inline]
    pub fn dest(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.origin(self.twin(he))
    }

    /// Get the face of a half-edge (invalid on the border).
    #[inline]
    pub fn face_of(&self, he: HalfEdgeId<I>) -> FaceId<I> {
        self.halfedge(he).face
    }

    /// Check if a half-edge is on the border.
    #[inline]
    pub fn is_boundary_halfedge(&self, he: HalfEdgeId<I>) -> bool {
        self.halfedge(he).is_boundary()
    }

    /// Check if an edge (given by either half-edge) touches the border.
    #[inline]
    pub fn is_boundary_edge(&self, he: HalfEdgeId<I>) -> bool {
        self.is_boundary_halfedge(he) || self.is_boundary_halfedge(self.twin(he))
    }

    /// Check if a vertex is on the boundary. Isolated vertices count as boundary.
    pub fn is_boundary_vertex(&self, v: VertexId<I>) -> bool {
        if !self.vertex(v).halfedge.is_valid() {
            return true;
        }
        self.vertex_halfedges(v)
            .any(|he| self.is_boundary_halfedge(he))
    }

    // ==================== Iteration ====================

    /// Iterate over live vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.removed)
            .map(|(i, _)| VertexId::new(i))
    }

    /// Iterate over live half-edge IDs in ascending order.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId<I>> + '_ {
        self.halfedges
            .iter()
            .enumerate()
            .filter(|(_, he)| !he.removed)
            .map(|(i, _)| HalfEdgeId::new(i))
    }

    /// Iterate over live border half-edge IDs in ascending order.
    pub fn border_halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId<I>> + '_ {
        self.halfedges
            .iter()
            .enumerate()
            .filter(|(_, he)| !he.removed && he.is_boundary())
            .map(|(i, _)| HalfEdgeId::new(i))
    }

    /// Iterate over face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        (0..self.faces.len()).map(FaceId::new)
    }

    /// Iterate over outgoing half-edges around a vertex.
    pub fn vertex_halfedges(&self, v: VertexId<I>) -> VertexHalfEdgeIter<'_, I> {
        VertexHalfEdgeIter::new(self, v)
    }

    /// Iterate over half-edges around a face.
    pub fn face_halfedges(&self, f: FaceId<I>) -> FaceHalfEdgeIter<'_, I> {
        FaceHalfEdgeIter::new(self, f)
    }

    /// Iterate over vertices of a face.
    pub fn face_vertices(&self, f: FaceId<I>) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.face_halfedges(f).map(|he| self.origin(he))
    }

    /// Number of vertices (equivalently half-edges) of a face.
    pub fn face_degree(&self, f: FaceId<I>) -> usize {
        self.face_halfedges(f).count()
    }

    /// One representative half-edge per border loop, in ascending order of
    /// the smallest half-edge in each loop.
    pub fn border_loops(&self) -> Vec<HalfEdgeId<I>> {
        let mut visited = vec![false; self.halfedges.len()];
        let mut loops = Vec::new();

        for start in self.border_halfedge_ids() {
            if visited[start.index()] {
                continue;
            }
            loops.push(start);

            let mut he = start;
            for _ in 0..self.halfedges.len() {
                visited[he.index()] = true;
                he = self.next(he);
                if !he.is_valid() || he == start || visited[he.index()] {
                    break;
                }
            }
        }

        loops
    }

    // ==================== Geometry ====================

    /// Compute the unit normal of a (possibly non-planar) polygonal face
    /// using Newell's method.
    pub fn face_normal(&self, f: FaceId<I>) -> Vector3<f64> {
        let mut normal = Vector3::zeros();
        for he in self.face_halfedges(f) {
            let p = self.position(self.origin(he));
            let q = self.position(self.dest(he));
            normal.x += (p.y - q.y) * (p.z + q.z);
            normal.y += (p.z - q.z) * (p.x + q.x);
            normal.z += (p.x - q.x) * (p.y + q.y);
        }
        normal.normalize()
    }

    /// Compute the area of a polygonal face by fanning from its first vertex.
    pub fn face_area(&self, f: FaceId<I>) -> f64 {
        let points: Vec<Point3<f64>> = self
            .face_vertices(f)
            .map(|v| *self.position(v))
            .collect();
        if points.len() < 3 {
            return 0.0;
        }

        let mut twice_area = Vector3::zeros();
        for i in 1..points.len() - 1 {
            twice_area += (points[i] - points[0]).cross(&(points[i + 1] - points[0]));
        }
        0.5 * twice_area.norm()
    }

    /// Compute the axis-aligned bounding box of the live vertices.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let mut ids = self.vertex_ids();
        let first = *self.position(ids.next()?);
        let (mut min, mut max) = (first, first);

        for v in ids {
            let p = self.position(v);
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }

        Some((min, max))
    }

    /// Compute the total surface area of the mesh.
    pub fn surface_area(&self) -> f64 {
        self.face_ids().map(|f| self.face_area(f)).sum()
    }

    /// Euler characteristic `V - E + F` over live elements.
    pub fn euler_characteristic(&self) -> i64 {
        self.num_vertices() as i64 - self.num_edges() as i64 + self.num_faces() as i64
    }

    // ==================== Construction ====================

    /// Add a new isolated vertex and return its ID.
    pub fn add_vertex(&mut self, position: Point3<f64>) -> VertexId<I> {
        let id = VertexId::new(self.vertices.len());
        self.vertices.push(Vertex::new(position));
        id
    }

    /// Add an unlinked half-edge and return its ID.
    pub(crate) fn add_halfedge(&mut self) -> HalfEdgeId<I> {
        let id = HalfEdgeId::new(self.halfedges.len());
        self.halfedges.push(HalfEdge::new());
        id
    }

    /// Add a face anchored at `halfedge` and return its ID.
    pub(crate) fn add_face(&mut self, halfedge: HalfEdgeId<I>) -> FaceId<I> {
        let id = FaceId::new(self.faces.len());
        self.faces.push(Face::new(halfedge));
        id
    }

    // ==================== Low-level Mutation ====================

    /// Set the `next` link of `he` without touching `prev` of the target.
    #[inline]
    pub fn set_next(&mut self, he: HalfEdgeId<I>, next: HalfEdgeId<I>) {
        self.halfedge_mut(he).next = next;
    }

    /// Set the `prev` link of `he` without touching `next` of the target.
    #[inline]
    pub fn set_prev(&mut self, he: HalfEdgeId<I>, prev: HalfEdgeId<I>) {
        self.halfedge_mut(he).prev = prev;
    }

    /// Set the origin vertex of `he`.
    #[inline]
    pub fn set_origin(&mut self, he: HalfEdgeId<I>, v: VertexId<I>) {
        self.halfedge_mut(he).origin = v;
    }

    /// Set the face of `he`; pass an invalid ID to turn it into a border half-edge.
    #[inline]
    pub fn set_face(&mut self, he: HalfEdgeId<I>, f: FaceId<I>) {
        self.halfedge_mut(he).face = f;
    }

    /// Set the outgoing half-edge stored at `v`.
    #[inline]
    pub fn set_vertex_halfedge(&mut self, v: VertexId<I>, he: HalfEdgeId<I>) {
        self.vertex_mut(v).halfedge = he;
    }

    /// Set the half-edge stored at `f`.
    #[inline]
    pub fn set_face_halfedge(&mut self, f: FaceId<I>, he: HalfEdgeId<I>) {
        self.faces[f.index()].halfedge = he;
    }

    /// Mark `he` and its twin as removed. Links of the neighbours are left alone.
    pub fn erase_edge(&mut self, he: HalfEdgeId<I>) {
        let twin = self.twin(he);
        for id in [he, twin] {
            let slot = self.halfedge_mut(id);
            if !slot.removed {
                slot.removed = true;
                self.removed_halfedges += 1;
            }
        }
    }

    /// Mark `v` as removed.
    pub fn erase_vertex(&mut self, v: VertexId<I>) {
        let slot = self.vertex_mut(v);
        if !slot.removed {
            slot.removed = true;
            slot.halfedge = HalfEdgeId::invalid();
            self.removed_vertices += 1;
        }
    }

    /// Point every boundary vertex at one of its outgoing border half-edges.
    ///
    /// Border-aware traversals rely on this: starting the fan walk at a border
    /// half-edge visits the fan in order from one side of the boundary to the
    /// other. Returns the number of live border half-edges.
    pub fn normalize_border(&mut self) -> usize {
        let mut count = 0;
        for i in 0..self.halfedges.len() {
            let he = &self.halfedges[i];
            if he.removed || !he.is_boundary() {
                continue;
            }
            count += 1;

            let origin = he.origin;
            if !origin.is_valid() || self.vertices[origin.index()].removed {
                continue;
            }
            let anchor = self.vertices[origin.index()].halfedge;
            let anchored_on_border = anchor.is_valid()
                && !self.halfedges[anchor.index()].removed
                && self.halfedges[anchor.index()].is_boundary()
                && self.halfedges[anchor.index()].origin == origin;
            if !anchored_on_border {
                self.vertices[origin.index()].halfedge = HalfEdgeId::new(i);
            }
        }
        count
    }

    /// Compact the arena, dropping removed vertices and half-edges.
    ///
    /// All IDs previously handed out become meaningless afterwards. Returns
    /// the number of slots that were reclaimed.
    pub fn garbage_collection(&mut self) -> usize {
        if !self.has_garbage() {
            return 0;
        }

        let mut vertex_map = vec![VertexId::<I>::invalid(); self.vertices.len()];
        let mut next_vertex = 0;
        for (i, v) in self.vertices.iter().enumerate() {
            if !v.removed {
                vertex_map[i] = VertexId::new(next_vertex);
                next_vertex += 1;
            }
        }

        let mut halfedge_map = vec![HalfEdgeId::<I>::invalid(); self.halfedges.len()];
        let mut next_halfedge = 0;
        for (i, he) in self.halfedges.iter().enumerate() {
            if !he.removed {
                halfedge_map[i] = HalfEdgeId::new(next_halfedge);
                next_halfedge += 1;
            }
        }

        let remap_he = |he: HalfEdgeId<I>| {
            if he.is_valid() {
                halfedge_map[he.index()]
            } else {
                he
            }
        };

        let reclaimed = self.removed_vertices + self.removed_halfedges;

        self.vertices.retain(|v| !v.removed);
        for v in &mut self.vertices {
            v.halfedge = remap_he(v.halfedge);
        }

        self.halfedges.retain(|he| !he.removed);
        for he in &mut self.halfedges {
            he.origin = if he.origin.is_valid() {
                vertex_map[he.origin.index()]
            } else {
                he.origin
            };
            he.twin = remap_he(he.twin);
            he.next = remap_he(he.next);
            he.prev = remap_he(he.prev);
        }

        for f in &mut self.faces {
            f.halfedge = remap_he(f.halfedge);
        }

        self.removed_vertices = 0;
        self.removed_halfedges = 0;
        reclaimed
    }

    // ==================== Validation ====================

    /// Check connectivity consistency, reporting the first problem found.
    ///
    /// Verified for every live element:
    /// - `twin(twin(h)) == h`, twins are distinct and live
    /// - `prev(next(h)) == h`, neighbours are live and share the face of `h`
    /// - `origin(next(h)) == dest(h)` and origins are live vertices
    /// - each face cycle returns to its start and every half-edge on it
    ///   belongs to that face
    /// - vertex anchors are live outgoing half-edges
    pub fn check_integrity(&self) -> Result<()> {
        let fail = |msg: String| Err(MeshError::InvalidState(msg));

        for he in self.halfedge_ids() {
            let h = self.halfedge(he);
            if !h.origin.is_valid() || self.is_removed_vertex(h.origin) {
                return fail(format!("{:?} starts at dead vertex {:?}", he, h.origin));
            }
            for (what, link) in [("twin", h.twin), ("next", h.next), ("prev", h.prev)] {
                if !link.is_valid() || self.is_removed_halfedge(link) {
                    return fail(format!("{:?} has dead {} {:?}", he, what, link));
                }
            }
            if h.twin == he || self.twin(h.twin) != he {
                return fail(format!("{:?} twin {:?} is not reciprocal", he, h.twin));
            }
            if self.prev(h.next) != he {
                return fail(format!("{:?} next {:?} does not point back", he, h.next));
            }
            if self.next(h.prev) != he {
                return fail(format!("{:?} prev {:?} does not point back", he, h.prev));
            }
            if self.face_of(h.next) != h.face {
                return fail(format!("{:?} and its next {:?} disagree on face", he, h.next));
            }
            if self.origin(h.next) != self.dest(he) {
                return fail(format!("{:?} does not end where {:?} starts", he, h.next));
            }
        }

        for f in self.face_ids() {
            let start = self.face(f).halfedge;
            if !start.is_valid() || self.is_removed_halfedge(start) {
                return fail(format!("{:?} anchored at dead half-edge {:?}", f, start));
            }
            let mut he = start;
            let mut steps = 0;
            loop {
                if self.face_of(he) != f {
                    return fail(format!("{:?} cycle passes through {:?} of another face", f, he));
                }
                he = self.next(he);
                steps += 1;
                if he == start {
                    break;
                }
                if steps > self.halfedges.len() {
                    return fail(format!("{:?} cycle does not close", f));
                }
            }
            if steps < 3 {
                return fail(format!("{:?} has only {} sides", f, steps));
            }
        }

        for v in self.vertex_ids() {
            let anchor = self.vertex(v).halfedge;
            if !anchor.is_valid() {
                continue;
            }
            if self.is_removed_halfedge(anchor) || self.origin(anchor) != v {
                return fail(format!("{:?} anchored at {:?} which does not leave it", v, anchor));
            }
        }

        Ok(())
    }

    /// Check if the mesh connectivity is consistent.
    pub fn is_valid(&self) -> bool {
        self.check_integrity().is_ok()
    }
}

/// Iterator over outgoing half-edges around a vertex.
///
/// Steps with `next(twin(he))`. The walk is capped at the number of half-edge
/// slots so a corrupted fan cannot loop forever.
pub struct VertexHalfEdgeIter<'a, I: MeshIndex = u32> {
    mesh: &'a HalfEdgeMesh<I>,
    start: HalfEdgeId<I>,
    current: HalfEdgeId<I>,
    remaining: usize,
}

impl<'a, I: MeshIndex> VertexHalfEdgeIter<'a, I> {
    fn new(mesh: &'a HalfEdgeMesh<I>, v: VertexId<I>) -> Self {
        let start = mesh.vertex(v).halfedge;
        Self {
            mesh,
            start,
            current: start,
            remaining: if start.is_valid() { mesh.halfedges.len() } else { 0 },
        }
    }
}

impl<'a, I: MeshIndex> Iterator for VertexHalfEdgeIter<'a, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let result = self.current;
        let twin = self.mesh.twin(result);
        self.current = if twin.is_valid() {
            self.mesh.next(twin)
        } else {
            HalfEdgeId::invalid()
        };

        if self.current == self.start || !self.current.is_valid() {
            self.remaining = 0;
        }

        Some(result)
    }
}

/// Iterator over half-edges around a face.
pub struct FaceHalfEdgeIter<'a, I: MeshIndex = u32> {
    mesh: &'a HalfEdgeMesh<I>,
    start: HalfEdgeId<I>,
    current: HalfEdgeId<I>,
    remaining: usize,
}

impl<'a, I: MeshIndex> FaceHalfEdgeIter<'a, I> {
    fn new(mesh: &'a HalfEdgeMesh<I>, f: FaceId<I>) -> Self {
        let start = mesh.face(f).halfedge;
        Self {
            mesh,
            start,
            current: start,
            remaining: if start.is_valid() { mesh.halfedges.len() } else { 0 },
        }
    }
}

impl<'a, I: MeshIndex> Iterator for FaceHalfEdgeIter<'a, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let result = self.current;
        self.current = self.mesh.next(self.current);

        if self.current == self.start || !self.current.is_valid() {
            self.remaining = 0;
        }

        Some(result)
    }
}
