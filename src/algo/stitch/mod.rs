//! Border stitching.
//!
//! Meshes assembled from independently triangulated patches, or loaded from
//! formats that store every triangle on its own, carry the same geometric
//! edge twice: once as a border half-edge of each patch. Stitching welds such
//! pairs into a single interior edge and merges their endpoint vertices.
//!
//! The work is split in two steps that can be used separately:
//!
//! - [`detect_duplicate_border_edges`] (and its `_by_key` / `_by` variants)
//!   scans the border and pairs half-edges that run along the same segment.
//! - [`stitch_borders`] / [`try_stitch_borders`] perform the surgery for a
//!   list of pairs, whether detected or supplied by the caller.
//!
//! [`stitch_mesh`] and friends compose the two.
//!
//! Both steps are generic over [`StitchTopology`], implemented for
//! [`HalfEdgeMesh`](crate::mesh::HalfEdgeMesh), and over the point type
//! through [`KernelPoint`].
//!
//! # Example
//!
//! ```
//! use seamweld::algo::stitch::stitch_mesh;
//! use seamweld::mesh::{build_polygon_soup, HalfEdgeMesh};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let mut mesh: HalfEdgeMesh = build_polygon_soup(&vertices, &[[0, 1, 2], [0, 2, 3]]).unwrap();
//! assert_eq!(mesh.num_vertices(), 6);
//!
//! let report = stitch_mesh(&mut mesh);
//! assert_eq!(report.pairs_stitched, 1);
//! assert_eq!(mesh.num_vertices(), 4);
//! assert_eq!(mesh.num_interior_edges(), 1);
//! ```

mod detect;
mod execute;
mod kernel;
mod topology;

use std::cmp::Ordering;
use std::collections::HashSet;

use log::warn;

use crate::algo::Progress;
use crate::error::{MeshError, Result};

pub use detect::{
    detect_duplicate_border_edges, detect_duplicate_border_edges_by,
    detect_duplicate_border_edges_by_key, StitchPair,
};
pub use execute::{stitch_borders, try_stitch_borders, try_stitch_borders_with_progress};
pub use kernel::{BorderEdgeKey, KernelPoint};
pub use topology::StitchTopology;

use execute::{stitch_internal, Pass, Stage};

/// Options for stitching.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StitchOptions {
    /// How far apart two endpoints may be and still be merged.
    ///
    /// Zero (the default) requires exact equality. A positive value also makes
    /// [`stitch_mesh_with`] match border edges on endpoints snapped to a grid
    /// of this cell size. The surviving vertex keeps its own position.
    ///
    /// Distances are measured between the vertices a pair merges at the moment
    /// it is stitched, so a vertex never joins a survivor farther away than
    /// this, however many merges came before. The one-call passes skip such a
    /// pair; [`try_stitch_borders`] rejects the batch.
    pub tolerance: f64,
}

impl Default for StitchOptions {
    fn default() -> Self {
        Self { tolerance: 0.0 }
    }
}

impl StitchOptions {
    /// Set the merge tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Check that the options are usable.
    pub fn validate(&self) -> Result<()> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(MeshError::invalid_param(
                "tolerance",
                self.tolerance,
                "must be finite and non-negative",
            ));
        }
        Ok(())
    }
}

/// What a stitching pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StitchReport {
    /// Number of pairs welded into interior edges.
    pub pairs_stitched: usize,
    /// Number of vertices merged away.
    pub vertices_removed: usize,
    /// Number of edges erased (one per stitched pair).
    pub edges_removed: usize,
    /// Number of detected pairs left unstitched because they were ambiguous
    /// or their endpoints did not line up.
    pub pairs_skipped: usize,
}

/// Detect duplicated border edges and stitch them, with default options.
///
/// # Panics
///
/// Only on a broken mesh; every detected pair that cannot be stitched is
/// skipped and counted in [`StitchReport::pairs_skipped`].
pub fn stitch_mesh<M>(mesh: &mut M) -> StitchReport
where
    M: StitchTopology,
{
    let pairs = detect_duplicate_border_edges(mesh);
    stitch_detected(mesh, pairs, &StitchOptions::default(), None)
}

/// Detect duplicated border edges and stitch them.
///
/// With a positive tolerance, border edges are matched on quantized
/// endpoints and merged when their endpoints lie within the tolerance.
pub fn stitch_mesh_with<M>(mesh: &mut M, options: &StitchOptions) -> Result<StitchReport>
where
    M: StitchTopology,
{
    stitch_mesh_internal(mesh, options, None)
}

/// Like [`stitch_mesh_with`], reporting one step per stitched pair.
pub fn stitch_mesh_with_progress<M>(
    mesh: &mut M,
    options: &StitchOptions,
    progress: &Progress,
) -> Result<StitchReport>
where
    M: StitchTopology,
{
    stitch_mesh_internal(mesh, options, Some(progress))
}

/// Detect border edges with equal keys and stitch them.
///
/// Matched pairs whose endpoints are not equal are skipped.
pub fn stitch_mesh_by_key<M, K, F>(mesh: &mut M, key: F) -> StitchReport
where
    M: StitchTopology,
    K: Ord,
    F: FnMut(&M, M::HalfEdge) -> K,
{
    let pairs = detect_duplicate_border_edges_by_key(mesh, key);
    stitch_detected(mesh, pairs, &StitchOptions::default(), None)
}

/// Detect border edges a comparator considers equal and stitch them.
///
/// Matched pairs whose endpoints are not equal are skipped.
pub fn stitch_mesh_by<M, C>(mesh: &mut M, compare: C) -> StitchReport
where
    M: StitchTopology,
    C: FnMut(&M, M::HalfEdge, M::HalfEdge) -> Ordering,
{
    let pairs = detect_duplicate_border_edges_by(mesh, compare);
    stitch_detected(mesh, pairs, &StitchOptions::default(), None)
}

fn stitch_mesh_internal<M>(
    mesh: &mut M,
    options: &StitchOptions,
    progress: Option<&Progress>,
) -> Result<StitchReport>
where
    M: StitchTopology,
{
    options.validate()?;

    if let Some(p) = progress {
        p.report_sub(0, 1, 0, 2, "Detecting duplicate border edges");
    }
    let pairs = if options.tolerance > 0.0 {
        let cell = options.tolerance;
        detect_duplicate_border_edges_by_key(mesh, |m, he| BorderEdgeKey::quantized(m, he, cell))
    } else {
        detect_duplicate_border_edges(mesh)
    };

    let stage = progress.map(|progress| Stage {
        progress,
        step: 1,
        steps: 2,
    });
    Ok(stitch_detected(mesh, pairs, options, stage))
}

/// Stitch detector output one pair at a time.
///
/// Detected pairs on a polygon soup are typically border neighbours of each
/// other, which a single batch cannot absorb; stitching them one by one keeps
/// the border consistent between pairs.
fn stitch_detected<M>(
    mesh: &mut M,
    pairs: Vec<StitchPair<M::HalfEdge>>,
    options: &StitchOptions,
    stage: Option<Stage<'_>>,
) -> StitchReport
where
    M: StitchTopology,
{
    let detected = pairs.len();
    let pairs = select_stitchable(mesh, pairs, options.tolerance);
    let skipped = detected - pairs.len();

    let mut report = match stitch_internal(mesh, &pairs, options, stage, Pass::Sequential) {
        Ok(report) => report,
        Err(err) => panic!("{}", err),
    };
    report.pairs_skipped += skipped;
    report
}

/// Keep the first pair that uses each half-edge, and only pairs whose
/// endpoints line up head to tail.
fn select_stitchable<M>(
    mesh: &M,
    pairs: Vec<StitchPair<M::HalfEdge>>,
    tolerance: f64,
) -> Vec<StitchPair<M::HalfEdge>>
where
    M: StitchTopology,
{
    let mut used = HashSet::with_capacity(pairs.len() * 2);
    let mut selected = Vec::with_capacity(pairs.len());

    for (h1, h2) in pairs {
        if used.contains(&h1) || used.contains(&h2) {
            warn!("skipping {:?} / {:?}: half-edge already stitched", h1, h2);
            continue;
        }

        let lined_up = [
            (mesh.target(h1), mesh.target(mesh.opposite(h2))),
            (mesh.target(mesh.opposite(h1)), mesh.target(h2)),
        ]
        .into_iter()
        .all(|(a, b)| a == b || mesh.point(a).coincides(mesh.point(b), tolerance));
        if !lined_up {
            warn!("skipping {:?} / {:?}: opposite orientation or endpoints apart", h1, h2);
            continue;
        }

        used.insert(h1);
        used.insert(h2);
        selected.push((h1, h2));
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{build_polygon_soup, to_face_vertex, HalfEdgeMesh};
    use nalgebra::Point3;
    use std::sync::{Arc, Mutex};

    pub(super) fn cube_corners() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ]
    }

    pub(super) const CUBE_FACES: [[usize; 3]; 12] = [
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

    /// An n x n grid of unit squares in the z = 0 plane, two triangles each.
    fn grid(n: usize) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
        let mut vertices = Vec::new();
        for j in 0..=n {
            for i in 0..=n {
                vertices.push(Point3::new(i as f64, j as f64, 0.0));
            }
        }
        let mut faces = Vec::new();
        for j in 0..n {
            for i in 0..n {
                let a = j * (n + 1) + i;
                let (b, c, d) = (a + 1, a + n + 2, a + n + 1);
                faces.push([a, b, c]);
                faces.push([a, c, d]);
            }
        }
        (vertices, faces)
    }

    #[test]
    fn test_cube_soup_closes() {
        let mut mesh: HalfEdgeMesh = build_polygon_soup(&cube_corners(), &CUBE_FACES).unwrap();
        assert_eq!(mesh.num_vertices(), 36);
        assert_eq!(mesh.num_border_halfedges(), 36);

        let report = stitch_mesh(&mut mesh);

        assert_eq!(report.pairs_stitched, 18);
        assert_eq!(report.vertices_removed, 28);
        assert_eq!(report.pairs_skipped, 0);
        assert_eq!(mesh.num_vertices(), 8);
        assert_eq!(mesh.num_edges(), 18);
        assert_eq!(mesh.num_faces(), 12);
        assert_eq!(mesh.num_border_halfedges(), 0);
        assert_eq!(mesh.euler_characteristic(), 2);
        assert!(mesh.check_integrity().is_ok());
        assert!((mesh.surface_area() - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_grid_soup_keeps_outer_border() {
        let (vertices, faces) = grid(4);
        let mut mesh: HalfEdgeMesh = build_polygon_soup(&vertices, &faces).unwrap();

        let report = stitch_mesh(&mut mesh);

        assert_eq!(report.pairs_stitched, 40);
        assert_eq!(mesh.num_vertices(), 25);
        assert_eq!(mesh.num_edges(), 56);
        assert_eq!(mesh.num_border_halfedges(), 16);
        assert_eq!(mesh.border_loops().len(), 1);
        assert!(mesh.check_integrity().is_ok());
        assert!(detect_duplicate_border_edges(&mut mesh).is_empty());
    }

    #[test]
    fn test_stitched_soup_matches_welded_export() {
        let (vertices, faces) = grid(2);
        let mut mesh: HalfEdgeMesh = build_polygon_soup(&vertices, &faces).unwrap();
        stitch_mesh(&mut mesh);
        mesh.garbage_collection();

        let (out_vertices, out_faces) = to_face_vertex(&mesh);
        assert_eq!(out_vertices.len(), vertices.len());
        assert_eq!(out_faces.len(), faces.len());

        // Faces keep their order and orientation; the first corner may move.
        for (face, input) in out_faces.iter().zip(&faces) {
            let corners: Vec<_> = face.iter().map(|&i| out_vertices[i]).collect();
            let expected: Vec<_> = input.iter().map(|&i| vertices[i]).collect();
            assert!(
                (0..3).any(|r| (0..3).all(|k| corners[(k + r) % 3] == expected[k])),
                "{:?} is not a rotation of {:?}",
                corners,
                expected
            );
        }
    }

    #[test]
    fn test_flipped_face_is_skipped() {
        // The second triangle runs clockwise, so the shared diagonal is
        // traversed the same way on both sides.
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let mut mesh: HalfEdgeMesh =
            build_polygon_soup(&vertices, &[[0, 1, 2], [0, 3, 2]]).unwrap();

        let report = stitch_mesh(&mut mesh);

        assert_eq!(report.pairs_stitched, 0);
        assert_eq!(report.pairs_skipped, 1);
        assert_eq!(mesh.num_vertices(), 6);
        assert!(mesh.check_integrity().is_ok());
    }

    #[test]
    fn test_ambiguous_edge_stitches_once() {
        // Three triangles on the segment (0,0)-(1,0): two on one side, one on
        // the other. Only the first detected pair is stitched.
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, -1.0, 0.0),
            Point3::new(0.5, 0.0, 1.0),
        ];
        let faces = [[0, 1, 2], [1, 0, 3], [0, 1, 4]];
        let mut mesh: HalfEdgeMesh = build_polygon_soup(&vertices, &faces).unwrap();

        let report = stitch_mesh(&mut mesh);

        assert_eq!(report.pairs_stitched, 1);
        assert_eq!(report.pairs_skipped, 1);
        assert_eq!(mesh.num_interior_edges(), 1);
        assert!(mesh.check_integrity().is_ok());
    }

    #[test]
    fn test_tolerance_stitches_noisy_seam() {
        let noise = 1e-9;
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0 + noise, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
            Point3::new(1.0 - noise, 1.0, 0.0),
        ];
        let faces = [[0, 1, 2], [0, 2, 3], [4, 5, 6], [4, 6, 7]];

        let mut exact: HalfEdgeMesh = build_polygon_soup(&vertices, &faces).unwrap();
        let report = stitch_mesh(&mut exact);
        // Only the two diagonals line up exactly.
        assert_eq!(report.pairs_stitched, 2);
        assert_eq!(exact.num_vertices(), 8);

        let mut loose: HalfEdgeMesh = build_polygon_soup(&vertices, &faces).unwrap();
        let options = StitchOptions::default().with_tolerance(1e-6);
        let report = stitch_mesh_with(&mut loose, &options).unwrap();
        assert_eq!(report.pairs_stitched, 3);
        assert_eq!(loose.num_vertices(), 6);
        assert_eq!(loose.border_loops().len(), 1);
        assert!(loose.check_integrity().is_ok());
    }

    #[test]
    fn test_custom_key_and_comparator_agree() {
        let (vertices, faces) = grid(3);
        let mut by_key: HalfEdgeMesh = build_polygon_soup(&vertices, &faces).unwrap();
        let mut by_cmp = by_key.clone();

        let a = stitch_mesh_by_key(&mut by_key, BorderEdgeKey::of);
        let b = stitch_mesh_by(&mut by_cmp, |m, x, y| {
            BorderEdgeKey::of(m, x).cmp(&BorderEdgeKey::of(m, y))
        });

        assert_eq!(a, b);
        assert_eq!(by_key.num_vertices(), 16);
        assert_eq!(format!("{:?}", by_key), format!("{:?}", by_cmp));
    }

    #[test]
    fn test_options_validate() {
        assert!(StitchOptions::default().validate().is_ok());
        assert!(StitchOptions::default().with_tolerance(0.5).validate().is_ok());
        assert!(StitchOptions::default().with_tolerance(-0.5).validate().is_err());
        assert!(StitchOptions::default().with_tolerance(f64::NAN).validate().is_err());

        let mut mesh: HalfEdgeMesh =
            build_polygon_soup(&cube_corners(), &CUBE_FACES).unwrap();
        let bad = StitchOptions::default().with_tolerance(f64::INFINITY);
        assert!(stitch_mesh_with(&mut mesh, &bad).is_err());
        assert_eq!(mesh.num_vertices(), 36);
    }

    #[test]
    fn test_progress_completes_on_closed_mesh() {
        let mut mesh: HalfEdgeMesh = build_polygon_soup(&cube_corners(), &CUBE_FACES).unwrap();
        stitch_mesh(&mut mesh);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let progress = Progress::new(move |current, total, _| {
            sink.lock().unwrap().push((current, total));
        });
        let report =
            stitch_mesh_with_progress(&mut mesh, &StitchOptions::default(), &progress).unwrap();

        assert_eq!(report.pairs_stitched, 0);
        assert_eq!(*seen.lock().unwrap(), vec![(0, 2000), (2000, 2000)]);
    }
}
