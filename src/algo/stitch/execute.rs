//! Border stitching: welding pairs of border half-edges into interior edges.

use std::collections::HashSet;

use log::{debug, info, warn};

use super::detect::StitchPair;
use super::kernel::KernelPoint;
use super::topology::StitchTopology;
use super::{StitchOptions, StitchReport};
use crate::algo::Progress;
use crate::error::{MeshError, Result};

/// How in-batch neighbours are recognised while stitching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pass {
    /// Every half-edge of the whole batch counts as in-batch. Border links
    /// between pairs are left for the later pair to repair. A pair that
    /// cannot be stitched when its turn comes fails the pass.
    Batch,
    /// Each pair is stitched as a batch of its own, so the border is fully
    /// repaired after every pair. A pair whose endpoints drifted apart
    /// through earlier merges is skipped.
    Sequential,
}

/// Where a stitching pass sits in a larger operation, for progress reports.
#[derive(Clone, Copy)]
pub(crate) struct Stage<'a> {
    pub progress: &'a Progress,
    pub step: usize,
    pub steps: usize,
}

impl<'a> Stage<'a> {
    pub(crate) fn whole(progress: &'a Progress) -> Self {
        Self {
            progress,
            step: 0,
            steps: 1,
        }
    }

    fn report(&self, current: usize, total: usize) {
        self.progress
            .report_sub(current, total, self.step, self.steps, "Stitching borders");
    }
}

/// Stitch every pair of border half-edges, in order.
///
/// For a pair `(h1, h2)`, `h1` survives as an interior half-edge of the face
/// on the other side of `h2`, and `h2` is erased with its opposite. The
/// endpoints of `h2` are merged into those of `h1`: `target(h1)` and
/// `target(h2)` survive, the other two vertices are erased at the end of the
/// pass. Border bookkeeping is normalized afterwards.
///
/// Pairs whose neighbours along the border are also being stitched must be
/// listed so that each pair can be stitched when its turn comes; the pass
/// does not reorder them. For detector output on a polygon soup use
/// [`stitch_mesh`](super::stitch_mesh), which stitches pair by pair.
///
/// # Panics
///
/// Panics if a pair violates a precondition: both half-edges must be live
/// border half-edges whose opposites are not, no half-edge may appear twice,
/// merged endpoints must have equal positions, and a pair's border neighbours
/// must agree on whether they are part of the batch. These are checked before
/// anything is mutated. A batch that passes them but still cannot be stitched
/// in the given order, such as one whose vertex fans stop closing after
/// earlier pairs, panics midway and leaves the mesh partly stitched. See
/// [`try_stitch_borders`] for a variant that leaves the mesh untouched.
pub fn stitch_borders<M>(mesh: &mut M, pairs: &[StitchPair<M::HalfEdge>]) -> StitchReport
where
    M: StitchTopology,
{
    match stitch_internal(mesh, pairs, &StitchOptions::default(), None, Pass::Batch) {
        Ok(report) => report,
        Err(err) => panic!("{}", err),
    }
}

/// Stitch every pair of border half-edges, reporting violated preconditions
/// as [`MeshError::StitchPrecondition`].
///
/// The pass runs on a copy of the mesh that replaces `mesh` only once every
/// pair is stitched and the result passes
/// [`StitchTopology::check_integrity`]; a failed integrity check is returned
/// as is. The mesh is left untouched when an error is returned.
pub fn try_stitch_borders<M>(
    mesh: &mut M,
    pairs: &[StitchPair<M::HalfEdge>],
    options: &StitchOptions,
) -> Result<StitchReport>
where
    M: StitchTopology + Clone,
{
    stitch_atomic(mesh, pairs, options, None)
}

/// Like [`try_stitch_borders`], reporting one step per stitched pair.
pub fn try_stitch_borders_with_progress<M>(
    mesh: &mut M,
    pairs: &[StitchPair<M::HalfEdge>],
    options: &StitchOptions,
    progress: &Progress,
) -> Result<StitchReport>
where
    M: StitchTopology + Clone,
{
    stitch_atomic(mesh, pairs, options, Some(Stage::whole(progress)))
}

fn stitch_atomic<M>(
    mesh: &mut M,
    pairs: &[StitchPair<M::HalfEdge>],
    options: &StitchOptions,
    stage: Option<Stage<'_>>,
) -> Result<StitchReport>
where
    M: StitchTopology + Clone,
{
    options.validate()?;
    if pairs.is_empty() {
        return stitch_internal(mesh, pairs, options, stage, Pass::Batch);
    }

    let mut scratch = mesh.clone();
    let report = stitch_internal(&mut scratch, pairs, options, stage, Pass::Batch)?;
    scratch.check_integrity()?;
    *mesh = scratch;
    Ok(report)
}

pub(crate) fn stitch_internal<M>(
    mesh: &mut M,
    pairs: &[StitchPair<M::HalfEdge>],
    options: &StitchOptions,
    stage: Option<Stage<'_>>,
    pass: Pass,
) -> Result<StitchReport>
where
    M: StitchTopology,
{
    options.validate()?;
    if pairs.is_empty() {
        if let Some(s) = stage {
            s.report(1, 1);
        }
        return Ok(StitchReport::default());
    }

    let batch: HashSet<M::HalfEdge> = pairs.iter().flat_map(|&(h1, h2)| [h1, h2]).collect();
    validate_pairs(mesh, pairs, options.tolerance, &batch, pass)?;

    let total = pairs.len();
    let mut stitched = 0;
    let mut doomed = Vec::new();
    for (k, &(h1, h2)) in pairs.iter().enumerate() {
        match check_merges(mesh, k, h1, h2, options.tolerance) {
            Ok(()) => {
                match pass {
                    Pass::Batch => {
                        stitch_pair(mesh, k, h1, h2, |h| batch.contains(&h), &mut doomed)?
                    }
                    Pass::Sequential => {
                        stitch_pair(mesh, k, h1, h2, |h| h == h1 || h == h2, &mut doomed)?
                    }
                }
                stitched += 1;
                debug!("stitched {:?} with {:?}", h1, h2);
            }
            Err(err) if pass == Pass::Sequential => {
                warn!("skipping {:?} / {:?}: {}", h1, h2, err);
            }
            Err(err) => return Err(err),
        }

        if let Some(s) = stage {
            s.report(k + 1, total);
        }
    }

    let mut removed = HashSet::with_capacity(doomed.len());
    for v in doomed {
        if removed.insert(v) {
            mesh.erase_vertex(v);
        }
    }
    mesh.normalize_border();

    let report = StitchReport {
        pairs_stitched: stitched,
        vertices_removed: removed.len(),
        edges_removed: stitched,
        pairs_skipped: total - stitched,
    };
    info!(
        "stitched {} border pairs, removed {} vertices",
        report.pairs_stitched, report.vertices_removed
    );
    Ok(report)
}

/// Check every pair against the mesh as it is before the pass.
///
/// Stitching a pair only rewrites links of half-edges outside the batch, of
/// interior half-edges, and of the pair itself, so the border and uniqueness
/// conditions checked here still hold when each later pair is reached.
/// Endpoint distances can change as vertices merge, so [`check_merges`]
/// repeats that test when the pair's turn comes.
fn validate_pairs<M>(
    mesh: &M,
    pairs: &[StitchPair<M::HalfEdge>],
    tolerance: f64,
    batch: &HashSet<M::HalfEdge>,
    pass: Pass,
) -> Result<()>
where
    M: StitchTopology,
{
    let fail = |k: usize, reason: String| Err(MeshError::stitch_precondition(k, reason));
    let mut seen = HashSet::with_capacity(batch.len());

    for (k, &(h1, h2)) in pairs.iter().enumerate() {
        for h in [h1, h2] {
            if !mesh.contains_halfedge(h) {
                return fail(k, format!("{:?} is not a live half-edge", h));
            }
            if !mesh.is_border(h) {
                return fail(k, format!("{:?} is not a border half-edge", h));
            }
            if mesh.is_border(mesh.opposite(h)) {
                return fail(k, format!("the opposite of {:?} is a border half-edge", h));
            }
            if !seen.insert(h) {
                return fail(k, format!("{:?} appears in more than one pair", h));
            }
        }

        check_merges(mesh, k, h1, h2, tolerance)?;

        if pass == Pass::Batch {
            let seams = [
                (mesh.next(h1), mesh.prev(h2)),
                (mesh.next(h2), mesh.prev(h1)),
            ];
            for (a, b) in seams {
                if batch.contains(&a) != batch.contains(&b) {
                    return fail(
                        k,
                        format!(
                            "border neighbours {:?} and {:?} disagree on batch membership",
                            a, b
                        ),
                    );
                }
            }
        }
    }

    Ok(())
}

/// Check that the vertices pair `k` would merge lie within `tolerance` of
/// each other, as the mesh stands now.
fn check_merges<M>(
    mesh: &M,
    k: usize,
    h1: M::HalfEdge,
    h2: M::HalfEdge,
    tolerance: f64,
) -> Result<()>
where
    M: StitchTopology,
{
    let ends = [
        (mesh.target(h1), mesh.target(mesh.opposite(h2))),
        (mesh.target(mesh.opposite(h1)), mesh.target(h2)),
    ];
    for (keep, merge) in ends {
        if keep != merge && !mesh.point(keep).coincides(mesh.point(merge), tolerance) {
            return Err(MeshError::stitch_precondition(
                k,
                format!(
                    "{:?} at {:?} does not coincide with {:?} at {:?}",
                    keep,
                    mesh.point(keep),
                    merge,
                    mesh.point(merge)
                ),
            ));
        }
    }
    Ok(())
}

fn stitch_pair<M, F>(
    mesh: &mut M,
    k: usize,
    h1: M::HalfEdge,
    h2: M::HalfEdge,
    in_batch: F,
    doomed: &mut Vec<M::Vertex>,
) -> Result<()>
where
    M: StitchTopology,
    F: Fn(M::HalfEdge) -> bool,
{
    let h1_opp = mesh.opposite(h1);
    let h2_opp = mesh.opposite(h2);

    // Merge the vertex h1 ends at with the one h2 starts from.
    let h1_tgt = mesh.target(h1);
    let h2_src = mesh.target(h2_opp);
    if h1_tgt != h2_src {
        doomed.push(h2_src);
        retarget_fan(mesh, k, h2_opp, h1_tgt)?;
    }
    mesh.set_vertex_halfedge(h1_tgt, h1);

    // And the vertex h1 starts from with the one h2 ends at.
    let h1_src = mesh.target(h1_opp);
    let h2_tgt = mesh.target(h2);
    if h1_src != h2_tgt {
        doomed.push(h1_src);
        retarget_fan(mesh, k, h1_opp, h2_tgt)?;
        mesh.set_vertex_halfedge(h2_tgt, h1_opp);
    } else {
        mesh.set_vertex_halfedge(h1_src, h1_opp);
    }

    // Close the border over the gap the pair leaves behind.
    let after_h1 = mesh.next(h1);
    if !in_batch(after_h1) {
        let before_h2 = mesh.prev(h2);
        mesh.set_next(before_h2, after_h1);
        mesh.set_prev(after_h1, before_h2);
    }
    let after_h2 = mesh.next(h2);
    if !in_batch(after_h2) {
        let before_h1 = mesh.prev(h1);
        mesh.set_next(before_h1, after_h2);
        mesh.set_prev(after_h2, before_h1);
    }

    // h1 replaces the opposite of h2 in its face.
    let face = mesh.face(h2_opp);
    mesh.set_face(h1, face);
    if let Some(f) = face {
        mesh.set_face_halfedge(f, h1);
    }
    let before = mesh.prev(h2_opp);
    mesh.set_next(before, h1);
    mesh.set_prev(h1, before);
    let after = mesh.next(h2_opp);
    mesh.set_next(h1, after);
    mesh.set_prev(after, h1);

    mesh.erase_edge(h2);
    Ok(())
}

/// Point every half-edge that ends where `start` ends at `keep` instead.
///
/// Fails when the walk around the vertex does not come back to `start`,
/// which happens when earlier pairs of the batch left its border links
/// pointing elsewhere.
fn retarget_fan<M>(mesh: &mut M, k: usize, start: M::HalfEdge, keep: M::Vertex) -> Result<()>
where
    M: StitchTopology,
{
    let limit = mesh.halfedge_capacity();
    let mut h = start;
    for _ in 0..=limit {
        mesh.set_target(h, keep);
        h = mesh.opposite(mesh.next(h));
        if h == start {
            return Ok(());
        }
    }
    Err(MeshError::stitch_precondition(
        k,
        format!("vertex fan through {:?} does not close", start),
    ))
}
