//! Detection of duplicated border edges.

use std::cmp::Ordering;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use log::{debug, warn};

use super::kernel::BorderEdgeKey;
use super::topology::StitchTopology;

/// A pair of border half-edges to weld into one edge.
pub type StitchPair<H> = (H, H);

/// Find border half-edges that run along the same segment.
///
/// Two border half-edges match when their endpoint positions are equal as an
/// unordered pair. Border bookkeeping is normalized first. Each match is
/// reported as `(first seen, current)` in scan order; a third half-edge on the
/// same segment pairs with the first one again.
///
/// # Example
///
/// ```
/// use seamweld::algo::stitch::detect_duplicate_border_edges;
/// use seamweld::mesh::{build_polygon_soup, HalfEdgeMesh};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let mut mesh: HalfEdgeMesh = build_polygon_soup(&vertices, &[[0, 1, 2], [0, 2, 3]]).unwrap();
///
/// let pairs = detect_duplicate_border_edges(&mut mesh);
/// assert_eq!(pairs.len(), 1);
/// ```
pub fn detect_duplicate_border_edges<M>(mesh: &mut M) -> Vec<StitchPair<M::HalfEdge>>
where
    M: StitchTopology,
{
    detect_duplicate_border_edges_by_key(mesh, BorderEdgeKey::of)
}

/// Find border half-edges whose keys are equal.
///
/// `key` maps a border half-edge to any totally ordered value; half-edges with
/// equal keys are considered the same edge. Pairing and output order follow
/// [`detect_duplicate_border_edges`].
pub fn detect_duplicate_border_edges_by_key<M, K, F>(
    mesh: &mut M,
    mut key: F,
) -> Vec<StitchPair<M::HalfEdge>>
where
    M: StitchTopology,
    K: Ord,
    F: FnMut(&M, M::HalfEdge) -> K,
{
    mesh.normalize_border();
    let mesh: &M = mesh;

    // key -> (first half-edge seen, matches so far)
    let mut seen: BTreeMap<K, (M::HalfEdge, usize)> = BTreeMap::new();
    let mut pairs = Vec::new();
    let mut scanned = 0;

    for he in mesh.border_halfedges() {
        scanned += 1;
        match seen.entry(key(mesh, he)) {
            Entry::Vacant(slot) => {
                slot.insert((he, 0));
            }
            Entry::Occupied(mut slot) => {
                let (first, matches) = slot.get_mut();
                *matches += 1;
                if *matches == 2 {
                    warn!(
                        "ambiguous border edge: {:?} already matched, pairing {:?} with it again",
                        first, he
                    );
                }
                pairs.push((*first, he));
            }
        }
    }

    debug!(
        "scanned {} border half-edges, found {} duplicate pairs",
        scanned,
        pairs.len()
    );
    pairs
}

/// Find border half-edges that a comparator considers equal.
///
/// `compare` must be a total order over border half-edges. The result is the
/// same as [`detect_duplicate_border_edges_by_key`] with a key whose order is
/// `compare`: every half-edge pairs with the first half-edge of its class in
/// scan order, and pairs are listed in scan order of their second member.
pub fn detect_duplicate_border_edges_by<M, C>(
    mesh: &mut M,
    mut compare: C,
) -> Vec<StitchPair<M::HalfEdge>>
where
    M: StitchTopology,
    C: FnMut(&M, M::HalfEdge, M::HalfEdge) -> Ordering,
{
    mesh.normalize_border();
    let mesh: &M = mesh;

    let border: Vec<M::HalfEdge> = mesh.border_halfedges().collect();

    // Stable sort: inside a class, scan order is kept.
    let mut order: Vec<usize> = (0..border.len()).collect();
    order.sort_by(|&a, &b| compare(mesh, border[a], border[b]));

    // (scan position of the second member, pair)
    let mut found: Vec<(usize, StitchPair<M::HalfEdge>)> = Vec::new();
    let mut class_start = 0;
    for i in 1..order.len() {
        let first = border[order[class_start]];
        let current = border[order[i]];
        if compare(mesh, first, current) == Ordering::Equal {
            if i - class_start == 2 {
                warn!(
                    "ambiguous border edge: {:?} already matched, pairing {:?} with it again",
                    first, current
                );
            }
            found.push((order[i], (first, current)));
        } else {
            class_start = i;
        }
    }

    found.sort_unstable_by_key(|&(position, _)| position);

    debug!(
        "scanned {} border half-edges, found {} duplicate pairs",
        border.len(),
        found.len()
    );
    found.into_iter().map(|(_, pair)| pair).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{build_from_triangles, build_polygon_soup, HalfEdgeId, HalfEdgeMesh};
    use nalgebra::Point3;

    fn square_corners() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]
    }

    fn tetrahedron() -> HalfEdgeMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];
        build_from_triangles(&vertices, &[[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]]).unwrap()
    }

    #[test]
    fn test_detects_diagonal_of_split_square() {
        let mut mesh: HalfEdgeMesh =
            build_polygon_soup(&square_corners(), &[[0, 1, 2], [0, 2, 3]]).unwrap();

        let pairs = detect_duplicate_border_edges(&mut mesh);
        assert_eq!(pairs.len(), 1);

        let (h1, h2) = pairs[0];
        assert!(h1 < h2);
        // The diagonal runs in opposite directions on the two sides.
        assert_eq!(mesh.position(mesh.origin(h1)), mesh.position(mesh.dest(h2)));
        assert_eq!(mesh.position(mesh.dest(h1)), mesh.position(mesh.origin(h2)));
    }

    #[test]
    fn test_closed_mesh_has_no_pairs() {
        let mut mesh = tetrahedron();
        assert!(detect_duplicate_border_edges(&mut mesh).is_empty());
        assert!(detect_duplicate_border_edges_by(&mut mesh, |m, a, b| {
            BorderEdgeKey::of(m, a).cmp(&BorderEdgeKey::of(m, b))
        })
        .is_empty());
    }

    #[test]
    fn test_third_duplicate_pairs_with_first() {
        // Three triangles hanging off the same segment (0,0)-(1,0).
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, -1.0, 0.0),
            Point3::new(0.5, 0.0, 1.0),
        ];
        let faces = [[0, 1, 2], [1, 0, 3], [0, 1, 4]];
        let mut mesh: HalfEdgeMesh = build_polygon_soup(&vertices, &faces).unwrap();

        let pairs = detect_duplicate_border_edges(&mut mesh);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].0, pairs[1].0);
        assert!(pairs[0].1 < pairs[1].1);
    }

    #[test]
    fn test_comparator_matches_key_detection() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
        ];
        let faces = [[0, 1, 2], [0, 2, 3], [1, 4, 5], [1, 5, 2]];
        let mut mesh: HalfEdgeMesh = build_polygon_soup(&vertices, &faces).unwrap();

        let by_key = detect_duplicate_border_edges(&mut mesh);
        let by_cmp = detect_duplicate_border_edges_by(&mut mesh, |m, a, b| {
            BorderEdgeKey::of(m, a).cmp(&BorderEdgeKey::of(m, b))
        });

        // Two diagonals and the shared edge x = 1.
        assert_eq!(by_key.len(), 3);
        assert_eq!(by_key, by_cmp);
    }

    #[test]
    fn test_custom_key() {
        // A key that lumps every border half-edge together pairs them all
        // with the very first one.
        let mut mesh: HalfEdgeMesh =
            build_polygon_soup(&square_corners(), &[[0, 1, 2], [0, 2, 3]]).unwrap();
        let pairs = detect_duplicate_border_edges_by_key(&mut mesh, |_, _| ());

        assert_eq!(pairs.len(), mesh.num_border_halfedges() - 1);
        let first = mesh.border_halfedge_ids().next().unwrap();
        assert!(pairs.iter().all(|&(a, _)| a == first));
        assert_eq!(pairs[0].1, HalfEdgeId::new(first.index() + 1));
    }
}
