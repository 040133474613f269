//! Point capabilities needed by border detection, and the default key.

use std::cmp::Ordering;
use std::fmt::Debug;

use nalgebra::{Point2, Point3};

use super::topology::StitchTopology;

/// What the stitching algorithms need from a point type.
///
/// `total_cmp` must be a total order that agrees with `==`: two points compare
/// `Equal` exactly when they are equal. For floating-point coordinates this
/// means treating `-0.0` and `0.0` as the same value.
pub trait KernelPoint: Clone + PartialEq + Debug {
    /// Total order over points, lexicographic by coordinate for the built-in impls.
    fn total_cmp(&self, other: &Self) -> Ordering;

    /// Euclidean distance to another point.
    fn distance(&self, other: &Self) -> f64;

    /// Snap every coordinate to the nearest multiple of `cell`.
    fn quantize(&self, cell: f64) -> Self;

    /// Whether two points are the same for stitching purposes.
    ///
    /// A zero tolerance asks for exact equality.
    fn coincides(&self, other: &Self, tolerance: f64) -> bool {
        if tolerance > 0.0 {
            self.distance(other) <= tolerance
        } else {
            self == other
        }
    }
}

// Adding 0.0 folds -0.0 into 0.0 so the order matches `==`.
#[inline]
fn cmp_coord(a: f64, b: f64) -> Ordering {
    (a + 0.0).total_cmp(&(b + 0.0))
}

#[inline]
fn snap(x: f64, cell: f64) -> f64 {
    (x / cell).round() * cell + 0.0
}

impl KernelPoint for Point3<f64> {
    fn total_cmp(&self, other: &Self) -> Ordering {
        cmp_coord(self.x, other.x)
            .then_with(|| cmp_coord(self.y, other.y))
            .then_with(|| cmp_coord(self.z, other.z))
    }

    fn distance(&self, other: &Self) -> f64 {
        nalgebra::distance(self, other)
    }

    fn quantize(&self, cell: f64) -> Self {
        Point3::new(snap(self.x, cell), snap(self.y, cell), snap(self.z, cell))
    }
}

impl KernelPoint for Point2<f64> {
    fn total_cmp(&self, other: &Self) -> Ordering {
        cmp_coord(self.x, other.x).then_with(|| cmp_coord(self.y, other.y))
    }

    fn distance(&self, other: &Self) -> f64 {
        nalgebra::distance(self, other)
    }

    fn quantize(&self, cell: f64) -> Self {
        Point2::new(snap(self.x, cell), snap(self.y, cell))
    }
}

/// The default equivalence key of a border half-edge: its two endpoint
/// positions, smaller first, so both traversal directions give the same key.
#[derive(Debug, Clone)]
pub struct BorderEdgeKey<P: KernelPoint> {
    lo: P,
    hi: P,
}

impl<P: KernelPoint> BorderEdgeKey<P> {
    /// Key of the segment between `a` and `b`.
    pub fn new(a: P, b: P) -> Self {
        if b.total_cmp(&a) == Ordering::Less {
            Self { lo: b, hi: a }
        } else {
            Self { lo: a, hi: b }
        }
    }

    /// Key of half-edge `he` from its exact endpoint positions.
    pub fn of<M>(mesh: &M, he: M::HalfEdge) -> Self
    where
        M: StitchTopology<Point = P>,
    {
        let source = mesh.point(mesh.target(mesh.opposite(he)));
        let target = mesh.point(mesh.target(he));
        Self::new(source.clone(), target.clone())
    }

    /// Key of half-edge `he` after snapping its endpoints to a grid of size `cell`.
    ///
    /// Endpoints that straddle a grid boundary can still land in different
    /// cells, so this only catches noise well below `cell`.
    pub fn quantized<M>(mesh: &M, he: M::HalfEdge, cell: f64) -> Self
    where
        M: StitchTopology<Point = P>,
    {
        let source = mesh.point(mesh.target(mesh.opposite(he)));
        let target = mesh.point(mesh.target(he));
        Self::new(source.quantize(cell), target.quantize(cell))
    }

    /// The smaller endpoint.
    pub fn lo(&self) -> &P {
        &self.lo
    }

    /// The larger endpoint.
    pub fn hi(&self) -> &P {
        &self.hi
    }
}

impl<P: KernelPoint> PartialEq for BorderEdgeKey<P> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<P: KernelPoint> Eq for BorderEdgeKey<P> {}

impl<P: KernelPoint> PartialOrd for BorderEdgeKey<P> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<P: KernelPoint> Ord for BorderEdgeKey<P> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.lo
            .total_cmp(&other.lo)
            .then_with(|| self.hi.total_cmp(&other.hi))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_order_is_lexicographic() {
        let a = Point3::new(0.0, 5.0, 5.0);
        let b = Point3::new(1.0, 0.0, 0.0);
        let c = Point3::new(1.0, 0.0, 1.0);
        assert_eq!(a.total_cmp(&b), Ordering::Less);
        assert_eq!(c.total_cmp(&b), Ordering::Greater);
        assert_eq!(b.total_cmp(&b), Ordering::Equal);
    }

    #[test]
    fn test_negative_zero_matches_equality() {
        let a = Point3::new(-0.0, 1.0, 0.0);
        let b = Point3::new(0.0, 1.0, -0.0);
        assert_eq!(a, b);
        assert_eq!(a.total_cmp(&b), Ordering::Equal);
    }

    #[test]
    fn test_key_ignores_direction() {
        let p = Point3::new(1.0, 0.0, 0.0);
        let q = Point3::new(1.0, 1.0, 0.0);
        let forward = BorderEdgeKey::new(p, q);
        let backward = BorderEdgeKey::new(q, p);
        assert_eq!(forward, backward);
        assert_eq!(forward.lo(), &p);
        assert_eq!(forward.hi(), &q);
    }

    #[test]
    fn test_quantize_absorbs_noise() {
        let p = Point3::new(0.3, 1.0000000004, -0.0);
        let q = Point3::new(0.3000000002, 0.9999999998, 0.0);
        assert_ne!(p, q);
        assert_eq!(p.quantize(1e-6), q.quantize(1e-6));
    }

    #[test]
    fn test_coincides_with_tolerance() {
        let p = Point2::new(0.0, 0.0);
        let q = Point2::new(0.0, 1e-9);
        assert!(!p.coincides(&q, 0.0));
        assert!(p.coincides(&q, 1e-6));
        assert!(p.coincides(&p, 0.0));
    }
}
