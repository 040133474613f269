//! Index types for mesh elements.
//!
//! Vertices, half-edges and faces live in flat arenas and are addressed by
//! typed indices. The raw integer width is a type parameter so small meshes
//! can use `u16` and huge ones `u64`; `u32` is the default everywhere.

use std::fmt::{self, Debug};
use std::hash::Hash;

/// Integer types usable as mesh indices.
///
/// The largest value of each type is reserved as the "no element" sentinel.
pub trait MeshIndex: Copy + Eq + Ord + Hash + Debug + Send + Sync + 'static {
    /// The largest index that can address an element.
    const MAX: Self;

    /// Sentinel for a missing element.
    const INVALID: Self;

    /// Convert from usize.
    ///
    /// # Panics
    /// Debug builds panic if the value does not fit.
    fn from_usize(v: usize) -> Self;

    /// Convert to usize.
    fn to_usize(self) -> usize;

    /// Whether this is a real index rather than the sentinel.
    #[inline]
    fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

macro_rules! impl_mesh_index {
    ($($ty:ty),*) => {
        $(
            impl MeshIndex for $ty {
                const MAX: Self = <$ty>::MAX - 1;
                const INVALID: Self = <$ty>::MAX;

                #[inline]
                fn from_usize(v: usize) -> Self {
                    debug_assert!(
                        v as u128 <= Self::MAX as u128,
                        "index {} too large for {}",
                        v,
                        stringify!($ty)
                    );
                    v as $ty
                }

                #[inline]
                fn to_usize(self) -> usize {
                    self as usize
                }
            }
        )*
    };
}

impl_mesh_index!(u16, u32, u64);

/// A vertex index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct VertexId<I: MeshIndex = u32>(I);

/// A half-edge index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct HalfEdgeId<I: MeshIndex = u32>(I);

/// A face index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct FaceId<I: MeshIndex = u32>(I);

macro_rules! impl_index_type {
    ($name:ident, $display:literal) => {
        impl<I: MeshIndex> $name<I> {
            /// Create an index from a raw slot number.
            #[inline]
            pub fn new(index: usize) -> Self {
                Self(I::from_usize(index))
            }

            /// The sentinel index.
            #[inline]
            pub fn invalid() -> Self {
                Self(I::INVALID)
            }

            /// The slot number.
            #[inline]
            pub fn index(self) -> usize {
                self.0.to_usize()
            }

            /// The underlying integer.
            #[inline]
            pub fn raw(self) -> I {
                self.0
            }

            /// Whether this refers to a slot (it may still be a removed one).
            #[inline]
            pub fn is_valid(self) -> bool {
                self.0.is_valid()
            }
        }

        impl<I: MeshIndex> Debug for $name<I> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({})", $display, self.index())
                } else {
                    write!(f, "{}(INVALID)", $display)
                }
            }
        }

        impl<I: MeshIndex> Default for $name<I> {
            fn default() -> Self {
                Self::invalid()
            }
        }

        impl<I: MeshIndex> From<usize> for $name<I> {
            fn from(v: usize) -> Self {
                Self::new(v)
            }
        }
    };
}

impl_index_type!(VertexId, "V");
impl_index_type!(HalfEdgeId, "HE");
impl_index_type!(FaceId, "F");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel() {
        let he: HalfEdgeId = HalfEdgeId::new(7);
        assert!(he.is_valid());
        assert_eq!(he.index(), 7);
        assert!(!HalfEdgeId::<u32>::invalid().is_valid());
        assert_eq!(HalfEdgeId::<u32>::default(), HalfEdgeId::invalid());
    }

    #[test]
    fn test_index_widths() {
        let v: VertexId<u16> = VertexId::new(1000);
        assert_eq!(v.raw(), 1000u16);
        let f: FaceId<u64> = FaceId::new(1 << 40);
        assert_eq!(f.index(), 1 << 40);
        assert_eq!(<u16 as MeshIndex>::INVALID, u16::MAX);
    }

    #[test]
    fn test_debug_format() {
        let he: HalfEdgeId = HalfEdgeId::new(3);
        assert_eq!(format!("{:?}", he), "HE(3)");
        assert_eq!(format!("{:?}", VertexId::<u32>::invalid()), "V(INVALID)");
    }
}
