//! Mesh processing algorithms.
//!
//! - **Stitching**: detection of duplicated border edges and their welding
//!   into interior edges ([`stitch`])
//! - **Progress**: callback type for long-running passes ([`Progress`])

pub mod progress;
pub mod stitch;

pub use progress::Progress;
