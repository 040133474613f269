//! Progress reporting for long-running passes.
//!
//! Stitching a large polygon soup touches every border half-edge; callers
//! that want feedback hand a [`Progress`] to the `_with_progress` variants.
//!
//! # Example
//!
//! ```
//! use seamweld::algo::progress::Progress;
//! use seamweld::algo::stitch::{stitch_mesh_with_progress, StitchOptions};
//! use seamweld::mesh::{build_polygon_soup, HalfEdgeMesh};
//! use nalgebra::Point3;
//!
//! let progress = Progress::new(|current, total, message| {
//!     println!("[{}/{}] {}", current, total, message);
//! });
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let mut mesh: HalfEdgeMesh = build_polygon_soup(&vertices, &[[0, 1, 2], [0, 2, 3]]).unwrap();
//! stitch_mesh_with_progress(&mut mesh, &StitchOptions::default(), &progress).unwrap();
//! ```

/// A progress callback.
///
/// The callback receives the number of steps done, the total number of steps
/// and a short description of the pass.
pub struct Progress {
    callback: Box<dyn Fn(usize, usize, &str) + Send + Sync>,
}

impl Progress {
    /// Create a new progress reporter with the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Report progress.
    #[inline]
    pub fn report(&self, current: usize, total: usize, message: &str) {
        (self.callback)(current, total, message);
    }

    /// Report progress of a sub-pass that occupies step `range_current` of
    /// `range_total`.
    ///
    /// Reported in thousandths of a step, so the callback sees
    /// `range_current * 1000 + fraction` out of `range_total * 1000`.
    ///
    /// # Example
    ///
    /// ```
    /// # use seamweld::algo::Progress;
    /// # let progress = Progress::none();
    /// # let (pairs_done, total_pairs) = (3, 10);
    /// // Two top-level steps; step 1 is the stitching pass with its own pairs.
    /// progress.report_sub(pairs_done, total_pairs, 1, 2, "Stitching borders");
    /// ```
    #[inline]
    pub fn report_sub(
        &self,
        sub_current: usize,
        sub_total: usize,
        range_current: usize,
        range_total: usize,
        message: &str,
    ) {
        if sub_total == 0 || range_total == 0 {
            return;
        }
        let sub_fraction = (sub_current * 1000) / sub_total;
        let effective = range_current * 1000 + sub_fraction;
        let total_scaled = range_total * 1000;
        (self.callback)(effective, total_scaled, message);
    }

    /// Create a no-op progress reporter that discards all updates.
    pub fn none() -> Self {
        Self::new(|_, _, _| {})
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_report_sub_maps_into_range() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let progress = Progress::new(move |current, total, _| {
            sink.lock().unwrap().push((current, total));
        });

        progress.report_sub(1, 2, 1, 4, "half of step 1");
        progress.report_sub(5, 0, 1, 4, "ignored");

        assert_eq!(*seen.lock().unwrap(), vec![(1500, 4000)]);
    }
}
