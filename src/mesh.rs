//! Symmetric mesh sizing
//!
//! The symmetry boundary conditions on the plate centerlines require node
//! lines at x = 0 and y = 0, so every axis must be split into an even number
//! of equal segments. Half-counts are rounded to even (matching the
//! numerical behavior of the reference implementation) so that element
//! counts stay close to the requested density.

use serde::{Deserialize, Serialize};

use crate::error::{BucklingError, BucklingResult};

/// Element edge lengths produced by mesh sizing
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ElementSizes {
    /// Global target edge length
    pub global: f64,
    /// Edge length of segments along the width (x) axis
    pub along_width: f64,
    /// Edge length of segments along the height (y) axis
    pub along_height: f64,
}

/// Compute symmetric element edge lengths for a `width` × `height` plate
/// with at least `nelem` elements along the shorter edge.
///
/// Each returned per-axis edge length divides its dimension into an even
/// integer number of equal segments.
pub fn element_sizes(width: f64, height: f64, nelem: usize) -> BucklingResult<ElementSizes> {
    if width <= 0.0 || height <= 0.0 {
        return Err(BucklingError::InvalidGeometry(format!(
            "plate dimensions must be positive, got width = {width}, height = {height}"
        )));
    }

    let global = width.min(height) / nelem.max(1) as f64;

    Ok(ElementSizes {
        global,
        along_width: axis_size(width, global),
        along_height: axis_size(height, global),
    })
}

/// Split one axis of length `d` into `2 * halves` equal segments, with
/// `halves` the rounded-to-even half-count nearest `d / esize / 2`.
fn axis_size(d: f64, esize: f64) -> f64 {
    let halves = (d / esize / 2.0).round_ties_even().max(1.0);
    d / halves / 2.0
}
