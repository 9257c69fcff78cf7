//! Tributary-length load distribution
//!
//! Converts the applied edge stresses into equivalent nodal forces. A node
//! on a loaded edge carries the stress integrated over its tributary length
//! (one mesh spacing; half of it at a plate corner, where only half of the
//! adjacent spacing lies inside the edge) times the plate thickness. Forces
//! act along the outward edge normal, so their sign follows the sign of the
//! node coordinate.

use crate::config::{LoadCase, PlateGeometry};
use crate::engine::FeEngine;
use crate::error::BucklingResult;
use crate::mesh::ElementSizes;

/// Coordinate tolerance for edge classification, matching the engine's
/// plane-selection tolerance
const COORD_TOL: f64 = 1e-10;

/// Apply the equivalent nodal forces for the given edge stresses to every
/// boundary node of the current model.
///
/// Must be called exactly once, with a load pattern active, before the
/// loaded stiffness-extraction pass.
pub fn distribute_edge_loads<E: FeEngine>(
    engine: &mut E,
    geometry: &PlateGeometry,
    load: &LoadCase,
    sizes: &ElementSizes,
) -> BucklingResult<()> {
    for tag in engine.node_tags() {
        let coords = engine.node_coordinates(tag)?;
        if let Some(force) = tributary_force(&coords, geometry, load, sizes) {
            engine.apply_load(tag, force)?;
        }
    }
    Ok(())
}

/// Equivalent nodal force for one node, or `None` off the loaded edges.
fn tributary_force(
    coords: &[f64; 3],
    geometry: &PlateGeometry,
    load: &LoadCase,
    sizes: &ElementSizes,
) -> Option<[f64; 6]> {
    let [x, y, _] = *coords;
    let on_x_edge = on_plane(x, geometry.width / 2.0);
    let on_y_edge = on_plane(y, geometry.height / 2.0);

    if !on_x_edge && !on_y_edge {
        return None;
    }

    let mut force = [0.0; 6];
    if on_x_edge {
        // Tributary length along a vertical edge is the height-axis spacing
        let tributary = if on_y_edge {
            sizes.along_height / 2.0
        } else {
            sizes.along_height
        };
        force[0] = load.sigma_x * geometry.thickness * tributary * x.signum();
    }
    if on_y_edge {
        let tributary = if on_x_edge {
            sizes.along_width / 2.0
        } else {
            sizes.along_width
        };
        force[1] = load.sigma_y * geometry.thickness * tributary * y.signum();
    }
    Some(force)
}

fn on_plane(coord: f64, plane: f64) -> bool {
    (coord - plane).abs() < COORD_TOL || (coord + plane).abs() < COORD_TOL
}
