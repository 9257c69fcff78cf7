//! Plate model construction
//!
//! Builds the plate topology on the external engine: one elastic isotropic
//! material, one plate-fiber section, four corner nodes, boundary-edge node
//! chains at the symmetric mesh densities, and a quad mesh of nonlinear
//! shell elements spanning the chains. Construction is deterministic: the
//! same configuration always produces the identical topology and therefore
//! the identical DOF numbering, which is what allows the model to be wiped
//! and rebuilt once per reconstructed mode without invalidating the DofMap
//! captured during stiffness extraction.

use crate::config::AnalysisConfig;
use crate::engine::{DofMask, FeEngine, ShellKind};
use crate::error::BucklingResult;
use crate::mesh::ElementSizes;

const MATERIAL_TAG: u32 = 1;
const SECTION_TAG: u32 = 1;
const QUAD_MESH_TAG: u32 = 10;

const CLAMP_Z: DofMask = [false, false, true, false, false, false];
const CLAMP_X: DofMask = [true, false, false, false, false, false];
const CLAMP_Y: DofMask = [false, true, false, false, false, false];

/// Deterministic builder for the supported plate model
#[derive(Debug, Clone, Copy)]
pub struct PlateModel<'a> {
    config: &'a AnalysisConfig,
    sizes: ElementSizes,
}

impl<'a> PlateModel<'a> {
    pub fn new(config: &'a AnalysisConfig, sizes: ElementSizes) -> Self {
        Self { config, sizes }
    }

    /// Wipe the engine and rebuild the complete plate model, supports
    /// included.
    pub fn build<E: FeEngine>(&self, engine: &mut E) -> BucklingResult<()> {
        let geometry = &self.config.geometry;
        let half_w = geometry.width / 2.0;
        let half_h = geometry.height / 2.0;

        engine.reset();
        engine.init_model(3, 6)?;

        engine.define_elastic_isotropic(
            MATERIAL_TAG,
            self.config.material.e,
            self.config.material.v,
            0.0,
        )?;
        engine.define_plate_fiber_section(SECTION_TAG, MATERIAL_TAG, geometry.thickness)?;

        // Corner nodes, counterclockwise from (+w/2, +h/2)
        engine.define_node(1, half_w, half_h, 0.0)?;
        engine.define_node(2, half_w, -half_h, 0.0)?;
        engine.define_node(3, -half_w, -half_h, 0.0)?;
        engine.define_node(4, -half_w, half_h, 0.0)?;

        // Boundary chains: vertical edges run along the height, horizontal
        // edges along the width
        engine.mesh_line(1, &[1, 2], self.sizes.along_height)?;
        engine.mesh_line(2, &[2, 3], self.sizes.along_width)?;
        engine.mesh_line(3, &[3, 4], self.sizes.along_height)?;
        engine.mesh_line(4, &[4, 1], self.sizes.along_width)?;

        engine.mesh_quad(
            QUAD_MESH_TAG,
            &[1, 2, 3, 4],
            self.sizes.global,
            ShellKind::NonlinearQuad,
            SECTION_TAG,
        )?;

        self.apply_supports(engine)
    }

    /// Apply the support and symmetry boundary conditions.
    ///
    /// Also invoked a second time by the mode reconstructor, after the
    /// prescribed displacements have been attached.
    pub fn apply_supports<E: FeEngine>(&self, engine: &mut E) -> BucklingResult<()> {
        let half_w = self.config.geometry.width / 2.0;
        let half_h = self.config.geometry.height / 2.0;

        // Loaded x edges are always held against out-of-plane translation
        engine.fix_x(-half_w, CLAMP_Z)?;
        engine.fix_x(half_w, CLAMP_Z)?;
        if self.config.supports.clamps_top() {
            engine.fix_y(half_h, CLAMP_Z)?;
        }
        if self.config.supports.clamps_bottom() {
            engine.fix_y(-half_h, CLAMP_Z)?;
        }

        // Centerline symmetry: no in-plane translation across either
        // symmetry plane, restricting the model to symmetric buckling modes
        engine.fix_x(0.0, CLAMP_X)?;
        engine.fix_y(0.0, CLAMP_Y)?;

        Ok(())
    }
}
